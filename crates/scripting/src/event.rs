//! Script event queue
//!
//! The engine posts events for an instance into its event slot; the script
//! drains them in arrival order. When the queue is full the oldest event is
//! dropped.

use crate::error::Result;
use crate::instance::ScriptInstance;
use crate::object::ScriptObject;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Kinds of event delivered to scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptEventType {
    VehicleCrashed,
    VehicleLost,
    VehicleWaitingInDepot,
    VehicleUnprofitable,
    EngineAvailable,
    CompanyNew,
    CompanyBankrupt,
    StationFirstVehicle,
    TownFounded,
}

/// One queued event; `subject` is the entity the event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub kind: ScriptEventType,
    pub subject: u32,
}

impl ScriptEvent {
    pub fn new(kind: ScriptEventType, subject: u32) -> Self {
        Self { kind, subject }
    }
}

#[derive(Debug)]
struct EventQueue {
    events: VecDeque<ScriptEvent>,
    capacity: usize,
}

/// Event queue access
pub struct ScriptEventQueue;

impl ScriptEventQueue {
    /// Engine side: queue `event` for `instance`
    pub fn insert(instance: &ScriptInstance, event: ScriptEvent) {
        if instance.is_dead() {
            tracing::debug!("Dropping {:?} for destroyed instance {}", event.kind, instance.id());
            return;
        }

        let capacity = instance.config().event_queue_capacity;
        instance.with_context(|ctx| {
            let slot = ctx.event_slot();
            if !slot.as_ref().is_some_and(|queue| queue.is::<EventQueue>()) {
                *slot = Some(Box::new(EventQueue {
                    events: VecDeque::new(),
                    capacity,
                }));
            }

            if let Some(queue) = slot.as_mut().and_then(|queue| queue.downcast_mut::<EventQueue>()) {
                if queue.capacity == 0 {
                    return;
                }
                if queue.events.len() == queue.capacity {
                    if let Some(dropped) = queue.events.pop_front() {
                        tracing::warn!(
                            "Event queue of instance {} full, dropping {:?}",
                            instance.id(),
                            dropped.kind
                        );
                    }
                }
                queue.events.push_back(event);
            }
        });
    }

    /// Whether the active instance has an event waiting
    pub fn is_event_waiting() -> Result<bool> {
        ScriptObject::with_event_slot(|slot| {
            slot.as_ref()
                .and_then(|queue| queue.downcast_ref::<EventQueue>())
                .is_some_and(|queue| !queue.events.is_empty())
        })
    }

    /// Take the oldest event of the active instance
    pub fn get_next_event() -> Result<Option<ScriptEvent>> {
        ScriptObject::with_event_slot(|slot| {
            slot.as_mut()
                .and_then(|queue| queue.downcast_mut::<EventQueue>())
                .and_then(|queue| queue.events.pop_front())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::active::ActiveInstance;
    use crate::test_support::TestEngine;

    #[test]
    fn test_events_drain_in_order() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);

        ScriptEventQueue::insert(&instance, ScriptEvent::new(ScriptEventType::VehicleLost, 4));
        ScriptEventQueue::insert(&instance, ScriptEvent::new(ScriptEventType::CompanyNew, 2));

        let _active = ActiveInstance::new(&instance);
        assert!(ScriptEventQueue::is_event_waiting().unwrap());
        assert_eq!(
            ScriptEventQueue::get_next_event().unwrap(),
            Some(ScriptEvent::new(ScriptEventType::VehicleLost, 4))
        );
        assert_eq!(
            ScriptEventQueue::get_next_event().unwrap().map(|event| event.kind),
            Some(ScriptEventType::CompanyNew)
        );
        assert!(!ScriptEventQueue::is_event_waiting().unwrap());
        assert_eq!(ScriptEventQueue::get_next_event().unwrap(), None);
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let mut engine = TestEngine::new();
        engine.config.event_queue_capacity = 1;
        let instance = engine.instance(1);

        ScriptEventQueue::insert(&instance, ScriptEvent::new(ScriptEventType::VehicleCrashed, 1));
        ScriptEventQueue::insert(&instance, ScriptEvent::new(ScriptEventType::VehicleCrashed, 2));

        let _active = ActiveInstance::new(&instance);
        assert_eq!(ScriptEventQueue::get_next_event().unwrap().map(|e| e.subject), Some(2));
        assert_eq!(ScriptEventQueue::get_next_event().unwrap(), None);
    }

    #[test]
    fn test_destroyed_instance_receives_nothing() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);
        instance.destroy();

        ScriptEventQueue::insert(&instance, ScriptEvent::new(ScriptEventType::TownFounded, 9));
        assert!(instance.with_context(|ctx| ctx.event_slot().is_none()));
    }
}
