//! # Script Instance
//!
//! One running script: its ambient context, its engine hooks, and its
//! suspension state.

use crate::active::ActiveInstance;
use crate::context::ScriptContext;
use crate::engine::{CommandResult, EngineHooks};
use crate::error::{Result, ScriptError};
use parking_lot::Mutex;
use scriptapi_config::ScriptConfig;
use scriptapi_core::{CompanyID, InstanceId};
use std::sync::Arc;

/// Callback run when a suspended instance is resumed after a command
pub type SuspendCallback = fn(&Arc<ScriptInstance>);

/// Lifecycle state of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    /// Runnable
    Running,

    /// Parked in the host runtime, waiting on a command
    Suspended,

    /// Destroyed; may never be activated again
    Dead,
}

struct Lifecycle {
    state: InstanceState,
    pending: Option<SuspendCallback>,
}

/// A single script instance
///
/// # Thread Safety
/// The context sits behind a `Mutex` that is only held for one field
/// access at a time, never across calls into the engine or script code.
pub struct ScriptInstance {
    /// Unique instance ID
    id: InstanceId,

    /// Company the script acts for
    company: CompanyID,

    hooks: EngineHooks,

    config: ScriptConfig,

    context: Mutex<ScriptContext>,

    lifecycle: Mutex<Lifecycle>,
}

impl ScriptInstance {
    /// Create a new instance with a fresh context
    pub fn new(
        id: InstanceId,
        company: CompanyID,
        hooks: EngineHooks,
        config: &ScriptConfig,
    ) -> Arc<Self> {
        tracing::debug!("Creating script instance {} for company {}", id, company);

        Arc::new(Self {
            id,
            company,
            hooks,
            config: config.clone(),
            context: Mutex::new(ScriptContext::new(config)),
            lifecycle: Mutex::new(Lifecycle {
                state: InstanceState::Running,
                pending: None,
            }),
        })
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn company(&self) -> CompanyID {
        self.company
    }

    pub fn hooks(&self) -> &EngineHooks {
        &self.hooks
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    pub fn state(&self) -> InstanceState {
        self.lifecycle.lock().state
    }

    pub fn is_dead(&self) -> bool {
        self.state() == InstanceState::Dead
    }

    pub fn is_suspended(&self) -> bool {
        self.state() == InstanceState::Suspended
    }

    /// Run `f` with exclusive access to the context.
    ///
    /// `f` must not call back into the API; the lock is not re-entrant.
    pub fn with_context<R>(&self, f: impl FnOnce(&mut ScriptContext) -> R) -> R {
        f(&mut self.context.lock())
    }

    /// Whether a command may suspend this instance right now.
    ///
    /// A suspended instance is already waiting on a command, so it may not
    /// issue another one until it is resumed.
    pub fn can_suspend(&self) -> bool {
        self.state() == InstanceState::Running
            && self.hooks.host.can_suspend()
            && self.with_context(|ctx| ctx.allow_do_command())
    }

    /// Park the instance and hand control back to the host runtime
    pub(crate) fn suspend(&self, ticks: u32, callback: Option<SuspendCallback>) {
        {
            let mut lifecycle = self.lifecycle.lock();
            match lifecycle.state {
                InstanceState::Dead => return,
                InstanceState::Suspended => {
                    tracing::error!(
                        "Script instance {} suspended while already suspended; keeping the first continuation",
                        self.id
                    );
                    debug_assert!(
                        lifecycle.state != InstanceState::Suspended,
                        "script instance suspended twice"
                    );
                    return;
                }
                InstanceState::Running => {}
            }
            lifecycle.state = InstanceState::Suspended;
            lifecycle.pending = callback;
        }

        tracing::trace!("Suspending script instance {} for {} ticks", self.id, ticks);
        self.hooks.host.suspend(self.id, ticks);
    }

    /// Engine notification that an asynchronous command finished
    pub fn complete_command(&self, result: CommandResult) {
        if self.is_dead() {
            tracing::debug!(
                "Dropping command result for destroyed script instance {}",
                self.id
            );
            return;
        }

        tracing::trace!(
            "Command for script instance {} completed: success={} cost={}",
            self.id,
            result.success,
            result.cost
        );
        self.with_context(|ctx| ctx.record_command_result(&result));
    }

    /// Host notification that the instance may continue.
    ///
    /// Runs the pending callback, if any, with this instance active. A
    /// wake-up for an instance that is not suspended does nothing.
    pub fn resume(self: &Arc<Self>) -> Result<()> {
        let callback = {
            let mut lifecycle = self.lifecycle.lock();
            match lifecycle.state {
                InstanceState::Dead => {
                    tracing::debug!("Refusing to resume destroyed script instance {}", self.id);
                    return Err(ScriptError::InstanceDestroyed);
                }
                InstanceState::Running => {
                    tracing::debug!("Ignoring wake-up for running script instance {}", self.id);
                    return Ok(());
                }
                InstanceState::Suspended => {}
            }
            lifecycle.state = InstanceState::Running;
            lifecycle.pending.take()
        };

        if let Some(callback) = callback {
            let _active = ActiveInstance::new(self);
            callback(self);
        }
        Ok(())
    }

    /// Host notification that the instance is being torn down.
    ///
    /// Any pending callback is discarded.
    pub fn destroy(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state == InstanceState::Dead {
            return;
        }
        if lifecycle.pending.take().is_some() {
            tracing::debug!("Discarding pending callback of script instance {}", self.id);
        }
        lifecycle.state = InstanceState::Dead;
        tracing::debug!("Destroyed script instance {}", self.id);
    }
}

impl Drop for ScriptInstance {
    fn drop(&mut self) {
        tracing::trace!("Dropping script instance {}", self.id);
    }
}

impl std::fmt::Debug for ScriptInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptInstance")
            .field("id", &self.id)
            .field("company", &self.company)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestEngine;
    use crate::ScriptObject;
    use scriptapi_core::VehicleID;
    use crate::engine::NewEntityIds;

    #[test]
    fn test_instance_creation() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);
        assert_eq!(instance.id(), InstanceId::new(1));
        assert_eq!(instance.state(), InstanceState::Running);
        assert_eq!(instance.config().max_callback_vars, 8);
    }

    #[test]
    fn test_can_suspend_needs_host_and_flag() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);
        assert!(instance.can_suspend());

        instance.with_context(|ctx| ctx.set_allow_do_command(false));
        assert!(!instance.can_suspend());

        instance.with_context(|ctx| ctx.set_allow_do_command(true));
        engine.host.set_safe(false);
        assert!(!instance.can_suspend());
    }

    fn mark_resumed(instance: &Arc<ScriptInstance>) {
        assert!(Arc::ptr_eq(&ScriptObject::active_instance().unwrap(), instance));
        ScriptObject::set_callback_variable(0, 42).unwrap();
    }

    #[test]
    fn test_resume_runs_callback_with_instance_active() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);

        instance.suspend(3, Some(mark_resumed));
        assert!(instance.is_suspended());
        assert_eq!(engine.host.suspensions(), vec![(instance.id(), 3)]);

        instance.resume().unwrap();
        assert_eq!(instance.state(), InstanceState::Running);
        assert_eq!(
            instance.with_context(|ctx| ctx.callback_variable(0)).unwrap(),
            42
        );
    }

    #[test]
    fn test_suspended_instance_cannot_suspend_again() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);

        instance.suspend(1, Some(mark_resumed));
        assert!(!instance.can_suspend());

        instance.resume().unwrap();
        assert!(instance.can_suspend());
    }

    #[test]
    fn test_resume_of_running_instance_is_ignored() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);

        instance.resume().unwrap();
        assert_eq!(instance.state(), InstanceState::Running);
        assert_eq!(
            instance.with_context(|ctx| ctx.callback_variable(0)).unwrap(),
            0
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "suspended twice")]
    fn test_double_suspend_panics() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);

        instance.suspend(1, Some(mark_resumed));
        instance.suspend(1, None);
    }

    #[test]
    fn test_destroy_discards_pending_work() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);

        instance.suspend(1, Some(mark_resumed));
        instance.destroy();
        assert!(instance.is_dead());

        let late = CommandResult::succeeded(10).with_new_ids(NewEntityIds {
            vehicle: Some(VehicleID::new(3)),
            ..Default::default()
        });
        instance.complete_command(late);
        assert_eq!(instance.with_context(|ctx| ctx.new_vehicle_id()), VehicleID::INVALID);

        assert!(matches!(instance.resume(), Err(ScriptError::InstanceDestroyed)));
        assert_eq!(
            instance.with_context(|ctx| ctx.callback_variable(0)).unwrap(),
            0
        );
    }
}
