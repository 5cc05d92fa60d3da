//! Active-instance stack
//!
//! Tracks which script instance the current API call runs on behalf of.
//! The stack is thread-local: scripts and the engine share one thread and
//! never run concurrently. Entries are weak; the stack never keeps an
//! instance alive.

use crate::error::{Result, ScriptError};
use crate::instance::ScriptInstance;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

thread_local! {
    static ACTIVE: RefCell<Vec<Weak<ScriptInstance>>> = const { RefCell::new(Vec::new()) };
}

/// Scoped activation of a script instance.
///
/// Creating the guard makes `instance` the active instance; dropping it
/// restores whichever instance was active before. Guards must be dropped
/// in reverse order of creation.
#[must_use = "the instance is only active while the guard lives"]
pub struct ActiveInstance {
    /// The active instance before this guard was created
    last_active: Option<Weak<ScriptInstance>>,
    instance: Weak<ScriptInstance>,
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl ActiveInstance {
    pub fn new(instance: &Arc<ScriptInstance>) -> Self {
        if instance.is_dead() {
            tracing::error!("Activating destroyed script instance {}", instance.id());
            debug_assert!(false, "activating destroyed script instance {}", instance.id());
        }

        let instance = Arc::downgrade(instance);
        let (last_active, depth) = ACTIVE.with(|stack| {
            let mut stack = stack.borrow_mut();
            let last_active = stack.last().cloned();
            stack.push(instance.clone());
            (last_active, stack.len())
        });

        tracing::trace!("Activated script instance (depth {})", depth);

        Self {
            last_active,
            instance,
            depth,
            _not_send: PhantomData,
        }
    }
}

impl Drop for ActiveInstance {
    fn drop(&mut self) {
        ACTIVE.with(|stack| {
            let mut stack = stack.borrow_mut();
            let in_order = stack.len() == self.depth
                && stack.last().is_some_and(|top| Weak::ptr_eq(top, &self.instance));

            if !in_order && !std::thread::panicking() {
                tracing::error!(
                    "Active instance released out of order (depth {}, expected {})",
                    stack.len(),
                    self.depth
                );
                debug_assert!(false, "active instance released out of order");
            }

            stack.truncate(self.depth.saturating_sub(1));

            debug_assert!(
                std::thread::panicking()
                    || match (stack.last(), &self.last_active) {
                        (Some(top), Some(last)) => Weak::ptr_eq(top, last),
                        (None, None) => true,
                        _ => false,
                    },
                "active instance not restored"
            );
        });

        tracing::trace!("Deactivated script instance (depth {})", self.depth - 1);
    }
}

/// The instance currently executing
pub fn current() -> Result<Arc<ScriptInstance>> {
    let top = ACTIVE
        .with(|stack| stack.borrow().last().cloned())
        .ok_or(ScriptError::NoActiveInstance)?;

    let instance = top.upgrade().ok_or(ScriptError::InstanceDestroyed)?;
    if instance.is_dead() {
        return Err(ScriptError::InstanceDestroyed);
    }
    Ok(instance)
}

/// Number of nested activations on this thread
pub fn depth() -> usize {
    ACTIVE.with(|stack| stack.borrow().len())
}

/// True when no scripted API call is in progress on this thread
pub fn is_empty() -> bool {
    depth() == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestEngine;

    #[test]
    fn test_empty_stack() {
        assert!(is_empty());
        assert!(matches!(current(), Err(ScriptError::NoActiveInstance)));
    }

    #[test]
    fn test_nested_activation() {
        let engine = TestEngine::new();
        let first = engine.instance(1);
        let second = engine.instance(2);

        {
            let _outer = ActiveInstance::new(&first);
            assert!(Arc::ptr_eq(&current().unwrap(), &first));

            {
                let _inner = ActiveInstance::new(&second);
                assert!(Arc::ptr_eq(&current().unwrap(), &second));
                assert_eq!(depth(), 2);
            }

            assert!(Arc::ptr_eq(&current().unwrap(), &first));
            assert_eq!(depth(), 1);
        }

        assert!(is_empty());
    }

    #[test]
    fn test_reentrant_same_instance() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);

        let _outer = ActiveInstance::new(&instance);
        {
            let _inner = ActiveInstance::new(&instance);
            assert_eq!(depth(), 2);
        }
        assert!(Arc::ptr_eq(&current().unwrap(), &instance));
    }

    #[test]
    fn test_restored_on_unwind() {
        let engine = TestEngine::new();
        let first = engine.instance(1);
        let second = engine.instance(2);

        let _outer = ActiveInstance::new(&first);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _inner = ActiveInstance::new(&second);
            panic!("script aborted");
        }));

        assert!(result.is_err());
        assert_eq!(depth(), 1);
        assert!(Arc::ptr_eq(&current().unwrap(), &first));
    }

    #[test]
    fn test_stack_does_not_own_instances() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);

        let _active = ActiveInstance::new(&instance);
        drop(instance);
        assert!(matches!(current(), Err(ScriptError::InstanceDestroyed)));
    }

    #[test]
    fn test_destroyed_instance_is_not_current() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);

        let _active = ActiveInstance::new(&instance);
        instance.destroy();
        assert!(matches!(current(), Err(ScriptError::InstanceDestroyed)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "activating destroyed script instance")]
    fn test_activating_destroyed_instance_panics() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);
        instance.destroy();
        let _active = ActiveInstance::new(&instance);
    }
}
