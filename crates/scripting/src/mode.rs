//! Execution modes
//!
//! A mode object installs a hook on the active instance for as long as it
//! lives. [`TestMode`] turns every command into a cost estimate;
//! [`ExecMode`] executes commands again inside a test-mode scope. Modes
//! nest: dropping one restores the hook that was installed before it.

use crate::context::{ModeKind, ModeOwner, ModeProc};
use crate::error::Result;
use crate::instance::ScriptInstance;
use crate::object::ScriptObject;
use std::sync::{Arc, Weak};

fn test_mode_proc() -> bool {
    false
}

fn exec_mode_proc() -> bool {
    true
}

struct ModeScope {
    owner: Arc<ModeOwner>,
    instance: Weak<ScriptInstance>,
    last_mode: Option<ModeProc>,
    last_instance: Weak<ModeOwner>,
}

impl ModeScope {
    fn install(kind: ModeKind, proc_: ModeProc) -> Result<Self> {
        let instance = ScriptObject::active_instance()?;
        let owner = ModeOwner::new(kind);

        let (last_mode, last_instance) = instance.with_context(|ctx| {
            let saved = (ctx.mode_proc(), ctx.mode_owner());
            ctx.set_mode(Some(proc_), Arc::downgrade(&owner));
            saved
        });

        tracing::trace!("Entered {:?} mode for script instance {}", kind, instance.id());

        Ok(Self {
            owner,
            instance: Arc::downgrade(&instance),
            last_mode,
            last_instance,
        })
    }
}

impl Drop for ModeScope {
    fn drop(&mut self) {
        let Some(instance) = self.instance.upgrade() else {
            return;
        };

        let latest = instance.with_context(|ctx| {
            ctx.mode_instance()
                .is_some_and(|current| Arc::ptr_eq(&current, &self.owner))
        });

        if !latest && !instance.is_dead() && !std::thread::panicking() {
            panic!(
                "{:?} mode object was removed while it was not the latest mode object created",
                self.owner.kind()
            );
        }

        instance.with_context(|ctx| ctx.set_mode(self.last_mode, self.last_instance.clone()));
        tracing::trace!(
            "Left {:?} mode for script instance {}",
            self.owner.kind(),
            instance.id()
        );
    }
}

/// Commands issued while this lives are only estimated
pub struct TestMode {
    scope: ModeScope,
}

impl TestMode {
    pub fn new() -> Result<Self> {
        Ok(Self {
            scope: ModeScope::install(ModeKind::Test, test_mode_proc)?,
        })
    }

    pub fn owner(&self) -> &Arc<ModeOwner> {
        &self.scope.owner
    }
}

/// Commands issued while this lives are executed
pub struct ExecMode {
    scope: ModeScope,
}

impl ExecMode {
    pub fn new() -> Result<Self> {
        Ok(Self {
            scope: ModeScope::install(ModeKind::Exec, exec_mode_proc)?,
        })
    }

    pub fn owner(&self) -> &Arc<ModeOwner> {
        &self.scope.owner
    }
}
