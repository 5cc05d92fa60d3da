//! # Instance Manager
//!
//! Owns every running script instance and routes host notifications
//! (resume, destroy) to them by ID.

use crate::engine::EngineHooks;
use crate::error::{Result, ScriptError};
use crate::instance::ScriptInstance;
use scriptapi_config::ScriptConfig;
use scriptapi_core::{CompanyID, IdGenerator, InstanceId};
use std::sync::Arc;

/// Script Instance Manager
///
/// # Purpose
/// Creates instances with unique IDs and is the host's entry point for
/// per-instance lifecycle notifications.
///
/// # Thread Safety
/// All operations are thread-safe using DashMap for concurrent access.
pub struct InstanceManager {
    /// Key: InstanceId, Value: instance handle
    instances: dashmap::DashMap<InstanceId, Arc<ScriptInstance>>,

    ids: IdGenerator,

    hooks: EngineHooks,

    config: ScriptConfig,
}

impl InstanceManager {
    /// Create a manager whose instances share `hooks` and `config`
    pub fn new(hooks: EngineHooks, config: ScriptConfig) -> Self {
        tracing::debug!("Creating InstanceManager");

        Self {
            instances: dashmap::DashMap::new(),
            ids: IdGenerator::new(),
            hooks,
            config,
        }
    }

    /// Start a new script instance for `company`
    pub fn create(&self, company: CompanyID) -> Arc<ScriptInstance> {
        let id = self.ids.get_available_id();
        let instance = ScriptInstance::new(id, company, self.hooks.clone(), &self.config);
        self.instances.insert(id, instance.clone());
        instance
    }

    /// Get an instance by ID
    ///
    /// # Returns
    /// `Some(instance)` if found, `None` otherwise
    #[inline]
    pub fn get(&self, id: InstanceId) -> Option<Arc<ScriptInstance>> {
        self.instances.get(&id).map(|entry| entry.clone())
    }

    /// Resume a suspended instance; see [`ScriptInstance::resume`]
    pub fn resume(&self, id: InstanceId) -> Result<()> {
        let instance = self.get(id).ok_or(ScriptError::InstanceDestroyed)?;
        instance.resume()
    }

    /// Destroy an instance.
    ///
    /// Handles held elsewhere stay valid but the instance is dead. Its ID is
    /// not reused, so later wake-ups for it are refused.
    pub fn destroy(&self, id: InstanceId) -> bool {
        match self.instances.remove(&id) {
            Some((_, instance)) => {
                instance.destroy();
                true
            }
            None => false,
        }
    }

    /// Get the number of live instances
    #[inline]
    pub fn count(&self) -> usize {
        self.instances.len()
    }
}
