//! # Script API Core
//!
//! Ambient context shared by every scripting API class.
//!
//! ## Features
//! - Per-instance context (costs, last error, last command result, modes,
//!   new entity IDs, callback scratch slots, event and log slots)
//! - Thread-local active-instance stack with scoped activation
//! - `ScriptObject` facade resolving the active instance on every call
//! - Command bridge with dry-run estimation and suspension
//! - Waypoint list builders
//!
//! ## Usage
//!
//! ```rust,ignore
//! let instance = manager.create(company);
//! let _active = ActiveInstance::new(&instance);
//!
//! let _estimate = TestMode::new()?;
//! ScriptObject::do_command(&CommandRequest::new(tile, p1, p2, cmd), None)?;
//! let cost = ScriptObject::get_last_cost()?;
//! ```

pub mod active;
pub mod context;
pub mod engine;
pub mod error;
pub mod event;
pub mod instance;
pub mod list;
pub mod log;
pub mod manager;
pub mod mode;
pub mod object;
pub mod waypoint;

#[cfg(test)]
mod test_support;

pub use active::ActiveInstance;
pub use context::{ModeKind, ModeOwner, ModeProc, ScriptContext, Slot};
pub use engine::{
    CommandDispatcher, CommandRequest, CommandResult, EngineHooks, HostRuntime, NewEntityIds,
    Order, OrderType, StationFacilities, Submission, Vehicle, Waypoint, WorldQuery,
};
pub use error::{Result, ScriptError, ScriptErrorType};
pub use event::{ScriptEvent, ScriptEventQueue, ScriptEventType};
pub use instance::{InstanceState, ScriptInstance, SuspendCallback};
pub use list::ScriptList;
pub use log::{LogLevel, LogLine, ScriptLog};
pub use manager::InstanceManager;
pub use mode::{ExecMode, TestMode};
pub use object::ScriptObject;
pub use waypoint::{is_valid_vehicle, WaypointList, WaypointType};
