//! Ambient accessor facade
//!
//! Every API class reaches its instance's context through these associated
//! functions. Each call resolves the active instance, so none of them need
//! the instance passed in. Outside any activation they return
//! [`ScriptError::NoActiveInstance`](crate::error::ScriptError::NoActiveInstance).

use crate::active;
use crate::context::{ModeOwner, ModeProc, ScriptContext, Slot};
use crate::engine::{CommandRequest, Submission};
use crate::error::{Result, ScriptErrorType};
use crate::instance::{ScriptInstance, SuspendCallback};
use scriptapi_core::{GroupID, Money, RailType, RoadType, SignID, TileIndex, VehicleID};
use std::sync::{Arc, Weak};

/// Common base of all API classes
pub struct ScriptObject;

impl ScriptObject {
    /// The currently active instance
    pub fn active_instance() -> Result<Arc<ScriptInstance>> {
        active::current()
    }

    fn with_context<R>(f: impl FnOnce(&mut ScriptContext) -> R) -> Result<R> {
        Ok(Self::active_instance()?.with_context(f))
    }

    /// Store the latest result of a command
    pub fn set_last_command_res(res: bool) -> Result<()> {
        Self::with_context(|ctx| ctx.set_last_command_result(res))
    }

    pub fn get_last_command_res() -> Result<bool> {
        Self::with_context(|ctx| ctx.last_command_result())
    }

    pub fn set_do_command_costs(value: Money) -> Result<()> {
        Self::with_context(|ctx| ctx.set_costs(value))
    }

    /// Add to the costs counter, saturating. Saturation sets
    /// [`ScriptErrorType::Overflow`] as the last error.
    pub fn increase_do_command_costs(value: Money) -> Result<()> {
        Self::with_context(|ctx| {
            ctx.increase_costs(value);
        })
    }

    pub fn get_do_command_costs() -> Result<Money> {
        Self::with_context(|ctx| ctx.costs())
    }

    pub fn set_last_error(last_error: ScriptErrorType) -> Result<()> {
        Self::with_context(|ctx| ctx.set_last_error(last_error))
    }

    pub fn get_last_error() -> Result<ScriptErrorType> {
        Self::with_context(|ctx| ctx.last_error())
    }

    pub fn set_road_type(road_type: RoadType) -> Result<()> {
        Self::with_context(|ctx| ctx.set_road_type(road_type))
    }

    pub fn get_road_type() -> Result<RoadType> {
        Self::with_context(|ctx| ctx.road_type())
    }

    pub fn set_rail_type(rail_type: RailType) -> Result<()> {
        Self::with_context(|ctx| ctx.set_rail_type(rail_type))
    }

    pub fn get_rail_type() -> Result<RailType> {
        Self::with_context(|ctx| ctx.rail_type())
    }

    /// Install (or with `None`, clear) the mode hook of the active instance
    pub fn set_do_command_mode(proc_: Option<ModeProc>, instance: Weak<ModeOwner>) -> Result<()> {
        Self::with_context(|ctx| ctx.set_mode(proc_, instance))
    }

    pub fn get_do_command_mode() -> Result<Option<ModeProc>> {
        Self::with_context(|ctx| ctx.mode_proc())
    }

    /// Owner of the current mode hook; `None` without a hook
    pub fn get_do_command_mode_instance() -> Result<Option<Arc<ModeOwner>>> {
        Self::with_context(|ctx| ctx.mode_instance())
    }

    pub fn set_do_command_delay(ticks: u32) -> Result<()> {
        Self::with_context(|ctx| ctx.set_command_delay(ticks))
    }

    pub fn get_do_command_delay() -> Result<u32> {
        Self::with_context(|ctx| ctx.command_delay())
    }

    pub fn get_new_vehicle_id() -> Result<VehicleID> {
        Self::with_context(|ctx| ctx.new_vehicle_id())
    }

    pub fn get_new_sign_id() -> Result<SignID> {
        Self::with_context(|ctx| ctx.new_sign_id())
    }

    pub fn get_new_tunnel_endtile() -> Result<TileIndex> {
        Self::with_context(|ctx| ctx.new_tunnel_endtile())
    }

    pub fn get_new_group_id() -> Result<GroupID> {
        Self::with_context(|ctx| ctx.new_group_id())
    }

    pub fn set_allow_do_command(allow: bool) -> Result<()> {
        Self::with_context(|ctx| ctx.set_allow_do_command(allow))
    }

    /// Raw allow flag. Unlike [`ScriptObject::can_suspend`] this ignores the
    /// host runtime, so callers can save and restore it around a scope.
    pub fn get_allow_do_command() -> Result<bool> {
        Self::with_context(|ctx| ctx.allow_do_command())
    }

    pub fn set_last_cost(last_cost: Money) -> Result<()> {
        Self::with_context(|ctx| ctx.set_last_cost(last_cost))
    }

    pub fn get_last_cost() -> Result<Money> {
        Self::with_context(|ctx| ctx.last_cost())
    }

    pub fn set_callback_variable(index: usize, value: i32) -> Result<()> {
        Self::with_context(|ctx| ctx.set_callback_variable(index, value))?
    }

    pub fn get_callback_variable(index: usize) -> Result<i32> {
        Self::with_context(|ctx| ctx.callback_variable(index))?
    }

    /// Can the active instance be suspended at this moment?
    pub fn can_suspend() -> Result<bool> {
        Ok(Self::active_instance()?.can_suspend())
    }

    /// Run `f` on the event slot of the active instance.
    ///
    /// `f` runs under the context lock and must not call back into the API.
    pub fn with_event_slot<R>(f: impl FnOnce(&mut Slot) -> R) -> Result<R> {
        Self::with_context(|ctx| f(ctx.event_slot()))
    }

    /// Run `f` on the log slot of the active instance.
    ///
    /// `f` must not call back into the API; the lock is not re-entrant.
    pub fn with_log_slot<R>(f: impl FnOnce(&mut Slot) -> R) -> Result<R> {
        Self::with_context(|ctx| f(ctx.log_slot()))
    }

    /// Execute a raw command for the active instance.
    ///
    /// Returns `Ok(false)` when the command was refused or failed; the reason
    /// is left in the last error. Under a mode hook that returns false the
    /// command is only estimated. With a callback, or when the engine
    /// completes the command later, the instance is suspended and the
    /// callback runs on resume. A suspended instance may not issue another
    /// command until it has been resumed.
    pub fn do_command(request: &CommandRequest, callback: Option<SuspendCallback>) -> Result<bool> {
        let instance = Self::active_instance()?;

        if !instance.can_suspend() {
            tracing::debug!(
                "Script instance {} may not execute commands here (cmd {})",
                instance.id(),
                request.cmd
            );
            instance.with_context(|ctx| {
                ctx.set_last_error(ScriptErrorType::PreconditionFailed);
                ctx.set_last_command_result(false);
            });
            return Ok(false);
        }

        // The hook is called without the context lock; it may query the API.
        let mode = instance.with_context(|ctx| {
            ctx.set_last_error(ScriptErrorType::None);
            ctx.live_mode_proc()
        });
        let estimate_only = mode.is_some_and(|proc_| !proc_());

        tracing::trace!(
            "Script instance {} submitting cmd {} at tile {} (estimate_only={})",
            instance.id(),
            request.cmd,
            request.tile,
            estimate_only
        );

        let result = match instance.hooks().dispatcher.submit(request, estimate_only) {
            Submission::Completed(result) => result,
            Submission::Pending if estimate_only => {
                tracing::error!(
                    "Dispatcher deferred a cost estimate for cmd {}; treating it as refused",
                    request.cmd
                );
                instance.with_context(|ctx| {
                    ctx.set_last_error(ScriptErrorType::PreconditionFailed);
                    ctx.set_last_command_result(false);
                });
                return Ok(false);
            }
            Submission::Pending => {
                let delay = instance.with_context(|ctx| ctx.command_delay());
                instance.suspend(delay, callback);
                return Ok(true);
            }
        };

        if !result.success {
            tracing::debug!(
                "Cmd {} failed for script instance {}: {:?}",
                request.cmd,
                instance.id(),
                result.error
            );
            instance.with_context(|ctx| ctx.record_command_result(&result));
            return Ok(false);
        }

        if estimate_only {
            instance.with_context(|ctx| ctx.record_estimate(result.cost));
            return Ok(true);
        }

        let delay = instance.with_context(|ctx| {
            ctx.record_command_result(&result);
            ctx.command_delay()
        });

        if callback.is_some() {
            instance.suspend(delay, callback);
        }
        Ok(true)
    }
}
