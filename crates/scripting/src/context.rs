//! Per-instance ambient context
//!
//! Holds every value the API reads or writes on behalf of one script
//! instance. Each instance owns exactly one context for its lifetime.

use crate::engine::{CommandResult, NewEntityIds};
use crate::error::{Result, ScriptError, ScriptErrorType};
use scriptapi_config::ScriptConfig;
use scriptapi_core::{EngineErrorCode, GroupID, Money, RailType, RoadType, SignID, TileIndex, VehicleID};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Mode hook: returns false when commands should only be estimated
pub type ModeProc = fn() -> bool;

/// Engine-owned opaque value stored in the event or log slot
pub type Slot = Option<Box<dyn Any + Send>>;

/// Kind of mode object that installed a hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Test,
    Exec,
}

/// Identity of a mode object; the context only keeps a weak reference
#[derive(Debug)]
pub struct ModeOwner {
    kind: ModeKind,
}

impl ModeOwner {
    pub fn new(kind: ModeKind) -> Arc<Self> {
        Arc::new(Self { kind })
    }

    pub fn kind(&self) -> ModeKind {
        self.kind
    }
}

#[derive(Debug, Clone)]
struct InstalledMode {
    proc_: ModeProc,
    owner: Weak<ModeOwner>,
}

/// Callback scratch variables, addressed by a bounded index
#[derive(Debug, Clone)]
pub struct CallbackVars {
    limit: usize,
    values: HashMap<usize, i32>,
}

impl CallbackVars {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            values: HashMap::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Unset slots read as zero
    pub fn get(&self, index: usize) -> Result<i32> {
        self.check(index)?;
        Ok(self.values.get(&index).copied().unwrap_or(0))
    }

    pub fn set(&mut self, index: usize, value: i32) -> Result<()> {
        self.check(index)?;
        self.values.insert(index, value);
        Ok(())
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.limit {
            Ok(())
        } else {
            Err(ScriptError::CallbackIndexOutOfRange {
                index,
                limit: self.limit,
            })
        }
    }
}

/// Ambient state of one script instance
pub struct ScriptContext {
    costs: Money,
    last_cost: Money,
    last_error: ScriptErrorType,
    last_cmd_result: bool,
    road_type: RoadType,
    rail_type: RailType,
    mode: Option<InstalledMode>,
    cmd_delay: u32,
    allow_do_command: bool,
    new_vehicle_id: VehicleID,
    new_sign_id: SignID,
    new_group_id: GroupID,
    new_tunnel_endtile: TileIndex,
    callback_vars: CallbackVars,
    event_slot: Slot,
    log_slot: Slot,
}

impl ScriptContext {
    /// Create a fresh context with the configured limits
    pub fn new(config: &ScriptConfig) -> Self {
        Self {
            costs: 0,
            last_cost: 0,
            last_error: ScriptErrorType::None,
            last_cmd_result: false,
            road_type: RoadType::INVALID,
            rail_type: RailType::INVALID,
            mode: None,
            cmd_delay: config.command_delay,
            allow_do_command: config.allow_do_command,
            new_vehicle_id: VehicleID::INVALID,
            new_sign_id: SignID::INVALID,
            new_group_id: GroupID::INVALID,
            new_tunnel_endtile: TileIndex::INVALID,
            callback_vars: CallbackVars::new(config.max_callback_vars),
            event_slot: None,
            log_slot: None,
        }
    }

    pub fn costs(&self) -> Money {
        self.costs
    }

    pub fn set_costs(&mut self, value: Money) {
        self.costs = value;
    }

    /// Add to the costs accumulator, saturating at the bounds of `Money`.
    ///
    /// Saturation records [`ScriptErrorType::Overflow`] as the last error and
    /// returns true.
    pub fn increase_costs(&mut self, amount: Money) -> bool {
        match self.costs.checked_add(amount) {
            Some(costs) => {
                self.costs = costs;
                false
            }
            None => {
                self.costs = if amount > 0 { Money::MAX } else { Money::MIN };
                self.last_error = ScriptErrorType::Overflow;
                tracing::warn!("Command costs saturated at {}", self.costs);
                true
            }
        }
    }

    pub fn last_cost(&self) -> Money {
        self.last_cost
    }

    pub fn set_last_cost(&mut self, value: Money) {
        self.last_cost = value;
    }

    pub fn last_error(&self) -> ScriptErrorType {
        self.last_error
    }

    pub fn set_last_error(&mut self, error: ScriptErrorType) {
        self.last_error = error;
    }

    pub fn last_command_result(&self) -> bool {
        self.last_cmd_result
    }

    pub fn set_last_command_result(&mut self, result: bool) {
        self.last_cmd_result = result;
    }

    pub fn road_type(&self) -> RoadType {
        self.road_type
    }

    pub fn set_road_type(&mut self, road_type: RoadType) {
        self.road_type = road_type;
    }

    pub fn rail_type(&self) -> RailType {
        self.rail_type
    }

    pub fn set_rail_type(&mut self, rail_type: RailType) {
        self.rail_type = rail_type;
    }

    /// Install or clear the mode hook. Clearing the hook forgets the owner.
    pub fn set_mode(&mut self, proc_: Option<ModeProc>, owner: Weak<ModeOwner>) {
        self.mode = proc_.map(|proc_| InstalledMode { proc_, owner });
    }

    pub fn mode_proc(&self) -> Option<ModeProc> {
        self.mode.as_ref().map(|mode| mode.proc_)
    }

    /// Owner of the installed hook, if a hook is set and its owner is alive
    pub fn mode_instance(&self) -> Option<Arc<ModeOwner>> {
        self.mode.as_ref().and_then(|mode| mode.owner.upgrade())
    }

    /// Weak owner handle of the installed hook (dangling when unset)
    pub fn mode_owner(&self) -> Weak<ModeOwner> {
        self.mode
            .as_ref()
            .map(|mode| mode.owner.clone())
            .unwrap_or_default()
    }

    /// The hook to consult before a command.
    ///
    /// A hook whose owner is gone is dropped instead of being called.
    pub fn live_mode_proc(&mut self) -> Option<ModeProc> {
        let mode = self.mode.as_ref()?;
        if mode.owner.strong_count() == 0 {
            tracing::warn!("Dropping mode hook whose owner no longer exists");
            self.mode = None;
            return None;
        }
        Some(mode.proc_)
    }

    pub fn command_delay(&self) -> u32 {
        self.cmd_delay
    }

    pub fn set_command_delay(&mut self, ticks: u32) {
        self.cmd_delay = ticks;
    }

    pub fn allow_do_command(&self) -> bool {
        self.allow_do_command
    }

    pub fn set_allow_do_command(&mut self, allow: bool) {
        self.allow_do_command = allow;
    }

    pub fn new_vehicle_id(&self) -> VehicleID {
        self.new_vehicle_id
    }

    pub fn new_sign_id(&self) -> SignID {
        self.new_sign_id
    }

    pub fn new_group_id(&self) -> GroupID {
        self.new_group_id
    }

    pub fn new_tunnel_endtile(&self) -> TileIndex {
        self.new_tunnel_endtile
    }

    pub fn callback_variable(&self, index: usize) -> Result<i32> {
        self.callback_vars.get(index)
    }

    pub fn set_callback_variable(&mut self, index: usize, value: i32) -> Result<()> {
        self.callback_vars.set(index, value)
    }

    pub fn event_slot(&mut self) -> &mut Slot {
        &mut self.event_slot
    }

    pub fn log_slot(&mut self) -> &mut Slot {
        &mut self.log_slot
    }

    /// Apply the outcome of an executed command
    pub(crate) fn record_command_result(&mut self, result: &CommandResult) {
        self.last_cost = result.cost;
        self.last_cmd_result = result.success;

        if result.success {
            self.increase_costs(result.cost);
            self.record_new_entities(&result.new_ids);
        } else {
            let code = result.error.unwrap_or(EngineErrorCode::UNKNOWN);
            self.last_error = ScriptErrorType::CommandFailed(code);
        }
    }

    /// Apply the outcome of a cost estimate; the world was not touched
    pub(crate) fn record_estimate(&mut self, cost: Money) {
        self.last_cost = cost;
        self.last_cmd_result = true;
        self.increase_costs(cost);
    }

    fn record_new_entities(&mut self, ids: &NewEntityIds) {
        if let Some(vehicle) = ids.vehicle {
            self.new_vehicle_id = vehicle;
        }
        if let Some(sign) = ids.sign {
            self.new_sign_id = sign;
        }
        if let Some(group) = ids.group {
            self.new_group_id = group;
        }
        if let Some(tile) = ids.tunnel_endtile {
            self.new_tunnel_endtile = tile;
        }
    }
}

impl std::fmt::Debug for ScriptContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptContext")
            .field("costs", &self.costs)
            .field("last_cost", &self.last_cost)
            .field("last_error", &self.last_error)
            .field("last_cmd_result", &self.last_cmd_result)
            .field("cmd_delay", &self.cmd_delay)
            .field("allow_do_command", &self.allow_do_command)
            .field("has_mode", &self.mode.is_some())
            .finish_non_exhaustive()
    }
}
