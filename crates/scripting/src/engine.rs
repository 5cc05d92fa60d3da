//! Engine-facing interfaces
//!
//! The script core never owns world state or runs commands itself. The
//! surrounding engine provides these traits; every script instance holds
//! one [`EngineHooks`] bundle.

use scriptapi_core::{
    CompanyID, EngineErrorCode, GroupID, InstanceId, Money, Owner, SignID, TileIndex, VehicleID,
    WaypointID,
};
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};
use std::sync::Arc;

/// Host scripting runtime hooks
pub trait HostRuntime: Send + Sync {
    /// Whether the runtime is at a point where the running script may yield
    fn can_suspend(&self) -> bool;

    /// Park `instance` for `ticks`; the host calls
    /// [`ScriptInstance::resume`](crate::ScriptInstance::resume) when it reschedules it.
    fn suspend(&self, instance: InstanceId, ticks: u32);
}

/// Engine command dispatcher
pub trait CommandDispatcher: Send + Sync {
    /// Submit a command on behalf of the current company.
    ///
    /// With `estimate_only` set the dispatcher must compute the cost without
    /// touching the world and return [`Submission::Completed`].
    fn submit(&self, request: &CommandRequest, estimate_only: bool) -> Submission;
}

/// Read-only world queries
pub trait WorldQuery: Send + Sync {
    /// Company the engine is currently acting for
    fn current_company(&self) -> CompanyID;

    fn waypoints(&self) -> Box<dyn Iterator<Item = Waypoint> + '_>;

    fn vehicle(&self, id: VehicleID) -> Option<Vehicle>;
}

/// Everything an instance needs from the engine
#[derive(Clone)]
pub struct EngineHooks {
    pub host: Arc<dyn HostRuntime>,
    pub dispatcher: Arc<dyn CommandDispatcher>,
    pub world: Arc<dyn WorldQuery>,
}

/// A raw engine command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub tile: TileIndex,
    pub p1: u32,
    pub p2: u32,
    pub cmd: u32,
    pub text: Option<String>,
}

impl CommandRequest {
    pub fn new(tile: TileIndex, p1: u32, p2: u32, cmd: u32) -> Self {
        Self {
            tile,
            p1,
            p2,
            cmd,
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Entities a construction command created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewEntityIds {
    pub vehicle: Option<VehicleID>,
    pub sign: Option<SignID>,
    pub group: Option<GroupID>,
    pub tunnel_endtile: Option<TileIndex>,
}

/// Outcome of one executed (or estimated) command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub cost: Money,
    pub error: Option<EngineErrorCode>,
    pub new_ids: NewEntityIds,
}

impl CommandResult {
    pub fn succeeded(cost: Money) -> Self {
        Self {
            success: true,
            cost,
            error: None,
            new_ids: NewEntityIds::default(),
        }
    }

    pub fn failed(error: EngineErrorCode) -> Self {
        Self {
            success: false,
            cost: 0,
            error: Some(error),
            new_ids: NewEntityIds::default(),
        }
    }

    pub fn with_new_ids(mut self, new_ids: NewEntityIds) -> Self {
        self.new_ids = new_ids;
        self
    }
}

/// What the dispatcher did with a submitted command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Finished synchronously
    Completed(CommandResult),

    /// Accepted; the engine reports the result later through
    /// [`ScriptInstance::complete_command`](crate::ScriptInstance::complete_command)
    Pending,
}

/// Station facility bitset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StationFacilities(pub u8);

impl StationFacilities {
    pub const NONE: Self = Self(0x00);
    pub const TRAIN: Self = Self(0x01);
    pub const TRUCK_STOP: Self = Self(0x02);
    pub const BUS_STOP: Self = Self(0x04);
    pub const AIRPORT: Self = Self(0x08);
    pub const DOCK: Self = Self(0x10);

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for StationFacilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for StationFacilities {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Engine view of one waypoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waypoint {
    pub id: WaypointID,
    pub facilities: StationFacilities,
    pub owner: Owner,
}

/// Order kinds in a vehicle's order chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Nothing,
    GotoStation,
    GotoDepot,
    Loading,
    LeaveStation,
    Dummy,
    GotoWaypoint,
    Conditional,
    Implicit,
}

/// One entry of an order chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub kind: OrderType,
    /// Station, depot or waypoint index depending on `kind`
    pub destination: u16,
}

impl Order {
    pub fn new(kind: OrderType, destination: u16) -> Self {
        Self { kind, destination }
    }

    pub fn is_type(&self, kind: OrderType) -> bool {
        self.kind == kind
    }
}

/// Engine view of one vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: VehicleID,
    pub owner: Owner,
    /// Front engine / lead vehicle (articulated parts and wagons are not)
    pub is_primary: bool,
    pub orders: Vec<Order>,
}
