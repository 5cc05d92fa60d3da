//! # Waypoint Lists
//!
//! List builders over the engine's waypoints. Both read the current
//! company from the engine world; the plain constructors find that world
//! through the active instance.

use crate::engine::{OrderType, StationFacilities, WorldQuery};
use crate::error::Result;
use crate::list::ScriptList;
use crate::object::ScriptObject;
use scriptapi_core::{CompanyID, VehicleID};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Kinds of waypoint a script can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointType {
    /// Rail waypoint
    Rail,

    /// Buoy
    Buoy,

    /// Either of the above
    Any,
}

impl From<WaypointType> for StationFacilities {
    fn from(waypoint_type: WaypointType) -> Self {
        match waypoint_type {
            WaypointType::Rail => StationFacilities::TRAIN,
            WaypointType::Buoy => StationFacilities::DOCK,
            WaypointType::Any => StationFacilities::TRAIN | StationFacilities::DOCK,
        }
    }
}

/// Whether `vehicle_id` names a primary vehicle of the current company
pub fn is_valid_vehicle(world: &dyn WorldQuery, vehicle_id: VehicleID) -> bool {
    world.vehicle(vehicle_id).is_some_and(|vehicle| {
        vehicle.is_primary && vehicle.owner == world.current_company()
    })
}

/// List of waypoint IDs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaypointList {
    list: ScriptList,
}

impl WaypointList {
    /// Waypoints serving `waypoint_type` that belong to the current company or nobody
    pub fn new(waypoint_type: impl Into<StationFacilities>) -> Result<Self> {
        let instance = ScriptObject::active_instance()?;
        Ok(Self::from_world(instance.hooks().world.as_ref(), waypoint_type))
    }

    pub fn from_world(world: &dyn WorldQuery, waypoint_type: impl Into<StationFacilities>) -> Self {
        let facilities = waypoint_type.into();
        let company = world.current_company();

        let list: ScriptList = world
            .waypoints()
            .filter(|wp| wp.facilities.intersects(facilities))
            .filter(|wp| wp.owner == company || wp.owner == CompanyID::OWNER_NONE)
            .map(|wp| i64::from(wp.id.get()))
            .collect();

        tracing::trace!("Built waypoint list for company {}", company);
        Self { list }
    }

    /// Waypoints in the order chain of `vehicle_id`.
    ///
    /// Empty when the vehicle is invalid or owned by another company.
    pub fn for_vehicle(vehicle_id: VehicleID) -> Result<Self> {
        let instance = ScriptObject::active_instance()?;
        Ok(Self::for_vehicle_in(instance.hooks().world.as_ref(), vehicle_id))
    }

    pub fn for_vehicle_in(world: &dyn WorldQuery, vehicle_id: VehicleID) -> Self {
        if !is_valid_vehicle(world, vehicle_id) {
            tracing::trace!("Vehicle {} not valid for waypoint list", vehicle_id);
            return Self::default();
        }

        let list: ScriptList = world
            .vehicle(vehicle_id)
            .map(|vehicle| {
                vehicle
                    .orders
                    .iter()
                    .filter(|order| order.is_type(OrderType::GotoWaypoint))
                    .map(|order| i64::from(order.destination))
                    .collect()
            })
            .unwrap_or_default();

        Self { list }
    }

    pub fn into_list(self) -> ScriptList {
        self.list
    }
}

impl Deref for WaypointList {
    type Target = ScriptList;

    fn deref(&self) -> &ScriptList {
        &self.list
    }
}
