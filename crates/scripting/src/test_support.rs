//! In-memory engine doubles shared by the unit tests

use crate::engine::{
    CommandDispatcher, CommandRequest, CommandResult, EngineHooks, HostRuntime, NewEntityIds,
    Submission, Vehicle, Waypoint, WorldQuery,
};
use crate::instance::ScriptInstance;
use parking_lot::Mutex;
use scriptapi_config::ScriptConfig;
use scriptapi_core::{CompanyID, EngineErrorCode, InstanceId, Money, VehicleID};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct TestHost {
    safe: AtomicBool,
    suspensions: Mutex<Vec<(InstanceId, u32)>>,
}

impl TestHost {
    pub fn set_safe(&self, safe: bool) {
        self.safe.store(safe, Ordering::Relaxed);
    }

    pub fn suspensions(&self) -> Vec<(InstanceId, u32)> {
        self.suspensions.lock().clone()
    }
}

impl HostRuntime for TestHost {
    fn can_suspend(&self) -> bool {
        self.safe.load(Ordering::Relaxed)
    }

    fn suspend(&self, instance: InstanceId, ticks: u32) {
        self.suspensions.lock().push((instance, ticks));
    }
}

#[derive(Default)]
struct DispatcherState {
    cost: Money,
    failure: Option<EngineErrorCode>,
    pending: bool,
    pending_estimates: bool,
    new_ids: NewEntityIds,
    executed: Vec<CommandRequest>,
    estimated: Vec<CommandRequest>,
}

/// Records every submitted command; only executed ones count as world changes
#[derive(Default)]
pub struct TestDispatcher {
    state: Mutex<DispatcherState>,
}

impl TestDispatcher {
    pub fn set_cost(&self, cost: Money) {
        self.state.lock().cost = cost;
    }

    pub fn fail_with(&self, code: EngineErrorCode) {
        self.state.lock().failure = Some(code);
    }

    pub fn set_pending(&self, pending: bool) {
        self.state.lock().pending = pending;
    }

    /// Defer estimates too, which a well-behaved engine never does
    pub fn set_pending_estimates(&self, pending: bool) {
        self.state.lock().pending_estimates = pending;
    }

    pub fn set_new_ids(&self, new_ids: NewEntityIds) {
        self.state.lock().new_ids = new_ids;
    }

    pub fn executed(&self) -> Vec<CommandRequest> {
        self.state.lock().executed.clone()
    }

    pub fn estimated(&self) -> Vec<CommandRequest> {
        self.state.lock().estimated.clone()
    }
}

impl CommandDispatcher for TestDispatcher {
    fn submit(&self, request: &CommandRequest, estimate_only: bool) -> Submission {
        let mut state = self.state.lock();
        if let Some(code) = state.failure {
            return Submission::Completed(CommandResult::failed(code));
        }

        if estimate_only {
            state.estimated.push(request.clone());
            if state.pending_estimates {
                return Submission::Pending;
            }
            return Submission::Completed(CommandResult::succeeded(state.cost));
        }

        state.executed.push(request.clone());
        if state.pending {
            return Submission::Pending;
        }
        Submission::Completed(CommandResult::succeeded(state.cost).with_new_ids(state.new_ids))
    }
}

pub struct TestWorld {
    company: Mutex<CompanyID>,
    waypoints: Mutex<Vec<Waypoint>>,
    vehicles: Mutex<HashMap<VehicleID, Vehicle>>,
}

impl TestWorld {
    pub fn set_company(&self, company: CompanyID) {
        *self.company.lock() = company;
    }

    pub fn add_waypoint(&self, waypoint: Waypoint) {
        self.waypoints.lock().push(waypoint);
    }

    pub fn add_vehicle(&self, vehicle: Vehicle) {
        self.vehicles.lock().insert(vehicle.id, vehicle);
    }
}

impl WorldQuery for TestWorld {
    fn current_company(&self) -> CompanyID {
        *self.company.lock()
    }

    fn waypoints(&self) -> Box<dyn Iterator<Item = Waypoint> + '_> {
        Box::new(self.waypoints.lock().clone().into_iter())
    }

    fn vehicle(&self, id: VehicleID) -> Option<Vehicle> {
        self.vehicles.lock().get(&id).cloned()
    }
}

/// A host, dispatcher and world wired together
pub struct TestEngine {
    pub host: Arc<TestHost>,
    pub dispatcher: Arc<TestDispatcher>,
    pub world: Arc<TestWorld>,
    pub config: ScriptConfig,
}

impl TestEngine {
    pub fn new() -> Self {
        Self {
            host: Arc::new(TestHost {
                safe: AtomicBool::new(true),
                suspensions: Mutex::new(Vec::new()),
            }),
            dispatcher: Arc::new(TestDispatcher::default()),
            world: Arc::new(TestWorld {
                company: Mutex::new(CompanyID::new(0)),
                waypoints: Mutex::new(Vec::new()),
                vehicles: Mutex::new(HashMap::new()),
            }),
            config: ScriptConfig::default(),
        }
    }

    pub fn hooks(&self) -> EngineHooks {
        EngineHooks {
            host: self.host.clone(),
            dispatcher: self.dispatcher.clone(),
            world: self.world.clone(),
        }
    }

    pub fn instance(&self, id: u32) -> Arc<ScriptInstance> {
        ScriptInstance::new(
            InstanceId::new(id),
            self.world.current_company(),
            self.hooks(),
            &self.config,
        )
    }
}
