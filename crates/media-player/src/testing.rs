//! Scripted engine used by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::bus::EventBus;
use crate::engine::{EngineState, PipelineEngine, PipelineHandle, StateChangeReturn, SubscriptionId};

/// Shared record of what the controller asked the engine to do.
#[derive(Debug, Default)]
pub(crate) struct Script {
    pub fail_create: bool,
    pub fail_connect: bool,
    pub fail_build: bool,
    /// Queued results per target; targets without entries succeed.
    pub results: HashMap<EngineState, VecDeque<StateChangeReturn>>,
    pub requested: Vec<EngineState>,
    pub descriptions: Vec<String>,
    pub buses_built: u64,
    pub releases: u64,
    pub connected: Vec<SubscriptionId>,
    pub disconnected: Vec<SubscriptionId>,
    pub last_bus: Option<EventBus>,
}

impl Script {
    pub fn push_result(&mut self, target: EngineState, ret: StateChangeReturn) {
        self.results.entry(target).or_default().push_back(ret);
    }
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedEngine {
    pub script: Arc<Mutex<Script>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = self.script.lock().unwrap();
        f(&mut script)
    }

    pub fn last_bus(&self) -> EventBus {
        self.with(|s| s.last_bus.clone()).expect("no bus built yet")
    }
}

impl PipelineEngine for ScriptedEngine {
    fn create_player(&self) -> Option<Box<dyn PipelineHandle>> {
        if self.with(|s| s.fail_create) {
            return None;
        }
        Some(Box::new(ScriptedPipeline {
            script: self.script.clone(),
        }))
    }
}

struct ScriptedPipeline {
    script: Arc<Mutex<Script>>,
}

impl PipelineHandle for ScriptedPipeline {
    fn connect_messages(&mut self) -> Option<SubscriptionId> {
        let mut s = self.script.lock().unwrap();
        if s.fail_connect {
            return None;
        }
        let id = SubscriptionId(s.connected.len() as u64 + 1);
        s.connected.push(id);
        Some(id)
    }

    fn disconnect_messages(&mut self, id: SubscriptionId) {
        self.script.lock().unwrap().disconnected.push(id);
    }

    fn build(&mut self, description: &str) -> Option<EventBus> {
        let mut s = self.script.lock().unwrap();
        s.descriptions.push(description.to_string());
        if s.fail_build {
            return None;
        }
        let bus = EventBus::new();
        s.buses_built += 1;
        s.last_bus = Some(bus.clone());
        Some(bus)
    }

    fn set_state(&mut self, target: EngineState) -> StateChangeReturn {
        let mut s = self.script.lock().unwrap();
        s.requested.push(target);
        s.results
            .get_mut(&target)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(StateChangeReturn::Success)
    }

    fn release(&mut self) {
        self.script.lock().unwrap().releases += 1;
    }
}
