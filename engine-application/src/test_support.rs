// Shared fixtures for command tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use engine_domain::ports::StoreGateway;
use engine_domain::{ActionRow, DetectionConfig, DeviceRow, IpRow, SuspiciousActivityRow};

use crate::EngineState;

/// Gateway double that records writes synchronously instead of spawning.
pub struct RecordingGateway {
    pub actions: Mutex<Vec<ActionRow>>,
    pub suspicious: Mutex<Vec<SuspiciousActivityRow>>,
    pub devices: Mutex<Vec<DeviceRow>>,
    pub ips: Mutex<Vec<IpRow>>,
    pub prunes: Mutex<Vec<i64>>,
    pub store_ok: bool,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
            suspicious: Mutex::new(Vec::new()),
            devices: Mutex::new(Vec::new()),
            ips: Mutex::new(Vec::new()),
            prunes: Mutex::new(Vec::new()),
            store_ok: true,
        }
    }
}

#[async_trait]
impl StoreGateway for RecordingGateway {
    fn spawn_action(&self, row: ActionRow) {
        self.actions.lock().expect("lock").push(row);
    }

    fn spawn_suspicious(&self, row: SuspiciousActivityRow) {
        self.suspicious.lock().expect("lock").push(row);
    }

    fn spawn_device_upsert(&self, row: DeviceRow) {
        self.devices.lock().expect("lock").push(row);
    }

    fn spawn_ip_upsert(&self, row: IpRow) {
        self.ips.lock().expect("lock").push(row);
    }

    fn spawn_prune(&self, cutoff_ms: i64) {
        self.prunes.lock().expect("lock").push(cutoff_ms);
    }

    async fn load_device(&self, _fingerprint: &str) -> Option<DeviceRow> {
        None
    }

    async fn load_ip(&self, _address: &str) -> Option<IpRow> {
        None
    }

    async fn check_store(&self) -> bool {
        self.store_ok
    }
}

pub fn state_with_recorder() -> (EngineState, Arc<RecordingGateway>) {
    let recorder = Arc::new(RecordingGateway::default());
    let state = EngineState::new(DetectionConfig::default(), recorder.clone());
    (state, recorder)
}
