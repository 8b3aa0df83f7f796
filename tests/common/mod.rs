//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rgw_healthcheck::probe::{
    InterfaceProber, ProbeError, Probers, ServiceProber, SocketProber, SocketSpec,
};

/// An in-memory host whose state tests can script.
#[derive(Default)]
pub struct FakeHost {
    pub running: Mutex<HashSet<String>>,
    pub enabled: Mutex<HashSet<String>>,
    pub interfaces: Mutex<HashMap<String, Vec<IpAddr>>>,
    pub listening: Mutex<Vec<SocketSpec>>,
    /// Units that report running only after this many `is_running` calls.
    pub starts_after: Mutex<HashMap<String, usize>>,
    /// Every probe sleeps this long first.
    pub delay: Option<Duration>,
    pub probe_calls: AtomicUsize,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host where RGW for `hostname` is running, enabled and listening on `addr:8080`.
    pub fn healthy(hostname: &str, addr: &str) -> Self {
        let host = Self::new();
        let unit = unit_for(hostname);
        host.running.lock().unwrap().insert(unit.clone());
        host.enabled.lock().unwrap().insert(unit);
        let ip: IpAddr = addr.parse().unwrap();
        host.interfaces.lock().unwrap().insert("eth0".into(), vec![ip]);
        host.listening.lock().unwrap().push(SocketSpec::tcp(ip, 8080));
        host
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn stop(&self, unit: &str) {
        self.running.lock().unwrap().remove(unit);
    }

    pub fn disable(&self, unit: &str) {
        self.enabled.lock().unwrap().remove(unit);
    }

    pub fn start_after(&self, unit: &str, polls: usize) {
        self.starts_after.lock().unwrap().insert(unit.into(), polls);
    }

    pub fn set_addresses(&self, interface: &str, addrs: Vec<IpAddr>) {
        self.interfaces.lock().unwrap().insert(interface.into(), addrs);
    }

    pub fn close_all_sockets(&self) {
        self.listening.lock().unwrap().clear();
    }

    pub fn calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
    }
}

impl ServiceProber for FakeHost {
    fn is_running(&self, unit: &str) -> Result<bool, ProbeError> {
        self.enter();
        if let Some(remaining) = self.starts_after.lock().unwrap().get_mut(unit) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(false);
            }
            return Ok(true);
        }
        Ok(self.running.lock().unwrap().contains(unit))
    }

    fn is_enabled(&self, unit: &str) -> Result<bool, ProbeError> {
        self.enter();
        Ok(self.enabled.lock().unwrap().contains(unit))
    }
}

impl InterfaceProber for FakeHost {
    fn addresses(&self, interface: &str) -> Result<Vec<IpAddr>, ProbeError> {
        self.enter();
        self.interfaces
            .lock()
            .unwrap()
            .get(interface)
            .cloned()
            .ok_or_else(|| ProbeError::NotFound {
                kind: "interface",
                name: interface.to_string(),
            })
    }
}

impl SocketProber for FakeHost {
    fn is_listening(&self, spec: &SocketSpec) -> Result<bool, ProbeError> {
        self.enter();
        Ok(self.listening.lock().unwrap().contains(spec))
    }
}

pub fn unit_for(hostname: &str) -> String {
    format!("ceph-radosgw@rgw.ceph-{}", hostname)
}

/// All three capabilities served by one fake host.
pub fn probers(host: Arc<FakeHost>) -> Probers {
    Probers::new(host.clone(), host.clone(), host)
}
