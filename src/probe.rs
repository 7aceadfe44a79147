//! Waiting for started mirrors to accept connections.
//!
//! Mirrors are probed one after the other with a plain TCP connect. AlmaLinux and EPEL
//! mirrors are served over TLS and probed on 443, everything else on 80. The plain
//! path gets two attempts fewer so both paths wait about as long in total.
//!
//! A probe never runs longer than `attempts × (connect_timeout + interval)` per mirror.

use log::{debug, warn};
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use crate::notifier::Notifier;

pub const DEFAULT_ATTEMPTS: u32 = 6;
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    attempts: u32,
    connect_timeout: Duration,
    interval: Duration,
    tls_port: u16,
    plain_port: u16,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS)
    }
}

impl ReadinessProbe {
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts,
            connect_timeout: CONNECT_TIMEOUT,
            interval: RETRY_INTERVAL,
            tls_port: 443,
            plain_port: 80,
        }
    }

    pub fn with_timing(mut self, connect_timeout: Duration, interval: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.interval = interval;
        self
    }

    pub fn with_ports(mut self, tls_port: u16, plain_port: u16) -> Self {
        self.tls_port = tls_port;
        self.plain_port = plain_port;
        self
    }

    pub fn uses_tls(name: &str) -> bool {
        name.contains("alma") || name.contains("epel")
    }

    pub fn port_for(&self, name: &str) -> u16 {
        if Self::uses_tls(name) {
            self.tls_port
        } else {
            self.plain_port
        }
    }

    pub fn attempts_for(&self, name: &str) -> u32 {
        if Self::uses_tls(name) {
            self.attempts.max(1)
        } else {
            self.attempts.saturating_sub(2).max(1)
        }
    }

    /// Upper bound of [`ReadinessProbe::wait_ready`] for one mirror.
    pub fn worst_case(&self, name: &str) -> Duration {
        (self.connect_timeout + self.interval) * self.attempts_for(name)
    }

    /// Probes every mirror that has an address. Returns how many stayed unreachable.
    ///
    /// Mirrors without an address are skipped; they were never started.
    pub fn wait_ready(&self, addresses: &BTreeMap<String, Option<String>>, notifier: &Notifier) -> usize {
        addresses
            .iter()
            .filter_map(|(name, address)| address.as_deref().map(|addr| (name, addr)))
            .filter(|(name, address)| !self.wait_one(name, address, notifier))
            .count()
    }

    fn wait_one(&self, name: &str, address: &str, notifier: &Notifier) -> bool {
        let ip: IpAddr = match address.parse() {
            Ok(ip) => ip,
            Err(e) => {
                warn!("{} has no usable address {:?}: {}", name, address, e);
                return false;
            }
        };
        let target = SocketAddr::new(ip, self.port_for(name));
        let attempts = self.attempts_for(name);
        let wait = notifier.wait(&format!("waiting for {} at {}", name, target));

        for attempt in 1..=attempts {
            match TcpStream::connect_timeout(&target, self.connect_timeout) {
                Ok(_) => {
                    debug!("{} at {} is ready after {} attempt(s)", name, target, attempt);
                    return true;
                }
                Err(e) => {
                    wait.update(&format!(
                        "waiting for {} at {} ({}/{}: {})",
                        name, target, attempt, attempts, e
                    ));
                    if attempt < attempts {
                        thread::sleep(self.interval);
                    }
                }
            }
        }

        warn!(
            "{} at {} did not accept connections after {} attempts",
            name, target, attempts
        );
        false
    }
}
