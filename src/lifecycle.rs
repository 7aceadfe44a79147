//! Realizing a [`MirrorSpec`] as a running container.
//!
//! Every decision starts from a fresh inspect of the runtime. Runtime failures are
//! logged and end up as "no address" for that one container; they never abort the
//! other mirrors of the same image.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::catalog::MirrorSpec;
use crate::runtime::ContainerRuntime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Absent,
    Stopped,
    Running,
}

/// What the runtime currently knows about a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    pub name: String,
    pub image_id: Option<String>,
    pub status: ContainerStatus,
    pub address: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

impl ContainerState {
    pub fn absent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            image_id: None,
            status: ContainerStatus::Absent,
            address: None,
            started_at: None,
        }
    }

    /// Reads the fields of a `docker inspect` container object.
    pub fn from_inspect(name: &str, value: serde_json::Value) -> serde_json::Result<Self> {
        let found: ContainerInspect = serde_json::from_value(value)?;

        let status = match found.state.status.as_str() {
            "running" => ContainerStatus::Running,
            _ => ContainerStatus::Stopped,
        };

        let address = Some(found.network_settings.ip_address)
            .filter(|ip| !ip.is_empty())
            .or_else(|| {
                found
                    .network_settings
                    .networks
                    .unwrap_or_default()
                    .into_values()
                    .map(|endpoint| endpoint.ip_address)
                    .find(|ip| !ip.is_empty())
            });

        // docker reports 0001-01-01T00:00:00Z for containers that never started
        let started_at = DateTime::parse_from_rfc3339(&found.state.started_at)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .filter(|dt| dt.year() > 1);

        Ok(Self {
            name: name.to_string(),
            image_id: Some(found.image).filter(|id| !id.is_empty()),
            status,
            address,
            started_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ImageInspect {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct ContainerInspect {
    #[serde(default, rename = "Image")]
    image: String,
    #[serde(default, rename = "State")]
    state: StateInspect,
    #[serde(default, rename = "NetworkSettings")]
    network_settings: NetworkInspect,
}

#[derive(Debug, Default, Deserialize)]
struct StateInspect {
    #[serde(default, rename = "Status")]
    status: String,
    #[serde(default, rename = "StartedAt")]
    started_at: String,
}

#[derive(Debug, Default, Deserialize)]
struct NetworkInspect {
    #[serde(default, rename = "IPAddress")]
    ip_address: String,
    #[serde(default, rename = "Networks")]
    networks: Option<BTreeMap<String, EndpointInspect>>,
}

#[derive(Debug, Default, Deserialize)]
struct EndpointInspect {
    #[serde(default, rename = "IPAddress")]
    ip_address: String,
}

/// Result of stopping one mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    DidNotExist,
    Removed { started_at: Option<DateTime<Utc>> },
    Failed,
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopOutcome::DidNotExist => f.write_str("(did not exist)"),
            StopOutcome::Removed {
                started_at: Some(started),
            } => f.write_str(&started.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            StopOutcome::Removed { started_at: None } => f.write_str("(was not started)"),
            StopOutcome::Failed => f.write_str("(remove failed)"),
        }
    }
}

pub struct ContainerLifecycle<'a, R: ContainerRuntime + ?Sized> {
    runtime: &'a R,
}

impl<'a, R: ContainerRuntime + ?Sized> ContainerLifecycle<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Inspects the container `name`; any failure reads as absent.
    pub fn state(&self, name: &str) -> ContainerState {
        match self.runtime.inspect(name) {
            Ok(Some(value)) => match ContainerState::from_inspect(name, value) {
                Ok(state) => state,
                Err(e) => {
                    warn!("Unexpected {} inspect output for {}: {}", self.runtime.name(), name, e);
                    ContainerState::absent(name)
                }
            },
            Ok(None) => ContainerState::absent(name),
            Err(e) => {
                warn!("Cannot inspect container {}: {:#}", name, e);
                ContainerState::absent(name)
            }
        }
    }

    fn image_id(&self, image: &str) -> Option<String> {
        let value = match self.runtime.inspect(image) {
            Ok(Some(value)) => value,
            Ok(None) => {
                info!("no local mirror image {}", image);
                return None;
            }
            Err(e) => {
                warn!("Cannot inspect image {}: {:#}", image, e);
                return None;
            }
        };
        match serde_json::from_value::<ImageInspect>(value) {
            Ok(found) => Some(found.id),
            Err(e) => {
                warn!("Unexpected {} inspect output for {}: {}", self.runtime.name(), image, e);
                None
            }
        }
    }

    /// Makes sure `spec` runs from the current image and returns its address.
    ///
    /// `None` when the image is not available locally or the runtime fails.
    pub fn ensure_running(&self, spec: &MirrorSpec) -> Option<String> {
        let image_id = self.image_id(&spec.image)?;

        let current = self.state(&spec.name);
        match current.status {
            ContainerStatus::Absent => {}
            ContainerStatus::Running if current.image_id.as_deref() == Some(image_id.as_str()) => {
                debug!("{} already runs {}", spec.name, spec.image);
                return current.address;
            }
            status => {
                info!(
                    "replacing {} ({:?}, image {})",
                    spec.name,
                    status,
                    current.image_id.as_deref().unwrap_or("unknown")
                );
                if let Err(e) = self.runtime.remove(&spec.name) {
                    error!("Cannot remove outdated {}: {:#}", spec.name, e);
                    return None;
                }
            }
        }

        let mount = spec.mount.as_deref().map(Path::new).filter(|path| {
            let exists = path.exists();
            if !exists {
                warn!(
                    "mount {} does not exist, starting {} without it",
                    path.display(),
                    spec.name
                );
            }
            exists
        });

        if let Err(e) = self.runtime.run_detached(&spec.name, &spec.image, mount) {
            error!("Cannot start {} from {}: {:#}", spec.name, spec.image, e);
            return None;
        }

        self.inspect_address(&spec.name)
    }

    /// Removes the mirror container if it exists.
    pub fn stop(&self, spec: &MirrorSpec) -> StopOutcome {
        let current = self.state(&spec.name);
        if current.status == ContainerStatus::Absent {
            return StopOutcome::DidNotExist;
        }
        match self.runtime.remove(&spec.name) {
            Ok(()) => StopOutcome::Removed {
                started_at: current.started_at,
            },
            Err(e) => {
                error!("Cannot remove {}: {:#}", spec.name, e);
                StopOutcome::Failed
            }
        }
    }

    pub fn inspect_address(&self, name: &str) -> Option<String> {
        let address = self.state(name).address;
        match &address {
            Some(addr) => debug!("address {} for {}", addr, name),
            None => debug!("no address for {}", name),
        }
        address
    }
}
