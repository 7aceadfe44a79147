//! The operations behind the command line: detect, facts, start, stop, info,
//! inspect, containers and add-hosts.
//!
//! Each operation resolves the image through the [`MirrorCatalog`] and then works
//! through the mirrors one by one. Only configuration errors (an EPEL mirror that
//! cannot be selected, no image and nothing detected) are returned as `Err`; an
//! unavailable mirror shows up as a missing address.

use anyhow::{anyhow, Result};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::{MirrorCatalog, MirrorOptions, MirrorSpec};
use crate::config::ConfigOverlay;
use crate::lifecycle::ContainerLifecycle;
use crate::notifier::Notifier;
use crate::os_release;
use crate::probe::ReadinessProbe;
use crate::runtime::ContainerRuntime;

/// Result of [`MirrorFacade::start`].
#[derive(Debug, Clone, Serialize)]
pub struct StartReport {
    pub specs: Vec<MirrorSpec>,
    /// Container name → address, `None` where no mirror could be started.
    pub addresses: BTreeMap<String, Option<String>>,
    /// Mirrors that started but never accepted a connection.
    pub unreachable: usize,
}

impl StartReport {
    pub fn missing(&self) -> usize {
        self.addresses.values().filter(|addr| addr.is_none()).count()
    }

    /// Every mirror has an address and answered the probe.
    pub fn is_complete(&self) -> bool {
        self.missing() == 0 && self.unreachable == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectEntry {
    pub name: String,
    pub image: String,
    pub addr: String,
}

/// `--add-host host:addr` pairs for every mirror with a known address.
pub fn add_host_args(specs: &[MirrorSpec], addresses: &BTreeMap<String, Option<String>>) -> Vec<String> {
    let mut args = Vec::new();
    for spec in specs {
        let Some(Some(addr)) = addresses.get(&spec.name) else {
            continue;
        };
        for host in &spec.hosts {
            args.push("--add-host".to_string());
            args.push(format!("{}:{}", host, addr));
        }
    }
    args
}

pub struct MirrorFacade<R: ContainerRuntime> {
    runtime: R,
    overlay: ConfigOverlay,
    notifier: Notifier,
    options: MirrorOptions,
    repo_prefix: Option<String>,
    probe: Option<ReadinessProbe>,
    root: PathBuf,
}

impl<R: ContainerRuntime> MirrorFacade<R> {
    pub fn new(runtime: R, overlay: ConfigOverlay, notifier: Notifier) -> Self {
        Self {
            runtime,
            overlay,
            notifier,
            options: MirrorOptions::default(),
            repo_prefix: None,
            probe: Some(ReadinessProbe::default()),
            root: PathBuf::from("/"),
        }
    }

    pub fn with_options(mut self, options: MirrorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_repo_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.repo_prefix = Some(prefix.into());
        self
    }

    /// `None` skips waiting for started mirrors.
    pub fn with_probe(mut self, probe: Option<ReadinessProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Filesystem root used to detect the local system.
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = root.as_ref().to_path_buf();
        self
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    fn catalog(&self) -> MirrorCatalog<'_, R> {
        let catalog = MirrorCatalog::new(&self.runtime, &self.overlay).with_options(self.options);
        match &self.repo_prefix {
            Some(prefix) => catalog.with_repo_prefix(prefix.clone()),
            None => catalog,
        }
    }

    fn lifecycle(&self) -> ContainerLifecycle<'_, R> {
        ContainerLifecycle::new(&self.runtime)
    }

    fn image_or_local(&self, image: Option<&str>) -> Result<String> {
        match image.filter(|image| !image.is_empty()) {
            Some(image) => Ok(image.to_string()),
            None => os_release::local_system(&self.root).ok_or_else(|| {
                anyhow!(
                    "Cannot detect the local system below {}; pass an image like centos:8",
                    self.root.display()
                )
            }),
        }
    }

    fn mirrors(&self, image: Option<&str>) -> Result<Vec<MirrorSpec>> {
        let image = self.image_or_local(image)?;
        let specs = self.catalog().mirrors_for(&image)?;
        debug!("{} mirror(s) for {}", specs.len(), image);
        Ok(specs)
    }

    /// The canonical image reference for `image` or the local system.
    pub fn detect(&self, image: Option<&str>) -> Result<String> {
        let image = self.image_or_local(image)?;
        Ok(self.catalog().canonical_image(&image))
    }

    /// Container name → the [`MirrorSpec`] it would be started from.
    pub fn facts(&self, image: Option<&str>) -> Result<BTreeMap<String, MirrorSpec>> {
        Ok(self
            .mirrors(image)?
            .into_iter()
            .map(|spec| (spec.name.clone(), spec))
            .collect())
    }

    /// Starts (or keeps) every mirror and waits for them to answer.
    pub fn start(&self, image: Option<&str>) -> Result<StartReport> {
        let specs = self.mirrors(image)?;
        let lifecycle = self.lifecycle();

        let mut addresses = BTreeMap::new();
        for spec in &specs {
            let address = lifecycle.ensure_running(spec);
            info!("{} -> {}", spec.name, address.as_deref().unwrap_or("(none)"));
            addresses.insert(spec.name.clone(), address);
        }

        let unreachable = match &self.probe {
            Some(probe) => probe.wait_ready(&addresses, &self.notifier),
            None => 0,
        };

        Ok(StartReport {
            specs,
            addresses,
            unreachable,
        })
    }

    /// Container name → last start time, or why there was nothing to stop.
    pub fn stop(&self, image: Option<&str>) -> Result<BTreeMap<String, String>> {
        let lifecycle = self.lifecycle();
        Ok(self
            .mirrors(image)?
            .iter()
            .map(|spec| (spec.name.clone(), lifecycle.stop(spec).to_string()))
            .collect())
    }

    /// Container name → current address, without starting anything.
    pub fn info(&self, image: Option<&str>) -> Result<BTreeMap<String, Option<String>>> {
        let lifecycle = self.lifecycle();
        Ok(self
            .mirrors(image)?
            .iter()
            .map(|spec| (spec.name.clone(), lifecycle.inspect_address(&spec.name)))
            .collect())
    }

    pub fn inspect(&self, image: Option<&str>) -> Result<Vec<InspectEntry>> {
        let lifecycle = self.lifecycle();
        Ok(self
            .mirrors(image)?
            .into_iter()
            .map(|spec| InspectEntry {
                addr: lifecycle.inspect_address(&spec.name).unwrap_or_default(),
                name: spec.name,
                image: spec.image,
            })
            .collect())
    }

    pub fn containers(&self, image: Option<&str>) -> Result<Vec<String>> {
        Ok(self
            .mirrors(image)?
            .into_iter()
            .map(|spec| spec.name)
            .collect())
    }

    /// `--add-host` arguments for the mirrors that are running now.
    pub fn add_hosts(&self, image: Option<&str>) -> Result<Vec<String>> {
        let specs = self.mirrors(image)?;
        let lifecycle = self.lifecycle();
        let addresses: BTreeMap<String, Option<String>> = specs
            .iter()
            .map(|spec| (spec.name.clone(), lifecycle.inspect_address(&spec.name)))
            .collect();
        Ok(add_host_args(&specs, &addresses))
    }
}
