//! In-memory runtime that records every mutating call.

use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::ContainerRuntime;

pub const STARTED_AT: &str = "2024-05-06T07:08:09.123456789Z";

#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub image_id: String,
    pub running: bool,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeRun {
    pub name: String,
    pub image: String,
    pub mount: Option<PathBuf>,
}

/// A single runtime operation that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeOp {
    Inspect,
    Run,
    Remove,
    ListImages,
}

#[derive(Debug, Default)]
struct FakeState {
    images: BTreeMap<String, String>,
    containers: BTreeMap<String, FakeContainer>,
    runs: Vec<FakeRun>,
    removes: Vec<String>,
    broken: bool,
    failing: Vec<FakeOp>,
}

#[derive(Debug, Default)]
pub struct FakeRuntime {
    state: RefCell<FakeState>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, reference: &str, id: &str) -> Self {
        self.state
            .borrow_mut()
            .images
            .insert(reference.to_string(), id.to_string());
        self
    }

    pub fn with_container(self, name: &str, image_id: &str, running: bool) -> Self {
        self.state.borrow_mut().containers.insert(
            name.to_string(),
            FakeContainer {
                image_id: image_id.to_string(),
                running,
                address: "172.17.0.99".to_string(),
            },
        );
        self
    }

    /// Every call fails from now on, as if the daemon went away.
    pub fn break_down(&self) {
        self.state.borrow_mut().broken = true;
    }

    /// Only `op` fails from now on; everything else keeps working.
    pub fn fail_on(&self, op: FakeOp) {
        self.state.borrow_mut().failing.push(op);
    }

    pub fn retag(&self, reference: &str, id: &str) {
        self.state
            .borrow_mut()
            .images
            .insert(reference.to_string(), id.to_string());
    }

    pub fn runs(&self) -> Vec<FakeRun> {
        self.state.borrow().runs.clone()
    }

    pub fn run_count(&self) -> usize {
        self.state.borrow().runs.len()
    }

    pub fn remove_count(&self) -> usize {
        self.state.borrow().removes.len()
    }

    pub fn container(&self, name: &str) -> Option<FakeContainer> {
        self.state.borrow().containers.get(name).cloned()
    }

    fn check(&self, op: FakeOp) -> Result<()> {
        let state = self.state.borrow();
        if state.broken {
            return Err(anyhow!("Cannot connect to the Docker daemon"));
        }
        if state.failing.contains(&op) {
            return Err(anyhow!("{:?} failed: device or resource busy", op));
        }
        Ok(())
    }
}

impl ContainerRuntime for FakeRuntime {
    fn name(&self) -> &str {
        "fake"
    }

    fn inspect(&self, target: &str) -> Result<Option<Value>> {
        self.check(FakeOp::Inspect)?;
        let state = self.state.borrow();
        if let Some(container) = state.containers.get(target) {
            let status = if container.running { "running" } else { "exited" };
            return Ok(Some(json!({
                "Id": format!("{}-id", target),
                "Name": format!("/{}", target),
                "Image": container.image_id,
                "State": { "Status": status, "StartedAt": STARTED_AT },
                "NetworkSettings": { "IPAddress": container.address },
            })));
        }
        if let Some(id) = state.images.get(target) {
            return Ok(Some(json!({ "Id": id, "RepoTags": [target] })));
        }
        Ok(None)
    }

    fn run_detached(&self, name: &str, image: &str, mount: Option<&Path>) -> Result<()> {
        self.check(FakeOp::Run)?;
        let mut state = self.state.borrow_mut();
        state.runs.push(FakeRun {
            name: name.to_string(),
            image: image.to_string(),
            mount: mount.map(Path::to_path_buf),
        });
        let image_id = state
            .images
            .get(image)
            .cloned()
            .ok_or_else(|| anyhow!("Unable to find image '{}' locally", image))?;
        if state.containers.contains_key(name) {
            return Err(anyhow!("Conflict. The container name \"/{}\" is already in use", name));
        }
        let address = format!("172.17.0.{}", state.runs.len() + 1);
        state.containers.insert(
            name.to_string(),
            FakeContainer {
                image_id,
                running: true,
                address,
            },
        );
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.check(FakeOp::Remove)?;
        let mut state = self.state.borrow_mut();
        state.removes.push(name.to_string());
        match state.containers.remove(name) {
            Some(_) => Ok(()),
            None => Err(anyhow!("No such container: {}", name)),
        }
    }

    fn list_images(&self, repository: &str) -> Result<Vec<String>> {
        self.check(FakeOp::ListImages)?;
        let prefix = format!("{}:", repository);
        Ok(self
            .state
            .borrow()
            .images
            .keys()
            .filter(|reference| reference.starts_with(&prefix))
            .cloned()
            .collect())
    }
}
