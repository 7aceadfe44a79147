use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};

use super::{ContainerRuntime, MOUNT_TARGET};

pub const DOCKER_ENV: &str = "DOCKER_EXE";

/// Docker CLI implementation of the ContainerRuntime trait
///
/// Works with any binary that speaks the docker command line (`podman`, `nerdctl`).
pub struct DockerRuntime {
    binary: String,
}

impl DockerRuntime {
    pub fn new() -> Self {
        Self::with_binary("docker")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// `$DOCKER_EXE` if set, plain `docker` otherwise.
    pub fn from_env() -> Self {
        match std::env::var(DOCKER_ENV) {
            Ok(binary) if !binary.is_empty() => Self::with_binary(binary),
            _ => Self::new(),
        }
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        info!(": {} {}", self.binary, args.join(" "));
        Command::new(&self.binary)
            .args(args)
            .output()
            .context(format!(
                "Failed to execute {} command: {:?}. Is it installed?",
                self.binary, args
            ))
    }

    fn run_command(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("{} command failed: {}", self.binary, error.trim()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        Ok(stdout)
    }
}

impl Default for DockerRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for DockerRuntime {
    fn name(&self) -> &str {
        &self.binary
    }

    fn inspect(&self, target: &str) -> Result<Option<Value>> {
        let output = self.output(&["inspect", target])?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let found: Vec<Value> = if stdout.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&stdout)
                .context(format!("Failed to parse {} inspect {}", self.binary, target))?
        };

        if !output.status.success() && found.is_empty() {
            let error = String::from_utf8_lossy(&output.stderr);
            if error.to_lowercase().contains("no such") {
                debug!("{} inspect {}: not found", self.binary, target);
                return Ok(None);
            }
            return Err(anyhow!(
                "{} inspect {} failed: {}",
                self.binary,
                target,
                error.trim()
            ));
        }

        Ok(found.into_iter().next())
    }

    fn run_detached(&self, name: &str, image: &str, mount: Option<&Path>) -> Result<()> {
        let volume = mount.map(|path| format!("{}:{}", path.display(), MOUNT_TARGET));

        let mut args = vec!["run", "--rm=true", "--detach", "--name", name];
        if let Some(volume) = volume.as_deref() {
            args.push("--volume");
            args.push(volume);
        }
        args.push(image);

        let id = self.run_command(&args)?;
        debug!("started {} as {}", name, id.trim());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.run_command(&["rm", "--force", name])?;
        Ok(())
    }

    fn list_images(&self, repository: &str) -> Result<Vec<String>> {
        let stdout = self.run_command(&[
            "images",
            "--format",
            "{{.Repository}}:{{.Tag}}",
            repository,
        ])?;

        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.ends_with(":<none>"))
            .map(String::from)
            .collect())
    }
}
