use anyhow::Result;
use serde_json::Value;
use std::path::Path;

/// Where a host mirror directory is bind-mounted inside the mirror container.
pub const MOUNT_TARGET: &str = "/srv/repo";

/// Operations the mirror engine needs from a container runtime.
///
/// Implementations report failures as `Err`; callers decide whether a failure is fatal.
/// No implementation may cache state: every call asks the runtime again.
pub trait ContainerRuntime {
    /// Returns the name of the runtime for identification purposes
    fn name(&self) -> &str;

    /// Inspects a container name or image reference.
    ///
    /// Returns the first inspect object, or `None` if the runtime has no such object.
    fn inspect(&self, target: &str) -> Result<Option<Value>>;

    /// Creates and starts a detached container `name` from `image`, optionally
    /// bind-mounting the host directory `mount` at [`MOUNT_TARGET`].
    fn run_detached(&self, name: &str, image: &str, mount: Option<&Path>) -> Result<()>;

    /// Force-removes the container `name`, stopping it first if it runs.
    fn remove(&self, name: &str) -> Result<()>;

    /// Lists locally cached images of `repository` as `name:tag` references.
    fn list_images(&self, repository: &str) -> Result<Vec<String>>;
}
