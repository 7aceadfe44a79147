//! The container runtime boundary.
//!
//! Everything the mirror engine needs from a container engine goes through
//! [`ContainerRuntime`]: inspect, run detached, force-remove, and list images.
//! [`DockerRuntime`] drives any docker-compatible CLI (docker, podman, nerdctl).

mod container_runtime;
mod docker;
#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

pub use container_runtime::{ContainerRuntime, MOUNT_TARGET};
pub use docker::DockerRuntime;
