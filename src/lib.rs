pub mod catalog;
pub mod config;
pub mod facade;
pub mod lifecycle;
pub mod notifier;
pub mod os_release;
pub mod probe;
pub mod runtime;
pub mod versions;

// Re-exports for easy access
pub use catalog::{Family, MirrorCatalog, MirrorOptions, MirrorSpec};
pub use config::{ConfigOverlay, MirrorOverride};
pub use facade::{add_host_args, MirrorFacade, StartReport};
pub use lifecycle::{ContainerLifecycle, ContainerState, ContainerStatus, StopOutcome};
pub use notifier::Notifier;
pub use probe::ReadinessProbe;
pub use runtime::{ContainerRuntime, DockerRuntime};
pub use versions::{resolve_version, Distro};
