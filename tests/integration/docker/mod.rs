//! Docker integration tests
//!
//! Tags a small web server image as a centos mirror and drives the full
//! start → start again → stop cycle against the local docker daemon.

#[cfg(all(test, feature = "docker"))]
mod tests {
    use crate::integration::common::*;
    use docker_mirror::runtime::ContainerRuntime;
    use docker_mirror::{
        ConfigOverlay, DockerRuntime, MirrorFacade, Notifier, ReadinessProbe,
    };
    use std::process::Command;
    use std::time::Duration;

    fn docker(args: &[&str]) -> bool {
        Command::new("docker")
            .args(args)
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn facade() -> MirrorFacade<DockerRuntime> {
        MirrorFacade::new(DockerRuntime::new(), ConfigOverlay::empty(), Notifier::new(1))
            .with_repo_prefix(TEST_REPO_PREFIX)
            .with_probe(Some(
                ReadinessProbe::new(10).with_timing(Duration::from_secs(1), Duration::from_millis(500)),
            ))
    }

    #[test]
    fn test_docker_start_is_idempotent_and_stop_removes() {
        let mirror_image = format!("{}/centos-repo:7.9", TEST_REPO_PREFIX);
        assert!(docker(&["pull", MIRROR_STANDIN_IMAGE]), "Should pull {}", MIRROR_STANDIN_IMAGE);
        assert!(docker(&["tag", MIRROR_STANDIN_IMAGE, &mirror_image]), "Should tag stand-in");

        let facade = facade();
        let runtime = DockerRuntime::new();

        let report = facade.start(Some("centos:7")).expect("Should start the mirror");
        assert!(report.is_complete(), "Mirror should be reachable: {:?}", report);

        let first_id = runtime
            .inspect("centos-repo-7.9")
            .expect("Should inspect")
            .expect("Container should exist")["Id"]
            .clone();

        let again = facade.start(Some("centos:7.9")).expect("Should start again");
        assert_eq!(again.addresses, report.addresses);
        let second_id = runtime
            .inspect("centos-repo-7.9")
            .expect("Should inspect")
            .expect("Container should exist")["Id"]
            .clone();
        assert_eq!(first_id, second_id, "Second start should keep the container");

        let stopped = facade.stop(Some("centos:7")).expect("Should stop");
        assert_ne!(stopped["centos-repo-7.9"], "(did not exist)");

        let stopped = facade.stop(Some("centos:7")).expect("Should stop again");
        assert_eq!(stopped["centos-repo-7.9"], "(did not exist)");

        docker(&["rmi", &mirror_image]);
    }

    #[test]
    fn test_docker_missing_mirror_image() {
        let facade = facade();
        let report = facade
            .start(Some("opensuse/leap:15.6"))
            .expect("Missing image is not an error");
        assert_eq!(report.addresses["opensuse-repo-15.6"], None);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_docker_inspect_nonexistent() {
        let runtime = DockerRuntime::new();
        let found = runtime
            .inspect(NONEXISTENT_IMAGE)
            .expect("Unknown objects should not be an error");
        assert!(found.is_none());
    }
}
