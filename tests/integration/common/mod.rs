//! Common utilities for integration tests

/// Small image that stays up and listens on port 80, standing in for a mirror
#[allow(dead_code)]
pub const MIRROR_STANDIN_IMAGE: &str = "nginx:alpine";

/// Prefix under which the stand-in is tagged for the tests
#[allow(dead_code)]
pub const TEST_REPO_PREFIX: &str = "localhost:5000/docker-mirror-test";

#[allow(dead_code)]
/// Image that definitely doesn't exist
pub const NONEXISTENT_IMAGE: &str = "this-image-definitely-does-not-exist:never";
