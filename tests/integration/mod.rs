//! Integration tests for docker-mirror
//!
//! Tests in this tree talk to a real container runtime and are only compiled with
//! the matching cargo feature (`--features docker`).

pub mod common;
pub mod docker;
