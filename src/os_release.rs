//! Detecting the image that matches the local system.

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

static RELEASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"release (\d+[.]\d+)").unwrap());

/// `distro:version` of the system below `root`, e.g. `opensuse/leap:15.6`.
///
/// Reads `etc/os-release`, then `etc/redhat-release` and `etc/centos-release`;
/// a later file overrides what an earlier one found.
pub fn local_system(root: &Path) -> Option<String> {
    let mut distro = String::new();
    let mut version = String::new();

    if let Ok(text) = fs::read_to_string(root.join("etc/os-release")) {
        for (key, value) in os_release_pairs(&text) {
            match key {
                "ID" => distro = value.replace('-', "/"),
                "VERSION_ID" => version = value.to_string(),
                _ => {}
            }
        }
    }
    for (file, name) in [("etc/redhat-release", "rhel"), ("etc/centos-release", "centos")] {
        if let Ok(text) = fs::read_to_string(root.join(file)) {
            if let Some(caps) = RELEASE.captures(&text) {
                distro = name.to_string();
                version = caps[1].to_string();
            }
        }
    }

    info!(":: local_system {}:{}", distro, version);
    if distro.is_empty() || version.is_empty() {
        return None;
    }
    Some(format!("{}:{}", distro, version))
}

/// `KEY=value` and `KEY="value"` lines; everything else is skipped.
fn os_release_pairs(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines().filter_map(|line| {
        let (key, value) = line.trim().split_once('=')?;
        if key.is_empty() || !key.chars().all(|c| c == '_' || c.is_ascii_alphanumeric()) {
            debug!("os-release: skipping {:?}", line);
            return None;
        }
        let value = match value.strip_prefix('"') {
            Some(quoted) => quoted.split('"').next().unwrap_or(quoted),
            None => value,
        };
        Some((key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn system(files: &[(&str, &str)]) -> Option<String> {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("etc")).unwrap();
        for (name, content) in files {
            fs::write(root.path().join(name), content).unwrap();
        }
        local_system(root.path())
    }

    #[test]
    fn test_ubuntu() {
        assert_eq!(
            system(&[(
                "etc/os-release",
                "NAME=\"Ubuntu\"\nVERSION=\"24.04 LTS (Noble Numbat)\"\nID=ubuntu\nVERSION_ID=\"24.04\"\n"
            )])
            .as_deref(),
            Some("ubuntu:24.04")
        );
    }

    #[test]
    fn test_opensuse_leap_id() {
        assert_eq!(
            system(&[(
                "etc/os-release",
                "ID=\"opensuse-leap\"\nVERSION_ID=\"15.6\"\n"
            )])
            .as_deref(),
            Some("opensuse/leap:15.6")
        );
    }

    #[test]
    fn test_centos_release_wins() {
        assert_eq!(
            system(&[
                ("etc/os-release", "ID=\"centos\"\nVERSION_ID=\"7\"\n"),
                ("etc/redhat-release", "CentOS Linux release 7.9.2009 (Core)\n"),
                ("etc/centos-release", "CentOS Linux release 7.9.2009 (Core)\n"),
            ])
            .as_deref(),
            Some("centos:7.9")
        );
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(system(&[]), None);
        assert_eq!(system(&[("etc/os-release", "ID=alpine\n")]), None);
    }
}
