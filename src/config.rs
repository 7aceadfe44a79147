//! User overrides for mirror specs, read from an INI file.
//!
//! ```ini
//! [centos:8.3]
//! hosts = mirrorlist.centos.org, vault.centos.org
//!
//! [epel-repo:9.3-20231120]
//! image = localhost:5000/mirror-packages/epel-repo:9.3-disk
//! mount = /data/mirrors/epel/9.3
//! ```
//!
//! Sections are keyed by an image reference or a `repo:version` pair. Recognized keys
//! are `cname`, `image`, `hosts` (comma list) and `mount`; anything else is ignored.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "DOCKER_MIRROR_CONFIG";
pub const CONFIG_FILE: &str = "docker_mirror.ini";

/// A partial mirror spec. Empty fields leave the computed value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorOverride {
    pub cname: Option<String>,
    pub image: Option<String>,
    pub hosts: Vec<String>,
    pub mount: Option<String>,
}

impl MirrorOverride {
    pub fn is_empty(&self) -> bool {
        self.cname.is_none() && self.image.is_none() && self.hosts.is_empty() && self.mount.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverlay {
    sections: BTreeMap<String, MirrorOverride>,
}

impl ConfigOverlay {
    pub fn empty() -> Self {
        Self::default()
    }

    /// `$DOCKER_MIRROR_CONFIG`, else `docker_mirror.ini` in the user config directory.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Loads overrides from `path`. A missing file yields an empty overlay.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no mirror config at {}", path.display());
            return Ok(Self::empty());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read mirror config {}", path.display()))?;
        let overlay = Self::parse(&text);
        debug!(
            "loaded {} mirror overrides from {}",
            overlay.sections.len(),
            path.display()
        );
        Ok(overlay)
    }

    pub fn parse(text: &str) -> Self {
        let mut sections = BTreeMap::new();
        let mut current: Option<(String, MirrorOverride)> = None;

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[') {
                if let Some((key, entry)) = current.take() {
                    store_section(&mut sections, key, entry);
                }
                match header.strip_suffix(']').map(str::trim) {
                    Some(key) if !key.is_empty() => {
                        current = Some((key.to_string(), MirrorOverride::default()))
                    }
                    _ => warn!("mirror config line {}: bad section header {:?}", number + 1, line),
                }
                continue;
            }
            let Some((_, entry)) = current.as_mut() else {
                warn!("mirror config line {}: entry outside of a section", number + 1);
                continue;
            };
            let Some((name, value)) = line.split_once('=').or_else(|| line.split_once(':')) else {
                warn!("mirror config line {}: expected key = value", number + 1);
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match name.trim() {
                "cname" => entry.cname = Some(value.to_string()),
                "image" => entry.image = Some(value.to_string()),
                "mount" => entry.mount = Some(value.to_string()),
                "hosts" => {
                    entry.hosts = value
                        .split(',')
                        .map(str::trim)
                        .filter(|host| !host.is_empty())
                        .map(String::from)
                        .collect()
                }
                other => debug!("mirror config line {}: ignoring {:?}", number + 1, other),
            }
        }
        if let Some((key, entry)) = current.take() {
            store_section(&mut sections, key, entry);
        }

        Self { sections }
    }

    pub fn get(&self, key: &str) -> Option<&MirrorOverride> {
        self.sections.get(key)
    }

    /// Sections whose key starts with `prefix`, in key order.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a MirrorOverride)> + 'a {
        self.sections
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn store_section(sections: &mut BTreeMap<String, MirrorOverride>, key: String, entry: MirrorOverride) {
    if entry.is_empty() {
        warn!("mirror config section [{}] sets none of cname/image/hosts/mount", key);
        return;
    }
    sections.insert(key, entry);
}
