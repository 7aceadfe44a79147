//! Shorthand → canonical version resolution per distro family.
//!
//! Each family owns one immutable [`AliasTable`]. Resolution is total: an input that
//! matches nothing comes back unchanged, and resolving a canonical version again
//! returns it as-is.
//!
//! Matching never crosses tables. Callers that want to try several families (the
//! `epel:` shorthand does) resolve against each table on its own and pick a result.

use std::cmp::Ordering;
use std::fmt;

/// How the entries of an [`AliasTable`] are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    /// `dated release → minor`, e.g. `"7.9.2009" → "7.9"`. Prefixes match the minor,
    /// the minor of the greatest dated release is returned.
    Release,
    /// `version → codename`, e.g. `"24.04" → "noble"`. Prefixes match either side,
    /// the version is returned.
    Codename,
    /// `version → image namespace`, e.g. `"42.3" → "opensuse"`. Prefixes match the
    /// version; `42.x` sorts below `15.x`.
    Leap,
}

#[derive(Debug)]
pub struct AliasTable {
    name: &'static str,
    kind: AliasKind,
    entries: &'static [(&'static str, &'static str)],
}

impl AliasTable {
    pub const fn new(
        name: &'static str,
        kind: AliasKind,
        entries: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            name,
            kind,
            entries,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| *value)
    }

    /// Resolves a shorthand (`"8"`, `"noble"`, `"latest"`) to the canonical version.
    pub fn resolve(&self, shorthand: &str) -> String {
        let wanted = if shorthand == "latest" { "" } else { shorthand };

        if wanted.contains('.') {
            return match (self.kind, self.get(wanted)) {
                (AliasKind::Release, Some(minor)) => minor.to_string(),
                _ => wanted.to_string(),
            };
        }

        let mut latest: Option<(&'static str, &'static str)> = None;
        for &(key, value) in self.entries {
            let matched = match self.kind {
                AliasKind::Release => value.starts_with(wanted),
                AliasKind::Codename => key.starts_with(wanted) || value.starts_with(wanted),
                AliasKind::Leap => key.starts_with(wanted),
            };
            if !matched {
                continue;
            }
            let newer = match latest {
                None => true,
                Some((best, _)) => self.compare_keys(key, best) == Ordering::Greater,
            };
            if newer {
                latest = Some((key, value));
            }
        }

        match latest {
            Some((_, minor)) if self.kind == AliasKind::Release => minor.to_string(),
            Some((key, _)) => key.to_string(),
            None => shorthand.to_string(),
        }
    }

    /// The greatest dated release key whose minor is `minor`.
    ///
    /// Only meaningful for [`AliasKind::Release`] tables; other kinds return `None`.
    pub fn dated_release(&self, minor: &str) -> Option<&'static str> {
        if self.kind != AliasKind::Release {
            return None;
        }
        self.entries
            .iter()
            .filter(|(_, value)| *value == minor)
            .map(|(key, _)| *key)
            .max_by(|a, b| self.compare_keys(a, b))
    }

    fn compare_keys(&self, a: &str, b: &str) -> Ordering {
        match self.kind {
            AliasKind::Leap => compare_releases(&leap_order_key(a), &leap_order_key(b)),
            _ => compare_releases(a, b),
        }
    }
}

/// `42.x` was released before `15.0`; compare it as `14.x`.
fn leap_order_key(version: &str) -> String {
    match version.strip_prefix("42.") {
        Some(rest) => format!("14.{}", rest),
        None => version.to_string(),
    }
}

/// Orders release keys component by component, numeric components numerically.
///
/// For keys of equal component widths this is the same as plain string order.
pub fn compare_releases(a: &str, b: &str) -> Ordering {
    let separators = |c: char| c == '.' || c == '-';
    let mut left = a.split(separators);
    let mut right = b.split(separators);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let order = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                };
                if order != Ordering::Equal {
                    return order;
                }
            }
        }
    }
}

pub static CENTOS: AliasTable = AliasTable::new(
    "centos",
    AliasKind::Release,
    &[
        ("7.0.1406", "7.0"),
        ("7.1.1503", "7.1"),
        ("7.2.1511", "7.2"),
        ("7.3.1611", "7.3"),
        ("7.4.1708", "7.4"),
        ("7.5.1804", "7.5"),
        ("7.6.1810", "7.6"),
        ("7.7.1908", "7.7"),
        ("7.8.2003", "7.8"),
        ("7.9.2009", "7.9"),
        ("8.0.1905", "8.0"),
        ("8.1.1911", "8.1"),
        ("8.2.2004", "8.2"),
        ("8.3.2011", "8.3"),
        ("8.4.2105", "8.4"),
        ("8.5.2111", "8.5"),
    ],
);

pub static ALMALINUX: AliasTable = AliasTable::new(
    "almalinux",
    AliasKind::Release,
    &[
        ("8.3-20210330", "8.3"),
        ("8.4-20210526", "8.4"),
        ("8.5-20211112", "8.5"),
        ("8.6-20220512", "8.6"),
        ("8.7-20221110", "8.7"),
        ("8.8-20230524", "8.8"),
        ("8.9-20231124", "8.9"),
        ("8.10-20240530", "8.10"),
        ("9.0-20220526", "9.0"),
        ("9.1-20221117", "9.1"),
        ("9.2-20230513", "9.2"),
        ("9.3-20231113", "9.3"),
        ("9.4-20240506", "9.4"),
        ("9.5-20241118", "9.5"),
    ],
);

pub static UBUNTU: AliasTable = AliasTable::new(
    "ubuntu",
    AliasKind::Codename,
    &[
        ("12.04", "precise"),
        ("14.04", "trusty"),
        ("16.04", "xenial"),
        ("18.04", "bionic"),
        ("20.04", "focal"),
        ("22.04", "jammy"),
        ("24.04", "noble"),
    ],
);

pub static OPENSUSE: AliasTable = AliasTable::new(
    "opensuse",
    AliasKind::Leap,
    &[
        ("42.2", "opensuse"),
        ("42.3", "opensuse"),
        ("15.0", "opensuse/leap"),
        ("15.1", "opensuse/leap"),
        ("15.2", "opensuse/leap"),
        ("15.3", "opensuse/leap"),
        ("15.4", "opensuse/leap"),
        ("15.5", "opensuse/leap"),
        ("15.6", "opensuse/leap"),
    ],
);

/// Distro families that own an alias table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Distro {
    Centos,
    Almalinux,
    Ubuntu,
    Opensuse,
}

impl Distro {
    pub const ALL: [Distro; 4] = [
        Distro::Centos,
        Distro::Almalinux,
        Distro::Ubuntu,
        Distro::Opensuse,
    ];

    pub fn table(self) -> &'static AliasTable {
        match self {
            Distro::Centos => &CENTOS,
            Distro::Almalinux => &ALMALINUX,
            Distro::Ubuntu => &UBUNTU,
            Distro::Opensuse => &OPENSUSE,
        }
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table().name())
    }
}

pub fn resolve_version(distro: Distro, shorthand: &str) -> String {
    distro.table().resolve(shorthand)
}

/// Drops a date suffix: `"7.9.2009"` and `"9.3-20231113"` both group as `major.minor`.
pub fn major_minor(version: &str) -> String {
    let undated = version.split('-').next().unwrap_or(version);
    let mut parts = undated.splitn(3, '.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => format!("{}.{}", major, minor),
        _ => undated.to_string(),
    }
}
