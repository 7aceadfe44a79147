//! Picking the EPEL mirror closest in time to a base release.
//!
//! Release dates are `YYMM` codes: `9.3-20231113` carries `2311`, `7.9.2009` carries
//! `2009`. A candidate dated at or after the base release is preferred (the nearest
//! one); only when none exists does the nearest older candidate win.

use once_cell::sync::Lazy;
use regex::Regex;

use super::naming;

static ALMA_DATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+-\d{2}(\d{4})\d{2,}$").unwrap());
static CENTOS_DATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.(\d{4})$").unwrap());

/// `9.3-20231113` → `2311`: the year+month right after the century digits.
pub fn alma_release_date(version: &str) -> Option<String> {
    ALMA_DATED
        .captures(version)
        .map(|caps| caps[1].to_string())
}

/// `7.9.2009` → `2009`: the third version component.
pub fn centos_release_date(version: &str) -> Option<String> {
    CENTOS_DATED
        .captures(version)
        .map(|caps| caps[1].to_string())
}

pub fn release_date(version: &str) -> Option<String> {
    alma_release_date(version).or_else(|| centos_release_date(version))
}

/// An EPEL mirror that could serve a base release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpelCandidate {
    /// Image reference, or config section key for disk-backed mirrors.
    pub reference: String,
    /// The version tag, e.g. `9.3-20231120`.
    pub version: String,
    /// `YYMM` release date extracted from the version.
    pub created: String,
}

impl EpelCandidate {
    /// Builds a candidate from `name:tag`; `None` if the tag carries no release date.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let (_, tag) = naming::split_tag(reference);
        let version = tag?;
        let created = release_date(version)?;
        Some(Self {
            reference: reference.to_string(),
            version: version.to_string(),
            created,
        })
    }

    pub fn major(&self) -> &str {
        self.version.split('.').next().unwrap_or(&self.version)
    }
}

/// The nearest candidate at or after `refdate`, else the nearest one before it.
///
/// On equal dates the earlier candidate in `candidates` wins.
pub fn select_nearest<'a>(
    refdate: &str,
    candidates: &'a [EpelCandidate],
) -> Option<&'a EpelCandidate> {
    let mut after: Option<&EpelCandidate> = None;
    let mut before: Option<&EpelCandidate> = None;

    for candidate in candidates {
        let created = candidate.created.as_str();
        if created >= refdate {
            if after.map_or(true, |best| created < best.created.as_str()) {
                after = Some(candidate);
            }
        } else if before.map_or(true, |best| created > best.created.as_str()) {
            before = Some(candidate);
        }
    }

    after.or(before)
}
