//! Image reference → mirror containers.
//!
//! [`MirrorCatalog::mirrors_for`] maps an OS image such as `centos:8` to the
//! [`MirrorSpec`]s that have to run so a container of that image can resolve its
//! package traffic locally:
//!
//! - the family is picked from the image name ([`Family::parse`]),
//! - the version is resolved against the family's alias table,
//! - the family rule builds the [`MirrorSpec`] (repo image, container name, redirected hosts),
//! - for CentOS/AlmaLinux with EPEL enabled, the nearest EPEL mirror is appended,
//! - finally user overrides from the [`ConfigOverlay`] are merged in.
//!
//! Nothing here is cached; every call re-reads the runtime's image list.

pub mod epel;
pub mod naming;

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{ConfigOverlay, MirrorOverride};
use crate::runtime::ContainerRuntime;
use crate::versions::{self, AliasTable, Distro};
use epel::EpelCandidate;

pub const DEFAULT_REPO_PREFIX: &str = "localhost:5000/mirror-packages";
pub const REPO_PREFIX_ENV: &str = "DOCKER_MIRROR_REPO";
pub const EPEL_REPO: &str = "epel-repo";
pub const EPEL_HOSTS: &[&str] = &["mirrors.fedoraproject.org"];

/// The container that should run to serve as a mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorSpec {
    /// Container name, unique per repo and version.
    pub name: String,
    pub image: String,
    /// Upstream hostnames the client should resolve to this mirror.
    pub hosts: Vec<String>,
    /// Host directory bind-mounted into the mirror.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
}

impl MirrorSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>, hosts: &[&str]) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            hosts: hosts.iter().map(|host| host.to_string()).collect(),
            mount: None,
        }
    }

    /// Replaces every field the override sets, leaving the others alone.
    pub fn apply(&mut self, patch: &MirrorOverride) {
        if let Some(cname) = &patch.cname {
            self.name = cname.clone();
        }
        if let Some(image) = &patch.image {
            self.image = image.clone();
        }
        if !patch.hosts.is_empty() {
            self.hosts = patch.hosts.clone();
        }
        if let Some(mount) = &patch.mount {
            self.mount = Some(mount.clone());
        }
    }

    /// A spec made up from an override alone; the host is derived from the image name.
    pub fn from_override(image: &str, patch: &MirrorOverride) -> Self {
        let (_, tag) = naming::split_tag(image);
        let repo = naming::registry_free_name(image);
        let repo = repo.rsplit('/').next().unwrap_or(repo);
        let mut spec = Self {
            name: naming::container_name(repo, tag.unwrap_or("latest")),
            image: image.to_string(),
            hosts: vec![naming::host_for_image(image)],
            mount: None,
        };
        spec.apply(patch);
        spec
    }
}

/// Selects repo variants and the EPEL add-on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorOptions {
    /// Append the EPEL mirror for CentOS and AlmaLinux.
    pub epel: bool,
    /// Use the `/updates` repo of Ubuntu and openSUSE.
    pub updates: bool,
    /// Use the `/universe` repo of Ubuntu.
    pub universe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Centos,
    Almalinux,
    Ubuntu,
    Opensuse,
    /// EPEL on its own, on top of a CentOS or AlmaLinux release.
    Epel,
}

impl Family {
    /// Splits an image reference into family and requested version.
    ///
    /// A missing tag means `latest`. Registry hosts and `library/` are ignored.
    pub fn parse(image: &str) -> Option<(Family, &str)> {
        let (_, tag) = naming::split_tag(image);
        let name = naming::registry_free_name(image);
        let name = name.strip_prefix("library/").unwrap_or(name);
        let family = match name {
            "centos" => Family::Centos,
            "almalinux" => Family::Almalinux,
            "ubuntu" => Family::Ubuntu,
            "opensuse" | "opensuse/leap" => Family::Opensuse,
            "epel" => Family::Epel,
            _ => return None,
        };
        Some((family, tag.unwrap_or("latest")))
    }

    pub fn distro(self) -> Option<Distro> {
        match self {
            Family::Centos => Some(Distro::Centos),
            Family::Almalinux => Some(Distro::Almalinux),
            Family::Ubuntu => Some(Distro::Ubuntu),
            Family::Opensuse => Some(Distro::Opensuse),
            Family::Epel => None,
        }
    }

    pub fn repo(self) -> &'static str {
        match self {
            Family::Centos => "centos-repo",
            Family::Almalinux => "almalinux-repo",
            Family::Ubuntu => "ubuntu-repo",
            Family::Opensuse => "opensuse-repo",
            Family::Epel => EPEL_REPO,
        }
    }

    pub fn hosts(self) -> &'static [&'static str] {
        match self {
            Family::Centos => &["mirrorlist.centos.org"],
            Family::Almalinux => &["mirrors.almalinux.org", "repo.almalinux.org"],
            Family::Ubuntu => &["archive.ubuntu.com", "security.ubuntu.com"],
            Family::Opensuse => &["download.opensuse.org"],
            Family::Epel => EPEL_HOSTS,
        }
    }

    /// The OS image reference for a resolved version, e.g. `opensuse/leap:15.6`.
    pub fn image(self, version: &str) -> String {
        match self {
            Family::Centos => format!("centos:{}", version),
            Family::Almalinux => format!("almalinux:{}", version),
            Family::Ubuntu => format!("ubuntu:{}", version),
            Family::Opensuse => {
                let namespace = versions::OPENSUSE.get(version).unwrap_or("opensuse/leap");
                format!("{}:{}", namespace, version)
            }
            Family::Epel => format!("epel:{}", version),
        }
    }
}

pub struct MirrorCatalog<'a, R: ContainerRuntime + ?Sized> {
    runtime: &'a R,
    overlay: &'a ConfigOverlay,
    repo_prefix: String,
    options: MirrorOptions,
}

impl<'a, R: ContainerRuntime + ?Sized> MirrorCatalog<'a, R> {
    /// Uses `$DOCKER_MIRROR_REPO` as image prefix if set.
    pub fn new(runtime: &'a R, overlay: &'a ConfigOverlay) -> Self {
        let repo_prefix = std::env::var(REPO_PREFIX_ENV)
            .ok()
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_REPO_PREFIX.to_string());
        Self {
            runtime,
            overlay,
            repo_prefix,
            options: MirrorOptions::default(),
        }
    }

    pub fn with_repo_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.repo_prefix = prefix.into();
        self
    }

    pub fn with_options(mut self, options: MirrorOptions) -> Self {
        self.options = options;
        self
    }

    /// Family and canonical version of `image`, `None` for images without a family.
    pub fn resolve(&self, image: &str) -> Option<(Family, String)> {
        let (family, shorthand) = Family::parse(image)?;
        let version = match family.distro() {
            Some(distro) => versions::resolve_version(distro, shorthand),
            None => epel_base(shorthand).1,
        };
        Some((family, version))
    }

    /// The canonical form of an image reference; unknown images come back unchanged.
    pub fn canonical_image(&self, image: &str) -> String {
        match self.resolve(image) {
            Some((family, version)) => family.image(&version),
            None => image.to_string(),
        }
    }

    /// All mirrors needed for `image`, in start order.
    ///
    /// Fails only when EPEL is requested and no EPEL mirror can be selected.
    pub fn mirrors_for(&self, image: &str) -> Result<Vec<MirrorSpec>> {
        let (mut specs, resolved) = match Family::parse(image) {
            Some((family, shorthand)) => {
                let (version, specs) = self.family_mirrors(family, shorthand)?;
                (specs, family.image(&version))
            }
            None => {
                debug!("no mirror family for {}", image);
                (Vec::new(), image.to_string())
            }
        };

        if let Some(patch) = self.overlay.get(&resolved) {
            match specs.first_mut() {
                Some(first) => {
                    debug!("config override [{}] for {}", resolved, first.name);
                    first.apply(patch);
                }
                None => match &patch.image {
                    Some(image) => specs.push(MirrorSpec::from_override(image, patch)),
                    None => warn!("config section [{}] has no image to start", resolved),
                },
            }
        }

        Ok(specs)
    }

    fn family_mirrors(&self, family: Family, shorthand: &str) -> Result<(String, Vec<MirrorSpec>)> {
        match family {
            Family::Centos | Family::Almalinux => {
                let table = family.distro().map(Distro::table).unwrap_or(&versions::CENTOS);
                let version = table.resolve(shorthand);
                let minor = versions::major_minor(&version);
                let mut specs = vec![self.build(family.repo(), &minor, family.hosts())];
                if self.options.epel {
                    specs.push(self.epel_mirror(table, &version)?);
                }
                Ok((version, specs))
            }
            Family::Ubuntu => {
                let version = versions::UBUNTU.resolve(shorthand);
                let repo = if self.options.universe {
                    "ubuntu-repo/universe"
                } else if self.options.updates {
                    "ubuntu-repo/updates"
                } else {
                    family.repo()
                };
                let specs = vec![self.build(repo, &versions::major_minor(&version), family.hosts())];
                Ok((version, specs))
            }
            Family::Opensuse => {
                let version = versions::OPENSUSE.resolve(shorthand);
                let repo = if self.options.updates {
                    "opensuse-repo/updates"
                } else {
                    family.repo()
                };
                let specs = vec![self.build(repo, &versions::major_minor(&version), family.hosts())];
                Ok((version, specs))
            }
            Family::Epel => {
                let (table, version) = epel_base(shorthand);
                let specs = vec![self.epel_mirror(table, &version)?];
                Ok((version, specs))
            }
        }
    }

    fn build(&self, repo: &str, tag: &str, hosts: &[&str]) -> MirrorSpec {
        let mut spec = MirrorSpec::new(
            naming::container_name(repo, tag),
            naming::image_reference(&self.repo_prefix, repo, tag),
            hosts,
        );
        self.apply_repo_override(repo, tag, &mut spec);
        spec
    }

    fn apply_repo_override(&self, repo: &str, tag: &str, spec: &mut MirrorSpec) {
        let key = format!("{}:{}", repo, tag);
        if let Some(patch) = self.overlay.get(&key) {
            debug!("config override [{}] for {}", key, spec.name);
            spec.apply(patch);
        }
    }

    /// The EPEL mirror nearest in time to the base release `version`.
    fn epel_mirror(&self, table: &AliasTable, version: &str) -> Result<MirrorSpec> {
        let release = if epel::release_date(version).is_some() {
            version.to_string()
        } else {
            table
                .dated_release(&versions::major_minor(version))
                .map(String::from)
                .unwrap_or_else(|| version.to_string())
        };
        let refdate = epel::release_date(&release).ok_or_else(|| {
            anyhow!(
                "Cannot find a release date in {} {} to select an EPEL mirror",
                table.name(),
                release
            )
        })?;
        let major = release.split('.').next().unwrap_or(&release);

        let candidates = self.epel_candidates(major);
        let chosen = epel::select_nearest(&refdate, &candidates).ok_or_else(|| {
            anyhow!(
                "No {} mirror for {} {} (looked for images in {} and config sections)",
                EPEL_REPO,
                table.name(),
                release,
                self.repo_prefix
            )
        })?;
        info!(
            "{} {} (date {}) uses EPEL {} (date {})",
            table.name(),
            release,
            refdate,
            chosen.reference,
            chosen.created
        );

        let minor = versions::major_minor(&chosen.version);
        let mut spec = MirrorSpec::new(
            naming::container_name(EPEL_REPO, &minor),
            naming::image_reference(&self.repo_prefix, EPEL_REPO, &chosen.version),
            EPEL_HOSTS,
        );
        match self.overlay.get(&chosen.reference) {
            Some(patch) => {
                self.apply_repo_override(EPEL_REPO, &minor, &mut spec);
                spec.apply(patch);
            }
            None => {
                spec.image = chosen.reference.clone();
                self.apply_repo_override(EPEL_REPO, &minor, &mut spec);
            }
        }
        Ok(spec)
    }

    /// Disk-backed config sections first, then cached images, same major only.
    fn epel_candidates(&self, major: &str) -> Vec<EpelCandidate> {
        let section_prefix = format!("{}:", EPEL_REPO);
        let mut candidates: Vec<EpelCandidate> = self
            .overlay
            .with_prefix(&section_prefix)
            .filter_map(|(key, _)| EpelCandidate::from_reference(key))
            .collect();

        let repository = naming::image_reference(&self.repo_prefix, EPEL_REPO, "");
        let repository = repository.trim_end_matches(':');
        match self.runtime.list_images(repository) {
            Ok(images) => candidates.extend(
                images
                    .iter()
                    .filter_map(|image| EpelCandidate::from_reference(image)),
            ),
            Err(e) => warn!("Cannot list {} images: {:#}", repository, e),
        }

        candidates.retain(|candidate| candidate.major() == major);
        debug!(
            "{} EPEL candidates for major {}: {:?}",
            candidates.len(),
            major,
            candidates
                .iter()
                .map(|candidate| candidate.reference.as_str())
                .collect::<Vec<_>>()
        );
        candidates
    }
}

/// Resolves an `epel:` version against the CentOS and the AlmaLinux table.
///
/// Each table is matched on its own. Among the tables that know a dated release for
/// their result, the newest release wins; on equal dates CentOS is kept.
fn epel_base(shorthand: &str) -> (&'static AliasTable, String) {
    let mut best: Option<(String, &'static AliasTable, String)> = None;
    for table in [&versions::CENTOS, &versions::ALMALINUX] {
        let version = table.resolve(shorthand);
        let Some(refdate) = table
            .dated_release(&versions::major_minor(&version))
            .and_then(epel::release_date)
        else {
            continue;
        };
        if best.as_ref().map_or(true, |(newest, _, _)| refdate > *newest) {
            best = Some((refdate, table, version));
        }
    }
    match best {
        Some((_, table, version)) => (table, version),
        None if epel::alma_release_date(shorthand).is_some() => {
            (&versions::ALMALINUX, shorthand.to_string())
        }
        None => (&versions::CENTOS, shorthand.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::fake::{FakeOp, FakeRuntime};

    const PREFIX: &str = "localhost:5000/mirror-packages";

    fn catalog<'a>(runtime: &'a FakeRuntime, overlay: &'a ConfigOverlay) -> MirrorCatalog<'a, FakeRuntime> {
        MirrorCatalog::new(runtime, overlay).with_repo_prefix(PREFIX)
    }

    #[test]
    fn test_family_parse() {
        assert_eq!(Family::parse("centos:8"), Some((Family::Centos, "8")));
        assert_eq!(Family::parse("ubuntu"), Some((Family::Ubuntu, "latest")));
        assert_eq!(Family::parse("opensuse/leap:15.6"), Some((Family::Opensuse, "15.6")));
        assert_eq!(
            Family::parse("docker.io/library/almalinux:9"),
            Some((Family::Almalinux, "9"))
        );
        assert_eq!(Family::parse("epel:9"), Some((Family::Epel, "9")));
        assert_eq!(Family::parse("fedora:40"), None);
    }

    #[test]
    fn test_centos_mirror() {
        let runtime = FakeRuntime::new();
        let overlay = ConfigOverlay::empty();
        let specs = catalog(&runtime, &overlay).mirrors_for("centos:8").unwrap();
        assert_eq!(
            specs,
            vec![MirrorSpec::new(
                "centos-repo-8.5",
                "localhost:5000/mirror-packages/centos-repo:8.5",
                &["mirrorlist.centos.org"],
            )]
        );
    }

    #[test]
    fn test_ubuntu_and_opensuse_mirrors() {
        let runtime = FakeRuntime::new();
        let overlay = ConfigOverlay::empty();
        let catalog = catalog(&runtime, &overlay);

        let specs = catalog.mirrors_for("ubuntu:noble").unwrap();
        assert_eq!(specs[0].name, "ubuntu-repo-24.04");
        assert_eq!(specs[0].hosts, vec!["archive.ubuntu.com", "security.ubuntu.com"]);

        let specs = catalog.mirrors_for("opensuse/leap:15").unwrap();
        assert_eq!(specs[0].name, "opensuse-repo-15.6");
        assert_eq!(
            specs[0].image,
            "localhost:5000/mirror-packages/opensuse-repo:15.6"
        );
        assert_eq!(specs[0].hosts, vec!["download.opensuse.org"]);
    }

    #[test]
    fn test_repo_variants() {
        let runtime = FakeRuntime::new();
        let overlay = ConfigOverlay::empty();
        let universe = catalog(&runtime, &overlay).with_options(MirrorOptions {
            universe: true,
            ..MirrorOptions::default()
        });
        let specs = universe.mirrors_for("ubuntu:22.04").unwrap();
        assert_eq!(specs[0].name, "ubuntu-repo-universe-22.04");
        assert_eq!(
            specs[0].image,
            "localhost:5000/mirror-packages/ubuntu-repo/universe:22.04"
        );

        let updates = catalog(&runtime, &overlay).with_options(MirrorOptions {
            updates: true,
            ..MirrorOptions::default()
        });
        let specs = updates.mirrors_for("opensuse:42.3").unwrap();
        assert_eq!(specs[0].name, "opensuse-repo-updates-42.3");
    }

    #[test]
    fn test_canonical_image() {
        let runtime = FakeRuntime::new();
        let overlay = ConfigOverlay::empty();
        let catalog = catalog(&runtime, &overlay);
        assert_eq!(catalog.canonical_image("centos:7"), "centos:7.9");
        assert_eq!(catalog.canonical_image("ubuntu:jammy"), "ubuntu:22.04");
        assert_eq!(catalog.canonical_image("opensuse:15"), "opensuse/leap:15.6");
        assert_eq!(catalog.canonical_image("opensuse/leap:42"), "opensuse:42.3");
        assert_eq!(catalog.canonical_image("fedora:40"), "fedora:40");
    }

    #[test]
    fn test_epel_prefers_nearest_newer_image() {
        let runtime = FakeRuntime::new()
            .with_image("localhost:5000/mirror-packages/epel-repo:9.2-20230520", "sha256:e92")
            .with_image("localhost:5000/mirror-packages/epel-repo:9.3-20231201", "sha256:e93")
            .with_image("localhost:5000/mirror-packages/epel-repo:9.4-20240601", "sha256:e94")
            .with_image("localhost:5000/mirror-packages/epel-repo:8.9-20231201", "sha256:e89");
        let overlay = ConfigOverlay::empty();
        let catalog = catalog(&runtime, &overlay).with_options(MirrorOptions {
            epel: true,
            ..MirrorOptions::default()
        });

        let specs = catalog.mirrors_for("almalinux:9.3").unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "almalinux-repo-9.3");
        assert_eq!(specs[1].name, "epel-repo-9.3");
        assert_eq!(
            specs[1].image,
            "localhost:5000/mirror-packages/epel-repo:9.3-20231201"
        );
        assert_eq!(specs[1].hosts, vec!["mirrors.fedoraproject.org"]);
    }

    #[test]
    fn test_epel_falls_back_to_nearest_older() {
        let runtime = FakeRuntime::new()
            .with_image("localhost:5000/mirror-packages/epel-repo:7.7.1908", "sha256:e77")
            .with_image("localhost:5000/mirror-packages/epel-repo:7.8.2003", "sha256:e78");
        let overlay = ConfigOverlay::empty();
        let catalog = catalog(&runtime, &overlay).with_options(MirrorOptions {
            epel: true,
            ..MirrorOptions::default()
        });

        let specs = catalog.mirrors_for("centos:7").unwrap();
        assert_eq!(specs[0].name, "centos-repo-7.9");
        assert_eq!(specs[1].name, "epel-repo-7.8");
        assert_eq!(
            specs[1].image,
            "localhost:5000/mirror-packages/epel-repo:7.8.2003"
        );
    }

    #[test]
    fn test_epel_from_config_when_images_cannot_be_listed() {
        let runtime = FakeRuntime::new();
        runtime.fail_on(FakeOp::ListImages);
        let overlay = ConfigOverlay::parse(
            "[epel-repo:9.3-20231201]\n\
             image = localhost:5000/mirror-packages/epel-repo:9.3-disk\n",
        );
        let catalog = catalog(&runtime, &overlay).with_options(MirrorOptions {
            epel: true,
            ..MirrorOptions::default()
        });

        let specs = catalog.mirrors_for("almalinux:9.3").unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(
            specs[1].image,
            "localhost:5000/mirror-packages/epel-repo:9.3-disk"
        );
    }

    #[test]
    fn test_epel_disk_backed_override_takes_precedence() {
        let runtime = FakeRuntime::new()
            .with_image("localhost:5000/mirror-packages/epel-repo:9.3-20231201", "sha256:e93");
        let overlay = ConfigOverlay::parse(
            "[epel-repo:9.3-20231201]\n\
             image = localhost:5000/mirror-packages/epel-repo:9.3-disk\n\
             mount = /data/epel/9.3\n",
        );
        let catalog = catalog(&runtime, &overlay).with_options(MirrorOptions {
            epel: true,
            ..MirrorOptions::default()
        });

        let specs = catalog.mirrors_for("almalinux:9.3").unwrap();
        assert_eq!(
            specs[1].image,
            "localhost:5000/mirror-packages/epel-repo:9.3-disk"
        );
        assert_eq!(specs[1].mount.as_deref(), Some("/data/epel/9.3"));
        assert_eq!(specs[1].name, "epel-repo-9.3");
    }

    #[test]
    fn test_epel_without_candidates_fails() {
        let runtime = FakeRuntime::new();
        let overlay = ConfigOverlay::empty();
        let catalog = catalog(&runtime, &overlay).with_options(MirrorOptions {
            epel: true,
            ..MirrorOptions::default()
        });
        assert!(catalog.mirrors_for("centos:8").is_err());
        assert!(catalog.mirrors_for("centos:8").is_err());
    }

    #[test]
    fn test_epel_without_release_date_fails() {
        let runtime = FakeRuntime::new()
            .with_image("localhost:5000/mirror-packages/epel-repo:6.10.1806", "sha256:e6");
        let overlay = ConfigOverlay::empty();
        let catalog = catalog(&runtime, &overlay).with_options(MirrorOptions {
            epel: true,
            ..MirrorOptions::default()
        });
        let error = catalog.mirrors_for("centos:6.10").unwrap_err();
        assert!(error.to_string().contains("release date"), "{}", error);
    }

    #[test]
    fn test_epel_family_alone() {
        let runtime = FakeRuntime::new()
            .with_image("localhost:5000/mirror-packages/epel-repo:8.5.2111", "sha256:e85")
            .with_image("localhost:5000/mirror-packages/epel-repo:9.5-20241120", "sha256:e95");
        let overlay = ConfigOverlay::empty();
        let catalog = catalog(&runtime, &overlay);

        let specs = catalog.mirrors_for("epel:8").unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "epel-repo-8.5");

        let specs = catalog.mirrors_for("epel:9").unwrap();
        assert_eq!(specs[0].name, "epel-repo-9.5");
    }

    #[test]
    fn test_epel_latest_is_the_newest_release_of_both_tables() {
        let runtime = FakeRuntime::new()
            .with_image("localhost:5000/mirror-packages/epel-repo:8.5.2111", "sha256:e85")
            .with_image("localhost:5000/mirror-packages/epel-repo:9.5-20241120", "sha256:e95");
        let overlay = ConfigOverlay::empty();
        let catalog = catalog(&runtime, &overlay);

        assert_eq!(catalog.canonical_image("epel:latest"), "epel:9.5");
        assert_eq!(catalog.canonical_image("epel"), "epel:9.5");
        assert_eq!(catalog.canonical_image("epel:8"), "epel:8.10");
        assert_eq!(catalog.canonical_image("epel:7"), "epel:7.9");
        assert_eq!(catalog.canonical_image("epel:8.4"), "epel:8.4");

        let specs = catalog.mirrors_for("epel:latest").unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "epel-repo-9.5");
    }

    #[test]
    fn test_epel_base_keeps_each_table_apart() {
        let (table, version) = epel_base("7.9.2009");
        assert_eq!((table.name(), version.as_str()), ("centos", "7.9"));

        let (table, version) = epel_base("9.3-20231113");
        assert_eq!((table.name(), version.as_str()), ("almalinux", "9.3"));

        let (table, version) = epel_base("9.6-20250520");
        assert_eq!((table.name(), version.as_str()), ("almalinux", "9.6-20250520"));
    }

    #[test]
    fn test_override_changes_only_given_fields() {
        let runtime = FakeRuntime::new();
        let overlay = ConfigOverlay::parse("[centos:8.5]\nhosts = mirror.local, vault.centos.org\n");
        let specs = catalog(&runtime, &overlay).mirrors_for("centos:8").unwrap();
        assert_eq!(specs[0].hosts, vec!["mirror.local", "vault.centos.org"]);
        assert_eq!(
            specs[0].image,
            "localhost:5000/mirror-packages/centos-repo:8.5"
        );
        assert_eq!(specs[0].name, "centos-repo-8.5");
        assert_eq!(specs[0].mount, None);
    }

    #[test]
    fn test_repo_keyed_override() {
        let runtime = FakeRuntime::new();
        let overlay = ConfigOverlay::parse("[ubuntu-repo:24.04]\nmount = /srv/ubuntu\ncname = noble-mirror\n");
        let specs = catalog(&runtime, &overlay).mirrors_for("ubuntu:24.04").unwrap();
        assert_eq!(specs[0].name, "noble-mirror");
        assert_eq!(specs[0].mount.as_deref(), Some("/srv/ubuntu"));
    }

    #[test]
    fn test_override_synthesizes_unknown_image() {
        let runtime = FakeRuntime::new();
        let overlay = ConfigOverlay::parse(
            "[python:3.12]\nimage = localhost:5000/mirror-packages/pypi-repo:2024\n",
        );
        let catalog = catalog(&runtime, &overlay);
        let specs = catalog.mirrors_for("python:3.12").unwrap();
        assert_eq!(
            specs,
            vec![MirrorSpec::new(
                "pypi-repo-2024",
                "localhost:5000/mirror-packages/pypi-repo:2024",
                &["pypi"],
            )]
        );

        assert!(catalog.mirrors_for("python:3.11").unwrap().is_empty());
    }
}
