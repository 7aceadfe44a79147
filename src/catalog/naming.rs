/// Builds the image reference of a mirror: `{prefix}/{repo}:{tag}`
/// An empty prefix leaves the bare `repo:tag`
pub fn image_reference(prefix: &str, repo: &str, tag: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        format!("{}:{}", repo, tag)
    } else {
        format!("{}/{}:{}", prefix, repo, tag)
    }
}

/// Converts a repo name and version into a container name
/// Replaces characters docker does not accept in names, `/` becomes `-`
pub fn container_name(repo: &str, version: &str) -> String {
    format!("{}-{}", repo, version)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Splits `name:tag` at the tag separator, ignoring a `:port` in the registry part
pub fn split_tag(image: &str) -> (&str, Option<&str>) {
    let image = image.split('@').next().unwrap_or(image);
    let path_start = image.rfind('/').map(|pos| pos + 1).unwrap_or(0);
    match image[path_start..].rfind(':') {
        Some(pos) => (
            &image[..path_start + pos],
            Some(&image[path_start + pos + 1..]),
        ),
        None => (image, None),
    }
}

/// Strips the registry host and the tag: `localhost:5000/mirror-packages/epel-repo:9.3`
/// becomes `mirror-packages/epel-repo`
pub fn registry_free_name(image: &str) -> &str {
    let (name, _) = split_tag(image);
    match name.split_once('/') {
        Some((first, rest))
            if first.contains('.') || first.contains(':') || first == "localhost" =>
        {
            rest
        }
        _ => name,
    }
}

/// Hostname a client container uses for a mirror built from `image`
/// Last path component of the registry-free name without a `-repo` suffix
pub fn host_for_image(image: &str) -> String {
    let name = registry_free_name(image);
    let last = name.rsplit('/').next().unwrap_or(name);
    last.strip_suffix("-repo").unwrap_or(last).to_string()
}
