use semver::Version;

/// Parse a version or tag name into a semver::Version, normalizing partial versions.
///
/// Strips a leading 'v' and pads partial versions with zeros.
///
/// Examples:
/// - "v1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "v1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let (core, suffix) = match version.find(['-', '+']) {
        Some(idx) => version.split_at(idx),
        None => (version, ""),
    };
    let parts: Vec<&str> = core.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0{}", parts[0], suffix),
        2 => format!("{}.{}.0{}", parts[0], parts[1], suffix),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Returns true if both versions belong to the same major.minor line
pub fn same_minor(a: &Version, b: &Version) -> bool {
    a.major == b.major && a.minor == b.minor
}

/// Find the earliest version on the same major.minor line as `released_version`
///
/// Returns the matching entry of `available_versions` as given (tag names are
/// kept verbatim), or None if `released_version` can't be parsed or no
/// available version shares its minor line.
pub fn first_in_minor_line(
    released_version: &str,
    available_versions: &[String],
) -> Option<String> {
    let released = parse_version(released_version)?;

    available_versions
        .iter()
        .filter_map(|v| parse_version(v).map(|parsed| (v, parsed)))
        .filter(|(_, parsed)| same_minor(parsed, &released))
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(v, _)| v.clone())
}
