//! Default timezone resolution.

use std::fs;
use std::path::{Component, Path};

/// Zone reported when neither configuration nor the host names one.
pub const FALLBACK_TIMEZONE: &str = "UTC";

const LOCALTIME_LINK: &str = "/etc/localtime";

/// Picks the zone for users without a stored one.
///
/// An explicit override wins; otherwise the host zone is used, and `UTC`
/// when the host zone cannot be determined.
#[must_use]
pub fn resolve_default_timezone(configured: Option<&str>) -> String {
    configured
        .map(str::to_owned)
        .or_else(system_default_timezone)
        .unwrap_or_else(|| FALLBACK_TIMEZONE.to_owned())
}

/// Reads the host zone from the `/etc/localtime` symlink.
#[must_use]
pub fn system_default_timezone() -> Option<String> {
    let target = fs::read_link(LOCALTIME_LINK).ok()?;
    zone_from_target(&target)
}

/// Derives `Area/City` from a zoneinfo path such as
/// `/usr/share/zoneinfo/Europe/Berlin`.
///
/// Single-component zones directly under `zoneinfo` (for example `UTC`) are
/// returned as-is.
#[must_use]
pub fn zone_from_target(target: &Path) -> Option<String> {
    let mut components = target
        .components()
        .rev()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        });
    let city = components.next().filter(|city| !city.is_empty())?;
    match components.next() {
        Some("zoneinfo") | None => Some(city.to_owned()),
        Some(area) => Some(format!("{area}/{city}")),
    }
}
