use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Three digit runs separated by any single character. The separator is
    /// deliberately not restricted to `.`.
    static ref VERSION_RX: Regex = Regex::new(r"\d+.\d+.\d+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SdkVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SdkVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses exactly `major.minor.patch`. Each component must fit in a
    /// non-negative `i32`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(major, minor, patch))
    }
}

fn parse_component(s: &str) -> Option<u32> {
    let value: i32 = s.parse().ok()?;
    u32::try_from(value).ok()
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// First substring of `text` matching the version pattern.
pub fn find_version_text(text: &str) -> Option<&str> {
    VERSION_RX.find(text).map(|m| m.as_str())
}

/// Extracts the SDK version from free-form `--info` output.
///
/// Only the first pattern match is considered. If that match is not a
/// well-formed dotted triple (say `7-0-100`), the version is unknown.
pub fn extract_version(text: &str) -> Option<SdkVersion> {
    find_version_text(text).and_then(SdkVersion::parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_first_triple() {
        let info = ".NET SDK:\n Version:           7.0.100\n Commit:            e12b7af219\n\nRuntime Environment:\n OS Version:  22.04\n";
        assert_eq!(extract_version(info), Some(SdkVersion::new(7, 0, 100)));
    }

    #[test]
    fn later_triples_are_ignored() {
        let info = "Version: 8.0.204\nHost: 8.0.4\nRuntime 6.0.29";
        assert_eq!(extract_version(info), Some(SdkVersion::new(8, 0, 204)));
    }

    #[test]
    fn pattern_accepts_any_separator() {
        assert_eq!(find_version_text("sdk 7-0-100 here"), Some("7-0-100"));
        assert_eq!(find_version_text("v1x2y3"), Some("1x2y3"));
        assert_eq!(find_version_text("7 0 1"), Some("7 0 1"));
    }

    #[test]
    fn non_dotted_match_is_unknown() {
        assert_eq!(extract_version("sdk 7-0-100 here"), None);
    }

    #[test]
    fn separator_does_not_cross_lines() {
        assert_eq!(find_version_text("7.0\n100"), None);
        assert_eq!(extract_version("7.0\n100"), None);
    }

    #[test]
    fn mixed_separator_match_is_unknown() {
        // the first match is "1x2.3", which has too few dotted parts
        assert_eq!(find_version_text("1x2.3.4"), Some("1x2.3"));
        assert_eq!(extract_version("1x2.3.4"), None);
    }

    #[test]
    fn no_triple_is_unknown() {
        assert_eq!(extract_version(""), None);
        assert_eq!(extract_version("Version: 7.0"), None);
        assert_eq!(extract_version("command not found"), None);
    }

    #[test]
    fn overflowing_component_is_unknown() {
        assert_eq!(extract_version("99999999999.0.1"), None);
    }

    #[test]
    fn components_are_limited_to_i32() {
        assert_eq!(extract_version("Version: 3000000000.0.1"), None);
        assert_eq!(extract_version("Version: 1.2147483648.0"), None);
        assert_eq!(
            extract_version("Version: 2147483647.0.1"),
            Some(SdkVersion::new(2147483647, 0, 1))
        );
    }

    #[test]
    fn four_part_versions_match_first_three() {
        assert_eq!(
            extract_version("Version 1.2.3.4"),
            Some(SdkVersion::new(1, 2, 3))
        );
    }

    #[test]
    fn display_round_trips() {
        let v = SdkVersion::new(7, 0, 100);
        assert_eq!(v.to_string(), "7.0.100");
        assert_eq!(SdkVersion::parse(&v.to_string()), Some(v));
    }

    #[test]
    fn prerelease_suffix_is_outside_match() {
        assert_eq!(
            extract_version("Version: 9.0.100-preview.7.24407.12"),
            Some(SdkVersion::new(9, 0, 100))
        );
    }
}
