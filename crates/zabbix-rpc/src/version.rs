//! Zabbix API versions -- `MAJOR.MINOR.PATCH[(alpha|beta|rc)N]`.
//!
//! Ordering is lexicographic over (major, minor, patch, pre-release kind,
//! pre-release number), with a plain release sorting after every
//! pre-release of the same patch level: `7.0.0alpha2 < 7.0.0rc1 < 7.0.0`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Pre-release qualifier. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PreRelease {
    Alpha,
    Beta,
    /// Release candidate.
    Rc,
    #[default]
    Release,
}

impl PreRelease {
    /// Suffix tag as written in version strings. Empty for `Release`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Rc => "rc",
            Self::Release => "",
        }
    }
}

/// A Zabbix API version as reported by `apiinfo.version`.
///
/// Field order matters: the derived `Ord` compares fields top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre_release: PreRelease,
    pub pre_release_number: u32,
}

impl ApiVersion {
    /// A plain release version.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: PreRelease::Release,
            pre_release_number: 0,
        }
    }

    /// A pre-release version such as `6.4.0beta5`.
    pub const fn pre(major: u32, minor: u32, patch: u32, kind: PreRelease, number: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: kind,
            pre_release_number: number,
        }
    }

    /// Parse a version string.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidVersion(text.to_string());

        let mut parts = text.splitn(3, '.');
        let major = parse_number(parts.next()).ok_or_else(invalid)?;
        let minor = parse_number(parts.next()).ok_or_else(invalid)?;
        let rest = parts.next().ok_or_else(invalid)?;

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (patch_text, suffix) = rest.split_at(digits_end);
        let patch = parse_number(Some(patch_text)).ok_or_else(invalid)?;

        if suffix.is_empty() {
            return Ok(Self::new(major, minor, patch));
        }

        let (kind, number_text) = [PreRelease::Alpha, PreRelease::Beta, PreRelease::Rc]
            .into_iter()
            .find_map(|kind| suffix.strip_prefix(kind.as_str()).map(|n| (kind, n)))
            .ok_or_else(invalid)?;
        let number = parse_number(Some(number_text)).ok_or_else(invalid)?;

        Ok(Self::pre(major, minor, patch, kind, number))
    }

    /// Three-way comparison, `-1`, `0` or `1`.
    pub fn compare(&self, other: &Self) -> i32 {
        match self.cmp(other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    /// True only for the default (never parsed) value `0.0.0`.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// A run of ASCII digits that fits in u32. Rejects signs and empty input,
/// which `u32::from_str` alone would not.
fn parse_number(text: Option<&str>) -> Option<u32> {
    let text = text?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.pre_release != PreRelease::Release {
            write!(f, "{}{}", self.pre_release.as_str(), self.pre_release_number)?;
        }
        Ok(())
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
