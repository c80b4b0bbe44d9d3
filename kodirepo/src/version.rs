//! Add-on version keys.
//!
//! Kodi add-on versions are loosely semantic: `1.2.3`, `2.1`, `19.0.1+matrix.1`
//! and `1.0~beta2` all occur in the wild. [`VersionKey`] splits a version into
//! up to three numeric components plus a free-form suffix and orders keys the
//! way existing repositories expect:
//!
//! - Numeric components compare numerically, left to right
//! - A present minor or patch beats an absent one (`1.2.0` is newer than `1.2`)
//! - A present suffix beats an absent one too (`1.0a` is newer than `1.0`)
//! - Between two suffixes the alphabetically *earlier* one wins (`1.0a` is newer than `1.0b`)
//!
//! Equality is defined on the canonical rendering. A patch component is only
//! kept when a minor is present, so `1..2` renders as `1` and equals it.
//!
//! Text that does not parse, or whose parsed form would render as some other
//! version (`1...5` would print as `1.5`), is kept verbatim: it renders as
//! written and ranks like major `0` with the whole text as suffix.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

/// Pattern for `major[.minor[.patch]]suffix`.
///
/// Both dots are optional, which lets `1..2` match with a patch but no minor.
fn version_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"(?s)^(?P<major>0|[1-9][0-9]*)\.?(?P<minor>0|[1-9][0-9]*)?\.?(?P<patch>0|[1-9][0-9]*)?(?P<suffix>.*)$",
            )
            .ok()
        })
        .as_ref()
}

/// A parsed add-on version.
#[derive(Debug, Clone, Default)]
pub struct VersionKey {
    major: u64,
    minor: Option<u64>,
    patch: Option<u64>,
    suffix: Option<String>,
    /// Set when `suffix` holds unparsed input that renders verbatim.
    malformed: bool,
}

impl VersionKey {
    /// Build a key from its components.
    ///
    /// A patch without a minor is discarded and an empty suffix is treated
    /// as absent. The result is the key its rendering parses to, so
    /// `new(1, None, None, Some(".5"))` yields the same key as `parse("1.5")`.
    pub fn new(major: u64, minor: Option<u64>, patch: Option<u64>, suffix: Option<&str>) -> Self {
        Self::parse(&Self::from_parts(major, minor, patch, suffix).to_string())
    }

    fn from_parts(major: u64, minor: Option<u64>, patch: Option<u64>, suffix: Option<&str>) -> Self {
        Self {
            major,
            minor,
            patch: minor.and(patch),
            suffix: suffix.filter(|s| !s.is_empty()).map(String::from),
            malformed: false,
        }
    }

    /// Parse a version string. Never fails.
    ///
    /// Input that does not start with a number, whose numbers overflow, or
    /// whose components would render as a different version becomes major
    /// `0` with the whole input kept as the suffix, and renders back to the
    /// original text. Empty input is `0`.
    pub fn parse(text: &str) -> Self {
        match Self::parse_components(text) {
            Some(key) if key.is_stable() => key,
            _ if text.is_empty() => Self::default(),
            _ => Self {
                major: 0,
                minor: None,
                patch: None,
                suffix: Some(text.to_string()),
                malformed: true,
            },
        }
    }

    fn parse_components(text: &str) -> Option<Self> {
        let caps = version_pattern()?.captures(text)?;
        let number = |name: &str| -> Option<Option<u64>> {
            match caps.name(name) {
                Some(m) => m.as_str().parse::<u64>().ok().map(Some),
                None => Some(None),
            }
        };

        let major = number("major")??;
        let minor = number("minor")?;
        let patch = number("patch")?;
        let suffix = caps.name("suffix").map(|m| m.as_str());

        Some(Self::from_parts(major, minor, patch, suffix))
    }

    /// True when rendering and parsing again gives back the same components.
    fn is_stable(&self) -> bool {
        Self::parse_components(&self.to_string()).is_some_and(|again| again.parts() == self.parts())
    }

    fn parts(&self) -> (u64, Option<u64>, Option<u64>, Option<&str>) {
        (self.major, self.minor, self.patch, self.suffix.as_deref())
    }

    /// Major component.
    pub fn major(&self) -> u64 {
        self.major
    }

    /// Minor component, if present.
    pub fn minor(&self) -> Option<u64> {
        self.minor
    }

    /// Patch component, only ever present together with a minor.
    pub fn patch(&self) -> Option<u64> {
        self.patch
    }

    /// Free-form text following the numeric components.
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// True when the input did not parse and is kept verbatim.
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Strict "newer than" test.
    ///
    /// Components are compared in order and the first decisive one wins.
    /// Two keys that tie on every component are not greater than each other.
    pub fn is_greater_than(&self, other: &Self) -> bool {
        if self.major != other.major {
            return self.major > other.major;
        }
        if let Some(decided) = compare_optional(self.minor, other.minor) {
            return decided;
        }
        if let Some(decided) = compare_optional(self.patch, other.patch) {
            return decided;
        }
        match (&self.suffix, &other.suffix) {
            (Some(_), None) => true,
            (Some(mine), Some(theirs)) => mine < theirs,
            (None, _) => false,
        }
    }

    /// Total ordering derived from canonical equality and [`is_greater_than`](Self::is_greater_than).
    ///
    /// Distinct keys that tie on every component (`0v1` and the verbatim
    /// `v1`) are ordered by their canonical strings.
    pub fn compare(&self, other: &Self) -> Ordering {
        if self == other {
            Ordering::Equal
        } else if self.is_greater_than(other) {
            Ordering::Greater
        } else if other.is_greater_than(self) {
            Ordering::Less
        } else {
            self.to_string().cmp(&other.to_string())
        }
    }

    /// Canonical string form.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

/// Returns `Some(verdict)` when the pair decides the comparison, `None` on a tie.
fn compare_optional(mine: Option<u64>, theirs: Option<u64>) -> Option<bool> {
    match (mine, theirs) {
        (None, None) => None,
        (None, Some(_)) => Some(false),
        (Some(_), None) => Some(true),
        (Some(a), Some(b)) if a != b => Some(a > b),
        (Some(_), Some(_)) => None,
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.malformed {
            return f.write_str(self.suffix.as_deref().unwrap_or_default());
        }
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{}", minor)?;
            if let Some(patch) = self.patch {
                write!(f, ".{}", patch)?;
            }
        }
        if let Some(suffix) = &self.suffix {
            f.write_str(suffix)?;
        }
        Ok(())
    }
}

impl PartialEq for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for VersionKey {}

impl Hash for VersionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl FromStr for VersionKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for VersionKey {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
