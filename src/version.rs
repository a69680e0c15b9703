//! Ordering for free-form software version strings
//!
//! Module versions in an Lmod index are whatever the installer wrote: plain
//! dotted numbers, dates, toolchain suffixes (`2.69-GCCcore-8.3.0`), letter
//! releases (`2019b`) and so on. A version string is split into a sequence of
//! numeric and textual components which are then compared pairwise.
//!
//! Two versions whose component sequences disagree in kind at the first
//! position that matters (a number lined up against text) cannot be ordered.
//! That is reported as [`VersionError::IncompatibleComponents`] instead of
//! guessing.
//!
//! # Example
//!
//! ```
//! use modmap::version::sort_recent_versions;
//!
//! let sorted = sort_recent_versions(&["2.69-GCCcore-8.2.0", "2.69-GCCcore-8.3.0"]).unwrap();
//! assert_eq!(sorted, vec!["2.69-GCCcore-8.3.0", "2.69-GCCcore-8.2.0"]);
//! ```

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error(
        "Cannot compare version {left} with {right}: component {index} is {left_component} in one and {right_component} in the other"
    )]
    IncompatibleComponents {
        left: String,
        right: String,
        index: usize,
        left_component: VersionComponent,
        right_component: VersionComponent,
    },

    #[error("Failed to sort versions [{}]: {source}", versions.join(", "))]
    Unsortable {
        versions: Vec<String>,
        #[source]
        source: Box<VersionError>,
    },
}

/// One piece of a tokenized version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionComponent {
    /// Decimal digits with leading zeros removed (`"0"` for zero)
    Numeric(String),
    /// Anything else, compared as-is
    Text(String),
}

impl VersionComponent {
    fn from_piece(piece: &str) -> Self {
        let digits = piece.trim_start_matches('v');
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            let trimmed = digits.trim_start_matches('0');
            let value = if trimmed.is_empty() { "0" } else { trimmed };
            VersionComponent::Numeric(value.to_string())
        } else {
            VersionComponent::Text(piece.to_string())
        }
    }

    fn same_kind(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (VersionComponent::Numeric(_), VersionComponent::Numeric(_))
                | (VersionComponent::Text(_), VersionComponent::Text(_))
        )
    }
}

impl Ord for VersionComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // normalized digits: the longer number is the larger one
            (VersionComponent::Numeric(a), VersionComponent::Numeric(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (VersionComponent::Text(a), VersionComponent::Text(b)) => a.cmp(b),
            (VersionComponent::Numeric(_), VersionComponent::Text(_)) => Ordering::Less,
            (VersionComponent::Text(_), VersionComponent::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for VersionComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionComponent::Numeric(value) => write!(f, "number {}", value),
            VersionComponent::Text(value) => write!(f, "text '{}'", value),
        }
    }
}

fn component_regex() -> &'static Regex {
    static COMPONENT_REGEX: OnceLock<Regex> = OnceLock::new();
    COMPONENT_REGEX
        .get_or_init(|| Regex::new(r"v?[0-9]+|[a-z]+|\.").expect("Invalid version component regex"))
}

/// A parsed version string
///
/// Only a partial order: versions with incompatible component shapes compare
/// as `None`. Use [`SoftwareVersion::try_cmp`] to get the reason. Equality
/// follows the components, so `01.2 == 1.2`.
#[derive(Debug, Clone)]
pub struct SoftwareVersion {
    vstring: String,
    components: Vec<VersionComponent>,
}

impl SoftwareVersion {
    pub fn parse(vstring: &str) -> Self {
        let mut pieces = Vec::new();
        let mut last = 0;
        for found in component_regex().find_iter(vstring) {
            pieces.push(&vstring[last..found.start()]);
            pieces.push(found.as_str());
            last = found.end();
        }
        pieces.push(&vstring[last..]);

        let components = pieces
            .into_iter()
            .filter(|piece| !piece.is_empty() && *piece != ".")
            .map(VersionComponent::from_piece)
            .collect();

        Self {
            vstring: vstring.to_string(),
            components,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.vstring
    }

    pub fn components(&self) -> &[VersionComponent] {
        &self.components
    }

    /// Compares two versions component by component
    ///
    /// Stops at the first differing pair. If all paired components are equal
    /// the version with fewer components is the lesser one.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, VersionError> {
        for (index, (left, right)) in self.components.iter().zip(&other.components).enumerate() {
            if !left.same_kind(right) {
                return Err(VersionError::IncompatibleComponents {
                    left: self.vstring.clone(),
                    right: other.vstring.clone(),
                    index,
                    left_component: left.clone(),
                    right_component: right.clone(),
                });
            }
            match left.cmp(right) {
                Ordering::Equal => continue,
                ordering => return Ok(ordering),
            }
        }
        Ok(self.components.len().cmp(&other.components.len()))
    }
}

impl PartialEq for SoftwareVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl PartialOrd for SoftwareVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl fmt::Display for SoftwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.vstring)
    }
}

/// Compares two version strings
pub fn compare_versions(left: &str, right: &str) -> Result<Ordering, VersionError> {
    SoftwareVersion::parse(left).try_cmp(&SoftwareVersion::parse(right))
}

/// Returns the versions sorted most recent first
///
/// The sort is stable. Every pair is checked for compatibility up front so a
/// single bad version fails the whole list instead of yielding an arbitrary
/// order.
pub fn sort_recent_versions<S: AsRef<str>>(versions: &[S]) -> Result<Vec<String>, VersionError> {
    let mut parsed: Vec<SoftwareVersion> = versions
        .iter()
        .map(|v| SoftwareVersion::parse(v.as_ref()))
        .collect();

    for (i, left) in parsed.iter().enumerate() {
        for right in &parsed[i + 1..] {
            if let Err(err) = left.try_cmp(right) {
                let versions: Vec<String> = parsed.iter().map(|v| v.vstring.clone()).collect();
                error!("Failed to compare versions {:?}: {}", versions, err);
                return Err(VersionError::Unsortable {
                    versions,
                    source: Box::new(err),
                });
            }
        }
    }

    parsed.sort_by(|a, b| b.components.cmp(&a.components));
    Ok(parsed.into_iter().map(|v| v.vstring).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn numeric(value: &str) -> VersionComponent {
        VersionComponent::Numeric(value.to_string())
    }

    fn text(value: &str) -> VersionComponent {
        VersionComponent::Text(value.to_string())
    }

    #[test]
    fn test_parse_toolchain_version() {
        let version = SoftwareVersion::parse("2.69-GCCcore-8.2.0");
        assert_eq!(
            version.components(),
            &[
                numeric("2"),
                numeric("69"),
                text("-GCC"),
                text("core"),
                text("-"),
                numeric("8"),
                numeric("2"),
                numeric("0"),
            ]
        );
    }

    #[test]
    fn test_parse_strips_v_prefix_and_leading_zeros() {
        let version = SoftwareVersion::parse("v007.0");
        assert_eq!(version.components(), &[numeric("7"), numeric("0")]);
        assert_eq!(version.as_str(), "v007.0");
    }

    #[test]
    fn test_parse_letter_release() {
        let version = SoftwareVersion::parse("2019b");
        assert_eq!(version.components(), &[numeric("2019"), text("b")]);
    }

    #[parameterized(
        toolchain_minor = { "2.69-GCCcore-8.2.0", "2.69-GCCcore-8.3.0", Ordering::Less },
        numeric_not_lexical = { "1.10", "1.9", Ordering::Greater },
        leading_zeros = { "01.2", "1.2", Ordering::Equal },
        v_prefix = { "v1.2", "1.3", Ordering::Less },
        letter_release = { "2019b", "2019a", Ordering::Greater },
        shorter_is_older = { "1.0", "1.0.1", Ordering::Less },
        date_versions = { "20180311-GCCcore-8.3.0", "20180311-GCCcore-8.2.0", Ordering::Greater },
        beyond_u64 = { "123456789012345678901234567890", "123456789012345678901234567891", Ordering::Less },
        longer_number_wins = { "100", "99", Ordering::Greater },
    )]
    fn test_compare_versions(left: &str, right: &str, expected: Ordering) {
        assert_eq!(compare_versions(left, right).unwrap(), expected);
        assert_eq!(compare_versions(right, left).unwrap(), expected.reverse());
    }

    #[test]
    fn test_incompatible_components_error() {
        let err = compare_versions("1.2-foss", "1.2.3-foss").unwrap_err();
        match err {
            VersionError::IncompatibleComponents {
                left,
                right,
                index,
                left_component,
                right_component,
            } => {
                assert_eq!(left, "1.2-foss");
                assert_eq!(right, "1.2.3-foss");
                assert_eq!(index, 2);
                assert_eq!(left_component, text("-"));
                assert_eq!(right_component, numeric("3"));
            }
            other => panic!("Expected IncompatibleComponents, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatch_after_decision_is_ignored() {
        // decided at the first component, the rest is never looked at
        assert_eq!(compare_versions("1-abc", "2.3").unwrap(), Ordering::Less);
    }

    #[test]
    fn test_partial_ord() {
        let a = SoftwareVersion::parse("1.2");
        let b = SoftwareVersion::parse("1.3");
        let c = SoftwareVersion::parse("1-x");
        assert!(a < b);
        assert_eq!(SoftwareVersion::parse("1.x").partial_cmp(&b), None);
        assert_eq!(a.partial_cmp(&c), None);
    }

    #[test]
    fn test_equality_matches_ordering() {
        let a = SoftwareVersion::parse("01.2");
        let b = SoftwareVersion::parse("1.2");
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Equal));
        assert!(a <= b && a >= b);
        assert_eq!(a, b);
        assert_ne!(a.as_str(), b.as_str());
        assert_ne!(a, SoftwareVersion::parse("1.2.0"));
    }

    #[test]
    fn test_sort_recent_versions() {
        let sorted = sort_recent_versions(&[
            "0.20.0-GCCcore-8.2.0",
            "0.24.1-GCCcore-8.2.0",
            "0.26.1-GCCcore-8.2.0",
            "0.25.2-GCCcore-8.2.0",
        ])
        .unwrap();
        assert_eq!(
            sorted,
            vec![
                "0.26.1-GCCcore-8.2.0",
                "0.25.2-GCCcore-8.2.0",
                "0.24.1-GCCcore-8.2.0",
                "0.20.0-GCCcore-8.2.0",
            ]
        );
    }

    #[test]
    fn test_sort_recent_versions_idempotent() {
        let versions = vec!["3.10.2", "3.9.1", "3.9.0", "2.7.18"];
        let sorted = sort_recent_versions(&versions).unwrap();
        assert_eq!(sorted, versions);
        assert_eq!(sort_recent_versions(&sorted).unwrap(), sorted);
    }

    #[test]
    fn test_sort_recent_versions_is_stable() {
        let sorted = sort_recent_versions(&["1.0", "2.0", "01.0", "1.00"]).unwrap();
        assert_eq!(sorted, vec!["2.0", "1.0", "01.0", "1.00"]);
    }

    #[test]
    fn test_sort_recent_versions_empty() {
        let empty: Vec<String> = Vec::new();
        assert!(sort_recent_versions(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_sort_recent_versions_reports_offending_list() {
        let err = sort_recent_versions(&["1.0", "1.2-foss", "1.2.3-foss"]).unwrap_err();
        match &err {
            VersionError::Unsortable { versions, source } => {
                assert_eq!(versions, &vec!["1.0", "1.2-foss", "1.2.3-foss"]);
                assert!(matches!(
                    **source,
                    VersionError::IncompatibleComponents { .. }
                ));
            }
            other => panic!("Expected Unsortable, got {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("1.2-foss"));
        assert!(message.contains("1.2.3-foss"));
    }
}
