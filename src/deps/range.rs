//! npm version range semantics on top of the `semver` crate
//!
//! npm ranges differ from Cargo requirements in a few places: a bare version is
//! exact rather than caret, comparators are separated by spaces, `||` joins
//! alternatives and `a - b` is an inclusive hyphen range. Ranges are translated
//! into one `VersionReq` per `||` alternative.

use semver::{Version, VersionReq};

/// A parsed npm range
#[derive(Debug, Clone)]
pub struct NpmRange {
    alternatives: Vec<VersionReq>,
}

impl NpmRange {
    /// Parse an npm range. Returns `None` for specs that are not version ranges
    /// (git URLs, `file:` paths, dist-tags other than `latest`).
    pub fn parse(range: &str) -> Option<Self> {
        let alternatives = range
            .split("||")
            .map(translate_alternative)
            .map(|req| req.and_then(|r| VersionReq::parse(&r).ok()))
            .collect::<Option<Vec<_>>>()?;

        Some(Self { alternatives })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

/// Whether `installed` satisfies `range` the way `npm` would decide it
pub fn satisfies(installed: &str, range: &str) -> bool {
    let Some(version) = parse_version(installed) else {
        return false;
    };
    NpmRange::parse(range).is_some_and(|r| r.matches(&version))
}

/// Parse an installed version string, tolerating a leading `v` or `=`
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim().trim_start_matches('=').trim_start_matches('v');
    Version::parse(trimmed).ok()
}

fn translate_alternative(alternative: &str) -> Option<String> {
    let alternative = alternative.trim();
    if alternative.is_empty() || alternative == "latest" {
        return Some("*".to_string());
    }

    if let Some((low, high)) = alternative.split_once(" - ") {
        let low = translate_comparator(&format!(">={}", low.trim()))?;
        let high = translate_comparator(&format!("<={}", high.trim()))?;
        return Some(join_comparators(vec![low, high]));
    }

    let comparators = merge_operator_tokens(alternative)
        .iter()
        .map(|c| translate_comparator(c))
        .collect::<Option<Vec<_>>>()?;
    Some(join_comparators(comparators))
}

/// npm allows `>= 1.2.3`; glue a lone operator to the version that follows it
fn merge_operator_tokens(alternative: &str) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;

    for token in alternative.split_whitespace() {
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            pending_op = Some(token);
            continue;
        }
        match pending_op.take() {
            Some(op) => merged.push(format!("{op}{token}")),
            None => merged.push(token.to_string()),
        }
    }
    merged
}

fn translate_comparator(comparator: &str) -> Option<String> {
    let split = comparator
        .find(|c: char| !matches!(c, '<' | '>' | '=' | '~' | '^'))
        .unwrap_or(comparator.len());
    let (op, version) = comparator.split_at(split);
    let version = version.trim_start_matches('v');

    // Drop wildcard components: `1.x` -> `1`, `1.2.*` -> `1.2`
    let parts: Vec<&str> = version
        .split('.')
        .take_while(|part| !matches!(*part, "x" | "X" | "*" | ""))
        .collect();
    if parts.is_empty() {
        return Some("*".to_string());
    }
    if !parts[0].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    // A bare npm version is exact; `=` keeps partials as "any patch/minor"
    let op = match op {
        "" => "=",
        "~>" => "~",
        other => other,
    };
    Some(format!("{op}{}", parts.join(".")))
}

fn join_comparators(comparators: Vec<String>) -> String {
    if comparators.iter().any(|c| c != "*") {
        comparators
            .into_iter()
            .filter(|c| c != "*")
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        "*".to_string()
    }
}
