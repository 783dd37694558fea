//! Module identifier parsing and normalization
//!
//! Accepted forms: `name`, `name@version`, `@scope/name`, `@scope/name@version`.

use std::fmt;

use crate::error::{InstaforkError, Result};

/// A parsed module identifier. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleId {
    raw: String,
    package_name: String,
    version: Option<String>,
}

impl ModuleId {
    /// Parse a module identifier as typed on the command line
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let invalid = |reason: &str| InstaforkError::InvalidModuleId {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("identifier is empty"));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(invalid("identifier contains whitespace"));
        }

        // The version separator is the first '@' that is not the scope marker
        let search_from = usize::from(raw.starts_with('@'));
        let (package_name, version) = match raw[search_from..].find('@') {
            Some(idx) => {
                let split = search_from + idx;
                (&raw[..split], Some(&raw[split + 1..]))
            }
            None => (raw, None),
        };

        if let Some(scoped) = package_name.strip_prefix('@') {
            match scoped.split_once('/') {
                Some((scope, name)) if !scope.is_empty() && !name.is_empty() => {}
                _ => return Err(invalid("scoped names must look like @scope/name")),
            }
        }
        if package_name.is_empty() || package_name.ends_with('/') {
            return Err(invalid("package name is empty"));
        }
        if version == Some("") {
            return Err(invalid("version after '@' is empty"));
        }

        Ok(Self {
            raw: raw.to_string(),
            package_name: package_name.to_string(),
            version: version.map(str::to_string),
        })
    }

    /// The identifier exactly as given
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Package name without the version suffix, e.g. `@scope/name`
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Version or range after the package name, if any
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Filesystem-safe token for the whole identifier (archive names)
    pub fn sanitized(&self) -> String {
        sanitize(&self.raw)
    }

    /// Filesystem-safe token for the package name (destination directory)
    pub fn dir_name(&self) -> String {
        sanitize(&self.package_name)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Strip the namespace marker and collapse namespace/version separators into `-`.
///
/// `@scope/name@1.0.0` becomes `scope-name-1.0.0`. Applying it to its own output
/// returns the output unchanged.
pub fn sanitize(name: &str) -> String {
    name.strip_prefix('@')
        .unwrap_or(name)
        .chars()
        .map(|c| if c == '@' || c == '/' { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let id = ModuleId::parse("lodash").unwrap();
        assert_eq!(id.package_name(), "lodash");
        assert_eq!(id.version(), None);
        assert_eq!(id.raw(), "lodash");
    }

    #[test]
    fn test_parse_versioned() {
        let id = ModuleId::parse("express@4.17.1").unwrap();
        assert_eq!(id.package_name(), "express");
        assert_eq!(id.version(), Some("4.17.1"));
    }

    #[test]
    fn test_parse_scoped_with_version() {
        let id = ModuleId::parse("@uber/react-anchor@^1.2.0").unwrap();
        assert_eq!(id.package_name(), "@uber/react-anchor");
        assert_eq!(id.version(), Some("^1.2.0"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "   ", "@", "@scope", "@scope/", "@/name", "name@", "a b"] {
            assert!(
                matches!(
                    ModuleId::parse(input),
                    Err(InstaforkError::InvalidModuleId { .. })
                ),
                "expected '{}' to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("lodash"), "lodash");
        assert_eq!(sanitize("express@1.0.0"), "express-1.0.0");
        assert_eq!(sanitize("@uber/react-anchor"), "uber-react-anchor");
        assert_eq!(sanitize("@uber/react-anchor@2.0.0"), "uber-react-anchor-2.0.0");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for input in ["lodash", "express@1.0.0", "@scope/pkg", "@scope/pkg@^1.0.0"] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn test_dir_name_drops_version() {
        let id = ModuleId::parse("@scope/pkg@1.2.3").unwrap();
        assert_eq!(id.sanitized(), "scope-pkg-1.2.3");
        assert_eq!(id.dir_name(), "scope-pkg");
    }
}
