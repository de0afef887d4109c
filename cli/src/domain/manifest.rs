//! Dependency manifest parsing: no I/O, no async.
//!
//! The manifest is the project's `requirements.txt`: one requirement per
//! line, `#` comments, and package-manager options on lines starting with `-`.
//! envstrap only reads it to warn early; the package manager stays the
//! authority on what gets installed.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::ManifestError;

/// `name[extras] <specifier>` with an optional environment marker.
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(
        r"^(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[[A-Za-z0-9._,\s-]*\])?\s*(?P<spec>(?:[<>=!~]=?|===)[^;]*)?(?:;.*)?$",
    )
    .expect("valid regex")
});

/// A single `name<specifier>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    /// Version constraint as written, e.g. `==2.0.0` or `>=1,<2`.
    pub specifier: Option<String>,
}

/// A parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    requirements: Vec<Requirement>,
    options: Vec<String>,
}

impl Manifest {
    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Package-manager option lines (`-r base.txt`, `--index-url ...`).
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn package_names(&self) -> Vec<&str> {
        self.requirements.iter().map(|r| r.name.as_str()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty() && self.options.is_empty()
    }
}

/// Parse manifest text.
///
/// # Errors
///
/// Returns [`ManifestError::Malformed`] for the first line that is neither a
/// comment, an option, nor a requirement. Line numbers are 1-based.
pub fn parse_manifest(text: &str) -> Result<Manifest, ManifestError> {
    let mut manifest = Manifest::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('-') {
            manifest.options.push(line.to_string());
            continue;
        }
        let caps = REQUIREMENT_RE
            .captures(line)
            .ok_or_else(|| ManifestError::Malformed {
                line: idx + 1,
                content: raw.trim().to_string(),
            })?;
        manifest.requirements.push(Requirement {
            name: caps["name"].to_string(),
            specifier: caps
                .name("spec")
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty()),
        });
    }

    Ok(manifest)
}

/// A `#` starts a comment at line start or after whitespace; `pkg#frag` is
/// left alone.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(pos) => &line[..pos],
        None => line,
    }
}
