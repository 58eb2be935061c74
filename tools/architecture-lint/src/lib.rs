//! Boundary lint for the portal crate.
//!
//! Every finding names the rule it broke:
//!
//! - **layers**: `domain` stays free of adapters and of web, HTTP client and
//!   OpenAPI crates. `inbound` never reaches `outbound` or an HTTP client, and
//!   `outbound` never reaches `inbound` or the server crates.
//! - **ports**: `domain/ports` describes the backend seams and must not
//!   depend on the domain services built on top of them.
//! - **confinement**: inside the adapters, the cookie session crate belongs to
//!   the session adapter and the HTTP client crate to `outbound/backend`.
//! - **guard**: each `inbound/http` route handler outside the public entries
//!   calls `guard::enter`, directly or through a helper in the same file.
//!
//! Test sources (`tests.rs`, `test_utils.rs`, `test_support.rs`, `tests/`
//! directories and `#[cfg(test)]` items) are skipped. Run it with `cargo run -p architecture-lint [portal-dir]`.

mod confinement;
mod handlers;
mod layer;
mod paths;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use layer::Layer;

/// Rule a [`Violation`] was reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    Layers,
    Ports,
    Confinement,
    Guard,
}

impl Rule {
    /// Short name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Layers => "layers",
            Self::Ports => "ports",
            Self::Confinement => "confinement",
            Self::Guard => "guard",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One finding in one file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Violation {
    /// File path relative to `portal/src`.
    pub file: PathBuf,
    pub rule: Rule,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.file.display(), self.rule, self.message)
    }
}

/// Why a lint run did not come back clean.
#[derive(Debug)]
pub enum LintError {
    /// Reading the source tree failed.
    Io { path: PathBuf, source: io::Error },
    /// A file sits outside `domain`, `inbound` and `outbound`.
    UnknownLayer(PathBuf),
    /// A file is not valid Rust.
    Parse { file: PathBuf, message: String },
    /// The sources break one or more rules.
    Violations(Vec<Violation>),
}

impl LintError {
    /// Findings, when the run failed because of them.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Violations(found) => found,
            _ => &[],
        }
    }
}

impl fmt::Display for LintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::UnknownLayer(file) => {
                write!(f, "{} is not under domain, inbound or outbound", file.display())
            }
            Self::Parse { file, message } => write!(f, "cannot parse {}: {message}", file.display()),
            Self::Violations(found) => {
                writeln!(f, "{} portal boundary violation(s):", found.len())?;
                for violation in found {
                    writeln!(f, "  {violation}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `portal/src`, with `/` separators.
    pub file: PathBuf,
    pub contents: String,
}

impl LintSource {
    pub fn new(file: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            contents: contents.into(),
        }
    }
}

/// Lint the sources under `portal_dir/src`, returning how many files were
/// checked.
pub fn lint_portal_sources(portal_dir: &Path) -> Result<usize, LintError> {
    let src = portal_dir.join("src");
    let mut sources = Vec::new();
    for layer in ["domain", "inbound", "outbound"] {
        let dir = src.join(layer);
        if dir.is_dir() {
            gather(&src, &dir, &mut sources)?;
        }
    }
    lint_sources(&sources)?;
    Ok(sources.len())
}

/// Lint in-memory sources.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), LintError> {
    let mut found = Vec::new();
    for source in sources {
        let layer = Layer::of(&source.file)
            .ok_or_else(|| LintError::UnknownLayer(source.file.clone()))?;
        let syntax = syn::parse_file(&source.contents).map_err(|err| LintError::Parse {
            file: source.file.clone(),
            message: err.to_string(),
        })?;
        let file = SourceFile {
            path: &source.file,
            layer,
            syntax: &syntax,
        };
        let named = paths::collect(&syntax);
        found.extend(layer::check(&file, &named));
        found.extend(confinement::check(&file, &named));
        found.extend(handlers::check(&file));
    }
    found.sort();
    found.dedup();
    if found.is_empty() {
        Ok(())
    } else {
        Err(LintError::Violations(found))
    }
}

/// A parsed source with its place in the crate.
pub(crate) struct SourceFile<'a> {
    pub(crate) path: &'a Path,
    pub(crate) layer: Layer,
    pub(crate) syntax: &'a syn::File,
}

impl SourceFile<'_> {
    /// Path under `portal/src` joined with `/`, for prefix checks.
    pub(crate) fn location(&self) -> String {
        self.path
            .components()
            .map(|part| part.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub(crate) fn violation(&self, rule: Rule, message: String) -> Violation {
        Violation {
            file: self.path.to_path_buf(),
            rule,
            message,
        }
    }
}

fn gather(src: &Path, dir: &Path, sources: &mut Vec<LintSource>) -> Result<(), LintError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| LintError::Io { path, source }
    };
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        if path.is_dir() {
            gather(src, &path, sources)?;
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(src) else {
            continue;
        };
        if is_test_source(relative) {
            continue;
        }
        let contents = fs::read_to_string(&path).map_err(io_error(&path))?;
        sources.push(LintSource::new(relative, contents));
    }
    Ok(())
}

fn is_test_source(path: &Path) -> bool {
    let stem = path.file_stem().and_then(|stem| stem.to_str());
    matches!(stem, Some("tests" | "test_utils" | "test_support"))
        || path
            .components()
            .any(|component| component.as_os_str() == "tests")
}

#[cfg(test)]
mod tests;
