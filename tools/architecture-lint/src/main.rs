//! Checks the portal crate's boundaries.
//!
//! Takes the portal crate directory as its only argument; without one it
//! looks for `portal/` beside the workspace manifest.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use architecture_lint::{LintError, Rule};

const RULES: [Rule; 4] = [Rule::Layers, Rule::Ports, Rule::Confinement, Rule::Guard];

fn main() -> ExitCode {
    let Some(portal_dir) = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(default_portal_dir)
    else {
        let _ = writeln!(
            io::stderr().lock(),
            "no portal directory given and no workspace Cargo.toml found"
        );
        return ExitCode::FAILURE;
    };

    match architecture_lint::lint_portal_sources(&portal_dir) {
        Ok(checked) => {
            let _ = writeln!(
                io::stdout().lock(),
                "{checked} portal source file(s) respect the boundaries"
            );
            ExitCode::SUCCESS
        }
        Err(LintError::Violations(found)) => {
            let mut stderr = io::stderr().lock();
            for rule in RULES {
                let broken: Vec<_> = found.iter().filter(|v| v.rule == rule).collect();
                if broken.is_empty() {
                    continue;
                }
                let _ = writeln!(stderr, "{rule} ({}):", broken.len());
                for violation in broken {
                    let _ = writeln!(
                        stderr,
                        "  {}: {}",
                        violation.file.display(),
                        violation.message
                    );
                }
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            let _ = writeln!(io::stderr().lock(), "{err}");
            ExitCode::FAILURE
        }
    }
}

fn default_portal_dir() -> Option<PathBuf> {
    let starts = [
        std::env::current_dir().ok(),
        Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
    ];
    starts
        .iter()
        .flatten()
        .find_map(|start| workspace_root(start))
        .map(|root| root.join("portal"))
}

fn workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            std::fs::read_to_string(dir.join("Cargo.toml"))
                .is_ok_and(|manifest| manifest.contains("[workspace]"))
        })
        .map(Path::to_path_buf)
}
