//! Rings of the portal and what each may depend on.

use std::collections::BTreeSet;
use std::path::Path;

use crate::paths::{self, Segments};
use crate::{Rule, SourceFile, Violation};

/// Web, HTTP client and OpenAPI crates.
const FRAMEWORK_CRATES: &[&str] = &[
    "actix_session",
    "actix_web",
    "awc",
    "reqwest",
    "utoipa",
    "utoipa_swagger_ui",
];

/// Crates that only make sense on the serving side.
const SERVER_CRATES: &[&str] = &["actix_session", "actix_web", "utoipa", "utoipa_swagger_ui"];

/// Domain services layered over the ports, by module and by type.
const SERVICE_MODULES: &[&str] = &["access", "listing", "loan_desk", "login", "user_admin"];
const SERVICE_TYPES: &[&str] = &[
    "AccessGuard",
    "LoanDesk",
    "LoanListing",
    "LoginService",
    "UserAdministration",
];

/// Ring of the portal a source file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Types, policies and services under `domain/`.
    Domain,
    /// Backend seams under `domain/ports/`.
    Ports,
    /// The HTTP adapter under `inbound/`.
    Inbound,
    /// Backend adapters under `outbound/`.
    Outbound,
}

impl Layer {
    /// Layer of a path relative to `portal/src`.
    pub fn of(path: &Path) -> Option<Self> {
        let mut parts = path
            .components()
            .map(|part| part.as_os_str().to_string_lossy());
        match parts.next()?.as_ref() {
            "domain" => match parts.next().as_deref() {
                Some("ports" | "ports.rs") => Some(Self::Ports),
                _ => Some(Self::Domain),
            },
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Ports => "port",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    fn forbidden_modules(self) -> &'static [&'static str] {
        match self {
            Self::Domain | Self::Ports => &["inbound", "outbound"],
            Self::Inbound => &["outbound"],
            Self::Outbound => &["inbound"],
        }
    }

    fn forbidden_crates(self) -> &'static [&'static str] {
        match self {
            Self::Domain | Self::Ports => FRAMEWORK_CRATES,
            Self::Inbound => &["awc", "reqwest"],
            Self::Outbound => SERVER_CRATES,
        }
    }
}

pub(crate) fn check(file: &SourceFile<'_>, named: &BTreeSet<Segments>) -> Vec<Violation> {
    let layer = file.layer;
    let mut messages = BTreeSet::new();
    for segments in named {
        if let Some(internal) = paths::internal(segments) {
            if let Some(root) = internal
                .first()
                .filter(|root| layer.forbidden_modules().contains(&root.as_str()))
            {
                messages.insert((
                    Rule::Layers,
                    format!("{} code must not depend on crate::{root}", layer.name()),
                ));
            }
            if layer == Layer::Ports {
                if let Some(service) = service_dependency(internal) {
                    messages.insert((
                        Rule::Ports,
                        format!("ports must not depend on the `{service}` service"),
                    ));
                }
            }
        } else if let Some(krate) = paths::external_crate(segments)
            .filter(|krate| layer.forbidden_crates().contains(krate))
        {
            messages.insert((
                Rule::Layers,
                format!("{} code must not use the `{krate}` crate", layer.name()),
            ));
        }
    }
    messages
        .into_iter()
        .map(|(rule, message)| file.violation(rule, message))
        .collect()
}

fn service_dependency(internal: &[String]) -> Option<&str> {
    let module = match internal {
        [domain, module, ..] if domain == "domain" => Some(module.as_str()),
        _ => None,
    };
    module
        .filter(|module| SERVICE_MODULES.contains(module))
        .or_else(|| {
            internal
                .iter()
                .map(String::as_str)
                .find(|segment| SERVICE_TYPES.contains(segment))
        })
}
