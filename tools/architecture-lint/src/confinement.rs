//! Crates that belong to a single adapter.
//!
//! Only adapter files are checked here; `domain` is covered by the layer
//! rule.

use std::collections::BTreeSet;

use crate::paths::{self, Segments};
use crate::{Layer, Rule, SourceFile, Violation};

/// Crate and the path prefixes under `portal/src` allowed to use it.
const CONFINED: &[(&str, &[&str])] = &[
    (
        "actix_session",
        &["inbound/http/session.rs", "inbound/http/session_config"],
    ),
    ("reqwest", &["outbound/backend/"]),
];

pub(crate) fn check(file: &SourceFile<'_>, named: &BTreeSet<Segments>) -> Vec<Violation> {
    if !matches!(file.layer, Layer::Inbound | Layer::Outbound) {
        return Vec::new();
    }
    let used: BTreeSet<&str> = named
        .iter()
        .filter_map(|segments| paths::external_crate(segments))
        .collect();
    let location = file.location();
    CONFINED
        .iter()
        .filter(|(krate, _)| used.contains(krate))
        .filter(|(_, homes)| !homes.iter().any(|home| location.starts_with(home)))
        .map(|(krate, homes)| {
            file.violation(
                Rule::Confinement,
                format!("`{krate}` may only be used under {}", homes.join(" or ")),
            )
        })
        .collect()
}
