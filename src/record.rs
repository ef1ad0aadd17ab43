use serde::{Deserialize, Serialize};

/// One flat DNS record the orchestration layer wants present or absent.
///
/// The target content is an opaque string; protocol-specific encoding
/// (e.g. quoting for TXT) is the producer's responsibility. A TTL of 0
/// means "use the server default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredRecord {
    pub name: String,  // FQDN, normalized to trailing-dot form
    pub rtype: String, // "A", "TXT", "CNAME", ...
    pub content: String,
    #[serde(default)]
    pub ttl: u32,
}

impl DesiredRecord {
    pub fn new(
        name: impl AsRef<str>,
        rtype: impl Into<String>,
        content: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            name: ensure_trailing_dot(name.as_ref()),
            rtype: rtype.into(),
            content: content.into(),
            ttl,
        }
    }
}

/// The externally produced change-set: what to create, replace, and delete.
/// `update_old` is informational only; PATCH replace semantics make the old
/// values irrelevant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Changes {
    pub create: Vec<DesiredRecord>,
    pub update_old: Vec<DesiredRecord>,
    pub update_new: Vec<DesiredRecord>,
    pub delete: Vec<DesiredRecord>,
}

/// Canonical FQDN form used for zone suffix matching.
pub fn ensure_trailing_dot(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}
