use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,   // "/api/.../zones/example.com." or "example.com."
    pub name: String, // "example.com.", always trailing-dot terminated
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<String>, // "Zone"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>, // "Native", etc.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rrsets: Vec<Rrset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rrset {
    pub name: String, // "www.example.com."
    #[serde(rename = "type")]
    pub rrtype: String, // "A", "TXT", ...
    // One TTL per rrset. DELETE changetypes explicitly forbid a TTL, so
    // the field is dropped from the JSON entirely when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changetype: Option<ChangeType>,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub content: String, // "192.0.2.1" or "ns1.example.net."
    #[serde(default)]
    pub disabled: bool,
}

/// PowerDNS rrset changetype. The wire strings are part of the server
/// contract: "REPLACE" creates or overwrites, "DELETE" removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Replace,
    Delete,
}
