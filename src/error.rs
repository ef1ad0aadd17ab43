// src/error.rs
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A desired record's name is not a suffix of any managed zone.
    /// Fatal to the whole grouping call; the batch is all-or-nothing.
    #[error("no matching zone found for record '{name}'")]
    NoMatchingZone { name: String },

    /// PowerDNS stores rrset TTLs as a signed 32-bit integer.
    #[error("record TTL {ttl} overflows the 32-bit signed rrset TTL field")]
    TtlOverflow { ttl: u32 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("PowerDNS API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid provider configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
