//! Crate entrypoint wiring together configuration, the mapping engine, the
//! PowerDNS client, and the reconciliation driver.

pub mod config;
pub mod error;
pub mod mapper;
pub mod powerdns;
pub mod provider;
pub mod record;

pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use provider::Provider;
pub use record::{Changes, DesiredRecord};
