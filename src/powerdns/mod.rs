//! PowerDNS management API: wire types, the zone API capability trait,
//! and the reqwest-backed client.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::{Rrset, Zone};

/// The three zone operations the reconciliation core needs from a
/// PowerDNS-compatible backend. Implemented over HTTP by
/// [`client::PowerDnsClient`]; tests substitute an in-memory fake.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// All zones the server manages, without rrset contents.
    async fn list_zones(&self) -> Result<Vec<Zone>>;

    /// One zone with its full rrset list.
    async fn get_zone(&self, zone_id: &str) -> Result<Zone>;

    /// Apply the given rrsets (each tagged with a changetype) to a zone.
    async fn patch_zone(&self, zone_id: &str, rrsets: &[Rrset]) -> Result<()>;
}
