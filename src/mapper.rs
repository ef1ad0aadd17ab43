//! The endpoint-to-zone mapping engine.
//!
//! Maps a flat, zone-agnostic list of [`DesiredRecord`]s onto the zone/rrset
//! model of the PowerDNS API: each record is routed to the managed zone whose
//! name is the longest suffix of the record name, records sharing
//! (zone, name, type) collapse into a single rrset, and the result is one
//! patch document per affected zone. Emission order is lexicographic
//! throughout so that identical desired state always produces byte-identical
//! patch documents.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::powerdns::types::{ChangeType, Record, Rrset, Zone};
use crate::record::{DesiredRecord, ensure_trailing_dot};

/// Applied when a REPLACE record carries TTL 0 ("use server default").
pub const DEFAULT_TTL: u32 = 300;

/// Everything to be patched into one zone: the rrsets computed by
/// [`group_records`], plus the zone's identity for the PATCH URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZonePatch {
    pub zone_id: String,
    pub zone_name: String,
    pub rrsets: Vec<Rrset>,
}

/// Picks the zone owning `record_name`: the longest zone name that is a
/// byte-wise suffix of it. Zone names are globally unique, so ties cannot
/// occur. DNS names are assumed already case-normalized.
pub fn match_zone<'z>(record_name: &str, zones: &'z [Zone]) -> Result<&'z Zone> {
    zones
        .iter()
        .filter(|zone| record_name.ends_with(&zone.name))
        .max_by_key(|zone| zone.name.len())
        .ok_or_else(|| Error::NoMatchingZone {
            name: record_name.to_string(),
        })
}

/// TTL for an rrset built from a record with the given TTL.
///
/// DELETE rrsets must not carry a TTL at all. For REPLACE, 0 substitutes
/// [`DEFAULT_TTL`], and anything beyond i32::MAX cannot be represented in
/// the server's signed 32-bit TTL field.
pub fn rrset_ttl(changetype: ChangeType, ttl: u32) -> Result<Option<u32>> {
    match changetype {
        ChangeType::Delete => Ok(None),
        ChangeType::Replace => {
            if i32::try_from(ttl).is_err() {
                return Err(Error::TtlOverflow { ttl });
            }
            Ok(Some(if ttl == 0 { DEFAULT_TTL } else { ttl }))
        }
    }
}

/// Groups desired records into per-zone patch documents.
///
/// Pure function over an already-fetched zone list. Records are bucketed
/// zone -> (name, type); multiple records sharing a bucket become one rrset
/// with multiple values, keeping the first record's TTL as the rrset TTL.
/// Zones that end up with no rrsets are not emitted at all. Any record that
/// matches no zone aborts the whole call (the batch is all-or-nothing).
pub fn group_records(
    records: &[DesiredRecord],
    zones: &[Zone],
    changetype: ChangeType,
) -> Result<Vec<ZonePatch>> {
    // BTreeMaps keyed by zone name and (record name, type) give the
    // deterministic emission order; never group via an unordered container.
    let mut grouped: BTreeMap<(&str, &str), BTreeMap<(String, String), Rrset>> = BTreeMap::new();

    for record in records {
        let name = ensure_trailing_dot(&record.name);
        let ttl = rrset_ttl(changetype, record.ttl)?;
        let zone = match_zone(&name, zones)?;

        let rrset = grouped
            .entry((zone.name.as_str(), zone.id.as_str()))
            .or_default()
            .entry((name.clone(), record.rtype.clone()))
            .or_insert_with(|| Rrset {
                name,
                rrtype: record.rtype.clone(),
                ttl,
                changetype: Some(changetype),
                records: Vec::new(),
            });
        rrset.records.push(Record {
            content: record.content.clone(),
            disabled: false,
        });
    }

    Ok(grouped
        .into_iter()
        .map(|((zone_name, zone_id), rrsets)| ZonePatch {
            zone_id: zone_id.to_string(),
            zone_name: zone_name.to_string(),
            rrsets: rrsets.into_values().collect(),
        })
        .collect())
}

/// The inverse transform: one [`DesiredRecord`] per enabled value in an
/// rrset read back from the server. Disabled values are not "live" from the
/// orchestration layer's point of view and are silently dropped. Every
/// member surfaces with the rrset's TTL.
pub fn flatten_rrset(rrset: &Rrset) -> Vec<DesiredRecord> {
    rrset
        .records
        .iter()
        .filter(|record| !record.disabled)
        .map(|record| DesiredRecord {
            name: rrset.name.clone(),
            rtype: rrset.rrtype.clone(),
            content: record.content.clone(),
            ttl: rrset.ttl.unwrap_or(0),
        })
        .collect()
}
