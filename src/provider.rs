//! Reconciliation driver: reads the server's current records and applies
//! externally computed change-sets, one PATCH per affected zone.

use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::mapper;
use crate::powerdns::ZoneApi;
use crate::powerdns::client::PowerDnsClient;
use crate::powerdns::types::ChangeType;
use crate::record::{Changes, DesiredRecord};

pub struct Provider {
    client: Box<dyn ZoneApi>,
}

impl Provider {
    /// Builds a provider talking to a real PowerDNS server.
    ///
    /// Only the degenerate no-filter configuration is supported, and
    /// dry-run is rejected outright rather than silently ignored.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::config("missing PowerDNS API key"));
        }
        if config.domain_filter.iter().any(|f| !f.is_empty()) {
            return Err(Error::config("domain filters are not supported"));
        }
        if config.dry_run {
            return Err(Error::config("dry-run is not supported"));
        }
        if config.server_url.contains("localhost") {
            warn!("PowerDNS server is set to localhost, this may not be what you want");
        }

        let client = PowerDnsClient::new(config.api_base_url(), config.api_key, config.server_id);
        Ok(Self::with_client(Box::new(client)))
    }

    /// Builds a provider over any [`ZoneApi`] implementation; this is how
    /// tests plug in an in-memory fake.
    pub fn with_client(client: Box<dyn ZoneApi>) -> Self {
        Self { client }
    }

    /// All records the server currently serves, across all zones, flattened
    /// into the desired-record representation. Disabled record values are
    /// excluded. Any per-zone fetch failure aborts the whole read.
    pub async fn records(&self) -> Result<Vec<DesiredRecord>> {
        let zones = self.client.list_zones().await?;

        let mut records = Vec::new();
        for zone in &zones {
            let full = self.client.get_zone(&zone.id).await?;
            for rrset in &full.rrsets {
                records.extend(mapper::flatten_rrset(rrset));
            }
        }

        debug!(count = records.len(), "fetched records from all zones");
        Ok(records)
    }

    /// Applies a change-set. Creates and updates share the REPLACE path
    /// because a PATCH replaces the whole rrset; deletes go out as DELETE.
    pub async fn apply_changes(&self, changes: &Changes) -> Result<()> {
        if !changes.create.is_empty() {
            // "replacing" non-existent rrsets creates them
            self.mutate_records(&changes.create, ChangeType::Replace)
                .await?;
        }

        for record in &changes.update_old {
            // the REPLACE for update_new overwrites the whole rrset anyway
            debug!(?record, "ignoring update_old entry");
        }
        if !changes.update_new.is_empty() {
            self.mutate_records(&changes.update_new, ChangeType::Replace)
                .await?;
        }

        if !changes.delete.is_empty() {
            self.mutate_records(&changes.delete, ChangeType::Delete)
                .await?;
        }

        Ok(())
    }

    /// Groups `records` into per-zone patch documents and dispatches them in
    /// deterministic zone order, stopping at the first failing zone. Zones
    /// already patched are not rolled back.
    async fn mutate_records(
        &self,
        records: &[DesiredRecord],
        changetype: ChangeType,
    ) -> Result<()> {
        // Reject unrepresentable TTLs before touching the network.
        for record in records {
            mapper::rrset_ttl(changetype, record.ttl)?;
        }

        let zones = self.client.list_zones().await?;
        let patches = mapper::group_records(records, &zones, changetype)?;

        for patch in &patches {
            if let Ok(body) = serde_json::to_string(patch) {
                debug!(zone = %patch.zone_name, "sending zone patch: {body}");
            }
            self.client
                .patch_zone(&patch.zone_id, &patch.rrsets)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::powerdns::types::{Record, Rrset, Zone};

    fn generic_api_error() -> Error {
        Error::Api {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "generic PowerDNS error".into(),
        }
    }

    fn zone(name: &str, rrsets: Vec<Rrset>) -> Zone {
        Zone {
            id: name.to_string(),
            name: name.to_string(),
            zone_type: Some("Zone".into()),
            kind: Some("Native".into()),
            rrsets,
        }
    }

    fn rrset(name: &str, rrtype: &str, contents: &[(&str, bool)]) -> Rrset {
        Rrset {
            name: name.to_string(),
            rrtype: rrtype.to_string(),
            ttl: Some(300),
            changetype: None,
            records: contents
                .iter()
                .map(|&(content, disabled)| Record {
                    content: content.into(),
                    disabled,
                })
                .collect(),
        }
    }

    /// Every patch the fake received, shared between the fake (moved into
    /// the provider) and the test making assertions.
    type PatchLog = Arc<Mutex<Vec<(String, Vec<Rrset>)>>>;

    /// In-memory stand-in for the PowerDNS API. Zones are served as-is,
    /// every patch attempt is logged, and individual calls can be made to
    /// fail.
    #[derive(Default)]
    struct FakeZoneApi {
        zones: Vec<Zone>,
        patched: PatchLog,
        fail_list_zones: bool,
        fail_get_zone: bool,
        fail_patch_for: Option<String>,
    }

    impl FakeZoneApi {
        fn with_zones(zones: Vec<Zone>) -> Self {
            Self {
                zones,
                ..Self::default()
            }
        }

        fn patch_log(&self) -> PatchLog {
            Arc::clone(&self.patched)
        }
    }

    #[async_trait]
    impl ZoneApi for FakeZoneApi {
        async fn list_zones(&self) -> Result<Vec<Zone>> {
            if self.fail_list_zones {
                return Err(generic_api_error());
            }
            Ok(self.zones.clone())
        }

        async fn get_zone(&self, zone_id: &str) -> Result<Zone> {
            if self.fail_get_zone {
                return Err(generic_api_error());
            }
            self.zones
                .iter()
                .find(|z| z.id == zone_id)
                .cloned()
                .ok_or_else(generic_api_error)
        }

        async fn patch_zone(&self, zone_id: &str, rrsets: &[Rrset]) -> Result<()> {
            if self.fail_patch_for.as_deref() == Some(zone_id) {
                return Err(generic_api_error());
            }
            self.patched
                .lock()
                .unwrap()
                .push((zone_id.to_string(), rrsets.to_vec()));
            Ok(())
        }
    }

    fn config() -> ProviderConfig {
        ProviderConfig {
            server_url: "http://pdns.internal:8081".into(),
            api_key: "foo".into(),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn construction_requires_an_api_key() {
        let cfg = ProviderConfig {
            api_key: String::new(),
            ..config()
        };
        assert!(matches!(Provider::new(cfg), Err(Error::Config(_))));
    }

    #[test]
    fn construction_rejects_domain_filters() {
        let cfg = ProviderConfig {
            domain_filter: vec!["example.com".into(), "example.org".into()],
            ..config()
        };
        assert!(matches!(Provider::new(cfg), Err(Error::Config(_))));

        // the degenerate single-empty-string filter is "no filter"
        let cfg = ProviderConfig {
            domain_filter: vec![String::new()],
            ..config()
        };
        assert!(Provider::new(cfg).is_ok());
    }

    #[test]
    fn construction_rejects_dry_run() {
        let cfg = ProviderConfig {
            dry_run: true,
            ..config()
        };
        assert!(matches!(Provider::new(cfg), Err(Error::Config(_))));
    }

    #[test]
    fn regular_construction_succeeds() {
        assert!(Provider::new(config()).is_ok());
    }

    #[tokio::test]
    async fn records_flattens_all_zones_and_skips_disabled() {
        let api = FakeZoneApi::with_zones(vec![
            zone(
                "example.com.",
                vec![
                    rrset("example.com.", "A", &[("8.8.8.8", false), ("8.8.4.4", true)]),
                    rrset(
                        "cname.example.com.",
                        "CNAME",
                        &[("other.example.net.", false)],
                    ),
                ],
            ),
            zone(
                "mock.test.",
                vec![rrset("mock.test.", "A", &[("9.9.9.9", false)])],
            ),
        ]);
        let provider = Provider::with_client(Box::new(api));

        let records = provider.records().await.unwrap();
        assert_eq!(
            records,
            vec![
                DesiredRecord::new("example.com.", "A", "8.8.8.8", 300),
                DesiredRecord::new("cname.example.com.", "CNAME", "other.example.net.", 300),
                DesiredRecord::new("mock.test.", "A", "9.9.9.9", 300),
            ]
        );
    }

    #[tokio::test]
    async fn records_propagates_fetch_failures() {
        let api = FakeZoneApi {
            fail_get_zone: true,
            ..FakeZoneApi::with_zones(vec![zone("example.com.", Vec::new())])
        };
        let provider = Provider::with_client(Box::new(api));
        assert!(provider.records().await.is_err());

        let api = FakeZoneApi {
            fail_list_zones: true,
            ..FakeZoneApi::default()
        };
        let provider = Provider::with_client(Box::new(api));
        assert!(provider.records().await.is_err());
    }

    #[tokio::test]
    async fn change_buckets_map_to_replace_and_delete_patches() {
        let api = FakeZoneApi::with_zones(vec![zone("example.com.", Vec::new())]);
        let log = api.patch_log();
        let provider = Provider::with_client(Box::new(api));

        let changes = Changes {
            create: vec![DesiredRecord::new("app.example.com.", "A", "8.8.8.8", 300)],
            update_old: vec![DesiredRecord::new("www.example.com.", "A", "1.1.1.1", 300)],
            update_new: vec![DesiredRecord::new("www.example.com.", "A", "2.2.2.2", 300)],
            delete: vec![DesiredRecord::new("old.example.com.", "A", "3.3.3.3", 0)],
        };
        provider.apply_changes(&changes).await.unwrap();

        let patched = log.lock().unwrap();
        // one patch per non-empty bucket; update_old produces none
        assert_eq!(patched.len(), 3);
        for (zone_id, _) in patched.iter() {
            assert_eq!(zone_id, "example.com.");
        }

        let create = &patched[0].1[0];
        assert_eq!(create.changetype, Some(ChangeType::Replace));
        assert_eq!(create.ttl, Some(300));
        assert_eq!(create.records[0].content, "8.8.8.8");

        let update = &patched[1].1[0];
        assert_eq!(update.changetype, Some(ChangeType::Replace));
        assert_eq!(update.records[0].content, "2.2.2.2");

        let delete = &patched[2].1[0];
        assert_eq!(delete.changetype, Some(ChangeType::Delete));
        assert_eq!(delete.ttl, None);
    }

    #[tokio::test]
    async fn records_patch_into_their_matching_zones() {
        let api = FakeZoneApi::with_zones(vec![
            zone("example.com.", Vec::new()),
            zone("mock.test.", Vec::new()),
        ]);
        let log = api.patch_log();
        let provider = Provider::with_client(Box::new(api));

        let changes = Changes {
            create: vec![
                DesiredRecord::new("mock.test.", "A", "9.9.9.9", 300),
                DesiredRecord::new("example.com.", "A", "8.8.8.8", 300),
            ],
            ..Changes::default()
        };
        provider.apply_changes(&changes).await.unwrap();

        let patched = log.lock().unwrap();
        assert_eq!(patched.len(), 2);
        assert_eq!(patched[0].0, "example.com.");
        assert_eq!(patched[0].1[0].records[0].content, "8.8.8.8");
        assert_eq!(patched[1].0, "mock.test.");
        assert_eq!(patched[1].1[0].records[0].content, "9.9.9.9");
    }

    #[tokio::test]
    async fn dispatch_stops_at_the_first_failing_zone() {
        let api = FakeZoneApi {
            fail_patch_for: Some("example.com.".into()),
            ..FakeZoneApi::with_zones(vec![
                zone("example.com.", Vec::new()),
                zone("mock.test.", Vec::new()),
            ])
        };
        let log = api.patch_log();
        let provider = Provider::with_client(Box::new(api));

        let changes = Changes {
            create: vec![
                DesiredRecord::new("example.com.", "A", "8.8.8.8", 300),
                DesiredRecord::new("mock.test.", "A", "9.9.9.9", 300),
            ],
            ..Changes::default()
        };
        let err = provider.apply_changes(&changes).await.unwrap_err();
        assert!(matches!(err, Error::Api { .. }));

        // "example.com." sorts first and fails, so "mock.test." is never sent
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unmatched_record_aborts_before_any_patch() {
        let api = FakeZoneApi::with_zones(vec![
            zone("example.com.", Vec::new()),
            zone("mock.test.", Vec::new()),
        ]);
        let log = api.patch_log();
        let provider = Provider::with_client(Box::new(api));

        let changes = Changes {
            create: vec![DesiredRecord::new("does.not.exist.com.", "A", "8.8.8.8", 300)],
            ..Changes::default()
        };
        let err = provider.apply_changes(&changes).await.unwrap_err();
        assert!(matches!(err, Error::NoMatchingZone { .. }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ttl_overflow_fails_before_any_network_call() {
        // every call on this fake fails, so reaching the network at all
        // would surface an Api error instead of the overflow
        let api = FakeZoneApi {
            fail_list_zones: true,
            ..FakeZoneApi::default()
        };
        let provider = Provider::with_client(Box::new(api));

        let changes = Changes {
            create: vec![DesiredRecord::new(
                "app.example.com.",
                "A",
                "8.8.8.8",
                i32::MAX as u32 + 1,
            )],
            ..Changes::default()
        };
        let err = provider.apply_changes(&changes).await.unwrap_err();
        assert!(matches!(err, Error::TtlOverflow { .. }));
    }
}
