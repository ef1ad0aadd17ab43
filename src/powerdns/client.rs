use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::powerdns::ZoneApi;
use crate::powerdns::types::*;

#[derive(Clone)]
pub struct PowerDnsClient {
    http: Client,
    base_url: String, // e.g. "http://127.0.0.1:8081/api/v1"
    api_key: String,
    server_id: String, // usually "localhost"
}

impl PowerDnsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            server_id: server_id.into(),
        }
    }

    fn auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-API-Key", &self.api_key)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/servers/{}/{}",
            self.base_url,
            self.server_id,
            path.trim_start_matches('/')
        )
    }
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(Error::Api { status, body });
    }
    Ok(res)
}

#[async_trait]
impl ZoneApi for PowerDnsClient {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let url = self.url("zones");
        let res = self.auth_header(self.http.get(url)).send().await?;
        Ok(check_status(res).await?.json::<Vec<Zone>>().await?)
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Zone> {
        let url = self.url(&format!("zones/{}", zone_id));
        let res = self.auth_header(self.http.get(url)).send().await?;
        Ok(check_status(res).await?.json::<Zone>().await?)
    }

    async fn patch_zone(&self, zone_id: &str, rrsets: &[Rrset]) -> Result<()> {
        #[derive(Serialize)]
        struct PatchBody<'a> {
            rrsets: &'a [Rrset],
        }

        let url = self.url(&format!("zones/{}", zone_id));
        let body = PatchBody { rrsets };
        let res = self
            .auth_header(self.http.patch(url))
            .json(&body)
            .send()
            .await?;
        check_status(res).await?;
        Ok(())
    }
}
