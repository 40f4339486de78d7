//! MapBiomas Fogo API client.
//!
//! Fetches burned-area time series and territory metadata from
//! `plataforma.monitorfogo.mapbiomas.org` and maps transport or payload
//! failures to [`Error::Upstream`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use common::config::UpstreamConfig;
use common::{
    AnnualPoint, Error, MonthlyPoint, RawSeries, SeriesProvider, Territory, TerritoryKey,
    Translation,
};
use serde::Deserialize;
use tracing::debug;

/// Search term used when the caller passes a blank one.
const DEFAULT_SEARCH_TERM: &str = "Rio de Janeiro";

/// MapBiomas API client with connection pooling and a browser-like
/// User-Agent (the upstream rejects requests without one).
#[derive(Debug, Clone)]
pub struct MapBiomasClient {
    client: reqwest::Client,
    base_url: String,
}

// ── Response types ────────────────────────────────────────────────────

/// Payload of `/statistics/time-series/{type}/{id}/{grouping}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesResponse {
    #[serde(default)]
    pub annual: Vec<AnnualPoint>,
    #[serde(default)]
    pub monthly: Vec<MonthlyPoint>,
}

impl TimeSeriesResponse {
    fn is_empty(&self) -> bool {
        self.annual.is_empty() && self.monthly.is_empty()
    }
}

// ── Implementation ────────────────────────────────────────────────────

impl MapBiomasClient {
    pub fn new(cfg: &UpstreamConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(
                "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) \
                 AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 \
                 Mobile Safari/537.36",
            )
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .expect("failed to build MapBiomas HTTP client");

        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the annual and monthly burned-area series for a territory.
    ///
    /// An entirely empty payload counts as an upstream failure — the API
    /// answers that way when it cannot resolve the territory.
    pub async fn fetch_time_series(&self, key: &TerritoryKey) -> Result<TimeSeriesResponse, Error> {
        let url = format!(
            "{}/statistics/time-series/{}/{}/{}?monthStart=1&monthEnd=12",
            self.base_url, key.local_type, key.local_id, key.grouping
        );

        debug!("Fetching time series: {}", url);

        let data: TimeSeriesResponse = self.get_json(&url, &key.to_string()).await?;
        if data.is_empty() {
            return Err(Error::Upstream(format!(
                "empty time-series payload for {key}"
            )));
        }

        debug!(
            "Got {} annual and {} monthly points for {}",
            data.annual.len(),
            data.monthly.len(),
            key
        );

        Ok(data)
    }

    /// Search territories by name or code.
    pub async fn search_territories(&self, term: &str) -> Result<Vec<Territory>, Error> {
        let term = term.trim();
        let term = if term.is_empty() {
            DEFAULT_SEARCH_TERM
        } else {
            term
        };
        let url = format!("{}/territories/search/{}", self.base_url, term);

        debug!("Searching territories: {}", url);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json, text/plain, */*")
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("HTTP error searching '{term}': {e}")))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(500).collect();
            return Err(Error::Upstream(format!(
                "MapBiomas returned {status} searching '{term}': {snippet}"
            )));
        }

        let territories: Vec<Territory> = resp
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("JSON parse error searching '{term}': {e}")))?;

        if territories.is_empty() {
            return Err(Error::Upstream(format!(
                "territory search for '{term}' returned an empty result"
            )));
        }

        Ok(territories)
    }

    /// Fetch the grouping options available for a territory, with their
    /// pt/es/en labels.
    pub async fn fetch_groupings(
        &self,
        local_type: &str,
        local_code: &str,
    ) -> Result<BTreeMap<String, Translation>, Error> {
        let url = format!(
            "{}/territories/{}/{}/groupings",
            self.base_url, local_type, local_code
        );

        debug!("Fetching groupings: {}", url);

        let ctx = format!("{local_type}/{local_code}");
        let groupings: BTreeMap<String, Translation> = self.get_json(&url, &ctx).await?;
        if groupings.is_empty() {
            return Err(Error::Upstream(format!(
                "no groupings available for {}/{}",
                local_type, local_code
            )));
        }

        Ok(groupings)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        ctx: &str,
    ) -> Result<T, Error> {
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json, text/plain, */*")
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("HTTP error for {ctx}: {e}")))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(500).collect();
            return Err(Error::Upstream(format!(
                "MapBiomas returned {status} for {ctx}: {snippet}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| Error::Upstream(format!("JSON parse error for {ctx}: {e}")))
    }
}

#[async_trait]
impl SeriesProvider for MapBiomasClient {
    /// Fetch the raw series and enrich it with the territory's display
    /// name from the search endpoint. Falls back to "unknown" when the
    /// search result has no entry of the requested type.
    async fn fetch_raw_series(&self, key: &TerritoryKey) -> Result<RawSeries, Error> {
        let series = self.fetch_time_series(key).await?;

        let territories = self.search_territories(&key.local_id).await?;
        let local_name = territories
            .iter()
            .find(|t| t.territory_type == key.local_type)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(RawSeries {
            local_name,
            annual: series.annual,
            monthly: series.monthly,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_series_payload_parsing() {
        let json = r#"{
            "annual": [
                {"year": 2019, "areaHa": 10.0},
                {"year": 2020, "areaHa": 15.0}
            ],
            "monthly": [
                {"year": 2020, "month": 8, "areaHa": 7.5}
            ]
        }"#;
        let parsed: TimeSeriesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.annual.len(), 2);
        assert_eq!(parsed.annual[1].area_ha, 15.0);
        assert_eq!(parsed.monthly[0].month, 8);
    }

    #[test]
    fn test_missing_series_fields_default_to_empty() {
        let parsed: TimeSeriesResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_groupings_payload_parsing() {
        let json = r#"{
            "biome": {"pt": "Bioma", "es": "Bioma", "en": "Biome"},
            "state": {"pt": "Estado", "es": "Estado", "en": "State"}
        }"#;
        let parsed: BTreeMap<String, Translation> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["biome"].en, "Biome");
    }
}
