//! HTTP ancestry bulk source
//!
//! Fetches the `/`-delimited ancestry strings of the upstream taxa table and
//! parses them into `AncestryRecord`s for the ancestry index.

use argus_core::{AncestryRecord, ArgusError, ArgusResult, TaxonId};
use argus_taxa::AncestrySource;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Deserialize)]
struct AncestryRow {
    id: TaxonId,
    /// Absent for taxa with no recorded ancestry
    #[serde(default)]
    ancestry: Option<String>,
}

#[derive(Deserialize)]
struct AncestriesResponse {
    results: Vec<AncestryRow>,
}

pub struct HttpAncestrySource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAncestrySource {
    pub fn new(base_url: &str, timeout: Duration) -> ArgusResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Argus/1.0")
            .build()
            .map_err(|e| ArgusError::Configuration(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl AncestrySource for HttpAncestrySource {
    async fn ancestry_for(
        &self,
        taxon_ids: &[TaxonId],
    ) -> ArgusResult<HashMap<TaxonId, AncestryRecord>> {
        if taxon_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let url = format!("{}/taxa/ancestries", self.base_url);
        let ids = taxon_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .client
            .get(&url)
            .query(&[("taxon_id", ids)])
            .send()
            .await
            .map_err(|e| ArgusError::Transport(format!("ancestry request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ArgusError::Transport(format!(
                "ancestry source returned status {}",
                response.status()
            )));
        }

        let parsed: AncestriesResponse = response
            .json()
            .await
            .map_err(|e| ArgusError::MalformedResponse(format!("ancestry response: {}", e)))?;

        // rows without ancestry stay absent from the index
        Ok(parsed
            .results
            .into_iter()
            .filter_map(|row| {
                let ancestry = row.ancestry?;
                Some((row.id, AncestryRecord::from_delimited(row.id, &ancestry)))
            })
            .collect())
    }
}
