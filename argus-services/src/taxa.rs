//! Taxon detail service client
//!
//! Batch lookup of taxon details (rank, rank level, ancestor chain) and
//! substitution of deprecated taxon identifiers with their active
//! equivalents.

use argus_core::{ArgusError, ArgusResult, TaxonDetail, TaxonId, TaxonScore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Result of replacing inactive taxa in a score set: the updated scores
/// (still-inactive entries removed) and the taxa the substitution introduced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InactiveReplacement {
    pub scores: Vec<TaxonScore>,
    pub newly_added: Vec<TaxonId>,
}

#[async_trait]
pub trait TaxonDetailService: Send + Sync {
    async fn details_for(
        &self,
        taxon_ids: &[TaxonId],
    ) -> ArgusResult<HashMap<TaxonId, TaxonDetail>>;

    async fn replace_inactive(&self, scores: Vec<TaxonScore>) -> ArgusResult<InactiveReplacement>;
}

#[derive(Deserialize)]
struct TaxaResponse {
    results: Vec<TaxonDetail>,
}

#[derive(Serialize)]
struct ReplaceInactiveRequest {
    scores: Vec<TaxonScore>,
}

#[derive(Deserialize)]
struct ReplaceInactiveResponse {
    results: Vec<TaxonScore>,
    #[serde(default)]
    newly_added: Vec<TaxonId>,
}

/// HTTP taxon detail client
pub struct HttpTaxonService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTaxonService {
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

fn join_ids(taxon_ids: &[TaxonId]) -> String {
    taxon_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl TaxonDetailService for HttpTaxonService {
    async fn details_for(
        &self,
        taxon_ids: &[TaxonId],
    ) -> ArgusResult<HashMap<TaxonId, TaxonDetail>> {
        if taxon_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let url = format!("{}/taxa", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("taxon_id", join_ids(taxon_ids))])
            .send()
            .await
            .map_err(|e| ArgusError::Transport(format!("taxa request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ArgusError::Transport(format!(
                "taxa service returned status {}",
                response.status()
            )));
        }

        let parsed: TaxaResponse = response
            .json()
            .await
            .map_err(|e| ArgusError::MalformedResponse(format!("taxa response: {}", e)))?;
        Ok(parsed.results.into_iter().map(|t| (t.id, t)).collect())
    }

    async fn replace_inactive(&self, scores: Vec<TaxonScore>) -> ArgusResult<InactiveReplacement> {
        let url = format!("{}/taxa/replace_inactive", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ReplaceInactiveRequest { scores })
            .send()
            .await
            .map_err(|e| ArgusError::Transport(format!("replace_inactive request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ArgusError::Transport(format!(
                "replace_inactive returned status {}",
                response.status()
            )));
        }

        let parsed: ReplaceInactiveResponse = response
            .json()
            .await
            .map_err(|e| ArgusError::MalformedResponse(format!("replace_inactive response: {}", e)))?;
        Ok(InactiveReplacement {
            scores: parsed.results,
            newly_added: parsed.newly_added,
        })
    }
}
