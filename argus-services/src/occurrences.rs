//! Nearby occurrence count client
//!
//! Counts research-grade recorded occurrences of the candidate taxa around a
//! coordinate, optionally bounded to a date window around the observation
//! date.

use argus_core::{ArgusError, ArgusResult, ContentHash, OccurrenceCount, TaxonId};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters of one nearby-occurrence lookup. Serialized form doubles as
/// the cache fingerprint, so field order is part of the key.
#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceQuery {
    pub taxon_ids: Vec<TaxonId>,
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
    pub observed_after: Option<DateTime<Utc>>,
    pub observed_before: Option<DateTime<Utc>>,
    pub exclude_observation_id: Option<u64>,
    pub research_grade_only: bool,
    pub active_taxa_only: bool,
}

impl OccurrenceQuery {
    pub fn new(taxon_ids: Vec<TaxonId>, lat: f64, lng: f64, radius_km: f64) -> Self {
        Self {
            taxon_ids,
            lat,
            lng,
            radius_km,
            observed_after: None,
            observed_before: None,
            exclude_observation_id: None,
            research_grade_only: true,
            active_taxa_only: true,
        }
    }

    /// Bound the query to `observed_on` plus or minus `days`
    pub fn with_observed_window(mut self, observed_on: NaiveDate, days: i64) -> Self {
        let midpoint = observed_on
            .and_hms_opt(0, 0, 0)
            .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        if let Some(midpoint) = midpoint {
            self.observed_after = Some(midpoint - ChronoDuration::days(days));
            self.observed_before = Some(midpoint + ChronoDuration::days(days));
        }
        self
    }

    pub fn excluding_observation(mut self, observation_id: u64) -> Self {
        self.exclude_observation_id = Some(observation_id);
        self
    }

    /// Content fingerprint of this query, used as the cache key
    pub fn fingerprint(&self) -> ContentHash {
        ContentHash::compute(&serde_json::to_vec(self).unwrap_or_default())
    }
}

#[async_trait]
pub trait OccurrenceService: Send + Sync {
    async fn occurrence_counts(&self, query: &OccurrenceQuery)
        -> ArgusResult<Vec<OccurrenceCount>>;
}

#[derive(Deserialize)]
struct OccurrenceCountsResponse {
    results: Vec<OccurrenceCount>,
}

/// HTTP occurrence count client
pub struct HttpOccurrenceService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpOccurrenceService {
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
impl OccurrenceService for HttpOccurrenceService {
    async fn occurrence_counts(
        &self,
        query: &OccurrenceQuery,
    ) -> ArgusResult<Vec<OccurrenceCount>> {
        let url = format!("{}/observations/species_counts", self.base_url);

        let ids = query
            .taxon_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let mut params: Vec<(&str, String)> = vec![
            ("taxon_id", ids),
            ("lat", query.lat.to_string()),
            ("lng", query.lng.to_string()),
            ("radius", query.radius_km.to_string()),
        ];
        if query.research_grade_only {
            params.push(("quality_grade", "research".to_string()));
        }
        if query.active_taxa_only {
            params.push(("taxon_is_active", "true".to_string()));
        }
        if let Some(after) = query.observed_after {
            params.push(("observed_after", after.format("%Y-%m-%dT%H:%M:%S").to_string()));
        }
        if let Some(before) = query.observed_before {
            params.push(("observed_before", before.format("%Y-%m-%dT%H:%M:%S").to_string()));
        }
        if let Some(not_id) = query.exclude_observation_id {
            params.push(("not_id", not_id.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| ArgusError::Transport(format!("occurrence request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ArgusError::Transport(format!(
                "occurrence service returned status {}",
                response.status()
            )));
        }

        let parsed: OccurrenceCountsResponse = response
            .json()
            .await
            .map_err(|e| ArgusError::MalformedResponse(format!("occurrence response: {}", e)))?;
        Ok(parsed.results)
    }
}
