//! End-to-end scoring pipeline
//!
//! Wires the scoring stages together: classify (with inactive-taxon
//! substitution), screen to the target subtree, resolve the common ancestor,
//! fetch nearby occurrence counts, blend, and enrich the final page with
//! taxon details. Classifier output, per-taxon details, and occurrence
//! lookups are memoized in the result cache when one is configured.

use crate::ancestor::{CommonAncestorResolver, RankedCandidate};
use crate::frequency::FrequencyBlender;
use crate::normalize::normalize_scores;
use crate::subtree::filter_to_subtree;
use argus_core::config::ScoringConfig;
use argus_core::{
    ArgusResult, CommonAncestor, ContentHash, OccurrenceCount, ScoredTaxon, TaxonDetail, TaxonId,
    TaxonScore,
};
use argus_services::{
    Classifier, OccurrenceQuery, OccurrenceService, ResultCache, TaxonDetailService,
};
use argus_taxa::{AncestryIndex, AncestrySource};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Input to one scoring request: an image for the classifier, or scores
/// already computed elsewhere
pub enum ScoreInput {
    Image(Vec<u8>),
    Scores(Vec<TaxonScore>),
}

/// Per-request knobs. Unset fields fall back to the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct ScoreContext {
    /// Restrict candidates to this taxon's subtree
    pub target_taxon_id: Option<TaxonId>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub observed_on: Option<NaiveDate>,
    pub day_window: Option<i64>,
    pub exclude_observation_id: Option<u64>,
    pub ancestor_window: Option<usize>,
    pub ancestor_threshold: Option<f64>,
    pub rank_level_cutoff: Option<f64>,
    /// Skip common-ancestor resolution and frequency blending entirely
    pub skip_frequency_analysis: bool,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub results: Vec<ScoredTaxon>,
    pub common_ancestor: Option<CommonAncestor>,
}

impl ScoreOutcome {
    fn empty() -> Self {
        Self {
            results: Vec::new(),
            common_ancestor: None,
        }
    }
}

pub struct ScoringPipeline {
    classifier: Arc<dyn Classifier>,
    taxa: Arc<dyn TaxonDetailService>,
    occurrences: Arc<dyn OccurrenceService>,
    ancestry_source: Arc<dyn AncestrySource>,
    ancestry: Arc<AncestryIndex>,
    cache: Option<Arc<ResultCache>>,
    config: ScoringConfig,
}

impl ScoringPipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        taxa: Arc<dyn TaxonDetailService>,
        occurrences: Arc<dyn OccurrenceService>,
        ancestry_source: Arc<dyn AncestrySource>,
        ancestry: Arc<AncestryIndex>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            classifier,
            taxa,
            occurrences,
            ancestry_source,
            ancestry,
            cache: None,
            config,
        }
    }

    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Score an image (or precomputed score set) into a ranked, blended
    /// identification list with an optional common ancestor.
    pub async fn score(&self, input: ScoreInput, ctx: &ScoreContext) -> ArgusResult<ScoreOutcome> {
        let page_size = ctx
            .page_size
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);

        let mut scores = match input {
            ScoreInput::Image(bytes) => self.classified_scores(&bytes).await?,
            ScoreInput::Scores(raw) => self.substituted(raw).await?,
        };

        scores.retain(|s| s.count > 0.0);
        if let Some(target) = ctx.target_taxon_id {
            // descendant edges come from the candidates' own ancestry
            // records, so the candidates need loading along with the target
            let mut needed: Vec<TaxonId> = Vec::with_capacity(scores.len() + 1);
            needed.push(target);
            needed.extend(scores.iter().map(|s| s.taxon_id));
            self.ancestry
                .ensure_loaded(self.ancestry_source.as_ref(), &needed)
                .await?;
            scores = filter_to_subtree(&scores, target, &self.ancestry);
            if scores.is_empty() {
                debug!(target_taxon = %target, "no candidates under target taxon");
                return Ok(ScoreOutcome::empty());
            }
        }
        scores.sort_by(|a, b| {
            b.count
                .partial_cmp(&a.count)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        normalize_scores(&mut scores);

        let window = ctx.ancestor_window.unwrap_or(self.config.ancestor_window);
        let common_ancestor = if ctx.skip_frequency_analysis {
            None
        } else {
            self.resolve_common_ancestor(&scores, window, ctx).await?
        };
        if let Some(ca) = &common_ancestor {
            info!(taxon = %ca.taxon.id, score = ca.score, "resolved common ancestor");
        }

        let occurrence_counts = if ctx.skip_frequency_analysis {
            Vec::new()
        } else {
            self.nearby_occurrences(&scores, window, common_ancestor.as_ref(), ctx)
                .await?
        };

        let blender = FrequencyBlender::new(&self.ancestry);
        let blended = blender.blend(
            &scores,
            &occurrence_counts,
            common_ancestor.as_ref(),
            page_size,
        );

        let page_ids: Vec<TaxonId> = blended.iter().map(|b| b.taxon_id).collect();
        let details = self.cached_details(&page_ids).await?;
        let results = blended
            .into_iter()
            .filter_map(|b| match details.get(&b.taxon_id) {
                Some(taxon) => Some(ScoredTaxon {
                    taxon: taxon.clone(),
                    combined_score: b.count,
                    vision_score: b.vision_score,
                    frequency_score: b.frequency_score,
                }),
                None => {
                    warn!(taxon = %b.taxon_id, "taxon detail missing, dropping result");
                    None
                }
            })
            .collect();

        Ok(ScoreOutcome {
            results,
            common_ancestor,
        })
    }

    /// Classifier call memoized by image content hash. Cached entries carry
    /// the scores as they were after inactive-taxon substitution.
    async fn classified_scores(&self, image: &[u8]) -> ArgusResult<Vec<TaxonScore>> {
        let key = ContentHash::compute(image);
        if let Some(cache) = &self.cache {
            if let Some(scores) = cache.get_json::<Vec<TaxonScore>>(&key) {
                debug!(%key, "classifier cache hit");
                return Ok(scores);
            }
        }

        let raw = self.classifier.classify(image).await?;
        let scores = self.substituted(raw).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_json(key, &scores) {
                warn!(error = %e, "failed to cache classifier scores");
            }
        }
        Ok(scores)
    }

    /// Substitute deprecated taxon ids and pull ancestry for any taxa the
    /// substitution introduced, so subtree filtering stays correct.
    async fn substituted(&self, scores: Vec<TaxonScore>) -> ArgusResult<Vec<TaxonScore>> {
        let replaced = self.taxa.replace_inactive(scores).await?;
        if !replaced.newly_added.is_empty() {
            debug!(
                count = replaced.newly_added.len(),
                "loading ancestry for substituted taxa"
            );
            self.ancestry
                .ensure_loaded(self.ancestry_source.as_ref(), &replaced.newly_added)
                .await?;
        }
        Ok(replaced.scores)
    }

    async fn resolve_common_ancestor(
        &self,
        scores: &[TaxonScore],
        window: usize,
        ctx: &ScoreContext,
    ) -> ArgusResult<Option<CommonAncestor>> {
        let top: Vec<TaxonScore> = scores.iter().take(window).copied().collect();
        if top.is_empty() {
            return Ok(None);
        }
        let ids: Vec<TaxonId> = top.iter().map(|s| s.taxon_id).collect();
        self.ancestry
            .ensure_loaded(self.ancestry_source.as_ref(), &ids)
            .await?;

        let details = self.cached_details(&ids).await?;
        let candidates: Vec<RankedCandidate> = top
            .iter()
            .filter_map(|s| {
                details.get(&s.taxon_id).map(|taxon| RankedCandidate {
                    taxon: taxon.clone(),
                    vision_score: s.count,
                })
            })
            .collect();

        let resolver = CommonAncestorResolver::new(
            window,
            ctx.ancestor_threshold
                .unwrap_or(self.config.ancestor_threshold),
            ctx.rank_level_cutoff
                .unwrap_or(self.config.rank_level_cutoff),
        );
        Ok(resolver.resolve(&candidates))
    }

    /// Occurrence counts for the window's taxa plus the resolved ancestor,
    /// memoized by the query fingerprint. Without coordinates there is
    /// nothing to ask.
    async fn nearby_occurrences(
        &self,
        scores: &[TaxonScore],
        window: usize,
        common_ancestor: Option<&CommonAncestor>,
        ctx: &ScoreContext,
    ) -> ArgusResult<Vec<OccurrenceCount>> {
        let (lat, lng) = match (ctx.lat, ctx.lng) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Ok(Vec::new()),
        };

        let mut taxon_ids: Vec<TaxonId> = Vec::new();
        if let Some(ca) = common_ancestor {
            taxon_ids.push(ca.taxon.id);
        }
        taxon_ids.extend(scores.iter().take(window).map(|s| s.taxon_id));
        if taxon_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = OccurrenceQuery::new(
            taxon_ids,
            lat,
            lng,
            ctx.radius_km.unwrap_or(self.config.default_radius_km),
        );
        if let Some(observed_on) = ctx.observed_on {
            query = query.with_observed_window(
                observed_on,
                ctx.day_window.unwrap_or(self.config.default_day_window),
            );
        }
        if let Some(not_id) = ctx.exclude_observation_id {
            query = query.excluding_observation(not_id);
        }

        let key = query.fingerprint();
        if let Some(cache) = &self.cache {
            if let Some(counts) = cache.get_json::<Vec<OccurrenceCount>>(&key) {
                debug!(%key, "occurrence cache hit");
                return Ok(counts);
            }
        }
        let counts = self.occurrences.occurrence_counts(&query).await?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_json(key, &counts) {
                warn!(error = %e, "failed to cache occurrence counts");
            }
        }
        Ok(counts)
    }

    fn taxon_cache_key(id: TaxonId) -> ContentHash {
        ContentHash::compute(format!("taxon_{}", id).as_bytes())
    }

    /// Batch detail lookup going through the per-taxon cache
    async fn cached_details(
        &self,
        ids: &[TaxonId],
    ) -> ArgusResult<HashMap<TaxonId, TaxonDetail>> {
        let mut found = HashMap::new();
        let mut missing = Vec::new();
        for &id in ids {
            let cached = self
                .cache
                .as_ref()
                .and_then(|c| c.get_json::<TaxonDetail>(&Self::taxon_cache_key(id)));
            match cached {
                Some(detail) => {
                    found.insert(id, detail);
                }
                None => missing.push(id),
            }
        }

        if !missing.is_empty() {
            let fetched = self.taxa.details_for(&missing).await?;
            for (id, detail) in fetched {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.put_json(Self::taxon_cache_key(id), &detail) {
                        warn!(error = %e, "failed to cache taxon detail");
                    }
                }
                found.insert(id, detail);
            }
        }
        Ok(found)
    }
}
