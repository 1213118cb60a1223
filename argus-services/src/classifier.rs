//! Image classifier client
//!
//! The classifier scores an image and answers a JSON object mapping taxon id
//! to raw confidence. Scores come back unordered and unnormalized.

use argus_core::{ArgusError, ArgusResult, TaxonId, TaxonScore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &[u8]) -> ArgusResult<Vec<TaxonScore>>;
}

/// HTTP classifier client posting the image as a multipart upload
pub struct HttpClassifier {
    url: String,
    client: reqwest::Client,
}

impl HttpClassifier {
    pub fn new(url: &str, timeout: Duration) -> ArgusResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Argus/1.0")
            .build()
            .map_err(|e| ArgusError::Configuration(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image: &[u8]) -> ArgusResult<Vec<TaxonScore>> {
        let part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ArgusError::InvalidInput(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ArgusError::Transport(format!("classifier request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ArgusError::Transport(format!(
                "classifier returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ArgusError::Transport(format!("classifier body read failed: {}", e)))?;
        let raw: HashMap<String, f64> = serde_json::from_str(&body)
            .map_err(|e| ArgusError::MalformedResponse(format!("classifier output: {}", e)))?;

        let mut scores = Vec::with_capacity(raw.len());
        for (id, count) in raw {
            let taxon_id = id.parse::<u32>().map_err(|_| {
                ArgusError::MalformedResponse(format!("non-numeric taxon id {:?}", id))
            })?;
            scores.push(TaxonScore::new(TaxonId(taxon_id), count));
        }
        debug!(scores = scores.len(), "classifier response");
        Ok(scores)
    }
}
