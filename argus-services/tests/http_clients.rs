//! HTTP client integration tests against a mock server

use argus_core::{ArgusError, TaxonId, TaxonScore};
use argus_services::{
    Classifier, HttpAncestrySource, HttpClassifier, HttpOccurrenceService, HttpTaxonService,
    OccurrenceQuery, OccurrenceService, TaxonDetailService,
};
use argus_taxa::AncestrySource;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn classifier_parses_score_map() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "48662": 81.5,
            "47219": 12.25,
        })))
        .mount(&server)
        .await;

    let client = HttpClassifier::new(&server.uri(), TIMEOUT).unwrap();
    let mut scores = client.classify(b"jpeg bytes").await.unwrap();
    scores.sort_by(|a, b| b.count.partial_cmp(&a.count).unwrap());

    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0], TaxonScore::new(TaxonId(48662), 81.5));
    assert_eq!(scores[1], TaxonScore::new(TaxonId(47219), 12.25));
}

#[tokio::test]
async fn classifier_maps_bad_body_to_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = HttpClassifier::new(&server.uri(), TIMEOUT).unwrap();
    let err = client.classify(b"jpeg bytes").await.unwrap_err();
    assert!(matches!(err, ArgusError::MalformedResponse(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn classifier_maps_server_error_to_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = HttpClassifier::new(&server.uri(), TIMEOUT).unwrap();
    let err = client.classify(b"jpeg bytes").await.unwrap_err();
    assert!(matches!(err, ArgusError::Transport(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn taxon_details_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/taxa"))
        .and(query_param("taxon_id", "1,2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "id": 2,
                    "name": "Chordata",
                    "rank": "phylum",
                    "rank_level": 60.0,
                    "ancestors": [
                        {"id": 1, "name": "Animalia", "rank": "kingdom", "rank_level": 70.0}
                    ]
                },
                {"id": 1, "name": "Animalia", "rank": "kingdom", "rank_level": 70.0}
            ]
        })))
        .mount(&server)
        .await;

    let client = HttpTaxonService::new(&server.uri(), TIMEOUT).unwrap();
    let details = client
        .details_for(&[TaxonId(1), TaxonId(2)])
        .await
        .unwrap();

    assert_eq!(details.len(), 2);
    let chordata = &details[&TaxonId(2)];
    assert_eq!(chordata.name, "Chordata");
    assert_eq!(chordata.ancestor_ids(), vec![TaxonId(1)]);
    assert!(chordata.is_active);
}

#[tokio::test]
async fn replace_inactive_reports_new_taxa() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/taxa/replace_inactive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"taxon_id": 900, "count": 40.0},
                {"taxon_id": 20, "count": 10.0}
            ],
            "newly_added": [900]
        })))
        .mount(&server)
        .await;

    let client = HttpTaxonService::new(&server.uri(), TIMEOUT).unwrap();
    let replaced = client
        .replace_inactive(vec![
            TaxonScore::new(TaxonId(10), 40.0),
            TaxonScore::new(TaxonId(20), 10.0),
        ])
        .await
        .unwrap();

    assert_eq!(replaced.scores.len(), 2);
    assert_eq!(replaced.newly_added, vec![TaxonId(900)]);
}

#[tokio::test]
async fn occurrence_counts_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations/species_counts"))
        .and(query_param("taxon_id", "5,6"))
        .and(query_param("quality_grade", "research"))
        .and(query_param("taxon_is_active", "true"))
        .and(query_param("radius", "100"))
        .and(query_param("not_id", "4242"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"taxon_id": 5, "count": 3},
                {"taxon_id": 6, "count": 1}
            ]
        })))
        .mount(&server)
        .await;

    let client = HttpOccurrenceService::new(&server.uri(), TIMEOUT).unwrap();
    let query = OccurrenceQuery::new(vec![TaxonId(5), TaxonId(6)], 48.2, 16.3, 100.0)
        .excluding_observation(4242);
    let counts = client.occurrence_counts(&query).await.unwrap();

    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].taxon_id, TaxonId(5));
    assert_eq!(counts[0].count, 3);
}

#[tokio::test]
async fn ancestry_source_parses_delimited_chains() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/taxa/ancestries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": 10, "ancestry": "48460/1/2"},
                {"id": 11}
            ]
        })))
        .mount(&server)
        .await;

    let source = HttpAncestrySource::new(&server.uri(), TIMEOUT).unwrap();
    let records = source
        .ancestry_for(&[TaxonId(10), TaxonId(11)])
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[&TaxonId(10)];
    assert_eq!(
        record.ancestor_ids,
        vec![TaxonId(48460), TaxonId(1), TaxonId(2)]
    );
}
