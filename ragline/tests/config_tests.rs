//! Tests for `RagConfig` validation and serialization.

use std::time::Duration;

use proptest::prelude::*;
use ragline::{RagConfig, RagError};

#[test]
fn default_config_is_valid() {
    let config = RagConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.chunk_size, 200);
    assert_eq!(config.chunk_overlap, 0);
}

#[test]
fn builder_rejects_each_invalid_field() {
    let cases = [
        RagConfig::builder().chunk_size(0),
        RagConfig::builder().chunk_size(10).chunk_overlap(10),
        RagConfig::builder().top_k(0),
        RagConfig::builder().embedding_model(""),
        RagConfig::builder().generation_model("  "),
        RagConfig::builder().request_timeout(Duration::ZERO),
    ];
    for builder in cases {
        assert!(matches!(builder.build(), Err(RagError::InvalidConfig { .. })));
    }
}

#[test]
fn overlap_error_names_both_values() {
    let err = RagConfig::builder().chunk_size(50).chunk_overlap(80).build().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("80") && message.contains("50"), "message was {message}");
}

#[test]
fn config_round_trips_through_json_with_timeout_in_seconds() {
    let config = RagConfig::builder()
        .chunk_size(300)
        .chunk_overlap(30)
        .top_k(5)
        .generation_model("gpt-4o-mini")
        .request_timeout(Duration::from_millis(2500))
        .build()
        .unwrap();

    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["request_timeout"], serde_json::json!(2.5));

    let parsed: RagConfig = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn deserialized_config_can_be_invalid_until_validated() {
    let parsed: RagConfig = serde_json::from_str(
        r#"{"chunk_size":10,"chunk_overlap":20,"top_k":1,
            "embedding_model":"e","generation_model":"g","request_timeout":1}"#,
    )
    .unwrap();
    assert!(matches!(parsed.validate(), Err(RagError::InvalidConfig { .. })));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn builder_accepts_exactly_the_valid_chunk_parameters(
        chunk_size in 0usize..64,
        chunk_overlap in 0usize..64,
        top_k in 0usize..8,
    ) {
        let result = RagConfig::builder()
            .chunk_size(chunk_size)
            .chunk_overlap(chunk_overlap)
            .top_k(top_k)
            .build();
        let valid = chunk_size > 0 && chunk_overlap < chunk_size && top_k > 0;
        prop_assert_eq!(result.is_ok(), valid);
    }
}
