//! Tests for exact cosine-similarity search in `VectorIndex`.

mod common;

use common::chunk;
use proptest::prelude::*;
use ragline::{RagError, VectorIndex};

fn three_entry_index() -> VectorIndex {
    VectorIndex::build(vec![
        (chunk("doc", 0, "x axis"), vec![1.0, 0.0]),
        (chunk("doc", 1, "y axis"), vec![0.0, 1.0]),
        (chunk("doc", 2, "diagonal"), vec![1.0, 1.0]),
    ])
    .unwrap()
}

#[test]
fn returns_most_similar_first() {
    let results = three_entry_index().query(&[1.0, 0.0], 2).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.text, "x axis");
    assert!((results[0].score - 1.0).abs() < 1e-6);
    assert_eq!(results[1].chunk.text, "diagonal");
    assert!((results[1].score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-4);
}

#[test]
fn k_larger_than_index_returns_everything() {
    let results = three_entry_index().query(&[1.0, 0.0], 10).unwrap();
    let texts: Vec<_> = results.iter().map(|r| r.chunk.text.as_str()).collect();
    assert_eq!(texts, ["x axis", "diagonal", "y axis"]);
}

#[test]
fn zero_k_is_invalid() {
    let err = three_entry_index().query(&[1.0, 0.0], 0).unwrap_err();
    assert!(matches!(err, RagError::InvalidConfig { .. }));
    assert!(err.to_string().contains("k = 0"));

    let empty = VectorIndex::build(Vec::new()).unwrap();
    assert!(matches!(empty.query(&[1.0], 0), Err(RagError::InvalidConfig { .. })));
}

#[test]
fn empty_index_returns_empty_result() {
    let index = VectorIndex::build(Vec::new()).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.dimensions(), None);
    assert!(index.query(&[1.0, 2.0, 3.0], 5).unwrap().is_empty());
}

#[test]
fn ties_keep_insertion_order() {
    let index = VectorIndex::build(vec![
        (chunk("a", 0, "first"), vec![2.0, 0.0]),
        (chunk("b", 0, "second"), vec![1.0, 0.0]),
        (chunk("c", 0, "third"), vec![0.0, 1.0]),
        (chunk("d", 0, "fourth"), vec![3.0, 0.0]),
    ])
    .unwrap();
    let results = index.query(&[1.0, 0.0], 4).unwrap();
    let ids: Vec<_> = results.iter().map(|r| r.chunk.document_id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "d", "c"]);
}

#[test]
fn build_rejects_mixed_dimensions_with_context() {
    let err = VectorIndex::build(vec![
        (chunk("doc", 0, "ok"), vec![1.0, 0.0]),
        (chunk("doc", 7, "bad"), vec![1.0, 0.0, 0.0]),
    ])
    .unwrap_err();

    match err {
        RagError::DimensionMismatch { expected, actual, context } => {
            assert_eq!(expected, 2);
            assert_eq!(actual, 3);
            assert!(context.contains("entry 1"), "context was {context}");
            assert!(context.contains("chunk 7"), "context was {context}");
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn build_rejects_empty_vectors() {
    let err = VectorIndex::build(vec![(chunk("doc", 0, "x"), Vec::new())]).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { actual: 0, .. }));
}

#[test]
fn empty_vector_reports_dimension_of_its_neighbours() {
    let err = VectorIndex::build(vec![
        (chunk("doc", 0, "blank"), Vec::new()),
        (chunk("doc", 1, "ok"), vec![1.0, 0.0]),
    ])
    .unwrap_err();

    match err {
        RagError::DimensionMismatch { expected, actual, context } => {
            assert_eq!(expected, 2);
            assert_eq!(actual, 0);
            assert!(context.contains("empty vector at entry 0"), "context was {context}");
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn query_rejects_wrong_dimensionality() {
    let err = three_entry_index().query(&[1.0, 0.0, 0.0], 1).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3, .. }));
}

#[test]
fn zero_query_vector_scores_everything_zero() {
    let results = three_entry_index().query(&[0.0, 0.0], 3).unwrap();
    assert!(results.iter().all(|r| r.score == 0.0));
    assert_eq!(results[0].chunk.text, "x axis");
}

#[test]
fn rebuilding_from_the_same_entries_is_idempotent() {
    let entries = vec![
        (chunk("doc", 0, "a"), vec![0.3, 0.1, 0.9]),
        (chunk("doc", 1, "b"), vec![0.3, 0.1, 0.9]),
        (chunk("doc", 2, "c"), vec![-0.5, 0.2, 0.0]),
        (chunk("doc", 3, "d"), vec![0.9, 0.9, 0.1]),
    ];
    let first = VectorIndex::build(entries.clone()).unwrap().query(&[0.2, 0.4, 0.6], 3).unwrap();
    let second = VectorIndex::build(entries).unwrap().query(&[0.2, 0.4, 0.6], 3).unwrap();
    assert_eq!(first, second);
}

fn arb_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim)
}

/// Scores are non-increasing, the result is bounded by k, and k >= N
/// returns every entry exactly once.
mod prop_query_ordering {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_k(
            vectors in proptest::collection::vec(arb_vector(DIM), 0..20),
            query in arb_vector(DIM),
            k in 1usize..25,
        ) {
            let count = vectors.len();
            let entries = vectors
                .into_iter()
                .enumerate()
                .map(|(i, v)| (chunk("doc", i, &format!("chunk {i}")), v))
                .collect();
            let index = VectorIndex::build(entries).unwrap();
            let results = index.query(&query, k).unwrap();

            prop_assert_eq!(results.len(), k.min(count));
            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }

            if k >= count {
                let mut seen: Vec<usize> = results.iter().map(|r| r.chunk.index).collect();
                seen.sort_unstable();
                prop_assert_eq!(seen, (0..count).collect::<Vec<_>>());
            }
        }
    }
}
