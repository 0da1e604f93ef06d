//! End-to-end retrieval over the in-memory index with the stub models.

use std::sync::Arc;

use futures_util::future::join_all;

use waypoint::embedding::{EmbeddingModel, MockCrossEncoder};
use waypoint::{
    ChunkMetadata, Confidence, DocumentChunk, E5Embedder, EmbeddingError, FilterUsed, LazyModel,
    MockVectorIndex, Reranker, RerankerError, Retriever, RetrieverConfig, inspect_store,
};

const COLLECTION: &str = "policies";

type StubRetriever = Retriever<
    LazyModel<E5Embedder, EmbeddingError>,
    LazyModel<Reranker, RerankerError>,
    MockVectorIndex,
>;

fn corpus(encoder: &E5Embedder) -> Vec<DocumentChunk> {
    let rows = [
        (
            "delta-refund-0",
            "Delta issues a refund for a cancelled flight within 7 days",
            "delta",
            "AIRLINE",
            false,
        ),
        (
            "delta-bags-0",
            "Delta checked baggage allowance is two bags on international routes",
            "delta",
            "AIRLINE",
            false,
        ),
        (
            "united-refund-0",
            "United refunds cancelled flight tickets to the original form of payment",
            "united",
            "AIRLINE",
            false,
        ),
        (
            "dot-refund-0",
            "Airlines must refund a cancelled flight when the passenger declines rebooking",
            "DOT",
            "REGULATOR",
            false,
        ),
        (
            "internal-0",
            "Refund cancelled flight escalation playbook for agents",
            "INTERNAL",
            "INTERNAL_META",
            true,
        ),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (id, text, airline, authority, do_not_cite))| {
            let passage = format!("passage: {text}");
            let embedding = encoder
                .encode(&[passage.as_str()])
                .unwrap()
                .pop()
                .unwrap();
            DocumentChunk::new(
                *id,
                *text,
                embedding,
                ChunkMetadata::new(*airline, *authority)
                    .with_do_not_cite(*do_not_cite)
                    .with_chunk_index(i as u32),
            )
        })
        .collect()
}

fn stub_retriever() -> (Arc<StubRetriever>, Arc<MockVectorIndex>) {
    let encoder = E5Embedder::stub().unwrap();
    let index = Arc::new(
        MockVectorIndex::with_chunks(
            COLLECTION,
            encoder.embedding_dim() as u64,
            corpus(&encoder),
        )
        .unwrap(),
    );

    let embedder = Arc::new(LazyModel::new("embedder", E5Embedder::stub));
    let reranker = Arc::new(LazyModel::new("reranker", Reranker::stub));

    let retriever = Retriever::new(
        embedder,
        reranker,
        Arc::clone(&index),
        RetrieverConfig::default().with_collection(COLLECTION),
    )
    .unwrap();

    (Arc::new(retriever), index)
}

#[tokio::test]
async fn test_matching_airline_keeps_filter() {
    let (retriever, index) = stub_retriever();

    let outcome = retriever
        .search("refund cancelled flight", Some("Delta"))
        .await
        .unwrap();

    assert_eq!(outcome.filter_used, FilterUsed::Airline("delta".to_string()));
    assert_eq!(outcome.candidates[0].id, "delta-refund-0");
    assert!(outcome.top_score >= 0.15);
    assert_ne!(outcome.confidence(), Confidence::None);
    assert_eq!(index.search_calls(), 1);
}

#[tokio::test]
async fn test_unknown_airline_falls_back_to_unfiltered() {
    let (retriever, index) = stub_retriever();

    let outcome = retriever
        .search("refund cancelled flight", Some("lufthansa"))
        .await
        .unwrap();

    assert_eq!(outcome.filter_used.to_string(), "none");
    assert!(!outcome.candidates.is_empty());
    assert_eq!(
        index.search_filters(),
        vec![Some("lufthansa".to_string()), None]
    );
}

#[tokio::test]
async fn test_results_are_citable_and_ordered() {
    let (retriever, _) = stub_retriever();

    let outcome = retriever
        .search("refund cancelled flight", None)
        .await
        .unwrap();

    assert!(outcome.candidates.iter().all(|c| !c.metadata.do_not_cite));
    assert!(
        outcome
            .candidates
            .windows(2)
            .all(|w| w[0].score() >= w[1].score())
    );
    assert!(outcome.candidates.len() <= 6);
    assert!(
        outcome
            .candidates
            .iter()
            .all(|c| (0.0..=1.0).contains(&c.score()))
    );
}

#[tokio::test]
async fn test_repeated_search_is_served_from_caches() {
    let (retriever, _) = stub_retriever();

    let cold = retriever.search("checked baggage", None).await.unwrap();
    let warm = retriever.search("checked baggage", None).await.unwrap();

    assert_eq!(cold.candidates, warm.candidates);
    assert_eq!(retriever.embedding_cache().stats().snapshot().hits, 1);
    assert!(retriever.rerank_cache().stats().snapshot().hits >= 1);
}

#[tokio::test]
async fn test_warmup_loads_models_once() {
    let (retriever, _) = stub_retriever();

    let first = retriever.warmup().await;
    let second = retriever.warmup().await;

    assert!(first.all_ready());
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_searches() {
    let (retriever, _) = stub_retriever();

    let searches = (0..16).map(|i| {
        let retriever = Arc::clone(&retriever);
        async move {
            let airline = if i % 2 == 0 { Some("delta") } else { Some("united") };
            retriever
                .search("refund cancelled flight", airline)
                .await
                .map(|outcome| (airline, outcome))
        }
    });

    let results = join_all(searches).await;

    for result in results {
        let (airline, outcome) = result.unwrap();
        let expected = airline.unwrap();
        assert_eq!(outcome.filter_used.to_string(), expected);
        assert!(
            outcome
                .candidates
                .iter()
                .all(|c| c.metadata.airline == expected)
        );
    }
}

#[tokio::test]
async fn test_reranker_failure_surfaces_as_error() {
    let encoder = E5Embedder::stub().unwrap();
    let index = Arc::new(
        MockVectorIndex::with_chunks(
            COLLECTION,
            encoder.embedding_dim() as u64,
            corpus(&encoder),
        )
        .unwrap(),
    );
    let cross = Arc::new(MockCrossEncoder::new(0.5));
    cross.set_failing(true);

    let retriever = Retriever::new(
        Arc::new(encoder),
        cross,
        index,
        RetrieverConfig::default().with_collection(COLLECTION),
    )
    .unwrap();

    let err = retriever.search("refund", None).await.unwrap_err();

    assert!(!err.is_index_error());
    assert!(err.to_string().contains("reranking failed"));
}

#[tokio::test]
async fn test_inspect_seeded_store() {
    let (_, index) = stub_retriever();

    let report = inspect_store(index.as_ref(), COLLECTION, 10).await.unwrap();

    assert_eq!(report.total_chunks, 5);
    assert!(report.airlines_normalized());
    assert_eq!(report.citable_in_sample, 4);
    assert_eq!(report.authority_counts.get("AIRLINE"), Some(&3));
}
