use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointStruct,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use tracing::debug;

use super::error::VectorDbError;
use super::model::{AIRLINE_FIELD, DocumentChunk, IndexHit, StoredChunk, point_id_for_chunk};

#[derive(Clone)]
/// Qdrant-backed policy index.
pub struct QdrantIndex {
    client: Qdrant,
    url: String,
}

impl QdrantIndex {
    /// Creates a client for `url` (gRPC endpoint, e.g. `http://localhost:6334`).
    pub fn new(url: &str) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Returns `true` if the collection exists.
    pub async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.client.collection_exists(name).await.map_err(|e| {
            VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            }
        })
    }

    async fn create_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        let vectors_config = VectorParamsBuilder::new(vector_size, Distance::Cosine);

        self.client
            .create_collection(CreateCollectionBuilder::new(name).vectors_config(vectors_config))
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

/// Async interface over the policy index.
///
/// The retriever only reads (`search`); the write and inspection methods serve
/// seeding and the store check.
pub trait VectorIndex: Send + Sync {
    /// `true` when the backend answers requests.
    fn is_ready(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Creates the collection (cosine distance) if it does not exist.
    fn ensure_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Nearest neighbours of `query`, ascending by distance, optionally
    /// restricted to chunks whose `airline` equals `airline` exactly.
    fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        airline: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<IndexHit>, VectorDbError>> + Send;

    /// Inserts or replaces chunks keyed by chunk id.
    fn upsert_chunks(
        &self,
        collection: &str,
        chunks: Vec<DocumentChunk>,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Number of chunks in the collection.
    fn count(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<u64, VectorDbError>> + Send;

    /// Up to `limit` chunks, in storage order.
    fn sample(
        &self,
        collection: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<StoredChunk>, VectorDbError>> + Send;
}

impl VectorIndex for QdrantIndex {
    async fn is_ready(&self) -> bool {
        self.health_check().await.is_ok()
    }

    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        if !self.collection_exists(name).await? {
            self.create_collection(name, vector_size).await?;
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        airline: Option<&str>,
    ) -> Result<Vec<IndexHit>, VectorDbError> {
        let mut search_builder =
            SearchPointsBuilder::new(collection, query, limit).with_payload(true);

        if let Some(airline) = airline {
            let filter = Filter::must([Condition::matches(AIRLINE_FIELD, airline.to_string())]);
            search_builder = search_builder.filter(filter);
        }

        let response = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        let total = response.result.len();
        let hits: Vec<IndexHit> = response
            .result
            .into_iter()
            .filter_map(|point| {
                StoredChunk::from_payload(&point.payload)
                    .map(|chunk| IndexHit::from_similarity(chunk, point.score))
            })
            .collect();

        if hits.len() < total {
            debug!(
                collection,
                skipped = total - hits.len(),
                "Dropped points without a chunk id payload"
            );
        }

        Ok(hits)
    }

    async fn upsert_chunks(
        &self,
        collection: &str,
        chunks: Vec<DocumentChunk>,
    ) -> Result<(), VectorDbError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = chunks
            .iter()
            .map(|chunk| {
                PointStruct::new(
                    point_id_for_chunk(&chunk.id),
                    chunk.embedding.clone(),
                    chunk.to_payload(),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64, VectorDbError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(|e| VectorDbError::ReadFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn sample(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<StoredChunk>, VectorDbError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(collection)
                    .limit(u32::try_from(limit).unwrap_or(u32::MAX))
                    .with_payload(true)
                    .with_vectors(false),
            )
            .await
            .map_err(|e| VectorDbError::ReadFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| StoredChunk::from_payload(&point.payload))
            .collect())
    }
}
