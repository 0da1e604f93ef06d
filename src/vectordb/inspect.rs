//! Store health check: size, a sample of chunks, and metadata sanity.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{info, warn};

use super::error::VectorDbError;
use super::model::StoredChunk;
use super::VectorIndex;
use crate::constants::AIRLINE_SENTINELS;

/// Chunks peeked by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 3;

const UNKNOWN_AUTHORITY: &str = "unknown";

#[derive(Debug, Clone, Serialize)]
pub struct StoreReport {
    pub collection: String,
    pub total_chunks: u64,
    pub sample: Vec<StoredChunk>,
    /// Airlines in the sample that would never match a lowercase filter.
    pub non_normalized_airlines: Vec<String>,
    pub citable_in_sample: usize,
    pub authority_counts: BTreeMap<String, usize>,
}

impl StoreReport {
    pub fn is_empty(&self) -> bool {
        self.total_chunks == 0
    }

    pub fn airlines_normalized(&self) -> bool {
        self.non_normalized_airlines.is_empty()
    }
}

/// Inspects `collection`. An empty collection yields an empty report.
pub async fn inspect_store<V: VectorIndex>(
    index: &V,
    collection: &str,
    sample_size: usize,
) -> Result<StoreReport, VectorDbError> {
    let total_chunks = index.count(collection).await?;

    let sample = if total_chunks == 0 {
        warn!(collection, "Vector store is empty");
        Vec::new()
    } else {
        let limit = sample_size.min(usize::try_from(total_chunks).unwrap_or(usize::MAX));
        index.sample(collection, limit).await?
    };

    let non_normalized_airlines: Vec<String> = sample
        .iter()
        .map(|c| c.metadata.airline.as_str())
        .filter(|a| !a.is_empty() && !is_normalized_airline(a))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let citable_in_sample = sample.iter().filter(|c| !c.metadata.do_not_cite).count();

    let mut authority_counts = BTreeMap::new();
    for chunk in &sample {
        let authority = if chunk.metadata.authority.is_empty() {
            UNKNOWN_AUTHORITY
        } else {
            chunk.metadata.authority.as_str()
        };
        *authority_counts.entry(authority.to_string()).or_insert(0) += 1;
    }

    if !non_normalized_airlines.is_empty() {
        warn!(
            collection,
            airlines = ?non_normalized_airlines,
            "Found non-lowercase airlines; filtered searches will miss them"
        );
    }

    info!(
        collection,
        total_chunks,
        sampled = sample.len(),
        citable_in_sample,
        "Store inspected"
    );

    Ok(StoreReport {
        collection: collection.to_string(),
        total_chunks,
        sample,
        non_normalized_airlines,
        citable_in_sample,
        authority_counts,
    })
}

/// Lowercase (with at least one cased letter) or one of the uppercase sentinels.
fn is_normalized_airline(airline: &str) -> bool {
    if AIRLINE_SENTINELS.contains(&airline) {
        return true;
    }
    airline.chars().any(char::is_lowercase) && !airline.chars().any(char::is_uppercase)
}
