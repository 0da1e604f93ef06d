use std::collections::HashMap;

use qdrant_client::qdrant::Value;
use serde::{Deserialize, Serialize};

/// Payload key holding the chunk's string id (Qdrant point ids are numeric).
pub const CHUNK_ID_FIELD: &str = "chunk_id";
pub const TEXT_FIELD: &str = "text";
/// Payload key the airline filter matches on.
pub const AIRLINE_FIELD: &str = "airline";

/// Provenance and citation metadata attached to every chunk.
///
/// `airline` is stored lowercase; filtering is exact equality on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkMetadata {
    pub source_file: String,
    pub source: String,
    pub url: String,
    pub captured_on: String,
    pub authority: String,
    pub airline: String,
    pub domain: String,
    pub do_not_cite: bool,
    pub chunk_index: u32,
}

impl ChunkMetadata {
    pub fn new(airline: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            airline: airline.into(),
            authority: authority.into(),
            ..Default::default()
        }
    }

    pub fn with_do_not_cite(mut self, do_not_cite: bool) -> Self {
        self.do_not_cite = do_not_cite;
        self
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = source_file.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_chunk_index(mut self, chunk_index: u32) -> Self {
        self.chunk_index = chunk_index;
        self
    }

    fn to_payload(&self) -> HashMap<String, Value> {
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert("source_file".to_string(), self.source_file.clone().into());
        payload.insert("source".to_string(), self.source.clone().into());
        payload.insert("url".to_string(), self.url.clone().into());
        payload.insert("captured_on".to_string(), self.captured_on.clone().into());
        payload.insert("authority".to_string(), self.authority.clone().into());
        payload.insert(AIRLINE_FIELD.to_string(), self.airline.clone().into());
        payload.insert("domain".to_string(), self.domain.clone().into());
        payload.insert("do_not_cite".to_string(), self.do_not_cite.into());
        payload.insert("chunk_index".to_string(), (self.chunk_index as i64).into());
        payload
    }

    fn from_payload(payload: &HashMap<String, Value>) -> Self {
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_default()
        };

        Self {
            source_file: text("source_file"),
            source: text("source"),
            url: text("url"),
            captured_on: text("captured_on"),
            authority: text("authority"),
            airline: text(AIRLINE_FIELD),
            domain: text("domain"),
            do_not_cite: payload
                .get("do_not_cite")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            chunk_index: payload
                .get("chunk_index")
                .and_then(|v| v.as_integer())
                .and_then(|i| u32::try_from(i).ok())
                .unwrap_or(0),
        }
    }
}

/// A persisted policy chunk: text, `passage:`-prefixed embedding, metadata.
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        embedding: Vec<f32>,
        metadata: ChunkMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            embedding,
            metadata,
        }
    }

    pub(crate) fn to_payload(&self) -> HashMap<String, Value> {
        let mut payload = self.metadata.to_payload();
        payload.insert(CHUNK_ID_FIELD.to_string(), self.id.clone().into());
        payload.insert(TEXT_FIELD.to_string(), self.text.clone().into());
        payload
    }
}

/// A chunk read back from the index (no vector).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredChunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl StoredChunk {
    /// Rebuilds a chunk from a Qdrant payload; `None` if the chunk id is missing.
    pub fn from_payload(payload: &HashMap<String, Value>) -> Option<Self> {
        let id = payload.get(CHUNK_ID_FIELD)?.as_str()?.to_string();
        let text = payload
            .get(TEXT_FIELD)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default();

        Some(Self {
            id,
            text,
            metadata: ChunkMetadata::from_payload(payload),
        })
    }
}

impl From<&DocumentChunk> for StoredChunk {
    fn from(chunk: &DocumentChunk) -> Self {
        Self {
            id: chunk.id.clone(),
            text: chunk.text.clone(),
            metadata: chunk.metadata.clone(),
        }
    }
}

/// Stage-one hit. `distance` is `1 - cosine similarity` (lower is closer).
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

impl IndexHit {
    pub fn from_similarity(chunk: StoredChunk, similarity: f32) -> Self {
        Self {
            id: chunk.id,
            text: chunk.text,
            metadata: chunk.metadata,
            distance: 1.0 - similarity,
        }
    }
}

/// Numeric Qdrant point id for a chunk id (first 8 bytes of its BLAKE3 hash).
pub fn point_id_for_chunk(chunk_id: &str) -> u64 {
    let hash = blake3::hash(chunk_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Lowercases and trims an airline name; blank input means "no filter".
pub fn normalize_airline(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
