//! Thin adapter around `qdrant-client` to isolate API usage.

use std::collections::HashMap;

use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{DistanceKind, VerseStoreConfig};
use crate::errors::VerseStoreError;

pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
}

impl QdrantFacade {
    pub fn new(cfg: &VerseStoreConfig) -> Result<Self, VerseStoreError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| VerseStoreError::Qdrant(format!("client build: {e}")))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of points in the collection, or `None` if it does not exist.
    pub async fn point_count(&self) -> Result<Option<u64>, VerseStoreError> {
        let exists = self
            .client
            .collection_exists(self.collection.as_str())
            .await
            .map_err(|e| VerseStoreError::Qdrant(format!("collection_exists: {e}")))?;
        if !exists {
            return Ok(None);
        }

        let res = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| VerseStoreError::Qdrant(format!("count: {e}")))?;
        Ok(Some(res.result.map(|r| r.count).unwrap_or(0)))
    }

    /// Drops the collection if present, then creates it for `size`-dim vectors.
    pub async fn recreate_collection(&self, size: usize) -> Result<(), VerseStoreError> {
        let exists = self
            .client
            .collection_exists(self.collection.as_str())
            .await
            .map_err(|e| VerseStoreError::Qdrant(format!("collection_exists: {e}")))?;
        if exists {
            info!(collection = %self.collection, "dropping existing collection");
            self.client
                .delete_collection(self.collection.as_str())
                .await
                .map_err(|e| VerseStoreError::Qdrant(format!("delete_collection: {e}")))?;
        }

        let distance = match self.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(size as u64, distance)),
            )
            .await
            .map_err(|e| VerseStoreError::Qdrant(format!("create_collection: {e}")))?;

        info!(
            collection = %self.collection,
            size,
            distance = ?self.distance,
            "collection created"
        );
        Ok(())
    }

    /// Upserts `(id, vector, payload)` triples and waits for the write to apply.
    pub async fn upsert(
        &self,
        batch: Vec<(String, Vec<f32>, Value)>,
    ) -> Result<usize, VerseStoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut points = Vec::with_capacity(batch.len());
        for (id, vector, payload) in batch {
            let payload: Payload = payload
                .try_into()
                .map_err(|e| VerseStoreError::Qdrant(format!("payload convert: {e}")))?;
            points.push(PointStruct::new(id, vector, payload));
        }
        let n = points.len();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| VerseStoreError::Qdrant(format!("upsert_points: {e}")))?;

        debug!(collection = %self.collection, points = n, "upsert completed");
        Ok(n)
    }

    /// k-NN search returning `(score, payload)` ordered by score.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
    ) -> Result<Vec<(f32, Value)>, VerseStoreError> {
        let res = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true),
            )
            .await
            .map_err(|e| VerseStoreError::Qdrant(format!("search_points: {e}")))?;

        Ok(res
            .result
            .into_iter()
            .map(|p| (p.score, qpayload_to_json(p.payload)))
            .collect())
    }
}

/// Converts a Qdrant payload into JSON.
///
/// Nested structs/lists are mapped to `Null`; the verse payload is flat.
pub(crate) fn qpayload_to_json(p: HashMap<String, QValue>) -> Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p {
        let j = match v.kind {
            Some(K::StringValue(s)) => Value::String(s),
            Some(K::IntegerValue(i)) => Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => Value::Bool(b),
            _ => Value::Null,
        };
        m.insert(k, j);
    }
    Value::Object(m)
}
