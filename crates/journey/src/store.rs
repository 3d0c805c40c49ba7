//! Journey persistence behind the async [`JourneyStore`] trait.
//!
//! Selection and gesture state never reach a store; only [`Journey`] is
//! serialized (JSON, field names as in the type).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{info, warn};
use uuid::Uuid;

use studio_core::{StudioError, StudioResult};

use crate::types::Journey;

#[async_trait]
pub trait JourneyStore: Send + Sync {
    async fn load(&self, id: Uuid) -> StudioResult<Journey>;

    async fn save(&self, journey: &Journey) -> StudioResult<()>;

    /// All stored journeys, oldest first.
    async fn list(&self) -> StudioResult<Vec<Journey>>;

    /// Journeys that may be instantiated by any business.
    async fn list_templates(&self) -> StudioResult<Vec<Journey>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(Journey::is_shareable_template)
            .collect())
    }
}

/// Thread-safe in-memory store for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryJourneyStore {
    journeys: DashMap<Uuid, Journey>,
}

impl InMemoryJourneyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.journeys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.journeys.is_empty()
    }
}

#[async_trait]
impl JourneyStore for InMemoryJourneyStore {
    async fn load(&self, id: Uuid) -> StudioResult<Journey> {
        self.journeys
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or_else(|| StudioError::NotFound(id.to_string()))
    }

    async fn save(&self, journey: &Journey) -> StudioResult<()> {
        info!(journey_id = %journey.id, steps = journey.steps.len(), "Saving journey");
        self.journeys.insert(journey.id, journey.clone());
        Ok(())
    }

    async fn list(&self) -> StudioResult<Vec<Journey>> {
        let mut journeys: Vec<Journey> = self.journeys.iter().map(|r| r.value().clone()).collect();
        journeys.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(journeys)
    }
}

/// One pretty-printed JSON file per journey: `<dir>/<journey_id>.json`.
#[derive(Debug, Clone)]
pub struct FileJourneyStore {
    dir: PathBuf,
}

impl FileJourneyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl JourneyStore for FileJourneyStore {
    async fn load(&self, id: Uuid) -> StudioResult<Journey> {
        let bytes = match tokio::fs::read(self.path_for(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StudioError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, journey: &Journey) -> StudioResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(journey.id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(journey)?;
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        info!(journey_id = %journey.id, path = %path.display(), "Saved journey");
        Ok(())
    }

    async fn list(&self) -> StudioResult<Vec<Journey>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut journeys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<Journey>(&bytes) {
                Ok(journey) => journeys.push(journey),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable journey file"),
            }
        }

        journeys.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(journeys)
    }
}
