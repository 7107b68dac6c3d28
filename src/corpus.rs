use crate::error::CorpusError;
use crate::markov::TextModel;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Corpus-backed model cache keyed on the file's modification time.
///
/// The model is rebuilt only when the corpus file changes on disk, so
/// corpus edits are picked up on the next command without a restart.
#[derive(Debug)]
pub struct ModelCache {
    path: PathBuf,
    slot: RwLock<Option<CacheSlot>>,
}

#[derive(Debug)]
struct CacheSlot {
    modified: SystemTime,
    model: Arc<TextModel>,
}

impl ModelCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the current model, rebuilding it if the corpus changed on disk
    pub async fn model(&self) -> Result<Arc<TextModel>, CorpusError> {
        let modified = std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|source| CorpusError::Unreadable {
                path: self.path.clone(),
                source,
            })?;

        {
            let slot = self.slot.read().await;
            if let Some(cached) = slot.as_ref() {
                if cached.modified == modified {
                    debug!(path = %self.path.display(), "Corpus unchanged, reusing model");
                    return Ok(Arc::clone(&cached.model));
                }
            }
        }

        let text =
            std::fs::read_to_string(&self.path).map_err(|source| CorpusError::Unreadable {
                path: self.path.clone(),
                source,
            })?;
        let model = Arc::new(TextModel::from_corpus(&text));
        info!(
            path = %self.path.display(),
            sentences = model.sentence_count(),
            "Built text model from corpus"
        );

        let mut slot = self.slot.write().await;
        *slot = Some(CacheSlot {
            modified,
            model: Arc::clone(&model),
        });

        Ok(model)
    }
}
