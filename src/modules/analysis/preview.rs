use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;
use uuid::Uuid;

use crate::modules::analysis::model::UploadedImage;

#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn acquire(&self, image: &UploadedImage) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.live().insert(id);
        debug!(%id, file = %image.file_name, "Preview acquired");

        PreviewHandle {
            id,
            url: format!("preview://{}/{}", id, image.file_name),
            registry: self.clone(),
        }
    }

    fn release(&self, id: Uuid) -> bool {
        let released = self.live().remove(&id);
        debug!(%id, released, "Preview released");
        released
    }

    pub fn live_count(&self) -> usize {
        self.live().len()
    }

    pub fn is_live(&self, id: Uuid) -> bool {
        self.live().contains(&id)
    }
}

/// Display handle for one staged image. Released when dropped, so it is
/// released exactly once.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    url: String,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        let released = self.registry.release(self.id);
        debug_assert!(released, "preview {} released twice", self.id);
    }
}
