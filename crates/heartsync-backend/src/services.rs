//! The set of backend services a client session talks to.

use std::sync::Arc;

use crate::memory::MemoryBackend;
use crate::ports::{AuthProvider, ImageHost, ProfileStore, RoomStore};

#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub rooms: Arc<dyn RoomStore>,
    pub images: Arc<dyn ImageHost>,
}

impl Backend {
    /// Every port served by one in-memory backend.
    pub fn from_memory(memory: MemoryBackend) -> Self {
        let memory = Arc::new(memory);
        Self {
            auth: memory.clone(),
            profiles: memory.clone(),
            rooms: memory.clone(),
            images: memory,
        }
    }

    /// Replace the image host, e.g. with [`crate::cloudinary::CloudinaryHost`].
    pub fn with_images(mut self, images: Arc<dyn ImageHost>) -> Self {
        self.images = images;
        self
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
