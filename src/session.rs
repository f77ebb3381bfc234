//! Session-scoped state shared across the surface's sections.

use crate::entities::EntityMap;
use std::path::PathBuf;

/// Mutable state carried across one interactive session.
///
/// Holds the last normalized audio path and the last extracted entities.
/// Each successful stage overwrites its field whole; nothing is merged.
/// One instance per session — never shared between sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    audio_path: Option<PathBuf>,
    entities: Option<EntityMap>,
}

impl SessionState {
    /// Fresh session with no audio and no entities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest normalized audio, replacing any previous one.
    pub fn set_audio(&mut self, path: PathBuf) {
        self.audio_path = Some(path);
    }

    /// The current normalized audio, if any stage produced one.
    pub fn audio_path(&self) -> Option<&PathBuf> {
        self.audio_path.as_ref()
    }

    /// Record the latest extraction result, replacing any previous one.
    pub fn set_entities(&mut self, entities: EntityMap) {
        self.entities = Some(entities);
    }

    /// The current entity map, if extraction has run.
    pub fn entities(&self) -> Option<&EntityMap> {
        self.entities.as_ref()
    }
}
