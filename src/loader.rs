//! Asset loader collaborator.
//!
//! The manager never decodes images. It hands a [`LoadRequest`] per load slot
//! to an [`AssetLoader`] together with a [`LoadSender`]; the loader answers
//! with exactly one [`LoadCompletion`] per request, whenever it likes and
//! from whichever thread it likes. Completions are drained on the game-loop
//! thread by [`poll_load_completions`](crate::systems::loading::poll_load_completions).

use std::path::PathBuf;

use crossbeam_channel::Sender;

use crate::resources::assetcatalog::{BitmapHandle, SlotId};

/// What the loader is asked to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub slot: SlotId,
    /// Name as registered.
    pub name: String,
    /// Name resolved against the configured asset base path.
    pub path: PathBuf,
}

/// A decoded bitmap as reported by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedBitmap {
    pub handle: BitmapHandle,
    pub width: u32,
    pub height: u32,
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCompletion {
    pub slot: SlotId,
    pub result: Result<LoadedBitmap, String>,
}

/// Channel end a loader reports completions on.
#[derive(Debug, Clone)]
pub struct LoadSender {
    tx: Sender<LoadCompletion>,
}

impl LoadSender {
    pub(crate) fn new(tx: Sender<LoadCompletion>) -> Self {
        Self { tx }
    }

    pub fn loaded(&self, slot: SlotId, bitmap: LoadedBitmap) {
        self.send(LoadCompletion {
            slot,
            result: Ok(bitmap),
        });
    }

    pub fn failed(&self, slot: SlotId, reason: impl Into<String>) {
        self.send(LoadCompletion {
            slot,
            result: Err(reason.into()),
        });
    }

    pub fn send(&self, completion: LoadCompletion) {
        // The receiver lives as long as the manager; a send after it is gone
        // has nobody left to tell.
        let _ = self.tx.send(completion);
    }
}

/// Resolves asset names to decoded bitmaps.
///
/// Implementations may complete synchronously inside `request` or keep the
/// sender and complete later. Each request must be answered at most once;
/// extra completions for the same slot are ignored.
pub trait AssetLoader {
    fn request(&mut self, request: LoadRequest, completions: &LoadSender);
}
