//! Catalog of registered bitmap assets.
//!
//! Every call to register a name appends a load slot. Slots are never
//! deduplicated: registering `walk.png` twice issues two loads and both must
//! complete before the batch is done. Loaded bitmaps are indexed by label
//! (see [`asset_label`]) so that `walk.png` and `walk` resolve to the same
//! entry.

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::debug;
use rustc_hash::FxHashMap;

use crate::utils::{asset_label, count};

/// Opaque identifier the asset loader hands back for a decoded bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitmapHandle(pub u64);

/// A decoded image, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub label: Arc<str>,
    pub handle: BitmapHandle,
    pub width: u32,
    pub height: u32,
}

/// Index of a load slot in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// Registered but not yet handed to a loader.
    Registered,
    /// Request issued, waiting for a completion.
    Requested,
    Loaded,
    Failed(String),
}

impl SlotState {
    pub fn is_settled(&self) -> bool {
        matches!(self, SlotState::Loaded | SlotState::Failed(_))
    }
}

/// One registration.
#[derive(Debug, Clone)]
pub struct LoadSlot {
    pub name: String,
    pub state: SlotState,
}

/// State of an asset as seen by instance creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetState {
    Pending,
    Loaded(Arc<Bitmap>),
    Failed(String),
}

/// Catalog entry, keyed by label.
#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub name: String,
    pub label: Arc<str>,
    pub state: AssetState,
}

#[derive(Resource, Debug, Default)]
pub struct AssetCatalog {
    slots: Vec<LoadSlot>,
    entries: FxHashMap<Arc<str>, AssetEntry>,
}

impl AssetCatalog {
    /// Append a load slot for `name`.
    pub fn register(&mut self, name: impl Into<String>) -> SlotId {
        let name = name.into();
        let label: Arc<str> = Arc::from(asset_label(&name));
        self.entries
            .entry(label.clone())
            .or_insert_with(|| AssetEntry {
                name: name.clone(),
                label,
                state: AssetState::Pending,
            });
        self.slots.push(LoadSlot {
            name,
            state: SlotState::Registered,
        });
        SlotId(self.slots.len() - 1)
    }

    pub fn slot(&self, id: SlotId) -> Option<&LoadSlot> {
        self.slots.get(id.0)
    }

    pub fn slots(&self) -> &[LoadSlot] {
        &self.slots
    }

    /// Slots not yet handed to a loader, marking them requested.
    pub fn take_unrequested(&mut self) -> Vec<(SlotId, String)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.state == SlotState::Registered)
            .map(|(i, slot)| {
                slot.state = SlotState::Requested;
                (SlotId(i), slot.name.clone())
            })
            .collect()
    }

    /// Record a successful load. Returns `false` if the slot is unknown or
    /// already settled. The first bitmap loaded for a label is the one every
    /// instance shares; later duplicates only settle their slot.
    pub fn mark_loaded(
        &mut self,
        id: SlotId,
        handle: BitmapHandle,
        width: u32,
        height: u32,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(id.0) else {
            return false;
        };
        if slot.state.is_settled() {
            return false;
        }
        slot.state = SlotState::Loaded;
        let label: Arc<str> = Arc::from(asset_label(&slot.name));
        let bitmap = Arc::new(Bitmap {
            label: label.clone(),
            handle,
            width,
            height,
        });
        let entry = self.entries.entry(label.clone()).or_insert_with(|| AssetEntry {
            name: slot.name.clone(),
            label,
            state: AssetState::Pending,
        });
        if let AssetState::Loaded(existing) = &entry.state {
            debug!(
                "'{}' already loaded as {:?}, dropping duplicate {:?}",
                slot.name, existing.handle, bitmap.handle
            );
        } else {
            entry.state = AssetState::Loaded(bitmap);
        }
        true
    }

    /// Record a failed load. A label that already loaded through a duplicate
    /// slot stays loaded.
    pub fn mark_failed(&mut self, id: SlotId, reason: impl Into<String>) -> bool {
        let Some(slot) = self.slots.get_mut(id.0) else {
            return false;
        };
        if slot.state.is_settled() {
            return false;
        }
        let reason = reason.into();
        slot.state = SlotState::Failed(reason.clone());
        if let Some(entry) = self.entries.get_mut(asset_label(&slot.name))
            && !matches!(entry.state, AssetState::Loaded(_))
        {
            entry.state = AssetState::Failed(reason);
        }
        true
    }

    /// Look up by full name or label.
    pub fn get(&self, name: &str) -> Option<&AssetEntry> {
        self.entries.get(asset_label(name))
    }

    /// The loaded bitmap for `name`, if any.
    pub fn bitmap(&self, name: &str) -> Option<Arc<Bitmap>> {
        match &self.get(name)?.state {
            AssetState::Loaded(bitmap) => Some(bitmap.clone()),
            _ => None,
        }
    }

    /// Distinct labels registered.
    pub fn asset_count(&self) -> usize {
        count(&self.entries)
    }

    /// Registrations, duplicates included.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}
