//! Asset loading events.
//!
//! Triggered by [`poll_load_completions`](crate::systems::loading::poll_load_completions)
//! as completions arrive from the loader. They are notifications only; the
//! authoritative state lives in
//! [`AssetCatalog`](crate::resources::assetcatalog::AssetCatalog) and
//! [`LoadProgress`](crate::resources::loadprogress::LoadProgress).

use bevy_ecs::prelude::*;

use crate::resources::assetcatalog::SlotId;
use crate::resources::loadprogress::LoadSummary;

/// One slot finished loading.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct AssetLoadedEvent {
    pub slot: SlotId,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// One slot failed to load.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct AssetLoadFailedEvent {
    pub slot: SlotId,
    pub name: String,
    pub reason: String,
}

/// Every registered slot is done.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct AllAssetsLoadedEvent {
    pub summary: LoadSummary,
}
