//! Load completion system.
//!
//! [`poll_load_completions`] drains the [`LoadBridge`] channel and applies
//! each completion to the [`AssetCatalog`] and [`LoadProgress`]. Completions
//! may arrive in any order. A completion for a slot that already settled is
//! ignored, so a misbehaving loader cannot push the counters past the total.

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::events::assets::{AssetLoadFailedEvent, AssetLoadedEvent};
use crate::resources::assetcatalog::AssetCatalog;
use crate::resources::loadprogress::{LoadBridge, LoadFailure, LoadProgress};

/// Apply every queued load completion.
pub fn poll_load_completions(
    bridge: Res<LoadBridge>,
    mut catalog: ResMut<AssetCatalog>,
    mut progress: ResMut<LoadProgress>,
    mut commands: Commands,
) {
    while let Ok(completion) = bridge.rx.try_recv() {
        let slot = completion.slot;
        let Some(name) = catalog.slot(slot).map(|s| s.name.clone()) else {
            warn!("Completion for unknown load slot {:?} ignored", slot);
            continue;
        };

        match completion.result {
            Ok(bitmap) => {
                if !catalog.mark_loaded(slot, bitmap.handle, bitmap.width, bitmap.height) {
                    warn!("Duplicate completion for '{}' ({:?}) ignored", name, slot);
                    continue;
                }
                progress.loaded += 1;
                debug!(
                    "Loaded '{}' {}x{} ({}/{})",
                    name, bitmap.width, bitmap.height, progress.loaded, progress.total
                );
                commands.trigger(AssetLoadedEvent {
                    slot,
                    name,
                    width: bitmap.width,
                    height: bitmap.height,
                });
            }
            Err(reason) => {
                if !catalog.mark_failed(slot, reason.clone()) {
                    warn!("Duplicate completion for '{}' ({:?}) ignored", name, slot);
                    continue;
                }
                warn!("Failed to load '{}': {}", name, reason);
                progress.failures.push(LoadFailure {
                    slot,
                    name: name.clone(),
                    reason: reason.clone(),
                });
                commands.trigger(AssetLoadFailedEvent { slot, name, reason });
            }
        }
    }
}
