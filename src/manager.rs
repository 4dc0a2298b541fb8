//! The sprite manager: asset registry, instance lifecycle and update sweep.
//!
//! [`SpriteManager`] keeps its state in a private ECS [`World`]:
//!
//! - each sprite instance is an entity with a [`Sprite`] and, when animated,
//!   a [`SheetAnimation`];
//! - the [`AssetCatalog`], [`LoadProgress`], [`LoadBridge`] and
//!   [`EngineConfig`] are resources;
//! - [`update`](SpriteManager::update) runs the
//!   [`animation`](crate::systems::animation::animation) system and
//!   [`poll_loads`](SpriteManager::poll_loads) runs
//!   [`poll_load_completions`](crate::systems::loading::poll_load_completions).
//!
//! # Lifecycle
//!
//! ```text
//! register("walk.png") ──► load_all(loader, cb) ──► completions ──► cb(summary)
//!                                                         │
//!                     create_instance("walk") ◄───────────┘
//!                              │
//!           attach_animation / update / draw_image
//!                              │
//!                     destroy_instance(instance)
//! ```
//!
//! The caller holds [`SpriteInstance`] handles and decides when an instance
//! dies; the manager only tracks live instances for the sweep. Dropping a
//! handle does not destroy the instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use bevy_ecs::prelude::*;
use bevy_ecs::system::IntoObserverSystem;
use log::{debug, info, warn};

use crate::components::animation::SheetAnimation;
use crate::components::sprite::Sprite;
use crate::error::{Result, SpriteError};
use crate::events::assets::AllAssetsLoadedEvent;
use crate::loader::{AssetLoader, LoadRequest};
use crate::resources::assetcatalog::{AssetCatalog, AssetEntry, AssetState};
use crate::resources::engineconfig::EngineConfig;
use crate::resources::loadprogress::{LoadBridge, LoadProgress, LoadSummary};
use crate::systems::animation::animation;
use crate::systems::loading::poll_load_completions;
use crate::systems::render::{Renderer, draw_sprite};

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a sprite instance, valid only with the manager that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteInstance {
    manager: u64,
    entity: Entity,
}

impl SpriteInstance {
    pub fn entity(&self) -> Entity {
        self.entity
    }
}

/// Resolves once, when every slot of a load batch is done.
#[derive(Debug, Clone, Default)]
pub struct LoadTicket {
    cell: Arc<OnceLock<LoadSummary>>,
}

impl LoadTicket {
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn summary(&self) -> Option<&LoadSummary> {
        self.cell.get()
    }

    fn resolve(&self, summary: LoadSummary) {
        let _ = self.cell.set(summary);
    }
}

type LoadCallback = Box<dyn FnOnce(&LoadSummary)>;

struct PendingBatch {
    ticket: LoadTicket,
    callback: Option<LoadCallback>,
}

pub struct SpriteManager {
    id: u64,
    world: World,
    update_schedule: Schedule,
    load_schedule: Schedule,
    batch: Option<PendingBatch>,
}

impl Default for SpriteManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteManager {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::new())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(LoadProgress::new(config.failure_policy));
        world.insert_resource(config);
        world.insert_resource(AssetCatalog::default());
        world.insert_resource(LoadBridge::default());

        let mut update_schedule = Schedule::default();
        update_schedule.add_systems(animation);
        let mut load_schedule = Schedule::default();
        load_schedule.add_systems(poll_load_completions);

        Self {
            id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
            world,
            update_schedule,
            load_schedule,
            batch: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.world.resource::<EngineConfig>()
    }

    /// The backing world, e.g. to add observers for
    /// [`AnimationFinishedEvent`](crate::events::animation::AnimationFinishedEvent).
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Watch for manager events such as
    /// [`AnimationFinishedEvent`](crate::events::animation::AnimationFinishedEvent)
    /// or [`AllAssetsLoadedEvent`]. Returns the observer entity.
    pub fn add_observer<E: Event, B: Bundle, M>(
        &mut self,
        observer: impl IntoObserverSystem<E, B, M>,
    ) -> Entity {
        self.world.add_observer(observer).id()
    }

    // ---------------------------------------------------------------- assets

    /// Register one asset name. Duplicates are loaded again, not merged.
    pub fn register(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!("Registering asset '{}'", name);
        self.world.resource_mut::<AssetCatalog>().register(name);
        self.world.resource_mut::<LoadProgress>().total += 1;
    }

    pub fn register_all<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.register(name);
        }
    }

    /// Request every registered, not yet requested asset from `loader`.
    ///
    /// `on_complete` runs exactly once, when all slots are done (see
    /// [`FailurePolicy`](crate::resources::loadprogress::FailurePolicy)).
    /// Calling this again before that replaces the callback of the pending
    /// batch.
    pub fn load_all(
        &mut self,
        loader: &mut dyn AssetLoader,
        on_complete: impl FnOnce(&LoadSummary) + 'static,
    ) -> LoadTicket {
        self.start_batch(loader, Some(Box::new(on_complete)))
    }

    /// Like [`load_all`](Self::load_all) without a callback; watch the ticket instead.
    pub fn request_all(&mut self, loader: &mut dyn AssetLoader) -> LoadTicket {
        self.start_batch(loader, None)
    }

    fn start_batch(
        &mut self,
        loader: &mut dyn AssetLoader,
        callback: Option<LoadCallback>,
    ) -> LoadTicket {
        let ticket = match self.batch.as_mut() {
            Some(batch) if !batch.ticket.is_resolved() => {
                if batch.callback.is_some() && callback.is_some() {
                    warn!("load_all called again before completion, replacing callback");
                }
                if callback.is_some() {
                    batch.callback = callback;
                }
                batch.ticket.clone()
            }
            _ => {
                let ticket = LoadTicket::default();
                self.batch = Some(PendingBatch {
                    ticket: ticket.clone(),
                    callback,
                });
                ticket
            }
        };

        let requests = self.world.resource_mut::<AssetCatalog>().take_unrequested();
        let sender = self.world.resource::<LoadBridge>().sender();
        let config = self.world.resource::<EngineConfig>().clone();
        info!(
            "Requesting {} assets ({} registered)",
            requests.len(),
            self.world.resource::<LoadProgress>().total
        );
        for (slot, name) in requests {
            let path = config.resolve(&name);
            loader.request(LoadRequest { slot, name, path }, &sender);
        }

        // Synchronous loaders have already answered.
        self.poll_loads();
        ticket
    }

    /// Apply queued load completions. Returns [`all_loaded`](Self::all_loaded).
    pub fn poll_loads(&mut self) -> bool {
        self.load_schedule.run(&mut self.world);

        let progress = self.world.resource::<LoadProgress>();
        if !progress.all_loaded() {
            return false;
        }
        let summary = progress.summary();
        let Some(batch) = self.batch.as_mut() else {
            return false;
        };
        if batch.ticket.is_resolved() {
            return true;
        }

        info!(
            "All assets loaded ({} ok, {} failed)",
            summary.loaded,
            summary.failures.len()
        );
        batch.ticket.resolve(summary.clone());
        if let Some(callback) = batch.callback.take() {
            callback(&summary);
        }
        self.world.trigger(AllAssetsLoadedEvent { summary });
        true
    }

    /// True once a batch has resolved and nothing was registered since.
    pub fn all_loaded(&self) -> bool {
        self.batch
            .as_ref()
            .is_some_and(|batch| batch.ticket.is_resolved())
            && self.world.resource::<LoadProgress>().all_loaded()
    }

    pub fn load_progress(&self) -> &LoadProgress {
        self.world.resource::<LoadProgress>()
    }

    /// Catalog entry for a name or label.
    pub fn asset(&self, name: &str) -> Option<&AssetEntry> {
        self.world.resource::<AssetCatalog>().get(name)
    }

    /// Distinct assets registered.
    pub fn asset_count(&self) -> usize {
        self.world.resource::<AssetCatalog>().asset_count()
    }

    // ------------------------------------------------------------- instances

    /// New instance of a loaded asset, unanimated.
    pub fn create_instance(&mut self, name: &str) -> Result<SpriteInstance> {
        let bitmap = {
            let catalog = self.world.resource::<AssetCatalog>();
            let entry = catalog.get(name).ok_or_else(|| {
                SpriteError::NotFound(format!("asset '{}' was never registered", name))
            })?;
            match &entry.state {
                AssetState::Loaded(bitmap) => bitmap.clone(),
                AssetState::Pending => {
                    return Err(SpriteError::NotFound(format!(
                        "asset '{}' is not loaded yet",
                        name
                    )));
                }
                AssetState::Failed(reason) => {
                    return Err(SpriteError::NotFound(format!(
                        "asset '{}' failed to load: {}",
                        name, reason
                    )));
                }
            }
        };
        let entity = self.world.spawn(Sprite::new(bitmap)).id();
        debug!("Created instance {:?} of '{}'", entity, name);
        Ok(SpriteInstance {
            manager: self.id,
            entity,
        })
    }

    /// New instance carrying `animation`.
    pub fn create_animated_instance(
        &mut self,
        name: &str,
        animation: SheetAnimation,
    ) -> Result<SpriteInstance> {
        let instance = self.create_instance(name)?;
        self.attach_animation(&instance, animation)?;
        Ok(instance)
    }

    /// Destroy an instance. Unknown or already destroyed instances are ignored.
    pub fn destroy_instance(&mut self, instance: &SpriteInstance) {
        let Some(entity) = self.tracked(instance) else {
            return;
        };
        if let Ok(entity_mut) = self.world.get_entity_mut(entity) {
            entity_mut.despawn();
            debug!("Destroyed instance {:?}", entity);
        }
    }

    fn tracked(&self, instance: &SpriteInstance) -> Option<Entity> {
        if instance.manager != self.id {
            return None;
        }
        self.world
            .get::<Sprite>(instance.entity)
            .map(|_| instance.entity)
    }

    fn tracked_or_not_found(&self, instance: &SpriteInstance) -> Result<Entity> {
        self.tracked(instance).ok_or_else(|| {
            SpriteError::NotFound(format!("instance {:?} is not live", instance.entity))
        })
    }

    pub fn is_live(&self, instance: &SpriteInstance) -> bool {
        self.tracked(instance).is_some()
    }

    pub fn is_destroyed(&self, instance: &SpriteInstance) -> bool {
        !self.is_live(instance)
    }

    /// Number of live instances.
    pub fn live_instances(&self) -> usize {
        self.world
            .try_query::<&Sprite>()
            .map_or(0, |mut query| query.iter(&self.world).count())
    }

    pub fn sprite(&self, instance: &SpriteInstance) -> Option<&Sprite> {
        self.tracked(instance)
            .and_then(|entity| self.world.get::<Sprite>(entity))
    }

    // ------------------------------------------------------------- animation

    /// Give an instance its own animation, replacing any previous one.
    ///
    /// Zero frame dimensions become the bitmap's size. The instance's pause
    /// flag follows the animation's, and a previous self-termination is
    /// forgotten.
    pub fn attach_animation(
        &mut self,
        instance: &SpriteInstance,
        mut animation: SheetAnimation,
    ) -> Result<()> {
        let entity = self.tracked_or_not_found(instance)?;
        let mut entity_mut = self.world.entity_mut(entity);
        if let Some(mut sprite) = entity_mut.get_mut::<Sprite>() {
            animation.fit_to_sheet(sprite.width(), sprite.height());
            sprite.paused = animation.paused;
            sprite.animation_destroyed = false;
        }
        entity_mut.insert(animation);
        Ok(())
    }

    /// Remove and return an instance's animation.
    pub fn detach_animation(&mut self, instance: &SpriteInstance) -> Option<SheetAnimation> {
        let entity = self.tracked(instance)?;
        self.world.entity_mut(entity).take::<SheetAnimation>()
    }

    pub fn animation(&self, instance: &SpriteInstance) -> Option<&SheetAnimation> {
        self.tracked(instance)
            .and_then(|entity| self.world.get::<SheetAnimation>(entity))
    }

    pub fn animation_mut(&mut self, instance: &SpriteInstance) -> Option<Mut<'_, SheetAnimation>> {
        let entity = self.tracked(instance)?;
        self.world.get_mut::<SheetAnimation>(entity)
    }

    /// Whether the instance's animation ran out of iterations.
    pub fn animation_destroyed(&self, instance: &SpriteInstance) -> bool {
        self.sprite(instance)
            .is_some_and(|sprite| sprite.animation_destroyed)
    }

    /// Pause or resume an instance and its animation. Never fails.
    pub fn set_paused(&mut self, instance: &SpriteInstance, paused: bool) {
        let Some(entity) = self.tracked(instance) else {
            return;
        };
        if let Some(mut sprite) = self.world.get_mut::<Sprite>(entity) {
            sprite.paused = paused;
        }
        if let Some(mut anim) = self.world.get_mut::<SheetAnimation>(entity) {
            anim.paused = paused;
        }
    }

    pub fn is_paused(&self, instance: &SpriteInstance) -> bool {
        let sprite_paused = self.sprite(instance).is_some_and(|s| s.paused);
        let anim_paused = self.animation(instance).is_some_and(|a| a.paused);
        sprite_paused || anim_paused
    }

    // ---------------------------------------------------------------- ticking

    /// One game tick: apply pending load completions, then advance every
    /// live animation once.
    pub fn update(&mut self) {
        self.poll_loads();
        self.update_schedule.run(&mut self.world);
    }

    /// Draw an instance at (`x`, `y`): its current frame when animated, the
    /// whole bitmap otherwise.
    pub fn draw_image(
        &self,
        renderer: &mut dyn Renderer,
        instance: &SpriteInstance,
        x: f32,
        y: f32,
    ) -> Result<bool> {
        let entity = self.tracked_or_not_found(instance)?;
        let Some(sprite) = self.world.get::<Sprite>(entity) else {
            return Err(SpriteError::NotFound(format!(
                "instance {:?} has no sprite",
                entity
            )));
        };
        let anim = self.world.get::<SheetAnimation>(entity);
        draw_sprite(renderer, sprite, anim, x, y)
    }
}
