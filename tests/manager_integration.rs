//! Sprite manager integration tests: loading, instance lifecycle, update sweep and drawing.

use std::cell::Cell;
use std::rc::Rc;

use bevy_ecs::prelude::*;

use spritereel::components::animation::{Direction, Iterations, SheetAnimation};
use spritereel::error::SpriteError;
use spritereel::events::animation::AnimationFinishedEvent;
use spritereel::events::assets::AllAssetsLoadedEvent;
use spritereel::loader::{AssetLoader, LoadRequest, LoadSender, LoadedBitmap};
use spritereel::manager::SpriteManager;
use spritereel::resources::assetcatalog::{AssetState, Bitmap, BitmapHandle};
use spritereel::resources::engineconfig::EngineConfig;
use spritereel::resources::loadprogress::FailurePolicy;
use spritereel::systems::render::{DestRect, FrameRect, Renderer};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Queues requests; the test decides when and how each one completes.
#[derive(Default)]
struct DeferredLoader {
    pending: Vec<(LoadRequest, LoadSender)>,
}

impl AssetLoader for DeferredLoader {
    fn request(&mut self, request: LoadRequest, completions: &LoadSender) {
        self.pending.push((request, completions.clone()));
    }
}

impl DeferredLoader {
    fn complete(&mut self, index: usize, width: u32, height: u32) {
        let (request, tx) = &self.pending[index];
        tx.loaded(
            request.slot,
            LoadedBitmap {
                handle: BitmapHandle(index as u64),
                width,
                height,
            },
        );
    }

    fn fail(&mut self, index: usize, reason: &str) {
        let (request, tx) = &self.pending[index];
        tx.failed(request.slot, reason);
    }
}

/// Answers every request on the spot with a fixed size.
struct InstantLoader {
    width: u32,
    height: u32,
}

impl AssetLoader for InstantLoader {
    fn request(&mut self, request: LoadRequest, completions: &LoadSender) {
        completions.loaded(
            request.slot,
            LoadedBitmap {
                handle: BitmapHandle(request.slot.0 as u64),
                width: self.width,
                height: self.height,
            },
        );
    }
}

#[derive(Default)]
struct RecordingRenderer {
    closed: bool,
    regions: Vec<(String, FrameRect, DestRect)>,
    wholes: Vec<(String, f32, f32)>,
}

impl Renderer for RecordingRenderer {
    fn is_ready(&self) -> bool {
        !self.closed
    }

    fn blit_region(&mut self, bitmap: &Bitmap, src: FrameRect, dst: DestRect) -> bool {
        self.regions.push((bitmap.label.to_string(), src, dst));
        true
    }

    fn blit(&mut self, bitmap: &Bitmap, x: f32, y: f32) -> bool {
        self.wholes.push((bitmap.label.to_string(), x, y));
        true
    }
}

fn loaded_manager(name: &str, width: u32, height: u32) -> SpriteManager {
    let mut manager = SpriteManager::new();
    manager.register(name);
    manager.request_all(&mut InstantLoader { width, height });
    assert!(manager.all_loaded());
    manager
}

fn walk_animation() -> SheetAnimation {
    SheetAnimation::new(8, 32)
        .with_direction(Direction::LeftToRight)
        .with_frames_per_step(1)
}

// --- Loading ---

#[test]
fn callback_fires_once_after_out_of_order_completions() {
    init_logs();
    let mut manager = SpriteManager::new();
    manager.register_all(["a.png", "b.png", "a.png"]);

    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    let mut loader = DeferredLoader::default();
    let ticket = manager.load_all(&mut loader, move |summary| {
        seen.set(seen.get() + 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.loaded, 3);
    });
    assert_eq!(loader.pending.len(), 3);
    assert!(!ticket.is_resolved());

    loader.complete(2, 16, 16);
    loader.complete(0, 16, 16);
    manager.update();
    assert!(!manager.all_loaded());
    assert_eq!(calls.get(), 0);

    loader.complete(1, 32, 8);
    manager.update();
    manager.update();
    manager.poll_loads();
    assert!(manager.all_loaded());
    assert!(ticket.is_resolved());
    assert_eq!(calls.get(), 1);
    assert_eq!(manager.asset_count(), 2);
}

#[test]
fn duplicate_registrations_must_all_complete() {
    let mut manager = SpriteManager::new();
    manager.register("walk.png");
    manager.register("walk.png");
    let mut loader = DeferredLoader::default();
    let ticket = manager.request_all(&mut loader);

    loader.complete(0, 32, 32);
    manager.poll_loads();
    assert!(!ticket.is_resolved());
    // The label is usable as soon as one slot loaded.
    let early = manager.create_instance("walk").unwrap();

    loader.complete(1, 64, 16);
    assert!(manager.poll_loads());
    assert!(ticket.is_resolved());
    assert_eq!(manager.load_progress().loaded, 2);

    let late = manager.create_instance("walk").unwrap();
    let early_bitmap = manager.sprite(&early).unwrap().bitmap.clone();
    let late_bitmap = manager.sprite(&late).unwrap().bitmap.clone();
    assert!(std::sync::Arc::ptr_eq(&early_bitmap, &late_bitmap));
    assert_eq!(late_bitmap.handle, BitmapHandle(0));
    assert_eq!((late_bitmap.width, late_bitmap.height), (32, 32));
}

#[test]
fn synchronous_loader_resolves_inside_load_all() {
    let mut manager = SpriteManager::new();
    manager.register("hero.gif");
    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    let ticket = manager.load_all(&mut InstantLoader { width: 8, height: 8 }, move |_| {
        seen.set(seen.get() + 1)
    });
    assert!(ticket.is_resolved());
    assert_eq!(calls.get(), 1);
    manager.update();
    assert_eq!(calls.get(), 1);
}

#[test]
fn failed_load_blocks_by_default() {
    let mut manager = SpriteManager::new();
    manager.register_all(["ok.png", "broken.png"]);
    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    let mut loader = DeferredLoader::default();
    manager.load_all(&mut loader, move |_| seen.set(seen.get() + 1));

    loader.complete(0, 8, 8);
    loader.fail(1, "404");
    manager.poll_loads();

    assert!(!manager.all_loaded());
    assert_eq!(calls.get(), 0);
    assert_eq!(manager.load_progress().failed(), 1);
    assert_eq!(
        manager.asset("broken").unwrap().state,
        AssetState::Failed("404".into())
    );
    assert!(matches!(
        manager.create_instance("broken.png"),
        Err(SpriteError::NotFound(_))
    ));
}

#[test]
fn failed_load_settles_with_settle_policy() {
    let config = EngineConfig {
        failure_policy: FailurePolicy::Settle,
        ..EngineConfig::new()
    };
    let mut manager = SpriteManager::with_config(config);
    manager.register_all(["ok.png", "broken.png"]);
    let mut loader = DeferredLoader::default();
    let ticket = manager.request_all(&mut loader);

    loader.fail(1, "timeout");
    loader.complete(0, 8, 8);
    assert!(manager.poll_loads());

    let summary = ticket.summary().unwrap();
    assert_eq!(summary.loaded, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].name, "broken.png");
    assert_eq!(summary.failures[0].reason, "timeout");
}

#[test]
fn all_assets_loaded_event_is_triggered_once() {
    #[derive(Resource, Default)]
    struct Batches(usize);

    let mut manager = SpriteManager::new();
    manager.world_mut().init_resource::<Batches>();
    manager.add_observer(
        |_trigger: On<AllAssetsLoadedEvent>, mut batches: ResMut<Batches>| batches.0 += 1,
    );
    manager.register("a.png");
    let mut loader = DeferredLoader::default();
    manager.request_all(&mut loader);
    loader.complete(0, 4, 4);
    manager.update();
    manager.update();
    assert_eq!(manager.world().resource::<Batches>().0, 1);
}

#[test]
fn registering_after_load_reopens_the_batch() {
    let mut manager = loaded_manager("a.png", 8, 8);
    manager.register("b.png");
    assert!(!manager.all_loaded());

    let mut loader = DeferredLoader::default();
    let ticket = manager.request_all(&mut loader);
    assert_eq!(loader.pending.len(), 1);
    assert_eq!(loader.pending[0].0.name, "b.png");
    loader.complete(0, 8, 8);
    manager.poll_loads();
    assert!(ticket.is_resolved());
    assert!(manager.all_loaded());
}

#[test]
fn requests_resolve_against_base_path() {
    let config = EngineConfig {
        base_path: "assets".into(),
        ..EngineConfig::new()
    };
    let mut manager = SpriteManager::with_config(config);
    manager.register("walk.png");
    let mut loader = DeferredLoader::default();
    manager.request_all(&mut loader);
    assert_eq!(
        loader.pending[0].0.path,
        std::path::PathBuf::from("assets").join("walk.png")
    );
}

// --- Instances ---

#[test]
fn create_instance_fails_for_unknown_or_pending_assets() {
    let mut manager = SpriteManager::new();
    assert!(matches!(
        manager.create_instance("ghost.png"),
        Err(SpriteError::NotFound(_))
    ));

    manager.register("slow.png");
    let mut loader = DeferredLoader::default();
    manager.request_all(&mut loader);
    assert!(matches!(
        manager.create_instance("slow.png"),
        Err(SpriteError::NotFound(_))
    ));
}

#[test]
fn walk_cycle_returns_to_start_after_four_ticks() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let walker = manager.create_instance("walk.png").unwrap();
    manager.attach_animation(&walker, walk_animation()).unwrap();

    let mut xs = Vec::new();
    for _ in 0..4 {
        manager.update();
        xs.push(manager.animation(&walker).unwrap().sx);
    }
    assert_eq!(xs, vec![8, 16, 24, 0]);
}

#[test]
fn instances_sharing_a_bitmap_animate_independently() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let fast = manager
        .create_animated_instance("walk", walk_animation())
        .unwrap();
    let slow = manager
        .create_animated_instance("walk", walk_animation().with_frames_per_step(3))
        .unwrap();

    let fast_bitmap = manager.sprite(&fast).unwrap().bitmap.clone();
    let slow_bitmap = manager.sprite(&slow).unwrap().bitmap.clone();
    assert!(std::sync::Arc::ptr_eq(&fast_bitmap, &slow_bitmap));

    manager.update();
    manager.update();
    assert_eq!(manager.animation(&fast).unwrap().sx, 16);
    assert_eq!(manager.animation(&slow).unwrap().sx, 0);
    assert_eq!(manager.animation(&slow).unwrap().frame_counter(), 2);

    manager.update();
    assert_eq!(manager.animation(&slow).unwrap().sx, 8);
    assert_eq!(manager.animation(&slow).unwrap().frame_counter(), 0);
}

#[test]
fn frame_counter_stays_below_throttle_after_each_sweep() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let instances: Vec<_> = (1..=4)
        .map(|n| {
            manager
                .create_animated_instance("walk", walk_animation().with_frames_per_step(n))
                .unwrap()
        })
        .collect();
    for _ in 0..10 {
        manager.update();
        for instance in &instances {
            let anim = manager.animation(instance).unwrap();
            assert!(anim.frame_counter() < anim.frames_per_step());
        }
    }
}

#[test]
fn destroy_is_idempotent_and_isolated() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let a = manager.create_animated_instance("walk", walk_animation()).unwrap();
    let b = manager.create_animated_instance("walk", walk_animation()).unwrap();
    assert_eq!(manager.live_instances(), 2);

    manager.destroy_instance(&a);
    manager.destroy_instance(&a);
    assert!(manager.is_destroyed(&a));
    assert!(manager.animation(&a).is_none());
    assert_eq!(manager.live_instances(), 1);

    manager.update();
    assert_eq!(manager.animation(&b).unwrap().sx, 8);
    assert!(manager.create_instance("walk").is_ok());
}

#[test]
fn instances_from_another_manager_are_ignored() {
    let mut first = loaded_manager("walk.png", 32, 32);
    let mut second = loaded_manager("walk.png", 32, 32);
    let mine = second.create_instance("walk").unwrap();
    let foreign = first.create_instance("walk").unwrap();

    second.destroy_instance(&foreign);
    assert!(second.is_live(&mine));
    assert!(first.is_live(&foreign));
    assert!(matches!(
        second.attach_animation(&foreign, walk_animation()),
        Err(SpriteError::NotFound(_))
    ));
}

#[test]
fn paused_instance_does_not_advance() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let walker = manager.create_animated_instance("walk", walk_animation()).unwrap();

    manager.set_paused(&walker, true);
    assert!(manager.is_paused(&walker));
    manager.update();
    assert_eq!(manager.animation(&walker).unwrap().sx, 0);

    manager.set_paused(&walker, false);
    manager.update();
    assert_eq!(manager.animation(&walker).unwrap().sx, 8);

    let gone = manager.create_instance("walk").unwrap();
    manager.destroy_instance(&gone);
    manager.set_paused(&gone, true);
    assert!(!manager.is_paused(&gone));
}

#[test]
fn animation_paused_at_attach_pauses_the_instance() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let walker = manager
        .create_animated_instance("walk", walk_animation().with_paused(true))
        .unwrap();
    assert!(manager.sprite(&walker).unwrap().paused);
    manager.update();
    assert_eq!(manager.animation(&walker).unwrap().sx, 0);
}

#[test]
fn iteration_limit_detaches_animation() {
    #[derive(Resource, Default)]
    struct Finished(Vec<Entity>);

    let mut manager = loaded_manager("walk.png", 32, 32);
    manager.world_mut().init_resource::<Finished>();
    manager.add_observer(
        |trigger: On<AnimationFinishedEvent>, mut finished: ResMut<Finished>| {
            finished.0.push(trigger.event().entity);
        },
    );

    let once = manager
        .create_animated_instance(
            "walk",
            walk_animation().with_iterations(Iterations::limited(1)),
        )
        .unwrap();
    let forever = manager.create_animated_instance("walk", walk_animation()).unwrap();

    for _ in 0..3 {
        manager.update();
        assert!(!manager.animation_destroyed(&once));
    }
    manager.update();
    assert!(manager.animation_destroyed(&once));
    assert!(manager.animation(&once).is_none());
    assert!(manager.is_live(&once));
    assert_eq!(manager.world().resource::<Finished>().0, vec![once.entity()]);

    for _ in 0..4 {
        manager.update();
    }
    assert_eq!(manager.animation(&forever).unwrap().sx, 0);
    assert_eq!(manager.world().resource::<Finished>().0.len(), 1);

    // A fresh animation revives the instance.
    manager.attach_animation(&once, walk_animation()).unwrap();
    assert!(!manager.animation_destroyed(&once));
    manager.update();
    assert_eq!(manager.animation(&once).unwrap().sx, 8);
}

#[test]
fn backward_bounce_starts_on_last_frame_when_attached() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let walker = manager
        .create_animated_instance(
            "walk",
            walk_animation()
                .with_direction(Direction::RightToLeft)
                .with_alternate(true),
        )
        .unwrap();
    assert_eq!(manager.animation(&walker).unwrap().sx, 24);

    let mut xs = Vec::new();
    for _ in 0..6 {
        manager.update();
        xs.push(manager.animation(&walker).unwrap().sx);
    }
    assert_eq!(xs, vec![16, 8, 0, 8, 16, 24]);
}

#[test]
fn zero_frame_size_uses_whole_bitmap() {
    let mut manager = loaded_manager("tall.png", 16, 64);
    let strip = manager
        .create_animated_instance(
            "tall",
            SheetAnimation::new(0, 16)
                .with_direction(Direction::TopToBottom)
                .with_frames_per_step(1),
        )
        .unwrap();
    let anim = manager.animation(&strip).unwrap();
    assert_eq!((anim.frame_width(), anim.frame_height()), (16, 16));
}

#[test]
fn detach_animation_returns_state() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let walker = manager.create_animated_instance("walk", walk_animation()).unwrap();
    manager.update();
    let anim = manager.detach_animation(&walker).unwrap();
    assert_eq!(anim.sx, 8);
    assert!(manager.animation(&walker).is_none());
    assert!(manager.detach_animation(&walker).is_none());
}

#[test]
fn animation_mut_changes_are_kept() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let walker = manager.create_animated_instance("walk", walk_animation()).unwrap();
    manager.animation_mut(&walker).unwrap().sx = 16;
    manager.update();
    assert_eq!(manager.animation(&walker).unwrap().sx, 24);
}

// --- Drawing ---

#[test]
fn draw_uses_current_frame_or_whole_bitmap() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let walker = manager.create_animated_instance("walk", walk_animation()).unwrap();
    let still = manager.create_instance("walk").unwrap();
    manager.update();

    let mut renderer = RecordingRenderer::default();
    assert!(manager.draw_image(&mut renderer, &walker, 5.0, 6.0).unwrap());
    assert!(manager.draw_image(&mut renderer, &still, 1.0, 2.0).unwrap());

    assert_eq!(
        renderer.regions,
        vec![(
            "walk".to_string(),
            FrameRect { x: 8, y: 0, width: 8, height: 32 },
            DestRect { x: 5.0, y: 6.0, width: 8.0, height: 32.0 },
        )]
    );
    assert_eq!(renderer.wholes, vec![("walk".to_string(), 1.0, 2.0)]);
}

#[test]
fn draw_rejects_closed_renderer_and_dead_instances() {
    let mut manager = loaded_manager("walk.png", 32, 32);
    let walker = manager.create_instance("walk").unwrap();

    let mut closed = RecordingRenderer {
        closed: true,
        ..Default::default()
    };
    assert!(matches!(
        manager.draw_image(&mut closed, &walker, 0.0, 0.0),
        Err(SpriteError::InvalidArgument(_))
    ));

    manager.destroy_instance(&walker);
    let mut renderer = RecordingRenderer::default();
    assert!(matches!(
        manager.draw_image(&mut renderer, &walker, 0.0, 0.0),
        Err(SpriteError::NotFound(_))
    ));
    assert!(renderer.wholes.is_empty());
}
