//! spritereel: sprite-sheet animation for 2D games.
//!
//! A [`SpriteManager`](manager::SpriteManager) registers bitmap assets, loads
//! them through an [`AssetLoader`](loader::AssetLoader), hands out sprite
//! instances sharing those bitmaps, advances each instance's
//! [`SheetAnimation`](components::animation::SheetAnimation) once per tick and
//! draws the current frame through a [`Renderer`](systems::render::Renderer).
//!
//! State lives in a `bevy_ecs` world: sprites and animations are components,
//! the asset catalog and load counters are resources, the per-tick sweep and
//! the load completion pump are systems.

pub mod components;
pub mod error;
pub mod events;
pub mod loader;
pub mod manager;
#[cfg(feature = "raylib")]
pub mod raylib_backend;
pub mod resources;
pub mod systems;
pub mod utils;
