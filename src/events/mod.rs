//! Events triggered by the sprite manager.
//!
//! Observers can be added through
//! [`SpriteManager::world_mut`](crate::manager::SpriteManager::world_mut).
//!
//! Submodules:
//! - [`animation`] – an animation reached its iteration limit
//! - [`assets`] – per-slot load results and batch completion
pub mod animation;
pub mod assets;
