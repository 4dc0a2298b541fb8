//! ECS resources held by the sprite manager's world.
//!
//! Overview
//! - `assetcatalog` – registered names, load slots and loaded bitmaps
//! - `engineconfig` – INI-backed settings (default throttle, base path, failure policy)
//! - `loadprogress` – load counters, failure policy and the completion channel
//! - `texturestore` – raylib textures keyed by bitmap handle (`raylib` feature)
pub mod assetcatalog;
pub mod engineconfig;
pub mod loadprogress;
#[cfg(feature = "raylib")]
pub mod texturestore;
