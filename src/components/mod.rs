//! ECS components for sprite instances.
//!
//! Submodules overview:
//! - [`animation`] – per-instance sprite-sheet animation state machine
//! - [`sprite`] – binding of an instance to its shared bitmap, plus flags

pub mod animation;
pub mod sprite;
