//! Systems and drawing.
//!
//! Submodules overview
//! - [`animation`] – advance every live sprite animation by one tick
//! - [`loading`] – apply load completions delivered by the asset loader
//! - [`render`] – renderer collaborator trait and sprite drawing

pub mod animation;
pub mod loading;
pub mod render;
