//! Drawing sprite instances through a [`Renderer`].
//!
//! The crate does not rasterize anything itself. A renderer blits either a
//! sub-rectangle of a bitmap or the whole bitmap; [`draw_sprite`] picks which
//! one from the presence of an animation.

use crate::components::animation::SheetAnimation;
use crate::components::sprite::Sprite;
use crate::error::{Result, SpriteError};
use crate::resources::assetcatalog::Bitmap;

/// Source rectangle inside a bitmap, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Destination rectangle on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A drawing surface.
pub trait Renderer {
    /// Whether the surface can be drawn on right now.
    fn is_ready(&self) -> bool {
        true
    }

    /// Blit `src` of `bitmap` into `dst`.
    fn blit_region(&mut self, bitmap: &Bitmap, src: FrameRect, dst: DestRect) -> bool;

    /// Blit the whole bitmap with its top-left corner at (`x`, `y`).
    fn blit(&mut self, bitmap: &Bitmap, x: f32, y: f32) -> bool;
}

/// Current frame rectangle of an animation.
pub fn frame_rect(anim: &SheetAnimation) -> FrameRect {
    FrameRect {
        x: anim.sx,
        y: anim.sy,
        width: anim.frame_width(),
        height: anim.frame_height(),
    }
}

/// Draw one sprite at (`x`, `y`), returning the renderer's result.
pub fn draw_sprite(
    renderer: &mut dyn Renderer,
    sprite: &Sprite,
    animation: Option<&SheetAnimation>,
    x: f32,
    y: f32,
) -> Result<bool> {
    if !renderer.is_ready() {
        return Err(SpriteError::InvalidArgument(
            "renderer is not a valid drawing surface".to_string(),
        ));
    }
    match animation {
        Some(anim) => {
            let src = frame_rect(anim);
            let dst = DestRect {
                x,
                y,
                width: src.width as f32,
                height: src.height as f32,
            };
            Ok(renderer.blit_region(&sprite.bitmap, src, dst))
        }
        None => Ok(renderer.blit(&sprite.bitmap, x, y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::assetcatalog::BitmapHandle;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        closed: bool,
        regions: Vec<(FrameRect, DestRect)>,
        wholes: Vec<(f32, f32)>,
    }

    impl Renderer for Recorder {
        fn is_ready(&self) -> bool {
            !self.closed
        }

        fn blit_region(&mut self, _bitmap: &Bitmap, src: FrameRect, dst: DestRect) -> bool {
            self.regions.push((src, dst));
            true
        }

        fn blit(&mut self, _bitmap: &Bitmap, x: f32, y: f32) -> bool {
            self.wholes.push((x, y));
            true
        }
    }

    fn sprite() -> Sprite {
        Sprite::new(Arc::new(Bitmap {
            label: Arc::from("walk"),
            handle: BitmapHandle(1),
            width: 32,
            height: 32,
        }))
    }

    #[test]
    fn test_animated_draws_frame() {
        let mut recorder = Recorder::default();
        let mut anim = SheetAnimation::new(8, 32);
        anim.sx = 16;
        assert!(draw_sprite(&mut recorder, &sprite(), Some(&anim), 10.0, 20.0).unwrap());
        assert_eq!(
            recorder.regions,
            vec![(
                FrameRect { x: 16, y: 0, width: 8, height: 32 },
                DestRect { x: 10.0, y: 20.0, width: 8.0, height: 32.0 }
            )]
        );
        assert!(recorder.wholes.is_empty());
    }

    #[test]
    fn test_static_draws_whole_bitmap() {
        let mut recorder = Recorder::default();
        draw_sprite(&mut recorder, &sprite(), None, 1.0, 2.0).unwrap();
        assert_eq!(recorder.wholes, vec![(1.0, 2.0)]);
    }

    #[test]
    fn test_closed_renderer_is_rejected() {
        let mut recorder = Recorder {
            closed: true,
            ..Default::default()
        };
        assert!(matches!(
            draw_sprite(&mut recorder, &sprite(), None, 0.0, 0.0),
            Err(SpriteError::InvalidArgument(_))
        ));
        assert!(recorder.wholes.is_empty());
    }
}
