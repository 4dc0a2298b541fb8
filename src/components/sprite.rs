use std::sync::Arc;

use bevy_ecs::prelude::Component;

use crate::resources::assetcatalog::Bitmap;

/// A drawable instance of a loaded bitmap.
///
/// The bitmap is shared with every other instance created from the same
/// asset. Whether the instance is animated is decided by the presence of a
/// [`SheetAnimation`](crate::components::animation::SheetAnimation) on the
/// same entity.
#[derive(Component, Clone, Debug)]
pub struct Sprite {
    pub bitmap: Arc<Bitmap>,
    /// Instance-level pause, independent from the animation's own flag.
    pub paused: bool,
    /// Set when the animation ran out of iterations and was detached.
    pub animation_destroyed: bool,
}

impl Sprite {
    pub fn new(bitmap: Arc<Bitmap>) -> Self {
        Self {
            bitmap,
            paused: false,
            animation_destroyed: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height
    }
}
