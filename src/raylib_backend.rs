//! Raylib implementations of the loader and renderer collaborators.
//!
//! Only built with the `raylib` feature.
//!
//! ```ignore
//! let mut textures = TextureStore::new();
//! let mut loader = RaylibLoader::new(&mut rl, &thread, &mut textures);
//! manager.load_all(&mut loader, |summary| log::info!("{} sheets ready", summary.loaded));
//!
//! let mut d = rl.begin_drawing(&thread);
//! let mut renderer = RaylibRenderer::new(&mut d, &textures);
//! manager.draw_image(&mut renderer, &hero, 100.0, 80.0)?;
//! ```

use raylib::prelude::*;

use crate::loader::{AssetLoader, LoadRequest, LoadSender, LoadedBitmap};
use crate::resources::assetcatalog::Bitmap;
use crate::resources::texturestore::TextureStore;
use crate::systems::render::{DestRect, FrameRect, Renderer};

/// Loads textures synchronously from disk.
pub struct RaylibLoader<'a> {
    rl: &'a mut RaylibHandle,
    thread: &'a RaylibThread,
    store: &'a mut TextureStore,
}

impl<'a> RaylibLoader<'a> {
    pub fn new(
        rl: &'a mut RaylibHandle,
        thread: &'a RaylibThread,
        store: &'a mut TextureStore,
    ) -> Self {
        Self { rl, thread, store }
    }
}

impl AssetLoader for RaylibLoader<'_> {
    fn request(&mut self, request: LoadRequest, completions: &LoadSender) {
        let path = request.path.to_string_lossy();
        match self.rl.load_texture(self.thread, &path) {
            Ok(texture) => {
                let (width, height) = (texture.width.max(0) as u32, texture.height.max(0) as u32);
                let handle = self.store.insert(texture);
                completions.loaded(
                    request.slot,
                    LoadedBitmap {
                        handle,
                        width,
                        height,
                    },
                );
            }
            Err(e) => completions.failed(request.slot, format!("{}: {}", path, e)),
        }
    }
}

/// Draws into an open raylib drawing scope.
pub struct RaylibRenderer<'a, D: RaylibDraw> {
    d: &'a mut D,
    store: &'a TextureStore,
}

impl<'a, D: RaylibDraw> RaylibRenderer<'a, D> {
    pub fn new(d: &'a mut D, store: &'a TextureStore) -> Self {
        Self { d, store }
    }
}

impl<D: RaylibDraw> Renderer for RaylibRenderer<'_, D> {
    fn blit_region(&mut self, bitmap: &Bitmap, src: FrameRect, dst: DestRect) -> bool {
        let Some(texture) = self.store.get(bitmap.handle) else {
            return false;
        };
        let source = Rectangle {
            x: src.x as f32,
            y: src.y as f32,
            width: src.width as f32,
            height: src.height as f32,
        };
        let dest = Rectangle {
            x: dst.x,
            y: dst.y,
            width: dst.width,
            height: dst.height,
        };
        self.d
            .draw_texture_pro(texture, source, dest, Vector2::zero(), 0.0, Color::WHITE);
        true
    }

    fn blit(&mut self, bitmap: &Bitmap, x: f32, y: f32) -> bool {
        let Some(texture) = self.store.get(bitmap.handle) else {
            return false;
        };
        self.d
            .draw_texture_v(texture, Vector2 { x, y }, Color::WHITE);
        true
    }
}
