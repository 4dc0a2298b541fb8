//! Raylib textures keyed by [`BitmapHandle`].
//!
//! Filled by [`RaylibLoader`](crate::raylib_backend::RaylibLoader) and read by
//! [`RaylibRenderer`](crate::raylib_backend::RaylibRenderer). Textures must be
//! created and dropped on the raylib thread, so the store lives next to the
//! raylib handle rather than inside the manager's world.

use raylib::prelude::Texture2D;
use rustc_hash::FxHashMap;

use crate::resources::assetcatalog::BitmapHandle;

#[derive(Default)]
pub struct TextureStore {
    map: FxHashMap<BitmapHandle, Texture2D>,
    next_handle: u64,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a texture and hand back its handle.
    pub fn insert(&mut self, texture: Texture2D) -> BitmapHandle {
        let handle = BitmapHandle(self.next_handle);
        self.next_handle += 1;
        self.map.insert(handle, texture);
        handle
    }

    pub fn get(&self, handle: BitmapHandle) -> Option<&Texture2D> {
        self.map.get(&handle)
    }
}
