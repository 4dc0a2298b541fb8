//! Small helpers with no better home.

use std::collections::HashMap;
use std::hash::BuildHasher;

/// Image extensions stripped when deriving an asset label.
const LABEL_EXTENSIONS: [&str; 3] = ["png", "gif", "jpg"];

/// Number of entries in a map.
pub fn count<K, V, S: BuildHasher>(map: &HashMap<K, V, S>) -> usize {
    map.len()
}

/// Label an asset is addressable by: its name without a `.png`, `.gif` or
/// `.jpg` extension (case-insensitive). Other names are their own label.
///
/// ```
/// assert_eq!(spritereel::utils::asset_label("sprites/walk.PNG"), "sprites/walk");
/// assert_eq!(spritereel::utils::asset_label("walk.bmp"), "walk.bmp");
/// ```
pub fn asset_label(name: &str) -> &str {
    if let Some((stem, ext)) = name.rsplit_once('.')
        && !stem.is_empty()
        && LABEL_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    {
        return stem;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn test_count_entries() {
        let mut map: FxHashMap<&str, u32> = FxHashMap::default();
        assert_eq!(count(&map), 0);
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);
        assert_eq!(count(&map), 2);
    }

    #[test]
    fn test_label_strips_known_extensions() {
        assert_eq!(asset_label("walk.png"), "walk");
        assert_eq!(asset_label("dir/run.GIF"), "dir/run");
        assert_eq!(asset_label("a.b.jpg"), "a.b");
    }

    #[test]
    fn test_label_keeps_other_names() {
        assert_eq!(asset_label("walk"), "walk");
        assert_eq!(asset_label("walk.jpeg"), "walk.jpeg");
        assert_eq!(asset_label(".png"), ".png");
    }
}
