use crate::error::ExtractError;
use crate::extraction::keys::{ColorKeys, ColorLookup};
use crate::models::{LabeledPointSet, PixelCoordinate};
use image::DynamicImage;
use log::debug;

/// Collect the coordinates of every pixel whose RGB (alpha ignored) is in
/// `lookup`, grouped by label.
///
/// One set is returned per key, in key order, including labels that matched
/// nothing. `lookup` must have been built from `keys`.
pub fn classify_pixels(
    image: &DynamicImage,
    keys: &ColorKeys,
    lookup: &ColorLookup,
) -> Result<Vec<LabeledPointSet>, ExtractError> {
    if lookup.label_count() != keys.len() {
        return Err(ExtractError::InvalidParameter(format!(
            "color lookup covers {} label(s) but {} color key(s) were given",
            lookup.label_count(),
            keys.len()
        )));
    }

    let mut sets: Vec<LabeledPointSet> = keys
        .iter()
        .map(|k| LabeledPointSet::new(k.label.as_str()))
        .collect();

    let rgba = image.to_rgba8();
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, _] = pixel.0;
        if let Some(set) = lookup.get([r, g, b]).and_then(|idx| sets.get_mut(idx)) {
            set.points.push(PixelCoordinate::new(x, y));
        }
    }

    for set in &sets {
        debug!("Classified {} pixels as '{}'", set.len(), set.label);
    }

    Ok(sets)
}
