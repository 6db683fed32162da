use image::{ImageBuffer, Rgb, RgbImage};
use pixel_points::{Centroid, ColorKeys};
use std::path::PathBuf;
use tempfile::TempDir;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const GOLD: Rgb<u8> = Rgb([255, 201, 14]);
pub const GREEN: Rgb<u8> = Rgb([34, 177, 76]);
pub const LIME: Rgb<u8> = Rgb([181, 230, 29]);
pub const GREY: Rgb<u8> = Rgb([128, 128, 128]);

/// 2x2 image: top row white, bottom row black
pub fn two_by_two() -> RgbImage {
    ImageBuffer::from_fn(2, 2, |_, y| if y == 0 { WHITE } else { BLACK })
}

/// 40x20 grey canvas with two 3x3 gold squares centered on (5, 5) and
/// (30, 12), and a green blob made of two shades centered near (20, 15)
pub fn blob_image() -> RgbImage {
    let mut img = ImageBuffer::from_pixel(40, 20, GREY);
    for (cx, cy) in [(5u32, 5u32), (30, 12)] {
        for y in cy - 1..=cy + 1 {
            for x in cx - 1..=cx + 1 {
                img.put_pixel(x, y, GOLD);
            }
        }
    }
    // Two shades side by side, 2px apart at most
    img.put_pixel(19, 15, GREEN);
    img.put_pixel(20, 15, GREEN);
    img.put_pixel(21, 15, LIME);
    img
}

/// Save `img` as `<name>.png` inside a fresh temp directory.
/// Keep the returned directory alive for the duration of the test.
pub fn save_in_temp_dir(img: &RgbImage, name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join(format!("{}.png", name));
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    (dir, path)
}

pub fn white_black_keys() -> ColorKeys {
    ColorKeys::from_hex_map([("White", ["#FFFFFF"]), ("Black", ["#000000"])])
        .expect("valid keys")
}

pub fn blob_keys() -> ColorKeys {
    ColorKeys::from_hex_map([
        ("Gold", vec!["#ffc90e"]),
        ("Green", vec!["#22b14c", "#b5e61d"]),
        ("Pink", vec!["#ffaec9"]),
    ])
    .expect("valid keys")
}

/// Centroids sorted by (x, y), for order-independent comparison
pub fn sorted(centroids: &[Centroid]) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = centroids.iter().map(|c| (c.x, c.y)).collect();
    out.sort_by(|a, b| a.partial_cmp(b).expect("finite coordinates"));
    out
}
