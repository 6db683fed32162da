use crate::color::Color;
use crate::error::ExtractError;
use crate::models::{Centroid, LabelCentroids};
use image::{DynamicImage, RgbImage};
use imageproc::drawing::{draw_filled_ellipse_mut, draw_hollow_ellipse_mut};
use log::info;
use std::path::{Path, PathBuf};

/// Marker radius in pixels (a 5px disc around the centroid)
const MARKER_RADIUS: i32 = 2;
const MARKER_OUTLINE: Color = Color::BLACK;

/// Files written for one extraction
#[derive(Debug, Clone)]
pub struct Materialized {
    pub annotated: RgbImage,
    pub output_dir: PathBuf,
    pub image_path: PathBuf,
    pub coordinate_files: Vec<PathBuf>,
}

/// Directory next to the source image, named after its stem
pub fn output_dir_for(image_path: &Path) -> Result<PathBuf, ExtractError> {
    let absolute = std::path::absolute(image_path).map_err(|source| ExtractError::Io {
        path: image_path.to_path_buf(),
        source,
    })?;
    let stem = file_stem(&absolute)?;
    let parent = absolute.parent().unwrap_or_else(|| Path::new("/"));
    Ok(parent.join(stem))
}

fn file_stem(path: &Path) -> Result<String, ExtractError> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| ExtractError::InvalidParameter(format!(
            "image path has no file name: {}",
            path.display()
        )))
}

/// Grayscale copy of `image` with a marker drawn on each centroid
pub fn annotate(image: &DynamicImage, labels: &[LabelCentroids]) -> RgbImage {
    let gray = DynamicImage::ImageLumaA8(image.to_luma_alpha8());
    let mut canvas = gray.to_rgb8();

    let outline = rgb(MARKER_OUTLINE);
    for label in labels {
        let fill = rgb(label.color);
        for centroid in &label.centroids {
            let center = centroid.pixel();
            draw_filled_ellipse_mut(&mut canvas, center, MARKER_RADIUS, MARKER_RADIUS, fill);
            draw_hollow_ellipse_mut(&mut canvas, center, MARKER_RADIUS, MARKER_RADIUS, outline);
        }
    }

    canvas
}

fn rgb(color: Color) -> image::Rgb<u8> {
    image::Rgb(color.channels())
}

/// One `x,y` line per centroid with a bottom-left origin, newline-joined.
///
/// Whole numbers keep their `.0` (`30.0,8.0`), so existing `.dat` readers
/// see the same text they always have.
pub fn format_coordinates(centroids: &[Centroid], height: u32) -> String {
    centroids
        .iter()
        .map(|c| {
            let (x, y) = c.flip_y(height);
            format!("{:?},{:?}", x, y)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the annotated image and one `<label>.dat` per label.
///
/// Output goes to `<image dir>/<stem>/`, which is created if missing. Existing
/// files are overwritten; two runs targeting the same directory at once are
/// not supported.
pub fn materialize(
    image_path: &Path,
    image: &DynamicImage,
    labels: &[LabelCentroids],
) -> Result<Materialized, ExtractError> {
    let output_dir = output_dir_for(image_path)?;
    let stem = file_stem(image_path)?;

    std::fs::create_dir_all(&output_dir).map_err(|source| ExtractError::Io {
        path: output_dir.clone(),
        source,
    })?;

    let annotated = annotate(image, labels);
    let annotated_path = output_dir.join(format!("{}.png", stem));
    annotated
        .save(&annotated_path)
        .map_err(|source| ExtractError::ImageWrite {
            path: annotated_path.clone(),
            source,
        })?;
    info!("Saved annotated image to {}", annotated_path.display());

    let height = image.height();
    let mut coordinate_files = Vec::with_capacity(labels.len());
    for label in labels {
        let path = output_dir.join(format!("{}.dat", label.label));
        std::fs::write(&path, format_coordinates(&label.centroids, height)).map_err(|source| {
            ExtractError::Io {
                path: path.clone(),
                source,
            }
        })?;
        info!(
            "Wrote {} point(s) for '{}' to {}",
            label.centroids.len(),
            label.label,
            path.display()
        );
        coordinate_files.push(path);
    }

    Ok(Materialized {
        annotated,
        output_dir,
        image_path: annotated_path,
        coordinate_files,
    })
}
