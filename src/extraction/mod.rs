pub mod classify;
pub mod cluster;
pub mod keys;
pub mod materialize;

use crate::analytics::{CallInfo, UsageLog};
use crate::error::{ClusterError, ExtractError};
use crate::models::{Centroid, LabelCentroids, LabeledPointSet};
use image::{DynamicImage, ImageReader, RgbImage};
use keys::{ColorKeys, ColorLookup, OverlapPolicy};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Clustering failure for a single label
#[derive(Debug, Clone, PartialEq)]
pub struct LabelFailure {
    pub label: String,
    pub error: ClusterError,
}

/// Outcome of the in-memory part of an extraction
#[derive(Debug, Clone, Default)]
pub struct Clustered {
    pub labels: Vec<LabelCentroids>,
    pub failures: Vec<LabelFailure>,
}

/// Everything an extraction produced
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub annotated: RgbImage,
    pub output_dir: PathBuf,
    pub image_path: PathBuf,
    pub coordinate_files: Vec<PathBuf>,
    pub labels: Vec<LabelCentroids>,
    /// Labels whose clustering failed; the others were still written
    pub failures: Vec<LabelFailure>,
}

impl ExtractionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Pixel-to-point extraction: classify pixels by color key, cluster each
/// label's pixels by proximity, and write the centroids out
pub struct PixelExtractor {
    pub keys: ColorKeys,
    pub color_threshold: f64,
    pub proximity_grouping: f64,
    pub overlap_policy: OverlapPolicy,
    usage_log: Option<UsageLog>,
}

impl PixelExtractor {
    pub fn new(keys: ColorKeys) -> Self {
        Self {
            keys,
            color_threshold: 5.0,
            proximity_grouping: 10.0,
            overlap_policy: OverlapPolicy::default(),
            usage_log: None,
        }
    }

    pub fn with_color_threshold(mut self, threshold: f64) -> Self {
        self.color_threshold = threshold;
        self
    }

    pub fn with_proximity_grouping(mut self, distance: f64) -> Self {
        self.proximity_grouping = distance;
        self
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Record every `extract` call, and each label's clustering, to a usage log
    pub fn with_usage_log(mut self, log: UsageLog) -> Self {
        self.usage_log = Some(log);
        self
    }

    /// Check keys and parameters without touching the file system
    pub fn validate(&self) -> Result<(), ExtractError> {
        self.keys.validate()?;
        check_non_negative("color_threshold", self.color_threshold)?;
        check_non_negative("proximity_grouping", self.proximity_grouping)?;
        Ok(())
    }

    /// Run the full pipeline on an image file and write its outputs
    pub fn extract(&self, image_path: impl AsRef<Path>) -> Result<ExtractionReport, ExtractError> {
        let image_path = image_path.as_ref();
        match &self.usage_log {
            Some(usage) => usage.record(&self.call_info(), || self.run(image_path)),
            None => self.run(image_path),
        }
    }

    fn run(&self, image_path: &Path) -> Result<ExtractionReport, ExtractError> {
        self.validate()?;

        let io_error = |source| ExtractError::Io {
            path: image_path.to_path_buf(),
            source,
        };
        let image = ImageReader::open(image_path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(io_error)?
            .decode()
            .map_err(|source| ExtractError::ImageRead {
                path: image_path.to_path_buf(),
                source,
            })?;
        debug!(
            "Loaded {}: {}x{}",
            image_path.display(),
            image.width(),
            image.height()
        );

        let clustered = self.extract_image(&image)?;
        let written = materialize::materialize(image_path, &image, &clustered.labels)?;

        Ok(ExtractionReport {
            annotated: written.annotated,
            output_dir: written.output_dir,
            image_path: written.image_path,
            coordinate_files: written.coordinate_files,
            labels: clustered.labels,
            failures: clustered.failures,
        })
    }

    /// Classify and cluster an in-memory image without writing anything
    pub fn extract_image(&self, image: &DynamicImage) -> Result<Clustered, ExtractError> {
        self.validate()?;

        let lookup = ColorLookup::build(&self.keys, self.color_threshold, self.overlap_policy)?;
        let point_sets = classify::classify_pixels(image, &self.keys, &lookup)?;

        cluster_labels(&self.keys, point_sets, |set| self.cluster_label(set))
    }

    fn cluster_label(&self, set: &LabeledPointSet) -> Result<Vec<Centroid>, ClusterError> {
        let run = || cluster::cluster_points(set, self.proximity_grouping);
        let centroids = match &self.usage_log {
            Some(usage) => usage.record(&cluster::point_group_call(), run)?,
            None => run()?,
        };
        debug!(
            "Grouped {} '{}' pixels into {} point(s)",
            set.len(),
            set.label,
            centroids.len()
        );
        Ok(centroids)
    }

    fn call_info(&self) -> CallInfo {
        CallInfo::new("extract", module_path!())
            .with_parameter::<&Path>("image_path")
            .with_parameter::<ColorKeys>("color_keys")
            .with_parameter::<f64>("proximity_grouping")
            .with_parameter::<f64>("color_threshold")
    }
}

/// Cluster each label's points independently. A failing label is recorded
/// in `failures` and the remaining labels are still clustered.
fn cluster_labels<F>(
    keys: &ColorKeys,
    point_sets: Vec<LabeledPointSet>,
    mut cluster: F,
) -> Result<Clustered, ExtractError>
where
    F: FnMut(&LabeledPointSet) -> Result<Vec<Centroid>, ClusterError>,
{
    let mut clustered = Clustered::default();
    for (key, set) in keys.iter().zip(point_sets) {
        match cluster(&set) {
            Ok(centroids) => clustered.labels.push(LabelCentroids {
                label: set.label,
                color: key.marker_color()?,
                centroids,
            }),
            Err(error) => {
                warn!("Clustering '{}' failed: {}", set.label, error);
                clustered.failures.push(LabelFailure {
                    label: set.label,
                    error,
                });
            }
        }
    }
    Ok(clustered)
}

fn check_non_negative(name: &str, value: f64) -> Result<(), ExtractError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ExtractError::InvalidParameter(format!(
            "{} must be a finite, non-negative number (got {})",
            name, value
        )))
    }
}
