pub mod analytics;
pub mod color;
pub mod error;
pub mod extraction;
pub mod imaging;
pub mod models;

pub use analytics::{CallInfo, UsageLog};
pub use color::{Color, average_color, similar_colors};
pub use error::{ClusterError, ColorError, ExtractError, ImagingError};
pub use extraction::cluster::{UnionFind, cluster_points, point_group};
pub use extraction::keys::{ColorKey, ColorKeys, ColorLookup, OverlapPolicy};
pub use extraction::{ExtractionReport, PixelExtractor};
pub use imaging::{EncodedImage, base64_to_image, image_to_base64};
pub use models::{Centroid, LabelCentroids, LabeledPointSet, PixelCoordinate};
