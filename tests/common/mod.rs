mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from pixel_points for tests
pub use pixel_points::{ColorKeys, ExtractError, OverlapPolicy, PixelExtractor};
