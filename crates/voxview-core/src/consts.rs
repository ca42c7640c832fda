/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f64 = 1e-10;

/// Maximum value of the 8-bit display range.
pub const DISPLAY_MAX: f64 = 255.0;

/// Default half-size (in pixels) of the box painted around each watershed marker.
pub const DEFAULT_MARKER_RADIUS: usize = 10;

/// Distance (in histogram pixels) within which a drag grabs a contrast handle.
pub const DEFAULT_HANDLE_GRAB_THRESHOLD: f64 = 10.0;

/// Default display area for a slice (width, height).
pub const DEFAULT_MAX_DISPLAY_SIZE: (usize, usize) = (400, 400);

/// Default number of histogram bins.
pub const DEFAULT_HISTOGRAM_BINS: usize = 256;

/// Default histogram raster size (width, height).
pub const DEFAULT_HISTOGRAM_SIZE: (u32, u32) = (400, 200);

/// Header values whose element length exceeds this are truncated for display.
pub const HEADER_TRUNCATE_THRESHOLD: u32 = 200;

/// Number of characters kept when a header value is truncated.
pub const HEADER_TRUNCATE_LENGTH: usize = 400;

/// Number of grey levels in the watershed flooding queue.
pub const WATERSHED_LEVELS: usize = 256;

/// Label written on watershed pixels contested by two regions.
pub const WATERSHED_BOUNDARY: i32 = -1;

/// Label of pixels no region has claimed.
pub const UNLABELED: i32 = 0;

/// Default blend factor for two-volume fusion.
pub const DEFAULT_FUSION_ALPHA: f32 = 0.5;

/// Default initial optimizer step for registration, in pixels.
pub const DEFAULT_REGISTRATION_STEP: f64 = 1.0;

/// Default number of optimizer iterations for registration.
pub const DEFAULT_REGISTRATION_ITERATIONS: usize = 100;

/// Finite-difference half step (pixels) used to estimate metric gradients.
pub const REGISTRATION_GRADIENT_STEP: f64 = 0.5;

/// Factor applied to the optimizer step when a move fails to improve the metric.
pub const REGISTRATION_RELAXATION: f64 = 0.5;
