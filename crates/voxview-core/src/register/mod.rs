pub mod fusion;
pub mod phase_correlation;
pub mod registration;

pub use fusion::{fuse, to_rgb_image};
pub use phase_correlation::estimate_translation;
pub use registration::{
    evaluate_metric, register, resample, Interpolation, IterationReport, Metric, Optimizer,
    RegistrationConfig, RegistrationResult, Translation,
};
