use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{
    DEFAULT_REGISTRATION_ITERATIONS, DEFAULT_REGISTRATION_STEP, EPSILON,
    REGISTRATION_GRADIENT_STEP, REGISTRATION_RELAXATION,
};
use crate::error::{Result, ViewerError};

use super::phase_correlation::estimate_translation;

/// Translation taking fixed-image coordinates into the moving image:
/// `moving(p + t) ~ fixed(p)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub dy: f64,
    pub dx: f64,
}

impl Translation {
    pub fn new(dy: f64, dx: f64) -> Self {
        Self { dy, dx }
    }

    pub fn norm(&self) -> f64 {
        self.dy.hypot(self.dx)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Optimizer {
    #[default]
    RegularStepGradientDescent,
    PhaseCorrelation,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    #[default]
    MeanSquares,
    /// Negated Pearson correlation, so lower is better like mean squares.
    NormalizedCorrelation,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Linear,
    NearestNeighbor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    pub optimizer: Optimizer,
    pub metric: Metric,
    pub interpolation: Interpolation,
    /// Initial optimizer step, in pixels.
    pub learning_rate: f64,
    pub iterations: usize,
    /// Gradient descent stops once the step shrinks below this.
    pub min_step: f64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            optimizer: Optimizer::default(),
            metric: Metric::default(),
            interpolation: Interpolation::default(),
            learning_rate: DEFAULT_REGISTRATION_STEP,
            iterations: DEFAULT_REGISTRATION_ITERATIONS,
            min_step: 1e-3,
        }
    }
}

/// Optimizer state handed to the iteration callback.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IterationReport {
    pub iteration: usize,
    pub metric: f64,
    pub parameters: Translation,
    pub step: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RegistrationResult {
    pub transform: Translation,
    pub final_metric: f64,
    pub iterations: usize,
}

/// Register `moving` onto `fixed` with a translation-only transform.
///
/// `on_iteration` runs on the caller's thread once per optimizer step.
pub fn register<F>(
    moving: &ArrayView2<'_, f32>,
    fixed: &ArrayView2<'_, f32>,
    config: &RegistrationConfig,
    mut on_iteration: F,
) -> Result<RegistrationResult>
where
    F: FnMut(&IterationReport),
{
    validate(moving, fixed, config)?;

    let result = match config.optimizer {
        Optimizer::PhaseCorrelation => {
            let transform = estimate_translation(fixed, moving)?;
            let metric = evaluate_metric(fixed, moving, transform, config.metric, config.interpolation);
            on_iteration(&IterationReport {
                iteration: 1,
                metric,
                parameters: transform,
                step: 0.0,
            });
            RegistrationResult {
                transform,
                final_metric: metric,
                iterations: 1,
            }
        }
        Optimizer::RegularStepGradientDescent => {
            regular_step_descent(moving, fixed, config, &mut on_iteration)
        }
    };

    info!(
        optimizer = ?config.optimizer,
        dy = result.transform.dy,
        dx = result.transform.dx,
        metric = result.final_metric,
        iterations = result.iterations,
        "Registration finished"
    );
    Ok(result)
}

fn validate(moving: &ArrayView2<'_, f32>, fixed: &ArrayView2<'_, f32>, config: &RegistrationConfig) -> Result<()> {
    if moving.is_empty() || fixed.is_empty() {
        return Err(ViewerError::InvalidArgument(
            "registration needs non-empty images".into(),
        ));
    }
    if !config.learning_rate.is_finite() || config.learning_rate <= 0.0 {
        return Err(ViewerError::InvalidArgument(format!(
            "learning rate must be positive (got {})",
            config.learning_rate
        )));
    }
    if config.optimizer == Optimizer::PhaseCorrelation && moving.dim() != fixed.dim() {
        return Err(ViewerError::ShapeMismatch {
            left: moving.shape().to_vec(),
            right: fixed.shape().to_vec(),
        });
    }
    Ok(())
}

/// Normalized-gradient descent with a fixed step that halves whenever a
/// move fails to lower the metric.
fn regular_step_descent<F>(
    moving: &ArrayView2<'_, f32>,
    fixed: &ArrayView2<'_, f32>,
    config: &RegistrationConfig,
    on_iteration: &mut F,
) -> RegistrationResult
where
    F: FnMut(&IterationReport),
{
    let cost = |t: Translation| evaluate_metric(fixed, moving, t, config.metric, config.interpolation);

    let mut transform = Translation::default();
    let mut metric = cost(transform);
    let mut step = config.learning_rate;
    let mut iterations = 0;

    while iterations < config.iterations && step >= config.min_step {
        iterations += 1;

        let h = REGISTRATION_GRADIENT_STEP;
        let grad_dy = (cost(Translation::new(transform.dy + h, transform.dx))
            - cost(Translation::new(transform.dy - h, transform.dx)))
            / (2.0 * h);
        let grad_dx = (cost(Translation::new(transform.dy, transform.dx + h))
            - cost(Translation::new(transform.dy, transform.dx - h)))
            / (2.0 * h);
        let magnitude = grad_dy.hypot(grad_dx);

        if magnitude > EPSILON && magnitude.is_finite() {
            let candidate = Translation::new(
                transform.dy - step * grad_dy / magnitude,
                transform.dx - step * grad_dx / magnitude,
            );
            let candidate_metric = cost(candidate);
            if candidate_metric < metric {
                transform = candidate;
                metric = candidate_metric;
            } else {
                step *= REGISTRATION_RELAXATION;
            }
        } else {
            step *= REGISTRATION_RELAXATION;
        }

        debug!(iteration = iterations, metric, step, "Registration step");
        on_iteration(&IterationReport {
            iteration: iterations,
            metric,
            parameters: transform,
            step,
        });
    }

    RegistrationResult {
        transform,
        final_metric: metric,
        iterations,
    }
}

/// Similarity of `fixed` and the translated `moving` over their overlap.
///
/// Lower is better. Returns `f64::MAX` when the images do not overlap.
pub fn evaluate_metric(
    fixed: &ArrayView2<'_, f32>,
    moving: &ArrayView2<'_, f32>,
    transform: Translation,
    metric: Metric,
    interpolation: Interpolation,
) -> f64 {
    let pairs: Vec<(f64, f64)> = fixed
        .indexed_iter()
        .filter_map(|((row, col), &f)| {
            sample(
                moving,
                row as f64 + transform.dy,
                col as f64 + transform.dx,
                interpolation,
            )
            .map(|m| (f as f64, m as f64))
        })
        .collect();
    if pairs.is_empty() {
        return f64::MAX;
    }
    let n = pairs.len() as f64;

    match metric {
        Metric::MeanSquares => pairs.iter().map(|(f, m)| (f - m).powi(2)).sum::<f64>() / n,
        Metric::NormalizedCorrelation => {
            let mean_f = pairs.iter().map(|p| p.0).sum::<f64>() / n;
            let mean_m = pairs.iter().map(|p| p.1).sum::<f64>() / n;
            let (mut cov, mut var_f, mut var_m) = (0.0, 0.0, 0.0);
            for (f, m) in &pairs {
                let (df, dm) = (f - mean_f, m - mean_m);
                cov += df * dm;
                var_f += df * df;
                var_m += dm * dm;
            }
            let denom = (var_f * var_m).sqrt();
            if denom > EPSILON {
                -cov / denom
            } else {
                0.0
            }
        }
    }
}

/// Map `moving` onto a fixed grid of `shape`. Pixels that fall outside the
/// moving image are 0.
pub fn resample(
    moving: &ArrayView2<'_, f32>,
    transform: Translation,
    interpolation: Interpolation,
    shape: (usize, usize),
) -> Array2<f32> {
    Array2::from_shape_fn(shape, |(row, col)| {
        sample(
            moving,
            row as f64 + transform.dy,
            col as f64 + transform.dx,
            interpolation,
        )
        .unwrap_or(0.0)
    })
}

/// Sample at fractional `(y, x)`, `None` outside the image.
fn sample(data: &ArrayView2<'_, f32>, y: f64, x: f64, interpolation: Interpolation) -> Option<f32> {
    let (h, w) = data.dim();
    match interpolation {
        Interpolation::NearestNeighbor => {
            let (r, c) = (y.round(), x.round());
            if r < 0.0 || c < 0.0 || r >= h as f64 || c >= w as f64 {
                return None;
            }
            Some(data[[r as usize, c as usize]])
        }
        Interpolation::Linear => {
            if y < 0.0 || x < 0.0 || y > (h - 1) as f64 || x > (w - 1) as f64 {
                return None;
            }
            let y0 = y.floor() as usize;
            let x0 = x.floor() as usize;
            let y1 = (y0 + 1).min(h - 1);
            let x1 = (x0 + 1).min(w - 1);
            let fy = (y - y0 as f64) as f32;
            let fx = (x - x0 as f64) as f32;

            Some(
                data[[y0, x0]] * (1.0 - fx) * (1.0 - fy)
                    + data[[y0, x1]] * fx * (1.0 - fy)
                    + data[[y1, x0]] * (1.0 - fx) * fy
                    + data[[y1, x1]] * fx * fy,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_sample_rejects_outside() {
        let data = Array2::from_elem((3, 3), 1.0f32);
        assert_eq!(sample(&data.view(), 2.0, 2.0, Interpolation::Linear), Some(1.0));
        assert_eq!(sample(&data.view(), 2.01, 0.0, Interpolation::Linear), None);
        assert_eq!(sample(&data.view(), 2.4, 0.0, Interpolation::NearestNeighbor), Some(1.0));
    }
}
