//! Viewer controller.
//!
//! [`ViewerSession`] owns both view slots and every piece of interaction
//! state, and turns [`ViewerEvent`]s into [`ViewerOutcome`]s. Handlers that
//! need an image go through [`ViewerSession::guarded`]; handlers that count
//! as user actions go through [`ViewerSession::logged`], which appends to the
//! history before the handler runs. The guard always runs first, so blocked
//! actions never reach the history.

pub mod events;
pub mod history;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::measure::DistanceTool;
use crate::register::{fuse, register, resample, IterationReport};
use crate::segment::{segment, MarkerSegmentation};
use crate::types::{Point, SliceAxis};
use crate::view::{HistogramHandles, VolumeView};
use crate::volume::header::format_header_rows;
use crate::volume::{HeaderDictionary, Volume, VolumeLoader};

pub use events::{ViewTarget, ViewerEvent, ViewerOutcome};
pub use history::{ActionLog, ActionRecord};

pub struct ViewerSession {
    config: ViewerConfig,
    dictionary: HeaderDictionary,
    principal: Option<VolumeView>,
    secondary: Option<VolumeView>,
    depth: [usize; 2],
    segmentation: MarkerSegmentation,
    distance: DistanceTool,
    handles: HistogramHandles,
    pan_anchor: Option<Point>,
    history: ActionLog,
}

impl ViewerSession {
    pub fn new(config: ViewerConfig, dictionary: HeaderDictionary) -> Self {
        let handles = HistogramHandles::with_grab_threshold(
            config.histogram.width as f64,
            config.histogram.grab_threshold,
        );
        Self {
            config,
            dictionary,
            principal: None,
            secondary: None,
            depth: [0, 0],
            segmentation: MarkerSegmentation::new(),
            distance: DistanceTool::new(),
            handles,
            pan_anchor: None,
            history: ActionLog::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn view(&self, target: ViewTarget) -> Option<&VolumeView> {
        match target {
            ViewTarget::Principal => self.principal.as_ref(),
            ViewTarget::Secondary => self.secondary.as_ref(),
        }
    }

    pub fn depth(&self, target: ViewTarget) -> usize {
        self.depth[slot(target)]
    }

    pub fn history(&self) -> &ActionLog {
        &self.history
    }

    pub fn handles(&self) -> &HistogramHandles {
        &self.handles
    }

    pub fn segmentation(&self) -> &MarkerSegmentation {
        &self.segmentation
    }

    pub fn distance_tool(&self) -> &DistanceTool {
        &self.distance
    }

    /// Handle one event.
    pub fn dispatch(&mut self, event: ViewerEvent) -> Result<ViewerOutcome> {
        debug!(?event, "Dispatching event");
        match event {
            ViewerEvent::Open { path, target } => self.open(&path, target),
            ViewerEvent::SelectAxis { axis, target } => self.guarded(|s| {
                s.logged("axis", format!("{axis} {target:?}"), |s| {
                    s.select_axis(axis, target)
                })
            }),
            ViewerEvent::SetDepth { depth, target } => {
                self.guarded(|s| s.set_depth(depth, target))
            }
            ViewerEvent::SetZoom { factor } => self.guarded(|s| {
                s.logged("zoom", factor.to_string(), |s| {
                    s.view_mut(ViewTarget::Principal)?.set_zoom(factor)?;
                    s.render(ViewTarget::Principal)
                })
            }),
            ViewerEvent::PointerPress { x, y } => {
                self.guarded(|s| s.pointer_press(Point::new(x, y)))
            }
            ViewerEvent::PointerRelease { x, y } => {
                self.guarded(|s| s.pointer_release(Point::new(x, y)))
            }
            ViewerEvent::Hover { x, y } => self.guarded(|s| s.hover(Point::new(x, y))),
            ViewerEvent::HistogramDrag { x } => self.guarded(|s| {
                s.handles.drag(x);
                Ok(ViewerOutcome::HistogramHandles {
                    positions: s.handles.positions(),
                })
            }),
            ViewerEvent::HistogramRelease => self.guarded(|s| {
                s.logged("histogram", String::new(), |s| s.histogram_release())
            }),
            ViewerEvent::DistanceClick { x, y } => self.guarded(|s| {
                s.logged("distance", format!("({x}, {y})"), |s| {
                    s.distance_click(Point::new(x, y))
                })
            }),
            ViewerEvent::Watershed => {
                self.guarded(|s| s.logged("watershed", String::new(), |s| s.watershed()))
            }
            ViewerEvent::Fuse { alpha } => self.guarded(|s| {
                let alpha = alpha.unwrap_or(s.config.fusion.alpha);
                s.logged("fuse", alpha.to_string(), |s| s.fuse(alpha))
            }),
            ViewerEvent::Register => self.guarded(|s| {
                s.logged("register", String::new(), |s| s.register_with(|_| {}))
            }),
            ViewerEvent::ShowHeaders => {
                self.guarded(|s| s.logged("headers", String::new(), |s| s.headers()))
            }
            ViewerEvent::ShowHistory => {
                Ok(ViewerOutcome::History(self.history.records().to_vec()))
            }
        }
    }

    /// Refuse to run `handler` until a principal volume is open.
    pub fn guarded<T>(&mut self, handler: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.principal.is_none() {
            return Err(ViewerError::NoVolumeLoaded);
        }
        handler(self)
    }

    /// Record the action in the history, then run `handler`.
    pub fn logged<T>(
        &mut self,
        action: &str,
        arguments: String,
        handler: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.history.record(action, arguments);
        handler(self)
    }

    /// Load a volume from disk into a view slot.
    ///
    /// A failed load leaves the current volume of that slot in place.
    pub fn open(&mut self, path: &Path, target: ViewTarget) -> Result<ViewerOutcome> {
        self.logged("open", path.display().to_string(), |s| {
            let volume = VolumeLoader::load(path)?;
            s.install(volume, target)
        })
    }

    /// Put an already loaded volume into a view slot.
    pub fn open_volume(&mut self, volume: Volume, target: ViewTarget) -> Result<ViewerOutcome> {
        let label = volume
            .source()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string());
        self.logged("open", label, |s| s.install(volume, target))
    }

    /// Run the registration with a progress callback, secondary onto principal.
    pub fn register_with<F>(&mut self, on_iteration: F) -> Result<ViewerOutcome>
    where
        F: FnMut(&IterationReport),
    {
        let fixed = self.current_slice(ViewTarget::Principal)?;
        let moving = self.current_slice(ViewTarget::Secondary)?;
        let result = register(
            &moving.view(),
            &fixed.view(),
            &self.config.registration,
            on_iteration,
        )?;
        let registered = resample(
            &moving.view(),
            result.transform,
            self.config.registration.interpolation,
            fixed.dim(),
        );
        Ok(ViewerOutcome::Registration { result, registered })
    }

    fn install(&mut self, volume: Volume, target: ViewTarget) -> Result<ViewerOutcome> {
        if volume.is_empty() {
            return Err(ViewerError::InvalidArgument("volume has no voxels".into()));
        }
        info!(target = ?target, shape = ?volume.shape(), "Opened volume");

        let view = VolumeView::new(volume, self.config.max_display_size);
        match target {
            ViewTarget::Principal => {
                self.principal = Some(view);
                self.handles.reset();
                self.segmentation.cancel();
                self.distance.clear();
                self.pan_anchor = None;
            }
            ViewTarget::Secondary => self.secondary = Some(view),
        }
        self.depth[slot(target)] = 0;
        self.render(target)
    }

    fn view_mut(&mut self, target: ViewTarget) -> Result<&mut VolumeView> {
        match target {
            ViewTarget::Principal => self.principal.as_mut(),
            ViewTarget::Secondary => self.secondary.as_mut(),
        }
        .ok_or(ViewerError::NoVolumeLoaded)
    }

    fn render(&mut self, target: ViewTarget) -> Result<ViewerOutcome> {
        let depth = self.depth[slot(target)];
        let image = self.view_mut(target)?.render(depth)?;
        Ok(ViewerOutcome::Frame {
            target,
            depth,
            image,
        })
    }

    fn current_slice(&self, target: ViewTarget) -> Result<ndarray::Array2<f32>> {
        let view = self.view(target).ok_or(ViewerError::NoVolumeLoaded)?;
        let slice = view.volume().slice(view.axis(), self.depth[slot(target)])?;
        Ok(slice.to_owned())
    }

    fn select_axis(&mut self, axis: SliceAxis, target: ViewTarget) -> Result<ViewerOutcome> {
        self.view_mut(target)?.set_axis(axis);
        self.depth[slot(target)] = 0;
        if target == ViewTarget::Principal {
            self.distance.clear();
        }
        self.render(target)
    }

    fn set_depth(&mut self, depth: usize, target: ViewTarget) -> Result<ViewerOutcome> {
        let view = self.view_mut(target)?;
        let len = view.depth();
        if depth >= len {
            return Err(ViewerError::IndexOutOfRange {
                axis: view.axis().index(),
                index: depth,
                len,
            });
        }
        self.depth[slot(target)] = depth;
        self.render(target)
    }

    fn pointer_press(&mut self, point: Point) -> Result<ViewerOutcome> {
        if !self.segmentation.is_collecting() {
            self.pan_anchor = Some(point);
            return Ok(ViewerOutcome::Unchanged);
        }

        let view = self.view_mut(ViewTarget::Principal)?;
        let Some(original) = view.to_original_absolute(point) else {
            return Ok(ViewerOutcome::Unchanged);
        };
        let (row, col) = pixel_of(original, view);
        let label = self.segmentation.add_marker([row, col])?;
        Ok(ViewerOutcome::MarkerAdded { label, row, col })
    }

    fn pointer_release(&mut self, point: Point) -> Result<ViewerOutcome> {
        if self.segmentation.is_collecting() {
            return Ok(ViewerOutcome::Unchanged);
        }
        let Some(anchor) = self.pan_anchor.take() else {
            warn!("Pointer release without a press");
            return Ok(ViewerOutcome::Unchanged);
        };
        let dx = (anchor.x - point.x).round() as i64;
        let dy = (anchor.y - point.y).round() as i64;
        self.logged("pan", format!("({dx}, {dy})"), |s| {
            s.view_mut(ViewTarget::Principal)?.pan(dx, dy);
            s.render(ViewTarget::Principal)
        })
    }

    fn hover(&mut self, point: Point) -> Result<ViewerOutcome> {
        let depth = self.depth[slot(ViewTarget::Principal)];
        let value = self.view_mut(ViewTarget::Principal)?.probe(depth, point)?;
        Ok(ViewerOutcome::Probe(value.map(|v| v.to_string())))
    }

    fn histogram_release(&mut self) -> Result<ViewerOutcome> {
        let (low, high) = self.handles.release();
        self.view_mut(ViewTarget::Principal)?.set_contrast(low, high)?;
        self.render(ViewTarget::Principal)
    }

    fn distance_click(&mut self, point: Point) -> Result<ViewerOutcome> {
        let view = self.view_mut(ViewTarget::Principal)?;
        let original = view.to_original(point);
        let spacing = view.pixel_spacing();
        if original.is_none() {
            return Ok(ViewerOutcome::Unchanged);
        }
        Ok(match self.distance.click(original, spacing) {
            Some(measurement) => ViewerOutcome::Distance(measurement),
            None => ViewerOutcome::DistancePending,
        })
    }

    fn watershed(&mut self) -> Result<ViewerOutcome> {
        if !self.segmentation.is_collecting() {
            self.segmentation.arm();
            return Ok(ViewerOutcome::SegmentationArmed);
        }
        let markers = self.segmentation.take_ready()?;
        let slice = self.current_slice(ViewTarget::Principal)?;
        let result = segment(&slice.view(), &markers, self.config.segmentation.marker_radius)?;
        Ok(ViewerOutcome::Segmentation {
            labels: result.labels,
            display: result.display,
            regions: result.regions,
        })
    }

    fn fuse(&mut self, alpha: f32) -> Result<ViewerOutcome> {
        let a = self.current_slice(ViewTarget::Principal)?;
        let b = self.current_slice(ViewTarget::Secondary)?;
        Ok(ViewerOutcome::Fusion(fuse(&a.view(), &b.view(), alpha)?))
    }

    fn headers(&mut self) -> Result<ViewerOutcome> {
        let view = self.view(ViewTarget::Principal).ok_or(ViewerError::NoVolumeLoaded)?;
        let rows = format_header_rows(
            view.volume().header_entries(),
            &self.dictionary,
            &self.config.headers,
        );
        Ok(ViewerOutcome::Headers(rows))
    }
}

fn slot(target: ViewTarget) -> usize {
    match target {
        ViewTarget::Principal => 0,
        ViewTarget::Secondary => 1,
    }
}

/// Integer `(row, col)` of an original-space point, kept inside the slice.
fn pixel_of(point: Point, view: &VolumeView) -> (usize, usize) {
    let (rows, cols) = view
        .space()
        .original_size()
        .map_or((1, 1), |size| size.shape());
    let row = (point.y.floor().max(0.0) as usize).min(rows.saturating_sub(1));
    let col = (point.x.floor().max(0.0) as usize).min(cols.saturating_sub(1));
    (row, col)
}
