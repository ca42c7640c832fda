mod common;

use approx::assert_relative_eq;
use ndarray::{Array2, Array3};

use voxview_core::types::{DisplaySize, Point, SliceAxis};
use voxview_core::view::{fit_to_bounds, CoordinateSpace, VolumeView};
use voxview_core::volume::Volume;

#[test]
fn test_fit_not_needed_when_inside_bounds() {
    assert_eq!(
        fit_to_bounds(DisplaySize::new(300, 200), DisplaySize::new(400, 400)),
        None
    );
}

#[test]
fn test_fit_rows_limit() {
    // 800 rows x 400 cols into 400x400
    let fit = fit_to_bounds(DisplaySize::new(400, 800), DisplaySize::new(400, 400)).unwrap();
    assert_eq!(fit, DisplaySize::new(200, 400));
}

#[test]
fn test_fit_cols_limit() {
    // 300 rows x 900 cols into 450x400
    let fit = fit_to_bounds(DisplaySize::new(900, 300), DisplaySize::new(450, 400)).unwrap();
    assert_eq!(fit, DisplaySize::new(450, 150));
}

#[test]
fn test_fit_tie_uses_rows() {
    let fit = fit_to_bounds(DisplaySize::new(512, 512), DisplaySize::new(400, 300)).unwrap();
    assert_eq!(fit, DisplaySize::new(300, 300));
}

#[test]
fn test_fit_never_collapses_to_zero() {
    let fit = fit_to_bounds(DisplaySize::new(1, 1000), DisplaySize::new(100, 100)).unwrap();
    assert_eq!(fit, DisplaySize::new(1, 100));
}

#[test]
fn test_fit_non_square_box_can_overshoot() {
    // 300 rows x 250 cols into 200 wide, 400 high: rows take 400, cols follow.
    let fit = fit_to_bounds(DisplaySize::new(250, 300), DisplaySize::new(200, 400)).unwrap();
    assert_eq!(fit, DisplaySize::new(333, 400));
    assert!(fit.width > 200);
}

#[test]
fn test_fit_slice_caches_geometry() {
    let mut space = CoordinateSpace::new(Some(DisplaySize::new(50, 50)));
    let slice = common::ramp(100, 200);

    let first = space.fit_slice(&slice.view());
    assert_eq!(first.dim(), (25, 50));
    assert_eq!(space.original_size(), Some(DisplaySize::new(200, 100)));
    assert_eq!(space.fit_size(), Some(DisplaySize::new(50, 25)));

    // Fitting again reproduces the cached size exactly.
    let second = space.fit_slice(&slice.view());
    assert_eq!(second.dim(), first.dim());
    assert_eq!(space.fit_size(), Some(DisplaySize::new(50, 25)));
}

#[test]
fn test_changing_bound_resets_geometry() {
    let mut space = CoordinateSpace::new(Some(DisplaySize::new(50, 50)));
    space.fit_slice(&common::ramp(100, 100).view());
    assert_eq!(space.fit_size(), Some(DisplaySize::new(50, 50)));

    space.set_max_size(Some(DisplaySize::new(20, 20)));
    assert_eq!(space.geometry(), None);
    space.fit_slice(&common::ramp(100, 100).view());
    assert_eq!(space.fit_size(), Some(DisplaySize::new(20, 20)));
}

#[test]
fn test_axis_switch_does_not_leave_stale_fit() {
    let volume = Volume::new(Array3::<f32>::zeros((10, 200, 100)));
    let mut view = VolumeView::new(volume, Some(DisplaySize::new(50, 50)));

    assert_eq!(view.render(0).unwrap().dim(), (50, 25));
    view.set_axis(SliceAxis::Second);
    // Slices along the second axis are 10 x 100.
    assert_eq!(view.render(0).unwrap().dim(), (5, 50));
    view.set_axis(SliceAxis::First);
    assert_eq!(view.render(0).unwrap().dim(), (50, 25));
    assert_eq!(view.space().original_size(), Some(DisplaySize::new(100, 200)));
}

#[test]
fn test_inverse_mapping_without_resize_is_identity() {
    let mut space = CoordinateSpace::new(None);
    space.fit_slice(&Array2::<f32>::zeros((40, 60)).view());
    let p = space.to_original(Point::new(12.0, 30.0), 1.0).unwrap();
    assert_eq!(p, Point::new(12.0, 30.0));
}

#[test]
fn test_inverse_mapping_undoes_fit_and_zoom() {
    let mut space = CoordinateSpace::new(Some(DisplaySize::new(100, 100)));
    space.fit_slice(&Array2::<f32>::zeros((200, 400)).view());
    assert_eq!(space.display_size(), Some(DisplaySize::new(100, 50)));

    let p = space.to_original(Point::new(40.0, 20.0), 2.0).unwrap();
    assert_relative_eq!(p.x, 40.0 / 2.0 * 4.0);
    assert_relative_eq!(p.y, 20.0 / 2.0 * 4.0);
}

#[test]
fn test_absolute_mapping_adds_pan_offset() {
    let volume = Volume::new(Array3::<f32>::zeros((1, 200, 400)));
    let mut view = VolumeView::new(volume, Some(DisplaySize::new(100, 100)));
    view.set_zoom(2.0).unwrap();
    view.render(0).unwrap();
    view.pan(40, 20);
    assert_eq!(view.zoom().offset(), [10, 20]);

    // Display (10, 6) sits at zoomed (30, 16), fitted (15, 8), original (60, 32).
    let absolute = view.to_original_absolute(Point::new(10.0, 6.0)).unwrap();
    assert_relative_eq!(absolute.x, 60.0);
    assert_relative_eq!(absolute.y, 32.0);

    let relative = view.to_original(Point::new(10.0, 6.0)).unwrap();
    assert_relative_eq!(relative.x, 20.0);
    assert_relative_eq!(relative.y, 12.0);

    assert!(view.to_original_absolute(Point::new(100.0, 6.0)).is_none());
}

#[test]
fn test_inverse_mapping_rejects_off_image_points() {
    let mut space = CoordinateSpace::new(None);
    space.fit_slice(&Array2::<f32>::zeros((10, 20)).view());
    assert!(space.to_original(Point::new(-1.0, 2.0), 1.0).is_none());
    assert!(space.to_original(Point::new(20.0, 2.0), 1.0).is_none());
    assert!(space.to_original(Point::new(5.0, 10.0), 1.0).is_none());
    assert!(space.to_original(Point::new(19.5, 9.5), 1.0).is_some());
}

#[test]
fn test_inverse_mapping_needs_geometry() {
    let space = CoordinateSpace::new(None);
    assert!(space.to_original(Point::new(0.0, 0.0), 1.0).is_none());
}

#[test]
fn test_forward_then_inverse() {
    let mut space = CoordinateSpace::new(Some(DisplaySize::new(64, 64)));
    space.fit_slice(&Array2::<f32>::zeros((128, 128)).view());
    let original = Point::new(30.0, 50.0);
    let display = space.to_display(original, 1.5).unwrap();
    let back = space.to_original(display, 1.5).unwrap();
    assert_relative_eq!(back.x, original.x, epsilon = 1e-9);
    assert_relative_eq!(back.y, original.y, epsilon = 1e-9);
}
