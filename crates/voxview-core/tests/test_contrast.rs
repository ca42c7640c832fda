mod common;

use ndarray::{array, Array2};

use voxview_core::error::ViewerError;
use voxview_core::view::{ContrastWindow, Histogram, HistogramHandles};

#[test]
fn test_full_window_maps_min_to_0_and_max_to_255() {
    let slice = common::ramp(1, 11).mapv(|v| v * 10.0);
    let out = ContrastWindow::default().apply(&slice.view());
    assert_eq!(out[[0, 0]], 0);
    assert_eq!(out[[0, 10]], 255);
    assert_eq!(out[[0, 5]], 128);
}

#[test]
fn test_output_is_bounded_and_monotonic() {
    let slice = Array2::from_shape_fn((1, 200), |(_, c)| c as f32 * 7.3 - 400.0);
    for (low, high) in [(0.0, 1.0), (0.2, 0.8), (0.5, 0.5), (0.0, 0.0), (1.0, 1.0), (0.9, 1.0)] {
        let out = ContrastWindow::new(low, high).unwrap().apply(&slice.view());
        let values: Vec<u8> = out.iter().copied().collect();
        assert!(
            values.windows(2).all(|w| w[0] <= w[1]),
            "not monotonic for ({low}, {high})"
        );
    }
}

#[test]
fn test_negative_data_is_offset() {
    // offset = 100, span = 200; window [0.25, 0.75] -> lo = -50, hi = 50
    let slice = array![[-100.0f32, -50.0, 0.0, 50.0, 100.0]];
    let out = ContrastWindow::new(0.25, 0.75).unwrap().apply(&slice.view());
    assert_eq!(out, array![[0u8, 0, 128, 255, 255]]);
}

#[test]
fn test_constant_slice_does_not_divide_by_zero() {
    let slice = Array2::from_elem((4, 4), 7.0f32);
    let out = ContrastWindow::default().apply(&slice.view());
    assert!(out.iter().all(|&v| v == 255));
}

#[test]
fn test_set_window_rejects_invalid_and_keeps_state() {
    let mut window = ContrastWindow::new(0.1, 0.9).unwrap();
    for (low, high) in [(0.6, 0.4), (-0.1, 0.5), (0.2, 1.1), (f64::NAN, 0.5)] {
        let err = window.set_window(low, high).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidArgument(_)));
        assert_eq!((window.low(), window.high()), (0.1, 0.9));
    }
    window.set_window(0.3, 0.3).unwrap();
    assert_eq!((window.low(), window.high()), (0.3, 0.3));
}

#[test]
fn test_histogram_counts_every_sample() {
    let slice = common::ramp(10, 100);
    let hist = Histogram::compute(&slice.view(), 10).unwrap();
    assert_eq!(hist.bins(), 10);
    assert_eq!(hist.total(), 1000);
    assert!(hist.counts.iter().all(|&c| c == 100));
    assert_eq!(hist.min, 0.0);
    assert_eq!(hist.max, 99.0);
}

#[test]
fn test_histogram_rejects_zero_bins() {
    let slice = common::ramp(2, 2);
    assert!(Histogram::compute(&slice.view(), 0).is_err());
}

#[test]
fn test_histogram_image_has_requested_size() {
    let slice = common::ramp(4, 16);
    let hist = Histogram::compute(&slice.view(), 16).unwrap();
    let img = hist.histogram_image(64, 32);
    assert_eq!(img.dimensions(), (64, 32));
    // Uniform counts fill every column to the top.
    assert_eq!(img.get_pixel(10, 0).0[0], 255);
}

#[test]
fn test_handles_start_at_edges() {
    let handles = HistogramHandles::new(200.0);
    assert_eq!(handles.positions(), [0.0, 200.0]);
}

#[test]
fn test_drag_moves_nearest_handle() {
    let mut handles = HistogramHandles::new(200.0);
    handles.drag(3.0);
    handles.drag(23.0);
    handles.drag(43.0);
    assert_eq!(handles.positions(), [40.0, 200.0]);

    let (low, high) = handles.release();
    assert_eq!((low, high), (0.2, 1.0));
    assert!(handles.selected().is_none());
}

#[test]
fn test_drag_far_from_handles_does_nothing() {
    let mut handles = HistogramHandles::new(200.0);
    handles.drag(100.0);
    handles.drag(120.0);
    assert_eq!(handles.positions(), [0.0, 200.0]);
}

#[test]
fn test_min_handle_cannot_cross_max() {
    let mut handles = HistogramHandles::new(100.0);
    // Bring the max handle down to 50.
    handles.drag(99.0);
    handles.drag(49.0);
    handles.release();
    assert_eq!(handles.positions(), [0.0, 50.0]);

    handles.drag(1.0);
    handles.drag(41.0);
    assert_eq!(handles.positions(), [40.0, 50.0]);
    // This move would put min at 60, past max: dropped.
    handles.drag(61.0);
    assert_eq!(handles.positions(), [40.0, 50.0]);
    // Meeting the other handle exactly is allowed.
    handles.drag(71.0);
    assert_eq!(handles.positions(), [50.0, 50.0]);
    assert_eq!(handles.release(), (0.5, 0.5));
}

#[test]
fn test_handle_cannot_leave_histogram() {
    let mut handles = HistogramHandles::new(100.0);
    handles.drag(2.0);
    handles.drag(-5.0);
    assert_eq!(handles.positions(), [0.0, 100.0]);
    let (low, high) = handles.release();
    assert!(ContrastWindow::new(low, high).is_ok());
}

#[test]
fn test_selection_sticks_for_the_gesture() {
    let mut handles = HistogramHandles::new(100.0);
    handles.drag(5.0);
    handles.drag(95.0);
    // Still the min handle, moved by 90.
    assert_eq!(handles.positions(), [90.0, 100.0]);
}
