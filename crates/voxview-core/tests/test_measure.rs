use approx::assert_relative_eq;
use ndarray::Array3;

use voxview_core::measure::{DistanceTool, Measurement};
use voxview_core::types::{DisplaySize, Point};
use voxview_core::view::VolumeView;
use voxview_core::volume::Volume;

fn view_100() -> VolumeView {
    let volume = Volume::new(Array3::<f32>::zeros((1, 100, 100)));
    let mut view = VolumeView::new(volume, None);
    view.render(0).unwrap();
    view
}

fn measure(view: &VolumeView, a: Point, b: Point) -> Option<Measurement> {
    let mut tool = DistanceTool::new();
    assert!(tool.click(view.to_original(a), None).is_none());
    tool.click(view.to_original(b), None)
}

#[test]
fn test_two_clicks_give_euclidean_distance() {
    let view = view_100();
    let m = measure(&view, Point::new(10.0, 10.0), Point::new(13.0, 14.0)).unwrap();
    assert_relative_eq!(m.pixels, 5.0);
    assert_eq!(m.physical, None);
}

#[test]
fn test_distance_is_stable_under_zoom() {
    let mut view = view_100();
    let a = Point::new(10.0, 20.0);
    let b = Point::new(30.0, 45.0);
    let at_1 = measure(&view, a, b).unwrap();

    view.set_zoom(2.0).unwrap();
    view.render(0).unwrap();
    let scaled = |p: Point| Point::new(p.x * 2.0, p.y * 2.0);
    let at_2 = measure(&view, scaled(a), scaled(b)).unwrap();

    assert_relative_eq!(at_1.pixels, at_2.pixels, epsilon = 1e-9);
}

#[test]
fn test_distance_is_reported_in_original_pixels_after_fit() {
    let volume = Volume::new(Array3::<f32>::zeros((1, 200, 200)));
    let mut view = VolumeView::new(volume, Some(DisplaySize::new(100, 100)));
    view.render(0).unwrap();
    let m = measure(&view, Point::new(0.0, 0.0), Point::new(30.0, 40.0)).unwrap();
    assert_relative_eq!(m.pixels, 100.0);
}

#[test]
fn test_off_image_click_keeps_pending_point() {
    let view = view_100();
    let mut tool = DistanceTool::new();
    tool.click(view.to_original(Point::new(1.0, 1.0)), None);
    assert!(tool.click(view.to_original(Point::new(500.0, 1.0)), None).is_none());
    assert_eq!(tool.pending(), Some(Point::new(1.0, 1.0)));

    let m = tool.click(view.to_original(Point::new(4.0, 5.0)), None).unwrap();
    assert_relative_eq!(m.pixels, 5.0);
    assert!(tool.pending().is_none());
}

#[test]
fn test_third_click_starts_a_new_pair() {
    let mut tool = DistanceTool::new();
    tool.click(Some(Point::new(0.0, 0.0)), None);
    tool.click(Some(Point::new(1.0, 0.0)), None);
    assert!(tool.click(Some(Point::new(7.0, 7.0)), None).is_none());
    assert_eq!(tool.pending(), Some(Point::new(7.0, 7.0)));
}

#[test]
fn test_physical_distance_uses_pixel_spacing() {
    // Row spacing 2 mm, column spacing 0.5 mm.
    let m = Measurement::between(Point::new(0.0, 0.0), Point::new(8.0, 3.0), Some((2.0, 0.5)));
    assert_relative_eq!(m.pixels, 73.0f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(m.physical.unwrap(), 4.0f64.hypot(6.0), epsilon = 1e-12);
}

#[test]
fn test_view_reports_plane_spacing() {
    let volume = Volume::new(Array3::<f32>::zeros((2, 10, 10))).with_spacing([5.0, 0.8, 0.6]);
    let mut view = VolumeView::new(volume, None);
    view.render(0).unwrap();
    let mut tool = DistanceTool::new();
    tool.click(view.to_original(Point::new(0.0, 0.0)), view.pixel_spacing());
    let m = tool
        .click(view.to_original(Point::new(5.0, 0.0)), view.pixel_spacing())
        .unwrap();
    assert_relative_eq!(m.physical.unwrap(), 3.0, epsilon = 1e-12);
}
