use flow_materials::{
    camera::Projection,
    context::{Viewport, platform_pixel_ratio_cap, resize_view},
    settings::Settings,
};
use winit::dpi::PhysicalSize;

use crate::common::test_utils::{assert_close, viewport};

mod common;

#[test]
fn should_use_logical_size_for_aspect() {
    assert_close(viewport(800, 600, 1.0).aspect(), 800.0 / 600.0);
    assert_close(viewport(800, 600, 2.0).aspect(), 800.0 / 600.0);
    assert_close(viewport(1920, 1080, 3.0).aspect(), 1920.0 / 1080.0);
}

#[test]
fn should_cap_pixel_ratio_for_surface_size() {
    assert_eq!(viewport(800, 600, 1.0).surface_size(), (800, 600));
    assert_eq!(viewport(800, 600, 2.0).surface_size(), (1600, 1200));
    assert_eq!(viewport(800, 600, 3.0).surface_size(), (1600, 1200));
    assert_eq!(viewport(800, 600, 1.5).surface_size(), (1200, 900));
}

#[test]
fn should_resize_at_pixel_ratio_one_and_two() {
    for ratio in [1.0, 2.0] {
        let mut viewport = viewport(800, 600, ratio);
        viewport.resize(400, 300, ratio);

        assert_close(viewport.aspect(), 400.0 / 300.0);
        assert_eq!(
            viewport.surface_size(),
            ((400.0 * ratio) as u32, (300.0 * ratio) as u32)
        );
    }
}

#[test]
fn should_convert_physical_window_size_to_logical() {
    let viewport = Viewport::from_physical(PhysicalSize::new(1600, 1200), 2.0, 2.0);
    assert_close(viewport.width(), 800.0);
    assert_close(viewport.height(), 600.0);
    assert_eq!(viewport.surface_size(), (1600, 1200));

    let capped = Viewport::from_physical(PhysicalSize::new(2400, 1800), 3.0, 2.0);
    assert_close(capped.width(), 800.0);
    assert_close(capped.height(), 600.0);
    assert_eq!(capped.surface_size(), (1600, 1200));
}

#[test]
fn should_match_the_window_at_fractional_scale_factors() {
    for (size, scale) in [((1001, 751), 1.5), ((1001, 751), 1.25), ((1366, 767), 1.75)] {
        let window = PhysicalSize::new(size.0, size.1);
        let viewport = Viewport::from_physical(window, scale, 2.0);
        assert_eq!(viewport.surface_size(), size, "at scale {scale}");
        assert_eq!(viewport.physical_size(), window);
    }

    let viewport = Viewport::from_physical(PhysicalSize::new(1001, 751), 1.5, 2.0);
    assert!((viewport.width() - 667.333).abs() < 1e-3);
    assert!((viewport.height() - 500.667).abs() < 1e-3);
}

#[test]
fn should_leave_native_surfaces_uncapped() {
    let cap = platform_pixel_ratio_cap(&Settings::default());
    let viewport = Viewport::from_physical(PhysicalSize::new(2400, 1800), 3.0, cap);
    if cfg!(target_arch = "wasm32") {
        assert_eq!(viewport.surface_size(), (1600, 1200));
    } else {
        assert_eq!(viewport.surface_size(), (2400, 1800));
    }
}

#[test]
fn should_follow_the_window_aspect_through_resizes() {
    for ratio in [1.0, 2.0] {
        let mut viewport = viewport(800, 600, ratio);
        let mut projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 100.0);
        let physical = |w: f64, h: f64| PhysicalSize::new((w * ratio) as u32, (h * ratio) as u32);

        let surface = resize_view(&mut viewport, &mut projection, physical(400.0, 300.0), ratio);
        assert_eq!(surface, Some(((400.0 * ratio) as u32, (300.0 * ratio) as u32)));
        assert_close(projection.aspect(), 400.0 / 300.0);
        assert_close(projection.aspect(), viewport.aspect());
        assert_close(viewport.width(), 400.0);

        let surface = resize_view(&mut viewport, &mut projection, physical(500.0, 250.0), ratio);
        assert_eq!(surface, Some(((500.0 * ratio) as u32, (250.0 * ratio) as u32)));
        assert_close(projection.aspect(), 2.0);
    }
}

#[test]
fn should_skip_empty_resizes_and_recover() {
    let mut viewport = viewport(800, 600, 1.0);
    let mut projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 100.0);

    assert_eq!(
        resize_view(&mut viewport, &mut projection, PhysicalSize::new(0, 0), 1.0),
        None
    );
    assert!(viewport.is_empty());
    assert_close(projection.aspect(), 800.0 / 600.0);

    assert_eq!(
        resize_view(&mut viewport, &mut projection, PhysicalSize::new(300, 300), 1.0),
        Some((300, 300))
    );
    assert_close(projection.aspect(), 1.0);
}

#[test]
fn should_report_minimised_windows_as_empty() {
    assert!(viewport(0, 600, 1.0).is_empty());
    assert!(viewport(800, 0, 1.0).is_empty());
    assert!(!viewport(1, 1, 1.0).is_empty());
    // No division by zero for a window that has not been laid out yet.
    assert!(viewport(800, 0, 1.0).aspect().is_finite());
}

#[test]
fn should_keep_projection_aspect_on_zero_resize() {
    let mut projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 100.0);
    assert_close(projection.aspect(), 800.0 / 600.0);

    projection.resize(400, 400);
    assert_close(projection.aspect(), 1.0);

    projection.resize(0, 300);
    assert_close(projection.aspect(), 1.0);
    assert!(projection.calc_matrix().x.x.is_finite());
}
