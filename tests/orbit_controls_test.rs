use std::f32::consts::PI;

use cgmath::{InnerSpace, MetricSpace, Point3};
use flow_materials::{
    camera::Camera,
    controls::{OrbitControls, Spherical},
};

use crate::common::test_utils::assert_close;

mod common;

fn camera() -> Camera {
    Camera::new((1.0, 1.0, 2.0), (0.0, 0.0, 0.0))
}

fn distance(camera: &Camera, controls: &OrbitControls) -> f32 {
    camera.position.distance(controls.target)
}

#[test]
fn should_round_trip_spherical_offsets() {
    let offset = cgmath::Vector3::new(1.0, 1.0, 2.0);
    let spherical = Spherical::from_offset(offset);
    assert_close(spherical.radius, offset.magnitude());
    let back = spherical.to_offset();
    assert!((back - offset).magnitude() < 1e-5);
}

#[test]
fn should_keep_the_camera_still_without_input() {
    let mut camera = camera();
    let start = camera.position;
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0)).with_damping(0.05);

    for _ in 0..10 {
        assert!(!controls.update(&mut camera));
    }
    assert!(camera.position.distance(start) < 1e-5);
}

#[test]
fn should_preserve_distance_while_rotating() {
    let mut camera = camera();
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0)).with_damping(0.05);
    let start = distance(&camera, &controls);

    controls.rotate_left(1.2);
    controls.rotate_up(0.4);
    for _ in 0..200 {
        controls.update(&mut camera);
        assert!((distance(&camera, &controls) - start).abs() < 1e-4);
    }
    assert_eq!(camera.target, controls.target);
}

#[test]
fn should_ease_out_and_converge() {
    let mut camera = camera();
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0)).with_damping(0.05);
    controls.rotate_left(1.0);

    let mut steps = Vec::new();
    let mut previous = camera.position;
    for _ in 0..400 {
        controls.update(&mut camera);
        steps.push(camera.position.distance(previous));
        previous = camera.position;
    }
    // Each frame moves less than the one before it.
    assert!(steps.windows(2).all(|w| w[1] <= w[0] + 1e-6));
    assert!(steps[0] > 0.0);
    assert!(*steps.last().unwrap() < 1e-6);
}

#[test]
fn should_apply_the_full_delta_at_once_without_damping() {
    let mut camera = camera();
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    let theta = Spherical::from_offset(camera.position - controls.target).theta;

    controls.rotate_left(0.5);
    assert!(controls.update(&mut camera));
    let after = Spherical::from_offset(camera.position - controls.target);
    assert_close(after.theta, theta - 0.5);

    assert!(!controls.update(&mut camera));
}

#[test]
fn should_be_deterministic() {
    let run = || {
        let mut camera = camera();
        let mut controls = OrbitControls::new((0.0, 0.0, 0.0)).with_damping(0.05);
        controls.rotate_by_pixels(120.0, -40.0, 600.0);
        controls.dolly_in(0.9);
        let mut path = Vec::new();
        for _ in 0..60 {
            controls.update(&mut camera);
            path.push(camera.position);
        }
        path
    };
    assert_eq!(run(), run());
}

#[test]
fn should_never_cross_the_poles() {
    let mut camera = camera();
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));

    let finite = |camera: &Camera| {
        let matrix = camera.calc_matrix();
        let view: &[f32; 16] = matrix.as_ref();
        view.iter().all(|v| v.is_finite())
    };

    controls.rotate_up(10.0);
    controls.update(&mut camera);
    assert!(finite(&camera));
    assert!(camera.position.y > 0.0);

    controls.rotate_up(-10.0);
    controls.update(&mut camera);
    assert!(finite(&camera));
    assert!(camera.position.y < 0.0);
    assert!(Spherical::from_offset(camera.position - controls.target).phi <= PI);
}

#[test]
fn should_respect_distance_limits_when_dollying() {
    let mut camera = camera();
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    controls.min_distance = 1.0;
    controls.max_distance = 5.0;

    for _ in 0..100 {
        controls.dolly_in(0.5);
        controls.update(&mut camera);
    }
    assert_close(distance(&camera, &controls), 1.0);

    for _ in 0..100 {
        controls.dolly_out(0.5);
        controls.update(&mut camera);
    }
    assert_close(distance(&camera, &controls), 5.0);
}

#[test]
fn should_move_the_target_when_panning() {
    use flow_materials::camera::Projection;

    let mut camera = camera();
    let projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 100.0);
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    let offset = camera.position - controls.target;

    controls.pan_by_pixels(50.0, 0.0, &camera, &projection, 600.0);
    controls.update(&mut camera);

    assert_ne!(controls.target, Point3::new(0.0, 0.0, 0.0));
    // Panning translates camera and target together.
    assert!(((camera.position - controls.target) - offset).magnitude() < 1e-4);
}

#[test]
fn should_start_a_drag_from_the_tracked_cursor() {
    use flow_materials::camera::Projection;
    use winit::{
        dpi::LogicalPosition,
        event::{ElementState, MouseButton},
    };

    let projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 100.0);
    let height = 600.0;

    let mut camera = camera();
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    controls.pointer_moved(LogicalPosition::new(10.0, 10.0), &camera, &projection, height);
    // Another widget owned the pointer while it travelled across the window.
    controls.track_cursor(LogicalPosition::new(400.0, 300.0));

    assert!(controls.button(MouseButton::Left, ElementState::Pressed));
    assert!(controls.is_dragging());
    assert!(controls.pointer_moved(LogicalPosition::new(401.0, 300.0), &camera, &projection, height));
    controls.update(&mut camera);

    let mut expected = self::camera();
    let mut reference = OrbitControls::new((0.0, 0.0, 0.0));
    reference.rotate_by_pixels(1.0, 0.0, height);
    reference.update(&mut expected);
    assert!(camera.position.distance(expected.position) < 1e-5);

    assert!(controls.button(MouseButton::Left, ElementState::Released));
    assert!(!controls.is_dragging());
    assert!(!controls.pointer_moved(LogicalPosition::new(500.0, 300.0), &camera, &projection, height));
}

#[test]
fn should_upload_the_camera_position_with_the_view() {
    use flow_materials::camera::{CameraUniform, Projection};

    let projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 100.0);
    let mut camera = camera();
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    controls.rotate_left(0.3);
    controls.update(&mut camera);

    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera, &projection);
    let [x, y, z] = uniform.view_position();
    assert_close(x, camera.position.x);
    assert_close(y, camera.position.y);
    assert_close(z, camera.position.z);
}
