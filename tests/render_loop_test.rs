use cgmath::{Euler, Quaternion, Rad};
use flow_materials::{
    app::{RenderLoop, spin},
    scene::{Bootstrap, bootstrap},
};

#[test]
fn should_count_frames_until_stopped() {
    let mut render_loop = RenderLoop::new();
    assert!(render_loop.is_running());

    let first = render_loop.tick().unwrap();
    let second = render_loop.tick().unwrap();
    assert!(second >= first);
    assert_eq!(render_loop.frames(), 2);

    render_loop.stop();
    assert!(!render_loop.is_running());
    assert_eq!(render_loop.tick(), None);
    assert_eq!(render_loop.frames(), 2);

    // Stopping twice is harmless.
    render_loop.stop();
    assert!(!render_loop.is_running());
}

#[test]
fn should_spin_every_mesh_by_elapsed_time() {
    let Bootstrap { mut scene, .. } = bootstrap();
    let positions: Vec<_> = scene.meshes().map(|m| m.transform.position).collect();

    spin(&mut scene, 2.0);

    let expected = Quaternion::from(Euler::new(Rad(0.3f32), Rad(0.4), Rad(0.0)));
    for (mesh, position) in scene.meshes().zip(positions) {
        let rotation = mesh.transform.rotation;
        assert!((rotation.s - expected.s).abs() < 1e-5);
        assert!((rotation.v.x - expected.v.x).abs() < 1e-5);
        assert!((rotation.v.y - expected.v.y).abs() < 1e-5);
        assert_eq!(mesh.transform.position, position);
    }

    // Rotation is a function of time, not accumulated per call.
    spin(&mut scene, 2.0);
    let mesh = scene.meshes().next().unwrap();
    assert!((mesh.transform.rotation.s - expected.s).abs() < 1e-5);
}

#[test]
fn should_stop_on_escape_only_in_native_builds() {
    use flow_materials::app::is_stop_key;
    use winit::keyboard::{Key, NamedKey};

    assert_eq!(
        is_stop_key(&Key::Named(NamedKey::Escape)),
        cfg!(not(target_arch = "wasm32"))
    );
    assert!(!is_stop_key(&Key::Named(NamedKey::Enter)));
    assert!(!is_stop_key(&Key::Character("h".into())));
}
