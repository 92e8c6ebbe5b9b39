#![cfg(feature = "integration-tests")]

use flow_materials::scene::{Bootstrap, bootstrap};

use crate::common::test_utils::{Offscreen, headless_device};

mod common;

#[test]
fn should_render_identical_frames_without_mutation() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let Some((device, queue)) = runtime.block_on(headless_device()) else {
        eprintln!("No graphics adapter available, skipping");
        return;
    };
    let Bootstrap { scene, panel, .. } = bootstrap();
    let offscreen = Offscreen::new(&device, &queue, &scene, &panel, 320, 240);

    let first = runtime.block_on(offscreen.render(&device, &queue));
    let second = runtime.block_on(offscreen.render(&device, &queue));

    assert_eq!(first.len(), 320 * 240 * 4);
    assert!(first == second, "two renders of an unchanged scene differ");
}

#[test]
fn should_draw_the_panel_and_meshes_over_the_clear_colour() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let Some((device, queue)) = runtime.block_on(headless_device()) else {
        eprintln!("No graphics adapter available, skipping");
        return;
    };
    let Bootstrap { scene, panel, .. } = bootstrap();
    let offscreen = Offscreen::new(&device, &queue, &scene, &panel, 320, 240);
    let pixels = runtime.block_on(offscreen.render(&device, &queue));

    let lit = pixels
        .chunks_exact(4)
        .filter(|px| px[0] > 0 || px[1] > 0 || px[2] > 0)
        .count();
    assert!(lit > 0, "nothing but the black clear colour was rendered");
}

#[test]
fn should_change_the_frame_when_a_slider_moves() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let Some((device, queue)) = runtime.block_on(headless_device()) else {
        eprintln!("No graphics adapter available, skipping");
        return;
    };
    let Bootstrap {
        mut scene,
        mut panel,
        ..
    } = bootstrap();
    let offscreen = Offscreen::new(&device, &queue, &scene, &panel, 320, 240);
    let before = runtime.block_on(offscreen.render(&device, &queue));

    panel.set(&mut scene, " metalness", 1.0).unwrap();
    offscreen.resources.write_materials(&queue, &scene);
    let after = runtime.block_on(offscreen.render(&device, &queue));

    assert!(before != after);
}

#[test]
fn should_bind_loaded_textures_to_their_slots() {
    use flow_materials::{
        data_structures::{material::MapKind, texture::TextureOptions},
        resources::{Loaded, TextureTarget},
    };
    use image::{Rgba, RgbaImage};

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let Some((device, queue)) = runtime.block_on(headless_device()) else {
        eprintln!("No graphics adapter available, skipping");
        return;
    };
    let Bootstrap {
        scene,
        panel,
        door,
        environment,
        ..
    } = bootstrap();
    let mut offscreen = Offscreen::new(&device, &queue, &scene, &panel, 64, 64);
    let door_resources = offscreen.resources.materials.iter().find(|m| m.id == door).unwrap();
    assert!(!door_resources.is_loaded(MapKind::Colour));

    let texel = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
    offscreen
        .resources
        .apply_loaded(
            &device,
            &queue,
            &scene,
            Loaded::Texture {
                target: TextureTarget::Map {
                    material: door,
                    kind: MapKind::Colour,
                },
                image: texel.clone(),
            },
        )
        .unwrap();
    offscreen
        .resources
        .apply_loaded(
            &device,
            &queue,
            &scene,
            Loaded::CubeMap {
                material: environment,
                faces: vec![texel.clone(); 6],
            },
        )
        .unwrap();
    offscreen
        .resources
        .apply_loaded(
            &device,
            &queue,
            &scene,
            Loaded::Texture {
                target: TextureTarget::Library {
                    name: "gradient".to_string(),
                    options: TextureOptions::COLOUR,
                },
                image: texel,
            },
        )
        .unwrap();

    let find = |id| offscreen.resources.materials.iter().find(|m| m.id == id).unwrap();
    assert!(find(door).is_loaded(MapKind::Colour));
    assert!(!find(door).is_loaded(MapKind::Normal));
    assert!(find(environment).is_env_loaded());
    assert!(!find(door).is_env_loaded());
    assert!(offscreen.resources.library_texture("gradient").is_some());
    assert!(offscreen.resources.library_texture("matcap").is_none());
}

#[cfg(feature = "ui")]
#[test]
fn should_prepare_a_name_and_value_label_per_slider() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let Some((device, queue)) = runtime.block_on(headless_device()) else {
        eprintln!("No graphics adapter available, skipping");
        return;
    };
    let Bootstrap { scene, panel, .. } = bootstrap();
    let offscreen = Offscreen::new(&device, &queue, &scene, &panel, 320, 240);
    assert_eq!(offscreen.resources.panel.label_count(), 2 * panel.len());
}
