use flow_materials::{
    panel::{DebugPanel, PANEL_MARGIN, PANEL_WIDTH, ROW_HEIGHT},
    scene::{Bootstrap, SLIDER_STEP, bootstrap},
};

use crate::common::test_utils::assert_close;

mod common;

const VIEWPORT_WIDTH: f32 = 800.0;

#[derive(Debug, Default)]
struct Params {
    metalness: f32,
    roughness: f32,
}

fn params_panel() -> DebugPanel<Params> {
    let mut panel = DebugPanel::new();
    panel
        .add(|p: &Params| p.metalness, |p, v| p.metalness = v)
        .min(0.0)
        .max(1.0)
        .step(SLIDER_STEP)
        .name("metalness");
    panel
        .add(|p: &Params| p.roughness, |p, v| p.roughness = v)
        .min(0.0)
        .max(1.0)
        .step(SLIDER_STEP)
        .name("roughness");
    panel
}

#[test]
fn should_write_only_the_bound_field() {
    let mut params = Params::default();
    let mut panel = params_panel();

    assert_close(panel.set(&mut params, "roughness", 0.25).unwrap(), 0.25);
    assert_close(params.roughness, 0.25);
    assert_close(params.metalness, 0.0);

    assert_close(panel.set(&mut params, "metalness", 0.75).unwrap(), 0.75);
    assert_close(params.metalness, 0.75);
    assert_close(params.roughness, 0.25);

    assert_eq!(panel.set(&mut params, "unknown", 0.5), None);
}

#[test]
fn should_snap_and_clamp_values() {
    let mut params = Params::default();
    let mut panel = params_panel();

    assert_close(panel.set(&mut params, "metalness", 0.123456).unwrap(), 0.1235);
    assert_close(panel.set(&mut params, "metalness", 0.7).unwrap(), 0.7);
    assert_close(params.metalness, 0.7);
    assert_close(panel.set(&mut params, "metalness", 1.5).unwrap(), 1.0);
    assert_eq!(panel.set(&mut params, "metalness", -0.2), Some(0.0));
    assert_eq!(params.metalness, 0.0);
}

#[test]
fn should_expose_slider_configuration() {
    let panel = params_panel();
    let slider = panel.slider("roughness").unwrap();

    assert_eq!(slider.label(), "roughness");
    assert_eq!(slider.range(), (0.0, 1.0));
    assert_eq!(slider.step_size(), Some(SLIDER_STEP));
    assert_eq!(panel.position("roughness"), Some(1));
    assert_eq!(panel.len(), 2);
}

#[test]
fn should_bind_each_showcase_slider_to_its_own_material_field() {
    let Bootstrap {
        mut scene,
        mut panel,
        door,
        environment,
        ..
    } = bootstrap();
    let labels: Vec<_> = panel.sliders().iter().map(|s| s.label().to_string()).collect();
    assert_eq!(
        labels,
        ["door metalness", "door roughness", " metalness", " roughness"]
    );

    panel.set(&mut scene, "door metalness", 0.3).unwrap();
    panel.set(&mut scene, "door roughness", 0.4).unwrap();
    panel.set(&mut scene, " metalness", 0.6).unwrap();
    panel.set(&mut scene, " roughness", 0.7).unwrap();

    assert_close(scene.material(door).metalness, 0.3);
    assert_close(scene.material(door).roughness, 0.4);
    assert_close(scene.material(environment).metalness, 0.6);
    assert_close(scene.material(environment).roughness, 0.7);
    assert_close(panel.slider(" roughness").unwrap().get(&scene), 0.7);
}

#[test]
fn should_lay_out_rows_in_the_top_right_corner() {
    let panel = params_panel();
    let rect = panel.panel_rect(VIEWPORT_WIDTH);

    assert_close(rect.x, VIEWPORT_WIDTH - PANEL_MARGIN - PANEL_WIDTH);
    assert_close(rect.y, 0.0);
    assert_close(rect.height, 2.0 * ROW_HEIGHT);
    assert_close(panel.row_rect(1, VIEWPORT_WIDTH).y, ROW_HEIGHT);

    let track = panel.track_rect(0, VIEWPORT_WIDTH);
    assert!(track.x > rect.x);
    assert!(track.x + track.width <= rect.x + rect.width);
}

#[test]
fn should_drag_a_slider_and_consume_the_pointer() {
    let mut params = Params::default();
    let mut panel = params_panel();
    let track = panel.track_rect(1, VIEWPORT_WIDTH);
    let y = track.y + track.height / 2.0;

    let hover = panel.pointer_moved(&mut params, track.x + track.width / 2.0, y, VIEWPORT_WIDTH);
    assert!(!hover.consumed);

    let press = panel.pointer_pressed(&mut params, VIEWPORT_WIDTH);
    assert!(press.consumed);
    let (idx, value) = press.changed.unwrap();
    assert_eq!(idx, 1);
    assert_close(value, 0.5);
    assert!(panel.is_dragging());
    assert_close(params.roughness, 0.5);

    // Leaving the track while dragging keeps editing the same slider.
    let drag = panel.pointer_moved(&mut params, track.x + track.width + 100.0, y + 200.0, VIEWPORT_WIDTH);
    assert!(drag.consumed);
    let (idx, value) = drag.changed.unwrap();
    assert_eq!(idx, 1);
    assert_close(value, 1.0);
    assert_close(params.metalness, 0.0);

    assert!(panel.pointer_released().consumed);
    assert!(!panel.is_dragging());
    assert!(!panel.pointer_released().consumed);
}

#[test]
fn should_ignore_pointer_outside_the_panel() {
    let mut params = Params::default();
    let mut panel = params_panel();

    panel.pointer_moved(&mut params, 10.0, 300.0, VIEWPORT_WIDTH);
    let press = panel.pointer_pressed(&mut params, VIEWPORT_WIDTH);
    assert!(!press.consumed);
    assert_eq!(press.changed, None);
    assert!(!panel.is_dragging());

    // Without a known cursor there is nothing to press.
    panel.pointer_left();
    assert!(!panel.pointer_pressed(&mut params, VIEWPORT_WIDTH).consumed);
}

#[test]
fn should_consume_clicks_on_labels_without_changing_values() {
    let mut params = Params::default();
    let mut panel = params_panel();
    let row = panel.row_rect(0, VIEWPORT_WIDTH);

    panel.pointer_moved(&mut params, row.x + 5.0, row.y + row.height / 2.0, VIEWPORT_WIDTH);
    let press = panel.pointer_pressed(&mut params, VIEWPORT_WIDTH);
    assert!(press.consumed);
    assert_eq!(press.changed, None);
    assert_close(params.metalness, 0.0);
}

#[test]
fn should_hide_and_let_input_through() {
    let mut params = Params::default();
    let mut panel = params_panel();
    assert!(panel.is_visible());
    assert!(!panel.quads(&params, VIEWPORT_WIDTH).is_empty());

    panel.toggle_visible();
    assert!(!panel.is_visible());
    assert!(panel.quads(&params, VIEWPORT_WIDTH).is_empty());

    let track = panel.track_rect(0, VIEWPORT_WIDTH);
    panel.pointer_moved(&mut params, track.x + 1.0, track.y + 1.0, VIEWPORT_WIDTH);
    assert!(!panel.pointer_pressed(&mut params, VIEWPORT_WIDTH).consumed);

    panel.toggle_visible();
    assert!(panel.is_visible());
}

#[test]
fn should_report_dirty_once_per_change() {
    let mut params = Params::default();
    let mut panel = params_panel();
    assert!(panel.take_dirty());
    assert!(!panel.take_dirty());

    panel.set(&mut params, "metalness", 0.2);
    assert!(panel.take_dirty());
    assert!(!panel.take_dirty());

    panel.set_visible(true);
    assert!(!panel.take_dirty());
    panel.set_visible(false);
    assert!(panel.take_dirty());

    panel.mark_dirty();
    assert!(panel.take_dirty());
}

#[test]
fn should_fill_tracks_by_value() {
    let mut params = Params::default();
    let mut panel = params_panel();
    // Background plus marker and track per row, no fill at zero.
    assert_eq!(panel.quads(&params, VIEWPORT_WIDTH).len(), 1 + 2 * 2);

    panel.set(&mut params, "metalness", 0.5);
    let quads = panel.quads(&params, VIEWPORT_WIDTH);
    assert_eq!(quads.len(), 1 + 2 * 2 + 1);
    let track = panel.track_rect(0, VIEWPORT_WIDTH);
    let fill = quads[3].rect;
    assert_close(fill.x, track.x);
    assert_close(fill.width, track.width * 0.5);
}

#[test]
fn should_format_values_to_the_step_precision() {
    let mut params = Params::default();
    let mut panel = params_panel();
    panel.set(&mut params, "metalness", 0.25);

    let slider = panel.slider("metalness").unwrap();
    assert_eq!(slider.display_value(&params), "0.2500");

    panel.add(|p: &Params| p.roughness, |p, v| p.roughness = v).step(0.5).name("coarse");
    panel.add(|p: &Params| p.roughness, |p, v| p.roughness = v).name("free");
    assert_eq!(panel.slider("coarse").unwrap().display_value(&params), "0.0");
    assert_eq!(panel.slider("free").unwrap().display_value(&params), "0.00");
}

#[test]
fn should_label_every_row_with_its_name_and_value() {
    let mut params = Params::default();
    let mut panel = params_panel();
    panel.set(&mut params, "roughness", 0.7);

    let labels = panel.labels(&params, VIEWPORT_WIDTH);
    let texts: Vec<_> = labels.iter().map(|label| label.text.as_str()).collect();
    assert_eq!(texts, ["metalness", "0.0000", "roughness", "0.7000"]);

    for (idx, pair) in labels.chunks(2).enumerate() {
        let row = panel.row_rect(idx, VIEWPORT_WIDTH);
        let track = panel.track_rect(idx, VIEWPORT_WIDTH);
        let (name, value) = (&pair[0], &pair[1]);
        // Names sit left of the track, values on it, both inside their row.
        assert!(name.rect.x > row.x);
        assert!(name.rect.x + name.rect.width <= track.x + 1e-3);
        assert!(value.rect.x >= track.x);
        assert!(value.rect.x + value.rect.width <= track.x + track.width + 1e-3);
        assert_close(name.rect.y, row.y);
        assert_close(value.rect.height, row.height);
    }

    panel.toggle_visible();
    assert!(panel.labels(&params, VIEWPORT_WIDTH).is_empty());
}

#[test]
fn should_label_the_showcase_sliders() {
    let Bootstrap { scene, panel, .. } = bootstrap();
    let texts: Vec<_> = panel
        .labels(&scene, VIEWPORT_WIDTH)
        .into_iter()
        .map(|label| label.text)
        .collect();
    assert_eq!(
        texts,
        [
            "door metalness",
            "0.0000",
            "door roughness",
            "1.0000",
            " metalness",
            "0.4500",
            " roughness",
            "0.0000",
        ]
    );
}
