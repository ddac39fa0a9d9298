use pagoda_garden::{
    data_structures::color::Color,
    gui::{Control, DebugPanel, GuiValue},
    lights::LightRig,
};

fn binding(panel: &DebugPanel, folder: &str, name: &str) -> pagoda_garden::gui::GuiBinding {
    panel
        .folder(folder)
        .into_iter()
        .find(|b| b.name == name)
        .cloned()
        .unwrap_or_else(|| panic!("no {folder}/{name} binding"))
}

#[test]
fn should_group_bindings_into_light_folders() {
    let panel = DebugPanel::for_lights();
    assert_eq!(panel.bindings().len(), 21);
    assert_eq!(panel.folder("Hemisphere").len(), 3);
    assert_eq!(panel.folder("Directional").len(), 8);
    assert_eq!(panel.folder("SpotLight").len(), 10);
    let names: Vec<_> = panel.folder("SpotLight").iter().map(|b| b.name).collect();
    assert_eq!(
        names,
        ["color", "intensity", "angle", "penumbra", "x", "y", "z", "target x", "target y", "target z"]
    );
}

#[test]
fn should_show_colors_as_hex_strings() {
    let panel = DebugPanel::for_lights();
    let rig = LightRig::garden();
    assert_eq!(binding(&panel, "Hemisphere", "skyColor").read(&rig), GuiValue::Hex("#b1e1ff".into()));
    assert_eq!(binding(&panel, "Hemisphere", "groundColor").read(&rig), GuiValue::Hex("#b97a20".into()));
}

#[test]
fn should_show_spot_angle_in_degrees_and_store_radians() {
    let panel = DebugPanel::for_lights();
    let mut rig = LightRig::garden();
    let angle = binding(&panel, "SpotLight", "angle");
    match angle.read(&rig) {
        GuiValue::Number(deg) => assert!((deg - 45.0).abs() < 1e-4),
        other => panic!("unexpected {other:?}"),
    }
    angle.write(&mut rig, GuiValue::Number(30.0)).unwrap();
    assert!((rig.spot.angle - 30f32.to_radians()).abs() < 1e-6);
}

#[test]
fn should_clamp_numbers_to_the_control_range() {
    let panel = DebugPanel::for_lights();
    let mut rig = LightRig::garden();
    binding(&panel, "Directional", "intensity")
        .write(&mut rig, GuiValue::Number(7.0))
        .unwrap();
    assert_eq!(rig.directional.intensity, 2.0);
    binding(&panel, "SpotLight", "target x")
        .write(&mut rig, GuiValue::Number(-250.0))
        .unwrap();
    assert_eq!(rig.spot.target.x, -100.0);
    binding(&panel, "SpotLight", "angle")
        .write(&mut rig, GuiValue::Number(120.0))
        .unwrap();
    assert!((rig.spot.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
}

#[test]
fn should_reject_values_of_the_wrong_kind() {
    let panel = DebugPanel::for_lights();
    let mut rig = LightRig::garden();
    let before = rig;
    assert!(binding(&panel, "Directional", "color")
        .write(&mut rig, GuiValue::Number(1.0))
        .is_err());
    assert!(binding(&panel, "Directional", "color")
        .write(&mut rig, GuiValue::Hex("#12345".into()))
        .is_err());
    assert_eq!(rig, before);
}

#[test]
fn should_offer_pickers_for_colors_and_sliders_for_numbers() {
    let panel = DebugPanel::for_lights();
    let rig = LightRig::garden();

    let ground = binding(&panel, "Hemisphere", "groundColor");
    assert_eq!(ground.srgb(&rig), Some([0xb9, 0x7a, 0x20]));
    assert_eq!(ground.slider_range(), None);

    let intensity = binding(&panel, "SpotLight", "intensity");
    assert_eq!(intensity.control, Control::Number { min: 0.0, max: 2.0, step: Some(0.01) });
    assert_eq!(intensity.srgb(&rig), None);
    assert_eq!(intensity.slider_range(), Some((0.0, 2.0, Some(0.01))));

    assert_eq!(binding(&panel, "SpotLight", "angle").slider_range(), Some((0.0, 90.0, Some(1.0))));
    assert_eq!(binding(&panel, "SpotLight", "x").slider_range(), Some((-100.0, 100.0, None)));
}

#[test]
fn should_write_picked_colors_back_as_hex() {
    let panel = DebugPanel::for_lights();
    let mut rig = LightRig::garden();
    let sky = binding(&panel, "Hemisphere", "skyColor");
    let picked = GuiValue::Hex(Color::from_srgb8([0x20, 0x40, 0x60]).to_hex_string());
    sky.write(&mut rig, picked).unwrap();
    assert_eq!(sky.read(&rig), GuiValue::Hex("#204060".into()));
    assert_eq!(sky.srgb(&rig), Some([0x20, 0x40, 0x60]));
}

#[test]
fn should_list_folders_in_panel_order() {
    let panel = DebugPanel::for_lights();
    assert_eq!(panel.folders(), ["Hemisphere", "Directional", "SpotLight"]);
}

fn run_frames(panel: &DebugPanel, rig: &mut LightRig, frames: usize) -> egui::FullOutput {
    let ctx = egui::Context::default();
    let mut output = None;
    for _ in 0..frames {
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1280.0, 720.0))),
            ..Default::default()
        };
        output = Some(ctx.run(input, |ctx| {
            panel.ui(ctx, rig);
        }));
    }
    output.expect("at least one frame")
}

#[test]
fn should_draw_the_panel_without_editing_the_rig() {
    let panel = DebugPanel::for_lights();
    let mut rig = LightRig::garden();
    let output = run_frames(&panel, &mut rig, 3);
    assert!(!output.shapes.is_empty());
    assert_eq!(rig, LightRig::garden());
}

#[test]
fn should_draw_nothing_while_hidden() {
    let mut panel = DebugPanel::for_lights();
    panel.toggle();
    assert!(!panel.is_visible());
    let mut rig = LightRig::garden();
    let output = run_frames(&panel, &mut rig, 2);
    assert!(output.shapes.is_empty());

    panel.toggle();
    assert!(panel.is_visible());
}
