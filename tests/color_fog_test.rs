use pagoda_garden::{
    config::{Config, ShadowMapKind},
    data_structures::{color::Color, environment::Fog},
};

#[test]
fn should_round_trip_hex_strings() {
    let sky = Color::from_hex(0xB1E1FF);
    assert_eq!(sky.to_hex(), 0xB1E1FF);
    assert_eq!(sky.to_hex_string(), "#b1e1ff");
    assert_eq!(Color::from_hex_str("#B97A20").unwrap(), Color::from_hex(0xB97A20));
    assert_eq!(Color::from_hex_str("0xcdfab6").unwrap(), Color::from_hex(0xcdfab6));
}

#[test]
fn should_reject_malformed_hex_strings() {
    assert!(Color::from_hex_str("#fff").is_err());
    assert!(Color::from_hex_str("#gggggg").is_err());
}

#[test]
fn should_convert_between_hex_and_picker_bytes() {
    assert_eq!(Color::from_hex(0xb97a20).to_srgb8(), [0xb9, 0x7a, 0x20]);
    assert_eq!(Color::from_srgb8([0x12, 0x34, 0x56]).to_hex_string(), "#123456");
    assert_eq!(Color::rgb(1.5, -0.2, 0.5).to_srgb8(), [0xff, 0x00, 0x80]);
}

#[test]
fn should_convert_to_linear_space() {
    let [r, g, b] = Color::from_hex(0x808080).to_linear();
    assert!((r - 0.2158).abs() < 1e-3);
    assert_eq!(r, g);
    assert_eq!(g, b);
    for c in Color::WHITE.to_linear() {
        assert!((c - 1.0).abs() < 1e-6);
    }
}

#[test]
fn should_fade_fog_between_near_and_far() {
    let fog = Fog::new(Color::from_hex(0xcdfab6), 50.0, 100.0);
    assert_eq!(fog.factor(10.0), 0.0);
    assert_eq!(fog.factor(50.0), 0.0);
    assert!((fog.factor(75.0) - 0.5).abs() < 1e-6);
    assert_eq!(fog.factor(100.0), 1.0);
    assert_eq!(fog.factor(250.0), 1.0);
    assert!(fog.factor(60.0) < fog.factor(70.0));
}

#[test]
fn should_default_to_the_garden_configuration() {
    let config = Config::default();
    assert_eq!(config.title, "Pagoda Garden");
    assert_eq!(config.canvas_id, "c");
    assert!(config.shadows.enabled);
    assert_eq!(config.shadows.kind, ShadowMapKind::PcfSoft);
    assert_eq!(config.camera.fov_degrees, 75.0);
    assert_eq!(config.camera.position, [0.0, 10.0, 20.0]);
    assert_eq!(config.camera.target, [0.0, 5.0, 0.0]);
    assert_eq!(config.fog.color.to_hex(), 0xcdfab6);
    assert_eq!((config.fog.near, config.fog.far), (50.0, 100.0));
    assert!(ShadowMapKind::PcfSoft.pcf_radius() > ShadowMapKind::Pcf.pcf_radius());
    assert_eq!(ShadowMapKind::Basic.pcf_radius(), 0.0);
}
