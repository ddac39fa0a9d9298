//! Debug panel for the lighting rig, drawn with egui.
//!
//! The panel is a flat list of [`GuiBinding`]s grouped into folders. Each
//! binding knows which light parameter it edits and how: colors as `#rrggbb`
//! strings behind a color picker, numbers as sliders clamped to a range,
//! angles shown in degrees but stored in radians. F1 hides and shows it.

use anyhow::{Result, bail};
use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{Key, NamedKey},
};

use crate::data_structures::color::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn get(&self, v: &cgmath::Vector3<f32>) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    pub fn set(&self, v: &mut cgmath::Vector3<f32>, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }
}

/// Every light parameter the panel can edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightParam {
    HemisphereSkyColor,
    HemisphereGroundColor,
    HemisphereIntensity,
    DirectionalColor,
    DirectionalIntensity,
    DirectionalPosition(Axis),
    DirectionalTarget(Axis),
    SpotColor,
    SpotIntensity,
    SpotAngle,
    SpotPenumbra,
    SpotPosition(Axis),
    SpotTarget(Axis),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Color(Color),
    Number(f32),
}

/// Something whose parameters can be read and written by [`LightParam`].
pub trait Tweakable {
    fn get(&self, param: LightParam) -> ParamValue;

    fn set(&mut self, param: LightParam, value: ParamValue);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Control {
    Color,
    Number { min: f32, max: f32, step: Option<f32> },
    /// Shown in degrees, stored in radians.
    Degrees { min: f32, max: f32 },
}

/// A value as the panel presents it.
#[derive(Clone, Debug, PartialEq)]
pub enum GuiValue {
    Hex(String),
    Number(f32),
}

impl std::fmt::Display for GuiValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuiValue::Hex(hex) => f.write_str(hex),
            GuiValue::Number(n) => write!(f, "{n:.2}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GuiBinding {
    pub folder: &'static str,
    pub name: &'static str,
    pub param: LightParam,
    pub control: Control,
}

impl GuiBinding {
    pub fn read(&self, target: &impl Tweakable) -> GuiValue {
        match (self.control, target.get(self.param)) {
            (_, ParamValue::Color(color)) => GuiValue::Hex(color.to_hex_string()),
            (Control::Degrees { .. }, ParamValue::Number(radians)) => GuiValue::Number(radians.to_degrees()),
            (_, ParamValue::Number(n)) => GuiValue::Number(n),
        }
    }

    /// Writes a value in panel units, clamping numbers to the control's range.
    pub fn write(&self, target: &mut impl Tweakable, value: GuiValue) -> Result<()> {
        let param_value = match (self.control, value) {
            (Control::Color, GuiValue::Hex(hex)) => ParamValue::Color(Color::from_hex_str(&hex)?),
            (Control::Number { min, max, .. }, GuiValue::Number(n)) => ParamValue::Number(n.clamp(min, max)),
            (Control::Degrees { min, max }, GuiValue::Number(n)) => {
                ParamValue::Number(n.clamp(min, max).to_radians())
            }
            (control, value) => bail!("{} expects a {control:?} value, got {value:?}", self.name),
        };
        target.set(self.param, param_value);
        Ok(())
    }

    /// The current color as picker bytes, `None` for numeric bindings.
    pub fn srgb(&self, target: &impl Tweakable) -> Option<[u8; 3]> {
        match target.get(self.param) {
            ParamValue::Color(color) => Some(color.to_srgb8()),
            ParamValue::Number(_) => None,
        }
    }

    /// The slider of a numeric binding: range and step in panel units.
    pub fn slider_range(&self) -> Option<(f32, f32, Option<f32>)> {
        match self.control {
            Control::Color => None,
            Control::Number { min, max, step } => Some((min, max, step)),
            Control::Degrees { min, max } => Some((min, max, Some(1.0))),
        }
    }

    /// Draws the widget for this binding and writes edits back. Returns whether `target` changed.
    pub fn edit(&self, ui: &mut egui::Ui, target: &mut impl Tweakable) -> bool {
        let edited = match (self.read(&*target), self.slider_range()) {
            (GuiValue::Number(mut value), Some((min, max, step))) => {
                let mut slider = egui::Slider::new(&mut value, min..=max).text(self.name);
                if let Some(step) = step {
                    slider = slider.step_by(step as f64);
                }
                if matches!(self.control, Control::Degrees { .. }) {
                    slider = slider.suffix("°");
                }
                ui.add(slider).changed().then_some(GuiValue::Number(value))
            }
            _ => {
                let Some(mut rgb) = self.srgb(&*target) else {
                    return false;
                };
                ui.horizontal(|ui| {
                    let changed = ui.color_edit_button_srgb(&mut rgb).changed();
                    ui.label(self.name);
                    changed
                })
                .inner
                .then(|| GuiValue::Hex(Color::from_srgb8(rgb).to_hex_string()))
            }
        };
        let Some(value) = edited else {
            return false;
        };
        match self.write(target, value) {
            Ok(()) => {
                log::debug!("{}/{} -> {}", self.folder, self.name, self.read(&*target));
                true
            }
            Err(e) => {
                log::warn!("{e:#}");
                false
            }
        }
    }
}

fn color(folder: &'static str, name: &'static str, param: LightParam) -> GuiBinding {
    GuiBinding {
        folder,
        name,
        param,
        control: Control::Color,
    }
}

fn number(folder: &'static str, name: &'static str, param: LightParam, min: f32, max: f32, step: Option<f32>) -> GuiBinding {
    GuiBinding {
        folder,
        name,
        param,
        control: Control::Number { min, max, step },
    }
}

fn position(folder: &'static str, param: fn(Axis) -> LightParam) -> [GuiBinding; 6] {
    [
        number(folder, "x", param(Axis::X), -100.0, 100.0, None),
        number(folder, "y", param(Axis::Y), -100.0, 100.0, None),
        number(folder, "z", param(Axis::Z), -100.0, 100.0, None),
        number(folder, "target x", target_of(param(Axis::X)), -100.0, 100.0, None),
        number(folder, "target y", target_of(param(Axis::Y)), -100.0, 100.0, None),
        number(folder, "target z", target_of(param(Axis::Z)), -100.0, 100.0, None),
    ]
}

fn target_of(param: LightParam) -> LightParam {
    match param {
        LightParam::DirectionalPosition(axis) => LightParam::DirectionalTarget(axis),
        LightParam::SpotPosition(axis) => LightParam::SpotTarget(axis),
        other => other,
    }
}

/// Whether `event` is the key press that hides or shows the panel.
pub fn is_toggle_key(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::KeyboardInput {
            event: KeyEvent {
                logical_key: Key::Named(NamedKey::F1),
                state: ElementState::Pressed,
                repeat: false,
                ..
            },
            ..
        }
    )
}

#[derive(Clone, Debug)]
pub struct DebugPanel {
    bindings: Vec<GuiBinding>,
    visible: bool,
}

impl DebugPanel {
    /// Hemisphere, Directional and SpotLight folders, in that order.
    pub fn for_lights() -> Self {
        use LightParam::*;
        let mut bindings = vec![
            color("Hemisphere", "skyColor", HemisphereSkyColor),
            color("Hemisphere", "groundColor", HemisphereGroundColor),
            number("Hemisphere", "intensity", HemisphereIntensity, 0.0, 2.0, Some(0.01)),
            color("Directional", "color", DirectionalColor),
            number("Directional", "intensity", DirectionalIntensity, 0.0, 2.0, Some(0.01)),
        ];
        bindings.extend(position("Directional", DirectionalPosition));
        bindings.extend([
            color("SpotLight", "color", SpotColor),
            number("SpotLight", "intensity", SpotIntensity, 0.0, 2.0, Some(0.01)),
            GuiBinding {
                folder: "SpotLight",
                name: "angle",
                param: SpotAngle,
                control: Control::Degrees { min: 0.0, max: 90.0 },
            },
            number("SpotLight", "penumbra", SpotPenumbra, 0.0, 1.0, Some(0.01)),
        ]);
        bindings.extend(position("SpotLight", SpotPosition));
        Self {
            bindings,
            visible: true,
        }
    }

    pub fn bindings(&self) -> &[GuiBinding] {
        &self.bindings
    }

    pub fn folder(&self, name: &str) -> Vec<&GuiBinding> {
        self.bindings.iter().filter(|b| b.folder == name).collect()
    }

    /// Folder names in the order their first binding appears.
    pub fn folders(&self) -> Vec<&'static str> {
        let mut folders: Vec<&'static str> = Vec::new();
        for binding in &self.bindings {
            if !folders.contains(&binding.folder) {
                folders.push(binding.folder);
            }
        }
        folders
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("debug panel {}", if self.visible { "shown" } else { "hidden" });
    }

    /// Draws the panel as one window with a collapsible section per folder.
    /// Returns whether any binding changed `target`.
    pub fn ui(&self, ctx: &egui::Context, target: &mut impl Tweakable) -> bool {
        if !self.visible {
            return false;
        }
        let mut changed = false;
        egui::Window::new("Lights")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                for folder in self.folders() {
                    egui::CollapsingHeader::new(folder)
                        .default_open(true)
                        .show(ui, |ui| {
                            for binding in self.bindings.iter().filter(|b| b.folder == folder) {
                                changed |= binding.edit(ui, target);
                            }
                        });
                }
            });
        changed
    }
}
