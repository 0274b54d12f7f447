//! Keyboard-driven tweak panel for live-tuning lesson parameters.
//!
//! Lessons register controls once, then read their values every frame and apply them to the
//! scene. `Tab`/`Shift+Tab` move the focus, `Left`/`Right` step a slider (ten steps with
//! `Shift`), `Space`/`Return` flip a toggle or press a button, and `H` hides the panel.

use std::marker::PhantomData;

use glam::Vec3;
use sdl2::keyboard::Keycode;

use crate::other::KeyboardState;

/// Handle to a control of kind `K`, so reading a toggle as a slider does not type check.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ControlId<K> {
    index: usize,
    kind: PhantomData<K>,
}

impl<K> Clone for ControlId<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for ControlId<K> {}

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Slider;
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Toggle;
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Hue;
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Button;
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Choice;

#[derive(Clone, Debug, PartialEq)]
enum ControlKind {
    Slider { value: f32, min: f32, max: f32, step: f32 },
    Toggle(bool),
    /// Hue in degrees, edited like a slider over `[0, 360)`.
    Hue(f32),
    /// Counts presses not yet consumed.
    Button(u32),
    /// Index into a list of option names.
    Choice { index: usize, options: Vec<&'static str> },
}

#[derive(Clone, Debug, PartialEq)]
struct Control {
    label: String,
    kind: ControlKind,
}

impl Control {
    fn describe(&self) -> String {
        match &self.kind {
            ControlKind::Slider { value, step, .. } => {
                let decimals = (-step.log10()).round().clamp(0.0, 4.0) as usize;
                format!("{} = {value:.decimals$}", self.label)
            }
            ControlKind::Toggle(on) => format!("{} = {}", self.label, if *on { "on" } else { "off" }),
            ControlKind::Hue(hue) => format!("{} = {hue:.0}°", self.label),
            ControlKind::Button(_) => format!("[{}]", self.label),
            ControlKind::Choice { index, options } => {
                format!("{} = {}", self.label, options.get(*index).unwrap_or(&"-"))
            }
        }
    }
}

/// Snaps `value` to the `step` grid anchored at `min` and clamps it into range.
pub fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let snapped = if step > 0.0 {
        min + ((value - min) / step).round() * step
    } else {
        value
    };
    snapped.clamp(min, max)
}

/// Converts a hue in degrees at full saturation and half lightness to RGB.
pub fn hue_to_rgb(hue: f32) -> Vec3 {
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    match h as u32 {
        0 => Vec3::new(1.0, x, 0.0),
        1 => Vec3::new(x, 1.0, 0.0),
        2 => Vec3::new(0.0, 1.0, x),
        3 => Vec3::new(0.0, x, 1.0),
        4 => Vec3::new(x, 0.0, 1.0),
        _ => Vec3::new(1.0, 0.0, x),
    }
}

/// A list of named controls with a single focused entry.
#[derive(Clone, Debug, Default)]
pub struct Panel {
    controls: Vec<Control>,
    focus: usize,
    pub hidden: bool,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    fn push<K>(&mut self, label: &str, kind: ControlKind) -> ControlId<K> {
        self.controls.push(Control {
            label: label.to_string(),
            kind,
        });
        ControlId {
            index: self.controls.len() - 1,
            kind: PhantomData,
        }
    }

    fn kind<K>(&self, id: ControlId<K>) -> Option<&ControlKind> {
        self.controls.get(id.index).map(|control| &control.kind)
    }

    pub fn slider(
        &mut self,
        label: &str,
        value: f32,
        min: f32,
        max: f32,
        step: f32,
    ) -> ControlId<Slider> {
        let value = snap(value, min, max, step);
        self.push(label, ControlKind::Slider { value, min, max, step })
    }

    pub fn toggle(&mut self, label: &str, value: bool) -> ControlId<Toggle> {
        self.push(label, ControlKind::Toggle(value))
    }

    pub fn hue(&mut self, label: &str, degrees: f32) -> ControlId<Hue> {
        self.push(label, ControlKind::Hue(degrees.rem_euclid(360.0)))
    }

    pub fn button(&mut self, label: &str) -> ControlId<Button> {
        self.push(label, ControlKind::Button(0))
    }

    /// Adds a choice between named options. An empty list always selects index 0.
    pub fn choice(
        &mut self,
        label: &str,
        options: &[&'static str],
        index: usize,
    ) -> ControlId<Choice> {
        let index = index.min(options.len().saturating_sub(1));
        self.push(
            label,
            ControlKind::Choice {
                index,
                options: options.to_vec(),
            },
        )
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Current value of a slider, or 0 for an id from another panel.
    pub fn value(&self, id: ControlId<Slider>) -> f32 {
        match self.kind(id) {
            Some(ControlKind::Slider { value, .. }) => *value,
            _ => 0.0,
        }
    }

    pub fn enabled(&self, id: ControlId<Toggle>) -> bool {
        matches!(self.kind(id), Some(ControlKind::Toggle(true)))
    }

    /// Colour picked by a hue control.
    pub fn color(&self, id: ControlId<Hue>) -> Vec3 {
        match self.kind(id) {
            Some(ControlKind::Hue(hue)) => hue_to_rgb(*hue),
            _ => hue_to_rgb(0.0),
        }
    }

    /// Selected option of a choice control.
    pub fn selected(&self, id: ControlId<Choice>) -> usize {
        match self.kind(id) {
            Some(ControlKind::Choice { index, .. }) => *index,
            _ => 0,
        }
    }

    /// Returns whether a button was pressed since the last call, consuming one press.
    pub fn take_press(&mut self, id: ControlId<Button>) -> bool {
        match self.controls.get_mut(id.index).map(|control| &mut control.kind) {
            Some(ControlKind::Button(presses)) if *presses > 0 => {
                *presses -= 1;
                true
            }
            _ => false,
        }
    }

    /// Overwrites a slider value as if the user had dragged it there.
    #[cfg(test)]
    pub fn set_value(&mut self, id: ControlId<Slider>, new_value: f32) {
        if let Some(ControlKind::Slider {
            value,
            min,
            max,
            step,
        }) = self.controls.get_mut(id.index).map(|control| &mut control.kind)
        {
            *value = snap(new_value, *min, *max, *step);
        }
    }

    pub fn focus_next(&mut self) {
        if !self.controls.is_empty() {
            self.focus = (self.focus + 1) % self.controls.len();
        }
    }

    pub fn focus_previous(&mut self) {
        if !self.controls.is_empty() {
            self.focus = (self.focus + self.controls.len() - 1) % self.controls.len();
        }
    }

    /// Moves the focused control by `steps` increments.
    pub fn step_focused(&mut self, steps: i32) {
        let Some(control) = self.controls.get_mut(self.focus) else {
            return;
        };
        match &mut control.kind {
            ControlKind::Slider {
                value,
                min,
                max,
                step,
            } => *value = snap(*value + *step * steps as f32, *min, *max, *step),
            ControlKind::Hue(hue) => *hue = (*hue + 5.0 * steps as f32).rem_euclid(360.0),
            ControlKind::Choice { index, options } if !options.is_empty() => {
                let len = options.len() as i32;
                *index = (*index as i32 + steps).rem_euclid(len) as usize;
            }
            ControlKind::Choice { .. } => {}
            ControlKind::Toggle(on) => *on = !*on,
            ControlKind::Button(_) => {}
        }
    }

    /// Flips a toggle or presses a button under the focus.
    pub fn activate_focused(&mut self) {
        let Some(control) = self.controls.get_mut(self.focus) else {
            return;
        };
        match &mut control.kind {
            ControlKind::Toggle(on) => *on = !*on,
            ControlKind::Button(presses) => *presses += 1,
            ControlKind::Choice { index, options } if !options.is_empty() => {
                *index = (*index + 1) % options.len()
            }
            _ => {}
        }
    }

    /// Applies this frame's key presses. Returns whether anything changed.
    pub fn handle_keys(&mut self, keyboard: &KeyboardState) -> bool {
        if keyboard.pressed.contains(&Keycode::H) {
            self.hidden = !self.hidden;
            return true;
        }
        if self.hidden || self.is_empty() {
            return false;
        }
        let before = self.controls.clone();
        let focus_before = self.focus;
        let multiplier = if keyboard.shift() { 10 } else { 1 };
        for key in &keyboard.pressed {
            match *key {
                Keycode::Tab if keyboard.shift() => self.focus_previous(),
                Keycode::Tab => self.focus_next(),
                Keycode::Left => self.step_focused(-multiplier),
                Keycode::Right => self.step_focused(multiplier),
                Keycode::Space | Keycode::Return => self.activate_focused(),
                _ => {}
            }
        }
        let changed = before != self.controls;
        if changed && let Some(line) = self.focused_line() {
            log::info!("{line}");
        }
        changed || focus_before != self.focus
    }

    /// Human readable description of the focused control.
    pub fn focused_line(&self) -> Option<String> {
        if self.hidden {
            return None;
        }
        self.controls.get(self.focus).map(Control::describe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_clamps_and_rounds() {
        assert_eq!(snap(5.0, 0.0, 1.0, 0.001), 1.0);
        assert_eq!(snap(-1.0, 0.0, 1.0, 0.001), 0.0);
        assert!((snap(0.12345, 0.0, 1.0, 0.01) - 0.12).abs() < 1e-6);
        assert_eq!(snap(0.3, 0.0, 1.0, 0.0), 0.3);
    }

    #[test]
    fn test_slider_steps_within_range() {
        let mut panel = Panel::new();
        let elevation = panel.slider("elevation", 0.0, -3.0, 3.0, 0.01);
        panel.step_focused(5);
        assert!((panel.value(elevation) - 0.05).abs() < 1e-5);
        panel.step_focused(10_000);
        assert_eq!(panel.value(elevation), 3.0);
        panel.step_focused(-100_000);
        assert_eq!(panel.value(elevation), -3.0);
    }

    #[test]
    fn test_focus_wraps() {
        let mut panel = Panel::new();
        let a = panel.toggle("a", false);
        let b = panel.toggle("b", false);
        panel.focus_previous();
        panel.activate_focused();
        assert!(panel.enabled(b));
        panel.focus_next();
        panel.activate_focused();
        assert!(panel.enabled(a));
    }

    #[test]
    fn test_button_presses_are_consumed() {
        let mut panel = Panel::new();
        let spin = panel.button("spin");
        assert!(!panel.take_press(spin));
        panel.activate_focused();
        panel.activate_focused();
        assert!(panel.take_press(spin));
        assert!(panel.take_press(spin));
        assert!(!panel.take_press(spin));
    }

    #[test]
    fn test_choice_cycles() {
        let mut panel = Panel::new();
        let kind = panel.choice("shadow type", &["basic", "pcf", "pcf soft"], 1);
        panel.step_focused(1);
        assert_eq!(panel.selected(kind), 2);
        panel.step_focused(1);
        assert_eq!(panel.selected(kind), 0);
        panel.step_focused(-1);
        assert_eq!(panel.selected(kind), 2);
    }

    #[test]
    fn test_hue_primaries() {
        assert_eq!(hue_to_rgb(0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hue_to_rgb(120.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(hue_to_rgb(240.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(hue_to_rgb(360.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hue_to_rgb(60.0), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_keys_drive_panel() {
        let mut panel = Panel::new();
        let visible = panel.toggle("visible", true);
        let x = panel.slider("x", 0.0, -3.0, 3.0, 0.01);

        let mut keyboard = KeyboardState::default();
        keyboard.pressed.insert(Keycode::Space);
        assert!(panel.handle_keys(&keyboard));
        assert!(!panel.enabled(visible));

        keyboard.pressed.clear();
        keyboard.pressed.insert(Keycode::Tab);
        panel.handle_keys(&keyboard);
        keyboard.pressed.clear();
        keyboard.pressed.insert(Keycode::Right);
        keyboard.down.insert(Keycode::LShift);
        panel.handle_keys(&keyboard);
        assert!((panel.value(x) - 0.1).abs() < 1e-5);

        keyboard.pressed.clear();
        keyboard.pressed.insert(Keycode::H);
        panel.handle_keys(&keyboard);
        assert!(panel.focused_line().is_none());
    }

    #[test]
    fn test_empty_choice_is_inert() {
        let mut panel = Panel::new();
        let empty = panel.choice("nothing", &[], 3);
        panel.step_focused(1);
        panel.activate_focused();
        assert_eq!(panel.selected(empty), 0);
        assert_eq!(panel.focused_line().as_deref(), Some("nothing = -"));
    }

    #[test]
    fn test_ids_from_another_panel_read_defaults() {
        let mut other = Panel::new();
        other.toggle("a", true);
        let foreign_slider = other.slider("b", 2.0, 0.0, 3.0, 0.1);
        let foreign_toggle = other.toggle("c", true);

        let mut panel = Panel::new();
        panel.slider("only", 1.0, 0.0, 3.0, 0.1);
        assert_eq!(panel.value(foreign_slider), 0.0);
        assert!(!panel.enabled(foreign_toggle));
        assert!(!panel.take_press(ControlId {
            index: 7,
            kind: PhantomData,
        }));
    }

    #[test]
    fn test_describe_uses_step_precision() {
        let mut panel = Panel::new();
        panel.slider("intensity", 0.5, 0.0, 1.0, 0.001);
        assert_eq!(panel.focused_line().as_deref(), Some("intensity = 0.500"));
    }
}
