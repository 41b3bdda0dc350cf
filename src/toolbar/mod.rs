//! Toolbar buttons mirroring the mode state of one map.

mod button;
pub mod error;

use serde::Deserialize;

pub use button::{ButtonAction, ButtonCommand, ButtonName, ButtonState, ToolbarButton};
pub use error::{ToolbarError, ToolbarResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolbarPosition {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Which buttons `add_controls` shows. Legacy keys `edit_polygon` and
/// `delete_layer` are accepted for `edit_mode` and `removal_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolbarOptions {
    pub draw_marker: bool,
    pub draw_rectangle: bool,
    pub draw_polyline: bool,
    pub draw_polygon: bool,
    pub draw_circle: bool,
    #[serde(alias = "edit_polygon")]
    pub edit_mode: bool,
    pub drag_mode: bool,
    pub cut_polygon: bool,
    pub union_mode: bool,
    #[serde(alias = "delete_layer")]
    pub removal_mode: bool,
    pub position: ToolbarPosition,
}

impl Default for ToolbarOptions {
    fn default() -> Self {
        Self {
            draw_marker: true,
            draw_rectangle: true,
            draw_polyline: true,
            draw_polygon: true,
            draw_circle: true,
            edit_mode: true,
            drag_mode: true,
            cut_polygon: true,
            union_mode: true,
            removal_mode: true,
            position: ToolbarPosition::default(),
        }
    }
}

impl ToolbarOptions {
    pub const fn shows(&self, name: ButtonName) -> bool {
        match name {
            ButtonName::DrawMarker => self.draw_marker,
            ButtonName::DrawPolyline => self.draw_polyline,
            ButtonName::DrawRectangle => self.draw_rectangle,
            ButtonName::DrawPolygon => self.draw_polygon,
            ButtonName::DrawCircle => self.draw_circle,
            ButtonName::EditMode => self.edit_mode,
            ButtonName::DragMode => self.drag_mode,
            ButtonName::CutPolygon => self.cut_polygon,
            ButtonName::UnionMode => self.union_mode,
            ButtonName::RemovalMode => self.removal_mode,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Toolbar {
    buttons: Vec<ToolbarButton>,
    options: ToolbarOptions,
    visible: bool,
    layer_group_drag_menu: bool,
}

impl Toolbar {
    /// A toolbar without buttons; `add_controls` defines them.
    pub fn new(options: ToolbarOptions, layer_group_drag_menu: bool) -> Self {
        Self {
            buttons: Vec::new(),
            options,
            visible: false,
            layer_group_drag_menu,
        }
    }

    pub fn options(&self) -> ToolbarOptions {
        self.options
    }

    pub fn buttons(&self) -> &[ToolbarButton] {
        &self.buttons
    }

    pub fn button(&self, name: ButtonName) -> Option<&ToolbarButton> {
        self.buttons.iter().find(|button| button.name() == name)
    }

    fn button_mut(&mut self, name: ButtonName) -> Option<&mut ToolbarButton> {
        self.buttons.iter_mut().find(|button| button.name() == name)
    }

    pub fn has_capability(&self, name: ButtonName) -> bool {
        self.button(name).is_some()
    }

    pub fn is_toggled(&self, name: ButtonName) -> bool {
        self.button(name).is_some_and(ToolbarButton::toggled)
    }

    pub fn controls_visible(&self) -> bool {
        self.visible
    }

    pub fn add_controls(&mut self, options: Option<ToolbarOptions>) {
        if let Some(options) = options {
            self.options = options;
        }
        self.define_buttons();
        self.show_hide_buttons();
        self.visible = true;
        tracing::debug!(buttons = self.buttons.len(), "toolbar controls added");
    }

    pub fn remove_controls(&mut self) {
        for button in &mut self.buttons {
            button.set_visible(false);
        }
        self.visible = false;
    }

    pub fn toggle_controls(&mut self) {
        if self.visible {
            self.remove_controls();
        } else {
            self.add_controls(None);
        }
    }

    /// Rebuilds the buttons after a setting that changes their shape, keeping
    /// toggled and visible state.
    pub fn reinit(&mut self, layer_group_drag_menu: bool) {
        self.layer_group_drag_menu = layer_group_drag_menu;
        if self.buttons.is_empty() {
            return;
        }
        self.define_buttons();
        if self.visible {
            self.show_hide_buttons();
        }
    }

    /// Changes visual state only. Returns `false` when no such button exists.
    pub fn set_button_state(&mut self, name: ButtonName, toggled: bool) -> bool {
        match self.button_mut(name) {
            Some(button) => {
                button.set_toggled(toggled);
                true
            }
            None => false,
        }
    }

    /// Flips every other toggled button off and hands back the commands their
    /// clicks would run, in toolbar order.
    pub fn force_deactivate_others(&mut self, except: Option<ButtonName>) -> Vec<ButtonCommand> {
        let mut commands = Vec::new();
        for button in &mut self.buttons {
            if Some(button.name()) != except && button.toggled() {
                button.set_toggled(false);
                commands.push(button.command());
            }
        }
        commands
    }

    fn define_buttons(&mut self) {
        let previous = std::mem::take(&mut self.buttons);
        let layer_group_drag_menu = self.layer_group_drag_menu;
        self.buttons = ButtonName::ALL
            .into_iter()
            .map(|name| {
                let mut button = ToolbarButton::new(name, layer_group_drag_menu);
                if let Some(old) = previous.iter().find(|old| old.name() == name) {
                    button.set_toggled(old.toggled());
                    button.set_visible(old.visible());
                }
                button
            })
            .collect();
    }

    fn show_hide_buttons(&mut self) {
        let options = self.options;
        for button in &mut self.buttons {
            button.set_visible(options.shows(button.name()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GlobalMode;

    fn toolbar_with_controls() -> Toolbar {
        let mut toolbar = Toolbar::new(ToolbarOptions::default(), true);
        toolbar.add_controls(None);
        toolbar
    }

    #[test]
    fn toolbar_without_controls_has_no_capabilities() {
        let mut toolbar = Toolbar::new(ToolbarOptions::default(), true);
        assert!(!toolbar.has_capability(ButtonName::EditMode));
        assert!(!toolbar.set_button_state(ButtonName::EditMode, true));
        assert!(toolbar.force_deactivate_others(None).is_empty());
    }

    #[test]
    fn add_controls_shows_only_enabled_buttons() {
        let mut toolbar = Toolbar::new(ToolbarOptions::default(), true);
        toolbar.add_controls(Some(ToolbarOptions {
            cut_polygon: false,
            ..ToolbarOptions::default()
        }));

        assert!(toolbar.controls_visible());
        let cut = toolbar.button(ButtonName::CutPolygon).expect("cut defined");
        assert!(!cut.visible());
        let edit = toolbar.button(ButtonName::EditMode).expect("edit defined");
        assert!(edit.visible());
    }

    #[test]
    fn force_deactivate_others_skips_the_excepted_button() {
        let mut toolbar = toolbar_with_controls();
        toolbar.set_button_state(ButtonName::DragMode, true);
        toolbar.set_button_state(ButtonName::RemovalMode, true);

        let commands = toolbar.force_deactivate_others(Some(ButtonName::RemovalMode));

        assert_eq!(commands, vec![ButtonCommand::ToggleGlobal(GlobalMode::Drag)]);
        assert!(!toolbar.is_toggled(ButtonName::DragMode));
        assert!(toolbar.is_toggled(ButtonName::RemovalMode));
    }

    #[test]
    fn toggle_controls_hides_and_restores_buttons() {
        let mut toolbar = toolbar_with_controls();
        toolbar.toggle_controls();
        assert!(!toolbar.controls_visible());
        assert!(toolbar.buttons().iter().all(|button| !button.visible()));

        toolbar.toggle_controls();
        assert!(toolbar.controls_visible());
        assert!(toolbar.buttons().iter().all(ToolbarButton::visible));
    }

    #[test]
    fn reinit_keeps_toggled_state_and_rebuilds_drag_actions() {
        let mut toolbar = toolbar_with_controls();
        toolbar.set_button_state(ButtonName::DragMode, true);

        toolbar.reinit(false);

        let drag = toolbar.button(ButtonName::DragMode).expect("drag defined");
        assert!(drag.toggled());
        assert_eq!(drag.actions(), &[ButtonAction::Cancel]);
    }

    #[test]
    fn legacy_option_keys_deserialize() {
        let options: ToolbarOptions =
            serde_json::from_str(r#"{"edit_polygon": false, "delete_layer": false}"#)
                .expect("options should parse");
        assert!(!options.edit_mode);
        assert!(!options.removal_mode);
        assert!(options.drag_mode);
    }
}
