use std::str::FromStr;

use super::error::ToolbarError;
use crate::draw::DrawShape;
use crate::state::GlobalMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonName {
    DrawMarker,
    DrawPolyline,
    DrawRectangle,
    DrawPolygon,
    DrawCircle,
    EditMode,
    DragMode,
    CutPolygon,
    UnionMode,
    RemovalMode,
}

/// What a button runs when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonCommand {
    ToggleGlobal(GlobalMode),
    ToggleDraw(DrawShape),
}

/// Entries of the action menu shown next to a toggled button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Finish,
    RemoveLastVertex,
    Cancel,
    DragLayer,
    DragLayerGroup,
}

impl ButtonName {
    pub const ALL: [ButtonName; 10] = [
        Self::DrawMarker,
        Self::DrawPolyline,
        Self::DrawRectangle,
        Self::DrawPolygon,
        Self::DrawCircle,
        Self::EditMode,
        Self::DragMode,
        Self::CutPolygon,
        Self::UnionMode,
        Self::RemovalMode,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DrawMarker => "drawMarker",
            Self::DrawPolyline => "drawPolyline",
            Self::DrawRectangle => "drawRectangle",
            Self::DrawPolygon => "drawPolygon",
            Self::DrawCircle => "drawCircle",
            Self::EditMode => "editMode",
            Self::DragMode => "dragMode",
            Self::CutPolygon => "cutPolygon",
            Self::UnionMode => "unionMode",
            Self::RemovalMode => "removalMode",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::DrawMarker => "Draw Marker",
            Self::DrawPolyline => "Draw Polyline",
            Self::DrawRectangle => "Draw Rectangle",
            Self::DrawPolygon => "Draw Polygon",
            Self::DrawCircle => "Draw Circle",
            Self::EditMode => "Edit Layers",
            Self::DragMode => "Drag Layers",
            Self::CutPolygon => "Cut Layers",
            Self::UnionMode => "Union Mode",
            Self::RemovalMode => "Removal Mode",
        }
    }

    pub const fn command(self) -> ButtonCommand {
        match self {
            Self::DrawMarker => ButtonCommand::ToggleDraw(DrawShape::Marker),
            Self::DrawPolyline => ButtonCommand::ToggleDraw(DrawShape::Polyline),
            Self::DrawRectangle => ButtonCommand::ToggleDraw(DrawShape::Rectangle),
            Self::DrawPolygon => ButtonCommand::ToggleDraw(DrawShape::Polygon),
            Self::DrawCircle => ButtonCommand::ToggleDraw(DrawShape::Circle),
            Self::EditMode => ButtonCommand::ToggleGlobal(GlobalMode::Edit),
            Self::DragMode => ButtonCommand::ToggleGlobal(GlobalMode::Drag),
            Self::CutPolygon => ButtonCommand::ToggleDraw(DrawShape::Cut),
            Self::UnionMode => ButtonCommand::ToggleGlobal(GlobalMode::Union),
            Self::RemovalMode => ButtonCommand::ToggleGlobal(GlobalMode::Removal),
        }
    }

    pub const fn for_mode(mode: GlobalMode) -> Self {
        match mode {
            GlobalMode::Edit => Self::EditMode,
            GlobalMode::Drag => Self::DragMode,
            GlobalMode::Removal => Self::RemovalMode,
            GlobalMode::Union => Self::UnionMode,
        }
    }

    pub const fn for_shape(shape: DrawShape) -> Self {
        match shape {
            DrawShape::Marker => Self::DrawMarker,
            DrawShape::Polyline => Self::DrawPolyline,
            DrawShape::Rectangle => Self::DrawRectangle,
            DrawShape::Polygon => Self::DrawPolygon,
            DrawShape::Circle => Self::DrawCircle,
            DrawShape::Cut => Self::CutPolygon,
        }
    }

    fn actions(self, layer_group_drag_menu: bool) -> Vec<ButtonAction> {
        use ButtonAction::*;
        match self {
            Self::DrawPolyline | Self::DrawPolygon | Self::CutPolygon => {
                vec![Finish, RemoveLastVertex, Cancel]
            }
            Self::DragMode if layer_group_drag_menu => vec![DragLayer, DragLayerGroup, Cancel],
            _ => vec![Cancel],
        }
    }
}

impl FromStr for ButtonName {
    type Err = ToolbarError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "editPolygon" => return Ok(Self::EditMode),
            "deleteLayer" => return Ok(Self::RemovalMode),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == value)
            .ok_or_else(|| ToolbarError::UnknownButton(value.to_string()))
    }
}

impl std::fmt::Display for ButtonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pub name: ButtonName,
    pub toggled: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarButton {
    name: ButtonName,
    title: &'static str,
    toggled: bool,
    visible: bool,
    disable_other_buttons: bool,
    actions: Vec<ButtonAction>,
}

impl ToolbarButton {
    pub(super) fn new(name: ButtonName, layer_group_drag_menu: bool) -> Self {
        Self {
            name,
            title: name.title(),
            toggled: false,
            visible: false,
            disable_other_buttons: true,
            actions: name.actions(layer_group_drag_menu),
        }
    }

    pub fn name(&self) -> ButtonName {
        self.name
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn toggled(&self) -> bool {
        self.toggled
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn disables_other_buttons(&self) -> bool {
        self.disable_other_buttons
    }

    pub fn actions(&self) -> &[ButtonAction] {
        &self.actions
    }

    pub fn command(&self) -> ButtonCommand {
        self.name.command()
    }

    pub fn state(&self) -> ButtonState {
        ButtonState {
            name: self.name,
            toggled: self.toggled,
            visible: self.visible,
        }
    }

    pub(super) fn set_toggled(&mut self, toggled: bool) {
        self.toggled = toggled;
    }

    pub(super) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_button_names_resolve_to_current_ones() {
        assert_eq!("editPolygon".parse::<ButtonName>(), Ok(ButtonName::EditMode));
        assert_eq!("deleteLayer".parse::<ButtonName>(), Ok(ButtonName::RemovalMode));
        assert_eq!("cutPolygon".parse::<ButtonName>(), Ok(ButtonName::CutPolygon));
        assert_eq!(
            "lasso".parse::<ButtonName>(),
            Err(ToolbarError::UnknownButton("lasso".to_string()))
        );
    }

    #[test]
    fn mode_and_shape_buttons_carry_matching_commands() {
        for mode in GlobalMode::ALL {
            assert_eq!(
                ButtonName::for_mode(mode).command(),
                ButtonCommand::ToggleGlobal(mode)
            );
        }
        assert_eq!(
            ButtonName::for_shape(DrawShape::Cut).command(),
            ButtonCommand::ToggleDraw(DrawShape::Cut)
        );
    }

    #[test]
    fn drag_button_shows_granularity_actions_only_with_group_menu() {
        let with_menu = ToolbarButton::new(ButtonName::DragMode, true);
        let without_menu = ToolbarButton::new(ButtonName::DragMode, false);
        assert_eq!(
            with_menu.actions(),
            &[
                ButtonAction::DragLayer,
                ButtonAction::DragLayerGroup,
                ButtonAction::Cancel
            ]
        );
        assert_eq!(without_menu.actions(), &[ButtonAction::Cancel]);
    }
}
