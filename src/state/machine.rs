use std::str::FromStr;

use serde::Deserialize;

use super::behavior::ModeBehavior;
use super::error::{StateError, StateResult};
use crate::map::{registry, LayerId, Map};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalMode {
    Edit,
    Drag,
    Removal,
    Union,
}

impl GlobalMode {
    pub const ALL: [GlobalMode; 4] = [Self::Edit, Self::Drag, Self::Removal, Self::Union];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Drag => "drag",
            Self::Removal => "removal",
            Self::Union => "union",
        }
    }
}

/// What a single drag gesture moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragGranularity {
    Layer,
    #[default]
    LayerGroup,
}

impl FromStr for DragGranularity {
    type Err = StateError;

    fn from_str(value: &str) -> StateResult<Self> {
        match value {
            "layer" | "0" => Ok(Self::Layer),
            "layer-group" | "layerGroup" | "1" => Ok(Self::LayerGroup),
            other => Err(StateError::UnknownDragGranularity(other.to_string())),
        }
    }
}

impl TryFrom<u8> for DragGranularity {
    type Error = StateError;

    fn try_from(value: u8) -> StateResult<Self> {
        match value {
            0 => Ok(Self::Layer),
            1 => Ok(Self::LayerGroup),
            other => Err(StateError::UnknownDragGranularity(other.to_string())),
        }
    }
}

/// Snapshot of the global mode flags of one map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeFlags {
    pub edit: bool,
    pub drag: bool,
    pub removal: bool,
    pub union: bool,
    pub drag_granularity: DragGranularity,
    pub layer_group_drag_menu: bool,
}

impl ModeFlags {
    pub const fn get(&self, mode: GlobalMode) -> bool {
        match mode {
            GlobalMode::Edit => self.edit,
            GlobalMode::Drag => self.drag,
            GlobalMode::Removal => self.removal,
            GlobalMode::Union => self.union,
        }
    }

    pub fn active_count(&self) -> usize {
        GlobalMode::ALL
            .iter()
            .filter(|mode| self.get(**mode))
            .count()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ModeState<O> {
    enabled: bool,
    options: O,
}

impl<O> ModeState<O> {
    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn options(&self) -> &O {
        &self.options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub mode: GlobalMode,
    pub enabled: bool,
}

#[derive(Debug)]
pub struct StateMachine {
    pub(super) edit: ModeState<crate::map::EditOptions>,
    pub(super) drag: ModeState<()>,
    pub(super) removal: ModeState<()>,
    pub(super) union: ModeState<()>,
    drag_granularity: DragGranularity,
    layer_group_drag_menu: bool,
    union_selection: Vec<LayerId>,
    transition_history: Vec<ModeTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            edit: ModeState::default(),
            drag: ModeState::default(),
            removal: ModeState::default(),
            union: ModeState::default(),
            drag_granularity: DragGranularity::default(),
            layer_group_drag_menu: true,
            union_selection: Vec::new(),
            transition_history: Vec::new(),
        }
    }

    pub fn with_drag_settings(drag_granularity: DragGranularity, layer_group_drag_menu: bool) -> Self {
        Self {
            drag_granularity,
            layer_group_drag_menu,
            ..Self::new()
        }
    }

    pub fn flags(&self) -> ModeFlags {
        ModeFlags {
            edit: self.edit.enabled,
            drag: self.drag.enabled,
            removal: self.removal.enabled,
            union: self.union.enabled,
            drag_granularity: self.drag_granularity,
            layer_group_drag_menu: self.layer_group_drag_menu,
        }
    }

    pub fn is_enabled(&self, mode: GlobalMode) -> bool {
        self.flags().get(mode)
    }

    pub fn active_modes(&self) -> Vec<GlobalMode> {
        let flags = self.flags();
        GlobalMode::ALL
            .into_iter()
            .filter(|mode| flags.get(*mode))
            .collect()
    }

    pub fn drag_granularity(&self) -> DragGranularity {
        self.drag_granularity
    }

    pub(crate) fn set_drag_granularity(&mut self, granularity: DragGranularity) {
        self.drag_granularity = granularity;
    }

    pub fn layer_group_drag_menu(&self) -> bool {
        self.layer_group_drag_menu
    }

    pub(crate) fn toggle_layer_group_drag_menu(&mut self) -> bool {
        self.layer_group_drag_menu = !self.layer_group_drag_menu;
        self.layer_group_drag_menu
    }

    pub fn union_selection(&self) -> &[LayerId] {
        &self.union_selection
    }

    /// Returns whether the layer is selected after the toggle.
    pub(crate) fn toggle_union_selection(&mut self, layer: LayerId) -> bool {
        if let Some(index) = self.union_selection.iter().position(|id| *id == layer) {
            self.union_selection.remove(index);
            false
        } else {
            self.union_selection.push(layer);
            true
        }
    }

    pub(crate) fn forget_layer(&mut self, layer: LayerId) {
        self.union_selection.retain(|id| *id != layer);
    }

    pub(crate) fn clear_union_selection(&mut self) {
        self.union_selection.clear();
    }

    /// Puts back a selection taken before a reconcile, keeping only layers
    /// that still carry the union click handler.
    pub(crate) fn restore_union_selection(&mut self, selection: Vec<LayerId>, map: &Map) {
        self.union_selection = selection
            .into_iter()
            .filter(|id| map.layer(*id).is_some_and(|layer| layer.handlers().union_click))
            .collect();
    }

    pub(crate) fn set_enabled<B: ModeBehavior>(&mut self, enabled: bool) {
        tracing::debug!(mode = B::MODE.label(), enabled, "global mode transition");
        B::state_mut(self).enabled = enabled;
        self.transition_history.push(ModeTransition {
            mode: B::MODE,
            enabled,
        });
    }

    pub(crate) fn set_options<B: ModeBehavior>(&mut self, options: B::Options) {
        B::state_mut(self).options = options;
    }

    /// Attaches `B` to every eligible layer and returns how many were touched.
    pub(crate) fn attach_eligible<B: ModeBehavior>(&self, map: &mut Map) -> usize {
        let eligible = registry::find_managed_layers(map)
            .into_iter()
            .filter(|id| {
                map.layer(*id).is_some_and(|layer| {
                    !registry::is_locked(layer) && B::is_eligible(layer, map, self)
                })
            })
            .collect::<Vec<_>>();

        let options = B::state(self).options();
        for id in &eligible {
            if let Some(layer) = map.layer_mut(*id) {
                B::attach(layer, options);
            }
        }
        tracing::debug!(mode = B::MODE.label(), layers = eligible.len(), "attached");
        eligible.len()
    }

    /// Detaches `B` from every layer on the map, eligible or not.
    pub(crate) fn detach_everywhere<B: ModeBehavior>(map: &mut Map) {
        for id in map.layer_ids() {
            if let Some(layer) = map.layer_mut(id) {
                B::detach(layer);
            }
        }
    }
}

#[cfg(test)]
impl StateMachine {
    pub(crate) fn history(&self) -> &[ModeTransition] {
        &self.transition_history
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active = self
            .active_modes()
            .into_iter()
            .map(GlobalMode::label)
            .collect::<Vec<_>>();
        write!(f, "GlobalModes[{}]", active.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Layer, LayerKind};
    use crate::state::behavior::{EditBehavior, RemovalBehavior};

    #[test]
    fn set_enabled_records_ordered_history() {
        let mut machine = StateMachine::new();
        machine.set_enabled::<EditBehavior>(true);
        machine.set_enabled::<EditBehavior>(false);
        machine.set_enabled::<RemovalBehavior>(true);

        assert_eq!(
            machine.history(),
            &[
                ModeTransition {
                    mode: GlobalMode::Edit,
                    enabled: true
                },
                ModeTransition {
                    mode: GlobalMode::Edit,
                    enabled: false
                },
                ModeTransition {
                    mode: GlobalMode::Removal,
                    enabled: true
                },
            ]
        );
        assert_eq!(machine.active_modes(), vec![GlobalMode::Removal]);
        assert_eq!(machine.to_string(), "GlobalModes[removal]");
    }

    #[test]
    fn attach_eligible_skips_locked_layers() {
        let mut map = Map::new();
        let open = map.insert(Layer::managed(LayerKind::Polygon));
        let locked = map.insert(Layer::managed(LayerKind::Polygon).locked());
        let machine = StateMachine::new();

        assert_eq!(machine.attach_eligible::<RemovalBehavior>(&mut map), 1);
        let handlers = |id| map.layer(id).expect("layer exists").handlers();
        assert!(handlers(open).removal_click);
        assert!(!handlers(locked).removal_click);
    }

    #[test]
    fn detach_everywhere_reaches_layers_attached_before_locking() {
        let mut map = Map::new();
        let mut layer = Layer::managed(LayerKind::Marker).locked();
        layer.handlers.removal_click = true;
        let id = map.insert(layer);

        StateMachine::detach_everywhere::<RemovalBehavior>(&mut map);

        assert!(!map.layer(id).expect("layer exists").handlers().removal_click);
    }

    #[test]
    fn drag_granularity_parses_names_and_legacy_numbers() {
        assert_eq!("layer".parse::<DragGranularity>(), Ok(DragGranularity::Layer));
        assert_eq!("layer-group".parse::<DragGranularity>(), Ok(DragGranularity::LayerGroup));
        assert_eq!(DragGranularity::try_from(0_u8), Ok(DragGranularity::Layer));
        assert_eq!(
            DragGranularity::try_from(7_u8),
            Err(StateError::UnknownDragGranularity("7".to_string()))
        );
    }

    #[test]
    fn union_selection_toggles_membership() {
        let mut machine = StateMachine::new();
        let layer = LayerId(4);
        assert!(machine.toggle_union_selection(layer));
        assert_eq!(machine.union_selection(), &[layer]);
        assert!(!machine.toggle_union_selection(layer));
        assert!(machine.union_selection().is_empty());
    }
}
