//! Per-mode eligibility and the attach/detach pair each global mode applies
//! to layers.

use std::fmt::Debug;

use super::machine::{DragGranularity, ModeState, StateMachine};
use super::GlobalMode;
use crate::map::{registry, EditOptions, Layer, Map};

pub(crate) trait ModeBehavior {
    const MODE: GlobalMode;
    /// Removal reconciles through the reinit throttle, every other mode on
    /// each relevant `layeradd`.
    const THROTTLED: bool = false;

    type Options: Clone + Debug + Default;

    fn is_eligible(layer: &Layer, map: &Map, machine: &StateMachine) -> bool;
    fn attach(layer: &mut Layer, options: &Self::Options);
    fn detach(layer: &mut Layer);

    fn state(machine: &StateMachine) -> &ModeState<Self::Options>;
    fn state_mut(machine: &mut StateMachine) -> &mut ModeState<Self::Options>;
}

pub(crate) struct EditBehavior;
pub(crate) struct DragBehavior;
pub(crate) struct RemovalBehavior;
pub(crate) struct UnionBehavior;

impl ModeBehavior for EditBehavior {
    const MODE: GlobalMode = GlobalMode::Edit;
    type Options = EditOptions;

    fn is_eligible(_layer: &Layer, _map: &Map, _machine: &StateMachine) -> bool {
        true
    }

    fn attach(layer: &mut Layer, options: &EditOptions) {
        if let Some(handle) = layer.handle_mut() {
            handle.enable(options.clone());
        }
    }

    fn detach(layer: &mut Layer) {
        if let Some(handle) = layer.handle_mut() {
            handle.disable();
        }
    }

    fn state(machine: &StateMachine) -> &ModeState<EditOptions> {
        &machine.edit
    }

    fn state_mut(machine: &mut StateMachine) -> &mut ModeState<EditOptions> {
        &mut machine.edit
    }
}

impl ModeBehavior for DragBehavior {
    const MODE: GlobalMode = GlobalMode::Drag;
    type Options = ();

    fn is_eligible(layer: &Layer, map: &Map, machine: &StateMachine) -> bool {
        match machine.drag_granularity() {
            DragGranularity::Layer => !layer.kind().is_layer_group(),
            DragGranularity::LayerGroup => {
                layer.kind().is_layer_group() || !belongs_to_drag_group(layer, map)
            }
        }
    }

    fn attach(layer: &mut Layer, _options: &()) {
        if let Some(handle) = layer.handle_mut() {
            handle.enable_layer_drag();
        }
    }

    fn detach(layer: &mut Layer) {
        if let Some(handle) = layer.handle_mut() {
            handle.disable_layer_drag();
        }
    }

    fn state(machine: &StateMachine) -> &ModeState<()> {
        &machine.drag
    }

    fn state_mut(machine: &mut StateMachine) -> &mut ModeState<()> {
        &mut machine.drag
    }
}

impl ModeBehavior for RemovalBehavior {
    const MODE: GlobalMode = GlobalMode::Removal;
    const THROTTLED: bool = true;
    type Options = ();

    fn is_eligible(layer: &Layer, _map: &Map, _machine: &StateMachine) -> bool {
        let prevented = layer
            .handle()
            .is_some_and(|handle| handle.options().prevent_marker_removal);
        !prevented && !layer.kind().is_layer_group()
    }

    fn attach(layer: &mut Layer, _options: &()) {
        layer.handlers.removal_click = true;
    }

    fn detach(layer: &mut Layer) {
        layer.handlers.removal_click = false;
    }

    fn state(machine: &StateMachine) -> &ModeState<()> {
        &machine.removal
    }

    fn state_mut(machine: &mut StateMachine) -> &mut ModeState<()> {
        &mut machine.removal
    }
}

impl ModeBehavior for UnionBehavior {
    const MODE: GlobalMode = GlobalMode::Union;
    type Options = ();

    fn is_eligible(layer: &Layer, _map: &Map, _machine: &StateMachine) -> bool {
        layer.kind().is_area()
    }

    fn attach(layer: &mut Layer, _options: &()) {
        layer.handlers.union_click = true;
    }

    fn detach(layer: &mut Layer) {
        layer.handlers.union_click = false;
    }

    fn state(machine: &StateMachine) -> &ModeState<()> {
        &machine.union
    }

    fn state_mut(machine: &mut StateMachine) -> &mut ModeState<()> {
        &mut machine.union
    }
}

fn belongs_to_drag_group(layer: &Layer, map: &Map) -> bool {
    layer
        .group()
        .and_then(|group| map.layer(group))
        .is_some_and(|group| registry::is_relevant(group) && group.options().group_drag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{EditHandle, HandleOptions, LayerKind, LayerOptions};

    fn drag_group() -> Layer {
        Layer::managed(LayerKind::LayerGroup).with_options(LayerOptions {
            group_drag: true,
            ..LayerOptions::default()
        })
    }

    #[test]
    fn removal_skips_groups_and_prevented_layers() {
        let map = Map::new();
        let machine = StateMachine::new();
        let prevented = Layer::new(LayerKind::Marker).with_handle(EditHandle::with_options(
            HandleOptions {
                prevent_marker_removal: true,
            },
        ));

        assert!(RemovalBehavior::is_eligible(
            &Layer::managed(LayerKind::Marker),
            &map,
            &machine
        ));
        assert!(!RemovalBehavior::is_eligible(&prevented, &map, &machine));
        assert!(!RemovalBehavior::is_eligible(&drag_group(), &map, &machine));
    }

    #[test]
    fn drag_granularity_selects_drag_units() {
        let mut map = Map::new();
        let group = map.insert(drag_group());
        let member = Layer::managed(LayerKind::Circle).in_group(group);
        let loose = Layer::managed(LayerKind::Marker);
        let group_layer = map.layer(group).expect("group was inserted").clone();

        let mut machine = StateMachine::new();
        assert_eq!(machine.drag_granularity(), DragGranularity::LayerGroup);
        assert!(DragBehavior::is_eligible(&group_layer, &map, &machine));
        assert!(!DragBehavior::is_eligible(&member, &map, &machine));
        assert!(DragBehavior::is_eligible(&loose, &map, &machine));

        machine.set_drag_granularity(DragGranularity::Layer);
        assert!(!DragBehavior::is_eligible(&group_layer, &map, &machine));
        assert!(DragBehavior::is_eligible(&member, &map, &machine));
        assert!(DragBehavior::is_eligible(&loose, &map, &machine));
    }

    #[test]
    fn union_only_targets_areas() {
        let map = Map::new();
        let machine = StateMachine::new();
        assert!(UnionBehavior::is_eligible(
            &Layer::managed(LayerKind::Rectangle),
            &map,
            &machine
        ));
        assert!(!UnionBehavior::is_eligible(
            &Layer::managed(LayerKind::Polyline),
            &map,
            &machine
        ));
    }
}
