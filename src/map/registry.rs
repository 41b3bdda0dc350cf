//! Capability queries over the layers of a map.

use super::layer::{Layer, LayerId};
use super::Map;

pub fn is_managed(layer: &Layer) -> bool {
    layer.handle().is_some()
}

pub fn is_transient(layer: &Layer) -> bool {
    layer.is_temporary()
}

pub fn is_locked(layer: &Layer) -> bool {
    layer.options().locked
}

/// Managed, non-transient layer that a `layeradd` reconciliation should
/// react to.
pub fn is_relevant(layer: &Layer) -> bool {
    is_managed(layer) && !is_transient(layer)
}

/// Snapshot of the layers global modes may operate on. Layer groups only take
/// part when they are flagged as drag units.
pub fn find_managed_layers(map: &Map) -> Vec<LayerId> {
    map.layers()
        .filter(|layer| is_relevant(layer))
        .filter(|layer| !layer.kind().is_layer_group() || layer.options().group_drag)
        .map(Layer::id)
        .collect()
}
