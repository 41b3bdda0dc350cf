//! Layer store and event bus of a single map.

pub mod events;
pub mod layer;
pub mod registry;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub use events::{EventBus, ListenerId, MapEvent, MapEventKind, MapId};
pub use layer::{
    EditHandle, EditOptions, HandleOptions, Layer, LayerHandlers, LayerId, LayerKind, LayerOptions,
};

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct Map {
    id: MapId,
    layers: BTreeMap<LayerId, Layer>,
    next_layer: u64,
    pub(crate) bus: EventBus,
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Map {
    pub fn new() -> Self {
        Self {
            id: MapId(NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed)),
            layers: BTreeMap::new(),
            next_layer: 1,
            bus: EventBus::default(),
        }
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    /// Layers in insertion order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.keys().copied().collect()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub(crate) fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Stores the layer without publishing `layeradd`.
    pub(crate) fn insert(&mut self, mut layer: Layer) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer = self.next_layer.saturating_add(1);
        layer.id = id;
        self.layers.insert(id, layer);
        id
    }

    pub(crate) fn take(&mut self, id: LayerId) -> Option<Layer> {
        self.layers.remove(&id)
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub(crate) fn fire(&self, event: MapEvent) {
        self.bus.fire(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_increasing_ids_in_insertion_order() {
        let mut map = Map::new();
        let first = map.insert(Layer::new(LayerKind::Marker));
        let second = map.insert(Layer::new(LayerKind::Polygon));

        assert!(first < second);
        assert_eq!(map.layer_ids(), vec![first, second]);
        assert_eq!(map.layer(second).map(Layer::kind), Some(LayerKind::Polygon));
    }

    #[test]
    fn maps_get_distinct_ids() {
        assert_ne!(Map::new().id(), Map::new().id());
    }
}
