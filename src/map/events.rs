use super::layer::LayerId;
use crate::draw::DrawShape;
use crate::state::GlobalMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    LayerAdd { layer: LayerId },
    LayerRemove { layer: LayerId },
    Remove { layer: LayerId },
    GlobalModeToggled { mode: GlobalMode, enabled: bool, map: MapId },
    DrawStart { shape: DrawShape },
    DrawEnd { shape: DrawShape },
    Create { shape: DrawShape, layer: LayerId },
    Cut,
    UnionSelect { layer: LayerId, selected: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    LayerAdd,
    LayerRemove,
    Remove,
    GlobalModeToggled(GlobalMode),
    DrawStart,
    DrawEnd,
    Create,
    Cut,
    UnionSelect,
}

impl MapEvent {
    pub const fn kind(&self) -> MapEventKind {
        match self {
            Self::LayerAdd { .. } => MapEventKind::LayerAdd,
            Self::LayerRemove { .. } => MapEventKind::LayerRemove,
            Self::Remove { .. } => MapEventKind::Remove,
            Self::GlobalModeToggled { mode, .. } => MapEventKind::GlobalModeToggled(*mode),
            Self::DrawStart { .. } => MapEventKind::DrawStart,
            Self::DrawEnd { .. } => MapEventKind::DrawEnd,
            Self::Create { .. } => MapEventKind::Create,
            Self::Cut => MapEventKind::Cut,
            Self::UnionSelect { .. } => MapEventKind::UnionSelect,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.kind().name()
    }
}

impl MapEventKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::LayerAdd => "layeradd",
            Self::LayerRemove => "layerremove",
            Self::Remove => "pm:remove",
            Self::GlobalModeToggled(GlobalMode::Edit) => "pm:globaleditmodetoggled",
            Self::GlobalModeToggled(GlobalMode::Drag) => "pm:globaldragmodetoggled",
            Self::GlobalModeToggled(GlobalMode::Removal) => "pm:globalremovalmodetoggled",
            Self::GlobalModeToggled(GlobalMode::Union) => "pm:globalunionmodetoggled",
            Self::DrawStart => "pm:drawstart",
            Self::DrawEnd => "pm:drawend",
            Self::Create => "pm:create",
            Self::Cut => "pm:cut",
            Self::UnionSelect => "pm:unionselect",
        }
    }
}

/// Internal reactions to `layeradd` that global modes register on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum LayerAddListener {
    Reconcile(GlobalMode),
    ThrottledRemovalReinit,
}

type Observer = Box<dyn Fn(&MapEvent)>;

struct Subscription {
    id: ListenerId,
    kind: Option<MapEventKind>,
    observer: Observer,
}

/// Publish/subscribe bus for a single map.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    layer_add_listeners: Vec<LayerAddListener>,
    next_listener: u64,
}

impl EventBus {
    pub fn on(&mut self, kind: MapEventKind, observer: impl Fn(&MapEvent) + 'static) -> ListenerId {
        self.subscribe(Some(kind), Box::new(observer))
    }

    pub fn on_any(&mut self, observer: impl Fn(&MapEvent) + 'static) -> ListenerId {
        self.subscribe(None, Box::new(observer))
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        before != self.subscriptions.len()
    }

    pub fn fire(&self, event: &MapEvent) {
        tracing::trace!(event = event.name(), "fire map event");
        let kind = event.kind();
        for subscription in &self.subscriptions {
            if subscription.kind.is_none_or(|wanted| wanted == kind) {
                (subscription.observer)(event);
            }
        }
    }

    pub fn observer_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn subscribe(&mut self, kind: Option<MapEventKind>, observer: Observer) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.saturating_add(1);
        self.subscriptions.push(Subscription { id, kind, observer });
        id
    }

    /// Registering the same listener twice keeps a single entry.
    pub(crate) fn listen_layer_add(&mut self, listener: LayerAddListener) {
        if !self.layer_add_listeners.contains(&listener) {
            self.layer_add_listeners.push(listener);
        }
    }

    pub(crate) fn unlisten_layer_add(&mut self, listener: LayerAddListener) {
        self.layer_add_listeners.retain(|existing| *existing != listener);
    }

    pub(crate) fn layer_add_listeners(&self) -> Vec<LayerAddListener> {
        self.layer_add_listeners.clone()
    }

    pub(crate) fn clear(&mut self) {
        self.subscriptions.clear();
        self.layer_add_listeners.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.subscriptions.len())
            .field("layer_add_listeners", &self.layer_add_listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn observers_only_receive_their_event_kind() {
        let mut bus = EventBus::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        bus.on(MapEventKind::Remove, move |event| {
            sink.borrow_mut().push(event.clone())
        });

        bus.fire(&MapEvent::LayerAdd { layer: LayerId(1) });
        bus.fire(&MapEvent::Remove { layer: LayerId(1) });

        assert_eq!(*seen.borrow(), vec![MapEvent::Remove { layer: LayerId(1) }]);
    }

    #[test]
    fn off_detaches_observer() {
        let mut bus = EventBus::default();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let id = bus.on_any(move |_| *sink.borrow_mut() += 1);

        bus.fire(&MapEvent::Cut);
        assert!(bus.off(id));
        assert!(!bus.off(id));
        bus.fire(&MapEvent::Cut);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn layer_add_listener_registration_is_deduplicated() {
        let mut bus = EventBus::default();
        bus.listen_layer_add(LayerAddListener::Reconcile(GlobalMode::Edit));
        bus.listen_layer_add(LayerAddListener::Reconcile(GlobalMode::Edit));
        assert_eq!(bus.layer_add_listeners().len(), 1);

        bus.unlisten_layer_add(LayerAddListener::Reconcile(GlobalMode::Edit));
        assert!(bus.layer_add_listeners().is_empty());
    }

    #[test]
    fn mode_toggle_events_use_wire_names() {
        let event = MapEvent::GlobalModeToggled {
            mode: GlobalMode::Removal,
            enabled: true,
            map: MapId(0),
        };
        assert_eq!(event.name(), "pm:globalremovalmodetoggled");
        assert_eq!(MapEventKind::Remove.name(), "pm:remove");
    }
}
