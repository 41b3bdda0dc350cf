use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub(crate) u64);

impl LayerId {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Marker,
    Polyline,
    Polygon,
    Circle,
    Rectangle,
    LayerGroup,
}

impl LayerKind {
    pub const fn is_layer_group(self) -> bool {
        matches!(self, Self::LayerGroup)
    }

    pub const fn is_area(self) -> bool {
        matches!(self, Self::Polygon | Self::Rectangle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerOptions {
    /// Opts the layer out of drag, edit, removal and union sweeps.
    pub locked: bool,
    /// Marks a layer group as a single drag unit.
    pub group_drag: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditOptions {
    pub snappable: bool,
    pub snap_distance: f64,
    pub allow_self_intersection: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            snappable: true,
            snap_distance: 20.0,
            allow_self_intersection: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandleOptions {
    pub prevent_marker_removal: bool,
}

/// Editing capability attached to a layer. A layer without one is never
/// touched by global modes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditHandle {
    options: HandleOptions,
    layer_drag_enabled: bool,
    edit: Option<EditOptions>,
    dragging: bool,
}

impl EditHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: HandleOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> HandleOptions {
        self.options
    }

    pub fn enable_layer_drag(&mut self) {
        self.layer_drag_enabled = true;
    }

    pub fn disable_layer_drag(&mut self) {
        self.layer_drag_enabled = false;
        self.dragging = false;
    }

    pub fn layer_drag_enabled(&self) -> bool {
        self.layer_drag_enabled
    }

    pub fn enable(&mut self, options: EditOptions) {
        self.edit = Some(options);
    }

    pub fn disable(&mut self) {
        self.edit = None;
    }

    pub fn enabled(&self) -> bool {
        self.edit.is_some()
    }

    pub fn edit_options(&self) -> Option<&EditOptions> {
        self.edit.as_ref()
    }

    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// Drag progress is reported by the host; only a drag-enabled layer can
    /// be mid-drag.
    pub(crate) fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging && self.layer_drag_enabled;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerHandlers {
    pub removal_click: bool,
    pub union_click: bool,
}

impl LayerHandlers {
    pub const fn is_empty(&self) -> bool {
        !self.removal_click && !self.union_click
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub(crate) id: LayerId,
    kind: LayerKind,
    options: LayerOptions,
    temporary: bool,
    group: Option<LayerId>,
    pub(crate) handle: Option<EditHandle>,
    pub(crate) handlers: LayerHandlers,
}

impl Layer {
    /// An unmanaged layer. Ids are assigned when the layer is added to a map.
    pub fn new(kind: LayerKind) -> Self {
        Self {
            id: LayerId(0),
            kind,
            options: LayerOptions::default(),
            temporary: false,
            group: None,
            handle: None,
            handlers: LayerHandlers::default(),
        }
    }

    pub fn managed(kind: LayerKind) -> Self {
        Self::new(kind).with_handle(EditHandle::new())
    }

    pub fn with_handle(mut self, handle: EditHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn with_options(mut self, options: LayerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn locked(mut self) -> Self {
        self.options.locked = true;
        self
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn in_group(mut self, group: LayerId) -> Self {
        self.group = Some(group);
        self
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn options(&self) -> LayerOptions {
        self.options
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn group(&self) -> Option<LayerId> {
        self.group
    }

    pub fn handle(&self) -> Option<&EditHandle> {
        self.handle.as_ref()
    }

    pub fn handlers(&self) -> LayerHandlers {
        self.handlers
    }

    pub(crate) fn handle_mut(&mut self) -> Option<&mut EditHandle> {
        self.handle.as_mut()
    }

    /// Drops every mode-specific attachment before the layer leaves the map.
    pub(crate) fn detach_all(&mut self) {
        self.handlers = LayerHandlers::default();
        if let Some(handle) = self.handle.as_mut() {
            handle.disable_layer_drag();
            handle.disable();
        }
    }
}
