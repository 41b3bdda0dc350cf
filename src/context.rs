//! Per-map controller tying layers, global modes, draw modes and the toolbar
//! together.

use crate::config::ModesConfig;
use crate::draw::{Draw, DrawOptions, DrawShape};
use crate::error::PmResult;
use crate::map::events::LayerAddListener;
use crate::map::{
    registry, EditOptions, Layer, LayerId, LayerKind, ListenerId, Map, MapEvent, MapEventKind,
};
use crate::state::behavior::{
    DragBehavior, EditBehavior, ModeBehavior, RemovalBehavior, UnionBehavior,
};
use crate::state::{DragGranularity, GlobalMode, ModeFlags, StateMachine};
use crate::throttle::{Clock, ReinitThrottle, SystemClock};
use crate::toolbar::{
    ButtonAction, ButtonCommand, ButtonName, Toolbar, ToolbarError, ToolbarOptions, ToolbarResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveMode {
    Global(GlobalMode),
    Draw(DrawShape),
}

impl ActiveMode {
    const fn button(self) -> ButtonName {
        match self {
            Self::Global(mode) => ButtonName::for_mode(mode),
            Self::Draw(shape) => ButtonName::for_shape(shape),
        }
    }
}

pub struct MapContext {
    map: Map,
    modes: StateMachine,
    toolbar: Toolbar,
    draw: Draw,
    removal_throttle: ReinitThrottle,
    default_edit_options: EditOptions,
    clock: Box<dyn Clock>,
}

impl MapContext {
    pub fn new(config: &ModesConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: &ModesConfig, clock: impl Clock + 'static) -> Self {
        let context = Self {
            map: Map::new(),
            modes: StateMachine::with_drag_settings(
                config.drag_granularity,
                config.layer_group_drag_menu,
            ),
            toolbar: Toolbar::new(config.toolbar, config.layer_group_drag_menu),
            draw: Draw::default(),
            removal_throttle: ReinitThrottle::new(config.removal_reinit_window()),
            default_edit_options: config.edit.clone(),
            clock: Box::new(clock),
        };
        tracing::debug!(map = ?context.map.id(), "map context attached");
        context
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn modes(&self) -> &StateMachine {
        &self.modes
    }

    pub fn flags(&self) -> ModeFlags {
        self.modes.flags()
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn draw(&self) -> &Draw {
        &self.draw
    }

    pub fn on(&mut self, kind: MapEventKind, observer: impl Fn(&MapEvent) + 'static) -> ListenerId {
        self.map.bus.on(kind, observer)
    }

    pub fn on_any(&mut self, observer: impl Fn(&MapEvent) + 'static) -> ListenerId {
        self.map.bus.on_any(observer)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.map.bus.off(id)
    }

    /// Adds the layer, publishes `layeradd` and lets active modes react.
    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        let id = self.map.insert(layer);
        self.map.fire(MapEvent::LayerAdd { layer: id });
        self.handle_layer_add(id);
        id
    }

    /// Detaches every mode handler from the layer before it leaves the map.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        self.map.layer_mut(id)?.detach_all();
        self.modes.forget_layer(id);
        let layer = self.map.take(id)?;
        self.map.fire(MapEvent::LayerRemove { layer: id });
        Some(layer)
    }

    /// Dispatches a click on a layer to whichever mode handler is attached.
    /// Returns `true` when a handler acted.
    pub fn click_layer(&mut self, id: LayerId) -> bool {
        let Some(handlers) = self.map.layer(id).map(Layer::handlers) else {
            return false;
        };
        if handlers.removal_click {
            return self.remove_clicked_layer(id);
        }
        if handlers.union_click {
            let selected = self.modes.toggle_union_selection(id);
            self.map.fire(MapEvent::UnionSelect { layer: id, selected });
            return true;
        }
        false
    }

    /// Drag progress reported by the host.
    pub fn set_layer_dragging(&mut self, id: LayerId, dragging: bool) -> bool {
        match self.map.layer_mut(id).and_then(Layer::handle_mut) {
            Some(handle) => {
                handle.set_dragging(dragging);
                handle.dragging() == dragging
            }
            None => false,
        }
    }

    /// Runs a removal reconciliation once its throttle window has elapsed.
    /// Hosts call this from their event loop.
    pub fn tick(&mut self) {
        if self.removal_throttle.take_due(self.clock.now()) {
            tracing::debug!("throttled removal reinit");
            self.reconcile_mode::<RemovalBehavior>();
        }
    }

    pub fn enable_global_edit_mode(&mut self, options: Option<EditOptions>) {
        let options = options.unwrap_or_else(|| self.default_edit_options.clone());
        self.enable_mode::<EditBehavior>(options);
    }

    pub fn disable_global_edit_mode(&mut self) {
        self.disable_mode::<EditBehavior>();
    }

    pub fn toggle_global_edit_mode(&mut self, options: Option<EditOptions>) {
        if self.global_edit_enabled() {
            self.disable_global_edit_mode();
        } else {
            self.enable_global_edit_mode(options);
        }
    }

    pub fn global_edit_enabled(&self) -> bool {
        self.modes.is_enabled(GlobalMode::Edit)
    }

    pub fn enable_global_drag_mode(&mut self) {
        self.enable_mode::<DragBehavior>(());
    }

    pub fn disable_global_drag_mode(&mut self) {
        self.disable_mode::<DragBehavior>();
    }

    pub fn toggle_global_drag_mode(&mut self) {
        if self.global_drag_mode_enabled() {
            self.disable_global_drag_mode();
        } else {
            self.enable_global_drag_mode();
        }
    }

    pub fn global_drag_mode_enabled(&self) -> bool {
        self.modes.is_enabled(GlobalMode::Drag)
    }

    pub fn enable_global_removal_mode(&mut self) {
        self.enable_mode::<RemovalBehavior>(());
    }

    pub fn disable_global_removal_mode(&mut self) {
        self.disable_mode::<RemovalBehavior>();
    }

    pub fn toggle_global_removal_mode(&mut self) {
        if self.global_removal_enabled() {
            self.disable_global_removal_mode();
        } else {
            self.enable_global_removal_mode();
        }
    }

    pub fn global_removal_enabled(&self) -> bool {
        self.modes.is_enabled(GlobalMode::Removal)
    }

    pub fn enable_global_union_mode(&mut self) {
        self.enable_mode::<UnionBehavior>(());
    }

    pub fn disable_global_union_mode(&mut self) {
        self.disable_mode::<UnionBehavior>();
    }

    pub fn toggle_global_union_mode(&mut self) {
        if self.global_union_enabled() {
            self.disable_global_union_mode();
        } else {
            self.enable_global_union_mode();
        }
    }

    pub fn global_union_enabled(&self) -> bool {
        self.modes.is_enabled(GlobalMode::Union)
    }

    /// Switches what a drag moves. An active drag mode is rebuilt with the
    /// new eligibility.
    pub fn change_drag_mode(&mut self, granularity: DragGranularity) {
        self.modes.set_drag_granularity(granularity);
        if self.global_drag_mode_enabled() {
            self.disable_global_drag_mode();
            self.enable_global_drag_mode();
        }
    }

    pub fn toggle_layer_group_drag_menu(&mut self) {
        let enabled = self.modes.toggle_layer_group_drag_menu();
        self.toolbar.reinit(enabled);
    }

    pub fn enable_draw(&mut self, shape: DrawShape, options: Option<DrawOptions>) {
        if self.draw.is_drawing(shape) {
            return;
        }
        self.deactivate_others(ActiveMode::Draw(shape));

        let hint = self.add_layer(Layer::managed(LayerKind::Polyline).temporary());
        let options = options.unwrap_or_else(|| default_draw_options(shape));
        self.draw.start(shape, options, hint);
        self.toolbar.set_button_state(ButtonName::for_shape(shape), true);
        tracing::debug!(shape = shape.name(), "draw started");
        self.map.fire(MapEvent::DrawStart { shape });
    }

    pub fn enable_draw_named(&mut self, shape: &str, options: Option<DrawOptions>) -> PmResult<()> {
        let shape = shape.parse::<DrawShape>()?;
        self.enable_draw(shape, options);
        Ok(())
    }

    /// Stops whichever shape is being drawn.
    pub fn disable_draw(&mut self) {
        let Some(active) = self.draw.stop() else {
            return;
        };
        if let Some(hint) = active.hint_layer {
            self.remove_layer(hint);
        }
        self.toolbar
            .set_button_state(ButtonName::for_shape(active.shape), false);
        tracing::debug!(shape = active.shape.name(), "draw ended");
        self.map.fire(MapEvent::DrawEnd {
            shape: active.shape,
        });
    }

    pub fn disable_draw_shape(&mut self, shape: DrawShape) {
        if self.draw.is_drawing(shape) {
            self.disable_draw();
        }
    }

    pub fn toggle_draw(&mut self, shape: DrawShape, options: Option<DrawOptions>) {
        if self.draw.is_drawing(shape) {
            self.disable_draw();
        } else {
            self.enable_draw(shape, options);
        }
    }

    /// Without a shape, reports whether anything is being drawn.
    pub fn draw_enabled(&self, shape: Option<DrawShape>) -> bool {
        match shape {
            Some(shape) => self.draw.is_drawing(shape),
            None => self.draw.active_shape().is_some(),
        }
    }

    /// Completes the current drawing. Shapes produce a new managed layer;
    /// a cut publishes `pm:cut`.
    pub fn finish_draw(&mut self) -> Option<LayerId> {
        let active = self.draw.active()?.clone();
        let created = match active.shape.layer_kind() {
            Some(kind) => {
                let layer = self.add_layer(Layer::managed(kind));
                self.map.fire(MapEvent::Create {
                    shape: active.shape,
                    layer,
                });
                Some(layer)
            }
            None => {
                self.map.fire(MapEvent::Cut);
                None
            }
        };
        if !active.options.continue_drawing {
            self.disable_draw();
        }
        created
    }

    pub fn add_controls(&mut self, options: Option<ToolbarOptions>) {
        self.toolbar.add_controls(options);
        self.sync_buttons();
    }

    pub fn remove_controls(&mut self) {
        self.toolbar.remove_controls();
    }

    pub fn toggle_controls(&mut self) {
        self.toolbar.toggle_controls();
        self.sync_buttons();
    }

    pub fn controls_visible(&self) -> bool {
        self.toolbar.controls_visible()
    }

    /// Clicks a toolbar button the way a user would. Returns `false` when the
    /// button does not exist.
    pub fn click_button(&mut self, name: ButtonName) -> bool {
        let Some(button) = self.toolbar.button(name) else {
            return false;
        };
        if button.disables_other_buttons() {
            for command in self.toolbar.force_deactivate_others(Some(name)) {
                self.run_button_command(command);
            }
        }
        let toggled = self.toolbar.is_toggled(name);
        self.toolbar.set_button_state(name, !toggled);
        self.run_button_command(name.command());
        true
    }

    pub fn click_button_named(&mut self, name: &str) -> PmResult<bool> {
        let name = name.parse::<ButtonName>()?;
        Ok(self.click_button(name))
    }

    /// Runs an entry of a button's action menu. Actions the button does not
    /// list, including every action of a missing button, are rejected.
    pub fn click_action(&mut self, name: ButtonName, action: ButtonAction) -> ToolbarResult<()> {
        let listed = self
            .toolbar
            .button(name)
            .is_some_and(|button| button.actions().contains(&action));
        if !listed {
            return Err(ToolbarError::UnsupportedAction {
                button: name,
                action,
            });
        }

        tracing::debug!(button = %name, ?action, "run button action");
        match (action, name.command()) {
            (ButtonAction::DragLayer, _) => self.change_drag_mode(DragGranularity::Layer),
            (ButtonAction::DragLayerGroup, _) => {
                self.change_drag_mode(DragGranularity::LayerGroup)
            }
            (ButtonAction::Finish, ButtonCommand::ToggleDraw(shape)) => {
                if self.draw.is_drawing(shape) {
                    self.finish_draw();
                }
            }
            (ButtonAction::RemoveLastVertex, ButtonCommand::ToggleDraw(shape)) => {
                if self.draw.is_drawing(shape) {
                    self.remove_last_vertex();
                }
            }
            (ButtonAction::Cancel, ButtonCommand::ToggleGlobal(mode)) => self.disable_global(mode),
            (ButtonAction::Cancel, ButtonCommand::ToggleDraw(shape)) => {
                self.disable_draw_shape(shape)
            }
            (ButtonAction::Finish | ButtonAction::RemoveLastVertex, ButtonCommand::ToggleGlobal(_)) => {}
        }
        Ok(())
    }

    /// Places a vertex in the current drawing and returns the new count.
    pub fn add_vertex(&mut self) -> Option<usize> {
        self.draw.push_vertex()
    }

    /// Returns `false` when there is no vertex to take back.
    pub fn remove_last_vertex(&mut self) -> bool {
        self.draw.pop_vertex()
    }

    /// Disables every mode and drops toolbar and observers.
    pub fn detach(&mut self) {
        self.disable_draw();
        for mode in self.modes.active_modes() {
            self.disable_global(mode);
        }
        self.toolbar.remove_controls();
        self.removal_throttle.cancel();
        self.map.bus.clear();
        tracing::debug!(map = ?self.map.id(), "map context detached");
    }

    fn enable_mode<B: ModeBehavior>(&mut self, options: B::Options) {
        if B::state(&self.modes).enabled() {
            return;
        }
        self.deactivate_others(ActiveMode::Global(B::MODE));

        self.modes.set_options::<B>(options);
        self.modes.set_enabled::<B>(true);
        self.modes.attach_eligible::<B>(&mut self.map);
        self.map.bus.listen_layer_add(layer_add_listener::<B>());

        self.toolbar
            .set_button_state(ButtonName::for_mode(B::MODE), true);
        self.fire_mode_toggled(B::MODE, true);
    }

    fn disable_mode<B: ModeBehavior>(&mut self) {
        if !B::state(&self.modes).enabled() {
            return;
        }
        self.modes.set_enabled::<B>(false);
        StateMachine::detach_everywhere::<B>(&mut self.map);
        self.map.bus.unlisten_layer_add(layer_add_listener::<B>());
        if B::THROTTLED {
            self.removal_throttle.cancel();
        }
        if B::MODE == GlobalMode::Union {
            self.modes.clear_union_selection();
        }

        self.toolbar
            .set_button_state(ButtonName::for_mode(B::MODE), false);
        self.fire_mode_toggled(B::MODE, false);
    }

    /// Full disable-then-enable cycle with the options the mode last used.
    /// The union selection outlives the cycle.
    fn reconcile_mode<B: ModeBehavior>(&mut self) {
        let state = B::state(&self.modes);
        if !state.enabled() {
            return;
        }
        let options = state.options().clone();
        let selection = self.modes.union_selection().to_vec();
        self.disable_mode::<B>();
        self.enable_mode::<B>(options);
        if B::MODE == GlobalMode::Union {
            self.modes.restore_union_selection(selection, &self.map);
        }
    }

    fn handle_layer_add(&mut self, id: LayerId) {
        let relevant = self.map.layer(id).is_some_and(registry::is_relevant);
        if !relevant {
            return;
        }
        for listener in self.map.bus.layer_add_listeners() {
            match listener {
                LayerAddListener::Reconcile(mode) => self.reconcile(mode),
                LayerAddListener::ThrottledRemovalReinit => {
                    self.removal_throttle.schedule(self.clock.now());
                }
            }
        }
    }

    fn reconcile(&mut self, mode: GlobalMode) {
        match mode {
            GlobalMode::Edit => self.reconcile_mode::<EditBehavior>(),
            GlobalMode::Drag => self.reconcile_mode::<DragBehavior>(),
            GlobalMode::Removal => self.reconcile_mode::<RemovalBehavior>(),
            GlobalMode::Union => self.reconcile_mode::<UnionBehavior>(),
        }
    }

    fn disable_global(&mut self, mode: GlobalMode) {
        match mode {
            GlobalMode::Edit => self.disable_global_edit_mode(),
            GlobalMode::Drag => self.disable_global_drag_mode(),
            GlobalMode::Removal => self.disable_global_removal_mode(),
            GlobalMode::Union => self.disable_global_union_mode(),
        }
    }

    /// Routes through the toolbar first so deactivation takes the same path
    /// as a click, then stops anything left without a button.
    fn deactivate_others(&mut self, except: ActiveMode) {
        for command in self.toolbar.force_deactivate_others(Some(except.button())) {
            self.run_button_command(command);
        }
        for mode in self.modes.active_modes() {
            if ActiveMode::Global(mode) != except {
                self.disable_global(mode);
            }
        }
        if let Some(shape) = self.draw.active_shape() {
            if ActiveMode::Draw(shape) != except {
                self.disable_draw();
            }
        }
    }

    fn run_button_command(&mut self, command: ButtonCommand) {
        tracing::debug!(?command, "run button command");
        match command {
            ButtonCommand::ToggleGlobal(GlobalMode::Edit) => self.toggle_global_edit_mode(None),
            ButtonCommand::ToggleGlobal(GlobalMode::Drag) => self.toggle_global_drag_mode(),
            ButtonCommand::ToggleGlobal(GlobalMode::Removal) => self.toggle_global_removal_mode(),
            ButtonCommand::ToggleGlobal(GlobalMode::Union) => self.toggle_global_union_mode(),
            ButtonCommand::ToggleDraw(shape) => self.toggle_draw(shape, None),
        }
    }

    fn remove_clicked_layer(&mut self, id: LayerId) -> bool {
        let removable = self.map.layer(id).is_some_and(|layer| {
            !registry::is_transient(layer) && layer.handle().is_none_or(|handle| !handle.dragging())
        });
        if !removable {
            tracing::debug!(layer = %id, "click ignored; layer is transient or mid-drag");
            return false;
        }
        self.remove_layer(id);
        self.map.fire(MapEvent::Remove { layer: id });
        true
    }

    /// Buttons defined after modes were enabled pick up the current state.
    fn sync_buttons(&mut self) {
        let flags = self.modes.flags();
        for mode in GlobalMode::ALL {
            self.toolbar
                .set_button_state(ButtonName::for_mode(mode), flags.get(mode));
        }
        let active_shape = self.draw.active_shape();
        for shape in [
            DrawShape::Marker,
            DrawShape::Polyline,
            DrawShape::Rectangle,
            DrawShape::Polygon,
            DrawShape::Circle,
            DrawShape::Cut,
        ] {
            self.toolbar
                .set_button_state(ButtonName::for_shape(shape), active_shape == Some(shape));
        }
    }

    fn fire_mode_toggled(&self, mode: GlobalMode, enabled: bool) {
        self.map.fire(MapEvent::GlobalModeToggled {
            mode,
            enabled,
            map: self.map.id(),
        });
    }
}

impl Default for MapContext {
    fn default() -> Self {
        Self::new(&ModesConfig::default())
    }
}

impl std::fmt::Debug for MapContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapContext")
            .field("map", &self.map)
            .field("modes", &self.modes)
            .field("toolbar", &self.toolbar)
            .field("draw", &self.draw)
            .finish_non_exhaustive()
    }
}

fn layer_add_listener<B: ModeBehavior>() -> LayerAddListener {
    if B::THROTTLED {
        LayerAddListener::ThrottledRemovalReinit
    } else {
        LayerAddListener::Reconcile(B::MODE)
    }
}

fn default_draw_options(shape: DrawShape) -> DrawOptions {
    match shape {
        DrawShape::Cut => DrawOptions::cut(),
        _ => DrawOptions::default(),
    }
}
