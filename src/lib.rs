pub mod config;
pub mod context;
pub mod draw;
pub mod error;
pub mod logging;
pub mod map;
pub mod state;
pub mod throttle;
pub mod toolbar;

pub use config::ModesConfig;
pub use context::MapContext;
pub use draw::{DrawOptions, DrawShape};
pub use error::{PmError, PmResult};
pub use map::{Layer, LayerId, LayerKind, MapEvent, MapEventKind};
pub use state::{DragGranularity, GlobalMode, ModeFlags};
pub use toolbar::{ButtonAction, ButtonName, ToolbarOptions};

/// Entrypoint used by host integrations: installs logging, loads
/// `config.json` and returns a controller for one map.
pub fn attach() -> MapContext {
    logging::init();
    let config = config::load_modes_config();
    let context = MapContext::new(&config);
    tracing::info!(
        drag_granularity = ?config.drag_granularity,
        "map modes attached"
    );
    context
}
