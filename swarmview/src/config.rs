use macroquad::prelude::Conf;
use serde::Deserialize;

// Window constants
pub const WINDOW_WIDTH: i32 = 1200;
pub const WINDOW_HEIGHT: i32 = 700;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7878";
pub const DEFAULT_TICK_MS: u64 = 50;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ViewerConfig {
    /// Address the report listener binds to.
    pub listen_addr: String,
    /// Cadence of the render loop, in milliseconds.
    pub tick_ms: u64,
    /// Process agents in identifier order when building snapshots, so
    /// same-cell conflicts resolve the same way every frame.
    pub deterministic_order: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            tick_ms: DEFAULT_TICK_MS,
            deterministic_order: true,
        }
    }
}

pub fn window_conf() -> Conf {
    Conf {
        window_title: "SwarmView".to_owned(),
        window_width: WINDOW_WIDTH,
        window_height: WINDOW_HEIGHT,
        high_dpi: true,
        ..Default::default()
    }
}
