pub mod config_cmd;
pub mod schedule;
pub mod tube;

use std::path::Path;
use tubeknit_config::KnitConfig;
use tubeknit_engine::KnitSettings;

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> tubeknit_core::Result<KnitConfig> {
    let loaded = match path {
        Some(path) => KnitConfig::load_from(path).map(KnitConfig::with_env_overrides),
        None => KnitConfig::load(),
    };
    loaded.map_err(|e| tubeknit_core::Error::Config {
        message: e.to_string(),
    })
}

/// Engine settings from the `[stitch]` and `[shaping]` sections.
pub fn knit_settings(config: &KnitConfig) -> KnitSettings {
    KnitSettings {
        cast_on_stitch: config.stitch.cast_on,
        body_stitch: config.stitch.body,
        bindoff_stitch: config.stitch.bindoff,
        tuck_stitch: config.stitch.tuck,
        bindoff_slack: config.shaping.bindoff_slack,
        width_change_stitches: config.shaping.width_change_stitches,
    }
}
