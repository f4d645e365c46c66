//! `tubeknit config` — Configuration management commands.

use std::path::Path;
use tubeknit_config::KnitConfig;

pub fn validate(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match super::load_config(path) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if config.shaping.bindoff_slack >= 3 {
                warnings.push("Bind-off slack of 3 or more makes a very loose edge");
            }

            if config.stitch.tuck >= config.stitch.body {
                warnings.push("Tuck stitch is not smaller than the body stitch");
            }

            if config.machine.carriers.len() < 2 {
                warnings.push("Only one carrier configured");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Machine:   {}", config.machine.name);
            println!("   Carriers:  {}", config.machine.carriers.len());
            println!(
                "   Stitches:  cast-on {} / body {} / bind-off {} / tuck {}",
                config.stitch.cast_on, config.stitch.body, config.stitch.bindoff, config.stitch.tuck
            );
            println!(
                "   Shaping:   {} stitches in, slack {}",
                config.shaping.width_change_stitches, config.shaping.bindoff_slack
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub fn show(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(path).map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", KnitConfig::config_path().display());
    Ok(())
}
