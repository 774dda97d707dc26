//! Helpers shared by the subcommands: configuration lookup, diagnostic
//! sinks and command-line value parsing.

use std::path::Path;
use std::sync::Arc;

use vpw_config::{HarnessConfig, CONFIG_FILE};
use vpw_diagnostics::{DiagnosticSink, RenderStyle};

use crate::GlobalArgs;

/// Loads the configuration named by `--config`, or `./vpw.toml` if present.
///
/// Returns `Ok(None)` when neither exists.
pub fn find_config(global: &GlobalArgs) -> Result<Option<HarnessConfig>, Box<dyn std::error::Error>> {
    if let Some(path) = &global.config {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config '{path}': {e}"))?;
        return Ok(Some(vpw_config::load_config_from_str(&content)?));
    }
    if Path::new(CONFIG_FILE).exists() {
        return Ok(Some(vpw_config::load_config(Path::new("."))?));
    }
    Ok(None)
}

/// Picks the clock name: the flag, then `package.clock`, then `clk`.
pub fn resolve_clock(
    flag: Option<&str>,
    global: &GlobalArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(clock) = flag {
        return Ok(clock.to_string());
    }
    Ok(find_config(global)?
        .map(|c| c.package.clock)
        .unwrap_or_else(|| "clk".to_string()))
}

/// Creates the diagnostic sink for a command; `--quiet` stops the echo.
pub fn diagnostic_sink(global: &GlobalArgs) -> Arc<DiagnosticSink> {
    Arc::new(if global.quiet {
        DiagnosticSink::new()
    } else {
        DiagnosticSink::echoing(RenderStyle::Plain)
    })
}

/// Parses a `NAME=V[,V...]` port assignment. Values are decimal or `0x` hex.
pub fn parse_assignment(arg: &str) -> Result<(String, Vec<u64>), String> {
    let (name, values) = arg
        .split_once('=')
        .ok_or_else(|| format!("invalid assignment '{arg}': expected NAME=VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid assignment '{arg}': missing port name"));
    }
    let values = values
        .split(',')
        .map(|v| parse_value(v.trim()).ok_or_else(|| format!("invalid value '{v}' in '{arg}'")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((name.to_string(), values))
}

fn parse_value(s: &str) -> Option<u64> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16).ok(),
        None => s.replace('_', "").parse().ok(),
    }
}
