//! `vpw init`: write a starter `vpw.toml`.

use std::fs;
use std::path::PathBuf;

use vpw_config::CONFIG_FILE;

use crate::GlobalArgs;

/// Runs the `vpw init` command.
///
/// Creates `dir` if needed and writes `vpw.toml` with every setting at its
/// default. Refuses to overwrite an existing file.
pub fn run(
    dir: Option<String>,
    name: Option<String>,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let root = match &dir {
        Some(d) => PathBuf::from(d),
        None => std::env::current_dir()?,
    };
    let path = root.join(CONFIG_FILE);
    if path.exists() {
        return Err(format!("'{}' already exists", path.display()).into());
    }
    fs::create_dir_all(&root)?;

    let package = match name {
        Some(n) => n,
        None => root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("testbench")
            .to_string(),
    };
    if !vpw_header::is_identifier(&package) {
        return Err(format!("'{package}' is not a valid package name").into());
    }

    fs::write(&path, config_template(&package))?;
    if !global.quiet {
        eprintln!("     Created {}", path.display());
    }
    Ok(0)
}

fn config_template(package: &str) -> String {
    format!(
        r#"[package]
name = "{package}"
clock = "clk"

[trace]
enabled = true
depth = 99
dir = "."
timescale = "1ps"

[clock]
period = 10
setup = 2
hold = 5

[snapshot]
include_inputs = true
"#
    )
}
