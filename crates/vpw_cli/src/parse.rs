//! `vpw parse`: generate the port registry source for a model header.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::pipeline;
use crate::{GlobalArgs, ParseArgs};

/// Runs the `vpw parse` command.
///
/// Reads the header, sets the clock apart and writes the generated model
/// struct and `port_registry!` block to `--output` or stdout.
pub fn run(args: &ParseArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let clock = pipeline::resolve_clock(args.clock.as_deref(), global)?;
    let sink = pipeline::diagnostic_sink(global);
    let path = Path::new(&args.header);

    let header = vpw_header::read_header(path, &clock, &sink)
        .map_err(|e| format!("cannot read header '{}': {e}", path.display()))?;
    debug!(ports = header.ports.len(), clock = %clock, "parsed header");

    let model = match &args.module {
        Some(m) => m.clone(),
        None => model_name_from_header(path),
    };
    let source = vpw_header::render_registry(&model, &header)?;

    match &args.output {
        Some(out) => {
            fs::write(out, &source)?;
            if !global.quiet {
                eprintln!("   Generated {out} ({model})");
            }
        }
        None => print!("{source}"),
    }
    Ok(0)
}

/// Derives a type name from a header path: `Vbram.h` becomes `Bram` and
/// `Vtop_core.h` becomes `TopCore`.
fn model_name_from_header(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let stem = stem.strip_prefix('V').unwrap_or(stem);
    let name: String = stem
        .split(|c: char| c == '_' || c == '-' || c == '.')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if name.is_empty() {
        "Model".to_string()
    } else {
        name
    }
}
