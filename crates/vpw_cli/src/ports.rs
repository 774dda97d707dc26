//! `vpw ports`: list the ports a model header declares.

use std::fmt::Write;
use std::path::Path;

use vpw_header::ParsedHeader;

use crate::pipeline;
use crate::{GlobalArgs, PortsArgs, ReportFormat};

/// Runs the `vpw ports` command.
pub fn run(args: &PortsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let clock = pipeline::resolve_clock(args.clock.as_deref(), global)?;
    let sink = pipeline::diagnostic_sink(global);
    let path = Path::new(&args.header);
    let header = vpw_header::read_header(path, &clock, &sink)
        .map_err(|e| format!("cannot read header '{}': {e}", path.display()))?;

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&header)),
        ReportFormat::Json => println!("{}", render_json(&header)?),
    }
    Ok(0)
}

/// One row per port, clock first: direction, name, bit range and storage.
fn render_text(header: &ParsedHeader) -> String {
    let name_width = header
        .all_ports()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for port in header.all_ports() {
        let range = format!("[{}:{}]", port.msb, port.lsb);
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "{:<6} {:<name_width$} {:<9} {}",
            port.direction, port.name, range, port.width
        );
    }
    if header.clock.is_none() {
        let _ = writeln!(out, "(no clock)");
    }
    out
}

fn render_json(header: &ParsedHeader) -> Result<String, serde_json::Error> {
    let ports: Vec<_> = header.all_ports().collect();
    serde_json::to_string_pretty(&ports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpw_diagnostics::DiagnosticSink;

    const HEADER: &str = "\
    VL_IN8(rst,0,0);
    VL_IN8(clk,0,0);
    VL_OUT64(&count,39,0);
    VL_INOUTW(bus,95,0,3);
";

    fn parsed(clock: &str) -> ParsedHeader {
        vpw_header::parse_header(HEADER, clock, &DiagnosticSink::new())
    }

    #[test]
    fn text_lists_clock_first() {
        let text = render_text(&parsed("clk"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("clock  clk"));
        assert!(lines[1].starts_with("input  rst"));
        assert!(lines[2].contains("[39:0]"));
        assert!(lines[2].ends_with("u64"));
        assert!(lines[3].ends_with("[u32; 3]"));
    }

    #[test]
    fn text_notes_missing_clock() {
        let text = render_text(&parsed("sys_clk"));
        assert!(text.ends_with("(no clock)\n"));
        assert!(text.starts_with("input  rst"));
    }

    #[test]
    fn json_is_an_array_of_ports() {
        let json = render_json(&parsed("clk")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let ports = value.as_array().unwrap();
        assert_eq!(ports.len(), 4);
        assert_eq!(ports[0]["name"], "clk");
        assert_eq!(ports[0]["direction"], "clock");
        assert_eq!(ports[2]["msb"], 39);
        assert_eq!(ports[3]["direction"], "inout");
    }
}
