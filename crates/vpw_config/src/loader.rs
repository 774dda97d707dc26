//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::HarnessConfig;
use std::path::Path;

/// File name looked up inside a harness directory.
pub const CONFIG_FILE: &str = "vpw.toml";

/// Loads and validates a `vpw.toml` configuration from a directory.
///
/// Reads `<dir>/vpw.toml`, parses it, and validates required fields.
pub fn load_config(dir: &Path) -> Result<HarnessConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates a `vpw.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<HarnessConfig, ConfigError> {
    let config: HarnessConfig =
        toml::from_str(content).map_err(|e| ConfigError::Syntax(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates required fields and the ordering of the clock trace offsets.
fn validate_config(config: &HarnessConfig) -> Result<(), ConfigError> {
    if config.package.name.is_empty() {
        return Err(ConfigError::EmptyName("package.name"));
    }
    if config.package.clock.is_empty() {
        return Err(ConfigError::EmptyName("package.clock"));
    }
    let clock = &config.clock;
    if clock.setup == 0 || clock.hold == 0 {
        return Err(ConfigError::ZeroOffset {
            setup: clock.setup,
            hold: clock.hold,
        });
    }
    // the settle frame of tick t+1 must land after the falling-edge frame of tick t
    let fits = clock
        .setup
        .checked_add(clock.hold)
        .is_some_and(|span| span < clock.period);
    if !fits {
        return Err(ConfigError::OffsetsExceedPeriod {
            period: clock.period,
            setup: clock.setup,
            hold: clock.hold,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpw_common::TimeUnit;

    #[test]
    fn parse_minimal_config() {
        let config = load_config_from_str("[package]\nname = \"example\"\n").unwrap();
        assert_eq!(config.package.name, "example");
        assert_eq!(config.package.clock, "clk");
        assert_eq!(config.module(), "example");
        assert!(config.trace.enabled);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[package]
name = "tutorial_1a"
module = "bram"
clock = "sys_clk"

[trace]
enabled = false
depth = 1
dir = "waves"
timescale = "10ns"

[clock]
period = 20
setup = 4
hold = 10

[snapshot]
include_inputs = false
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.module(), "bram");
        assert_eq!(config.package.clock, "sys_clk");
        assert!(!config.trace.enabled);
        assert_eq!(config.trace.depth, 1);
        assert_eq!(config.trace.timescale.magnitude(), 10);
        assert_eq!(config.trace.timescale.unit(), TimeUnit::Ns);
        assert_eq!(config.clock.period, 20);
        assert!(!config.snapshot.include_inputs);
        assert!(config.trace_path().ends_with("tutorial_1a.vcd"));
    }

    #[test]
    fn missing_name_errors() {
        let err = load_config_from_str("[package]\nname = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName("package.name")));
    }

    #[test]
    fn missing_package_section_errors() {
        let err = load_config_from_str("[trace]\nenabled = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }

    #[test]
    fn overlapping_offsets_rejected() {
        let toml = "[package]\nname = \"x\"\n[clock]\nperiod = 6\nsetup = 2\nhold = 4\n";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OffsetsExceedPeriod {
                period: 6,
                setup: 2,
                hold: 4
            }
        ));
    }

    #[test]
    fn zero_setup_rejected() {
        let toml = "[package]\nname = \"x\"\n[clock]\nsetup = 0\n";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroOffset { setup: 0, .. }));
    }

    #[test]
    fn huge_offsets_rejected() {
        let toml = format!(
            "[package]\nname = \"x\"\n[clock]\nperiod = 10\nsetup = {}\nhold = 2\n",
            i64::MAX
        );
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::OffsetsExceedPeriod { .. }));
    }

    #[test]
    fn bad_timescale_is_parse_error() {
        let toml = "[package]\nname = \"x\"\n[trace]\ntimescale = \"3ns\"\n";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }

    #[test]
    fn load_from_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "[package]\nname = \"dut\"\n").unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.package.name, "dut");
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        match err {
            ConfigError::Read { path, .. } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected read error, got {other:?}"),
        }
    }
}
