//! `vpw sim`: run a reference model for a number of ticks.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;
use vpw_config::HarnessConfig;
use vpw_models::{AxiBridge, Bram, Counter, Loopback, ModelKind, RegFile};
use vpw_sim::{SimError, SimModel, SimOptions, Simulation, Snapshot};

use crate::pipeline;
use crate::{GlobalArgs, SimArgs};

/// Runs the `vpw sim` command.
///
/// Applies the `--set` assignments, ticks the model and prints a [`SimReport`]
/// as JSON on stdout.
pub fn run(args: &SimArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let kind: ModelKind = args.model.parse()?;
    let stimulus = args
        .assignments
        .iter()
        .map(|a| pipeline::parse_assignment(a))
        .collect::<Result<Vec<_>, _>>()?;

    let mut config = pipeline::find_config(global)?
        .unwrap_or_else(|| HarnessConfig::for_package(kind.name()));
    if let Some(dir) = &args.output {
        config.trace.dir = PathBuf::from(dir);
    }

    let sink = pipeline::diagnostic_sink(global);
    let mut options = SimOptions::from_config(&config)?.with_diagnostics(sink);
    if args.no_trace {
        options = options.without_trace();
    }
    if let Some(parent) = options.trace_path.as_ref().and_then(|p| p.parent()) {
        fs::create_dir_all(parent)?;
    }

    info!(model = %kind, ticks = args.ticks, "starting simulation");
    let snapshot = match kind {
        ModelKind::Bram => simulate(Bram::default(), &options, &stimulus, args.ticks)?,
        ModelKind::Counter => simulate(Counter::default(), &options, &stimulus, args.ticks)?,
        ModelKind::Loopback => simulate(Loopback::default(), &options, &stimulus, args.ticks)?,
        ModelKind::RegFile => simulate(RegFile::default(), &options, &stimulus, args.ticks)?,
        ModelKind::AxiBridge => simulate(AxiBridge::default(), &options, &stimulus, args.ticks)?,
    };

    println!("{}", report_json(kind, args.ticks, &snapshot)?);
    if !global.quiet {
        eprintln!("    Finished {} ticks of {kind}", args.ticks);
        if let Some(path) = &options.trace_path {
            eprintln!("       Trace {}", path.display());
        }
    }
    Ok(0)
}

/// What `vpw sim` prints once the run is over.
#[derive(Debug, Serialize)]
struct SimReport<'a> {
    model: ModelKind,
    ticks: u64,
    snapshot: &'a Snapshot,
}

fn report_json(model: ModelKind, ticks: u64, snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SimReport {
        model,
        ticks,
        snapshot,
    })
}

/// Applies `stimulus`, runs `ticks` clock cycles and returns the final
/// snapshot. The trace is closed before returning.
fn simulate<M: SimModel>(
    model: M,
    options: &SimOptions,
    stimulus: &[(String, Vec<u64>)],
    ticks: u64,
) -> Result<Snapshot, SimError> {
    let mut sim = Simulation::init(model, options)?;
    for (name, values) in stimulus {
        sim.prep(name, values)?;
    }
    for _ in 0..ticks {
        sim.tick()?;
    }
    let snapshot = sim.update();
    sim.finish()?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use vpw_diagnostics::DiagnosticSink;

    fn quiet() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    fn untraced() -> SimOptions {
        SimOptions::default()
            .with_diagnostics(Arc::new(DiagnosticSink::new()))
            .without_trace()
    }

    #[test]
    fn counter_counts_enabled_ticks() {
        let stimulus = vec![("en".to_string(), vec![1])];
        let snap = simulate(Counter::default(), &untraced(), &stimulus, 5).unwrap();
        assert_eq!(snap["count"], 5u64);
        assert_eq!(snap["en"], 1u64);
    }

    #[test]
    fn report_names_the_model() {
        let stimulus = vec![("en".to_string(), vec![1])];
        let snap = simulate(Counter::default(), &untraced(), &stimulus, 3).unwrap();
        let json = report_json(ModelKind::Counter, 3, &snap).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["model"], "counter");
        assert_eq!(value["ticks"], 3);
        assert_eq!(value["snapshot"]["count"], 3);
    }

    #[test]
    fn unknown_port_is_a_warning() {
        let options = untraced();
        let stimulus = vec![("bogus".to_string(), vec![1])];
        let snap = simulate(Counter::default(), &options, &stimulus, 1).unwrap();
        assert_eq!(snap["count"], 0u64);
        assert_eq!(options.diagnostics.warning_count(), 1);
    }

    #[test]
    fn run_writes_trace_into_output_dir() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("waves");
        let args = SimArgs {
            model: "counter".into(),
            ticks: 2,
            assignments: vec!["en=1".into()],
            no_trace: false,
            output: Some(out.to_str().unwrap().to_string()),
        };
        assert_eq!(run(&args, &quiet()).unwrap(), 0);
        let vcd = fs::read_to_string(out.join("counter.vcd")).unwrap();
        assert!(vcd.contains("$scope module counter $end"));
        assert!(vcd.contains("#25\n"));
    }

    #[test]
    fn run_without_trace_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("waves");
        let args = SimArgs {
            model: "bram".into(),
            ticks: 1,
            assignments: vec![],
            no_trace: true,
            output: Some(out.to_str().unwrap().to_string()),
        };
        run(&args, &quiet()).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn run_rejects_unknown_model() {
        let args = SimArgs {
            model: "alu".into(),
            ticks: 1,
            assignments: vec![],
            no_trace: true,
            output: None,
        };
        let err = run(&args, &quiet()).unwrap_err();
        assert!(err.to_string().contains("unknown model 'alu'"));
    }

    #[test]
    fn run_rejects_bad_assignment() {
        let args = SimArgs {
            model: "counter".into(),
            ticks: 1,
            assignments: vec!["en".into()],
            no_trace: true,
            output: None,
        };
        assert!(run(&args, &quiet()).is_err());
    }
}
