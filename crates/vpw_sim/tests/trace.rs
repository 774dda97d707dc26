//! Trace timing and VCD output across whole simulations.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{quiet_options, SpyLog, SpyRecorder, StreamReg};
use vpw_common::SignalValue;
use vpw_config::HarnessConfig;
use vpw_sim::{ClockSchedule, Harness, SimOptions, Simulation};

fn spy_sim(options: &SimOptions) -> (Simulation<StreamReg>, Rc<RefCell<SpyLog>>) {
    let log = Rc::new(RefCell::new(SpyLog::default()));
    let sim = Simulation::init_with_recorder(
        StreamReg::default(),
        options,
        Box::new(SpyRecorder(Rc::clone(&log))),
    )
    .unwrap();
    (sim, log)
}

#[test]
fn two_ticks_dump_six_increasing_times() {
    let (options, _) = quiet_options();
    let (mut sim, log) = spy_sim(&options);
    sim.tick().unwrap();
    sim.tick().unwrap();
    let times: Vec<u64> = log.borrow().dumps.iter().map(|(t, _)| *t).collect();
    assert_eq!(times, vec![8, 10, 15, 18, 20, 25]);
    assert_eq!(log.borrow().flushes, vec![3, 6]);
}

#[test]
fn times_never_repeat_over_many_ticks() {
    let (mut options, _) = quiet_options();
    options.schedule = ClockSchedule::new(3, 1, 1).unwrap();
    let (mut sim, log) = spy_sim(&options);
    for _ in 0..50 {
        sim.tick().unwrap();
    }
    let log = log.borrow();
    assert_eq!(log.dumps.len(), 150);
    assert!(log.dumps.windows(2).all(|w| w[0].0 < w[1].0));
}

#[test]
fn clock_toggles_across_frames() {
    let (options, _) = quiet_options();
    let (mut sim, log) = spy_sim(&options);
    sim.tick().unwrap();
    let log = log.borrow();
    assert_eq!(log.declared[0].name, "clk");
    let clk: Vec<_> = log.dumps.iter().map(|(_, f)| f[0].clone()).collect();
    assert_eq!(
        clk,
        vec![
            SignalValue::Scalar(0),
            SignalValue::Scalar(1),
            SignalValue::Scalar(0)
        ]
    );
}

#[test]
fn declares_every_port_in_scope() {
    let (mut options, _) = quiet_options();
    options.trace_scope = "tutorial_1a".into();
    let (_sim, log) = spy_sim(&options);
    let log = log.borrow();
    assert_eq!(log.scope, "tutorial_1a");
    let names: Vec<_> = log.declared.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(
        names,
        ["clk", "rst", "valid", "din", "dout", "wide_bus", "wide_out"]
    );
    let widths: Vec<_> = log.declared.iter().map(|v| v.width).collect();
    assert_eq!(widths, [1, 1, 1, 32, 32, 128, 128]);
}

#[test]
fn depth_zero_declares_nothing() {
    let (mut options, _) = quiet_options();
    options.trace_depth = 0;
    let (mut sim, log) = spy_sim(&options);
    sim.tick().unwrap();
    let log = log.borrow();
    assert!(log.declared.is_empty());
    assert_eq!(log.dumps.len(), 3);
    assert!(log.dumps.iter().all(|(_, f)| f.is_empty()));
}

#[test]
fn finish_closes_once() {
    let (options, _) = quiet_options();
    let (sim, log) = spy_sim(&options);
    sim.finish().unwrap();
    assert_eq!(log.borrow().closes, 1);
}

#[test]
fn vcd_file_named_after_package() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = HarnessConfig::for_package("tutorial_1a");
    config.trace.dir = dir.path().to_path_buf();
    let (_, sink) = quiet_options();
    let options = SimOptions::from_config(&config).unwrap().with_diagnostics(sink);

    let mut h: Harness<StreamReg> = Harness::new(options);
    h.init(true).unwrap();
    h.prep("din", &[3]).unwrap();
    h.tick().unwrap();

    let path = dir.path().join("tutorial_1a.vcd");
    let after_one = std::fs::read_to_string(&path).unwrap();
    assert!(after_one.contains("$scope module tutorial_1a $end"));
    assert!(after_one.contains("#15"));

    h.tick().unwrap();
    h.finish().unwrap();
    let vcd = std::fs::read_to_string(&path).unwrap();
    for stamp in ["#8\n", "#10\n", "#15\n", "#18\n", "#20\n", "#25\n"] {
        assert!(vcd.contains(stamp), "missing {stamp}");
    }
    assert!(vcd.contains("$var wire 32 $ din $end"));
}

#[test]
fn init_without_trace_writes_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = HarnessConfig::for_package("quiet");
    config.trace.dir = dir.path().to_path_buf();
    let (_, sink) = quiet_options();
    let options = SimOptions::from_config(&config).unwrap().with_diagnostics(sink);

    let mut h: Harness<StreamReg> = Harness::new(options);
    h.init(false).unwrap();
    h.tick().unwrap();
    h.finish().unwrap();
    assert!(!dir.path().join("quiet.vcd").exists());
}
