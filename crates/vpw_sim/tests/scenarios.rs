//! Driver-level scenarios against the four-call harness protocol.

mod common;

use common::{quiet_options, StreamReg};
use vpw_diagnostics::DiagnosticCode;
use vpw_sim::{Harness, SimError, Simulation};

#[test]
fn reset_scenario_snapshots_are_independent() {
    let (options, _) = quiet_options();
    let mut h: Harness<StreamReg> = Harness::new(options);
    h.init(false).unwrap();
    h.prep("rst", &[1]).unwrap();
    let s1 = h.tick().unwrap();
    assert_eq!(s1["rst"], 1u64);
    h.prep("rst", &[0]).unwrap();
    let s2 = h.tick().unwrap();
    assert_eq!(s2["rst"], 0u64);
    assert_eq!(s1["rst"], 1u64);
    h.finish().unwrap();
}

#[test]
fn wide_bus_round_trips_in_word_order() {
    let (options, _) = quiet_options();
    let mut sim = Simulation::init(StreamReg::default(), &options).unwrap();
    sim.prep("wide_bus", &[1, 2, 3, 4]).unwrap();
    let s = sim.tick().unwrap();
    assert_eq!(s["wide_bus"], [1u64, 2, 3, 4]);
    assert_eq!(s["wide_out"], [1u64, 2, 3, 4]);
}

#[test]
fn scalar_input_reads_back_after_tick() {
    let (options, _) = quiet_options();
    let mut sim = Simulation::init(StreamReg::default(), &options).unwrap();
    for (port, value) in [("rst", 1u64), ("valid", 1), ("din", 0xdead_beef)] {
        sim.prep(port, &[value]).unwrap();
        assert_eq!(sim.tick().unwrap()[port], value);
    }
}

#[test]
fn values_truncate_to_port_width() {
    let (options, _) = quiet_options();
    let mut sim = Simulation::init(StreamReg::default(), &options).unwrap();
    sim.prep("valid", &[0x101]).unwrap();
    sim.prep("din", &[0x1_0000_0002]).unwrap();
    sim.prep("wide_bus", &[0x1_0000_0007]).unwrap();
    let s = sim.tick().unwrap();
    assert_eq!(s["valid"], 1u64);
    assert_eq!(s["din"], 2u64);
    assert_eq!(s["wide_bus"], [7u64, 0, 0, 0]);
}

#[test]
fn unknown_port_is_harmless() {
    let (options, sink) = quiet_options();
    let mut sim = Simulation::init(StreamReg::default(), &options).unwrap();
    sim.prep("din", &[5]).unwrap();
    sim.prep("valid", &[1]).unwrap();
    let before = sim.update();
    sim.prep("not_a_real_port", &[0]).unwrap();
    assert_eq!(sim.update(), before);
    let s = sim.tick().unwrap();
    assert_eq!(s["din"], 5u64);
    assert_eq!(s["valid"], 1u64);
    let diags = sink.take_all();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, DiagnosticCode::UNKNOWN_PORT);
    assert_eq!(diags[0].message, "requested port 'not_a_real_port' not found.");
}

#[test]
fn update_is_idempotent_within_a_settled_state() {
    let (options, _) = quiet_options();
    let mut sim = Simulation::init(StreamReg::default(), &options).unwrap();
    sim.prep("din", &[9]).unwrap();
    sim.tick().unwrap();
    assert_eq!(sim.update(), sim.update());
}

#[test]
fn tick_returns_pre_edge_state() {
    let (options, _) = quiet_options();
    let mut sim = Simulation::init(StreamReg::default(), &options).unwrap();
    sim.prep("valid", &[1]).unwrap();
    sim.prep("din", &[42]).unwrap();
    // dout latches on this tick's rising edge, after the snapshot
    assert_eq!(sim.tick().unwrap()["dout"], 0u64);
    assert_eq!(sim.tick().unwrap()["dout"], 42u64);
}

#[test]
fn three_evaluations_per_tick() {
    let (options, _) = quiet_options();
    let mut sim = Simulation::init(StreamReg::default(), &options).unwrap();
    sim.tick().unwrap();
    sim.tick().unwrap();
    assert_eq!(sim.model().evals, 6);
    assert_eq!(sim.model().last_time, 25);
    assert_eq!(sim.model().clk, 0);
}

#[test]
fn inputs_apply_in_prep_order_between_ticks() {
    let (options, _) = quiet_options();
    let mut sim = Simulation::init(StreamReg::default(), &options).unwrap();
    sim.prep("din", &[1]).unwrap();
    sim.prep("din", &[2]).unwrap();
    assert_eq!(sim.tick().unwrap()["din"], 2u64);
}

#[test]
fn tick_before_init_is_not_ignored() {
    let (options, _) = quiet_options();
    let mut h: Harness<StreamReg> = Harness::new(options);
    assert!(matches!(h.tick(), Err(SimError::NotInitialized)));
}

#[test]
fn empty_prep_is_rejected() {
    let (options, _) = quiet_options();
    let mut h: Harness<StreamReg> = Harness::new(options);
    h.init(false).unwrap();
    assert!(matches!(h.prep("rst", &[]), Err(SimError::EmptyValue { .. })));
}

#[test]
fn independent_simulations_coexist() {
    let (options, _) = quiet_options();
    let mut a = Simulation::init(StreamReg::default(), &options).unwrap();
    let mut b = Simulation::init(StreamReg::default(), &options).unwrap();
    a.prep("din", &[1]).unwrap();
    b.prep("din", &[2]).unwrap();
    a.tick().unwrap();
    assert_eq!(a.update()["din"], 1u64);
    assert_eq!(b.update()["din"], 2u64);
    assert_eq!(a.timestamp(), 1);
    assert_eq!(b.timestamp(), 0);
}
