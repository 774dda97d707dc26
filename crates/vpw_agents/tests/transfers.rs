//! Bus agents driving the AXI reference models through a testbench.

use std::sync::Arc;

use vpw_agents::{AgentError, AxiLiteMaster, AxiMaster, AxiMemory};
use vpw_diagnostics::DiagnosticSink;
use vpw_models::{AxiBridge, RegFile};
use vpw_sim::{AgentStatus, Drive, SimError, SimModel, SimOptions, Simulation, Snapshot, Testbench};

fn bench<M: SimModel>(model: M) -> (Testbench<M>, Arc<DiagnosticSink>) {
    let sink = Arc::new(DiagnosticSink::new());
    let options = SimOptions::default().with_diagnostics(Arc::clone(&sink));
    (Testbench::new(Simulation::init(model, &options).unwrap()), sink)
}

/// A bridge with a burst master on `s_axi` and a memory on `m_axi`.
fn memory_bench() -> (Testbench<AxiBridge>, AxiMaster, AxiMemory, Arc<DiagnosticSink>) {
    let (mut tb, sink) = bench(AxiBridge::default());
    let master = AxiMaster::new("s_axi", 128, 16).unwrap();
    let memory = AxiMemory::new("m_axi", 128, 16).unwrap();
    tb.register(master.agent()).unwrap();
    tb.register(memory.agent()).unwrap();
    (tb, master, memory, sink)
}

/// Beats that use all four 32-bit words.
fn pattern(beats: usize) -> Vec<u128> {
    (0..beats as u128)
        .map(|n| (n + 1) << 96 | (n * 3) << 64 | 0xabcd_0000 | n)
        .collect()
}

#[test]
fn lite_write_then_read_back() {
    let (mut tb, sink) = bench(RegFile::default());
    let master = AxiLiteMaster::new("s_axi", 32, 6).unwrap();
    tb.register(master.agent()).unwrap();

    for index in 0..16u64 {
        master.write(&mut tb, index, u128::from(index) * 0x0101_0101).unwrap();
    }
    for index in [15u64, 0, 7] {
        assert_eq!(master.read(&mut tb, index).unwrap(), u128::from(index) * 0x0101_0101);
    }
    assert_eq!(sink.warning_count(), 0);

    let model = tb.finish().unwrap();
    assert_eq!(model.register(9), 0x0909_0909);
}

#[test]
fn lite_queued_writes_complete_in_order() {
    let (mut tb, _) = bench(RegFile::default());
    let master = AxiLiteMaster::new("s_axi", 32, 6).unwrap();
    tb.register(master.agent()).unwrap();

    master.send_write(2, 1).unwrap();
    master.send_write(2, 2).unwrap();
    master.send_write(2, 3).unwrap();
    assert_eq!(master.writes_pending(), 3);
    tb.idle(10).unwrap();
    assert_eq!(master.writes_pending(), 0);

    master.send_read(2).unwrap();
    master.send_read(1).unwrap();
    tb.idle(10).unwrap();
    assert_eq!(master.recv_read(), Some(3));
    assert_eq!(master.recv_read(), Some(0));
    assert_eq!(master.recv_read(), None);
}

#[test]
fn burst_write_read_pair() {
    let (mut tb, master, memory, sink) = memory_bench();
    let data = pattern(20);

    master.write(&mut tb, 256, &data, 1).unwrap();
    assert_eq!(memory.len(), 20);
    assert_eq!(memory.peek(256), data[0]);
    assert_eq!(memory.peek(256 + 19 * 16), data[19]);

    let received = master.read(&mut tb, 256, data.len(), 1).unwrap();
    assert_eq!(received, data);
    assert_eq!(sink.warning_count(), 0);

    tb.idle(5).unwrap();
    let bridge = tb.finish().unwrap();
    assert_eq!(bridge.write_beats, 20);
    assert_eq!(bridge.read_beats, 20);
}

#[test]
fn transfer_across_page_boundary() {
    let (mut tb, master, memory, _) = memory_bench();
    let data = pattern(6);

    master.write(&mut tb, 0xfe0, &data, 0).unwrap();
    assert_eq!(memory.peek(0xff0), data[1]);
    assert_eq!(memory.peek(0x1000), data[2]);

    assert_eq!(master.read(&mut tb, 0xfe0, 6, 0).unwrap(), data);
}

#[test]
fn reads_sorted_by_id() {
    let (mut tb, master, memory, _) = memory_bench();
    memory.poke(0x00, 10);
    memory.poke(0x10, 11);
    memory.poke(0x40, 40);

    master.send_read(0x00, 2, 2).unwrap();
    master.send_read(0x40, 1, 3).unwrap();
    tb.idle(12).unwrap();
    assert_eq!(master.recv_read(3), Some(vec![40]));
    assert_eq!(master.recv_read(2), Some(vec![10, 11]));
    assert_eq!(master.recv_read(2), None);
}

#[test]
fn unwritten_memory_reads_zero() {
    let (mut tb, master, _, _) = memory_bench();
    assert_eq!(master.read(&mut tb, 0x200, 3, 0).unwrap(), vec![0, 0, 0]);
}

#[test]
fn write_without_slave_times_out() {
    let (mut tb, _) = bench(AxiBridge::default());
    let master = AxiMaster::new("s_axi", 128, 16).unwrap().with_timeout(50);
    tb.register(master.agent()).unwrap();

    let err = master.write(&mut tb, 0, &[1, 2], 0).unwrap_err();
    assert!(matches!(err, AgentError::Timeout { ticks: 50 }));
    assert_eq!(tb.sim().timestamp(), 50);
}

#[test]
fn misaligned_burst_rejected_before_ticking() {
    let (mut tb, master, _, _) = memory_bench();
    let err = master.write(&mut tb, 0x108, &[1], 0).unwrap_err();
    assert!(matches!(err, AgentError::Misaligned { addr: 0x108, bytes: 16 }));
    assert_eq!(master.writes_pending(), 0);
    assert_eq!(tb.sim().timestamp(), 0);
}

#[test]
fn read_data_without_request_fails_tick() {
    let (mut tb, _) = bench(AxiBridge::default());
    let master = AxiMaster::new("s_axi", 128, 16).unwrap();
    tb.register(master.agent()).unwrap();
    let rogue = |_: &Snapshot, drive: &mut dyn Drive| -> Result<AgentStatus, SimError> {
        drive.prep("m_axi_rvalid", &[1])?;
        drive.prep("m_axi_rid", &[3])?;
        drive.prep("m_axi_rlast", &[1])?;
        Ok(AgentStatus::Continue)
    };
    tb.register(Box::new(rogue)).unwrap();

    tb.tick().unwrap();
    match tb.tick() {
        Err(SimError::Agent { interface, source }) => {
            assert_eq!(interface, "s_axi");
            assert_eq!(source.to_string(), "unexpected R response with id 3");
        }
        other => panic!("expected an agent error, got {other:?}"),
    }
}

#[test]
fn lite_master_on_wrong_model_reports_missing_signal() {
    let (mut tb, _) = bench(AxiBridge::default());
    let master = AxiLiteMaster::new("lite", 32, 6).unwrap();
    tb.register(master.agent()).unwrap();
    let err = tb.tick().unwrap_err();
    assert_eq!(
        err.to_string(),
        "agent on 'lite': signal 'lite_bvalid' is not in the snapshot"
    );
}
