//! Models and recorder doubles shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use vpw_common::SignalValue;
use vpw_diagnostics::DiagnosticSink;
use vpw_sim::{port_registry, SimError, SimModel, SimOptions, TraceRecorder, TraceVar};

/// A stream register: `dout` follows `din` on each rising edge unless in reset.
#[derive(Default)]
pub struct StreamReg {
    pub clk: u8,
    pub rst: u8,
    pub valid: u8,
    pub din: u32,
    pub dout: u32,
    pub wide_bus: [u32; 4],
    pub wide_out: [u32; 4],
    pub evals: u32,
    pub last_time: u64,
    prev_clk: u8,
}

port_registry!(StreamReg {
    clock clk[0:0]: u8,
    input rst[0:0]: u8,
    input valid[0:0]: u8,
    input din: u32,
    output dout: u32,
    input wide_bus: [u32; 4],
    output wide_out: [u32; 4],
});

impl SimModel for StreamReg {
    fn eval(&mut self) {
        self.evals += 1;
        self.wide_out = self.wide_bus;
        if self.clk == 1 && self.prev_clk == 0 {
            if self.rst == 1 {
                self.dout = 0;
            } else if self.valid == 1 {
                self.dout = self.din;
            }
        }
        self.prev_clk = self.clk;
    }

    fn set_time(&mut self, time: u64) {
        self.last_time = time;
    }
}

/// What a [`SpyRecorder`] saw.
#[derive(Default, Debug)]
pub struct SpyLog {
    pub declared: Vec<TraceVar>,
    pub scope: String,
    pub dumps: Vec<(u64, Vec<SignalValue>)>,
    /// Number of dumps seen at each flush.
    pub flushes: Vec<usize>,
    pub closes: usize,
}

/// A recorder double sharing its log with the test.
pub struct SpyRecorder(pub Rc<RefCell<SpyLog>>);

impl TraceRecorder for SpyRecorder {
    fn declare(&mut self, scope: &str, vars: &[TraceVar]) -> Result<(), SimError> {
        let mut log = self.0.borrow_mut();
        log.scope = scope.to_string();
        log.declared.extend_from_slice(vars);
        Ok(())
    }

    fn dump(&mut self, time: u64, frame: &[SignalValue]) -> Result<(), SimError> {
        self.0.borrow_mut().dumps.push((time, frame.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SimError> {
        let mut log = self.0.borrow_mut();
        let n = log.dumps.len();
        log.flushes.push(n);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SimError> {
        self.0.borrow_mut().closes += 1;
        Ok(())
    }
}

/// Options with a silent diagnostic sink the test can inspect.
pub fn quiet_options() -> (SimOptions, Arc<DiagnosticSink>) {
    let sink = Arc::new(DiagnosticSink::new());
    let options = SimOptions::default().with_diagnostics(Arc::clone(&sink));
    (options, sink)
}
