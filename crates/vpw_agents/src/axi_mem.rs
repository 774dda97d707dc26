//! AXI4 slave backed by a sparse memory.
//!
//! Accepts up to [`QUEUE_DEPTH`] outstanding requests per address channel,
//! buffers every write beat (`wready` stays high), and serves one read burst
//! at a time. Each completed write burst is answered on B with OKAY. Only
//! INCR bursts of full-width beats are modelled: a different `awburst`,
//! `arburst`, `awsize` or `arsize`, when the model exposes them, fails the
//! tick. Memory never written reads as zero.
//!
//! Driven signals: `awready wready bid bresp bvalid arready rdata rid rresp
//! rlast rvalid`. Sampled: `awvalid awaddr awlen awid wvalid wdata wlast bready
//! arvalid araddr arlen arid rready`.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use tracing::trace;
use vpw_sim::{Agent, Drive, Snapshot};

use crate::axi::{Burst, BURST_INCR};
use crate::bus::{BusWidth, Channels, Interface, Shared};
use crate::error::AgentError;

/// Requests each address channel holds before dropping its ready.
pub const QUEUE_DEPTH: usize = 4;

/// A burst being served, and the next beat to move.
#[derive(Clone, Copy, Debug)]
struct Progress {
    burst: Burst,
    beat: usize,
}

impl Progress {
    fn new(burst: Burst) -> Self {
        Self { burst, beat: 0 }
    }
}

struct MemoryState {
    bus: Interface,
    width: BusWidth,
    aw: VecDeque<Burst>,
    ar: VecDeque<Burst>,
    beats_in: VecDeque<(u128, bool)>,
    writing: Option<Progress>,
    reading: Option<Progress>,
    responses: VecDeque<u64>,
    aw_ready: bool,
    ar_ready: bool,
    b_valid: bool,
    r_valid: bool,
    // keyed by beat index, byte address / beat bytes
    ram: BTreeMap<u64, u128>,
}

impl MemoryState {
    fn slot(&self, addr: u64) -> u64 {
        addr / self.width.beat_bytes()
    }

    /// Reads an address request, checking burst type and size.
    fn request(&self, io: &Snapshot, ch: &str) -> Result<Burst, AgentError> {
        for (field, want) in [("burst", BURST_INCR), ("size", self.width.size_code())] {
            let signal = format!("{ch}{field}");
            match self.bus.optional(io, &signal) {
                Some(value) if value != want => {
                    return Err(AgentError::Unsupported {
                        signal: format!("{}_{signal}", self.bus.prefix()),
                        value,
                    })
                }
                _ => {}
            }
        }
        let len = self.bus.scalar(io, &format!("{ch}len"))?;
        Ok(Burst {
            addr: self.bus.scalar(io, &format!("{ch}addr"))?,
            beats: len as usize + 1,
            id: self.bus.scalar(io, &format!("{ch}id"))?,
        })
    }

    /// Moves buffered write beats into memory, in AW order.
    fn retire_writes(&mut self) -> Result<(), AgentError> {
        loop {
            if self.writing.is_none() {
                self.writing = self.aw.pop_front().map(Progress::new);
            }
            let Some(mut progress) = self.writing else {
                return Ok(());
            };
            let Some((data, last)) = self.beats_in.pop_front() else {
                return Ok(());
            };
            let slot = self.slot(progress.burst.addr) + progress.beat as u64;
            self.ram.insert(slot, data);
            let done = progress.beat + 1 == progress.burst.beats;
            if last != done {
                return Err(AgentError::WriteLast {
                    beat: progress.beat,
                    len: progress.burst.beats,
                    last,
                });
            }
            progress.beat += 1;
            if done {
                trace!(
                    interface = self.bus.prefix(),
                    id = progress.burst.id,
                    beats = progress.burst.beats,
                    "write burst stored"
                );
                self.responses.push_back(progress.burst.id);
                self.writing = None;
            } else {
                self.writing = Some(progress);
            }
        }
    }

    fn drive(&mut self, drive: &mut dyn Drive) -> Result<(), AgentError> {
        self.aw_ready = self.aw.len() < QUEUE_DEPTH;
        self.ar_ready = self.ar.len() < QUEUE_DEPTH;
        self.bus.set(drive, "awready", u64::from(self.aw_ready))?;
        self.bus.set(drive, "arready", u64::from(self.ar_ready))?;

        let response = self.responses.front().copied();
        self.bus.set(drive, "bid", response.unwrap_or_default())?;
        self.bus.set(drive, "bvalid", u64::from(response.is_some()))?;
        self.b_valid = response.is_some();

        let beat = self.reading.map(|p| {
            let slot = self.slot(p.burst.addr) + p.beat as u64;
            let data = self.ram.get(&slot).copied().unwrap_or_default();
            (data, p.burst.id, p.beat + 1 == p.burst.beats)
        });
        let (data, id, last) = beat.unwrap_or_default();
        self.bus.set_data(drive, "rdata", self.width, data)?;
        self.bus.set(drive, "rid", id)?;
        self.bus.set(drive, "rlast", u64::from(last))?;
        self.bus.set(drive, "rvalid", u64::from(beat.is_some()))?;
        self.r_valid = beat.is_some();
        Ok(())
    }
}

impl Channels for MemoryState {
    fn interface(&self) -> &Interface {
        &self.bus
    }

    fn start(&mut self, drive: &mut dyn Drive) -> Result<(), AgentError> {
        self.bus.set(drive, "wready", 1)?;
        self.bus.set(drive, "bresp", 0)?;
        self.bus.set(drive, "rresp", 0)?;
        self.drive(drive)
    }

    fn step(&mut self, io: &Snapshot, drive: &mut dyn Drive) -> Result<(), AgentError> {
        if self.aw_ready && self.bus.high(io, "awvalid")? {
            let burst = self.request(io, "aw")?;
            self.aw.push_back(burst);
        }
        if self.bus.high(io, "wvalid")? {
            let data = self.bus.data(io, "wdata", self.width)?;
            let last = self.bus.high(io, "wlast")?;
            self.beats_in.push_back((data, last));
        }
        if self.ar_ready && self.bus.high(io, "arvalid")? {
            let burst = self.request(io, "ar")?;
            self.ar.push_back(burst);
        }
        if self.b_valid && self.bus.high(io, "bready")? {
            self.responses.pop_front();
        }
        if self.r_valid && self.bus.high(io, "rready")? {
            if let Some(p) = self.reading.as_mut() {
                p.beat += 1;
                if p.beat == p.burst.beats {
                    self.reading = None;
                }
            }
        }
        self.retire_writes()?;
        if self.reading.is_none() {
            self.reading = self.ar.pop_front().map(Progress::new);
        }
        self.drive(drive)
    }
}

/// Handle to an AXI4 memory slave agent.
///
/// Addresses are byte addresses, rounded down to a beat.
pub struct AxiMemory {
    state: Rc<RefCell<MemoryState>>,
}

impl AxiMemory {
    /// Creates an empty memory answering on the signals prefixed `interface`.
    pub fn new(interface: &str, data_bits: u32, addr_bits: u32) -> Result<Self, AgentError> {
        let width = BusWidth::new(data_bits, addr_bits)?;
        Ok(Self {
            state: Rc::new(RefCell::new(MemoryState {
                bus: Interface::new(interface),
                width,
                aw: VecDeque::new(),
                ar: VecDeque::new(),
                beats_in: VecDeque::new(),
                writing: None,
                reading: None,
                responses: VecDeque::new(),
                aw_ready: false,
                ar_ready: false,
                b_valid: false,
                r_valid: false,
                ram: BTreeMap::new(),
            })),
        })
    }

    /// The agent to register on the testbench.
    pub fn agent(&self) -> Box<dyn Agent> {
        Box::new(Shared(Rc::clone(&self.state)))
    }

    /// The beat stored at `addr`.
    pub fn peek(&self, addr: u64) -> u128 {
        let state = self.state.borrow();
        state.ram.get(&state.slot(addr)).copied().unwrap_or_default()
    }

    /// Stores one beat at `addr`, bypassing the bus.
    pub fn poke(&self, addr: u64, value: u128) {
        let mut state = self.state.borrow_mut();
        let slot = state.slot(addr);
        let value = value & state.width.data_mask();
        state.ram.insert(slot, value);
    }

    /// Number of beats ever written.
    pub fn len(&self) -> usize {
        self.state.borrow().ram.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().ram.is_empty()
    }
}
