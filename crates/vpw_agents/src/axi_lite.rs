//! AXI4-Lite master.
//!
//! Addresses are register indices: index `i` goes out as byte address
//! `i * data_bits / 8`. Each channel is an independent queue, so a write's
//! address and data may be accepted on different ticks. `bready` and
//! `rready` are held high, every write uses a full strobe and `AxPROT` is 0.
//!
//! Driven signals: `awaddr awprot awvalid wdata wstrb wvalid bready araddr
//! arprot arvalid rready`. Sampled: `awready wready bvalid arready rvalid
//! rdata`, plus `bresp`/`rresp` when the model has them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace};
use vpw_sim::{Agent, Drive, SimModel, Snapshot, Testbench};

use crate::bus::{tick_until, BusWidth, Channels, Interface, Shared, DEFAULT_TIMEOUT};
use crate::error::AgentError;

struct LiteState {
    bus: Interface,
    width: BusWidth,
    aw: VecDeque<u64>,
    w: VecDeque<u128>,
    ar: VecDeque<u64>,
    r: VecDeque<u128>,
    aw_valid: bool,
    w_valid: bool,
    ar_valid: bool,
    writes_pending: usize,
    reads_pending: usize,
}

impl LiteState {
    fn drive(&mut self, drive: &mut dyn Drive) -> Result<(), AgentError> {
        let bus = &self.bus;

        let aw = self.aw.front().copied();
        bus.set(drive, "awaddr", aw.unwrap_or_default())?;
        bus.set(drive, "awvalid", u64::from(aw.is_some()))?;
        self.aw_valid = aw.is_some();

        let w = self.w.front().copied();
        bus.set_data(drive, "wdata", self.width, w.unwrap_or_default())?;
        bus.set(drive, "wvalid", u64::from(w.is_some()))?;
        self.w_valid = w.is_some();

        let ar = self.ar.front().copied();
        bus.set(drive, "araddr", ar.unwrap_or_default())?;
        bus.set(drive, "arvalid", u64::from(ar.is_some()))?;
        self.ar_valid = ar.is_some();
        Ok(())
    }
}

impl Channels for LiteState {
    fn interface(&self) -> &Interface {
        &self.bus
    }

    fn start(&mut self, drive: &mut dyn Drive) -> Result<(), AgentError> {
        self.bus.set(drive, "awprot", 0)?;
        self.bus.set(drive, "arprot", 0)?;
        self.bus.set(drive, "wstrb", self.width.full_strobe())?;
        self.bus.set(drive, "bready", 1)?;
        self.bus.set(drive, "rready", 1)?;
        self.drive(drive)
    }

    fn step(&mut self, io: &Snapshot, drive: &mut dyn Drive) -> Result<(), AgentError> {
        if self.aw_valid && self.bus.high(io, "awready")? {
            self.aw.pop_front();
        }
        if self.w_valid && self.bus.high(io, "wready")? {
            self.w.pop_front();
        }
        if self.ar_valid && self.bus.high(io, "arready")? {
            self.ar.pop_front();
        }
        if self.bus.high(io, "bvalid")? {
            self.bus.check_resp(io, "B", 0)?;
            self.writes_pending = self
                .writes_pending
                .checked_sub(1)
                .ok_or(AgentError::UnexpectedResponse { channel: "B", id: 0 })?;
            trace!(interface = self.bus.prefix(), "write acknowledged");
        }
        if self.bus.high(io, "rvalid")? {
            self.bus.check_resp(io, "R", 0)?;
            self.reads_pending = self
                .reads_pending
                .checked_sub(1)
                .ok_or(AgentError::UnexpectedResponse { channel: "R", id: 0 })?;
            let data = self.bus.data(io, "rdata", self.width)?;
            self.r.push_back(data);
        }
        self.drive(drive)
    }
}

/// Handle to an AXI4-Lite master agent.
///
/// ```no_run
/// # use vpw_agents::AxiLiteMaster;
/// # use vpw_sim::{SimModel, Testbench};
/// # fn demo<M: SimModel>(tb: &mut Testbench<M>) -> Result<(), vpw_agents::AgentError> {
/// let master = AxiLiteMaster::new("s_axi", 32, 6)?;
/// tb.register(master.agent())?;
/// master.write(tb, 3, 0xdead_beef)?;
/// assert_eq!(master.read(tb, 3)?, 0xdead_beef);
/// # Ok(())
/// # }
/// ```
pub struct AxiLiteMaster {
    state: Rc<RefCell<LiteState>>,
    timeout: u64,
}

impl AxiLiteMaster {
    /// Creates a master for the signals prefixed `interface`.
    pub fn new(interface: &str, data_bits: u32, addr_bits: u32) -> Result<Self, AgentError> {
        let width = BusWidth::new(data_bits, addr_bits)?;
        Ok(Self {
            state: Rc::new(RefCell::new(LiteState {
                bus: Interface::new(interface),
                width,
                aw: VecDeque::new(),
                w: VecDeque::new(),
                ar: VecDeque::new(),
                r: VecDeque::new(),
                aw_valid: false,
                w_valid: false,
                ar_valid: false,
                writes_pending: 0,
                reads_pending: 0,
            })),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Sets how many ticks [`write`](Self::write) and [`read`](Self::read)
    /// wait for a response.
    pub fn with_timeout(mut self, ticks: u64) -> Self {
        self.timeout = ticks;
        self
    }

    /// The agent to register on the testbench.
    pub fn agent(&self) -> Box<dyn Agent> {
        Box::new(Shared(Rc::clone(&self.state)))
    }

    /// Queues a write of `value` to register `index` without waiting.
    pub fn send_write(&self, index: u64, value: u128) -> Result<(), AgentError> {
        let mut state = self.state.borrow_mut();
        let addr = state.width.beat_addr(index)?;
        debug!(interface = state.bus.prefix(), addr, "queue write");
        state.aw.push_back(addr);
        state.w.push_back(value);
        state.writes_pending += 1;
        Ok(())
    }

    /// Queues a read of register `index` without waiting.
    pub fn send_read(&self, index: u64) -> Result<(), AgentError> {
        let mut state = self.state.borrow_mut();
        let addr = state.width.beat_addr(index)?;
        debug!(interface = state.bus.prefix(), addr, "queue read");
        state.ar.push_back(addr);
        state.reads_pending += 1;
        Ok(())
    }

    /// Takes the oldest read result, if one has arrived.
    pub fn recv_read(&self) -> Option<u128> {
        self.state.borrow_mut().r.pop_front()
    }

    /// Writes not yet acknowledged on the B channel.
    pub fn writes_pending(&self) -> usize {
        self.state.borrow().writes_pending
    }

    /// Writes `value` to register `index` and ticks until every queued
    /// write has been acknowledged.
    pub fn write<M: SimModel>(
        &self,
        tb: &mut Testbench<M>,
        index: u64,
        value: u128,
    ) -> Result<(), AgentError> {
        self.send_write(index, value)?;
        tick_until(tb, self.timeout, || self.state.borrow().writes_pending == 0)
    }

    /// Reads register `index`, ticking until a result arrives.
    pub fn read<M: SimModel>(&self, tb: &mut Testbench<M>, index: u64) -> Result<u128, AgentError> {
        self.send_read(index)?;
        let mut value = None;
        tick_until(tb, self.timeout, || {
            value = self.recv_read();
            value.is_some()
        })?;
        value.ok_or(AgentError::Timeout { ticks: self.timeout })
    }
}
