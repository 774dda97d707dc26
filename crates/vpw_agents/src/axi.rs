//! AXI4 burst master.
//!
//! Transfers are INCR bursts of full-width beats. A queued burst must start
//! on a beat boundary, stay inside one 4KB page and carry at most 256 beats;
//! the blocking [`AxiMaster::write`] and [`AxiMaster::read`] split longer
//! transfers to satisfy that. Read data is matched to requests by id, and a
//! burst whose beats switch id or whose `rlast` disagrees with the requested
//! length fails the tick.
//!
//! Driven signals: `awaddr awlen awsize awburst awid awvalid wdata wstrb wlast
//! wvalid bready araddr arlen arsize arburst arid arvalid rready`. Sampled:
//! `awready wready bvalid bid arready rvalid rid rdata rlast`, plus
//! `bresp`/`rresp` when present.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use tracing::{debug, trace};
use vpw_sim::{Agent, Drive, SimModel, Snapshot, Testbench};

use crate::bus::{tick_until, BusWidth, Channels, Interface, Shared, DEFAULT_TIMEOUT};
use crate::error::AgentError;

/// Bursts may not cross a multiple of this many bytes.
pub const BOUNDARY: u64 = 4096;

/// Longest INCR burst in beats.
pub const MAX_BURST: usize = 256;

/// `AxBURST` encoding of an incrementing burst.
pub const BURST_INCR: u64 = 1;

/// One address-channel request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Burst {
    pub(crate) addr: u64,
    pub(crate) beats: usize,
    pub(crate) id: u64,
}

impl Burst {
    /// Validates a burst of `beats` full-width beats starting at `addr`.
    pub(crate) fn new(width: BusWidth, addr: u64, beats: usize, id: u64) -> Result<Self, AgentError> {
        if beats == 0 || beats > MAX_BURST {
            return Err(AgentError::BurstLength { beats });
        }
        width.check_aligned(addr)?;
        let span = beats as u64 * width.beat_bytes();
        if addr % BOUNDARY + span > BOUNDARY {
            return Err(AgentError::CrossesBoundary { addr, beats });
        }
        width.check_addr(addr + (span - 1))?;
        Ok(Self { addr, beats, id })
    }

    /// The `AxLEN` encoding.
    pub(crate) fn len_code(self) -> u64 {
        self.beats as u64 - 1
    }
}

/// Splits `beats` beats starting at `addr` into legal bursts.
///
/// Returns `(address, beats)` pairs in address order.
pub fn split_bursts(width: BusWidth, addr: u64, beats: usize) -> Result<Vec<(u64, usize)>, AgentError> {
    width.check_aligned(addr)?;
    let bytes = width.beat_bytes();
    let mut out = Vec::new();
    let mut addr = addr;
    let mut left = beats;
    while left > 0 {
        let to_page = ((BOUNDARY - addr % BOUNDARY) / bytes) as usize;
        let n = left.min(to_page).min(MAX_BURST);
        out.push((addr, n));
        left -= n;
        if left > 0 {
            addr = addr
                .checked_add(n as u64 * bytes)
                .ok_or(AgentError::AddressRange {
                    addr,
                    bits: width.addr_bits(),
                })?;
        }
    }
    Ok(out)
}

struct MasterState {
    bus: Interface,
    width: BusWidth,
    aw: VecDeque<Burst>,
    w: VecDeque<Vec<u128>>,
    w_beat: usize,
    ar: VecDeque<Burst>,
    aw_valid: bool,
    w_valid: bool,
    ar_valid: bool,
    writes_pending: usize,
    // beats per accepted AR, oldest first, by id
    expected: BTreeMap<u64, VecDeque<usize>>,
    rx: Vec<u128>,
    rx_id: u64,
    received: BTreeMap<u64, VecDeque<Vec<u128>>>,
}

impl MasterState {
    fn drive(&mut self, drive: &mut dyn Drive) -> Result<(), AgentError> {
        let bus = &self.bus;

        let aw = self.aw.front().copied();
        bus.set(drive, "awaddr", aw.map_or(0, |b| b.addr))?;
        bus.set(drive, "awlen", aw.map_or(0, Burst::len_code))?;
        bus.set(drive, "awid", aw.map_or(0, |b| b.id))?;
        bus.set(drive, "awvalid", u64::from(aw.is_some()))?;
        self.aw_valid = aw.is_some();

        let beat = self
            .w
            .front()
            .map(|burst| (burst[self.w_beat], self.w_beat + 1 == burst.len()));
        bus.set_data(drive, "wdata", self.width, beat.map_or(0, |(data, _)| data))?;
        bus.set(drive, "wlast", u64::from(beat.is_some_and(|(_, last)| last)))?;
        bus.set(drive, "wvalid", u64::from(beat.is_some()))?;
        self.w_valid = beat.is_some();

        let ar = self.ar.front().copied();
        bus.set(drive, "araddr", ar.map_or(0, |b| b.addr))?;
        bus.set(drive, "arlen", ar.map_or(0, Burst::len_code))?;
        bus.set(drive, "arid", ar.map_or(0, |b| b.id))?;
        bus.set(drive, "arvalid", u64::from(ar.is_some()))?;
        self.ar_valid = ar.is_some();
        Ok(())
    }

    fn receive_beat(&mut self, io: &Snapshot) -> Result<(), AgentError> {
        let id = self.bus.scalar(io, "rid")?;
        self.bus.check_resp(io, "R", id)?;
        if self.rx.is_empty() {
            if !self.expected.get(&id).is_some_and(|q| !q.is_empty()) {
                return Err(AgentError::UnexpectedResponse { channel: "R", id });
            }
            self.rx_id = id;
        } else if id != self.rx_id {
            return Err(AgentError::Interleaved {
                expected: self.rx_id,
                got: id,
            });
        }
        self.rx.push(self.bus.data(io, "rdata", self.width)?);

        let queue = self.expected.entry(id).or_default();
        let want = queue.front().copied().unwrap_or_default();
        let last = self.bus.high(io, "rlast")?;
        if last != (self.rx.len() == want) {
            return Err(AgentError::ReadLength {
                id,
                expected: want,
                got: self.rx.len(),
            });
        }
        if last {
            queue.pop_front();
            let burst = std::mem::take(&mut self.rx);
            trace!(interface = self.bus.prefix(), id, beats = burst.len(), "read burst complete");
            self.received.entry(id).or_default().push_back(burst);
        }
        Ok(())
    }
}

impl Channels for MasterState {
    fn interface(&self) -> &Interface {
        &self.bus
    }

    fn start(&mut self, drive: &mut dyn Drive) -> Result<(), AgentError> {
        let size = self.width.size_code();
        self.bus.set(drive, "awsize", size)?;
        self.bus.set(drive, "arsize", size)?;
        self.bus.set(drive, "awburst", BURST_INCR)?;
        self.bus.set(drive, "arburst", BURST_INCR)?;
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
            self.w_beat += 1;
            if self.w.front().is_some_and(|burst| self.w_beat == burst.len()) {
                self.w.pop_front();
                self.w_beat = 0;
            }
        }
        if self.ar_valid && self.bus.high(io, "arready")? {
            if let Some(burst) = self.ar.pop_front() {
                self.expected.entry(burst.id).or_default().push_back(burst.beats);
            }
        }
        if self.bus.high(io, "bvalid")? {
            let id = self.bus.scalar(io, "bid")?;
            self.bus.check_resp(io, "B", id)?;
            self.writes_pending = self
                .writes_pending
                .checked_sub(1)
                .ok_or(AgentError::UnexpectedResponse { channel: "B", id })?;
        }
        if self.bus.high(io, "rvalid")? {
            self.receive_beat(io)?;
        }
        self.drive(drive)
    }
}

/// Handle to an AXI4 burst master agent.
///
/// Addresses are byte addresses; data is one `u128` per beat, masked to the
/// data width.
pub struct AxiMaster {
    state: Rc<RefCell<MasterState>>,
    timeout: u64,
}

impl AxiMaster {
    /// Creates a master for the signals prefixed `interface`.
    pub fn new(interface: &str, data_bits: u32, addr_bits: u32) -> Result<Self, AgentError> {
        let width = BusWidth::new(data_bits, addr_bits)?;
        Ok(Self {
            state: Rc::new(RefCell::new(MasterState {
                bus: Interface::new(interface),
                width,
                aw: VecDeque::new(),
                w: VecDeque::new(),
                w_beat: 0,
                ar: VecDeque::new(),
                aw_valid: false,
                w_valid: false,
                ar_valid: false,
                writes_pending: 0,
                expected: BTreeMap::new(),
                rx: Vec::new(),
                rx_id: 0,
                received: BTreeMap::new(),
            })),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Sets how many ticks the blocking transfers wait.
    pub fn with_timeout(mut self, ticks: u64) -> Self {
        self.timeout = ticks;
        self
    }

    /// The agent to register on the testbench.
    pub fn agent(&self) -> Box<dyn Agent> {
        Box::new(Shared(Rc::clone(&self.state)))
    }

    /// Queues one write burst, one element of `data` per beat.
    pub fn send_write(&self, addr: u64, data: Vec<u128>, id: u64) -> Result<(), AgentError> {
        let mut state = self.state.borrow_mut();
        let burst = Burst::new(state.width, addr, data.len(), id)?;
        debug!(interface = state.bus.prefix(), addr, beats = burst.beats, id, "queue write burst");
        state.aw.push_back(burst);
        state.w.push_back(data);
        state.writes_pending += 1;
        Ok(())
    }

    /// Queues one read burst of `beats` beats.
    pub fn send_read(&self, addr: u64, beats: usize, id: u64) -> Result<(), AgentError> {
        let mut state = self.state.borrow_mut();
        let burst = Burst::new(state.width, addr, beats, id)?;
        debug!(interface = state.bus.prefix(), addr, beats, id, "queue read burst");
        state.ar.push_back(burst);
        Ok(())
    }

    /// Takes the oldest completed read burst for `id`.
    pub fn recv_read(&self, id: u64) -> Option<Vec<u128>> {
        self.state
            .borrow_mut()
            .received
            .get_mut(&id)
            .and_then(VecDeque::pop_front)
    }

    /// Write bursts not yet acknowledged on the B channel.
    pub fn writes_pending(&self) -> usize {
        self.state.borrow().writes_pending
    }

    /// Writes `data` from `addr` onward, one element per beat, and ticks until
    /// every burst has been acknowledged.
    pub fn write<M: SimModel>(
        &self,
        tb: &mut Testbench<M>,
        addr: u64,
        data: &[u128],
        id: u64,
    ) -> Result<(), AgentError> {
        let width = self.state.borrow().width;
        let mut rest = data;
        for (burst_addr, beats) in split_bursts(width, addr, data.len())? {
            let (head, tail) = rest.split_at(beats);
            self.send_write(burst_addr, head.to_vec(), id)?;
            rest = tail;
        }
        tick_until(tb, self.timeout, || self.state.borrow().writes_pending == 0)
    }

    /// Reads `beats` beats from `addr` onward under `id`.
    pub fn read<M: SimModel>(
        &self,
        tb: &mut Testbench<M>,
        addr: u64,
        beats: usize,
        id: u64,
    ) -> Result<Vec<u128>, AgentError> {
        let width = self.state.borrow().width;
        for (burst_addr, n) in split_bursts(width, addr, beats)? {
            self.send_read(burst_addr, n, id)?;
        }
        let mut data = Vec::with_capacity(beats);
        tick_until(tb, self.timeout, || {
            while let Some(burst) = self.recv_read(id) {
                data.extend(burst);
            }
            data.len() >= beats
        })?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w128() -> BusWidth {
        BusWidth::new(128, 16).unwrap()
    }

    #[test]
    fn burst_rules() {
        let w = w128();
        assert!(Burst::new(w, 0xff0, 1, 0).is_ok());
        assert!(matches!(
            Burst::new(w, 0xff0, 2, 0),
            Err(AgentError::CrossesBoundary { addr: 0xff0, beats: 2 })
        ));
        assert!(matches!(Burst::new(w, 0x8, 1, 0), Err(AgentError::Misaligned { .. })));
        assert!(matches!(Burst::new(w, 0, 0, 0), Err(AgentError::BurstLength { beats: 0 })));
        assert!(matches!(Burst::new(w, 0, 257, 0), Err(AgentError::BurstLength { .. })));
        assert!(matches!(
            Burst::new(w, 0xfff0, 2, 0),
            Err(AgentError::CrossesBoundary { .. })
        ));
        assert_eq!(Burst::new(w, 0x100, 16, 3).unwrap().len_code(), 15);
    }

    #[test]
    fn burst_must_fit_address_width() {
        let w = BusWidth::new(32, 12).unwrap();
        assert!(Burst::new(w, 0xffc, 1, 0).is_ok());
        let narrow = BusWidth::new(32, 8).unwrap();
        assert!(matches!(
            Burst::new(narrow, 0xfc, 2, 0),
            Err(AgentError::AddressRange { addr: 0x103, bits: 8 })
        ));
    }

    #[test]
    fn split_at_page_boundary() {
        let bursts = split_bursts(w128(), 0xfe0, 4).unwrap();
        assert_eq!(bursts, [(0xfe0, 2), (0x1000, 2)]);
    }

    #[test]
    fn split_at_burst_limit() {
        let bytes8 = BusWidth::new(8, 32).unwrap();
        let bursts = split_bursts(bytes8, 0, 600).unwrap();
        assert_eq!(bursts, [(0, 256), (256, 256), (512, 88)]);
    }

    #[test]
    fn split_rejects_misaligned_start() {
        assert!(matches!(
            split_bursts(w128(), 0x104, 2),
            Err(AgentError::Misaligned { addr: 0x104, bytes: 16 })
        ));
        assert!(split_bursts(w128(), 0x100, 0).unwrap().is_empty());
    }

    #[test]
    fn send_write_counts_pending() {
        let master = AxiMaster::new("m_axi", 128, 16).unwrap();
        master.send_write(0x100, vec![1, 2, 3], 1).unwrap();
        assert_eq!(master.writes_pending(), 1);
        assert!(master.send_write(0x100, Vec::new(), 1).is_err());
        assert_eq!(master.writes_pending(), 1);
        assert_eq!(master.recv_read(1), None);
    }
}
