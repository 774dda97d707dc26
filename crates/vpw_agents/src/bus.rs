//! Signal naming, widths and stepping shared by every bus agent.
//!
//! An agent's state lives behind `Rc<RefCell<_>>`: the testbench holds one
//! reference through the registered [`Agent`], the test holds the other
//! through the agent's handle and queues transfers on it between ticks.

use std::cell::RefCell;
use std::rc::Rc;

use vpw_common::{pack, unpack, SignalValue, MAX_PACK_BITS};
use vpw_sim::{Agent, AgentStatus, Drive, SimError, SimModel, Snapshot, Testbench};

use crate::error::AgentError;

/// Ticks a blocking transfer waits before giving up with
/// [`AgentError::Timeout`].
pub const DEFAULT_TIMEOUT: u64 = 10_000;

/// Data and address widths of one bus interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusWidth {
    data_bits: u32,
    addr_bits: u32,
}

impl BusWidth {
    /// Validates a data width (8 to 128 bits, power-of-two bytes) and an
    /// address width (1 to 64 bits).
    pub fn new(data_bits: u32, addr_bits: u32) -> Result<Self, AgentError> {
        let bytes_ok = data_bits % 8 == 0 && (data_bits / 8).is_power_of_two();
        if data_bits == 0 || data_bits > MAX_PACK_BITS || !bytes_ok {
            return Err(AgentError::DataWidth { bits: data_bits });
        }
        if addr_bits == 0 || addr_bits > 64 {
            return Err(AgentError::AddrWidth { bits: addr_bits });
        }
        Ok(Self {
            data_bits,
            addr_bits,
        })
    }

    /// Width of the data channels in bits.
    pub fn data_bits(self) -> u32 {
        self.data_bits
    }

    /// Width of the address channels in bits.
    pub fn addr_bits(self) -> u32 {
        self.addr_bits
    }

    /// Bytes moved per beat.
    pub fn beat_bytes(self) -> u64 {
        u64::from(self.data_bits / 8)
    }

    /// The `AxSIZE` encoding of a full-width beat.
    pub fn size_code(self) -> u64 {
        u64::from(self.beat_bytes().trailing_zeros())
    }

    /// A write strobe with every byte lane enabled.
    pub fn full_strobe(self) -> u64 {
        (1u64 << self.beat_bytes()) - 1
    }

    pub(crate) fn data_mask(self) -> u128 {
        u128::MAX >> (u128::BITS - self.data_bits)
    }

    /// Returns `addr` if it fits in the address width.
    pub fn check_addr(self, addr: u64) -> Result<u64, AgentError> {
        if self.addr_bits < 64 && addr >> self.addr_bits != 0 {
            return Err(AgentError::AddressRange {
                addr,
                bits: self.addr_bits,
            });
        }
        Ok(addr)
    }

    /// Fails unless `addr` starts a beat.
    pub fn check_aligned(self, addr: u64) -> Result<(), AgentError> {
        let bytes = self.beat_bytes();
        if addr % bytes != 0 {
            return Err(AgentError::Misaligned { addr, bytes });
        }
        Ok(())
    }

    /// Byte address of beat `index`, checked against the address width.
    pub fn beat_addr(self, index: u64) -> Result<u64, AgentError> {
        let addr = index
            .checked_mul(self.beat_bytes())
            .ok_or(AgentError::AddressRange {
                addr: u64::MAX,
                bits: self.addr_bits,
            })?;
        self.check_addr(addr)
    }
}

/// The `<prefix>_<signal>` names of one interface on a model.
#[derive(Clone, Debug)]
pub(crate) struct Interface {
    prefix: String,
}

impl Interface {
    pub(crate) fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    fn signal(&self, name: &str) -> String {
        format!("{}_{name}", self.prefix)
    }

    pub(crate) fn set(&self, drive: &mut dyn Drive, name: &str, value: u64) -> Result<(), AgentError> {
        drive.prep(&self.signal(name), &[value])?;
        Ok(())
    }

    pub(crate) fn set_data(
        &self,
        drive: &mut dyn Drive,
        name: &str,
        width: BusWidth,
        value: u128,
    ) -> Result<(), AgentError> {
        let words = pack(width.data_bits(), value & width.data_mask())?;
        drive.prep(&self.signal(name), &words)?;
        Ok(())
    }

    fn value<'a>(&self, io: &'a Snapshot, name: &str) -> Result<&'a SignalValue, AgentError> {
        let full = self.signal(name);
        io.get(&full).ok_or(AgentError::MissingSignal { name: full })
    }

    pub(crate) fn scalar(&self, io: &Snapshot, name: &str) -> Result<u64, AgentError> {
        Ok(match self.value(io, name)? {
            SignalValue::Scalar(v) => *v,
            SignalValue::Words(words) => words.first().copied().unwrap_or_default(),
        })
    }

    pub(crate) fn high(&self, io: &Snapshot, name: &str) -> Result<bool, AgentError> {
        Ok(self.scalar(io, name)? != 0)
    }

    /// Reads a signal the interface may leave out, such as `awburst`.
    pub(crate) fn optional(&self, io: &Snapshot, name: &str) -> Option<u64> {
        io.get(&self.signal(name)).and_then(SignalValue::as_scalar)
    }

    pub(crate) fn data(&self, io: &Snapshot, name: &str, width: BusWidth) -> Result<u128, AgentError> {
        let words = match self.value(io, name)? {
            SignalValue::Scalar(v) => std::slice::from_ref(v),
            SignalValue::Words(words) => words.as_slice(),
        };
        Ok(unpack(width.data_bits(), words)? & width.data_mask())
    }

    /// Fails on SLVERR or DECERR.
    pub(crate) fn check_resp(
        &self,
        io: &Snapshot,
        channel: &'static str,
        id: u64,
    ) -> Result<(), AgentError> {
        let resp = match channel {
            "B" => self.optional(io, "bresp"),
            _ => self.optional(io, "rresp"),
        };
        match resp {
            Some(resp) if resp >= 2 => Err(AgentError::ErrorResponse { channel, id, resp }),
            _ => Ok(()),
        }
    }
}

/// The per-tick behaviour of one bus agent.
pub(crate) trait Channels {
    fn interface(&self) -> &Interface;

    /// Drives the idle state of every channel before the first tick.
    fn start(&mut self, drive: &mut dyn Drive) -> Result<(), AgentError>;

    /// Retires the handshakes completed at the edge `io` was sampled on and
    /// drives the next beat of every channel.
    fn step(&mut self, io: &Snapshot, drive: &mut dyn Drive) -> Result<(), AgentError>;
}

/// The testbench's end of a shared agent state.
pub(crate) struct Shared<S>(pub(crate) Rc<RefCell<S>>);

impl<S: Channels> Agent for Shared<S> {
    fn start(&mut self, drive: &mut dyn Drive) -> Result<(), SimError> {
        let mut state = self.0.borrow_mut();
        let result = state.start(drive);
        result.map_err(|e| e.into_sim(state.interface().prefix()))
    }

    fn on_tick(&mut self, io: &Snapshot, drive: &mut dyn Drive) -> Result<AgentStatus, SimError> {
        let mut state = self.0.borrow_mut();
        let result = state.step(io, drive);
        result.map_err(|e| e.into_sim(state.interface().prefix()))?;
        Ok(AgentStatus::Continue)
    }
}

/// Ticks `tb` until `done` holds, at most `limit` times.
pub(crate) fn tick_until<M: SimModel>(
    tb: &mut Testbench<M>,
    limit: u64,
    mut done: impl FnMut() -> bool,
) -> Result<(), AgentError> {
    let mut ticks = 0;
    while !done() {
        if ticks == limit {
            return Err(AgentError::Timeout { ticks });
        }
        tb.tick()?;
        ticks += 1;
    }
    Ok(())
}
