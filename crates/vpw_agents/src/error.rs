//! Errors raised by bus agents.
//!
//! Request validation (alignment, 4KB boundaries, burst length) fails when a
//! transfer is queued. Protocol violations are detected while stepping and
//! reach the caller through [`Testbench::tick`](vpw_sim::Testbench::tick) as
//! [`SimError::Agent`].

use vpw_common::PackError;
use vpw_sim::SimError;

/// Errors from configuring, queueing or stepping a bus agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Data channels must be a power-of-two number of bytes, at most 128 bits.
    #[error("data width {bits} is not 8, 16, 32, 64 or 128 bits")]
    DataWidth {
        /// The rejected width.
        bits: u32,
    },

    /// Address channels carry between 1 and 64 bits.
    #[error("address width {bits} is outside 1..=64")]
    AddrWidth {
        /// The rejected width.
        bits: u32,
    },

    /// The address does not fit the interface's address width.
    #[error("address {addr:#x} does not fit in {bits} address bits")]
    AddressRange {
        /// The byte address.
        addr: u64,
        /// Address width of the interface.
        bits: u32,
    },

    /// A burst must start on a beat boundary.
    #[error("address {addr:#x} is not aligned to the {bytes}-byte beat")]
    Misaligned {
        /// The byte address.
        addr: u64,
        /// Bytes per beat.
        bytes: u64,
    },

    /// A single burst may not cross a 4KB address boundary.
    #[error("burst of {beats} beats at {addr:#x} crosses a 4KB boundary")]
    CrossesBoundary {
        /// Start address of the burst.
        addr: u64,
        /// Number of beats requested.
        beats: usize,
    },

    /// Bursts carry between 1 and 256 beats.
    #[error("burst length {beats} is outside 1..=256")]
    BurstLength {
        /// Number of beats requested.
        beats: usize,
    },

    /// A response arrived that no outstanding request accounts for.
    #[error("unexpected {channel} response with id {id}")]
    UnexpectedResponse {
        /// `"B"` or `"R"`.
        channel: &'static str,
        /// The response id.
        id: u64,
    },

    /// The slave answered with SLVERR or DECERR.
    #[error("{channel} response {} for id {id}", resp_name(.resp))]
    ErrorResponse {
        /// `"B"` or `"R"`.
        channel: &'static str,
        /// The response id.
        id: u64,
        /// The raw two-bit response code.
        resp: u64,
    },

    /// A read beat for another id arrived in the middle of a burst.
    #[error("R beat with id {got} inside a burst for id {expected}")]
    Interleaved {
        /// Id of the burst in progress.
        expected: u64,
        /// Id of the offending beat.
        got: u64,
    },

    /// A read burst ended early or ran past its requested length.
    #[error("read burst for id {id} ended after {got} beats, {expected} requested")]
    ReadLength {
        /// The burst id.
        id: u64,
        /// Beats requested on AR.
        expected: usize,
        /// Beats received.
        got: usize,
    },

    /// `wlast` disagrees with the burst length announced on AW.
    #[error("write beat {beat} of a {len}-beat burst has wlast={last}")]
    WriteLast {
        /// Zero-based beat index.
        beat: usize,
        /// Beats announced on AW.
        len: usize,
        /// The sampled `wlast`.
        last: bool,
    },

    /// A burst type or size this agent does not model.
    #[error("{signal}={value} is not supported")]
    Unsupported {
        /// Full signal name.
        signal: String,
        /// Sampled value.
        value: u64,
    },

    /// The model does not expose a signal the agent reads.
    #[error("signal '{name}' is not in the snapshot")]
    MissingSignal {
        /// Full signal name.
        name: String,
    },

    /// A blocking transfer did not complete in time.
    #[error("transfer did not complete within {ticks} ticks")]
    Timeout {
        /// Ticks spent waiting.
        ticks: u64,
    },

    /// Data did not fit the word packing of a wide port.
    #[error(transparent)]
    Pack(#[from] PackError),

    /// The simulation itself failed.
    #[error(transparent)]
    Sim(#[from] SimError),
}

impl AgentError {
    /// Converts into the error an [`Agent`](vpw_sim::Agent) returns.
    ///
    /// Simulation errors pass through unchanged; everything else is wrapped
    /// in [`SimError::Agent`] tagged with the interface prefix.
    pub fn into_sim(self, interface: &str) -> SimError {
        match self {
            AgentError::Sim(e) => e,
            other => SimError::Agent {
                interface: interface.to_string(),
                source: Box::new(other),
            },
        }
    }
}

fn resp_name(resp: &u64) -> &'static str {
    match resp {
        0 => "OKAY",
        1 => "EXOKAY",
        2 => "SLVERR",
        _ => "DECERR",
    }
}
