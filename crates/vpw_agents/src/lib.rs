//! AXI bus agents for testbenches built on the vpw harness.
//!
//! Each agent is a handle plus an [`Agent`](vpw_sim::Agent) sharing one
//! state. Register the agent on a [`Testbench`](vpw_sim::Testbench), then
//! queue transfers on the handle: the non-blocking `send_*`/`recv_*` calls
//! only touch the queues, the blocking `write`/`read` calls tick the
//! testbench until the transfer completes.
//!
//! Signals are found by name as `<interface>_<signal>`, for example
//! `m_axi_awvalid`. Data wider than 64 bits travels as 32-bit words, packed
//! and unpacked with [`vpw_common::pack`] and [`vpw_common::unpack`].
//!
//! - [`AxiLiteMaster`]: single-beat register reads and writes
//! - [`AxiMaster`]: INCR bursts with id tracking, split at 4KB and 256 beats
//! - [`AxiMemory`]: a slave answering bursts from a sparse memory

#![warn(missing_docs)]

pub mod axi;
pub mod axi_lite;
pub mod axi_mem;
pub mod bus;
pub mod error;

pub use axi::{split_bursts, AxiMaster};
pub use axi_lite::AxiLiteMaster;
pub use axi_mem::AxiMemory;
pub use bus::{BusWidth, DEFAULT_TIMEOUT};
pub use error::AgentError;
