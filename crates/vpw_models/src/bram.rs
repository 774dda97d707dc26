//! Simple dual-port block RAM.

use vpw_sim::{port_registry, SimModel};

/// Number of 32-bit words in the memory.
pub const DEPTH: usize = 1024;

/// A 1024 x 32 simple dual-port RAM.
///
/// On each rising clock edge a write stores `wr_data` at `wr_addr` when
/// `wr_en` is set, and a read registers the word at `rd_addr` into
/// `rd_data` when `rd_en` is set. A read and write of the same address in
/// one cycle returns the old word.
#[derive(Debug)]
pub struct Bram {
    /// Clock.
    pub clk: u8,
    /// Write enable.
    pub wr_en: u8,
    /// Write address, 10 bits.
    pub wr_addr: u16,
    /// Write data.
    pub wr_data: u32,
    /// Read enable.
    pub rd_en: u8,
    /// Read address, 10 bits.
    pub rd_addr: u16,
    /// Registered read data.
    pub rd_data: u32,
    mem: Vec<u32>,
    prev_clk: u8,
}

impl Default for Bram {
    fn default() -> Self {
        Self {
            clk: 0,
            wr_en: 0,
            wr_addr: 0,
            wr_data: 0,
            rd_en: 0,
            rd_addr: 0,
            rd_data: 0,
            mem: vec![0; DEPTH],
            prev_clk: 0,
        }
    }
}

impl Bram {
    /// Returns the stored word at `addr`, wrapping to the memory depth.
    pub fn peek(&self, addr: usize) -> u32 {
        self.mem[addr % DEPTH]
    }
}

port_registry!(Bram {
    clock clk[0:0]: u8,
    input wr_en[0:0]: u8,
    input wr_addr[9:0]: u16,
    input wr_data: u32,
    input rd_en[0:0]: u8,
    input rd_addr[9:0]: u16,
    output rd_data: u32,
});

impl SimModel for Bram {
    fn eval(&mut self) {
        let rising = self.clk == 1 && self.prev_clk == 0;
        self.prev_clk = self.clk;
        if !rising {
            return;
        }
        if self.rd_en == 1 {
            self.rd_data = self.mem[self.rd_addr as usize % DEPTH];
        }
        if self.wr_en == 1 {
            self.mem[self.wr_addr as usize % DEPTH] = self.wr_data;
        }
    }
}
