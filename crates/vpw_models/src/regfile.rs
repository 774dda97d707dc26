//! AXI4-Lite register file.

use vpw_sim::{port_registry, SimModel};

/// Number of 32-bit registers.
pub const REGISTERS: usize = 16;

/// Sixteen 32-bit registers behind an AXI4-Lite slave port `s_axi`.
///
/// Register `i` sits at byte address `4 * i`; the low two address bits are
/// ignored. Write address and data are latched independently, each with a
/// one-entry buffer whose ready drops while it is full. A write lands on the
/// first rising edge where both are held and the B channel is free, honouring
/// `wstrb` per byte. A read is accepted while no read data is pending and its
/// data appears on R after the accepting edge. Every response is OKAY.
#[derive(Debug, Default)]
pub struct RegFile {
    /// Clock.
    pub clk: u8,
    /// Write address.
    pub s_axi_awaddr: u8,
    /// Write protection type, ignored.
    pub s_axi_awprot: u8,
    /// Write address valid.
    pub s_axi_awvalid: u8,
    /// Write address ready.
    pub s_axi_awready: u8,
    /// Write data.
    pub s_axi_wdata: u32,
    /// Byte lanes to write.
    pub s_axi_wstrb: u8,
    /// Write data valid.
    pub s_axi_wvalid: u8,
    /// Write data ready.
    pub s_axi_wready: u8,
    /// Write response.
    pub s_axi_bresp: u8,
    /// Write response valid.
    pub s_axi_bvalid: u8,
    /// Write response ready.
    pub s_axi_bready: u8,
    /// Read address.
    pub s_axi_araddr: u8,
    /// Read protection type, ignored.
    pub s_axi_arprot: u8,
    /// Read address valid.
    pub s_axi_arvalid: u8,
    /// Read address ready.
    pub s_axi_arready: u8,
    /// Read data.
    pub s_axi_rdata: u32,
    /// Read response.
    pub s_axi_rresp: u8,
    /// Read data valid.
    pub s_axi_rvalid: u8,
    /// Read data ready.
    pub s_axi_rready: u8,
    regs: [u32; REGISTERS],
    pending_addr: Option<u8>,
    pending_data: Option<(u32, u8)>,
    prev_clk: u8,
}

impl RegFile {
    /// Returns register `index`, wrapping to the register count.
    pub fn register(&self, index: usize) -> u32 {
        self.regs[index % REGISTERS]
    }

    fn slot(addr: u8) -> usize {
        usize::from(addr >> 2) % REGISTERS
    }

    fn on_rising_edge(&mut self) {
        if self.s_axi_bvalid == 1 && self.s_axi_bready == 1 {
            self.s_axi_bvalid = 0;
        }
        if self.s_axi_rvalid == 1 && self.s_axi_rready == 1 {
            self.s_axi_rvalid = 0;
        }
        if self.s_axi_awready == 1 && self.s_axi_awvalid == 1 {
            self.pending_addr = Some(self.s_axi_awaddr);
        }
        if self.s_axi_wready == 1 && self.s_axi_wvalid == 1 {
            self.pending_data = Some((self.s_axi_wdata, self.s_axi_wstrb));
        }
        if self.s_axi_arready == 1 && self.s_axi_arvalid == 1 {
            self.s_axi_rdata = self.regs[Self::slot(self.s_axi_araddr)];
            self.s_axi_rresp = 0;
            self.s_axi_rvalid = 1;
        }
        if self.s_axi_bvalid == 0 {
            if let (Some(addr), Some((data, strb))) = (self.pending_addr, self.pending_data) {
                let reg = &mut self.regs[Self::slot(addr)];
                for lane in 0..4 {
                    if (strb >> lane) & 1 == 1 {
                        let mask = 0xffu32 << (8 * lane);
                        *reg = (*reg & !mask) | (data & mask);
                    }
                }
                self.pending_addr = None;
                self.pending_data = None;
                self.s_axi_bresp = 0;
                self.s_axi_bvalid = 1;
            }
        }
    }
}

port_registry!(RegFile {
    clock clk[0:0]: u8,
    input s_axi_awaddr[5:0]: u8,
    input s_axi_awprot[2:0]: u8,
    input s_axi_awvalid[0:0]: u8,
    output s_axi_awready[0:0]: u8,
    input s_axi_wdata: u32,
    input s_axi_wstrb[3:0]: u8,
    input s_axi_wvalid[0:0]: u8,
    output s_axi_wready[0:0]: u8,
    output s_axi_bresp[1:0]: u8,
    output s_axi_bvalid[0:0]: u8,
    input s_axi_bready[0:0]: u8,
    input s_axi_araddr[5:0]: u8,
    input s_axi_arprot[2:0]: u8,
    input s_axi_arvalid[0:0]: u8,
    output s_axi_arready[0:0]: u8,
    output s_axi_rdata: u32,
    output s_axi_rresp[1:0]: u8,
    output s_axi_rvalid[0:0]: u8,
    input s_axi_rready[0:0]: u8,
});

impl SimModel for RegFile {
    fn eval(&mut self) {
        if self.clk == 1 && self.prev_clk == 0 {
            self.on_rising_edge();
        }
        self.prev_clk = self.clk;
        self.s_axi_awready = u8::from(self.pending_addr.is_none());
        self.s_axi_wready = u8::from(self.pending_data.is_none());
        self.s_axi_arready = u8::from(self.s_axi_rvalid == 0);
    }
}
