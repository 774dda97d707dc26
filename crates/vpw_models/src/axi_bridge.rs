//! Pass-through between two 128-bit AXI4 ports.

use vpw_sim::{port_registry, SimModel};

/// Wires slave port `s_axi` straight to master port `m_axi`.
///
/// Every channel is combinational: requests and write data flow from `s_axi`
/// to `m_axi`, ready signals and responses flow back. Data is 128 bits
/// (`[u32; 4]`, least significant word first), addresses 16 bits and ids
/// 4 bits. On each rising edge the bridge counts the write beats and read
/// beats that completed a handshake.
#[derive(Debug, Default)]
pub struct AxiBridge {
    /// Clock.
    pub clk: u8,

    /// Slave-side write address.
    pub s_axi_awaddr: u16,
    /// Slave-side burst length minus one.
    pub s_axi_awlen: u8,
    /// Slave-side beat size code.
    pub s_axi_awsize: u8,
    /// Slave-side burst type.
    pub s_axi_awburst: u8,
    /// Slave-side write id.
    pub s_axi_awid: u8,
    /// Slave-side write address valid.
    pub s_axi_awvalid: u8,
    /// Slave-side write address ready.
    pub s_axi_awready: u8,
    /// Slave-side write data.
    pub s_axi_wdata: [u32; 4],
    /// Slave-side write strobe.
    pub s_axi_wstrb: u16,
    /// Slave-side last write beat.
    pub s_axi_wlast: u8,
    /// Slave-side write data valid.
    pub s_axi_wvalid: u8,
    /// Slave-side write data ready.
    pub s_axi_wready: u8,
    /// Slave-side write response id.
    pub s_axi_bid: u8,
    /// Slave-side write response.
    pub s_axi_bresp: u8,
    /// Slave-side write response valid.
    pub s_axi_bvalid: u8,
    /// Slave-side write response ready.
    pub s_axi_bready: u8,
    /// Slave-side read address.
    pub s_axi_araddr: u16,
    /// Slave-side read burst length minus one.
    pub s_axi_arlen: u8,
    /// Slave-side read beat size code.
    pub s_axi_arsize: u8,
    /// Slave-side read burst type.
    pub s_axi_arburst: u8,
    /// Slave-side read id.
    pub s_axi_arid: u8,
    /// Slave-side read address valid.
    pub s_axi_arvalid: u8,
    /// Slave-side read address ready.
    pub s_axi_arready: u8,
    /// Slave-side read data.
    pub s_axi_rdata: [u32; 4],
    /// Slave-side read id.
    pub s_axi_rid: u8,
    /// Slave-side read response.
    pub s_axi_rresp: u8,
    /// Slave-side last read beat.
    pub s_axi_rlast: u8,
    /// Slave-side read data valid.
    pub s_axi_rvalid: u8,
    /// Slave-side read data ready.
    pub s_axi_rready: u8,

    /// Master-side write address.
    pub m_axi_awaddr: u16,
    /// Master-side burst length minus one.
    pub m_axi_awlen: u8,
    /// Master-side beat size code.
    pub m_axi_awsize: u8,
    /// Master-side burst type.
    pub m_axi_awburst: u8,
    /// Master-side write id.
    pub m_axi_awid: u8,
    /// Master-side write address valid.
    pub m_axi_awvalid: u8,
    /// Master-side write address ready.
    pub m_axi_awready: u8,
    /// Master-side write data.
    pub m_axi_wdata: [u32; 4],
    /// Master-side write strobe.
    pub m_axi_wstrb: u16,
    /// Master-side last write beat.
    pub m_axi_wlast: u8,
    /// Master-side write data valid.
    pub m_axi_wvalid: u8,
    /// Master-side write data ready.
    pub m_axi_wready: u8,
    /// Master-side write response id.
    pub m_axi_bid: u8,
    /// Master-side write response.
    pub m_axi_bresp: u8,
    /// Master-side write response valid.
    pub m_axi_bvalid: u8,
    /// Master-side write response ready.
    pub m_axi_bready: u8,
    /// Master-side read address.
    pub m_axi_araddr: u16,
    /// Master-side read burst length minus one.
    pub m_axi_arlen: u8,
    /// Master-side read beat size code.
    pub m_axi_arsize: u8,
    /// Master-side read burst type.
    pub m_axi_arburst: u8,
    /// Master-side read id.
    pub m_axi_arid: u8,
    /// Master-side read address valid.
    pub m_axi_arvalid: u8,
    /// Master-side read address ready.
    pub m_axi_arready: u8,
    /// Master-side read data.
    pub m_axi_rdata: [u32; 4],
    /// Master-side read id.
    pub m_axi_rid: u8,
    /// Master-side read response.
    pub m_axi_rresp: u8,
    /// Master-side last read beat.
    pub m_axi_rlast: u8,
    /// Master-side read data valid.
    pub m_axi_rvalid: u8,
    /// Master-side read data ready.
    pub m_axi_rready: u8,

    /// Write beats transferred so far.
    pub write_beats: u32,
    /// Read beats transferred so far.
    pub read_beats: u32,
    prev_clk: u8,
}

port_registry!(AxiBridge {
    clock clk[0:0]: u8,

    input s_axi_awaddr: u16,
    input s_axi_awlen: u8,
    input s_axi_awsize[2:0]: u8,
    input s_axi_awburst[1:0]: u8,
    input s_axi_awid[3:0]: u8,
    input s_axi_awvalid[0:0]: u8,
    output s_axi_awready[0:0]: u8,
    input s_axi_wdata: [u32; 4],
    input s_axi_wstrb: u16,
    input s_axi_wlast[0:0]: u8,
    input s_axi_wvalid[0:0]: u8,
    output s_axi_wready[0:0]: u8,
    output s_axi_bid[3:0]: u8,
    output s_axi_bresp[1:0]: u8,
    output s_axi_bvalid[0:0]: u8,
    input s_axi_bready[0:0]: u8,
    input s_axi_araddr: u16,
    input s_axi_arlen: u8,
    input s_axi_arsize[2:0]: u8,
    input s_axi_arburst[1:0]: u8,
    input s_axi_arid[3:0]: u8,
    input s_axi_arvalid[0:0]: u8,
    output s_axi_arready[0:0]: u8,
    output s_axi_rdata: [u32; 4],
    output s_axi_rid[3:0]: u8,
    output s_axi_rresp[1:0]: u8,
    output s_axi_rlast[0:0]: u8,
    output s_axi_rvalid[0:0]: u8,
    input s_axi_rready[0:0]: u8,

    output m_axi_awaddr: u16,
    output m_axi_awlen: u8,
    output m_axi_awsize[2:0]: u8,
    output m_axi_awburst[1:0]: u8,
    output m_axi_awid[3:0]: u8,
    output m_axi_awvalid[0:0]: u8,
    input m_axi_awready[0:0]: u8,
    output m_axi_wdata: [u32; 4],
    output m_axi_wstrb: u16,
    output m_axi_wlast[0:0]: u8,
    output m_axi_wvalid[0:0]: u8,
    input m_axi_wready[0:0]: u8,
    input m_axi_bid[3:0]: u8,
    input m_axi_bresp[1:0]: u8,
    input m_axi_bvalid[0:0]: u8,
    output m_axi_bready[0:0]: u8,
    output m_axi_araddr: u16,
    output m_axi_arlen: u8,
    output m_axi_arsize[2:0]: u8,
    output m_axi_arburst[1:0]: u8,
    output m_axi_arid[3:0]: u8,
    output m_axi_arvalid[0:0]: u8,
    input m_axi_arready[0:0]: u8,
    input m_axi_rdata: [u32; 4],
    input m_axi_rid[3:0]: u8,
    input m_axi_rresp[1:0]: u8,
    input m_axi_rlast[0:0]: u8,
    input m_axi_rvalid[0:0]: u8,
    output m_axi_rready[0:0]: u8,

    output write_beats: u32,
    output read_beats: u32,
});

impl AxiBridge {
    fn forward(&mut self) {
        self.m_axi_awaddr = self.s_axi_awaddr;
        self.m_axi_awlen = self.s_axi_awlen;
        self.m_axi_awsize = self.s_axi_awsize;
        self.m_axi_awburst = self.s_axi_awburst;
        self.m_axi_awid = self.s_axi_awid;
        self.m_axi_awvalid = self.s_axi_awvalid;
        self.m_axi_wdata = self.s_axi_wdata;
        self.m_axi_wstrb = self.s_axi_wstrb;
        self.m_axi_wlast = self.s_axi_wlast;
        self.m_axi_wvalid = self.s_axi_wvalid;
        self.m_axi_bready = self.s_axi_bready;
        self.m_axi_araddr = self.s_axi_araddr;
        self.m_axi_arlen = self.s_axi_arlen;
        self.m_axi_arsize = self.s_axi_arsize;
        self.m_axi_arburst = self.s_axi_arburst;
        self.m_axi_arid = self.s_axi_arid;
        self.m_axi_arvalid = self.s_axi_arvalid;
        self.m_axi_rready = self.s_axi_rready;
    }

    fn backward(&mut self) {
        self.s_axi_awready = self.m_axi_awready;
        self.s_axi_wready = self.m_axi_wready;
        self.s_axi_bid = self.m_axi_bid;
        self.s_axi_bresp = self.m_axi_bresp;
        self.s_axi_bvalid = self.m_axi_bvalid;
        self.s_axi_arready = self.m_axi_arready;
        self.s_axi_rdata = self.m_axi_rdata;
        self.s_axi_rid = self.m_axi_rid;
        self.s_axi_rresp = self.m_axi_rresp;
        self.s_axi_rlast = self.m_axi_rlast;
        self.s_axi_rvalid = self.m_axi_rvalid;
    }
}

impl SimModel for AxiBridge {
    fn eval(&mut self) {
        self.forward();
        self.backward();
        if self.clk == 1 && self.prev_clk == 0 {
            if self.m_axi_wvalid == 1 && self.m_axi_wready == 1 {
                self.write_beats = self.write_beats.wrapping_add(1);
            }
            if self.m_axi_rvalid == 1 && self.m_axi_rready == 1 {
                self.read_beats = self.read_beats.wrapping_add(1);
            }
        }
        self.prev_clk = self.clk;
    }
}
