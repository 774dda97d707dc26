//! Wide-bus and bidirectional-field loopback.

use vpw_sim::{port_registry, SimModel};

/// Passes a 128-bit bus through combinationally and registers a shared
/// bidirectional field.
///
/// `wide_out` follows `wide_bus` on every evaluation. On each rising edge
/// `echo` captures `shared`, and `shared` is inverted when `flip` is set,
/// so the field is both driven by the testbench and written by the model.
#[derive(Debug, Default)]
pub struct Loopback {
    /// Clock.
    pub clk: u8,
    /// 128-bit input bus, least significant word first.
    pub wide_bus: [u32; 4],
    /// Copy of `wide_bus`.
    pub wide_out: [u32; 4],
    /// Invert `shared` on the next rising edge.
    pub flip: u8,
    /// Bidirectional field.
    pub shared: u32,
    /// `shared` as sampled on the last rising edge.
    pub echo: u32,
    prev_clk: u8,
}

port_registry!(Loopback {
    clock clk[0:0]: u8,
    input wide_bus: [u32; 4],
    output wide_out: [u32; 4],
    input flip[0:0]: u8,
    inout shared: u32,
    output echo: u32,
});

impl SimModel for Loopback {
    fn eval(&mut self) {
        self.wide_out = self.wide_bus;
        if self.clk == 1 && self.prev_clk == 0 {
            self.echo = self.shared;
            if self.flip == 1 {
                self.shared = !self.shared;
            }
        }
        self.prev_clk = self.clk;
    }
}
