//! Free-running counter with synchronous reset and enable.

use vpw_sim::{port_registry, SimModel};

/// A 32-bit counter that increments on each rising edge while `en` is set.
#[derive(Debug, Default)]
pub struct Counter {
    /// Clock.
    pub clk: u8,
    /// Synchronous reset, takes priority over `en`.
    pub rst: u8,
    /// Count enable.
    pub en: u8,
    /// Current count.
    pub count: u32,
    prev_clk: u8,
}

port_registry!(Counter {
    clock clk[0:0]: u8,
    input rst[0:0]: u8,
    input en[0:0]: u8,
    output count: u32,
});

impl SimModel for Counter {
    fn eval(&mut self) {
        if self.clk == 1 && self.prev_clk == 0 {
            if self.rst == 1 {
                self.count = 0;
            } else if self.en == 1 {
                self.count = self.count.wrapping_add(1);
            }
        }
        self.prev_clk = self.clk;
    }
}
