//! The contract a circuit model offers the harness.

use crate::ports::Ports;

/// A cycle-accurate circuit model the harness can step.
///
/// The harness reaches the model's signals only through its
/// [`Ports`] registry. `eval` settles the model after inputs or the clock
/// changed; it is the only point where the model's state advances.
///
/// Implementations are typically a plain struct with one field per port,
/// a `port_registry!` declaration, and an `eval` that computes outputs
/// and updates registers on the rising clock edge.
pub trait SimModel: Ports {
    /// Settles combinational logic and latches registers on clock edges.
    fn eval(&mut self);

    /// Informs the model of the trace time of the upcoming evaluation.
    ///
    /// Models without an internal time reference ignore it.
    fn set_time(&mut self, _time: u64) {}
}
