//! Error types for the simulation harness.
//!
//! Every failure the harness can report is a variant of [`SimError`]. An
//! unknown port name on `prep` is deliberately not among them: it is a
//! warning routed through the diagnostic sink.

use std::io;

/// Errors that can occur while building a registry or driving a simulation.
///
/// Apart from [`TraceIo`](SimError::TraceIo) these are precondition
/// violations in the calling code, not conditions to retry.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Two ports in one registry share a name.
    #[error("duplicate port '{name}' in registry")]
    DuplicatePort {
        /// The repeated port name.
        name: String,
    },

    /// More than one port is declared as the clock.
    #[error("ports '{first}' and '{second}' are both declared as the clock")]
    MultipleClocks {
        /// The clock declared first.
        first: String,
        /// The second clock declaration.
        second: String,
    },

    /// The registry has no clock port for the sequencer to drive.
    #[error("model has no clock port")]
    NoClock,

    /// The configured clock port is not a scalar port of the model.
    #[error("clock port '{name}' is not a scalar port of the model")]
    UnknownClock {
        /// The configured clock name.
        name: String,
    },

    /// `prep` was called with an empty value sequence.
    #[error("prep of port '{port}' with no values")]
    EmptyValue {
        /// The port being prepared.
        port: String,
    },

    /// A harness operation was invoked before `init`.
    #[error("simulation not initialized; call init first")]
    NotInitialized,

    /// `init` was invoked on a harness that is already running.
    #[error("simulation already initialized")]
    AlreadyInitialized,

    /// A harness operation was invoked after `finish`.
    #[error("simulation already finished")]
    AlreadyFinished,

    /// A trace frame was dumped at or before the previous frame's time.
    #[error("trace time {time} does not follow previous time {previous}")]
    NonMonotonicTrace {
        /// The time of the previous frame.
        previous: u64,
        /// The rejected time.
        time: u64,
    },

    /// A trace frame does not match the declared variables.
    #[error("trace frame has {actual} values for {expected} declared variables")]
    FrameMismatch {
        /// Number of declared variables.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Trace variables were declared after the first frame was dumped.
    #[error("trace variables must be declared before the first dump")]
    DeclarationAfterDump,

    /// The trace recorder was used after being closed.
    #[error("trace recorder is closed")]
    TraceClosed,

    /// Clock offsets that would make trace times collide or go negative.
    #[error("clock offsets setup {setup} and hold {hold} do not fit in period {period}")]
    InvalidSchedule {
        /// Trace time units per tick.
        period: u64,
        /// Offset of the settle frame before the rising edge.
        setup: u64,
        /// Offset of the falling-edge frame after the rising edge.
        hold: u64,
    },

    /// A trace time for the given tick does not fit in a `u64`.
    #[error("trace time of tick {tick} is out of range")]
    TimeOverflow {
        /// The tick whose time overflowed.
        tick: u64,
    },

    /// `init` asked for a trace but no trace file is configured.
    #[error("tracing requested but no trace path is configured")]
    NoTracePath,

    /// A bus agent saw its interface break protocol, or could not drive it.
    #[error("agent on '{interface}': {source}")]
    Agent {
        /// Signal prefix of the interface the agent is attached to.
        interface: String,
        /// What the agent reported.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O error occurred while writing trace data.
    #[error("trace I/O error: {0}")]
    TraceIo(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_port_display() {
        let e = SimError::DuplicatePort { name: "rst".into() };
        assert_eq!(e.to_string(), "duplicate port 'rst' in registry");
    }

    #[test]
    fn empty_value_display() {
        let e = SimError::EmptyValue { port: "wr_en".into() };
        assert_eq!(e.to_string(), "prep of port 'wr_en' with no values");
    }

    #[test]
    fn lifecycle_display() {
        assert_eq!(
            SimError::NotInitialized.to_string(),
            "simulation not initialized; call init first"
        );
        assert_eq!(
            SimError::AlreadyFinished.to_string(),
            "simulation already finished"
        );
    }

    #[test]
    fn non_monotonic_display() {
        let e = SimError::NonMonotonicTrace {
            previous: 15,
            time: 15,
        };
        assert_eq!(e.to_string(), "trace time 15 does not follow previous time 15");
    }

    #[test]
    fn schedule_errors_display() {
        let e = SimError::InvalidSchedule {
            period: 10,
            setup: 20,
            hold: 5,
        };
        assert_eq!(
            e.to_string(),
            "clock offsets setup 20 and hold 5 do not fit in period 10"
        );
        assert_eq!(
            SimError::TimeOverflow { tick: 7 }.to_string(),
            "trace time of tick 7 is out of range"
        );
        assert_eq!(
            SimError::NoTracePath.to_string(),
            "tracing requested but no trace path is configured"
        );
    }

    #[test]
    fn agent_error_keeps_source() {
        let e = SimError::Agent {
            interface: "m_axi".into(),
            source: "rid 3 has no pending read".into(),
        };
        assert_eq!(e.to_string(), "agent on 'm_axi': rid 3 has no pending read");
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn trace_io_display() {
        let e = SimError::TraceIo(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(e.to_string().contains("trace I/O error"));
    }
}
