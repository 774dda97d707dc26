//! The driver-facing façade: `init`, `prep`, `tick`, `finish`.
//!
//! [`Harness`] holds a model factory and a lifecycle state so that drivers
//! written against the plain four-call protocol get a clear error, rather
//! than a silent no-op, when they call out of order.

use crate::error::SimError;
use crate::model::SimModel;
use crate::simulation::{SimOptions, Simulation};
use crate::snapshot::Snapshot;

enum State<M: SimModel> {
    Idle,
    Running(Simulation<M>),
    Finished,
}

/// A single-use harness around one model instance.
///
/// The lifecycle is `init` once, any number of `prep`/`tick`/`update`
/// calls, then `finish` once. Every call outside that order returns
/// `NotInitialized`, `AlreadyInitialized` or `AlreadyFinished`.
pub struct Harness<M: SimModel> {
    factory: Box<dyn FnMut() -> M>,
    options: SimOptions,
    state: State<M>,
}

impl<M: SimModel + Default + 'static> Harness<M> {
    /// Creates a harness that builds its model with `M::default()`.
    pub fn new(options: SimOptions) -> Self {
        Self::with_factory(options, M::default)
    }
}

impl<M: SimModel> Harness<M> {
    /// Creates a harness that builds its model with `factory` at `init`.
    pub fn with_factory(options: SimOptions, factory: impl FnMut() -> M + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            options,
            state: State::Idle,
        }
    }

    /// Creates the model and, if `trace` is set, opens the trace recorder.
    /// Resets the tick count to zero.
    ///
    /// Asking for a trace without a configured `trace_path` fails with
    /// [`SimError::NoTracePath`]; `SimOptions::from_config` supplies
    /// `<package>.vcd` whenever `trace.enabled` is set.
    pub fn init(&mut self, trace: bool) -> Result<(), SimError> {
        match self.state {
            State::Idle => {}
            State::Running(_) => return Err(SimError::AlreadyInitialized),
            State::Finished => return Err(SimError::AlreadyFinished),
        }
        let options = if !trace {
            self.options.clone().without_trace()
        } else if self.options.trace_path.is_none() {
            return Err(SimError::NoTracePath);
        } else {
            self.options.clone()
        };
        let sim = Simulation::init((self.factory)(), &options)?;
        self.state = State::Running(sim);
        Ok(())
    }

    /// Writes `values` into the named port. See [`Simulation::prep`].
    pub fn prep(&mut self, name: &str, values: &[u64]) -> Result<(), SimError> {
        self.running()?.prep(name, values)
    }

    /// Runs one clock period. See [`Simulation::tick`].
    pub fn tick(&mut self) -> Result<Snapshot, SimError> {
        self.running()?.tick()
    }

    /// Reads the current snapshot without advancing time.
    pub fn update(&mut self) -> Result<Snapshot, SimError> {
        Ok(self.running()?.update())
    }

    /// Number of ticks run since `init`.
    pub fn timestamp(&mut self) -> Result<u64, SimError> {
        Ok(self.running()?.timestamp())
    }

    /// Closes the trace and releases the model.
    pub fn finish(&mut self) -> Result<(), SimError> {
        match std::mem::replace(&mut self.state, State::Finished) {
            State::Running(sim) => {
                sim.finish()?;
                Ok(())
            }
            State::Idle => {
                self.state = State::Idle;
                Err(SimError::NotInitialized)
            }
            State::Finished => Err(SimError::AlreadyFinished),
        }
    }

    /// Returns `true` between `init` and `finish`.
    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    fn running(&mut self) -> Result<&mut Simulation<M>, SimError> {
        match &mut self.state {
            State::Running(sim) => Ok(sim),
            State::Idle => Err(SimError::NotInitialized),
            State::Finished => Err(SimError::AlreadyFinished),
        }
    }
}
