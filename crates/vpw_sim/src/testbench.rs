//! Background agents stepped once per clock period.
//!
//! A [`Testbench`] owns a [`Simulation`] and a list of [`Agent`]s. After
//! every tick each agent sees the returned snapshot and may `prep` inputs
//! for the next period. An agent that reports [`AgentStatus::Done`] is
//! dropped from the list.

use crate::error::SimError;
use crate::model::SimModel;
use crate::simulation::Simulation;
use crate::snapshot::Snapshot;

/// Write access to a model's inputs, handed to agents.
pub trait Drive {
    /// Writes `values` into the named port, as `Simulation::prep` does.
    fn prep(&mut self, name: &str, values: &[u64]) -> Result<(), SimError>;
}

impl<M: SimModel> Drive for Simulation<M> {
    fn prep(&mut self, name: &str, values: &[u64]) -> Result<(), SimError> {
        Simulation::prep(self, name, values)
    }
}

/// Whether an agent wants to keep running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentStatus {
    /// Call the agent again after the next tick.
    Continue,
    /// Remove the agent.
    Done,
}

/// A stimulus generator or monitor attached to a testbench.
pub trait Agent {
    /// Called once at registration, before any tick the agent observes.
    fn start(&mut self, _io: &mut dyn Drive) -> Result<(), SimError> {
        Ok(())
    }

    /// Called after every tick with the snapshot that tick returned.
    fn on_tick(&mut self, io: &Snapshot, drive: &mut dyn Drive) -> Result<AgentStatus, SimError>;
}

impl<F> Agent for F
where
    F: FnMut(&Snapshot, &mut dyn Drive) -> Result<AgentStatus, SimError>,
{
    fn on_tick(&mut self, io: &Snapshot, drive: &mut dyn Drive) -> Result<AgentStatus, SimError> {
        self(io, drive)
    }
}

/// A simulation plus the agents driving it.
pub struct Testbench<M: SimModel> {
    sim: Simulation<M>,
    agents: Vec<Box<dyn Agent>>,
}

impl<M: SimModel> Testbench<M> {
    /// Wraps an initialized simulation.
    pub fn new(sim: Simulation<M>) -> Self {
        Self {
            sim,
            agents: Vec::new(),
        }
    }

    /// Starts `agent` and adds it to the per-tick list.
    pub fn register(&mut self, mut agent: Box<dyn Agent>) -> Result<(), SimError> {
        agent.start(&mut self.sim)?;
        self.agents.push(agent);
        Ok(())
    }

    /// Number of agents still running.
    pub fn active_agents(&self) -> usize {
        self.agents.len()
    }

    /// Writes `values` into the named port from the driver itself.
    pub fn prep(&mut self, name: &str, values: &[u64]) -> Result<(), SimError> {
        self.sim.prep(name, values)
    }

    /// Runs one tick, then every agent in registration order.
    pub fn tick(&mut self) -> Result<Snapshot, SimError> {
        let io = self.sim.tick()?;
        let mut i = 0;
        while i < self.agents.len() {
            match self.agents[i].on_tick(&io, &mut self.sim)? {
                AgentStatus::Continue => i += 1,
                AgentStatus::Done => {
                    self.agents.remove(i);
                }
            }
        }
        Ok(io)
    }

    /// Runs `ticks` ticks without driver stimulus.
    pub fn idle(&mut self, ticks: u64) -> Result<(), SimError> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// The underlying simulation.
    pub fn sim(&self) -> &Simulation<M> {
        &self.sim
    }

    /// Drops the agents and finishes the simulation.
    pub fn finish(self) -> Result<M, SimError> {
        self.sim.finish()
    }
}
