use thiserror::Error;

/// Failure reported by a shape oracle when evaluating its SDF.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface evaluation failed: {0}")]
    Eval(String),
}

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("requested waypoint count must be at least 1")]
    InvalidCount,
}

#[derive(Debug, Error)]
pub enum AssignError {
    #[error("no goal points to assign")]
    NoGoals,
    #[error("no agents to assign goals to")]
    NoAgents,
}

/// Per-agent failures from the vehicle transport. These are isolated by the
/// sequencer: a single failing agent is excluded, the fleet continues.
#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("not connected to vehicle transport")]
    NotConnected,
    #[error("unknown agent index {0}")]
    UnknownAgent(usize),
    #[error("unknown actuation handle")]
    UnknownHandle,
    #[error("actuation rejected for agent {agent}: {reason}")]
    Actuation { agent: usize, reason: String },
    #[error("vehicle transport lost: {0}")]
    TransportLost(String),
}

#[derive(Debug, Error)]
pub enum MissionError {
    #[error(transparent)]
    Sampling(#[from] SamplingError),
    #[error(transparent)]
    Assignment(#[from] AssignError),
    #[error(transparent)]
    Vehicle(#[from] VehicleError),
    #[error("all agents failed actuation")]
    FleetLost,
    #[error("mission not prepared; call prepare() first")]
    NotPrepared,
    #[error("invalid phase transition from {0:?}")]
    BadPhase(crate::mission::MissionPhase),
}
