use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("robot pose unavailable")]
    PoseUnavailable,
    #[error("no usable local plan")]
    PlanUnavailable,
    #[error("received an empty local plan")]
    EmptyPlan,
    #[error("all sampled trajectories were rejected")]
    NoLegalTrajectory,
    #[error("malformed occupancy snapshot: {0}")]
    MalformedSnapshot(String),
    #[error("not initialized: {0}")]
    NotInitialized(String),
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
