pub mod config;
pub mod core;
pub mod costs;
pub mod generator;
pub mod limits;
pub mod scored_sampling;
pub mod state;
pub mod trajectory;

pub use config::PlannerConfig;
pub use self::core::{stopped, LocalPlannerCore};
pub use costs::{CostAggregation, CycleContext, TrajectoryCostFunction};
pub use generator::{SamplingParams, TrajectoryGenerator};
pub use limits::LocalPlannerLimits;
pub use state::{ControllerState, StateMachine, StateWeights, SwitchThresholds};
pub use trajectory::Trajectory;
