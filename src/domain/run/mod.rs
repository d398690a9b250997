//! Run entities and execution

pub mod entity;
pub mod executor;
pub mod repository;
pub mod step_runner;

pub use entity::{
    step_key_for, Run, RunStatus, RunStep, StepOutput, StepOutputs, StepRequest, StepStatus,
};
pub use executor::RunExecutor;
pub use repository::RunRepository;
pub use step_runner::{StepRunTotals, StepRunner};
