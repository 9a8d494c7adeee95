pub mod file_intake;
pub mod gateway;

pub use file_intake::{FileIntake, IntakeEvent, IntakeReport, StagedBatch};
pub use gateway::BackendGateway;
