pub mod config;
pub mod report;

pub use config::{AdminDefaults, BootstrapConfig, Endpoint, RunMode};
pub use report::{BootstrapReport, Phase, PhaseRecord, ProvisionOutcome};
