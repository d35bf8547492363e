pub mod bootstrap;
pub mod config_loader;
pub mod launch;
pub mod manage;
pub mod probe;
pub mod provision;
