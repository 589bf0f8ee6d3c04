pub mod checker;
pub mod command;
pub mod config;
pub mod inventory;
pub mod launcher;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod orchestrator;
pub mod runtime;
