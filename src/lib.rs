pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::http::ReqwestTransport;
pub use crate::config::{BookingPlan, RunSettings};
pub use crate::core::{catalog::ServiceCatalog, orchestrator::PollingOrchestrator};
pub use crate::domain::model::BookingOutcome;
pub use crate::utils::error::{Result, SniperError};
