// lepasserelle - Query Facade & CLI
//
// *La Passerelle* (The Bridge) - Async facade, configuration and command line over the LeRegard crates

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod cli;
pub mod config;
pub mod errors;
pub mod leregard;

pub use config::{LeRegardConfig, VisualizationConfig};
pub use errors::{format_error, LeRegardError, Result};
pub use leregard::LeRegard;

/// Facade library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
