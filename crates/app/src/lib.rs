//! Hive Logger application: configuration, logging, collaborator adapters
//! and the command-line front end over the domain services.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod services;

pub use config::Config;
pub use context::{AppContext, Collaborators};
pub use error::AppError;
