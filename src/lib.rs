pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod signature;
pub mod state;
pub mod submission;
pub mod terminal;
pub mod ui;
pub mod validation;
pub mod widgets;

pub use config::Config;
pub use error::{ConfigError, RunError, SubmitError, ValueError};
