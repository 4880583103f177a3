mod config;
pub use config::*;

mod context;
pub use context::*;

mod toggle;
pub use toggle::*;

pub mod commands;
