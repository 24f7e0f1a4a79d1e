// Engine Infrastructure Layer

pub mod config;
pub mod context;
pub mod repositories;
pub mod services;

pub use config::*;
pub use context::*;
pub use repositories::*;
pub use services::*;
