pub mod config;
pub mod flight;

pub use config::*;
pub use flight::*;
