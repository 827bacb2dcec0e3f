//! CLI commands module.

mod catalog;
mod compare;
mod config;
mod health;
mod search;
mod util;

pub use catalog::CatalogCommand;
pub use compare::CompareCommand;
pub use config::ConfigCommand;
pub use health::HealthCommand;
pub use search::SearchCommand;

pub(crate) use util::*;
