pub mod config;
pub mod duration;
pub mod error;
pub mod indexes;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod overrides;
pub mod processor;
pub mod report;
pub mod schema;
pub mod screenings;
pub mod source;
pub mod tickets;

pub use crate::{
    config::Config,
    error::{AppError, AppResult},
    processor::run,
    report::BuildReport,
};
