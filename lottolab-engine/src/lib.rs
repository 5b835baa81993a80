pub mod config;
pub mod error;
pub mod distribution;
pub mod frequency;
pub mod cooccurrence;
pub mod influence;
pub mod pattern;
pub mod advanced;
pub mod generator;
pub mod outcome;
pub mod ai;

pub use config::EngineConfig;
pub use error::AiResponseError;
