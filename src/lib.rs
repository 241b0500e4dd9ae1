pub mod calibrator;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod hashindex;
pub mod stat;
pub mod table;
pub mod timebucket;
pub mod zones;

pub use calibrator::{Calibrator, EtaQuery, Timing, ETA_UNAVAILABLE};
pub use error::Error;
