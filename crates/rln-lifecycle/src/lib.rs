#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod clients;
pub mod config;
pub mod contract;
pub mod coordinator;
pub mod inflight;

pub use clients::*;
pub use config::*;
pub use contract::*;
pub use coordinator::*;
pub use inflight::*;
