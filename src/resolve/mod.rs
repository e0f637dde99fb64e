//! Resolution pipeline: classify, dispatch to a store, normalize
//!
//! # Module Organization
//!
//! - `result`: `LocationInfo`, `ErrorKind` and `ResolutionResult`
//! - `normalizer`: Reshapes store records into `LocationInfo`
//! - `dispatcher`: Routes an address to the store for its family

pub mod dispatcher;
pub mod normalizer;
pub mod result;

pub use dispatcher::ResolutionDispatcher;
pub use normalizer::{normalize, parse_delimited};
pub use result::{ErrorKind, LocationInfo, ResolutionResult};
