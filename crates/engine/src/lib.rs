//! boostlab engine - boosting engine contract and native implementation
//!
//! The [`BoostingEngine`] trait mirrors the handle-oriented C API of an
//! external gradient boosting library: dense matrix construction, row-aligned
//! float metadata, booster creation, string parameters, one-step updates,
//! prediction and model persistence. Failures are reported as a non-zero
//! [`EngineStatus`], with the message available through
//! [`BoostingEngine::last_error`].
//!
//! [`NativeEngine`] is a pure-Rust implementation of that contract built on
//! exact-greedy CART trees.

pub mod api;
pub mod booster;
pub mod cart;
pub mod errors;
pub mod matrix;
pub mod native;
pub mod objective;
pub mod params;
pub mod serialization;
pub mod tree;

pub use api::{BoostingEngine, EngineResult, EngineStatus, InfoField};
pub use booster::{Ensemble, NativeBooster};
pub use errors::EngineError;
pub use matrix::DenseMatrix;
pub use native::NativeEngine;
pub use objective::Objective;
pub use params::BoosterParams;
pub use tree::{Node, Tree};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
