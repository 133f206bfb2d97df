//! Order lifecycle core
//!
//! - [`store`] - authoritative record store, per-restaurant single writer
//! - [`engine`] - status transition engine, the only mutation path
//! - [`payment`] - payment reconciliation (independent axis)
//! - [`projection`] - role view projector (pure functions)

pub mod engine;
pub mod error;
pub mod money;
pub mod payment;
pub mod projection;
pub mod store;

pub use engine::TransitionEngine;
pub use error::OrderError;
pub use store::{OrderStore, StoreError};
