//! PEP (Policy Enforcement Point) helpers.
//!
//! - [`gate::RequestGate`] - Two-stage admission and per-resource decision
//! - [`gate::GatePolicy`] - Superuser role, admission roles and tag matching

pub mod gate;

pub use gate::{GatePolicy, RequestGate};
