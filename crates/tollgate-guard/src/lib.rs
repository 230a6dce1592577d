//! Navigation guard for Tollgate.
//!
//! Runs before every navigation: asks the session store for a fresh
//! [`TrustState`](tollgate_session::TrustState), looks the answer up in a
//! fixed decision table, and tells the router to allow the move or go
//! somewhere else.
//!
//! # Key types
//!
//! - [`NavigationGuard`]: the effectful evaluator (restore, decide, clean up)
//! - [`decide`]: the pure decision table, no I/O
//! - [`GuardConfig`]: which paths are public, where the login and home views live
//! - [`Navigation`]: what the router should do

mod config;
mod decision;
mod guard;

pub use config::GuardConfig;
pub use decision::{Decision, Navigation, decide};
pub use guard::NavigationGuard;
