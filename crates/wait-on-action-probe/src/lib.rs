//! Resource poller for the wait-on step
//!
//! [`ProbeWaiter`] implements [`ResourceWaiter`](wait_on_action_core::ResourceWaiter):
//! it polls files, unix sockets, HTTP endpoints and TCP ports on a fixed
//! interval until each has been in its target state for the stabilization
//! window, or the overall timeout expires.

pub mod check;
pub mod options;
pub mod resource;
pub mod waiter;

pub use check::{Observation, Prober};
pub use options::ProbeOptions;
pub use resource::{HttpMethod, Resource};
pub use waiter::ProbeWaiter;
