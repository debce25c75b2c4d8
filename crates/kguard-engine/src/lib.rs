//! Check execution engine.
//!
//! A [`Run`] executes a fixed set of [`Check`]s concurrently, one thread per
//! check, against a shared [`kguard_domain::Domain`]. Each check body receives
//! a [`Context`] bound to the cluster and fans out to nodes, deployments and
//! machine configs through the scoping helpers. Every context access returns a
//! [`Flow`], so a verdict helper such as [`Context::fail_now`] or an observed
//! cancellation unwinds the body with `?` up to the nearest finalize boundary.

#![forbid(unsafe_code)]

mod check;
mod context;
mod error;
mod flow;
mod registry;
mod results;
mod run;
mod scope;
mod signal;

pub use check::{Check, CheckFn};
pub use context::Context;
pub use error::{CheckError, RegistryError, RunError, SharedError};
pub use flow::{Flow, Stop};
pub use registry::Registry;
pub use results::Results;
pub use run::Run;
pub use signal::{CancelToken, Signal};
