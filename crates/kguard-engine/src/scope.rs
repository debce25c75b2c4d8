//! Finalize boundary and per-target fan-out.

use crate::context::Context;
use crate::error::CheckError;
use crate::flow::{Flow, Stop};
use kguard_domain::Target;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error};

/// Run `body` against `ctx` and settle its outcome on `ctx`'s results node.
///
/// - `Ok` or `Stop::Halt`: nothing to record.
/// - `Stop::Abort(err)`: `err` becomes the terminal error.
/// - a panic: recorded as `CheckError::Panicked` and logged as a bug.
///
/// Nothing escapes this function, so a failing target never takes its
/// siblings or its parent scope down with it.
pub(crate) fn execute<F>(ctx: &Context, body: F)
where
    F: FnOnce(&Context) -> Flow,
{
    match panic::catch_unwind(AssertUnwindSafe(|| body(ctx))) {
        Ok(Ok(())) | Ok(Err(Stop::Halt)) => {}
        Ok(Err(Stop::Abort(err))) => {
            if err.is_cancellation() {
                debug!(
                    check = ctx.check_id(),
                    target = %ctx.target_ref(),
                    "unwound after run cancellation"
                );
            }
            ctx.finalize(Some(err));
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(
                check = ctx.check_id(),
                standard = ctx.standard(),
                target = %ctx.target_ref(),
                %message,
                "check panicked; this is a bug in the check implementation"
            );
            ctx.finalize(Some(CheckError::Panicked { message }));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Context {
    /// Evaluate `body` against a fresh child context for `target`.
    ///
    /// This is the only way to enter a child scope. Early exits and errors
    /// raised inside `body` end at this call; the caller continues with the
    /// next target. Returns `Err` only if the run is already cancelled.
    pub fn run_for_target<F>(&self, target: Target, body: F) -> Flow
    where
        F: FnOnce(&Context) -> Flow,
    {
        let child = self.for_object(target)?;
        execute(&child, body);
        Ok(())
    }

    /// Run `body` once per node of the domain, sequentially, in snapshot order.
    pub fn for_each_node<F>(&self, body: F) -> Flow
    where
        F: Fn(&Context) -> Flow,
    {
        for node in self.domain()?.nodes() {
            self.run_for_target(node.clone(), &body)?;
        }
        Ok(())
    }

    /// Run `body` once per deployment of the domain, sequentially.
    pub fn for_each_deployment<F>(&self, body: F) -> Flow
    where
        F: Fn(&Context) -> Flow,
    {
        for deployment in self.domain()?.deployments() {
            self.run_for_target(deployment.clone(), &body)?;
        }
        Ok(())
    }

    /// Run `body` once per machine config of the domain, sequentially.
    pub fn for_each_machine_config<F>(&self, body: F) -> Flow
    where
        F: Fn(&Context) -> Flow,
    {
        for machine_config in self.domain()?.machine_configs() {
            self.run_for_target(machine_config.clone(), &body)?;
        }
        Ok(())
    }
}
