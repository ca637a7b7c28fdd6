//! Replicated (multi-device) execution
//!
//! One OS thread per replica models one executor per device: replica
//! sessions genuinely race for the shared streams, so without `ordered`
//! the transcript order is backend-dependent, which is exactly the contract the
//! debugger documents. A fatal session error in any replica fails the
//! whole computation.

use std::sync::Arc;
use std::thread;

use crate::debugger::ordering::SessionGate;
use crate::error::ExecError;
use crate::value::Array;

use super::{ExecContext, ExecMode, ParallelUnit, Runtime};

impl Runtime {
    /// Run `f` once per leading-axis lane of `xs`, each lane on its own
    /// device (thread). Errors if there are more lanes than devices.
    pub fn pmap<F>(&self, f: F, xs: &Array) -> Result<Array, ExecError>
    where
        F: Fn(&ExecContext, Array) -> Result<Array, ExecError> + Sync,
    {
        let lanes = self.device_put(xs).lanes()?;
        let count = lanes.len();
        if count > self.device_count() {
            return Err(ExecError::DeviceCount {
                needed: count,
                available: self.device_count(),
            });
        }
        let gate = Arc::new(SessionGate::new(count));

        let results: Vec<Result<Array, ExecError>> = thread::scope(|scope| {
            let f = &f;
            let handles: Vec<_> = lanes
                .into_iter()
                .enumerate()
                .map(|(index, lane)| {
                    let gate = Arc::clone(&gate);
                    scope.spawn(move || {
                        let ctx = ExecContext::new(
                            ExecMode::Compiled,
                            ParallelUnit::Replica { index, count },
                            Some(gate),
                        );
                        f(&ctx, lane)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("replica thread panicked"))
                .collect()
        });

        let mut outputs = Vec::with_capacity(count);
        for result in results {
            outputs.push(result?);
        }
        Ok(Array::stack(&outputs))
    }
}
