//! Vectorized (batched) execution
//!
//! One logical call over a rank-1 input becomes one invocation per lane of
//! the leading axis. Lanes run on the calling thread in ascending index
//! order, so session order is index-ascending with or without the
//! `ordered` flag; this simulation gives the vectorized backend a
//! deterministic order for free, and no gate is attached. (Replicated
//! execution is where ordering costs real synchronization; see `pmap`.)

use crate::error::ExecError;
use crate::value::Array;

use super::{ExecContext, ExecMode, ParallelUnit, Runtime};

impl Runtime {
    /// Map `f` over the leading axis of `xs`, stacking the per-lane
    /// results. Vectorized execution is staged: breakpoints see host
    /// snapshots.
    pub fn vmap<F>(&self, f: F, xs: &Array) -> Result<Array, ExecError>
    where
        F: Fn(&ExecContext, Array) -> Result<Array, ExecError>,
    {
        let lanes = self.device_put(xs).lanes()?;
        let count = lanes.len();

        let mut outputs = Vec::with_capacity(count);
        for (index, lane) in lanes.into_iter().enumerate() {
            let ctx = ExecContext::new(
                ExecMode::Compiled,
                ParallelUnit::Lane { index, count },
                None,
            );
            outputs.push(f(&ctx, lane)?);
        }
        Ok(Array::stack(&outputs))
    }
}
