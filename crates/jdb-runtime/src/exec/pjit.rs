//! Partitioned (sharded) execution
//!
//! The computation is laid out across a device mesh but the program (and
//! the debugger) observes the global value: a breakpoint inside a
//! partitioned computation opens a single session whose bindings are the
//! gathered arrays. Only platforms with a cross-device host-callback
//! mechanism can do that gather, so the capability is checked up front.

use crate::error::ExecError;
use crate::value::Array;

use super::{ExecContext, ExecMode, Mesh, ParallelUnit, Runtime};

impl Runtime {
    /// Run `f` once over the global `xs`, sharded across `mesh`.
    pub fn pjit<F>(&self, f: F, mesh: &Mesh, xs: &Array) -> Result<Array, ExecError>
    where
        F: Fn(&ExecContext, Array) -> Result<Array, ExecError>,
    {
        if !self.platform().supports_partitioned_callback() {
            return Err(ExecError::PartitionedUnsupported(
                self.platform().to_string(),
            ));
        }
        let ctx = ExecContext::new(
            ExecMode::Compiled,
            ParallelUnit::Shard {
                devices: mesh.devices(),
            },
            None,
        );
        f(&ctx, self.device_put(xs))
    }
}
