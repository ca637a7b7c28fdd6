//! Simulated execution backends
//!
//! This module models the *observable contract* of a staged array runtime's
//! execution modes: how many times a breakpoint fires, on which thread, in
//! what order, and whether the debugger sees device buffers or host
//! snapshots. There is deliberately no tracing compiler, no vectorizer, and
//! no device runtime behind it: user programs are plain closures taking an
//! [`ExecContext`] and an [`Array`].

mod context;
mod pjit;
mod pmap;
mod vmap;

pub use context::{ExecContext, ExecMode, FrameGuard, ParallelUnit};

use crate::error::ExecError;
use crate::value::Array;

/// The simulated hardware platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Cpu,
    Tpu,
}

impl Platform {
    /// Whether partitioned execution can call back into the host debugger.
    pub fn supports_partitioned_callback(self) -> bool {
        matches!(self, Platform::Tpu)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Cpu => write!(f, "cpu"),
            Platform::Tpu => write!(f, "tpu"),
        }
    }
}

/// A named device mesh for partitioned execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mesh {
    axis: String,
    devices: usize,
}

impl Mesh {
    pub fn new(axis: impl Into<String>, devices: usize) -> Self {
        Self {
            axis: axis.into(),
            devices: devices.max(1),
        }
    }

    pub fn axis(&self) -> &str {
        &self.axis
    }

    pub fn devices(&self) -> usize {
        self.devices
    }
}

/// A platform with a fixed device count; the entry point for every
/// execution mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runtime {
    platform: Platform,
    device_count: usize,
}

impl Runtime {
    pub fn new(platform: Platform, device_count: usize) -> Self {
        Self {
            platform,
            device_count: device_count.max(1),
        }
    }

    pub fn cpu(device_count: usize) -> Self {
        Self::new(Platform::Cpu, device_count)
    }

    pub fn tpu(device_count: usize) -> Self {
        Self::new(Platform::Tpu, device_count)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn device_count(&self) -> usize {
        self.device_count
    }

    /// A mesh spanning every device on this runtime.
    pub fn mesh(&self, axis: impl Into<String>) -> Mesh {
        Mesh::new(axis, self.device_count)
    }

    /// Place a host array on (simulated) device memory.
    pub fn device_put(&self, a: &Array) -> Array {
        a.to_device()
    }

    /// Plain eager execution: one invocation, device-resident values.
    pub fn run<F>(&self, f: F, x: &Array) -> Result<Array, ExecError>
    where
        F: Fn(&ExecContext, Array) -> Result<Array, ExecError>,
    {
        let ctx = ExecContext::new(ExecMode::Eager, ParallelUnit::None, None);
        f(&ctx, x.to_device())
    }

    /// Compiled execution: one invocation; breakpoints inside see host
    /// snapshots delivered through the staged runtime's host callback.
    pub fn jit<F>(&self, f: F, x: &Array) -> Result<Array, ExecError>
    where
        F: Fn(&ExecContext, Array) -> Result<Array, ExecError>,
    {
        let ctx = ExecContext::new(ExecMode::Compiled, ParallelUnit::None, None);
        f(&ctx, x.to_device())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{DType, Placement};

    #[test]
    fn test_eager_values_stay_on_device() {
        let rt = Runtime::cpu(2);
        let out = rt
            .run(|_, x| Ok(x.sin()), &Array::scalar_f32(2.0))
            .unwrap();
        assert_eq!(out.placement(), Placement::Device);
    }

    #[test]
    fn test_jit_runs_compiled() {
        let rt = Runtime::cpu(2);
        let out = rt
            .jit(
                |ctx, x| {
                    assert_eq!(ctx.mode(), ExecMode::Compiled);
                    Ok(&x + 1.0)
                },
                &Array::scalar_f32(2.0),
            )
            .unwrap();
        assert_eq!(out.as_slice(), &[3.0]);
    }

    #[test]
    fn test_mesh_spans_devices() {
        let rt = Runtime::tpu(8);
        let mesh = rt.mesh("dev");
        assert_eq!(mesh.devices(), 8);
        assert_eq!(mesh.axis(), "dev");
    }

    #[test]
    fn test_platform_capability() {
        assert!(!Platform::Cpu.supports_partitioned_callback());
        assert!(Platform::Tpu.supports_partitioned_callback());
    }

    #[test]
    fn test_arange_dtype() {
        let a = Array::arange(2, DType::Float32);
        assert_eq!(a.as_slice(), &[0.0, 1.0]);
    }
}
