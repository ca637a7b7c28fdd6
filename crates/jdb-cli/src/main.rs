use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::BufReader;

use jdb_runtime::debugger::{breakpoint, BreakpointOptions, DebuggerIo};
use jdb_runtime::{Array, DType, ExecContext, ExecError, Frame, Runtime, SourceInfo};

/// jdb - interactive breakpoint debugger for the staged array runtime.
///
/// Runs a built-in demo program under the chosen execution backend with a
/// breakpoint wired to this process's stdin/stdout, so the session can be
/// driven interactively or from a piped command script. Exhausting stdin
/// (or `q`) inside a session aborts the whole run with a non-zero exit.
///
/// EXAMPLES:
///     jdb                          Debug the demo eagerly
///     jdb --backend vmap           One session per vectorized lane
///     echo 'p y' | jdb             Replay a command script
///
/// ENVIRONMENT VARIABLES:
///     JDB_NUM_FRAMES    Default maximum captured frame depth
///     JDB_LIST_WINDOW   Source lines shown by the `l` command
#[derive(Parser)]
#[command(name = "jdb")]
#[command(version)]
struct Cli {
    /// Execution backend to run the demo program under
    #[arg(long, value_enum, default_value_t = Backend::Eager)]
    backend: Backend,
    /// Force deterministic, index-ascending session order across lanes
    #[arg(long)]
    ordered: bool,
    /// Keep only the innermost N captured frames
    #[arg(long, env = "JDB_NUM_FRAMES")]
    num_frames: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Plain host dispatch
    Eager,
    /// Compiled (staged) execution
    Jit,
    /// Vectorized, one session per lane
    Vmap,
    /// Replicated, one session per device
    Pmap,
    /// Partitioned over a device mesh
    Pjit,
}

const DEMO_SRC: &str = "\
|ctx, x| {
    let y = x.sin();
    breakpoint(ctx, &io, frame, &opts)?;
    Ok(y.exp())
}";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let io = DebuggerIo::new(BufReader::new(std::io::stdin()), std::io::stdout());
    let mut opts = BreakpointOptions::cli().ordered(cli.ordered);
    opts.num_frames = cli.num_frames;

    let demo = |ctx: &ExecContext, x: Array| -> Result<Array, ExecError> {
        let y = x.sin();
        let frame = Frame::new("demo", SourceInfo::new("demo.rs", 1, DEMO_SRC).at_line(2))
            .with_local("x", &x)
            .with_local("y", &y);
        breakpoint(ctx, &io, frame, &opts)?;
        Ok(y.exp())
    };

    let out = match cli.backend {
        Backend::Eager => Runtime::cpu(2).run(demo, &Array::scalar_f32(2.0))?,
        Backend::Jit => Runtime::cpu(2).jit(demo, &Array::scalar_f32(2.0))?,
        Backend::Vmap => Runtime::cpu(2).vmap(demo, &Array::arange(2, DType::Float32))?,
        Backend::Pmap => Runtime::cpu(2).pmap(demo, &Array::arange(2, DType::Float32))?,
        Backend::Pjit => {
            let rt = Runtime::tpu(8);
            let mesh = rt.mesh("dev");
            rt.pjit(demo, &mesh, &Array::arange(8, DType::Float32))?
        }
    };
    println!("result: {out}");
    Ok(())
}
