//! Polling runtime: clone, initial pass, then a refresh pass every
//! `sleep_time` seconds until Ctrl-C.

mod error;
mod runtime;

pub use error::DaemonError;
pub use runtime::{
    build_pipeline, init_tracing, run, run_loop, run_once, start_blocking, BoxedRunner, RunOptions,
};
