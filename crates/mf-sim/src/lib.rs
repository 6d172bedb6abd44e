//! Sequential steady-state runs over timeseries data.
//!
//! A run clones the base network once per step, injects that step's series
//! values, solves through a backend and carries tracked and inter-step
//! state into the next step's assembly.

pub mod data;
pub mod error;
pub mod result;
pub mod run;

pub use data::TimeseriesData;
pub use error::{SimError, SimResult};
pub use result::{StepOutcome, StepRecord, TimeseriesResult};
pub use run::{RunOptions, StepErrorPolicy, StepHook, run};
