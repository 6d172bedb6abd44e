//! mf-core: stable foundation for multiflow.
//!
//! Contains:
//! - ids (compact component ids + the unified `Eid` key)
//! - attr (variable/constant attributes + `VarSet` reflection)
//! - expr (expression AST, relations, equations)
//! - system (the solver-facing equation system / variable arena)
//! - step_state (inter-step state carried between timeseries steps)
//! - error (shared error types)

pub mod attr;
pub mod error;
pub mod expr;
pub mod ids;
pub mod step_state;
pub mod system;

// Re-exports: nice ergonomics for downstream crates
pub use attr::{Attr, VarSet, VarSpec};
pub use error::{SystemError, SystemResult};
pub use expr::{Equation, Expr, Rel, VarId, sum};
pub use ids::*;
pub use step_state::StepState;
pub use system::{EquationSystem, VarDecl};
