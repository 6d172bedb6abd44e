use mf_core::{Eid, SystemError};
use mf_graph::{Carrier, NetworkError};
use thiserror::Error;

pub type FormResult<T> = Result<T, FormulationError>;

#[derive(Error, Debug)]
pub enum FormulationError {
    #[error("no {kind} formulation registered for model {model} of {eid} (carrier {carrier:?})")]
    MissingFormulation {
        kind: &'static str,
        model: &'static str,
        eid: Eid,
        carrier: Option<Carrier>,
    },

    #[error("formulation dispatched for {eid} expected a {expected} model")]
    ModelMismatch { eid: Eid, expected: &'static str },

    #[error("{eid} must belong to a {expected} grid")]
    GridMismatch { eid: Eid, expected: &'static str },

    #[error("invalid parameter on {eid}: {what}")]
    InvalidParameter { eid: Eid, what: &'static str },

    #[error("compound {eid} was never expanded into a network")]
    NotExpanded { eid: Eid },

    #[error(transparent)]
    System(#[from] SystemError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}
