use crate::ids::Eid;
use thiserror::Error;

pub type SystemResult<T> = Result<T, SystemError>;

#[derive(Error, Debug)]
pub enum SystemError {
    #[error("duplicate variable declaration for {eid}.{name}")]
    DuplicateKey { eid: Eid, name: &'static str },

    #[error("no variable or constant registered for {eid}.{name}")]
    UnknownKey { eid: Eid, name: String },
}
