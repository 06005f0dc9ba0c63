use thiserror::Error;

use crate::transaction::OutputKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unexpected output kind: {kind:?}")]
    InvalidOutputKind { kind: OutputKind },

    #[error("only OP_RETURN scripts are supported")]
    MissingOpReturnMarker,

    #[error("OP_RETURN is limited to {max_pushes} data {}", push_noun(.max_pushes))]
    TooManyOrInvalidPushes { max_pushes: usize },

    #[error("OP_RETURN data size {size} exceeds the maximum of {max_size} bytes")]
    OpReturnTooLarge { size: usize, max_size: usize },

    #[error("amount for an OP_RETURN output must be zero, got {value}")]
    NonZeroOpReturnValue { value: u64 },

    #[error("script push at offset {offset} overruns the end of the script")]
    TruncatedScript { offset: usize },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("device error: {0}")]
    Device(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn push_noun(n: &usize) -> &'static str {
    if *n == 1 {
        "push"
    } else {
        "pushes"
    }
}
