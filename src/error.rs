// src/error.rs
//
// Error type shared by the pure core, the C exports and the bindings.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExampleError {
    #[error("negative input: {what} = {value}")]
    NegativeInput { what: &'static str, value: i64 },

    #[error("{op}({n}) overflows")]
    Overflow { op: &'static str, n: i64 },

    #[error("cannot allocate {bytes} bytes: {source}")]
    Alloc {
        bytes: usize,
        #[source]
        source: std::collections::TryReserveError,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of numbers, got {found}")]
    NotANumberArray { found: String },

    #[error("null pointer passed as `{arg}`")]
    NullPointer { arg: &'static str },

    #[error("argument `{arg}` is not valid UTF-8")]
    InvalidUtf8 { arg: &'static str },

    #[error("string contains an interior NUL byte")]
    InteriorNul(#[from] std::ffi::NulError),

    #[error("panic inside `{symbol}`: {message}")]
    Panic { symbol: &'static str, message: String },

    #[error("`{symbol}` failed: {message}")]
    Call { symbol: &'static str, message: String },

    #[error("failed to load library {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: libloading::Error,
    },

    #[error("library is missing symbol `{symbol}`: {source}")]
    Symbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("failed to write demo output: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExampleError>;
