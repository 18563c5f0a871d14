// src/ffi/mod.rs
//
// The C-ABI surface of the library. Symbol names here are the contract with
// include/example.h; everything else in the crate is reachable from Rust only.

mod exports;
mod scaffold;

pub use exports::*;
pub use scaffold::last_error;
