//! A small C-ABI library (`factorial`, `greet`, `repeat_string`, `shout_it`,
//! `maybe`, `sort_json_array`) together with the Rust side that calls it, either
//! linked in-process or loaded from a shared object at run time.

pub mod bindings;
pub mod demo;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod ops;

pub use bindings::{DynamicApi, ExampleApi, LinkedApi, default_library_name};
pub use demo::run_demo;
pub use error::{ExampleError, Result};
