// src/demo.rs
//
// The fixed call sequence of the example program. Each line is written as soon
// as its call returns so that the library's own stdout output from `shout_it`
// lands in order when `out` is stdout.

use std::io::Write;

use tracing::info;

use crate::bindings::ExampleApi;
use crate::error::Result;

pub const GREET_NAME: &str = "World";
pub const REPEAT_INPUT: (&str, i64) = ("ha", 3);
pub const SHOUT_MESSAGE: &str = "hello from yamlscript";
pub const SORT_INPUT: [i64; 8] = [3, 1, 4, 1, 5, 9, 2, 6];

/// Lines `run_demo` writes itself; `shout_it` adds one more on stdout.
pub const WRITTEN_LINES: usize = 14;

pub fn run_demo<A: ExampleApi + ?Sized, W: Write + ?Sized>(api: &A, out: &mut W) -> Result<()> {
    info!("running demo");

    for n in 1..=10 {
        writeln!(out, "{}! = {}", n, api.factorial(n)?)?;
    }

    writeln!(out, "{}", api.greet(GREET_NAME)?)?;

    let (s, times) = REPEAT_INPUT;
    writeln!(out, "{}", api.repeat_string(s, times)?)?;

    out.flush()?;
    api.shout_it(SHOUT_MESSAGE)?;

    writeln!(out, "maybe: {}", api.maybe()?)?;

    let data = serde_json::to_string(&SORT_INPUT)?;
    writeln!(out, "sorted: {}", api.sort_json_array(&data)?)?;
    out.flush()?;

    info!("demo finished");
    Ok(())
}
