// src/bin/main.rs
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use example::{DynamicApi, ExampleApi, LinkedApi, default_library_name, logging, run_demo};

#[derive(Parser, Debug)]
#[command(name = "example-demo")]
#[command(about = "Calls the example C-ABI library and prints the results")]
struct Cli {
    /// How to reach the library's exports
    #[arg(long, value_enum, env = "EXAMPLE_MODE", default_value_t = Mode::Linked)]
    mode: Mode,

    /// Shared library to load in dynamic mode (defaults to the platform name of
    /// `example`, searched on the loader path)
    #[arg(long, env = "EXAMPLE_LIBRARY")]
    library: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Call the exports compiled into this binary
    Linked,
    /// Open the shared library at run time
    Dynamic,
}

fn open_api(cli: &Cli) -> Result<Box<dyn ExampleApi>> {
    match cli.mode {
        Mode::Linked => Ok(Box::new(LinkedApi::new())),
        Mode::Dynamic => {
            let path = cli
                .library
                .clone()
                .map(PathBuf::into_os_string)
                .unwrap_or_else(default_library_name);
            let api = DynamicApi::open(&path)
                .with_context(|| format!("opening {}", path.to_string_lossy()))?;
            Ok(Box::new(api))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let api = open_api(&cli)?;
    // Unlocked stdout: the library's `shout_it` writes there too.
    let mut out = io::stdout();
    run_demo(api.as_ref(), &mut out).context("demo run failed")?;

    Ok(())
}
