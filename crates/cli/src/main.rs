//! `fetchgen`: generate a typed TypeScript fetch client from an OpenAPI document.

#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod generate;

#[derive(Parser, Debug)]
#[command(
    name = "fetchgen",
    version,
    about = "Generate a typed TypeScript fetch client from an OpenAPI document"
)]
struct Cli {
    #[command(flatten)]
    generate: generate::GenerateArgs,
}

fn main() {
    init_tracing();
    let code = match Cli::try_parse() {
        Ok(cli) => generate::run(cli.generate),
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    };
    std::process::exit(code);
}

fn init_tracing() {
    let crate_root = module_path!().to_string();

    // FETCHGEN_LOG takes a level ("debug") or a full filter spec
    // ("fetchgen_core=trace")
    let filter = match std::env::var("FETCHGEN_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("{crate_root}={level},{crate_root}_core={level}")
        }
        Ok(spec) => spec,
        Err(_) => format!("{crate_root}=warn,{crate_root}_core=warn"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}
