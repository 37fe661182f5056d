//! icon-tokens: lay out SVG icons as printable circular tokens

use std::process::ExitCode;

use icon_tokens::cli;

fn main() -> ExitCode {
    cli::run()
}
