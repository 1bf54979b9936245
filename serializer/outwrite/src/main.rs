//! The executable for the `outwrite` serializer.

use std::process::ExitCode;

use clap::Parser;
use outwrite_driver::Arguments;

fn main() -> ExitCode {
    env_logger::init();

    outwrite_driver::run(Arguments::parse())
}
