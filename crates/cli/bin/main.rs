#[macro_use]
extern crate tracing;

use clap::Parser;
use eyre::Result;
use fuzz_utils_cli::handler;

mod args;
mod cmd;

use args::{FuzzUtils, FuzzUtilsSubcommand};

fn main() -> Result<()> {
    handler::install();
    let args = FuzzUtils::parse();
    args.shell.init();
    run(args)
}

fn run(args: FuzzUtils) -> Result<()> {
    let config = args.config.file();
    match args.cmd {
        FuzzUtilsSubcommand::Init(cmd) => cmd.run(),
        FuzzUtilsSubcommand::Generate(cmd) => cmd.run(config),
        FuzzUtilsSubcommand::Convert(cmd) => cmd.run(config),
        FuzzUtilsSubcommand::Template(cmd) => cmd.run(config),
        FuzzUtilsSubcommand::ModifyCorpus(cmd) => cmd.run(config),
        FuzzUtilsSubcommand::Snapshot(cmd) => cmd.run(config),
        FuzzUtilsSubcommand::Restore(cmd) => cmd.run(config),
    }
}
