use crate::cmd::{
    convert::ConvertArgs,
    generate::GenerateArgs,
    history::{RestoreArgs, SnapshotArgs},
    init::InitArgs,
    modify::ModifyArgs,
    template::TemplateArgs,
};
use clap::{Parser, Subcommand};
use fuzz_utils_cli::opts::{ConfigOpts, ShellOptions};

/// Turn Echidna and Medusa corpora into Foundry unit tests, convert them between the fuzzers, and
/// scaffold fuzzing harnesses.
#[derive(Parser)]
#[command(
    name = "fuzz-utils",
    version,
    after_help = "Find more information at https://github.com/crytic/fuzz-utils",
    next_display_order = None,
)]
pub struct FuzzUtils {
    #[command(subcommand)]
    pub cmd: FuzzUtilsSubcommand,

    #[command(flatten)]
    pub config: ConfigOpts,

    #[command(flatten)]
    pub shell: ShellOptions,
}

#[derive(Subcommand)]
pub enum FuzzUtilsSubcommand {
    /// Write a config file with the default settings of every command.
    Init(InitArgs),

    /// Generate Foundry unit tests from a fuzzer corpus.
    #[command(visible_alias = "g")]
    Generate(GenerateArgs),

    /// Convert a corpus from one fuzzer's format to the other's.
    Convert(ConvertArgs),

    /// Generate a fuzzing harness for the target contracts.
    #[command(visible_alias = "t")]
    Template(TemplateArgs),

    /// Remove calls the fuzzer can no longer replay from a corpus.
    ModifyCorpus(ModifyArgs),

    /// Save the current corpus to the history.
    Snapshot(SnapshotArgs),

    /// Restore a corpus from the history, or list the saved corpora.
    Restore(RestoreArgs),
}
