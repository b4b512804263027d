//! Subcommands of `fuzz-utils`.
//!
//! Every subcommand except `init` reads its section of the config file. Arguments given on the
//! command line are serialized and merged on top of it, so only the options the user actually
//! passed override the file.

pub mod convert;
pub mod generate;
pub mod history;
pub mod init;
pub mod modify;
pub mod template;
