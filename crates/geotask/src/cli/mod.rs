/*
[INPUT]:  Parsed subcommands and a task gateway
[OUTPUT]: One-shot task operations printed to stdout
[POS]:    CLI layer - non-interactive commands and init wizard
[UPDATE]: When adding subcommands
*/

pub mod commands;
pub mod init;

pub use commands::{run_add, run_delete, run_done, run_list, run_show};
pub use init::run_init;
