//! Integration tests for staged virtual file trees

mod cli_commands;
mod config_loading;
mod merge_strategies;
mod test_utils;
mod visit_order;

pub use test_utils::{p, seeded_tree, with_config_env};
