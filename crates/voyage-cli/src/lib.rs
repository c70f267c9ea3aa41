//! Voyage CLI library.
//!
//! Terminal styling utilities shared by the `voyage-cli` binary's
//! subcommands.

pub mod terminal;
