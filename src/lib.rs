//! cmdfy turns a natural-language request into a shell command.
//!
//! A request goes to one AI provider (or, in comparison mode, to every
//! configured provider at once). The reply is a structured pipeline that is
//! assembled into a command line, then printed or run after a safety check.

pub mod ai;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod ui;
