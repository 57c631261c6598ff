//! `quill` - plain-text issue tracker
//!
//! This crate provides the `ql` command-line tool on top of `quill-lib`.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Workspace discovery, config files and actor resolution
//! - [`format`] - Output formatting (text, JSON)
//! - [`logging`] - `tracing` subscriber setup
//!
//! Records, the item cache and every tracker action live in `quill_lib`.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod format;
pub mod logging;

pub use cli::run;
pub use quill_lib::{QuillError, Result};
