//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `types` | List identifier types in registry order |
//! | `validate --type T <input>` | Validate one identifier |
//! | `check --type T <file>` | Validate one identifier per line, in parallel |
//! | `plugin list`, `plugin test` | Inspect validator plugins |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - `Valid input!`, `ERROR: ...` or `WARNING: ...`
//! - `json` - one `ValidationReport` object per identifier
//!
//! ## Exit Codes
//!
//! `0` confirmed, `2` definitively invalid, `3` indeterminate, `1` for
//! operational errors such as a bad configuration file.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod plugin_cmd;
mod validate_cmd;

pub use app::{run, Cli, Commands};
pub use output::{exit_code, Output, OutputFormat};
pub use validate_cmd::check_all;
