//! CLI command handlers. Each command is in its own file.

mod catalog;
mod check;
mod checksum;
mod list;
mod update;

pub use check::run_check;
pub use checksum::run_checksum;
pub use list::run_list;
pub use update::{run_update, UpdateOptions};
