//! Entry name checks: a name becomes one directory under the destination root.

use crate::replace::WORK_DIR;

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Returns true if `name` is safe to join onto the destination root as a single component.
///
/// Rejects `.` and `..`, the replace work directory, path separators (`/`, `\`),
/// NUL and other control characters, and names longer than 255 bytes.
pub fn is_valid_entry_name(name: &str) -> bool {
    if matches!(name, "" | "." | "..") || name == WORK_DIR || name.len() > NAME_MAX {
        return false;
    }
    !name
        .chars()
        .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
}
