//! Boot-time module list (`/etc/modules`, `modules-load.d/*.conf`).
//!
//! The file holds one module per line. Lines starting with `#` and blank
//! lines are ignored, and anything after the first whitespace on a line is a
//! module parameter that is stripped when extracting the name.
//!
//! Edits keep every unrelated line (comments, blanks, ordering) untouched.

use std::collections::BTreeSet;

/// Extract the module name from a configuration line.
///
/// Returns `None` for blank lines and comments.
///
/// # Examples
///
/// ```
/// # use kmod_manager::config::persist::strip_module_name;
/// assert_eq!(strip_module_name("  lp io=0x378 "), Some("lp"));
/// assert_eq!(strip_module_name("# lp"), None);
/// assert_eq!(strip_module_name("   "), None);
/// ```
pub fn strip_module_name(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    trimmed.split_whitespace().next()
}

/// In-memory view of the persisted module configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedModuleSet {
    lines: Vec<String>,
}

impl PersistedModuleSet {
    /// Wrap raw file lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        PersistedModuleSet { lines }
    }

    /// Raw lines, ready to be written back.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Module names in file order, each name listed once.
    pub fn names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.lines
            .iter()
            .filter_map(|line| strip_module_name(line))
            .filter(|name| seen.insert(name.to_string()))
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lines
            .iter()
            .any(|line| strip_module_name(line) == Some(name))
    }

    /// Append `name` unless it is already listed.
    ///
    /// Returns the names that were newly persisted (empty if nothing changed).
    pub fn add(&mut self, name: &str) -> BTreeSet<String> {
        let mut added = BTreeSet::new();
        if self.contains(name) {
            return added;
        }
        self.lines.push(name.to_string());
        added.insert(name.to_string());
        added
    }

    /// Drop every line that lists `name`, or comment it out when `comment`
    /// is set.
    ///
    /// Returns the names that were removed (empty if `name` was not listed).
    pub fn remove(&mut self, name: &str, comment: bool) -> BTreeSet<String> {
        let mut removed = BTreeSet::new();
        if !self.contains(name) {
            return removed;
        }

        if comment {
            for line in self.lines.iter_mut() {
                if strip_module_name(line) == Some(name) {
                    *line = format!("#{}", line.trim_start());
                }
            }
        } else {
            self.lines
                .retain(|line| strip_module_name(line) != Some(name));
        }

        removed.insert(name.to_string());
        removed
    }
}
