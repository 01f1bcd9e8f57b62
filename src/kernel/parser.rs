//! Parsers for kernel module listings.
//!
//! Handles:
//! - `lsmod` output (`Module  Size  Used by` table)
//! - `/proc/modules` (`name size refcount deps state offset`)
//! - module file names under `/lib/modules/<release>` (`.ko`, `.ko.xz`, ...)
//! - `modules.builtin` entries
//!
//! Parsing is total: a line that does not match the expected layout still
//! produces a record, with the unparseable fields left as `None`/empty.

use crate::models::ModuleRecord;

/// Parse `lsmod` output into one record per module line.
///
/// The header line and blank lines are skipped; every other line yields
/// exactly one record.
///
/// # Examples
///
/// ```
/// use kmod_manager::kernel::parser::parse_lsmod;
///
/// let output = "Module                  Size  Used by\n\
///               kvm_intel             380928  0\n\
///               kvm                  1142784  1 kvm_intel\n";
/// let records = parse_lsmod(output);
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].deps, vec!["kvm_intel".to_string()]);
/// ```
pub fn parse_lsmod(output: &str) -> Vec<ModuleRecord> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !is_lsmod_header(line))
        .map(parse_lsmod_line)
        .collect()
}

/// Parse a single `lsmod` row.
///
/// Column 1 is the name, 2 the size, 3 the use count, and 4 (if present) a
/// comma-separated list of dependent modules. A first column that is not a
/// module identifier leaves `name` as `None`.
pub fn parse_lsmod_line(line: &str) -> ModuleRecord {
    let mut columns = line.split_whitespace();

    let name = columns
        .next()
        .filter(|column| is_module_identifier(column))
        .map(str::to_string);
    let size = columns.next().and_then(|s| s.parse::<u64>().ok());
    let usecount = columns.next().and_then(|s| s.parse::<u32>().ok());
    let deps = columns.next().map(split_deps).unwrap_or_default();

    ModuleRecord {
        name,
        size,
        usecount,
        deps,
    }
}

/// Parse `/proc/modules` content.
///
/// Same column order as `lsmod` for the first four fields; the deps column
/// uses `-` for "none" and a trailing comma otherwise. State and load offset
/// are ignored.
pub fn parse_proc_modules(content: &str) -> Vec<ModuleRecord> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_lsmod_line)
        .collect()
}

fn is_lsmod_header(line: &str) -> bool {
    let mut columns = line.split_whitespace();
    columns.next() == Some("Module") && columns.next() == Some("Size")
}

fn is_module_identifier(column: &str) -> bool {
    column
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn split_deps(column: &str) -> Vec<String> {
    column
        .split(',')
        .map(str::trim)
        .filter(|dep| !dep.is_empty() && *dep != "-")
        .map(str::to_string)
        .collect()
}

/// Extract a module name from a file under the modules tree.
///
/// `snd-hda-intel.ko.zst` -> `snd_hda_intel`. Returns `None` for files that
/// are not kernel objects.
pub fn module_name_from_file(file_name: &str) -> Option<String> {
    let idx = file_name.find(".ko")?;
    let stem = &file_name[..idx];
    if stem.is_empty() {
        return None;
    }
    Some(normalize_module_name(stem))
}

/// Extract a module name from a `modules.builtin` line.
///
/// `kernel/drivers/char/lp.ko` -> `lp`
pub fn module_name_from_builtin(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let base = trimmed.rsplit('/').next().unwrap_or(trimmed);
    module_name_from_file(base)
}

/// The kernel treats `-` and `_` in module names as the same character.
pub fn normalize_module_name(name: &str) -> String {
    name.replace('-', "_")
}
