//! Mount backend abstraction.
//!
//! The orchestrator only needs three primitives: "is this source/target pair
//! currently mounted", "mount it", and "unmount it". [`MountBackend`] keeps
//! that seam narrow so tests can substitute a fake; [`SystemMount`] is the
//! production implementation over the system `mount`/`umount` commands, which
//! also keeps filesystem-type detection delegated to the platform.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, IoResultExt, Result};

/// Transactional mount primitives consumed by the orchestrator.
pub trait MountBackend {
    /// Reports whether `source` is currently mounted at `target`.
    fn is_mounted(&self, source: &Path, target: &Path) -> Result<bool>;

    /// Mounts `source` at `target`.
    fn mount(&self, source: &Path, target: &Path) -> Result<()>;

    /// Unmounts whatever is mounted at `target`.
    fn unmount(&self, target: &Path) -> Result<()>;
}

/// Kernel mount table path for the current process.
const MOUNT_TABLE: &str = "/proc/self/mountinfo";

/// Production mount backend.
///
/// Mounts and unmounts via the system `mount`/`umount` commands and answers
/// mountedness queries from the kernel mount table.
pub struct SystemMount {
    mount_table: PathBuf,
}

impl Default for SystemMount {
    fn default() -> Self {
        Self {
            mount_table: PathBuf::from(MOUNT_TABLE),
        }
    }
}

impl SystemMount {
    /// Creates a backend reading the standard kernel mount table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend reading a specific mount table file.
    #[cfg(test)]
    fn with_mount_table(path: impl Into<PathBuf>) -> Self {
        Self {
            mount_table: path.into(),
        }
    }
}

impl MountBackend for SystemMount {
    fn is_mounted(&self, source: &Path, target: &Path) -> Result<bool> {
        let content = fs::read_to_string(&self.mount_table).mount_table_context()?;
        let source = source.to_string_lossy();

        Ok(parse_mount_table(&content)
            .iter()
            .any(|entry| entry.source == source && entry.target == target))
    }

    fn mount(&self, source: &Path, target: &Path) -> Result<()> {
        run_command("mount", &[source, target])
    }

    fn unmount(&self, target: &Path) -> Result<()> {
        run_command("umount", &[target])
    }
}

/// One mount table entry, reduced to the fields the backend matches on.
#[derive(Debug, PartialEq, Eq)]
struct MountEntry {
    source: String,
    target: PathBuf,
}

/// Parses `/proc/self/mountinfo` content.
///
/// Each line is `id parent maj:min root mount-point options [optional...] -
/// fstype source super-options`; the mount point is field five and the
/// source is the second field after the `-` separator. Unparseable lines are
/// skipped.
fn parse_mount_table(content: &str) -> Vec<MountEntry> {
    content.lines().filter_map(parse_mount_line).collect()
}

fn parse_mount_line(line: &str) -> Option<MountEntry> {
    let (mount_fields, fs_fields) = line.split_once(" - ")?;
    let target = mount_fields.split_whitespace().nth(4)?;
    let source = fs_fields.split_whitespace().nth(1)?;

    Some(MountEntry {
        source: unescape_mount_path(source),
        target: PathBuf::from(unescape_mount_path(target)),
    })
}

/// Decodes the octal escapes (`\040` for space etc.) the kernel uses for
/// special characters in mount table paths.
fn unescape_mount_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        let mut digits = String::new();
        while digits.len() < 3 {
            match chars.peek() {
                Some(&d) if d.is_digit(8) => {
                    digits.push(d);
                    chars.next();
                }
                _ => break,
            }
        }

        match u8::from_str_radix(&digits, 8) {
            Ok(byte) if digits.len() == 3 => result.push(byte as char),
            _ => {
                result.push('\\');
                result.push_str(&digits);
            }
        }
    }

    result
}

/// Runs a mount-layer command, mapping a non-zero exit to [`Error::CommandExit`].
fn run_command(program: &str, args: &[&Path]) -> Result<()> {
    let output = Command::new(program)
        .args(args)
        .output()
        .command_context(program)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(Error::CommandExit {
            command: program.to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_MOUNT_TABLE: &str = "\
25 1 8:2 / / rw,relatime shared:1 - ext4 /dev/sda2 rw\n\
91 25 8:17 / /media/usb1.2/partition1 rw,relatime shared:45 - vfat /dev/sdb1 rw,fmask=0022\n\
92 25 8:18 / /media/usb1.2/My\\040Stick rw,relatime - exfat /dev/sdb2 rw\n";

    #[test]
    fn test_parse_mount_table() {
        let entries = parse_mount_table(SAMPLE_MOUNT_TABLE);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].source, "/dev/sdb1");
        assert_eq!(
            entries[1].target,
            PathBuf::from("/media/usb1.2/partition1")
        );
    }

    #[test]
    fn test_parse_skips_garbage_lines() {
        let entries = parse_mount_table("not a mountinfo line\n");
        assert!(entries.is_empty());
    }

    #[test]
    fn test_unescape_mount_path() {
        assert_eq!(
            unescape_mount_path("/media/My\\040Stick"),
            "/media/My Stick"
        );
        assert_eq!(unescape_mount_path("/media/plain"), "/media/plain");
        // Incomplete escapes are kept verbatim.
        assert_eq!(unescape_mount_path("/media/odd\\04"), "/media/odd\\04");
    }

    #[test]
    fn test_is_mounted_matches_source_and_target() {
        let mut table = tempfile::NamedTempFile::new().unwrap();
        table.write_all(SAMPLE_MOUNT_TABLE.as_bytes()).unwrap();

        let backend = SystemMount::with_mount_table(table.path());

        assert!(
            backend
                .is_mounted(
                    Path::new("/dev/sdb1"),
                    Path::new("/media/usb1.2/partition1")
                )
                .unwrap()
        );
        // Same source, different target: not a match.
        assert!(
            !backend
                .is_mounted(Path::new("/dev/sdb1"), Path::new("/media/elsewhere"))
                .unwrap()
        );
        // Same target, different source: not a match.
        assert!(
            !backend
                .is_mounted(
                    Path::new("/dev/sdc1"),
                    Path::new("/media/usb1.2/partition1")
                )
                .unwrap()
        );
    }
}
