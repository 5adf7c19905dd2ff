//! Mount point path resolution and directory lifecycle.
//!
//! Mount point directories are structural scaffolding for mount targets, not
//! inventory state: they are created lazily right before a mount and pruned
//! opportunistically after an unmount. Pruning tolerates "not empty" so a
//! shared ancestor (`{root}/usb{dev_path}/` serving two partitions) survives
//! the removal of one partition's leaf directory without any sibling
//! bookkeeping.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nix::libc;

use crate::error::{IoResultExt, Result};
use crate::inventory::{Device, Partition};

/// Default prefix under which all managed mount point directories live.
pub const DEFAULT_MOUNT_ROOT: &str = "/media";

/// Computes the canonical mount point for a partition:
/// `{mount_root}/usb{device.dev_path}/partition{partition.num}`.
pub fn mount_point_for(mount_root: &Path, device: &Device, partition: &Partition) -> PathBuf {
    mount_root
        .join(format!("usb{}", device.dev_path))
        .join(format!("partition{}", partition.num))
}

/// Creates every path segment below `mount_root` down to the leaf.
///
/// Each directory is created with mode 0777 minus the process umask;
/// already-existing segments are not an error, so the call is idempotent.
/// `mount_root` itself is expected to exist.
pub fn ensure_directory_chain(mount_root: &Path, path: &Path) -> Result<()> {
    let relative = path.strip_prefix(mount_root).unwrap_or(path);
    let mut current = mount_root.to_path_buf();

    for component in relative.components() {
        current.push(component);

        match fs::create_dir(&current) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err).mount_point_context(current),
        }
    }

    Ok(())
}

/// Removes the directory chain from the leaf back toward `mount_root`.
///
/// "Does not exist" and "not empty" are tolerated as success; pruning stops
/// when it reaches `mount_root` (which is never removed) or hits any other
/// error. Safe to call while sibling partitions still occupy a shared
/// ancestor directory.
pub fn prune_directory_chain(mount_root: &Path, path: &Path) -> Result<()> {
    let mut current = path;

    while current != mount_root && current.starts_with(mount_root) {
        match fs::remove_dir(current) {
            Ok(()) => {}
            Err(err) if removal_tolerated(&err) => {}
            Err(err) => return Err(err).mount_point_removal_context(current),
        }

        let Some(parent) = current.parent() else {
            break;
        };

        current = parent;
    }

    Ok(())
}

/// Errno values rmdir may report that pruning treats as success.
///
/// EEXIST is the POSIX-permitted alias for ENOTEMPTY.
fn removal_tolerated(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::ENOENT) | Some(libc::ENOTEMPTY) | Some(libc::EEXIST)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{Device, Partition};

    fn fixture() -> (Device, Partition) {
        let device = Device {
            node: "/dev/sdb".to_string(),
            manufacturer: String::new(),
            product: String::new(),
            serial: String::new(),
            dev_path: "1.2".to_string(),
            label: String::new(),
            fs_type: String::new(),
            sys_path: "/sys/devices/usb/1.2".to_string(),
            version: String::new(),
            speed: String::new(),
            bus: 1,
            size: 0,
            max_children: 0,
            partitions: Vec::new(),
        };
        let partition = Partition {
            node: "/dev/sdb1".to_string(),
            num: 1,
            dev_path: device.partition_dev_path(1),
            label: String::new(),
            fs_type: String::new(),
            sys_path: "/sys/devices/usb/1.2/sdb1".to_string(),
            size: 0,
        };
        (device, partition)
    }

    #[test]
    fn test_mount_point_for() {
        let (device, partition) = fixture();
        assert_eq!(
            mount_point_for(Path::new("/media"), &device, &partition),
            PathBuf::from("/media/usb1.2/partition1")
        );
    }

    #[test]
    fn test_ensure_directory_chain_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("usb1.2").join("partition1");

        ensure_directory_chain(root.path(), &path).unwrap();
        assert!(path.is_dir());

        ensure_directory_chain(root.path(), &path).unwrap();
        assert!(path.is_dir());
    }

    #[test]
    fn test_prune_directory_chain_removes_empty_chain() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("usb1.2").join("partition1");

        ensure_directory_chain(root.path(), &path).unwrap();
        prune_directory_chain(root.path(), &path).unwrap();

        assert!(!root.path().join("usb1.2").exists());
        assert!(root.path().is_dir());
    }

    #[test]
    fn test_prune_directory_chain_never_removes_root() {
        let root = tempfile::tempdir().unwrap();

        prune_directory_chain(root.path(), root.path()).unwrap();
        assert!(root.path().is_dir());
    }

    #[test]
    fn test_prune_tolerates_occupied_sibling() {
        let root = tempfile::tempdir().unwrap();
        let first = root.path().join("usb1.2").join("partition1");
        let second = root.path().join("usb1.2").join("partition2");

        ensure_directory_chain(root.path(), &first).unwrap();
        ensure_directory_chain(root.path(), &second).unwrap();

        prune_directory_chain(root.path(), &first).unwrap();

        // The shared ancestor stays while the sibling still occupies it.
        assert!(!first.exists());
        assert!(second.is_dir());

        prune_directory_chain(root.path(), &second).unwrap();
        assert!(!root.path().join("usb1.2").exists());
    }

    #[test]
    fn test_prune_tolerates_missing_leaf() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("usb1.2").join("partition1");

        prune_directory_chain(root.path(), &path).unwrap();
        assert!(root.path().is_dir());
    }
}
