//! Mount/unmount orchestration.
//!
//! Walks the inventory filtered by a [`Selector`], drives the mount backend
//! and the mount point directory lifecycle per partition, and aggregates the
//! per-target outcomes into one [`OperationReport`].
//!
//! Per-target failures never stop the walk: every selected target is
//! processed, each failure is logged, and the report's exit code reflects the
//! last non-zero failure code seen. Callers needing the full per-target
//! picture consult [`OperationReport::outcomes`] rather than the exit code.

use std::path::{Path, PathBuf};

use snafu::ensure;

use crate::error::{AlreadyMountedSnafu, Error, Result};
use crate::inventory::{Device, Inventory, Partition};
use crate::mount::MountBackend;
use crate::mountpoint::{ensure_directory_chain, mount_point_for, prune_directory_chain};

/// Which devices/partitions an operation applies to.
///
/// Explicit paths are matched against `Device.dev_path` (targeting every
/// partition of that device) and `Partition.dev_path` (targeting just that
/// partition). Paths that match nothing are silently ignored; the tool
/// favors best-effort operation over strict validation.
#[derive(Debug, Clone, Copy)]
pub enum Selector<'a> {
    /// Every partition of every device, in inventory order.
    All,
    /// Explicit `dev_path` strings.
    Paths(&'a [String]),
}

impl Selector<'_> {
    /// Returns true if the given partition of the given device is targeted.
    fn targets(&self, device: &Device, partition: &Partition) -> bool {
        match self {
            Selector::All => true,
            Selector::Paths(paths) => paths
                .iter()
                .any(|path| *path == device.dev_path || *path == partition.dev_path),
        }
    }
}

/// Terminal state of one selected partition.
#[derive(Debug)]
pub enum TargetStatus {
    /// Partition was mounted.
    Mounted,
    /// Partition was unmounted and its directory chain pruned.
    Unmounted,
    /// Unmount requested but the partition was not mounted; nothing done.
    SkippedNotMounted,
    /// The target failed; the error carries the exit code.
    Failed(Error),
}

/// Outcome record for one selected partition.
#[derive(Debug)]
pub struct TargetOutcome {
    /// The partition's inventory-unique selector key.
    pub dev_path: String,
    /// The partition's device node.
    pub node: String,
    /// The resolved mount point.
    pub mount_point: PathBuf,
    /// What happened.
    pub status: TargetStatus,
}

/// Aggregated result of a mount or unmount invocation.
#[derive(Debug, Default)]
pub struct OperationReport {
    /// Per-target outcomes, in processing (inventory) order.
    pub outcomes: Vec<TargetOutcome>,
    last_error: i32,
}

impl OperationReport {
    fn record(&mut self, outcome: TargetOutcome) {
        if let TargetStatus::Failed(err) = &outcome.status {
            self.last_error = err.exit_code();
        }

        self.outcomes.push(outcome);
    }

    /// Returns true if no target failed.
    pub fn is_success(&self) -> bool {
        self.last_error == 0
    }

    /// Process exit status: 0 on full success, otherwise the last non-zero
    /// failure code observed across all targets.
    pub fn exit_code(&self) -> i32 {
        self.last_error
    }
}

/// Mounts every selected partition.
pub fn mount_targets<B: MountBackend>(
    inventory: &Inventory,
    selector: Selector,
    backend: &B,
    mount_root: &Path,
) -> OperationReport {
    walk_targets(inventory, selector, |device, partition| {
        let mount_point = mount_point_for(mount_root, device, partition);

        let status = match mount_partition(backend, partition, mount_root, &mount_point) {
            Ok(()) => TargetStatus::Mounted,
            Err(err) => {
                log::warn!("cannot mount {}: {}", partition.node, err);
                TargetStatus::Failed(err)
            }
        };

        TargetOutcome {
            dev_path: partition.dev_path.clone(),
            node: partition.node.clone(),
            mount_point,
            status,
        }
    })
}

/// Unmounts every selected partition.
pub fn unmount_targets<B: MountBackend>(
    inventory: &Inventory,
    selector: Selector,
    backend: &B,
    mount_root: &Path,
) -> OperationReport {
    walk_targets(inventory, selector, |device, partition| {
        let mount_point = mount_point_for(mount_root, device, partition);

        let status = match unmount_partition(backend, partition, mount_root, &mount_point) {
            Ok(status) => {
                if matches!(status, TargetStatus::SkippedNotMounted) {
                    log::warn!("{} is not mounted", partition.node);
                }
                status
            }
            Err(err) => {
                log::warn!("cannot unmount {}: {}", partition.node, err);
                TargetStatus::Failed(err)
            }
        };

        TargetOutcome {
            dev_path: partition.dev_path.clone(),
            node: partition.node.clone(),
            mount_point,
            status,
        }
    })
}

/// Applies `operation` to every selected partition, in inventory order.
///
/// A device with zero partitions contributes nothing; only partitions are
/// ever mounted.
fn walk_targets<F>(inventory: &Inventory, selector: Selector, mut operation: F) -> OperationReport
where
    F: FnMut(&Device, &Partition) -> TargetOutcome,
{
    let mut report = OperationReport::default();

    for device in &inventory.devices {
        for partition in &device.partitions {
            if selector.targets(device, partition) {
                report.record(operation(device, partition));
            }
        }
    }

    report
}

/// Per-partition mount: ensure the directory chain, reject an
/// already-mounted partition as busy, otherwise mount.
fn mount_partition<B: MountBackend>(
    backend: &B,
    partition: &Partition,
    mount_root: &Path,
    mount_point: &Path,
) -> Result<()> {
    ensure_directory_chain(mount_root, mount_point)?;

    let node = Path::new(&partition.node);

    ensure!(
        !backend.is_mounted(node, mount_point)?,
        AlreadyMountedSnafu {
            node: partition.node.clone(),
            mount_point,
        }
    );

    backend.mount(node, mount_point)
}

/// Per-partition unmount: skip (non-fatally) when not mounted, otherwise
/// unmount and prune the directory chain.
fn unmount_partition<B: MountBackend>(
    backend: &B,
    partition: &Partition,
    mount_root: &Path,
    mount_point: &Path,
) -> Result<TargetStatus> {
    if !backend.is_mounted(Path::new(&partition.node), mount_point)? {
        return Ok(TargetStatus::SkippedNotMounted);
    }

    backend.unmount(mount_point)?;
    prune_directory_chain(mount_root, mount_point)?;

    Ok(TargetStatus::Unmounted)
}
