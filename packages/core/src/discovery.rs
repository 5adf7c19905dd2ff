//! Device discovery via udev.
//!
//! Builds the [`Inventory`] snapshot by enumerating SCSI device records and
//! resolving, for each candidate, its USB bus-attachment parent and its
//! block/scsi_disk children. A candidate joins the inventory only when all
//! three resolve; partial resolution (as can happen mid hot-plug) silently
//! excludes the candidate, so a scan as a whole never fails because of one
//! bad record.
//!
//! Every attribute is copied into an owned `String` before the udev handles
//! are dropped; no record borrows backend memory past this module.

use std::str::FromStr;

use crate::error::{IoResultExt, Result};
use crate::inventory::{Device, Inventory, Partition};

/// Block device sector size used by the kernel's `size` sysfs attribute.
const SECTOR_SIZE: u64 = 512;

/// Scans the system for USB mass-storage devices.
///
/// The only fatal condition is failure to set up a udev enumeration; gaps in
/// individual candidates are skipped with a debug log entry.
pub fn scan() -> Result<Inventory> {
    let mut enumerator = udev::Enumerator::new().discovery_context()?;
    enumerator.match_subsystem("scsi").discovery_context()?;
    enumerator
        .match_property("DEVTYPE", "scsi_device")
        .discovery_context()?;

    let mut inventory = Inventory::new();

    for scsi in enumerator.scan_devices().discovery_context()? {
        if let Some(device) = build_device(&scsi)? {
            inventory.devices.push(device);
        }
    }

    Ok(inventory)
}

/// Resolves one SCSI candidate into a [`Device`], or `None` if the candidate
/// is not a fully-attached USB mass-storage device.
fn build_device(scsi: &udev::Device) -> Result<Option<Device>> {
    let Some(usb) = scsi
        .parent_with_subsystem_devtype("usb", "usb_device")
        .ok()
        .flatten()
    else {
        return Ok(None);
    };

    let Some(block) = child_with_subsystem(scsi, "block")? else {
        log::debug!("skipping {:?}: no block child yet", scsi.syspath());
        return Ok(None);
    };

    if child_with_subsystem(scsi, "scsi_disk")?.is_none() {
        log::debug!("skipping {:?}: no scsi_disk child", scsi.syspath());
        return Ok(None);
    }

    let Some(node) = block.devnode() else {
        log::debug!("skipping {:?}: no device node", block.syspath());
        return Ok(None);
    };

    let dev_path = attribute(&usb, "devpath");
    let sys_path = usb.syspath().to_string_lossy().into_owned();

    if dev_path.is_empty() || sys_path.is_empty() {
        log::debug!("skipping {:?}: unresolvable usb topology path", node);
        return Ok(None);
    }

    let mut device = Device {
        node: node.to_string_lossy().into_owned(),
        manufacturer: attribute(&usb, "manufacturer"),
        product: attribute(&usb, "product"),
        serial: attribute(&usb, "serial"),
        dev_path,
        label: property(&block, "ID_FS_LABEL"),
        fs_type: property(&block, "ID_FS_TYPE"),
        sys_path,
        version: attribute(&usb, "version"),
        speed: attribute(&usb, "speed"),
        bus: parse_or_zero(&attribute(&usb, "busnum")),
        size: parse_or_zero::<u64>(&attribute(&block, "size")) * SECTOR_SIZE,
        max_children: parse_or_zero(&attribute(&usb, "maxchild")),
        partitions: Vec::new(),
    };

    device.partitions = scan_partitions(&device, &block)?;

    Ok(Some(device))
}

/// Enumerates the partitions of a block device.
///
/// Scoped to children of `block` carrying a `partition` index attribute;
/// records whose index or node cannot be resolved are skipped.
fn scan_partitions(device: &Device, block: &udev::Device) -> Result<Vec<Partition>> {
    let mut enumerator = udev::Enumerator::new().discovery_context()?;
    enumerator.match_parent(block).discovery_context()?;
    enumerator.match_subsystem("block").discovery_context()?;
    enumerator
        .match_attribute("partition", "*")
        .discovery_context()?;

    let mut partitions = Vec::new();

    for record in enumerator.scan_devices().discovery_context()? {
        let num: u32 = parse_or_zero(&attribute(&record, "partition"));

        let Some(node) = record.devnode() else {
            log::debug!("skipping partition {:?}: no device node", record.syspath());
            continue;
        };

        if num == 0 {
            log::debug!("skipping partition {:?}: no partition index", node);
            continue;
        }

        partitions.push(Partition {
            node: node.to_string_lossy().into_owned(),
            num,
            dev_path: device.partition_dev_path(num),
            label: property(&record, "ID_FS_LABEL"),
            fs_type: property(&record, "ID_FS_TYPE"),
            sys_path: record.syspath().to_string_lossy().into_owned(),
            size: parse_or_zero::<u64>(&attribute(&record, "size")) * SECTOR_SIZE,
        });
    }

    Ok(partitions)
}

/// Finds the first child of `parent` in the given subsystem, if any.
fn child_with_subsystem(parent: &udev::Device, subsystem: &str) -> Result<Option<udev::Device>> {
    let mut enumerator = udev::Enumerator::new().discovery_context()?;
    enumerator.match_parent(parent).discovery_context()?;
    enumerator.match_subsystem(subsystem).discovery_context()?;

    Ok(enumerator.scan_devices().discovery_context()?.next())
}

/// Copies a sysfs attribute out of a udev record, defaulting to empty.
fn attribute(device: &udev::Device, name: &str) -> String {
    device
        .attribute_value(name)
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Copies a udev property out of a record, defaulting to empty.
fn property(device: &udev::Device, name: &str) -> String {
    device
        .property_value(name)
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parses a numeric sysfs attribute, treating absent or malformed values as
/// zero.
fn parse_or_zero<T: FromStr + Default>(value: &str) -> T {
    value.trim().parse().unwrap_or_default()
}
