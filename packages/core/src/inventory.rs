//! Device inventory model.
//!
//! An [`Inventory`] is a point-in-time snapshot of the attached USB
//! mass-storage devices: an ordered sequence of [`Device`] records, each
//! owning an ordered sequence of [`Partition`] records. Ownership is strictly
//! tree-shaped; partitions never outlive the device they were built for.
//!
//! The `dev_path` attribute (the stable USB topology address, e.g. `"1.2"`)
//! is the sole key used to address devices and partitions from the outside.
//! A partition's `dev_path` is always `{device.dev_path}-{num}`, which makes
//! it unique across the whole inventory.

/// One USB mass-storage block device.
///
/// Devices only appear in an inventory with non-empty `node`, `dev_path`, and
/// `sys_path`; candidates where these cannot be resolved are excluded at
/// discovery time rather than represented as partial records. Optional
/// attributes (label, filesystem type) default to the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Block special file path (e.g., "/dev/sdb").
    pub node: String,
    /// USB manufacturer string.
    pub manufacturer: String,
    /// USB product string.
    pub product: String,
    /// USB serial number.
    pub serial: String,
    /// Stable USB topology path (bus/port chain, e.g., "1.2").
    pub dev_path: String,
    /// Filesystem label of the whole-device volume, or empty.
    pub label: String,
    /// Filesystem type of the whole-device volume, or empty.
    pub fs_type: String,
    /// Discovery-backend identity path (sysfs path).
    pub sys_path: String,
    /// USB version string, as reported (may carry padding whitespace).
    pub version: String,
    /// USB speed in Mbps, as reported.
    pub speed: String,
    /// USB bus number.
    pub bus: u32,
    /// Size in bytes.
    pub size: u64,
    /// Maximum number of children reported for the attachment port.
    pub max_children: u32,
    /// Partitions, in discovery order.
    pub partitions: Vec<Partition>,
}

impl Device {
    /// Composes the inventory-unique `dev_path` for a partition of this
    /// device.
    pub fn partition_dev_path(&self, num: u32) -> String {
        format!("{}-{}", self.dev_path, num)
    }
}

/// One partition of a [`Device`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Block special file path (e.g., "/dev/sdb1").
    pub node: String,
    /// 1-based partition index.
    pub num: u32,
    /// `{device.dev_path}-{num}`; unique across the inventory.
    pub dev_path: String,
    /// Filesystem label, or empty.
    pub label: String,
    /// Filesystem type, or empty.
    pub fs_type: String,
    /// Discovery-backend identity path (sysfs path).
    pub sys_path: String,
    /// Size in bytes.
    pub size: u64,
}

/// Ordered snapshot of discovered devices.
///
/// Insertion order is discovery order; the inventory is never re-sorted, so
/// output order matches whatever the discovery backend yielded. It is rebuilt
/// from scratch on every invocation and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    /// Devices, in discovery order.
    pub devices: Vec<Device>,
}

impl Inventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no devices were discovered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Looks up a device by its `dev_path`.
    pub fn device(&self, dev_path: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.dev_path == dev_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(dev_path: &str, partition_nums: &[u32]) -> Device {
        let mut device = Device {
            node: "/dev/sdb".to_string(),
            manufacturer: "Kingston".to_string(),
            product: "DataTraveler".to_string(),
            serial: "001".to_string(),
            dev_path: dev_path.to_string(),
            label: String::new(),
            fs_type: String::new(),
            sys_path: format!("/sys/devices/usb/{dev_path}"),
            version: " 2.00".to_string(),
            speed: "480".to_string(),
            bus: 1,
            size: 8 * 1024 * 1024 * 1024,
            max_children: 0,
            partitions: Vec::new(),
        };

        for &num in partition_nums {
            device.partitions.push(Partition {
                node: format!("/dev/sdb{num}"),
                num,
                dev_path: device.partition_dev_path(num),
                label: String::new(),
                fs_type: "vfat".to_string(),
                sys_path: format!("/sys/devices/usb/{dev_path}/sdb{num}"),
                size: 1024 * 1024 * 1024,
            });
        }

        device
    }

    #[test]
    fn test_partition_dev_path_composition() {
        let device = device("1.2", &[1, 2]);
        assert_eq!(device.partitions[0].dev_path, "1.2-1");
        assert_eq!(device.partitions[1].dev_path, "1.2-2");
    }

    #[test]
    fn test_partition_dev_paths_unique_across_inventory() {
        let inventory = Inventory {
            devices: vec![device("1.2", &[1, 2]), device("1.3", &[1])],
        };

        let mut seen = std::collections::HashSet::new();
        for device in &inventory.devices {
            for partition in &device.partitions {
                assert!(seen.insert(partition.dev_path.clone()));
                assert_eq!(
                    partition.dev_path,
                    format!("{}-{}", device.dev_path, partition.num)
                );
            }
        }
    }

    #[test]
    fn test_device_lookup() {
        let inventory = Inventory {
            devices: vec![device("1.2", &[1])],
        };
        assert!(inventory.device("1.2").is_some());
        assert!(inventory.device("1.2-1").is_none());
        assert!(inventory.device("2.1").is_none());
    }
}
