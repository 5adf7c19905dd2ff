//! usbmount-core: Core library for USB mass-storage mount management.
//!
//! This library inventories removable block devices attached via USB,
//! presents them as a device → partitions tree, and mounts/unmounts selected
//! partitions under a managed mount root with idempotent, per-target
//! recoverable semantics.
//!
//! # Modules
//!
//! - [`discovery`]: Inventory building via udev enumeration
//! - [`inventory`]: The Device/Partition/Inventory data model
//! - [`mountpoint`]: Mount point paths and directory chain lifecycle
//! - [`mount`]: The mount backend seam and its system implementation
//! - [`orchestrator`]: Target selection and mount/unmount aggregation
//! - [`render`]: Table and detail rendering
//! - [`size`]: Byte size formatting
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use usbmount_core::{discovery, orchestrator, render};
//! use usbmount_core::{Selector, SizeFormat, SystemMount};
//!
//! // Snapshot the attached USB mass-storage devices.
//! let inventory = discovery::scan().unwrap();
//! println!("{}", render::table_str(&inventory, SizeFormat::Binary));
//!
//! // Mount every partition of the device at USB topology path "1.2".
//! let paths = vec!["1.2".to_string()];
//! let report = orchestrator::mount_targets(
//!     &inventory,
//!     Selector::Paths(&paths),
//!     &SystemMount::new(),
//!     Path::new(usbmount_core::mountpoint::DEFAULT_MOUNT_ROOT),
//! );
//! std::process::exit(report.exit_code());
//! ```

pub mod discovery;
pub mod error;
pub mod inventory;
pub mod mount;
pub mod mountpoint;
pub mod orchestrator;
pub mod render;
pub mod size;

// Re-export commonly used types
pub use error::{Error, Result};
pub use inventory::{Device, Inventory, Partition};
pub use mount::{MountBackend, SystemMount};
pub use orchestrator::{OperationReport, Selector, TargetOutcome, TargetStatus};
pub use size::SizeFormat;
