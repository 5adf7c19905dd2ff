//! Inventory rendering.
//!
//! Two read-only views over an [`Inventory`]: an aligned column table with
//! partition rows indented under their device using tree-branch connectors,
//! and a verbose key/value detail listing. Both are pure functions returning
//! owned strings and both handle an empty inventory (header-only table,
//! empty detail string).

use std::fmt::Write;

use crate::inventory::{Device, Inventory, Partition};
use crate::size::{SizeFormat, format_size};

/// Fixed English column headers, also the minimum column widths.
const HEADERS: [&str; 7] = [
    "NODE",
    "DEV_PATH",
    "SIZE",
    "LABEL",
    "TYPE",
    "MANUFACTURER",
    "PRODUCT",
];

/// Placeholder for an empty filesystem label.
const EMPTY_LABEL: &str = "(none)";
/// Placeholder for an empty filesystem type.
const EMPTY_TYPE: &str = "(unknown)";
/// Placeholder for cells that do not apply to partition rows.
const NOT_APPLICABLE: &str = "(n/a)";

/// Branch connector for a partition that has following siblings.
const BRANCH: &str = " ├─ ";
/// Branch connector for the last partition of a device.
const BRANCH_LAST: &str = " ╰─ ";
/// Display width of a branch connector; partition cells in connector columns
/// reserve this on top of their content width.
const INDENT: usize = 4;

/// Number of leading columns that carry the branch connector on partition
/// rows (node, dev_path, size, label).
const CONNECTOR_COLUMNS: usize = 4;

/// One prepared table row: the cell texts plus the connector for partition
/// rows.
struct Row {
    cells: [String; 7],
    connector: Option<&'static str>,
}

/// Renders the inventory as an aligned table.
///
/// Column widths are the maximum over the header, every device cell, and
/// every partition cell (plus the indent allowance in connector columns),
/// with the placeholder strings participating in the computation. Cells are
/// left-justified, padded, and tab-separated. An empty inventory produces
/// exactly the header row.
pub fn table_str(inventory: &Inventory, format: SizeFormat) -> String {
    let mut rows = Vec::new();

    for device in &inventory.devices {
        rows.push(device_row(device, format));

        let last = device.partitions.len().saturating_sub(1);
        for (index, partition) in device.partitions.iter().enumerate() {
            let connector = if index == last { BRANCH_LAST } else { BRANCH };
            rows.push(partition_row(partition, format, connector));
        }
    }

    let widths = column_widths(&rows);
    let mut lines = vec![render_header(&widths)];

    for row in &rows {
        lines.push(render_row(row, &widths));
    }

    lines.join("\n")
}

fn device_row(device: &Device, format: SizeFormat) -> Row {
    Row {
        cells: [
            device.node.clone(),
            device.dev_path.clone(),
            format_size(device.size, format),
            or_placeholder(&device.label, EMPTY_LABEL),
            or_placeholder(&device.fs_type, EMPTY_TYPE),
            device.manufacturer.clone(),
            device.product.clone(),
        ],
        connector: None,
    }
}

fn partition_row(partition: &Partition, format: SizeFormat, connector: &'static str) -> Row {
    Row {
        cells: [
            partition.node.clone(),
            partition.dev_path.clone(),
            format_size(partition.size, format),
            or_placeholder(&partition.label, EMPTY_LABEL),
            or_placeholder(&partition.fs_type, EMPTY_TYPE),
            NOT_APPLICABLE.to_string(),
            NOT_APPLICABLE.to_string(),
        ],
        connector: Some(connector),
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

fn column_widths(rows: &[Row]) -> [usize; 7] {
    let mut widths = HEADERS.map(str::len);

    for row in rows {
        for (column, cell) in row.cells.iter().enumerate() {
            let mut width = cell.chars().count();

            if row.connector.is_some() && column < CONNECTOR_COLUMNS {
                width += INDENT;
            }

            if width > widths[column] {
                widths[column] = width;
            }
        }
    }

    widths
}

fn render_header(widths: &[usize; 7]) -> String {
    let cells: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(header, &width)| format!("{header:<width$}"))
        .collect();

    cells.join("\t")
}

fn render_row(row: &Row, widths: &[usize; 7]) -> String {
    let cells: Vec<String> = row
        .cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(column, (cell, &width))| match row.connector {
            Some(connector) if column < CONNECTOR_COLUMNS => {
                let width = width - INDENT;
                format!("{connector}{cell:<width$}")
            }
            _ => format!("{cell:<width$}"),
        })
        .collect();

    cells.join("\t")
}

/// Renders the inventory as a verbose detail listing.
///
/// One block of `LABEL:\tvalue` lines per device covering every device
/// attribute (the version attribute whitespace-trimmed), followed by an
/// indented sub-block per partition. Device blocks are separated by a blank
/// line. An empty inventory produces an empty string.
pub fn detail_str(inventory: &Inventory, format: SizeFormat) -> String {
    let mut out = String::new();

    for (index, device) in inventory.devices.iter().enumerate() {
        if index > 0 {
            out.push_str("\n\n");
        }

        let _ = write!(
            out,
            "NODE:        \t{}\n\
             BUS:         \t{}\n\
             DEV_PATH:    \t{}\n\
             SIZE:        \t{}\n\
             LABEL:       \t{}\n\
             TYPE:        \t{}\n\
             MANUFACTURER:\t{}\n\
             PRODUCT:     \t{}\n\
             SERIAL:      \t{}\n\
             SYS_PATH:    \t{}\n\
             VERSION:     \t{}\n\
             SPEED:       \t{}\n\
             MAX_CHILDREN:\t{}",
            device.node,
            device.bus,
            device.dev_path,
            format_size(device.size, format),
            device.label,
            device.fs_type,
            device.manufacturer,
            device.product,
            device.serial,
            device.sys_path,
            device.version.trim(),
            device.speed,
            device.max_children,
        );

        for partition in &device.partitions {
            let _ = write!(
                out,
                "\n\
                 PARTITION:   \t    {}\n\
                 \x20   NODE:    \t    {}\n\
                 \x20   DEV_PATH:\t    {}\n\
                 \x20   SIZE:    \t    {}\n\
                 \x20   LABEL:   \t    {}\n\
                 \x20   TYPE:    \t    {}\n\
                 \x20   SYS_PATH:\t    {}",
                partition.num,
                partition.node,
                partition.dev_path,
                format_size(partition.size, format),
                partition.label,
                partition.fs_type,
                partition.sys_path,
            );
        }
    }

    out
}
