//! usbmount - Mount manager for USB mass storage devices.
//!
//! Bare invocation lists the attached devices as a table (or a verbose
//! detail listing with `-v`); the `mount` and `umount` subcommands operate
//! on devices/partitions selected by their USB topology path.
//!
//! `-h` selects binary human-readable sizing (matching the historical flag
//! surface of this tool), so clap's short help flag is disabled and help is
//! available as `--help`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use usbmount_core::mountpoint::DEFAULT_MOUNT_ROOT;
use usbmount_core::{Inventory, Selector, SizeFormat, SystemMount, discovery, orchestrator, render};

/// Mount manager for USB mass storage devices.
#[derive(Parser)]
#[command(name = "usbmount")]
#[command(about = "Mount manager for USB mass storage devices", long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Produce verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Print all USB devices
    #[arg(short = 'a', long)]
    all: bool,

    /// Human-readable sizes in powers of 1024
    #[arg(short = 'h', long = "human-readable", conflicts_with = "si")]
    human_readable: bool,

    /// Human-readable sizes in powers of 1000
    #[arg(short = 'H', long = "si")]
    si: bool,

    /// Mount root under which mount point directories are managed
    #[arg(long, global = true, default_value = DEFAULT_MOUNT_ROOT)]
    root: PathBuf,

    /// Print help
    #[arg(long, action = ArgAction::HelpLong)]
    help: Option<bool>,

    /// USB topology paths to list (all devices when omitted)
    paths: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount USB mass storage devices
    Mount {
        /// Mount all USB devices
        #[arg(short, long)]
        all: bool,

        /// USB topology paths (device or partition)
        paths: Vec<String>,
    },
    /// Unmount USB mass storage devices
    Umount {
        /// Unmount all USB devices
        #[arg(short, long)]
        all: bool,

        /// USB topology paths (device or partition)
        paths: Vec<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let inventory = match discovery::scan() {
        Ok(inventory) => inventory,
        Err(err) => {
            log::error!("{err}");
            return exit_code(err.exit_code());
        }
    };

    let backend = SystemMount::new();

    let code = match &cli.command {
        Some(Commands::Mount { all, paths }) => {
            warn_if_not_root();
            let report = orchestrator::mount_targets(
                &inventory,
                selector(*all, paths),
                &backend,
                &cli.root,
            );
            report.exit_code()
        }
        Some(Commands::Umount { all, paths }) => {
            warn_if_not_root();
            let report = orchestrator::unmount_targets(
                &inventory,
                selector(*all, paths),
                &backend,
                &cli.root,
            );
            report.exit_code()
        }
        None => {
            print_listing(&cli, inventory);
            0
        }
    };

    exit_code(code)
}

fn selector(all: bool, paths: &[String]) -> Selector<'_> {
    if all {
        Selector::All
    } else {
        Selector::Paths(paths)
    }
}

fn print_listing(cli: &Cli, inventory: Inventory) {
    let format = if cli.human_readable {
        SizeFormat::Binary
    } else if cli.si {
        SizeFormat::Decimal
    } else {
        SizeFormat::Exact
    };

    let inventory = if cli.all || cli.paths.is_empty() {
        inventory
    } else {
        Inventory {
            devices: inventory
                .devices
                .into_iter()
                .filter(|device| cli.paths.iter().any(|path| *path == device.dev_path))
                .collect(),
        }
    };

    if cli.verbose {
        println!("{}", render::detail_str(&inventory, format));
    } else {
        println!("{}", render::table_str(&inventory, format));
    }
}

fn warn_if_not_root() {
    if !nix::unistd::Uid::effective().is_root() {
        log::warn!("not running as root; mount operations will likely be refused");
    }
}

fn exit_code(code: i32) -> ExitCode {
    // ExitCode is a u8 on every supported platform; out-of-range failure
    // codes must not collapse to 0.
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
