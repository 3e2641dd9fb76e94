//! taskset: show or change the CPU affinity of a process
//!
//! Usage:
//!   taskset get [--pid PID] [--cpu-list]
//!   taskset set [--pid PID] [--cpu-list] MASK
//!
//! MASK is hexadecimal (`f`, `0x30`) unless `--cpu-list` is given, in which
//! case it is a cpulist (`0-3,8`). PID 0, the default, is taskset itself.

mod logger;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sysbind::process::getpid;
use sysbind::sched::{sched_getaffinity, sched_setaffinity};
use sysbind::{CpuSet, Pid};

#[derive(Parser)]
#[command(name = "taskset", about = "Show or change the CPU affinity of a process")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the affinity of a process.
    Get {
        /// Process to inspect (0 = this process)
        #[arg(short, long, default_value_t = 0)]
        pid: i32,
        /// Print a cpulist instead of a hex mask
        #[arg(short = 'c', long)]
        cpu_list: bool,
    },
    /// Replace the affinity of a process.
    Set {
        /// Process to change (0 = this process)
        #[arg(short, long, default_value_t = 0)]
        pid: i32,
        /// Read MASK as a cpulist instead of a hex mask
        #[arg(short = 'c', long)]
        cpu_list: bool,
        /// New affinity
        mask: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Cmd::Get { pid, cpu_list } => {
            let set = affinity_of(Pid::from_raw(pid))?;
            println!("{}", describe(display_pid(pid), "current", &set, cpu_list));
        }
        Cmd::Set {
            pid,
            cpu_list,
            mask,
        } => {
            let pid_arg = Pid::from_raw(pid);
            let new = parse_mask(&mask, cpu_list)?;
            let current = affinity_of(pid_arg)?;
            println!("{}", describe(display_pid(pid), "current", &current, cpu_list));

            sched_setaffinity(pid_arg, &new)
                .with_context(|| format!("failed to set pid {}'s affinity", display_pid(pid)))?;
            log::info!("pid {} now restricted to {} cpu(s)", display_pid(pid), new.count());

            let applied = affinity_of(pid_arg)?;
            println!("{}", describe(display_pid(pid), "new", &applied, cpu_list));
        }
    }
    Ok(())
}

fn affinity_of(pid: Pid) -> Result<CpuSet> {
    let mut set = CpuSet::new();
    let bytes = sched_getaffinity(pid, &mut set)
        .with_context(|| format!("failed to get pid {}'s affinity", pid.raw()))?;
    log::debug!("kernel returned {} bytes of affinity mask", bytes);
    Ok(set)
}

/// Resolve pid 0 to our own pid for messages.
fn display_pid(pid: i32) -> i32 {
    if pid == 0 {
        getpid().raw()
    } else {
        pid
    }
}

fn parse_mask(text: &str, cpu_list: bool) -> Result<CpuSet> {
    let set = if cpu_list {
        text.parse::<CpuSet>()
            .with_context(|| format!("failed to parse cpu list: {}", text))?
    } else {
        CpuSet::from_hex_mask(text).with_context(|| format!("failed to parse mask: {}", text))?
    };
    if set.is_empty() {
        anyhow::bail!("affinity must contain at least one cpu");
    }
    Ok(set)
}

fn describe(pid: i32, which: &str, set: &CpuSet, cpu_list: bool) -> String {
    if cpu_list {
        format!("pid {}'s {} affinity list: {}", pid, which, set)
    } else {
        format!("pid {}'s {} affinity mask: {:x}", pid, which, set)
    }
}
