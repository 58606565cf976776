// Axel '0vercl0k' Souchet - October 15 2026
use std::cmp::min;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use fifo_dissector::{
    Cpu, DissectorConfig, FifoApi, FifoError, GuestAddr, Hook, RamImage,
    DEFAULT_MAX_FRAME_LEN, DEFAULT_MAX_STRING_LEN,
};
use serde::Deserialize;

/// A value written to the FIFO.
#[derive(Debug, Clone, Copy, Deserialize)]
struct HookEvent {
    cpu: u8,
    value: u32,
}

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The main RAM dump path; it is mapped at 0x02000000.
    ram_path: PathBuf,
    /// A hook to replay, formatted as `cpu:value` (the value is in hex). Can
    /// be specified several times.
    #[arg(long = "hook")]
    hooks: Vec<String>,
    /// A JSON file with a list of `{"cpu": 0, "value": 33562644}` hooks to
    /// replay after the ones passed with `--hook`.
    #[arg(long)]
    events: Option<PathBuf>,
    /// Only print how the hooks are classified.
    #[arg(long, default_value_t = false)]
    classify: bool,
    /// Write the captured wifi frames to this pcap file.
    #[arg(short, long)]
    capture: Option<PathBuf>,
    /// Frames larger than this are not captured.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_LEN)]
    max_frame_len: u32,
    /// Strings longer than this are not decoded.
    #[arg(long, default_value_t = DEFAULT_MAX_STRING_LEN)]
    max_string_len: usize,
    /// Don't trace the file-io requests.
    #[arg(long, default_value_t = false)]
    no_file_io: bool,
    /// Don't trace the wifi requests.
    #[arg(long, default_value_t = false)]
    no_wifi: bool,
    /// Dump the memory at this address.
    #[arg(short, long)]
    mem: Option<GuestAddr>,
    /// The number of bytes to dump out.
    #[arg(long, default_value_t = 0x10)]
    len: usize,
}

/// Print a hexdump of data that started at `address` (memory outside of main
/// RAM is displayed with `??`).
fn hexdump(address: GuestAddr, data: &[u8], wanted_len: usize) {
    let mut row = [None; 16];
    let mut data_it = data.iter();
    for i in (0..wanted_len).step_by(16) {
        let wanted_left = wanted_len - i;
        let left_to_display = min(wanted_left, 16);
        print!("{:08x}: ", address.u32().wrapping_add(i as u32));

        // Fill the row first as the hexadecimal values are displayed before
        // the ASCII representation.
        let mut row_it = row.iter_mut().enumerate().peekable();
        while let Some((idx, item)) = row_it.next() {
            match data_it.next() {
                Some(c) => {
                    *item = Some(*c);
                    print!("{:02x}", c);
                }
                None => {
                    *item = None;
                    if i + idx >= wanted_len {
                        // Pad the last row so that its ASCII representation
                        // stays aligned.
                        print!("  ");
                    } else {
                        print!("??");
                    }
                }
            };

            if left_to_display >= 9 && idx == 7 {
                print!("-");
            } else if row_it.peek().is_some() {
                print!(" ");
            }
        }

        print!("  ");
        for item in &row[..left_to_display] {
            if let Some(c) = item {
                let c = char::from(*c);
                print!("{}", if c.is_ascii_graphic() { c } else { '.' });
            } else {
                print!("?");
            }
        }
        println!()
    }
}

/// Parse a `cpu:value` hook.
fn parse_hook(s: &str) -> Result<HookEvent> {
    let Some((cpu, value)) = s.split_once(':') else {
        bail!("{s} is not formatted as cpu:value");
    };

    let cpu = cpu.parse().context("failed to parse the cpu")?;
    let value = value.replace('`', "");
    let value = u32::from_str_radix(value.trim_start_matches("0x"), 16)
        .context("failed to parse the hook value")?;

    Ok(HookEvent { cpu, value })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let ram = RamImage::from_file(&args.ram_path).context("failed to load the ram dump")?;
    if ram.is_empty() {
        bail!("{} is empty", args.ram_path.display());
    }

    let mut events = args
        .hooks
        .iter()
        .map(|h| parse_hook(h))
        .collect::<Result<Vec<_>>>()?;

    if let Some(path) = &args.events {
        let json = fs::read_to_string(path).context("failed to read the events")?;
        let more: Vec<HookEvent> =
            serde_json::from_str(&json).context("failed to parse the events")?;
        events.extend(more);
    }

    if args.classify {
        for event in &events {
            match Hook::classify(event.value) {
                Hook::FileIo(addr) => println!("{:#010x}: file-io request at {addr}", event.value),
                Hook::Wifi(addr) => println!("{:#010x}: wifi request at {addr}", event.value),
                Hook::Inert(hook) => println!("{:#010x}: {hook}", event.value),
                Hook::Unknown(id) => println!("{:#010x}: unknown sub-command {id:#04x}", event.value),
            }
        }
    } else {
        let mut config = DissectorConfig::default()
            .with_max_frame_len(args.max_frame_len)
            .with_max_string_len(args.max_string_len)
            .with_file_io(!args.no_file_io)
            .with_wifi(!args.no_wifi);
        if let Some(path) = &args.capture {
            config = config.with_capture_path(path);
        }

        let mut api = FifoApi::from_config(config).context("failed to create the dissector")?;
        for event in &events {
            let cpu = Cpu::try_from(event.cpu)?;
            api.execute_hook(&ram, cpu, event.value);
        }
    }

    if let Some(addr) = args.mem {
        if !addr.in_main_ram() {
            return Err(FifoError::InvalidAddress(addr).into());
        }

        // Only what the dump backs is displayed, the rest shows up as `??`.
        let end = u64::from(ram.base().u32()) + ram.len() as u64;
        let available = end.saturating_sub(u64::from(addr.u32()));
        let len = args.len.min(usize::try_from(available)?);
        let data = ram.slice(addr, len).unwrap_or_default();
        hexdump(addr, data, args.len);
    }

    Ok(())
}
