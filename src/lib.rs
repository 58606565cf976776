// Axel '0vercl0k' Souchet - October 15 2026
#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]
mod addr;
mod bits;
mod capture;
mod config;
mod dissector;
mod error;
pub mod fileio;
mod hook;
mod memory;
mod reader;
pub mod report;
pub mod strings;
mod structs;
pub mod wifi;

pub use addr::GuestAddr;
pub use bits::Bits;
pub use capture::{CaptureWriter, FrameRecorder, NoCapture};
pub use config::{DissectorConfig, DEFAULT_MAX_FRAME_LEN, DEFAULT_MAX_STRING_LEN};
pub use dissector::FifoApi;
pub use error::{FifoError, Result};
pub use fileio::FileIoReport;
pub use hook::{Hook, InertHook};
pub use memory::{Memory, RamImage, MAIN_RAM_BASE};
pub use reader::{Cursor, GuestReader};
pub use structs::{
    Cpu, FileIoCommand, FileIoHeader, StatusFlags, WifiCommand, PCAP_GLOBAL_HEADER,
    PCAP_RECORD_HEADER_LEN,
};
pub use wifi::{WifiOutcome, WifiReport};
