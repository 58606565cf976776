// Axel '0vercl0k' Souchet - October 15 2026
//! This is the error type used across the codebase.
//!
//! Note that none of the decoding paths return errors: a FIFO request that
//! can't be decoded degrades to a placeholder in its report. Errors only come
//! out of the parts that touch the host (the capture file, loading a RAM
//! image, parsing user input).
use std::io;

use thiserror::Error;

use crate::GuestAddr;

pub type Result<R> = std::result::Result<R, FifoError>;

#[derive(Debug, Error)]
pub enum FifoError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("invalid processor id {0} (expected 0 for the arm9 or 1 for the arm7)")]
    InvalidCpu(u8),
    #[error("frame of {len:#x} bytes is larger than the {cap:#x} bytes cap")]
    FrameTooLarge { len: usize, cap: usize },
    #[error("ram image of {0:#x} bytes doesn't fit in the 32-bit address space")]
    ImageTooLarge(usize),
    #[error("{0} is outside of main ram")]
    InvalidAddress(GuestAddr),
}
