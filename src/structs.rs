// Axel '0vercl0k' Souchet - October 15 2026
//! This has the raw structures, command codes and constants that make up the
//! FIFO requests and the capture file.
use std::fmt::{self, Display};

use bitflags::bitflags;

use crate::error::{FifoError, Result};
use crate::GuestAddr;

/// The two emulated processors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cpu {
    /// Processor id 0; it runs the applications.
    Arm9 = 0,
    /// Processor id 1; it owns the wifi hardware.
    Arm7 = 1,
}

impl TryFrom<u8> for Cpu {
    type Error = FifoError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Cpu::Arm9),
            1 => Ok(Cpu::Arm7),
            _ => Err(FifoError::InvalidCpu(value)),
        }
    }
}

impl From<Cpu> for u8 {
    fn from(value: Cpu) -> Self {
        value as u8
    }
}

impl Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// The FIFO sub-command carried by bits 4:0 of a hook value.
pub const HOOK_SUBCOMMAND_MASK: u32 = 0x1f;
/// Sub-command of the file-io requests.
pub const HOOK_FILE_IO: u32 = 0x14;
/// Sub-command of the wifi requests.
pub const HOOK_WIFI: u32 = 0x16;

/// Every file-io request starts with this header, the command-specific
/// parameters follow it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct FileIoHeader {
    pub command: u32,
    pub status: u32,
    pub return_code: u32,
    pub next_request: u32,
}

impl FileIoHeader {
    /// Size of the header in guest memory.
    pub const SIZE: u32 = 0x10;
}

bitflags! {
    /// The status word of a file-io request. A status of zero means the
    /// request completed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u32 {
        const PENDING = 1 << 1;
        const FAULT = 1 << 2;
        const _ = !0;
    }
}

impl StatusFlags {
    #[must_use]
    pub fn completed(&self) -> bool {
        self.is_empty()
    }
}

/// Format the status the way the traces show it: `pending`, `fault`,
/// `pending fault` or `completed`. A non-zero status without any of the
/// known bits renders as nothing.
impl Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.completed() {
            return write!(f, "completed");
        }

        let mut names = vec![];
        if self.contains(Self::PENDING) {
            names.push("pending");
        }

        if self.contains(Self::FAULT) {
            names.push("fault");
        }

        write!(f, "{}", names.join(" "))
    }
}

/// Generate a command enum that maps codes to names, with a fallback variant
/// for the codes we don't know about.
macro_rules! command_codes {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty), unknown = $prefix:literal {
            $($variant:ident = $code:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
            Unknown($repr),
        }

        impl $name {
            /// Get the raw command code.
            #[must_use]
            pub const fn code(&self) -> $repr {
                match self {
                    $(Self::$variant => $code,)*
                    Self::Unknown(code) => *code,
                }
            }

            /// Get the name of a known command.
            #[must_use]
            pub const fn name(&self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some(stringify!($variant)),)*
                    Self::Unknown(_) => None,
                }
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                match value {
                    $($code => Self::$variant,)*
                    _ => Self::Unknown(value),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.name() {
                    Some(name) => write!(f, "{name}"),
                    None => write!(f, concat!($prefix, "_{}"), self.code()),
                }
            }
        }
    };
}

command_codes! {
    /// The file-io commands.
    FileIoCommand(u32), unknown = "FileIO" {
        GetArchiveResource = 0x04,
        GetPathInfo = 0x06,
        DeleteFolder = 0x0b,
        CreateFolder = 0x0c,
        OpenFile = 0x0e,
        CloseFile = 0x0f,
        ReadFile = 0x10,
        WriteFile = 0x11,
        SeekFile = 0x12,
        GetFileLength = 0x14,
        SetFileLength = 0x15,
        OpenFolder = 0x16,
        CloseFolder = 0x17,
        ReadFolder = 0x18,
    }
}

command_codes! {
    /// The wifi commands.
    WifiCommand(u16), unknown = "WifiCmd" {
        SetOwnMACAddress = 0x03,
        ConnectToAP = 0x08,
        RecvEthernetFrame = 0x0a,
        SendEthernetFrame = 0x0b,
    }
}

/// A wifi request pointer has to be a word-aligned main RAM address.
pub const WIFI_REQUEST_MASK: u32 = 0xff00_0003;
pub const WIFI_REQUEST_EXPECTED: u32 = 0x0200_0000;

/// Is `addr` something a wifi request can live at?
#[must_use]
pub fn valid_wifi_request(addr: GuestAddr) -> bool {
    (addr.u32() & WIFI_REQUEST_MASK) == WIFI_REQUEST_EXPECTED
}

/// Size of the windows dumped for the requests we only know the shape of.
pub const RAW_WINDOW_LEN: u32 = 64;

/// Layout of the frame descriptor that follows a `RecvEthernetFrame` command
/// (offsets from the start of the request).
pub mod recv_frame {
    pub const TYPE: u32 = 0x06;
    pub const LENGTH: u32 = 0x08;
    pub const DATA: u32 = 0x0c;
}

/// Layout of the frame descriptor that follows a `SendEthernetFrame` command
/// (offsets from the start of the request).
pub mod send_frame {
    pub const DATA: u32 = 0x08;
    pub const LENGTH: u32 = 0x0c;
}

/// Little-endian pcap global header: magic, version 2.4, no timezone offset,
/// no accuracy, 0x40000 snaplen and the ethernet link type.
pub const PCAP_GLOBAL_HEADER: [u8; 24] = [
    0xd4, 0xc3, 0xb2, 0xa1, 0x02, 0x00, 0x04, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, //
];

/// Size of the header preceding every frame in the capture file.
pub const PCAP_RECORD_HEADER_LEN: usize = 16;
