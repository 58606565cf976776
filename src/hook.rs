// Axel '0vercl0k' Souchet - October 15 2026
//! Classify the values written to the FIFO.
//!
//! The low 5 bits of a value select the sub-command; what the other bits mean
//! depends on it. Only two sub-commands carry a request we know how to
//! decode, the rest are documented with what they have been seen doing.
use std::fmt::{self, Display};

use crate::structs::{HOOK_FILE_IO, HOOK_SUBCOMMAND_MASK, HOOK_WIFI};
use crate::{Bits, GuestAddr};

/// The sub-commands we know about but don't decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InertHook {
    /// 0x01 & 0x02.
    MessageBox(u32),
    /// 0x04.
    WifiEnabled,
    /// 0x05, 0x08, 0x0a & 0x18.
    MainMenu(u32),
    /// 0x06 & 0x07.
    Polling(u32),
    /// 0x0d.
    WifiEnabling,
    /// 0x13.
    Aes,
    /// 0x15.
    HealthWarning,
    /// 0x17; it carries its own sub-command in bits 31:26 and 16 bits of
    /// data in bits 21:6.
    DsiMenu { command: u8, data: u16 },
}

impl InertHook {
    fn from_value(value: u32) -> Option<Self> {
        let subcommand = value & HOOK_SUBCOMMAND_MASK;
        let hook = match subcommand {
            0x01 | 0x02 => Self::MessageBox(subcommand),
            0x04 => Self::WifiEnabled,
            0x05 | 0x08 | 0x0a | 0x18 => Self::MainMenu(subcommand),
            0x06 | 0x07 => Self::Polling(subcommand),
            0x0d => Self::WifiEnabling,
            0x13 => Self::Aes,
            0x15 => Self::HealthWarning,
            0x17 => Self::DsiMenu {
                command: value.bits(26..=31) as u8,
                data: value.bits(6..=21) as u16,
            },
            _ => return None,
        };

        Some(hook)
    }

    /// Get the sub-command this hook was decoded from.
    #[must_use]
    pub fn subcommand(&self) -> u32 {
        match self {
            Self::MessageBox(s) | Self::MainMenu(s) | Self::Polling(s) => *s,
            Self::WifiEnabled => 0x04,
            Self::WifiEnabling => 0x0d,
            Self::Aes => 0x13,
            Self::HealthWarning => 0x15,
            Self::DsiMenu { .. } => 0x17,
        }
    }

    /// What the hook has been observed doing.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::MessageBox(_) => "message box related",
            Self::WifiEnabled => "sent once wifi got enabled (Pictochat, DS Download Play)",
            Self::MainMenu(_) => "sent continuously from the main menu",
            Self::Polling(_) => "sent continuously, maybe syncing or button/touch input",
            Self::WifiEnabling => "sent right before wifi gets enabled (Pictochat, DS Download Play)",
            Self::Aes => "AES related, around a SWRAM remapping",
            Self::HealthWarning => "sent three times in a row every few seconds on the health warning screen",
            Self::DsiMenu { .. } => "sent after a reset in the DSi menu, related to 0x0380ffc8",
        }
    }
}

impl Display for InertHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}: {}", self.subcommand(), self.description())?;
        if let Self::DsiMenu { command, data } = self {
            write!(f, " (cmd = {command:#04x}, data = {data:#06x})")?;
        }

        Ok(())
    }
}

/// What a FIFO value asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// A file-io request at this address.
    FileIo(GuestAddr),
    /// A wifi request at this address.
    Wifi(GuestAddr),
    Inert(InertHook),
    /// A sub-command nobody has documented yet.
    Unknown(u32),
}

impl Hook {
    /// Classify `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fifo_dissector::{GuestAddr, Hook};
    /// assert_eq!(
    ///     Hook::classify(0x0400_2014),
    ///     Hook::FileIo(GuestAddr::new(0x0200_1000))
    /// );
    /// assert_eq!(
    ///     Hook::classify(0x8000_0016),
    ///     Hook::Wifi(GuestAddr::new(0x0200_0000))
    /// );
    /// ```
    #[must_use]
    pub fn classify(value: u32) -> Self {
        match value & HOOK_SUBCOMMAND_MASK {
            HOOK_FILE_IO => Self::FileIo(GuestAddr::new((value >> 1) & !HOOK_SUBCOMMAND_MASK)),
            HOOK_WIFI => Self::Wifi(GuestAddr::new(value >> 6)),
            subcommand => InertHook::from_value(value).map_or(Self::Unknown(subcommand), Self::Inert),
        }
    }
}
