// Axel '0vercl0k' Souchet - October 15 2026
//! Knobs of the dissector.
use std::path::PathBuf;

/// Largest frame the wifi dissector accepts to copy out of guest memory by
/// default; comfortably above the biggest 802.11 MSDU.
pub const DEFAULT_MAX_FRAME_LEN: u32 = 0x2_000;

/// Longest string (in bytes, or in 16-bit units for wide strings) scanned by
/// default before giving up.
pub const DEFAULT_MAX_STRING_LEN: usize = 0x100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DissectorConfig {
    /// Where to write the captured wifi frames; `None` disables the capture.
    pub capture_path: Option<PathBuf>,
    /// Frames whose length is above this are reported but never copied nor
    /// captured.
    pub max_frame_len: u32,
    /// Strings are abandoned after scanning this many bytes / units.
    pub max_string_len: usize,
    /// Trace the file-io requests.
    pub file_io: bool,
    /// Trace the wifi requests.
    pub wifi: bool,
}

impl Default for DissectorConfig {
    fn default() -> Self {
        Self {
            capture_path: None,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            file_io: true,
            wifi: true,
        }
    }
}

impl DissectorConfig {
    #[must_use]
    pub fn with_capture_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.capture_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_max_frame_len(mut self, len: u32) -> Self {
        self.max_frame_len = len;
        self
    }

    #[must_use]
    pub fn with_max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = len;
        self
    }

    #[must_use]
    pub fn with_file_io(mut self, enabled: bool) -> Self {
        self.file_io = enabled;
        self
    }

    #[must_use]
    pub fn with_wifi(mut self, enabled: bool) -> Self {
        self.wifi = enabled;
        self
    }
}
