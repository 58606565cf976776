// Axel '0vercl0k' Souchet - October 15 2026
//! This has the entry points the emulator calls every time a value is written
//! to the FIFO.
//!
//! The dissector only observes: it never modifies guest memory and always
//! tells the emulator to carry on with the normal FIFO processing by
//! returning `false`.
use crate::capture::{CaptureWriter, FrameRecorder, NoCapture};
use crate::config::DissectorConfig;
use crate::error::Result;
use crate::fileio::{self, FileIoReport};
use crate::wifi::{self, WifiOutcome};
use crate::{Cpu, GuestAddr, GuestReader, Hook, Memory};

/// Decodes the FIFO traffic, traces it and captures the wifi frames into `R`.
pub struct FifoApi<R: FrameRecorder = Box<dyn FrameRecorder>> {
    config: DissectorConfig,
    recorder: R,
    /// Frames are copied in there before being handed over to the recorder.
    frame: Vec<u8>,
}

impl FifoApi {
    /// Create a dissector that captures into [`DissectorConfig::capture_path`]
    /// if there is one, and doesn't capture anything otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture file can't be created.
    pub fn from_config(config: DissectorConfig) -> Result<Self> {
        let recorder: Box<dyn FrameRecorder> = match &config.capture_path {
            Some(path) => Box::new(CaptureWriter::create(path)?),
            None => Box::new(NoCapture),
        };

        Ok(Self::new(config, recorder))
    }
}

impl<R: FrameRecorder> FifoApi<R> {
    pub fn new(config: DissectorConfig, recorder: R) -> Self {
        Self {
            config,
            recorder,
            frame: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DissectorConfig {
        &self.config
    }

    #[must_use]
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn into_recorder(self) -> R {
        self.recorder
    }

    /// Handle a value written to the FIFO by `cpu`.
    ///
    /// Returns whether the value was consumed, which is never the case.
    pub fn execute_hook<M: Memory + ?Sized>(&mut self, memory: &M, cpu: Cpu, value: u32) -> bool {
        match Hook::classify(value) {
            Hook::FileIo(addr) => self.execute_file_io_request(memory, cpu, addr),
            Hook::Wifi(addr) => self.execute_wifi_request(memory, cpu, addr),
            Hook::Inert(_) | Hook::Unknown(_) => false,
        }
    }

    /// Trace the file-io request at `addr`.
    pub fn execute_file_io_request<M: Memory + ?Sized>(
        &mut self,
        memory: &M,
        cpu: Cpu,
        addr: GuestAddr,
    ) -> bool {
        if !self.config.file_io {
            return false;
        }

        match self.dissect_file_io(memory, cpu, addr) {
            Some(report) => log::info!("{report}"),
            None => log::debug!("IPC FileIO: request {addr} from cpu {cpu} is not in main RAM"),
        }

        false
    }

    /// Decode the file-io request at `addr`; `None` if it isn't in main RAM.
    pub fn dissect_file_io<M: Memory + ?Sized>(
        &self,
        memory: &M,
        cpu: Cpu,
        addr: GuestAddr,
    ) -> Option<FileIoReport> {
        let reader = GuestReader::new(memory, cpu);

        fileio::dissect(&reader, addr, self.config.max_string_len)
    }

    /// Trace the wifi request at `addr` and capture the frame it carries if
    /// there is one.
    pub fn execute_wifi_request<M: Memory + ?Sized>(
        &mut self,
        memory: &M,
        cpu: Cpu,
        addr: GuestAddr,
    ) -> bool {
        if !self.config.wifi {
            return false;
        }

        let reader = GuestReader::new(memory, cpu);
        match wifi::dissect(&reader, addr, self.config.max_frame_len, &mut self.frame) {
            WifiOutcome::InvalidPointer(addr) => {
                log::debug!("IPC WIFI: Ptr is not valid: {:08x}", addr.u32());
            }
            WifiOutcome::Report(report) => {
                log::info!("{report}");
                if let Some(frame) = report.frame {
                    if let Err(e) = self.recorder.record(frame) {
                        log::warn!("failed to capture a frame of {:#x} bytes: {e}", frame.len());
                    }
                }
            }
        }

        false
    }

    /// Decode the wifi request at `addr` without tracing nor capturing it.
    pub fn dissect_wifi<M: Memory + ?Sized>(
        &mut self,
        memory: &M,
        cpu: Cpu,
        addr: GuestAddr,
    ) -> WifiOutcome<'_> {
        let reader = GuestReader::new(memory, cpu);

        wifi::dissect(&reader, addr, self.config.max_frame_len, &mut self.frame)
    }
}
