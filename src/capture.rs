// Axel '0vercl0k' Souchet - October 15 2026
//! Record the wifi frames into a pcap file that Wireshark can open.
//!
//! The format is simple enough to not need a crate for it: a 24-byte global
//! header ([`PCAP_GLOBAL_HEADER`]) followed by one record per frame. Every
//! record is a 16-byte header and the frame bytes. We don't have a meaningful
//! timestamp for frames coming out of an emulator so it is left zeroed; the
//! length is written twice (captured and original length) as we always
//! capture whole frames.
//!
//! Useful resources:
//! * https://wiki.wireshark.org/Development/LibpcapFileFormat
//! * https://www.tcpdump.org/linktypes.html
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{FifoError, Result};
use crate::structs::PCAP_GLOBAL_HEADER;

/// Something that wants to see every frame the dissector captures.
pub trait FrameRecorder {
    fn record(&mut self, frame: &[u8]) -> Result<()>;
}

impl<R: FrameRecorder + ?Sized> FrameRecorder for &mut R {
    fn record(&mut self, frame: &[u8]) -> Result<()> {
        (**self).record(frame)
    }
}

impl<R: FrameRecorder + ?Sized> FrameRecorder for Box<R> {
    fn record(&mut self, frame: &[u8]) -> Result<()> {
        (**self).record(frame)
    }
}

/// A recorder that drops every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl FrameRecorder for NoCapture {
    fn record(&mut self, _frame: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Writes pcap files.
///
/// The global header is written when the writer is created and every record
/// is flushed as soon as it is written, so the file is always readable even
/// if the emulator dies. The underlying writer is flushed again when the
/// [`CaptureWriter`] is dropped; use [`CaptureWriter::finish`] to see the
/// errors.
#[derive(Debug)]
pub struct CaptureWriter<W: Write> {
    w: Option<W>,
}

impl CaptureWriter<BufWriter<File>> {
    /// Create a pcap file at `path`, truncating it if it already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be created or if the global header
    /// can't be written.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> CaptureWriter<W> {
    /// Start a pcap stream in `w`.
    pub fn new(mut w: W) -> Result<Self> {
        w.write_all(&PCAP_GLOBAL_HEADER)?;
        w.flush()?;

        Ok(Self { w: Some(w) })
    }

    /// Append a frame.
    ///
    /// If this write fails, the record might have been partially written and
    /// the rest of the file is unlikely to be parseable.
    pub fn write(&mut self, frame: &[u8]) -> Result<()> {
        let len = u32::try_from(frame.len()).map_err(|_| FifoError::FrameTooLarge {
            len: frame.len(),
            cap: u32::MAX as usize,
        })?;
        let w = self.inner_mut();
        // No timestamp: seconds & microseconds are zeroed.
        w.write_all(&[0; 8])?;
        // Captured length, then original length.
        w.write_all(&len.to_le_bytes())?;
        w.write_all(&len.to_le_bytes())?;
        w.write_all(frame)?;
        w.flush()?;

        Ok(())
    }

    /// Flush and give back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        let mut w = self.w.take().expect("the writer is only taken by finish");
        w.flush()?;

        Ok(w)
    }

    fn inner_mut(&mut self) -> &mut W {
        self.w
            .as_mut()
            .expect("the writer is only taken by finish")
    }
}

impl<W: Write> FrameRecorder for CaptureWriter<W> {
    fn record(&mut self, frame: &[u8]) -> Result<()> {
        self.write(frame)
    }
}

impl<W: Write> Drop for CaptureWriter<W> {
    fn drop(&mut self) {
        if let Some(w) = self.w.as_mut() {
            if let Err(e) = w.flush() {
                log::warn!("failed to flush the capture on drop: {e}");
            }
        }
    }
}
