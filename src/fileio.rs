// Axel '0vercl0k' Souchet - October 15 2026
//! This has the logic to decode file-io requests.
//!
//! A request is a [`FileIoHeader`] followed by parameters whose layout depends
//! on the command, and sometimes on the status: a handle only shows up once an
//! open completed for example. Rather than hand-walking every layout, each
//! command is described by a list of [`FieldSpec`] (see [`layout`]) that
//! [`dissect`] interprets.
use std::fmt::{self, Display};

use crate::report::{Field, Radix, Value};
use crate::strings::{read_ascii, read_cstr, read_wide, Extracted, Redirect};
use crate::structs::{FileIoCommand, FileIoHeader, StatusFlags, RAW_WINDOW_LEN};
use crate::{Cpu, Cursor, GuestAddr, GuestReader, Memory};

/// When a field is part of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Always,
    /// Only once the status is zero.
    Completed,
    /// Only while the status isn't zero.
    NotCompleted,
}

impl Presence {
    fn holds(self, status: StatusFlags) -> bool {
        match self {
            Self::Always => true,
            Self::Completed => status.completed(),
            Self::NotCompleted => !status.completed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A `u32`.
    Word(Radix),
    /// Bytes we don't know anything about and don't display.
    Skip(u32),
    /// A zero-terminated ASCII string; the next field starts right after the
    /// terminator.
    AsciiZ,
    /// An ASCII string stored in a slot of fixed size; the next field starts
    /// right after the slot whatever the length of the string is.
    AsciiSlot(u32),
    /// A string of 16-bit units.
    Wide,
    /// Bytes displayed as an hexdump.
    Raw(u32),
}

impl FieldKind {
    /// How many bytes to step over when the field is absent. Strings are
    /// always the last field of a request, so nothing is stepped over for
    /// them.
    fn absent_size(self) -> u32 {
        match self {
            Self::Word(_) => 4,
            Self::Skip(n) | Self::AsciiSlot(n) | Self::Raw(n) => n,
            Self::AsciiZ | Self::Wide => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Always,
        }
    }

    const fn when(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }
}

const fn hex_word(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Word(Radix::Hex))
}

const fn size_word(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Word(Radix::Size))
}

const fn skip(n: u32) -> FieldSpec {
    FieldSpec::new("", FieldKind::Skip(n))
}

const fn ascii_z(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::AsciiZ)
}

const fn mode_slot() -> FieldSpec {
    FieldSpec::new("Mode", FieldKind::AsciiSlot(16))
}

const fn wide(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Wide)
}

const fn raw(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Raw(RAW_WINDOW_LEN))
}

const HANDLE: FieldSpec = hex_word("Handle");

const GET_ARCHIVE_RESOURCE: &[FieldSpec] = &[ascii_z("Name"), raw("Other")];
const NAME_ONLY: &[FieldSpec] = &[wide("Name")];
const DELETE_FOLDER: &[FieldSpec] = &[skip(16), wide("Name")];
const OPEN_FILE: &[FieldSpec] = &[
    HANDLE.when(Presence::Completed),
    mode_slot(),
    wide("Name"),
];
const OPEN_FOLDER: &[FieldSpec] = &[HANDLE, mode_slot(), wide("Name")];
const CLOSE: &[FieldSpec] = &[HANDLE.when(Presence::NotCompleted)];
const READ_WRITE_FILE: &[FieldSpec] = &[HANDLE, hex_word("Buffer Address"), size_word("Length")];
const SEEK_FILE: &[FieldSpec] = &[HANDLE, hex_word("Offset"), hex_word("Direction")];
const GET_FILE_LENGTH: &[FieldSpec] = &[HANDLE, hex_word("Length").when(Presence::Completed)];
const SET_FILE_LENGTH: &[FieldSpec] = &[HANDLE, hex_word("Length")];
const READ_FOLDER: &[FieldSpec] = &[HANDLE, ascii_z("Name").when(Presence::Completed)];
const UNKNOWN: &[FieldSpec] = &[raw("Other")];

/// Get the layout of the parameters of `command`.
#[must_use]
pub fn layout(command: FileIoCommand) -> &'static [FieldSpec] {
    use FileIoCommand as C;
    match command {
        C::GetArchiveResource => GET_ARCHIVE_RESOURCE,
        C::GetPathInfo | C::CreateFolder => NAME_ONLY,
        C::DeleteFolder => DELETE_FOLDER,
        C::OpenFile => OPEN_FILE,
        C::OpenFolder => OPEN_FOLDER,
        C::CloseFile | C::CloseFolder => CLOSE,
        C::ReadFile | C::WriteFile => READ_WRITE_FILE,
        C::SeekFile => SEEK_FILE,
        C::GetFileLength => GET_FILE_LENGTH,
        C::SetFileLength => SET_FILE_LENGTH,
        C::ReadFolder => READ_FOLDER,
        C::Unknown(_) => UNKNOWN,
    }
}

/// A decoded file-io request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIoReport {
    pub cpu: Cpu,
    pub addr: GuestAddr,
    pub header: FileIoHeader,
    pub command: FileIoCommand,
    pub status: StatusFlags,
    pub fields: Vec<Field>,
}

impl FileIoReport {
    /// Get the value of the field called `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        crate::report::find(&self.fields, name)
    }
}

impl Display for FileIoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IPC FileIO request at {} from cpu {}", self.addr, self.cpu)?;
        writeln!(f, "  IO Command = {}", self.command)?;
        writeln!(f, "  Status = {}", self.status)?;
        writeln!(f, "  ReturnCode = {:#x}", self.header.return_code)?;
        write!(f, "  NextRequest = {:#x}", self.header.next_request)?;
        for field in &self.fields {
            write!(f, "\n    {field}")?;
        }

        Ok(())
    }
}

/// A string field; it shows as [`Value::Null`] if it starts outside of main
/// RAM.
fn text(at: GuestAddr, s: Extracted) -> Value {
    if at.in_main_ram() {
        Value::Text(s.text)
    } else {
        Value::Null
    }
}

/// Decode the request at `addr`. Returns `None` if its header isn't in main
/// RAM.
pub fn dissect<M: Memory + ?Sized>(
    reader: &GuestReader<'_, M>,
    addr: GuestAddr,
    max_string_len: usize,
) -> Option<FileIoReport> {
    let mut cursor = Cursor::new(reader, addr);
    let header = FileIoHeader {
        command: cursor.read32()?,
        status: cursor.read32()?,
        return_code: cursor.read32()?,
        next_request: cursor.read32()?,
    };

    let command = FileIoCommand::from(header.command);
    let status = StatusFlags::from_bits_retain(header.status);
    let mut fields = vec![];
    for desc in layout(command) {
        if !desc.presence.holds(status) {
            cursor.skip(desc.kind.absent_size());
            continue;
        }

        let at = cursor.pos();
        match desc.kind {
            FieldKind::Word(radix) => {
                fields.push(Field::new(desc.name, Value::word(cursor.read32(), radix)));
            }
            FieldKind::Skip(n) => cursor.skip(n),
            FieldKind::AsciiZ => {
                let s = read_cstr(reader, at, max_string_len);
                cursor.seek(s.end);
                fields.push(Field::new(desc.name, text(at, s)));
            }
            FieldKind::AsciiSlot(len) => {
                let max = max_string_len.min(usize::try_from(len).unwrap_or(usize::MAX));
                let s = read_ascii(reader, at, Redirect::Never, max);
                cursor.seek(at.offset(len));
                fields.push(Field::new(desc.name, text(at, s)));
            }
            FieldKind::Wide => {
                let s = read_wide(reader, at, max_string_len);
                cursor.seek(s.end);
                fields.push(Field::new(desc.name, text(at, s)));
            }
            FieldKind::Raw(len) => {
                fields.push(Field::new(desc.name, Value::bytes(cursor.read_vec(len))));
            }
        }
    }

    Some(FileIoReport {
        cpu: reader.cpu(),
        addr,
        header,
        command,
        status,
        fields,
    })
}
