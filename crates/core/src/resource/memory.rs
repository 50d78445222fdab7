use std::io::{self, Cursor, Write};

use super::{Resource, WriteMode};

/// Inventory text held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryResource {
    contents: String,
}

impl MemoryResource {
    /// Create a resource with the given initial text.
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    /// Current committed text.
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// Buffer collecting one write until it is committed.
#[derive(Debug)]
pub struct MemoryWriter {
    mode: WriteMode,
    buffer: Vec<u8>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Resource for MemoryResource {
    type Reader = Cursor<Vec<u8>>;
    type Writer = MemoryWriter;

    fn open_reader(&mut self) -> io::Result<Self::Reader> {
        Ok(Cursor::new(self.contents.clone().into_bytes()))
    }

    fn open_writer(&mut self, mode: WriteMode) -> io::Result<Self::Writer> {
        Ok(MemoryWriter {
            mode,
            buffer: Vec::new(),
        })
    }

    fn commit(&mut self, writer: Self::Writer) -> io::Result<()> {
        let text = String::from_utf8(writer.buffer)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        match writer.mode {
            WriteMode::Append => self.contents.push_str(&text),
            WriteMode::Overwrite => self.contents = text,
        }
        Ok(())
    }
}
