//! Durable backing for the inventory.
//!
//! A [`Resource`] hands out fresh streams on demand: one reader when the
//! store is opened and one writer per mutating call. Every stream lives only
//! for the duration of that call.

use std::io::{self, Read, Write};

/// File-backed resource with atomic rewrites.
pub mod file;
/// In-memory resource used by tests and embedders.
pub mod memory;

pub use file::FileResource;
pub use memory::MemoryResource;

/// How a writer treats the existing resource content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Keep existing content and add to the end.
    Append,
    /// Replace existing content entirely.
    Overwrite,
}

/// Reader and writer factory for the inventory's durable text.
pub trait Resource {
    /// Stream produced by [`Resource::open_reader`].
    type Reader: Read;
    /// Stream produced by [`Resource::open_writer`].
    type Writer: Write;

    /// Open the resource for reading. A resource that does not exist yet reads as empty.
    fn open_reader(&mut self) -> io::Result<Self::Reader>;

    /// Open the resource for writing in the given mode.
    fn open_writer(&mut self, mode: WriteMode) -> io::Result<Self::Writer>;

    /// Finish a write started with [`Resource::open_writer`].
    ///
    /// Content written to a writer that is dropped without being committed
    /// may or may not reach the resource.
    fn commit(&mut self, writer: Self::Writer) -> io::Result<()>;
}
