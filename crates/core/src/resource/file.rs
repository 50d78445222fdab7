use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{Resource, WriteMode};

/// Inventory stored in a plain text file.
///
/// Appends go straight to the file. Overwrites are staged in a temporary file
/// next to the target and renamed over it on commit, so a failed rewrite
/// leaves the previous content intact. A symlinked path is resolved first so
/// the link itself survives, and the staged file takes over the target's
/// permissions. Hard links to the inventory are not preserved.
#[derive(Debug, Clone)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    /// Create a resource for the given path. The file is not touched until used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File a rewrite replaces: the symlink target when the path is a link.
    fn rewrite_target(&self) -> io::Result<PathBuf> {
        match fs::canonicalize(&self.path) {
            Ok(resolved) => Ok(resolved),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(self.path.clone()),
            Err(err) => Err(err),
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Writer handed out by [`FileResource`].
pub enum FileWriter {
    /// Appending directly to the inventory file.
    Append(BufWriter<File>),
    /// Staging a full replacement in a temporary file.
    Replace {
        /// Temporary file in the target's directory.
        staged: BufWriter<NamedTempFile>,
        /// File the staged content is renamed over on commit.
        target: PathBuf,
    },
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileWriter::Append(writer) => writer.write(buf),
            FileWriter::Replace { staged, .. } => staged.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileWriter::Append(writer) => writer.flush(),
            FileWriter::Replace { staged, .. } => staged.flush(),
        }
    }
}

impl Resource for FileResource {
    type Reader = Box<dyn Read>;
    type Writer = FileWriter;

    fn open_reader(&mut self) -> io::Result<Self::Reader> {
        match File::open(&self.path) {
            Ok(file) => Ok(Box::new(file)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist yet; reading as empty", self.path.display());
                Ok(Box::new(io::empty()))
            }
            Err(err) => Err(err),
        }
    }

    fn open_writer(&mut self, mode: WriteMode) -> io::Result<Self::Writer> {
        match mode {
            WriteMode::Append => {
                fs::create_dir_all(parent_dir(&self.path))?;
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?;
                Ok(FileWriter::Append(BufWriter::new(file)))
            }
            WriteMode::Overwrite => {
                let target = self.rewrite_target()?;
                let dir = parent_dir(&target);
                fs::create_dir_all(&dir)?;
                let staged = NamedTempFile::new_in(&dir)?;
                match fs::metadata(&target) {
                    Ok(metadata) => staged.as_file().set_permissions(metadata.permissions())?,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                    Err(err) => return Err(err),
                }
                Ok(FileWriter::Replace {
                    staged: BufWriter::new(staged),
                    target,
                })
            }
        }
    }

    fn commit(&mut self, writer: Self::Writer) -> io::Result<()> {
        match writer {
            FileWriter::Append(writer) => {
                let file = writer.into_inner().map_err(|err| err.into_error())?;
                file.sync_all()
            }
            FileWriter::Replace { staged, target } => {
                let staged = staged.into_inner().map_err(|err| err.into_error())?;
                staged.as_file().sync_all()?;
                staged.persist(&target).map_err(|err| err.error)?;
                debug!("replaced {}", target.display());
                Ok(())
            }
        }
    }
}
