//! Binary snapshot of the vector store for warm restarts.
//!
//! The file layout is little-endian and bit-exact for interoperability
//! with existing cache files:
//!
//! ```text
//! u32  magic     0x4C594E58 ("LYNX")
//! u32  version   1
//! i64  count
//! i32  dimension
//! f32  data[count * dimension]   row-major
//! ```
//!
//! The format carries no metric tag: the same bytes load into an L2 or
//! a cosine engine.

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use tracing::info;

const MAGIC: u32 = 0x4C59_4E58;
const VERSION: u32 = 1;

/// Codec for the on-disk vector cache at a fixed path.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    /// Creates a codec bound to `path`. Nothing is touched on disk until
    /// [`save`](Snapshot::save) or [`load`](Snapshot::load) is called.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true when a snapshot file exists at the configured path.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes all vectors to the snapshot file, replacing any previous
    /// content. An empty input writes nothing and succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] when rows disagree in length
    /// and [`Error::Io`] on filesystem failures.
    pub fn save(&self, vectors: &[Vec<f32>]) -> Result<()> {
        let Some(first) = vectors.first() else {
            return Ok(());
        };
        let dimension = first.len();

        for row in vectors {
            if row.len() != dimension {
                return Err(Error::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        writer.write_u32::<LittleEndian>(MAGIC)?;
        writer.write_u32::<LittleEndian>(VERSION)?;
        writer.write_i64::<LittleEndian>(vectors.len() as i64)?;
        writer.write_i32::<LittleEndian>(dimension as i32)?;

        for row in vectors {
            for &x in row {
                writer.write_f32::<LittleEndian>(x)?;
            }
        }
        writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;

        info!(
            count = vectors.len(),
            dimension,
            path = %self.path.display(),
            "saved vector snapshot"
        );
        Ok(())
    }

    /// Reads every vector back from the snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Snapshot`] on a wrong magic number, an
    /// unsupported version, a malformed header, or a payload shorter
    /// than the header promises; [`Error::Io`] when the file cannot be
    /// opened or read.
    pub fn load(&self) -> Result<Vec<Vec<f32>>> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        let (count, dimension) = read_header(&mut reader)?;

        let mut vectors = Vec::with_capacity(count);
        for _ in 0..count {
            let mut row = vec![0.0_f32; dimension];
            reader
                .read_f32_into::<LittleEndian>(&mut row)
                .map_err(|e| {
                    if e.kind() == std::io::ErrorKind::UnexpectedEof {
                        Error::Snapshot("unexpected end of file (file might be corrupted)".into())
                    } else {
                        Error::Io(e)
                    }
                })?;
            vectors.push(row);
        }

        info!(
            count,
            dimension,
            path = %self.path.display(),
            "loaded vector snapshot"
        );
        Ok(vectors)
    }

    /// Reads just the header and returns `(count, dimension)`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`load`](Snapshot::load), without touching
    /// the payload.
    pub fn info(&self) -> Result<(u64, usize)> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        let (count, dimension) = read_header(&mut reader)?;
        Ok((count as u64, dimension))
    }
}

/// Validates the fixed header and returns `(count, dimension)`.
fn read_header<R: Read>(reader: &mut R) -> Result<(usize, usize)> {
    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != MAGIC {
        return Err(Error::Snapshot(format!(
            "invalid magic number: expected {MAGIC:#010X}, got {magic:#010X}"
        )));
    }

    let version = reader.read_u32::<LittleEndian>()?;
    if version != VERSION {
        return Err(Error::Snapshot(format!(
            "unsupported file version: expected {VERSION}, got {version}"
        )));
    }

    let count = reader.read_i64::<LittleEndian>()?;
    let dimension = reader.read_i32::<LittleEndian>()?;
    if count < 0 || dimension <= 0 {
        return Err(Error::Snapshot(format!(
            "malformed header: count {count}, dimension {dimension}"
        )));
    }

    let count = usize::try_from(count)
        .map_err(|_| Error::Snapshot(format!("vector count {count} exceeds address space")))?;
    #[allow(clippy::cast_sign_loss)]
    let dimension = dimension as usize;
    Ok((count, dimension))
}
