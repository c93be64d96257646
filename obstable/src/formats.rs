//! Binary format definitions for persisted tables, sparse matrices, and
//! standalone axis indexes.
//!
//! All three artifact kinds share the same header layout; the kind byte
//! distinguishes them. Label sections are length-prefixed JSON so the
//! index structures can evolve without a format bump.

use std::io::{self, Read, Write};

/// Artifact magic bytes
pub const OTAB_MAGIC: [u8; 4] = *b"OTAB";

/// Current format version
pub const OTAB_VERSION: u16 = 1;

/// What a persisted artifact contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Dense table: header, two index sections, f64 values
    Table = 0,
    /// CSC sparse matrix: header, dtype byte, csc arrays
    Sparse = 1,
    /// Standalone axis index: header, one index section
    Index = 2,
}

impl TryFrom<u8> for ArtifactKind {
    type Error = io::Error;

    fn try_from(byte: u8) -> io::Result<Self> {
        match byte {
            0 => Ok(Self::Table),
            1 => Ok(Self::Sparse),
            2 => Ok(Self::Index),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid artifact kind: {other} (expected 0-2)"),
            )),
        }
    }
}

/// Common artifact header.
///
/// Layout (23 bytes):
/// - magic: 4 bytes (b"OTAB")
/// - version: 2 bytes (u16, little-endian)
/// - kind: 1 byte (0 table, 1 sparse, 2 index)
/// - rows: 8 bytes (u64, little-endian)
/// - cols: 8 bytes (u64, little-endian; 0 for index artifacts)
#[derive(Debug, Clone, PartialEq)]
pub struct OtabHeader {
    pub version: u16,
    pub kind: ArtifactKind,
    pub rows: u64,
    pub cols: u64,
}

impl OtabHeader {
    /// Header size in bytes
    pub const SIZE: usize = 23;

    pub fn new(kind: ArtifactKind, rows: u64, cols: u64) -> Self {
        Self {
            version: OTAB_VERSION,
            kind,
            rows,
            cols,
        }
    }

    /// Write header to writer
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&OTAB_MAGIC)?;
        w.write_all(&self.version.to_le_bytes())?;
        w.write_all(&[self.kind as u8])?;
        w.write_all(&self.rows.to_le_bytes())?;
        w.write_all(&self.cols.to_le_bytes())?;
        Ok(())
    }

    /// Read and validate a header from reader
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != OTAB_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid magic: expected {:?}, got {:?}", OTAB_MAGIC, magic),
            ));
        }

        let mut version_bytes = [0u8; 2];
        r.read_exact(&mut version_bytes)?;
        let version = u16::from_le_bytes(version_bytes);
        if version != OTAB_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported version: {version} (expected {OTAB_VERSION})"),
            ));
        }

        let mut kind_byte = [0u8; 1];
        r.read_exact(&mut kind_byte)?;
        let kind = ArtifactKind::try_from(kind_byte[0])?;

        let mut rows_bytes = [0u8; 8];
        r.read_exact(&mut rows_bytes)?;
        let rows = u64::from_le_bytes(rows_bytes);

        let mut cols_bytes = [0u8; 8];
        r.read_exact(&mut cols_bytes)?;
        let cols = u64::from_le_bytes(cols_bytes);

        Ok(Self {
            version,
            kind,
            rows,
            cols,
        })
    }

    /// Validate the kind byte against what the caller expects to load.
    pub fn expect_kind(&self, kind: ArtifactKind) -> io::Result<()> {
        if self.kind != kind {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("artifact is {:?}, expected {:?}", self.kind, kind),
            ));
        }
        Ok(())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows as usize, self.cols as usize)
    }
}

/// Write a length-prefixed JSON section (u32 length, then the bytes).
pub fn write_json_section<W: Write, T: serde::Serialize>(
    w: &mut W,
    value: &T,
) -> io::Result<()> {
    let bytes =
        serde_json::to_vec(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    w.write_all(&(bytes.len() as u32).to_le_bytes())?;
    w.write_all(&bytes)?;
    Ok(())
}

/// Read a length-prefixed JSON section written by [`write_json_section`].
pub fn read_json_section<R: Read, T: serde::de::DeserializeOwned>(r: &mut R) -> io::Result<T> {
    let mut len_bytes = [0u8; 4];
    r.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes)?;
    serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
