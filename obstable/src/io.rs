//! Persistence for tables, sparse matrices, and standalone indexes.
//!
//! All artifacts share the `OtabHeader` layout from `formats`; label
//! sections are length-prefixed JSON, value sections raw little-endian.

use std::io::{self, Read, Write};
use std::path::Path;

use crate::conversions::sparse::{CscData, CscMatrix, SparseDType};
use crate::formats::{read_json_section, write_json_section, ArtifactKind, OtabHeader};
use crate::index::AxisIndex;
use crate::table::Table;

fn invalid_data(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

impl Table {
    /// Save table to a file in OTAB format.
    ///
    /// Layout: header, row index section, column index section, then
    /// rows*cols f64 values (little-endian, row-major).
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        self.write_to(&mut file)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let (rows, cols) = self.shape();
        OtabHeader::new(ArtifactKind::Table, rows as u64, cols as u64).write_to(w)?;
        write_json_section(w, self.index())?;
        write_json_section(w, self.columns())?;
        for v in self.values() {
            w.write_all(&v.to_le_bytes())?;
        }
        Ok(())
    }

    /// Load table from a file in OTAB format.
    pub fn load(path: &Path) -> io::Result<Self> {
        let mut file = std::fs::File::open(path)?;
        Self::load_from_reader(&mut file)
    }

    /// Load table from a reader positioned at the start of OTAB data.
    pub fn load_from_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let header = OtabHeader::read_from(reader)?;
        header.expect_kind(ArtifactKind::Table)?;
        let (rows, cols) = header.shape();

        let index: AxisIndex = read_json_section(reader)?;
        let columns: AxisIndex = read_json_section(reader)?;

        let mut values = Vec::with_capacity(rows * cols);
        let mut buf = [0u8; 8];
        for _ in 0..rows * cols {
            reader.read_exact(&mut buf)?;
            values.push(f64::from_le_bytes(buf));
        }

        Table::new(values, (rows, cols), index, columns)
            .map_err(|e| invalid_data(e.to_string()))
    }
}

impl AxisIndex {
    /// Save a standalone index (the label side of a sparse artifact).
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        OtabHeader::new(ArtifactKind::Index, self.len() as u64, 0).write_to(&mut file)?;
        write_json_section(&mut file, self)
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let mut file = std::fs::File::open(path)?;
        let header = OtabHeader::read_from(&mut file)?;
        header.expect_kind(ArtifactKind::Index)?;
        let index: AxisIndex = read_json_section(&mut file)?;
        if index.len() as u64 != header.rows {
            return Err(invalid_data(format!(
                "index length {} does not match header ({})",
                index.len(),
                header.rows
            )));
        }
        Ok(index)
    }
}

impl CscMatrix {
    /// Save sparse matrix to a file in OTAB format.
    ///
    /// Layout after the header: dtype tag (1 byte), nnz (u64), col_ptr
    /// (cols+1 u64 values), row_indices (nnz u64 values), then nnz values
    /// at the dtype's width. All little-endian.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        self.write_to(&mut file)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let (rows, cols) = self.shape();
        OtabHeader::new(ArtifactKind::Sparse, rows as u64, cols as u64).write_to(w)?;
        w.write_all(&[self.dtype().tag()])?;
        w.write_all(&(self.nnz() as u64).to_le_bytes())?;
        for &p in self.col_ptr() {
            w.write_all(&(p as u64).to_le_bytes())?;
        }
        for &r in self.row_indices() {
            w.write_all(&(r as u64).to_le_bytes())?;
        }
        match self.data() {
            CscData::I16(v) => {
                for x in v {
                    w.write_all(&x.to_le_bytes())?;
                }
            }
            CscData::I32(v) => {
                for x in v {
                    w.write_all(&x.to_le_bytes())?;
                }
            }
            CscData::F32(v) => {
                for x in v {
                    w.write_all(&x.to_le_bytes())?;
                }
            }
            CscData::F64(v) => {
                for x in v {
                    w.write_all(&x.to_le_bytes())?;
                }
            }
        }
        Ok(())
    }

    /// Load sparse matrix from a file in OTAB format.
    pub fn load(path: &Path) -> io::Result<Self> {
        let mut file = std::fs::File::open(path)?;
        Self::load_from_reader(&mut file)
    }

    pub fn load_from_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let header = OtabHeader::read_from(reader)?;
        header.expect_kind(ArtifactKind::Sparse)?;
        let (rows, cols) = header.shape();

        let mut tag = [0u8; 1];
        reader.read_exact(&mut tag)?;
        let dtype = SparseDType::from_tag(tag[0])
            .ok_or_else(|| invalid_data(format!("invalid dtype tag: {}", tag[0])))?;

        let nnz = read_u64(reader)? as usize;

        let mut col_ptr = Vec::with_capacity(cols + 1);
        for _ in 0..cols + 1 {
            col_ptr.push(read_u64(reader)? as usize);
        }
        if col_ptr.first() != Some(&0) || col_ptr.last() != Some(&nnz) {
            return Err(invalid_data("column pointers do not cover the value array"));
        }

        let mut row_indices = Vec::with_capacity(nnz);
        for _ in 0..nnz {
            let r = read_u64(reader)? as usize;
            if r >= rows {
                return Err(invalid_data(format!("row index {r} out of bounds")));
            }
            row_indices.push(r);
        }

        let values = match dtype {
            SparseDType::I16 => {
                let mut v = Vec::with_capacity(nnz);
                let mut buf = [0u8; 2];
                for _ in 0..nnz {
                    reader.read_exact(&mut buf)?;
                    v.push(i16::from_le_bytes(buf));
                }
                CscData::I16(v)
            }
            SparseDType::I32 => {
                let mut v = Vec::with_capacity(nnz);
                let mut buf = [0u8; 4];
                for _ in 0..nnz {
                    reader.read_exact(&mut buf)?;
                    v.push(i32::from_le_bytes(buf));
                }
                CscData::I32(v)
            }
            SparseDType::F32 => {
                let mut v = Vec::with_capacity(nnz);
                let mut buf = [0u8; 4];
                for _ in 0..nnz {
                    reader.read_exact(&mut buf)?;
                    v.push(f32::from_le_bytes(buf));
                }
                CscData::F32(v)
            }
            SparseDType::F64 => {
                let mut v = Vec::with_capacity(nnz);
                let mut buf = [0u8; 8];
                for _ in 0..nnz {
                    reader.read_exact(&mut buf)?;
                    v.push(f64::from_le_bytes(buf));
                }
                CscData::F64(v)
            }
        };

        Ok(CscMatrix::new(values, row_indices, col_ptr, (rows, cols)))
    }
}

fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
