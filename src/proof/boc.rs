// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bag-of-cells reader.
//!
//! Decodes the `serialized_boc#b5ee9c72` container TON wallets use for
//! `walletStateInit` and computes each cell's representation hash, which is
//! what a contract address commits to.
//!
//! Only ordinary level-0 cells are accepted. Wallet state inits never carry
//! exotic cells (pruned branches, library references, Merkle proofs), and
//! refusing them keeps the hash rule to its simplest form:
//!
//! ```text
//! repr = d1 || d2 || data || depth(child)* || hash(child)*
//! hash = sha256(repr)
//! ```

use base64ct::{Base64, Base64Url, Encoding};
use sha2::{Digest, Sha256};
use thiserror::Error;

const BOC_MAGIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];

const FLAG_HAS_INDEX: u8 = 0x80;
const FLAG_HAS_CRC32C: u8 = 0x40;
const REF_SIZE_MASK: u8 = 0x07;

const MAX_REFS: usize = 4;
const MAX_DEPTH: u16 = 1024;

/// Upper bound on cells in one bag. A wallet state init has a handful.
pub const MAX_CELLS: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BocError {
    #[error("not valid base64")]
    Encoding,
    #[error("unexpected end of data")]
    Truncated,
    #[error("bad magic prefix")]
    Magic,
    #[error("invalid header: {0}")]
    Header(&'static str),
    #[error("crc32c mismatch")]
    Checksum,
    #[error("cell {0} is malformed")]
    Cell(usize),
    #[error("cell {0} is not an ordinary cell")]
    Unsupported(usize),
    #[error("expected exactly one root, found {0}")]
    Roots(usize),
    #[error("read past the end of a cell")]
    Underflow,
}

#[derive(Debug)]
struct Cell {
    /// Serialized data bytes, completion tag included.
    data: Vec<u8>,
    bit_len: usize,
    d2: u8,
    refs: Vec<usize>,
    depth: u16,
    hash: [u8; 32],
}

/// A decoded bag of cells.
#[derive(Debug)]
pub struct BagOfCells {
    cells: Vec<Cell>,
    roots: Vec<usize>,
}

impl BagOfCells {
    /// Decode base64 or base64url text.
    pub fn parse_base64(text: &str) -> Result<Self, BocError> {
        let text = text.trim();
        let decoded = if text.contains(['-', '_']) {
            Base64Url::decode_vec(text)
        } else {
            Base64::decode_vec(text)
        };
        let bytes = decoded.map_err(|_| BocError::Encoding)?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, BocError> {
        let mut reader = Reader::new(bytes);

        if reader.take(4)? != BOC_MAGIC {
            return Err(BocError::Magic);
        }

        let flags = reader.byte()?;
        let ref_size = usize::from(flags & REF_SIZE_MASK);
        if !(1..=4).contains(&ref_size) {
            return Err(BocError::Header("reference size"));
        }
        let off_size = usize::from(reader.byte()?);
        if !(1..=8).contains(&off_size) {
            return Err(BocError::Header("offset size"));
        }

        let cell_count = reader.uint(ref_size)?;
        let root_count = reader.uint(ref_size)?;
        let absent = reader.uint(ref_size)?;
        let total_size = reader.uint(off_size)?;

        if cell_count == 0 || cell_count > MAX_CELLS {
            return Err(BocError::Header("cell count"));
        }
        if root_count == 0 || root_count > cell_count {
            return Err(BocError::Header("root count"));
        }
        if absent != 0 {
            return Err(BocError::Header("absent cells"));
        }

        let roots = (0..root_count)
            .map(|_| reader.uint(ref_size))
            .collect::<Result<Vec<_>, _>>()?;
        if roots.iter().any(|&root| root >= cell_count) {
            return Err(BocError::Header("root index"));
        }

        if flags & FLAG_HAS_INDEX != 0 {
            let index_len = cell_count
                .checked_mul(off_size)
                .ok_or(BocError::Header("index size"))?;
            reader.take(index_len)?;
        }

        let body = reader.take(total_size)?;
        let mut cells = parse_cells(body, cell_count, ref_size)?;

        if flags & FLAG_HAS_CRC32C != 0 {
            let covered = reader.pos;
            let stored = reader.take(4)?;
            let expected = crc32c(&bytes[..covered]).to_le_bytes();
            if stored != expected {
                return Err(BocError::Checksum);
            }
        }
        if reader.pos != bytes.len() {
            return Err(BocError::Header("trailing bytes"));
        }

        compute_hashes(&mut cells)?;
        Ok(Self { cells, roots })
    }

    /// The only root, or an error if the bag has several.
    pub fn single_root(&self) -> Result<CellRef<'_>, BocError> {
        match self.roots.as_slice() {
            [root] => Ok(CellRef {
                boc: self,
                index: *root,
            }),
            roots => Err(BocError::Roots(roots.len())),
        }
    }
}

/// A cell inside a [`BagOfCells`].
#[derive(Debug, Clone, Copy)]
pub struct CellRef<'a> {
    boc: &'a BagOfCells,
    index: usize,
}

impl<'a> CellRef<'a> {
    fn cell(&self) -> &'a Cell {
        &self.boc.cells[self.index]
    }

    /// Representation hash.
    pub fn hash(&self) -> [u8; 32] {
        self.cell().hash
    }

    pub fn bit_len(&self) -> usize {
        self.cell().bit_len
    }

    pub fn reference_count(&self) -> usize {
        self.cell().refs.len()
    }

    pub fn reference(&self, n: usize) -> Result<CellRef<'a>, BocError> {
        let index = *self.cell().refs.get(n).ok_or(BocError::Underflow)?;
        Ok(CellRef {
            boc: self.boc,
            index,
        })
    }

    pub fn parser(&self) -> CellParser<'a> {
        CellParser {
            cell: *self,
            bit_pos: 0,
            ref_pos: 0,
        }
    }
}

/// Sequential reader over one cell's bits and references.
pub struct CellParser<'a> {
    cell: CellRef<'a>,
    bit_pos: usize,
    ref_pos: usize,
}

impl<'a> CellParser<'a> {
    pub fn remaining_bits(&self) -> usize {
        self.cell.bit_len() - self.bit_pos
    }

    pub fn load_bit(&mut self) -> Result<bool, BocError> {
        if self.remaining_bits() == 0 {
            return Err(BocError::Underflow);
        }
        let pos = self.bit_pos;
        self.bit_pos += 1;
        Ok(self.cell.cell().data[pos / 8] & (0x80 >> (pos % 8)) != 0)
    }

    /// Load an unsigned big-endian integer of up to 64 bits.
    pub fn load_uint(&mut self, bits: usize) -> Result<u64, BocError> {
        if bits > 64 || bits > self.remaining_bits() {
            return Err(BocError::Underflow);
        }
        let mut value = 0u64;
        for _ in 0..bits {
            value = (value << 1) | u64::from(self.load_bit()?);
        }
        Ok(value)
    }

    pub fn skip_bits(&mut self, bits: usize) -> Result<(), BocError> {
        if bits > self.remaining_bits() {
            return Err(BocError::Underflow);
        }
        self.bit_pos += bits;
        Ok(())
    }

    pub fn load_bytes<const N: usize>(&mut self) -> Result<[u8; N], BocError> {
        if N * 8 > self.remaining_bits() {
            return Err(BocError::Underflow);
        }
        let mut out = [0u8; N];
        for byte in out.iter_mut() {
            // Bounded by the length check above.
            *byte = self.load_uint(8)? as u8;
        }
        Ok(out)
    }

    pub fn load_ref(&mut self) -> Result<CellRef<'a>, BocError> {
        let child = self.cell.reference(self.ref_pos)?;
        self.ref_pos += 1;
        Ok(child)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], BocError> {
        let end = self.pos.checked_add(len).ok_or(BocError::Truncated)?;
        let slice = self.bytes.get(self.pos..end).ok_or(BocError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, BocError> {
        Ok(self.take(1)?[0])
    }

    /// Big-endian unsigned integer of `len` bytes (1..=8).
    fn uint(&mut self, len: usize) -> Result<usize, BocError> {
        let value = self
            .take(len)?
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        usize::try_from(value).map_err(|_| BocError::Header("integer overflow"))
    }
}

fn parse_cells(body: &[u8], count: usize, ref_size: usize) -> Result<Vec<Cell>, BocError> {
    let mut reader = Reader::new(body);
    let mut cells = Vec::with_capacity(count);

    for index in 0..count {
        let d1 = reader.byte()?;
        let d2 = reader.byte()?;

        let ref_count = usize::from(d1 & 0x07);
        let is_exotic = d1 & 0x08 != 0;
        let with_hashes = d1 & 0x10 != 0;
        let level_mask = d1 >> 5;
        if ref_count > MAX_REFS {
            return Err(BocError::Cell(index));
        }
        if is_exotic || with_hashes || level_mask != 0 {
            return Err(BocError::Unsupported(index));
        }

        let data_len = usize::from(d2).div_ceil(2);
        let data = reader.take(data_len)?.to_vec();
        let bit_len = if d2 % 2 == 0 {
            data_len * 8
        } else {
            // Partial last byte: a 1 bit closes the data, zeros pad the rest.
            let last = data[data_len - 1];
            if last == 0 {
                return Err(BocError::Cell(index));
            }
            data_len * 8 - 1 - last.trailing_zeros() as usize
        };

        let mut refs = Vec::with_capacity(ref_count);
        for _ in 0..ref_count {
            let child = reader.uint(ref_size)?;
            // Children always follow their parent, which also rules out cycles.
            if child <= index || child >= count {
                return Err(BocError::Cell(index));
            }
            refs.push(child);
        }

        cells.push(Cell {
            data,
            bit_len,
            d2,
            refs,
            depth: 0,
            hash: [0; 32],
        });
    }

    if reader.pos != body.len() {
        return Err(BocError::Header("cell data size"));
    }
    Ok(cells)
}

fn compute_hashes(cells: &mut [Cell]) -> Result<(), BocError> {
    for index in (0..cells.len()).rev() {
        let cell = &cells[index];

        let mut depth = 0u16;
        let mut hasher = Sha256::new();
        hasher.update([cell.refs.len() as u8, cell.d2]);
        hasher.update(&cell.data);
        for &child in &cell.refs {
            let child_depth = cells[child].depth;
            depth = depth.max(child_depth + 1);
            hasher.update(child_depth.to_be_bytes());
        }
        for &child in &cell.refs {
            hasher.update(cells[child].hash);
        }
        if depth > MAX_DEPTH {
            return Err(BocError::Cell(index));
        }

        let hash: [u8; 32] = hasher.finalize().into();
        let cell = &mut cells[index];
        cell.depth = depth;
        cell.hash = hash;
    }
    Ok(())
}

/// CRC-32C (Castagnoli, reflected), as appended to serialized bags.
fn crc32c(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0x82f6_3b78
            } else {
                crc >> 1
            };
        }
    }
    !crc
}
