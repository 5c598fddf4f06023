/*!

The fixed preamble of a mask file and its parser.

A file opens with the magic `pfmf` and a version byte, followed by the mask
dimensions, the per-file symbol table and the three bit widths that size
every payload field:

| field        | width            |
|--------------|------------------|
| magic        | 4 bytes (`pfmf`) |
| version      | 1 byte (= 1)     |
| height       | u32, little-endian |
| width        | u32, little-endian |
| symbol count | u16, little-endian |
| symbol table | `S` bytes        |
| symbol width | 1 byte (0..8)    |
| count width  | 1 byte (1..32)   |
| line width   | 1 byte (1..32)   |

The header is `18 + S` bytes in total. Everything after it is the
bit-packed payload described in [`crate::decode`].

*/

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// The four magic bytes opening every mask file.
pub const MAGIC: [u8; 4] = *b"pfmf";
/// The current (and only) format version.
pub const VERSION: u8 = 1;

// Header bytes not occupied by the symbol table.
pub(crate) const FIXED_LEN: usize = 18;
// Largest possible header: a table carrying all 256 symbols.
pub(crate) const MAX_LEN: usize = FIXED_LEN + 256;

enum Error {
    TooShort,
    BadMagic,
    BadVersion,
    ZeroDimension,
    NoSymbols,
    TooManySymbols,
    SymbolWidthOutOfRange,
    SymbolWidthTooNarrow,
    CountWidthOutOfRange,
    LineWidthOutOfRange,
}

fn error<T>(e: Error) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        match e {
            Error::TooShort => "buffer too short for header",
            Error::BadMagic => "bad magic bytes",
            Error::BadVersion => "unknown format version",
            Error::ZeroDimension => "zero mask dimension",
            Error::NoSymbols => "empty symbol table",
            Error::TooManySymbols => "more than 256 symbols",
            Error::SymbolWidthOutOfRange => "symbol bit width out of range",
            Error::SymbolWidthTooNarrow => "symbol bit width cannot address the table",
            Error::CountWidthOutOfRange => "count bit width out of range",
            Error::LineWidthOutOfRange => "line bit width out of range",
        },
    ))
}

/// Number of bits needed to index a symbol table of `count` entries.
/// A single-entry table needs none.
pub(crate) fn symbol_width(count: usize) -> u8 {
    if count <= 1 {
        0
    } else {
        (32 - ((count - 1) as u32).leading_zeros()) as u8
    }
}

/// Number of bits needed to store values up to `max`, at least one.
pub(crate) fn value_width(max: u32) -> u8 {
    std::cmp::max(1, 32 - max.leading_zeros()) as u8
}

/// The parsed preamble of an encoded mask.
///
/// Field for field this is the wire layout above; it doubles as the
/// summary returned by [`info`] without touching the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// Number of rows, at least 1.
    pub height: u32,
    /// Number of columns, at least 1.
    pub width: u32,
    /// Distinct symbol values; payload fields store indices into this table.
    pub symbols: Vec<u8>,
    /// Bits per symbol index, 0 when the table has one entry.
    pub symbol_bits: u8,
    /// Bits per run length.
    pub count_bits: u8,
    /// Bits per per-row run count.
    pub line_bits: u8,
}

impl Header {
    /// Mask shape as `(height, width)`.
    pub fn shape(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    /// Number of distinct symbols in the mask.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Size of this header on the wire, in bytes.
    pub fn encoded_len(&self) -> usize {
        FIXED_LEN + self.symbols.len()
    }

    /// Serializes the header to the back of `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) -> io::Result<()> {
        out.write_all(&MAGIC)?;
        out.write_u8(VERSION)?;
        out.write_u32::<LittleEndian>(self.height)?;
        out.write_u32::<LittleEndian>(self.width)?;
        out.write_u16::<LittleEndian>(self.symbols.len() as u16)?;
        out.write_all(&self.symbols)?;
        out.write_u8(self.symbol_bits)?;
        out.write_u8(self.count_bits)?;
        out.write_u8(self.line_bits)?;
        Ok(())
    }

    /// Parses a header from the front of `buf`.
    ///
    /// Any malformed field surfaces as `io::ErrorKind::InvalidData`; bytes
    /// past the header are ignored.
    pub fn parse(buf: &[u8]) -> io::Result<Header> {
        if buf.len() < FIXED_LEN {
            return error(Error::TooShort);
        }
        let mut r = buf;
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return error(Error::BadMagic);
        }
        if r.read_u8()? != VERSION {
            return error(Error::BadVersion);
        }
        let height = r.read_u32::<LittleEndian>()?;
        let width = r.read_u32::<LittleEndian>()?;
        if height == 0 || width == 0 {
            return error(Error::ZeroDimension);
        }
        let count = r.read_u16::<LittleEndian>()? as usize;
        if count == 0 {
            return error(Error::NoSymbols);
        }
        if count > 256 {
            return error(Error::TooManySymbols);
        }
        if buf.len() < FIXED_LEN + count {
            return error(Error::TooShort);
        }
        let mut symbols = vec![0u8; count];
        r.read_exact(&mut symbols)?;
        let symbol_bits = r.read_u8()?;
        let count_bits = r.read_u8()?;
        let line_bits = r.read_u8()?;
        if symbol_bits > 8 {
            return error(Error::SymbolWidthOutOfRange);
        }
        if symbol_bits < symbol_width(count) {
            return error(Error::SymbolWidthTooNarrow);
        }
        if count_bits == 0 || count_bits > 32 {
            return error(Error::CountWidthOutOfRange);
        }
        if line_bits == 0 || line_bits > 32 {
            return error(Error::LineWidthOutOfRange);
        }
        Ok(Header {
            height,
            width,
            symbols,
            symbol_bits,
            count_bits,
            line_bits,
        })
    }
}

/// Parses just the header of an encoded mask, leaving the payload alone.
///
/// # Example
///
/// ```rust
/// use fastmask::{encode, info};
///
/// let encoded = encode(&[3u8; 200], 10, 20).unwrap();
/// let header = info(&encoded).unwrap();
/// assert_eq!(header.shape(), (10, 20));
/// assert_eq!(header.symbol_count(), 1);
/// ```
pub fn info(buf: &[u8]) -> io::Result<Header> {
    Header::parse(buf)
}
