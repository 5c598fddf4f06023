#![deny(missing_docs)]

/*!

A compact binary codec for 8-bit grayscale raster masks.

Segmentation output is low-entropy: each pixel is one of a handful of
class labels and long horizontal runs of the same value dominate. This
crate stores such masks as a per-row run-length stream with bit widths
chosen from the statistics of each file, which makes the files smaller
than PNG/QOI/BMP on realistic masks and considerably faster to read back.
The format is lossless and self-describing; see [`header`] for the wire
layout.

Encoding and decoding are single synchronous calls with no shared state,
so distinct masks may be processed from distinct threads freely.

# Example

```rust
use fastmask::{decode, encode, info};

let mask = vec![0u8; 64];
let encoded = encode(&mask, 8, 8).unwrap();
assert_eq!(info(&encoded).unwrap().shape(), (8, 8));

let decoded = decode(&encoded).unwrap();
assert_eq!(decoded.data(), &mask[..]);
```

*/

use std::io;

/// Public exports
pub use self::decode::{decode, decode_into};
pub use self::encode::encode;
pub use self::file::{read, write};
pub use self::header::{info, Header};

pub mod bits;
pub mod decode;
pub mod encode;
pub mod file;
pub mod header;
pub mod runs;

enum Error {
    ZeroDimension,
    DimensionOverflow,
    LengthMismatch,
}

fn error<T>(e: Error) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        match e {
            Error::ZeroDimension => "mask dimensions must be positive",
            Error::DimensionOverflow => "mask dimensions overflow the address space",
            Error::LengthMismatch => "mask data does not match its dimensions",
        },
    ))
}

// Validates a (length, height, width) triple and returns the pixel count.
pub(crate) fn check_dims(len: usize, height: u32, width: u32) -> io::Result<usize> {
    if height == 0 || width == 0 {
        return error(Error::ZeroDimension);
    }
    let pixels = u64::from(height) * u64::from(width);
    let pixels = match usize::try_from(pixels) {
        Ok(n) => n,
        Err(_) => return error(Error::DimensionOverflow),
    };
    if len != pixels {
        return error(Error::LengthMismatch);
    }
    Ok(pixels)
}

/// An owned two-dimensional array of 8-bit samples, stored contiguously
/// in row-major order.
///
/// This is the value the decoder hands back and the natural carrier for
/// data headed into [`encode`]. Dimensions are strictly positive and the
/// backing buffer always holds exactly `height * width` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u8>,
    height: u32,
    width: u32,
}

impl Mask {
    /// Wraps a row-major sample buffer, validating it against the given
    /// dimensions. Fails with `io::ErrorKind::InvalidInput` when the
    /// dimensions are zero, overflow, or disagree with `data.len()`.
    pub fn from_vec(data: Vec<u8>, height: u32, width: u32) -> io::Result<Mask> {
        check_dims(data.len(), height, width)?;
        Ok(Mask {
            data,
            height,
            width,
        })
    }

    // Decoder-side constructor; the caller guarantees consistency.
    pub(crate) fn from_parts(data: Vec<u8>, height: u32, width: u32) -> Mask {
        debug_assert_eq!(data.len() as u64, u64::from(height) * u64::from(width));
        Mask {
            data,
            height,
            width,
        }
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Shape as `(height, width)`.
    pub fn shape(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    /// All samples, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// One row of samples.
    ///
    /// # Panics
    ///
    /// Panics if `row >= height`.
    pub fn row(&self, row: u32) -> &[u8] {
        assert!(row < self.height, "row {} out of {}", row, self.height);
        let w = self.width as usize;
        let start = row as usize * w;
        &self.data[start..start + w]
    }

    /// Consumes the mask, returning the backing buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Encodes this mask; shorthand for [`encode`] on the backing data.
    pub fn encode(&self) -> io::Result<Vec<u8>> {
        encode(&self.data, self.height, self.width)
    }
}
