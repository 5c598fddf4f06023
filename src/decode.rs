/*!

Mask decoder.

Decoding parses the header, then materializes the payload row by row: a
run count sized by the line width, followed by that many
`(symbol index, count)` pairs sized by the symbol and count widths. Each
run becomes one contiguous `fill` into the output row, so the hot loop is
a few accumulator shifts per field and a memset per run. The whole file is
decoded in one call; any malformed field aborts with
`io::ErrorKind::InvalidData` and no partial mask escapes.

Bits after the final row are padding and are never inspected.

# Example

```rust
use fastmask::{decode, encode};

let mask = [1u8, 1, 1, 1, 0, 0, 3, 3];
let encoded = encode(&mask, 2, 4).unwrap();

let decoded = decode(&encoded).unwrap();
assert_eq!(decoded.shape(), (2, 4));
assert_eq!(decoded.data(), &mask[..]);
```

*/

use std::io;

use log::debug;

use crate::bits::BitReader;
use crate::header::Header;
use crate::Mask;

enum Error {
    DimensionOverflow,
    SymbolOutOfRange,
    EmptyRun,
    RowOverflow,
    RowUnderflow,
}

fn error<T>(e: Error) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        match e {
            Error::DimensionOverflow => "mask dimensions overflow the address space",
            Error::SymbolOutOfRange => "symbol index out of range",
            Error::EmptyRun => "zero-length run",
            Error::RowOverflow => "runs overflow the row width",
            Error::RowUnderflow => "runs fall short of the row width",
        },
    ))
}

fn pixel_count(header: &Header) -> io::Result<usize> {
    let pixels = u64::from(header.height) * u64::from(header.width);
    match usize::try_from(pixels) {
        Ok(n) => Ok(n),
        Err(_) => error(Error::DimensionOverflow),
    }
}

/// Decodes an encoded mask into a freshly allocated [`Mask`].
pub fn decode(buf: &[u8]) -> io::Result<Mask> {
    let header = Header::parse(buf)?;
    let mut data = vec![0u8; pixel_count(&header)?];
    fill_rows(&header, &buf[header.encoded_len()..], &mut data)?;
    Ok(Mask::from_parts(data, header.height, header.width))
}

/// Decodes an encoded mask into a caller-provided buffer, returning the
/// parsed header.
///
/// `out` must hold exactly `height * width` bytes for the dimensions the
/// header advertises; a mismatch fails with `io::ErrorKind::InvalidInput`
/// before any byte is written.
pub fn decode_into(buf: &[u8], out: &mut [u8]) -> io::Result<Header> {
    let header = Header::parse(buf)?;
    if out.len() != pixel_count(&header)? {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "output buffer does not match the encoded dimensions",
        ));
    }
    fill_rows(&header, &buf[header.encoded_len()..], out)?;
    Ok(header)
}

// Materializes every row of `payload` into `out`, which the caller has
// sized to exactly height * width bytes.
fn fill_rows(header: &Header, payload: &[u8], out: &mut [u8]) -> io::Result<()> {
    let width = header.width as usize;
    let table = &header.symbols[..];
    let symbol_count = table.len() as u32;
    let line_bits = u32::from(header.line_bits);
    let symbol_bits = u32::from(header.symbol_bits);
    let count_bits = u32::from(header.count_bits);
    debug!(
        "decoding {}x{} mask: {} symbols, bit widths {}/{}/{} (line/symbol/count)",
        header.height, header.width, symbol_count, line_bits, symbol_bits, count_bits,
    );

    let mut bits = BitReader::new(payload);
    for row in out.chunks_exact_mut(width) {
        let k = bits.read_bits(line_bits)?;
        let mut filled = 0usize;
        for _ in 0..k {
            let idx = bits.read_bits(symbol_bits)?;
            let n = bits.read_bits(count_bits)? as usize;
            if idx >= symbol_count {
                return error(Error::SymbolOutOfRange);
            }
            if n == 0 {
                return error(Error::EmptyRun);
            }
            if n > width - filled {
                return error(Error::RowOverflow);
            }
            row[filled..filled + n].fill(table[idx as usize]);
            filled += n;
        }
        if filled != width {
            return error(Error::RowUnderflow);
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::{decode, decode_into};
    use crate::bits::BitWriter;
    use crate::encode::encode;
    use crate::header::Header;

    fn test_roundtrip(data: &[u8], height: u32, width: u32) {
        let encoded = encode(data, height, width).unwrap();
        let mask = decode(&encoded).unwrap();
        assert_eq!(mask.shape(), (height, width));
        assert_eq!(mask.data(), data);
    }

    fn assert_invalid(buf: &[u8], why: &str) {
        let err = decode(buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData, "{}", why);
    }

    fn random_mask(rng: &mut StdRng, len: usize, symbols: u8) -> Vec<u8> {
        (0..len).map(|_| rng.gen_range(0..=symbols)).collect()
    }

    // Header plus hand-packed payload, for malformed-stream cases.
    fn craft(header: &Header, fields: &[(u32, u32)]) -> Vec<u8> {
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        let mut bits = BitWriter::append_to(buf);
        for &(value, n) in fields {
            bits.write_bits(value, n);
        }
        bits.finish()
    }

    fn crafted_header() -> Header {
        Header {
            height: 1,
            width: 4,
            symbols: vec![1, 2, 3],
            symbol_bits: 2,
            count_bits: 3,
            line_bits: 2,
        }
    }

    #[test]
    fn solid_square() {
        let mut data = vec![0u8; 10_000];
        for r in 20..80 {
            for c in 20..80 {
                data[r * 100 + c] = 1;
            }
        }
        test_roundtrip(&data, 100, 100);
    }

    #[test]
    fn arange_tile() {
        let data: Vec<u8> = (0..=255).collect();
        test_roundtrip(&data, 16, 16);
    }

    #[test]
    fn all_zeros() {
        test_roundtrip(&vec![0u8; 10_000], 100, 100);
    }

    #[test]
    fn binary_noise() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let data = random_mask(&mut rng, 1234 * 2345, 1);
        test_roundtrip(&data, 1234, 2345);
    }

    #[test]
    fn arbitrary_noise() {
        let mut rng = StdRng::seed_from_u64(0xfeed);
        let data = random_mask(&mut rng, 77 * 171, 255);
        test_roundtrip(&data, 77, 171);
    }

    #[test]
    fn boundary_shapes() {
        test_roundtrip(&[9], 1, 1);
        test_roundtrip(&[1, 2, 3, 4, 5], 1, 5);
        test_roundtrip(&[1, 2, 3, 4, 5], 5, 1);
        let alternating: Vec<u8> = (0..256u32).map(|i| (i % 2) as u8).collect();
        test_roundtrip(&alternating, 8, 32);
        let identical_rows = [3u8, 3, 7, 7].repeat(50);
        test_roundtrip(&identical_rows, 50, 4);
    }

    #[test]
    fn decode_into_reuses_a_buffer() {
        let data = [4u8, 4, 4, 8, 8, 8];
        let encoded = encode(&data, 2, 3).unwrap();
        let mut out = [0u8; 6];
        let header = decode_into(&encoded, &mut out).unwrap();
        assert_eq!(header.shape(), (2, 3));
        assert_eq!(out, data);
    }

    #[test]
    fn decode_into_rejects_wrong_buffer_size() {
        let encoded = encode(&[0u8; 6], 2, 3).unwrap();
        let mut out = [0u8; 7];
        let err = decode_into(&encoded, &mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn malformed_magic() {
        assert_invalid(b"wrong", "magic");
    }

    #[test]
    fn unknown_version() {
        assert_invalid(b"pfmf\x99", "version");
    }

    #[test]
    fn short_buffer() {
        assert_invalid(b"0", "one byte");
    }

    #[test]
    fn truncated_payload() {
        let data = vec![1u8; 4096];
        let encoded = encode(&data, 64, 64).unwrap();
        assert_invalid(&encoded[..encoded.len() - 1], "last byte missing");
        let header_len = Header::parse(&encoded).unwrap().encoded_len();
        assert_invalid(&encoded[..header_len], "payload missing entirely");
    }

    #[test]
    fn symbol_index_out_of_range() {
        // k=1, idx=3 on a 3-entry table
        let buf = craft(&crafted_header(), &[(1, 2), (3, 2), (4, 3)]);
        assert_invalid(&buf, "index 3 with S = 3");
    }

    #[test]
    fn zero_length_run() {
        let buf = craft(&crafted_header(), &[(1, 2), (0, 2), (0, 3)]);
        assert_invalid(&buf, "count 0");
    }

    #[test]
    fn runs_overflowing_the_row() {
        // k=1, one run of 5 on a width-4 row
        let buf = craft(&crafted_header(), &[(1, 2), (0, 2), (5, 3)]);
        assert_invalid(&buf, "5 > 4");
    }

    #[test]
    fn runs_underfilling_the_row() {
        // k=1, one run of 2 on a width-4 row
        let buf = craft(&crafted_header(), &[(1, 2), (0, 2), (2, 3)]);
        assert_invalid(&buf, "2 < 4");
    }

    #[test]
    fn decode_accepts_any_table_order() {
        // Same stream twice, once with a descending table: the table alone
        // gives indices their meaning.
        let sorted = craft(
            &Header {
                symbols: vec![10, 20],
                symbol_bits: 1,
                ..crafted_header()
            },
            &[(2, 2), (0, 1), (2, 3), (1, 1), (2, 3)],
        );
        assert_eq!(decode(&sorted).unwrap().data(), &[10, 10, 20, 20]);

        let reversed = craft(
            &Header {
                symbols: vec![20, 10],
                symbol_bits: 1,
                ..crafted_header()
            },
            &[(2, 2), (0, 1), (2, 3), (1, 1), (2, 3)],
        );
        assert_eq!(decode(&reversed).unwrap().data(), &[20, 20, 10, 10]);
    }

    #[test]
    fn padding_bits_are_ignored() {
        // 2x2 of zeros: S=1, widths 1/0/2; 3 bits per row, 6 bits total,
        // leaving two padding bits in the single payload byte.
        let data = [0u8; 4];
        let mut encoded = encode(&data, 2, 2).unwrap();
        let last = encoded.len() - 1;
        encoded[last] |= 0b1100_0000;
        assert_eq!(decode(&encoded).unwrap().data(), &data[..]);
    }

    #[test]
    fn trailing_garbage_bytes_are_ignored() {
        let data = [5u8, 5, 6, 6, 6, 6];
        let mut encoded = encode(&data, 3, 2).unwrap();
        encoded.extend_from_slice(&[0xff, 0x00, 0xab]);
        assert_eq!(decode(&encoded).unwrap().data(), &data[..]);
    }
}
