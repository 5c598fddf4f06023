/*!

Two-pass mask encoder.

The first pass walks every row once to collect the distinct symbols, the
longest run and the largest per-row run count. Those maxima fix the symbol
table (distinct values in ascending order) and the three per-file bit
widths, each the smallest that fits what was observed. The second pass
emits the header followed by one block per row: the run count, then a
`(symbol index, count)` pair per run, all bit-packed back to back. Runs
are streamed straight into the bit writer; nothing per-run is buffered.

# Example

```rust
use fastmask::{decode, encode};

let mask = [0u8, 0, 0, 1, 1, 0, 2, 2];
let encoded = encode(&mask, 2, 4).unwrap();
assert_eq!(&encoded[..4], b"pfmf");
assert_eq!(decode(&encoded).unwrap().data(), &mask[..]);
```

*/

use std::io;

use log::debug;

use crate::bits::BitWriter;
use crate::header::{symbol_width, value_width, Header};
use crate::runs::runs;

/// Per-file occurrence statistics, gathered row by row.
struct Stats {
    present: [bool; 256],
    max_count: u32,
    max_runs: u32,
}

impl Stats {
    fn new() -> Stats {
        Stats {
            present: [false; 256],
            max_count: 0,
            max_runs: 0,
        }
    }

    /// Folds one row into the running maxima.
    fn gather(&mut self, row: &[u8]) {
        let mut k = 0u32;
        for (symbol, count) in runs(row) {
            self.present[symbol as usize] = true;
            if count > self.max_count {
                self.max_count = count;
            }
            k += 1;
        }
        if k > self.max_runs {
            self.max_runs = k;
        }
    }

    /// Builds the symbol table (ascending values) and the value-to-index
    /// map the emit pass looks up per run.
    fn alphabet(&self) -> (Vec<u8>, [u8; 256]) {
        let mut symbols = Vec::new();
        let mut index = [0u8; 256];
        for value in 0..256 {
            if self.present[value] {
                index[value] = symbols.len() as u8;
                symbols.push(value as u8);
            }
        }
        (symbols, index)
    }
}

/// Encodes a row-major `height` by `width` mask into a self-describing
/// byte stream.
///
/// `data` must hold exactly `height * width` samples; dimension problems
/// surface as `io::ErrorKind::InvalidInput` and no buffer is produced.
pub fn encode(data: &[u8], height: u32, width: u32) -> io::Result<Vec<u8>> {
    crate::check_dims(data.len(), height, width)?;
    let w = width as usize;

    let mut stats = Stats::new();
    for row in data.chunks_exact(w) {
        stats.gather(row);
    }
    let (symbols, index) = stats.alphabet();

    let header = Header {
        height,
        width,
        symbol_bits: symbol_width(symbols.len()),
        count_bits: value_width(stats.max_count),
        line_bits: value_width(stats.max_runs),
        symbols,
    };
    debug!(
        "encoding {}x{} mask: {} symbols, bit widths {}/{}/{} (line/symbol/count)",
        height,
        width,
        header.symbol_count(),
        header.line_bits,
        header.symbol_bits,
        header.count_bits,
    );

    let mut out = Vec::with_capacity(header.encoded_len());
    header.write_to(&mut out)?;

    let line_bits = u32::from(header.line_bits);
    let symbol_bits = u32::from(header.symbol_bits);
    let count_bits = u32::from(header.count_bits);
    let mut bits = BitWriter::append_to(out);
    for row in data.chunks_exact(w) {
        bits.write_bits(runs(row).count() as u32, line_bits);
        for (symbol, count) in runs(row) {
            bits.write_bits(u32::from(index[symbol as usize]), symbol_bits);
            bits.write_bits(count, count_bits);
        }
    }
    Ok(bits.finish())
}
