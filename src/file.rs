/*!

Filesystem wrappers around the in-memory codec.

These are thin: encode plus a single write, or a single read plus decode.
Filesystem failures pass through untouched; anything wrong with the bytes
themselves carries the same error kinds as the in-memory calls.

# Example

```rust,no_run
use fastmask::file;

let mask = file::read("mask.pfm").unwrap();
file::write("copy.pfm", mask.data(), mask.height(), mask.width()).unwrap();
println!("{:?}", file::info("copy.pfm").unwrap().shape());
```

*/

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use crate::{decode, encode, header, Header, Mask};

/// Encodes a mask and writes it to `path`.
pub fn write<P: AsRef<Path>>(path: P, data: &[u8], height: u32, width: u32) -> io::Result<()> {
    let encoded = encode(data, height, width)?;
    fs::write(path, encoded)
}

/// Reads the file at `path` and decodes it.
pub fn read<P: AsRef<Path>>(path: P) -> io::Result<Mask> {
    let encoded = fs::read(path)?;
    decode(&encoded)
}

/// Parses just the header of the file at `path`.
///
/// Only the header bytes are pulled off disk; the payload is not read.
pub fn info<P: AsRef<Path>>(path: P) -> io::Result<Header> {
    let mut buf = Vec::with_capacity(header::MAX_LEN);
    File::open(path)?
        .take(header::MAX_LEN as u64)
        .read_to_end(&mut buf)?;
    header::info(&buf)
}
