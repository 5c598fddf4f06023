//! A fastmask application for packing raw 8-bit masks into `.pfm` files
//! and back, and for inspecting file headers.
//! Example invocations:
//! fastmask pack 640x480 mask.raw mask.pfm
//! fastmask unpack mask.pfm mask.raw
//! fastmask info mask.pfm

use std::env;
use std::fs;
use std::io;
use std::process;

use fastmask::file;

fn usage(exe: &str) {
    println!("fastmask mask codec");
    println!("Usage:");
    println!("\t{} pack <WIDTHxHEIGHT> <raw-input> <output>", exe);
    println!("\t{} unpack <input> <raw-output>", exe);
    println!("\t{} info <file> ...", exe);
}

fn parse_dims(arg: &str) -> io::Result<(u32, u32)> {
    let bad = || {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "dimensions must look like WIDTHxHEIGHT, e.g. 640x480",
        )
    };
    let (w, h) = arg.split_once('x').ok_or_else(bad)?;
    let width: u32 = w.parse().map_err(|_| bad())?;
    let height: u32 = h.parse().map_err(|_| bad())?;
    Ok((height, width))
}

fn pack(dims: &str, input: &str, output: &str) -> io::Result<()> {
    let (height, width) = parse_dims(dims)?;
    let data = fs::read(input)?;
    let encoded = fastmask::encode(&data, height, width)?;
    println!("{}: {} samples -> {} bytes", output, data.len(), encoded.len());
    fs::write(output, encoded)
}

fn unpack(input: &str, output: &str) -> io::Result<()> {
    let mask = file::read(input)?;
    println!(
        "{}: {}x{} mask, {} bytes",
        output,
        mask.height(),
        mask.width(),
        mask.data().len()
    );
    fs::write(output, mask.data())
}

fn print_info(paths: &[String]) -> io::Result<()> {
    for path in paths {
        let header = file::info(path)?;
        println!("{}:", path);
        println!("\tshape: {}x{} (height x width)", header.height, header.width);
        println!("\tunique symbols: {}", header.symbol_count());
        println!(
            "\tbit widths: line={} symbol={} count={}",
            header.line_bits, header.symbol_bits, header.count_bits
        );
    }
    Ok(())
}

/// main entry point
pub fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let result = match args.get(1).map(|s| s.as_str()) {
        Some("pack") if args.len() == 5 => pack(&args[2], &args[3], &args[4]),
        Some("unpack") if args.len() == 4 => unpack(&args[2], &args[3]),
        Some("info") if args.len() >= 3 => print_info(&args[2..]),
        _ => {
            usage(&args[0]);
            return;
        }
    };
    if let Err(e) = result {
        eprintln!("{}: {}", args[0], e);
        process::exit(1);
    }
}
