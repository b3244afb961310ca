//! `mkvsfs` builds a well-formed vsfs disk image: computes the bitmap,
//! inode-table and data-region sizes for a requested inode/data-block
//! count, zeroes the image, writes the superblock and zeroed metadata
//! regions, then formats inode 0 as the root directory.

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::exit;

use vsfs::inode::Inode;
use vsfs::layout::Superblock;
use vsfs::layout::BLOCK_SIZE;
use vsfs::Fs;

const DEFAULT_NUM_INODES: u32 = 32;
const DEFAULT_NUM_DATA: u32 = 32;

/// Structure storing command line arguments.
#[derive(Default)]
struct Args {
	/// The name of the current program used in command line.
	prog: String,

	/// If true, print command line help.
	help: bool,

	/// The number of inodes to provision.
	num_inodes: Option<u32>,
	/// The number of data blocks to provision.
	num_data: Option<u32>,

	/// The path of the image to create.
	image_path: Option<PathBuf>,
}

fn parse_args() -> Args {
	let mut args: Args = Default::default();
	let mut iter = env::args();
	args.prog = iter.next().unwrap_or("mkvsfs".to_owned());

	while let Some(arg) = iter.next() {
		match arg.as_str() {
			"-h" | "--help" => args.help = true,

			"--inodes" => {
				let n = iter.next().unwrap_or_else(|| {
					eprintln!("{}: --inodes requires a value", args.prog);
					exit(1);
				});
				args.num_inodes = Some(n.parse().unwrap_or_else(|_| {
					eprintln!("{}: invalid inode count `{n}`", args.prog);
					exit(1);
				}));
			}

			"--data" => {
				let n = iter.next().unwrap_or_else(|| {
					eprintln!("{}: --data requires a value", args.prog);
					exit(1);
				});
				args.num_data = Some(n.parse().unwrap_or_else(|_| {
					eprintln!("{}: invalid data block count `{n}`", args.prog);
					exit(1);
				}));
			}

			_ => args.image_path = Some(PathBuf::from(arg)),
		}
	}

	args
}

fn print_help(prog: &str) {
	println!("usage: {prog} [--inodes N] [--data N] <image-path>");
}

/// Lays out and zeroes a fresh image: superblock, zeroed bitmaps, a zeroed
/// inode table, and the data region, following each region's declared
/// extent back to back.
fn write_layout(path: &std::path::Path, num_inodes: u32, num_data: u32) -> io::Result<Superblock> {
	let inode_bitmap_len = blocks_for_bytes(Superblock::bitmap_words(num_inodes) * 4);
	let data_bitmap_len = blocks_for_bytes(Superblock::bitmap_words(num_data) * 4);
	let inode_region_len = blocks_for_bytes(num_inodes as usize * Inode::SIZE);
	let data_region_len = num_data;

	let inode_bitmap_addr = 1;
	let data_bitmap_addr = inode_bitmap_addr + inode_bitmap_len;
	let inode_region_addr = data_bitmap_addr + data_bitmap_len;
	let data_region_addr = inode_region_addr + inode_region_len;

	let sb = Superblock {
		inode_bitmap_addr,
		inode_bitmap_len,
		data_bitmap_addr,
		data_bitmap_len,
		inode_region_addr,
		inode_region_len,
		data_region_addr,
		data_region_len,
		num_inodes,
		num_data,
	};

	let total_blocks = data_region_addr + data_region_len;
	let mut file = OpenOptions::new()
		.create(true)
		.write(true)
		.truncate(true)
		.open(path)?;

	file.set_len(total_blocks as u64 * BLOCK_SIZE as u64)?;
	file.write_all(&sb.to_bytes())?;
	file.flush()?;

	Ok(sb)
}

fn blocks_for_bytes(n: usize) -> u32 {
	n.div_ceil(BLOCK_SIZE) as u32
}

fn main() {
	env_logger::init();
	let args = parse_args();

	if args.help {
		print_help(&args.prog);
		return;
	}

	let image_path = args.image_path.unwrap_or_else(|| {
		eprintln!("{}: specify path to the image to create", args.prog);
		exit(1);
	});
	let num_inodes = args.num_inodes.unwrap_or(DEFAULT_NUM_INODES);
	let num_data = args.num_data.unwrap_or(DEFAULT_NUM_DATA);

	write_layout(&image_path, num_inodes, num_data).unwrap_or_else(|e| {
		eprintln!("{}: {}: {}", args.prog, image_path.display(), e);
		exit(1);
	});

	let mut fs = Fs::mount(&image_path).unwrap_or_else(|e| {
		eprintln!("{}: {}: {}", args.prog, image_path.display(), e);
		exit(1);
	});
	fs.format_root().unwrap_or_else(|e| {
		eprintln!("{}: failed to format root directory: {}", args.prog, e);
		exit(1);
	});

	log::info!(
		"created {} ({} inodes, {} data blocks)",
		image_path.display(),
		num_inodes,
		num_data
	);
}
