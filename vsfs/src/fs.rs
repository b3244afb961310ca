//! The mounted filesystem handle: owns the in-memory mirrors (bitmaps,
//! inode table) and the open backing image (spec §3 "Lifecycle", §9
//! "Global mutable state" — no module-level statics, everything hangs off
//! this owned struct passed explicitly into every operation).

use std::fs::OpenOptions;
use std::path::Path;

use log::debug;
use log::info;

use crate::bitmap::Bitmap;
use crate::block_io::BlockDevice;
use crate::directory::DirBlock;
use crate::error::Error;
use crate::error::Result;
use crate::inode::Inode;
use crate::inode::InodeTable;
use crate::layout::Superblock;
use crate::layout::BLOCK_SIZE;

/// An open VSFS image: the authoritative in-memory copies of the four
/// bitmaps and the inode table, plus the backing device they are mirrored
/// from (spec §3 "Lifecycle").
pub struct Fs {
	pub(crate) device: BlockDevice,
	pub(crate) sb: Superblock,
	pub(crate) inode_bitmap: Bitmap,
	pub(crate) data_bitmap: Bitmap,
	pub(crate) dirty_inode_bitmap: Bitmap,
	pub(crate) dirty_data_bitmap: Bitmap,
	pub(crate) inodes: InodeTable,
}

impl Fs {
	/// Mounts the image at `path`: reads the superblock, both bitmaps and
	/// the whole inode table into memory. Any short read is reported as
	/// `Error::FatalCorruption` (spec §4.3) rather than panicking — the
	/// caller decides whether to abort the process.
	pub fn mount<P: AsRef<Path>>(path: P) -> Result<Self> {
		let file = OpenOptions::new()
			.read(true)
			.write(true)
			.open(path.as_ref())?;
		let mut device = BlockDevice::new(file);

		let mut sb_buf = [0u8; Superblock::SIZE];
		device.read_at(0, &mut sb_buf)?;
		let sb = Superblock::read_from(&mut &sb_buf[..])?;
		debug!("mounted superblock: {sb:?}");

		let inode_bitmap = read_bitmap(
			&mut device,
			sb.inode_bitmap_addr,
			sb.num_inodes,
			"inode bitmap",
		)?;
		let data_bitmap = read_bitmap(
			&mut device,
			sb.data_bitmap_addr,
			sb.num_data,
			"data bitmap",
		)?;

		let inodes = read_inode_table(&mut device, &sb)?;

		let dirty_inode_bitmap = Bitmap::new(sb.num_inodes);
		let dirty_data_bitmap = Bitmap::new(sb.num_data);

		info!(
			"mount complete: {} inodes, {} data blocks",
			sb.num_inodes, sb.num_data
		);

		Ok(Fs {
			device,
			sb,
			inode_bitmap,
			data_bitmap,
			dirty_inode_bitmap,
			dirty_data_bitmap,
			inodes,
		})
	}

	/// Validates an inode number is addressable; spec's `BadInum` check,
	/// shared by every operation.
	pub(crate) fn check_inum_range(&self, inum: i32) -> Result<u32> {
		if inum < 0 || inum as u32 >= self.sb.num_inodes {
			return Err(Error::BadInum);
		}
		Ok(inum as u32)
	}

	/// Validates an inode number is allocated, returning its record.
	pub(crate) fn live_inode(&self, inum: u32) -> Result<&Inode> {
		if !self.inode_bitmap.get(inum) {
			return Err(Error::NoSuchInode);
		}
		Ok(self.inodes.get(inum))
	}

	pub(crate) fn mark_inode_dirty(&mut self, inum: u32) {
		self.dirty_inode_bitmap.set(inum);
	}

	/// Marks data-bitmap-relative index `i` dirty (not an absolute block
	/// address — see `Superblock::data_region_addr`).
	pub(crate) fn mark_data_dirty(&mut self, data_idx: u32) {
		self.dirty_data_bitmap.set(data_idx);
	}

	/// Absolute block address for data-bitmap index `i`.
	pub(crate) fn data_addr(&self, data_idx: u32) -> u32 {
		data_idx + self.sb.data_region_addr
	}

	/// Data-bitmap index for an absolute direct pointer.
	pub(crate) fn data_idx(&self, addr: u32) -> u32 {
		addr - self.sb.data_region_addr
	}

	pub(crate) fn read_dir_block(&mut self, addr: u32) -> Result<DirBlock> {
		let mut buf = [0u8; BLOCK_SIZE];
		self.device.read_block(addr, &mut buf)?;
		Ok(DirBlock::from_bytes(&buf))
	}

	pub(crate) fn write_dir_block(&mut self, addr: u32, block: &DirBlock) -> Result<()> {
		self.device.write_block(addr, &block.to_bytes())
	}
}

fn read_bitmap(device: &mut BlockDevice, addr: u32, count: u32, what: &str) -> Result<Bitmap> {
	let word_count = Superblock::bitmap_words(count);
	let mut bytes = vec![0u8; word_count * 4];
	device
		.read_at(addr as u64 * BLOCK_SIZE as u64, &mut bytes)
		.map_err(|_| Error::FatalCorruption("short read of bitmap"))?;

	let mut words = Vec::with_capacity(word_count);
	for chunk in bytes.chunks_exact(4) {
		words.push(u32::from_le_bytes(chunk.try_into().unwrap()));
	}
	debug!("read {what}: {word_count} words from block {addr}");
	Ok(Bitmap::from_words(words, count))
}

fn read_inode_table(device: &mut BlockDevice, sb: &Superblock) -> Result<InodeTable> {
	let mut inodes = Vec::with_capacity(sb.num_inodes as usize);
	let mut buf = [0u8; Inode::SIZE];
	let base = sb.inode_region_addr as u64 * BLOCK_SIZE as u64;
	for i in 0..sb.num_inodes {
		device
			.read_at(base + i as u64 * Inode::SIZE as u64, &mut buf)
			.map_err(|_| Error::FatalCorruption("short read of inode table"))?;
		inodes.push(Inode::from_bytes(&buf)?);
	}
	Ok(InodeTable::new(inodes))
}

/// Shared helper for building a formatted, mounted image in unit tests
/// across `ops::*` and `fs::*`, without routing every test through the
/// `mkvsfs` binary.
#[cfg(test)]
pub(crate) mod test_support {
	use std::fs::OpenOptions;
	use std::io::Write;

	use crate::inode::Inode;
	use crate::layout::Superblock;
	use crate::layout::BLOCK_SIZE;
	use crate::Fs;

	fn blocks_for_bytes(n: usize) -> u32 {
		n.div_ceil(BLOCK_SIZE) as u32
	}

	pub(crate) fn fresh(num_inodes: u32, num_data: u32) -> (Fs, tempfile::TempPath) {
		let tmp = tempfile::NamedTempFile::new().unwrap();
		let path = tmp.into_temp_path();

		let inode_bitmap_len = blocks_for_bytes(Superblock::bitmap_words(num_inodes) * 4);
		let data_bitmap_len = blocks_for_bytes(Superblock::bitmap_words(num_data) * 4);
		let inode_region_len = blocks_for_bytes(num_inodes as usize * Inode::SIZE);

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
			data_region_len: num_data,
			num_inodes,
			num_data,
		};

		let total_blocks = data_region_addr + num_data;
		let mut file = OpenOptions::new().create(true).write(true).truncate(true).open(&path).unwrap();
		file.set_len(total_blocks as u64 * BLOCK_SIZE as u64).unwrap();
		file.write_all(&sb.to_bytes()).unwrap();
		drop(file);

		let mut fs = Fs::mount(&path).unwrap();
		fs.format_root().unwrap();
		(fs, path)
	}
}

#[cfg(test)]
mod tests {
	use super::test_support::fresh;

	#[test]
	fn mount_is_idempotent_on_an_untouched_image() {
		let (_fs, path) = fresh(16, 16);
		let a = super::Fs::mount(&path).unwrap();
		let b = super::Fs::mount(&path).unwrap();
		assert_eq!(a.sb.num_inodes, b.sb.num_inodes);
		assert_eq!(a.inode_bitmap.words(), b.inode_bitmap.words());
		assert_eq!(a.data_bitmap.words(), b.data_bitmap.words());
	}

	#[test]
	fn remounting_after_commit_observes_the_same_state() {
		let (mut fs, path) = fresh(16, 16);
		fs.creat(0, crate::InodeType::Directory, b"sub").unwrap();

		let remounted = super::Fs::mount(&path).unwrap();
		assert!(remounted.inode_bitmap.get(1));
		assert_eq!(remounted.inodes.get(1).kind, crate::InodeType::Directory);
	}
}
