//! On-disk layout constants and the superblock record.

use std::io::Read;
use std::mem::size_of;

use crate::error::Error;
use crate::error::Result;

/// Size in bytes of a single block, and the unit of all on-disk addressing.
pub const BLOCK_SIZE: usize = 4096;
/// Number of direct block pointers held by an inode.
pub const DIRECT_PTRS: usize = 30;
/// Sentinel value marking an unused direct pointer or directory entry slot.
pub const UNUSED: u32 = 0xFFFFFFFF;
/// Maximum length of a directory entry name, including the NUL terminator.
pub const MAX_NAME_LEN: usize = 28;

/// The block address (block 0) at which the superblock is persisted.
pub const SUPERBLOCK_BLOCK: u32 = 0;

/// Type of an inode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum InodeType {
	Directory = 0,
	Regular = 1,
}

impl InodeType {
	pub fn from_raw(raw: i32) -> Result<Self> {
		match raw {
			0 => Ok(InodeType::Directory),
			1 => Ok(InodeType::Regular),
			_ => Err(Error::FatalCorruption("invalid inode type on disk")),
		}
	}
}

/// The ten-field superblock, persisted at block 0.
///
/// All fields are in block units except `num_inodes`/`num_data`, which are
/// plain counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Superblock {
	pub inode_bitmap_addr: u32,
	pub inode_bitmap_len: u32,
	pub data_bitmap_addr: u32,
	pub data_bitmap_len: u32,
	pub inode_region_addr: u32,
	pub inode_region_len: u32,
	pub data_region_addr: u32,
	pub data_region_len: u32,
	pub num_inodes: u32,
	pub num_data: u32,
}

impl Superblock {
	/// Number of fields, used to size the raw on-disk record.
	const FIELD_COUNT: usize = 10;
	/// Size in bytes of the on-disk record.
	pub const SIZE: usize = Self::FIELD_COUNT * size_of::<u32>();

	/// Reads the superblock from the given reader, which must be positioned
	/// at block 0.
	pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
		let mut buf = [0u8; Self::SIZE];
		r.read_exact(&mut buf)
			.map_err(|_| Error::FatalCorruption("short read of superblock"))?;

		let mut fields = [0u32; Self::FIELD_COUNT];
		for (i, chunk) in buf.chunks_exact(size_of::<u32>()).enumerate() {
			fields[i] = u32::from_le_bytes(chunk.try_into().unwrap());
		}

		Ok(Superblock {
			inode_bitmap_addr: fields[0],
			inode_bitmap_len: fields[1],
			data_bitmap_addr: fields[2],
			data_bitmap_len: fields[3],
			inode_region_addr: fields[4],
			inode_region_len: fields[5],
			data_region_addr: fields[6],
			data_region_len: fields[7],
			num_inodes: fields[8],
			num_data: fields[9],
		})
	}

	/// Serializes the superblock to its on-disk byte representation.
	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let fields = [
			self.inode_bitmap_addr,
			self.inode_bitmap_len,
			self.data_bitmap_addr,
			self.data_bitmap_len,
			self.inode_region_addr,
			self.inode_region_len,
			self.data_region_addr,
			self.data_region_len,
			self.num_inodes,
			self.num_data,
		];

		let mut buf = [0u8; Self::SIZE];
		for (chunk, field) in buf.chunks_exact_mut(size_of::<u32>()).zip(fields) {
			chunk.copy_from_slice(&field.to_le_bytes());
		}
		buf
	}

	/// Number of 32-bit words needed to hold `n` bits.
	pub fn bitmap_words(n: u32) -> usize {
		(n as usize).div_ceil(32)
	}
}
