//! The in-memory inode table, mirroring the on-disk inode array, with
//! dirty-bit tracking (spec §4.3, Component table row "Inode Table").

use std::mem::size_of;

use crate::error::Error;
use crate::error::Result;
use crate::layout::InodeType;
use crate::layout::DIRECT_PTRS;
use crate::layout::UNUSED;

/// Fixed on-disk inode record: `{i32 type; i32 size; u32 direct[30]}`.
#[derive(Debug, Clone, Copy)]
pub struct Inode {
	pub kind: InodeType,
	pub size: u32,
	pub direct: [u32; DIRECT_PTRS],
}

impl Inode {
	/// On-disk size in bytes (128 in the reference layout).
	pub const SIZE: usize = 2 * size_of::<i32>() + DIRECT_PTRS * size_of::<u32>();

	fn empty(kind: InodeType) -> Self {
		Inode {
			kind,
			size: 0,
			direct: [UNUSED; DIRECT_PTRS],
		}
	}

	pub(crate) fn from_bytes(buf: &[u8; Self::SIZE]) -> Result<Self> {
		let raw_type = i32::from_le_bytes(buf[0..4].try_into().unwrap());
		let size = i32::from_le_bytes(buf[4..8].try_into().unwrap());
		if size < 0 {
			return Err(Error::FatalCorruption("negative inode size on disk"));
		}

		let mut direct = [0u32; DIRECT_PTRS];
		for (i, chunk) in buf[8..].chunks_exact(4).enumerate() {
			direct[i] = u32::from_le_bytes(chunk.try_into().unwrap());
		}

		Ok(Inode {
			kind: InodeType::from_raw(raw_type)?,
			size: size as u32,
			direct,
		})
	}

	pub(crate) fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut buf = [0u8; Self::SIZE];
		buf[0..4].copy_from_slice(&(self.kind as i32).to_le_bytes());
		buf[4..8].copy_from_slice(&(self.size as i32).to_le_bytes());
		for (chunk, ptr) in buf[8..].chunks_exact_mut(4).zip(self.direct) {
			chunk.copy_from_slice(&ptr.to_le_bytes());
		}
		buf
	}
}

/// In-memory mirror of the on-disk inode array.
pub struct InodeTable {
	inodes: Vec<Inode>,
}

impl InodeTable {
	pub fn new(inodes: Vec<Inode>) -> Self {
		InodeTable { inodes }
	}

	/// Allocates a table of `n` zeroed (regular, size 0) inodes — used by
	/// the image builder, which never leaves a slot half-initialized.
	pub fn zeroed(n: u32) -> Self {
		InodeTable {
			inodes: vec![Inode::empty(InodeType::Regular); n as usize],
		}
	}

	pub fn len(&self) -> u32 {
		self.inodes.len() as u32
	}

	pub fn get(&self, i: u32) -> &Inode {
		&self.inodes[i as usize]
	}

	pub fn get_mut(&mut self, i: u32) -> &mut Inode {
		&mut self.inodes[i as usize]
	}

	pub fn set(&mut self, i: u32, inode: Inode) {
		self.inodes[i as usize] = inode;
	}
}
