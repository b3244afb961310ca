//! Directory entries and directory blocks (spec §3, "Directory entry" /
//! "Directory block").

use crate::layout::BLOCK_SIZE;
use crate::layout::MAX_NAME_LEN;

/// Number of directory entries packed into one block.
pub const ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / DirEntry::SIZE;

/// Inode number meaning "this slot is unused".
pub const UNUSED_ENTRY: i32 = -1;

/// A single directory entry: a NUL-terminated name and an inode number.
/// `inum == -1` marks the slot empty.
#[derive(Debug, Clone, Copy)]
pub struct DirEntry {
	name: [u8; MAX_NAME_LEN],
	pub inum: i32,
}

impl DirEntry {
	pub const SIZE: usize = MAX_NAME_LEN + 4;

	/// The empty sentinel entry.
	pub fn unused() -> Self {
		DirEntry {
			name: [0u8; MAX_NAME_LEN],
			inum: UNUSED_ENTRY,
		}
	}

	/// Builds a live entry. `name` must be at most `MAX_NAME_LEN - 1` bytes;
	/// callers validate this before calling (see `Error::NameTooLong`).
	pub fn new(name: &[u8], inum: u32) -> Self {
		debug_assert!(name.len() < MAX_NAME_LEN);
		let mut buf = [0u8; MAX_NAME_LEN];
		buf[..name.len()].copy_from_slice(name);
		DirEntry {
			name: buf,
			inum: inum as i32,
		}
	}

	pub fn is_unused(&self) -> bool {
		self.inum == UNUSED_ENTRY
	}

	/// The name bytes up to (excluding) the NUL terminator.
	pub fn name(&self) -> &[u8] {
		let len = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
		&self.name[..len]
	}

	/// Compares the full NUL-terminated name, byte for byte, as spec §4.5
	/// requires ("byte-for-byte, including NUL terminator").
	pub fn name_matches(&self, name: &[u8]) -> bool {
		if name.len() >= MAX_NAME_LEN {
			return false;
		}
		self.name() == name
	}

	pub(crate) fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
		let mut name = [0u8; MAX_NAME_LEN];
		name.copy_from_slice(&buf[..MAX_NAME_LEN]);
		let inum = i32::from_le_bytes(buf[MAX_NAME_LEN..].try_into().unwrap());
		DirEntry { name, inum }
	}

	pub(crate) fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut buf = [0u8; Self::SIZE];
		buf[..MAX_NAME_LEN].copy_from_slice(&self.name);
		buf[MAX_NAME_LEN..].copy_from_slice(&self.inum.to_le_bytes());
		buf
	}
}

/// A full directory block: exactly `ENTRIES_PER_BLOCK` entries, packed
/// contiguously into `BLOCK_SIZE` bytes.
pub struct DirBlock {
	pub entries: [DirEntry; ENTRIES_PER_BLOCK],
}

const _: () = assert!(ENTRIES_PER_BLOCK * DirEntry::SIZE == BLOCK_SIZE);

impl DirBlock {
	/// A block with every entry unused.
	pub fn empty() -> Self {
		DirBlock {
			entries: [DirEntry::unused(); ENTRIES_PER_BLOCK],
		}
	}

	/// A freshly allocated directory block for a new directory: entry 0 is
	/// `(".", self_inum)`, entry 1 is `("..", parent_inum)`, the rest unused.
	pub fn new_directory(self_inum: u32, parent_inum: u32) -> Self {
		let mut block = Self::empty();
		block.entries[0] = DirEntry::new(b".", self_inum);
		block.entries[1] = DirEntry::new(b"..", parent_inum);
		block
	}

	pub fn from_bytes(buf: &[u8; BLOCK_SIZE]) -> Self {
		let mut entries = [DirEntry::unused(); ENTRIES_PER_BLOCK];
		for (entry, chunk) in entries.iter_mut().zip(buf.chunks_exact(DirEntry::SIZE)) {
			*entry = DirEntry::from_bytes(chunk.try_into().unwrap());
		}
		DirBlock { entries }
	}

	pub fn to_bytes(&self) -> [u8; BLOCK_SIZE] {
		let mut buf = [0u8; BLOCK_SIZE];
		for (chunk, entry) in buf.chunks_exact_mut(DirEntry::SIZE).zip(&self.entries) {
			chunk.copy_from_slice(&entry.to_bytes());
		}
		buf
	}
}
