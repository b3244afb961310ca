//! `creat(pinum, type, name)` (spec §4.6).

use crate::allocator;
use crate::directory::DirBlock;
use crate::directory::DirEntry;
use crate::error::Error;
use crate::error::Result;
use crate::fs::Fs;
use crate::inode::Inode;
use crate::layout::InodeType;
use crate::layout::BLOCK_SIZE;
use crate::layout::DIRECT_PTRS;
use crate::layout::MAX_NAME_LEN;
use crate::layout::UNUSED;

impl Fs {
	/// Creates `name` of the given `kind` inside directory `pinum`.
	///
	/// Known-latent design weakness, preserved on purpose (spec §4.6): the
	/// new inode's bitmap bit is set, and for a directory its own data
	/// block is written to disk, before we've confirmed the parent-linkage
	/// allocation (the reserved second data slot) will actually succeed. If
	/// that later allocation fails, the bit stays set in memory with
	/// nothing committed to back it — the allocator is best-effort; callers
	/// are expected not to push the image to its capacity.
	pub fn creat(&mut self, pinum: i32, kind: InodeType, name: &[u8]) -> Result<()> {
		let pinum_u = self.check_inum_range(pinum)?;
		let parent = *self.live_inode(pinum_u)?;
		if parent.kind != InodeType::Directory {
			return Err(Error::NotDirectory);
		}
		if name.len() > MAX_NAME_LEN - 1 {
			return Err(Error::NameTooLong);
		}
		match self.lookup(pinum, name) {
			Ok(_) => return Err(Error::AlreadyExists),
			Err(Error::NotFound) => {}
			Err(e) => return Err(e),
		}

		let inum = self
			.inode_bitmap
			.first_zero(self.sb.num_inodes)
			.ok_or(Error::NoSpace)?;

		let d1 = allocator::peek_first_fit(&self.data_bitmap, &[]);
		if kind == InodeType::Directory && d1.is_none() {
			return Err(Error::NoSpace);
		}
		let d2 = d1.and_then(|d1| allocator::peek_first_fit(&self.data_bitmap, &[d1]));

		// --- Parent-has-room check ---
		if parent.size == DIRECT_PTRS as u32 * BLOCK_SIZE as u32 {
			return Err(Error::NoSpace);
		}
		let mut room = None;
		'scan: for &ptr in parent.direct.iter() {
			if ptr == UNUSED {
				continue;
			}
			let block = self.read_dir_block(ptr)?;
			for (slot, entry) in block.entries.iter().enumerate() {
				if entry.is_unused() {
					room = Some((ptr, slot));
					break 'scan;
				}
			}
		}
		let parent_has_room = room.is_some();
		if !parent_has_room && !parent.direct.contains(&UNUSED) {
			return Err(Error::NoSpace);
		}

		// --- Creating the new inode ---
		self.inode_bitmap.set(inum);
		self.mark_inode_dirty(inum);
		let mut child = Inode {
			kind,
			size: 0,
			direct: [UNUSED; DIRECT_PTRS],
		};

		let parent_candidate = if kind == InodeType::Directory {
			let d1 = d1.expect("checked above");
			self.data_bitmap.set(d1);
			self.mark_data_dirty(d1);
			let addr = self.data_addr(d1);
			child.size = 2 * DirEntry::SIZE as u32;
			child.direct[0] = addr;
			let block = DirBlock::new_directory(inum, pinum_u);
			self.write_dir_block(addr, &block)?;
			d2
		} else {
			d1
		};
		self.inodes.set(inum, child);

		// --- Linking into parent ---
		self.mark_inode_dirty(pinum_u);
		if let Some((block_addr, slot)) = room {
			let mut block = self.read_dir_block(block_addr)?;
			block.entries[slot] = DirEntry::new(name, inum);
			self.write_dir_block(block_addr, &block)?;
		} else {
			let data_idx = parent_candidate.ok_or(Error::NoSpace)?;
			let addr = self.data_addr(data_idx);
			let mut block = DirBlock::empty();
			block.entries[0] = DirEntry::new(name, inum);
			self.write_dir_block(addr, &block)?;
			self.data_bitmap.set(data_idx);
			self.mark_data_dirty(data_idx);

			let parent_mut = self.inodes.get_mut(pinum_u);
			let slot = parent_mut
				.direct
				.iter()
				.position(|&p| p == UNUSED)
				.ok_or(Error::NoSpace)?;
			parent_mut.direct[slot] = addr;
		}

		self.inodes.get_mut(pinum_u).size += DirEntry::SIZE as u32;

		self.commit_dirty()?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use crate::error::Error;
	use crate::fs::test_support::fresh;
	use crate::InodeType;

	#[test]
	fn creating_an_existing_name_is_rejected() {
		let (mut fs, _path) = fresh(16, 16);
		fs.creat(0, InodeType::Regular, b"dup").unwrap();
		assert!(matches!(
			fs.creat(0, InodeType::Regular, b"dup"),
			Err(Error::AlreadyExists)
		));
	}

	#[test]
	fn new_directory_is_self_consistent() {
		let (mut fs, _path) = fresh(16, 16);
		fs.creat(0, InodeType::Directory, b"sub").unwrap();
		let inum = fs.lookup(0, b"sub").unwrap() as i32;
		assert_eq!(fs.lookup(inum, b".").unwrap() as i32, inum);
		assert_eq!(fs.lookup(inum, b"..").unwrap(), 0);
	}
}
