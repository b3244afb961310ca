//! `unlink(pinum, name)` (spec §4.9).

use crate::directory::DirEntry;
use crate::error::Error;
use crate::error::Result;
use crate::fs::Fs;
use crate::layout::InodeType;
use crate::layout::UNUSED;

impl Fs {
	/// Removes `name` from directory `pinum`, freeing the child inode and
	/// its data blocks. Refuses `.`/`..` and non-empty directories.
	pub fn unlink(&mut self, pinum: i32, name: &[u8]) -> Result<()> {
		let pinum_u = self.check_inum_range(pinum)?;
		self.live_inode(pinum_u)?;
		if name == b"." || name == b".." {
			return Err(Error::OutOfRange);
		}

		let inum = self.lookup(pinum, name)?;
		let child = *self.inodes.get(inum);
		if child.kind == InodeType::Directory && child.size > 2 * DirEntry::SIZE as u32 {
			return Err(Error::NotEmpty);
		}

		// --- Free the child ---
		self.inode_bitmap.reset(inum);
		self.mark_inode_dirty(inum);
		for &ptr in child.direct.iter() {
			if ptr == UNUSED {
				continue;
			}
			let data_idx = self.data_idx(ptr);
			self.data_bitmap.reset(data_idx);
			self.mark_data_dirty(data_idx);
		}

		// --- Update parent ---
		self.mark_inode_dirty(pinum_u);
		self.inodes.get_mut(pinum_u).size -= DirEntry::SIZE as u32;

		let parent_direct = self.inodes.get(pinum_u).direct;
		for &ptr in parent_direct.iter() {
			if ptr == UNUSED {
				continue;
			}
			let mut block = self.read_dir_block(ptr)?;

			let mut live_count = 0u32;
			let mut matched_slot = None;
			for (slot, entry) in block.entries.iter().enumerate() {
				if entry.is_unused() {
					continue;
				}
				live_count += 1;
				if entry.name_matches(name) {
					matched_slot = Some(slot);
				}
			}

			let Some(slot) = matched_slot else {
				continue;
			};

			if live_count == 1 {
				let data_idx = self.data_idx(ptr);
				self.data_bitmap.reset(data_idx);
				self.mark_data_dirty(data_idx);

				let parent_inode = self.inodes.get_mut(pinum_u);
				let ptr_slot = parent_inode
					.direct
					.iter()
					.position(|&p| p == ptr)
					.expect("ptr came from this inode's direct array");
				parent_inode.direct[ptr_slot] = UNUSED;
			} else {
				block.entries[slot] = DirEntry::unused();
				self.write_dir_block(ptr, &block)?;
			}
			break;
		}

		self.commit_dirty()?;
		Ok(())
	}
}
