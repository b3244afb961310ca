//! Root-directory formatting, used by the image builder once the layout has
//! been written (spec §3 Invariant 2: "Inode 0 is the root directory,
//! always allocated, with entries `.` → 0 and `..` → 0").

use crate::directory::DirBlock;
use crate::error::Error;
use crate::error::Result;
use crate::fs::Fs;
use crate::inode::Inode;
use crate::layout::InodeType;
use crate::layout::DIRECT_PTRS;
use crate::layout::UNUSED;

/// Root inode number, fixed by convention.
pub const ROOT_INUM: u32 = 0;

impl Fs {
	/// Allocates inode 0 as the root directory and writes its `.`/`..`
	/// block. Called once, by `mkvsfs`, right after mounting a freshly
	/// zeroed image.
	pub fn format_root(&mut self) -> Result<()> {
		let data_idx = self
			.data_bitmap
			.first_zero(self.sb.num_data)
			.ok_or(Error::NoSpace)?;

		self.inode_bitmap.set(ROOT_INUM);
		self.mark_inode_dirty(ROOT_INUM);
		self.data_bitmap.set(data_idx);
		self.mark_data_dirty(data_idx);

		let addr = self.data_addr(data_idx);
		let root = Inode {
			kind: InodeType::Directory,
			size: 2 * crate::directory::DirEntry::SIZE as u32,
			direct: {
				let mut d = [UNUSED; DIRECT_PTRS];
				d[0] = addr;
				d
			},
		};
		self.inodes.set(ROOT_INUM, root);

		let block = DirBlock::new_directory(ROOT_INUM, ROOT_INUM);
		self.write_dir_block(addr, &block)?;

		self.commit_dirty()?;
		Ok(())
	}
}
