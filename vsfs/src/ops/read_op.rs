//! `read(inum, out, offset, nbytes)` (spec §4.8).

use crate::directory::DirEntry;
use crate::error::Error;
use crate::error::Result;
use crate::fs::Fs;
use crate::layout::InodeType;
use crate::layout::BLOCK_SIZE;
use crate::layout::DIRECT_PTRS;

impl Fs {
	/// Reads `nbytes` starting at `offset` from inode `inum` into `out`.
	/// Performs no allocation, no dirty marking and no commit.
	pub fn read(&mut self, inum: i32, out: &mut [u8], offset: u32, nbytes: u32) -> Result<()> {
		let inum_u = self.check_inum_range(inum)?;
		let inode = *self.live_inode(inum_u)?;

		if nbytes == 0 || offset as u64 + nbytes as u64 > inode.size as u64 {
			return Err(Error::OutOfRange);
		}
		if inode.kind == InodeType::Directory && offset % DirEntry::SIZE as u32 != 0 {
			return Err(Error::OutOfRange);
		}
		if out.len() < nbytes as usize {
			return Err(Error::OutOfRange);
		}

		let start = (offset / BLOCK_SIZE as u32) as usize;
		let mut off = offset % BLOCK_SIZE as u32;
		let mut cur = 0u32;

		for i in start..DIRECT_PTRS {
			if cur >= nbytes {
				break;
			}

			let ptr = inode.direct[i];
			let n = (nbytes - cur).min(BLOCK_SIZE as u32 - off);
			let addr = ptr as u64 * BLOCK_SIZE as u64 + off as u64;
			self.device
				.read_at(addr, &mut out[cur as usize..(cur + n) as usize])?;

			cur += n;
			off = 0;
		}

		Ok(())
	}
}
