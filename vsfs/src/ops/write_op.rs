//! `write(inum, buf, offset, nbytes)` (spec §4.7).

use crate::error::Error;
use crate::error::Result;
use crate::fs::Fs;
use crate::layout::InodeType;
use crate::layout::BLOCK_SIZE;
use crate::layout::DIRECT_PTRS;
use crate::layout::UNUSED;

impl Fs {
	/// Writes `buf[..nbytes]` at `offset` into the regular file `inum`.
	///
	/// Writing past the current size grows the file; more than one block's
	/// worth per call is rejected. `size` is incremented by `nbytes`
	/// unconditionally, even when the write overlaps already-written bytes
	/// — a preserved quirk (spec §9 Open Question, resolved as "faithful
	/// reproduction"): callers are expected to append, not patch.
	pub fn write(&mut self, inum: i32, buf: &[u8], offset: u32, nbytes: u32) -> Result<()> {
		let inum_u = self.check_inum_range(inum)?;
		let inode = *self.live_inode(inum_u)?;
		if inode.kind != InodeType::Regular {
			return Err(Error::NotRegular);
		}
		if offset > inode.size
			|| nbytes == 0
			|| nbytes as usize > BLOCK_SIZE
			|| offset as u64 + nbytes as u64 > DIRECT_PTRS as u64 * BLOCK_SIZE as u64
		{
			return Err(Error::OutOfRange);
		}
		if buf.len() < nbytes as usize {
			return Err(Error::OutOfRange);
		}

		let start = (offset / BLOCK_SIZE as u32) as usize;
		let mut off = offset % BLOCK_SIZE as u32;
		let mut cur = 0u32;

		self.mark_inode_dirty(inum_u);
		for i in start..DIRECT_PTRS {
			if cur >= nbytes {
				break;
			}

			let mut ptr = self.inodes.get(inum_u).direct[i];
			if ptr == UNUSED {
				let data_idx = self
					.data_bitmap
					.first_zero(self.sb.num_data)
					.ok_or(Error::NoSpace)?;
				self.data_bitmap.set(data_idx);
				self.mark_data_dirty(data_idx);
				ptr = self.data_addr(data_idx);
				self.inodes.get_mut(inum_u).direct[i] = ptr;
			}

			let n = (nbytes - cur).min(BLOCK_SIZE as u32 - off);
			let addr = ptr as u64 * BLOCK_SIZE as u64 + off as u64;
			self.device
				.write_at(addr, &buf[cur as usize..(cur + n) as usize])?;

			cur += n;
			self.inodes.get_mut(inum_u).size += n;
			off = 0;
		}

		self.commit_dirty()?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use crate::fs::test_support::fresh;
	use crate::InodeType;

	#[test]
	fn size_never_decreases_across_writes() {
		let (mut fs, _path) = fresh(16, 16);
		fs.creat(0, InodeType::Regular, b"f").unwrap();
		let mut prev = 0u32;
		for n in [100u32, 50, 200, 10] {
			fs.write(1, &vec![b'x'; n as usize], 0, n).unwrap();
			let cur = fs.inodes.get(1).size;
			assert!(cur >= prev, "size shrank from {prev} to {cur}");
			prev = cur;
		}
	}
}
