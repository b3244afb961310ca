//! Flush dirty inodes and dirty bitmap words, then fsync (spec §4.4).
//!
//! Grounded on `commit_dirty_to_disk` in the reference: walk the inode
//! dirty bitmap writing back the bitmap word plus the single inode record
//! for each dirty bit, then walk the data dirty bitmap writing back its
//! bitmap words, then fsync. A write failure leaves the dirty bit set so a
//! later commit retries it.

use log::debug;

use crate::error::Result;
use crate::fs::Fs;
use crate::inode::Inode;
use crate::layout::BLOCK_SIZE;

impl Fs {
	/// Writes back every dirty inode bitmap word and inode record, then
	/// every dirty data bitmap word, then issues an fsync. Clears each
	/// dirty bit only after its write succeeds, so a failed commit can be
	/// retried by a subsequent operation (spec §5, "Suspension points").
	pub fn commit_dirty(&mut self) -> Result<()> {
		let num_inodes = self.sb.num_inodes;
		for i in 0..num_inodes {
			if !self.dirty_inode_bitmap.get(i) {
				continue;
			}
			self.write_inode_bitmap_word(i)?;
			self.write_inode_record(i)?;
			self.dirty_inode_bitmap.reset(i);
		}

		let num_data = self.sb.num_data;
		for i in 0..num_data {
			if !self.dirty_data_bitmap.get(i) {
				continue;
			}
			self.write_data_bitmap_word(i)?;
			self.dirty_data_bitmap.reset(i);
		}

		self.device.fsync()?;
		debug!("commit_dirty: flushed and fsynced");
		Ok(())
	}

	fn write_inode_bitmap_word(&mut self, bit: u32) -> Result<()> {
		let word_idx = (bit / 32) as usize;
		let word = self.inode_bitmap.words()[word_idx];
		let addr = self.sb.inode_bitmap_addr as u64 * BLOCK_SIZE as u64 + (word_idx * 4) as u64;
		self.device.write_at(addr, &word.to_le_bytes())
	}

	fn write_data_bitmap_word(&mut self, bit: u32) -> Result<()> {
		let word_idx = (bit / 32) as usize;
		let word = self.data_bitmap.words()[word_idx];
		let addr = self.sb.data_bitmap_addr as u64 * BLOCK_SIZE as u64 + (word_idx * 4) as u64;
		self.device.write_at(addr, &word.to_le_bytes())
	}

	fn write_inode_record(&mut self, inum: u32) -> Result<()> {
		let inode = *self.inodes.get(inum);
		let addr =
			self.sb.inode_region_addr as u64 * BLOCK_SIZE as u64 + inum as u64 * Inode::SIZE as u64;
		self.device.write_at(addr, &inode.to_bytes())
	}
}
