//! Positioned read/write of the backing image (spec §4.1).
//!
//! Grounded on `utils/src/disk.rs`'s direct `File`-based I/O: a plain
//! `std::fs::File`, seeked then read/written, with short transfers treated
//! as errors rather than retried.

use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::os::fd::AsRawFd;

use crate::error::Error;
use crate::error::Result;
use crate::layout::BLOCK_SIZE;

/// Thin wrapper around the backing image file.
pub struct BlockDevice {
	file: File,
}

impl BlockDevice {
	pub fn new(file: File) -> Self {
		BlockDevice { file }
	}

	/// Reads exactly `out.len()` bytes starting at byte offset `byte_addr`.
	pub fn read_at(&mut self, byte_addr: u64, out: &mut [u8]) -> Result<()> {
		self.file.seek(SeekFrom::Start(byte_addr))?;
		self.file
			.read_exact(out)
			.map_err(|_| Error::Io(std::io::Error::from(std::io::ErrorKind::UnexpectedEof)))
	}

	/// Writes all of `data` starting at byte offset `byte_addr`.
	pub fn write_at(&mut self, byte_addr: u64, data: &[u8]) -> Result<()> {
		self.file.seek(SeekFrom::Start(byte_addr))?;
		self.file.write_all(data).map_err(Error::Io)
	}

	/// Reads one block (`BLOCK_SIZE` bytes) at the given absolute block
	/// index.
	pub fn read_block(&mut self, block: u32, out: &mut [u8; BLOCK_SIZE]) -> Result<()> {
		self.read_at(block as u64 * BLOCK_SIZE as u64, out)
	}

	/// Writes one block (`BLOCK_SIZE` bytes) at the given absolute block
	/// index.
	pub fn write_block(&mut self, block: u32, data: &[u8; BLOCK_SIZE]) -> Result<()> {
		self.write_at(block as u64 * BLOCK_SIZE as u64, data)
	}

	/// Issues a durability barrier on the backing store (spec §4.4).
	pub fn fsync(&self) -> Result<()> {
		let ret = unsafe { libc::fsync(self.file.as_raw_fd()) };
		if ret != 0 {
			return Err(Error::Io(std::io::Error::last_os_error()));
		}
		Ok(())
	}
}
