//! `lookup(pinum, name)` (spec §4.5).

use crate::directory::DirEntry;
use crate::error::Error;
use crate::error::Result;
use crate::fs::Fs;
use crate::layout::InodeType;
use crate::layout::UNUSED;

impl Fs {
	/// Resolves `name` within directory `pinum`, scanning its direct blocks
	/// in order and stopping as soon as `size / entry-size` live entries
	/// have been visited.
	pub fn lookup(&mut self, pinum: i32, name: &[u8]) -> Result<u32> {
		let pinum_u = self.check_inum_range(pinum)?;
		let parent = *self.live_inode(pinum_u)?;
		if parent.kind != InodeType::Directory {
			return Err(Error::NotDirectory);
		}

		let mut remaining = parent.size / DirEntry::SIZE as u32;
		for &ptr in parent.direct.iter() {
			if remaining == 0 {
				break;
			}
			if ptr == UNUSED {
				continue;
			}

			let block = self.read_dir_block(ptr)?;
			for entry in block.entries.iter() {
				if remaining == 0 {
					break;
				}
				if entry.is_unused() {
					continue;
				}
				remaining -= 1;
				if entry.name_matches(name) {
					return Ok(entry.inum as u32);
				}
			}
		}

		Err(Error::NotFound)
	}
}

#[cfg(test)]
mod tests {
	use crate::fs::test_support::fresh;
	use crate::InodeType;

	#[test]
	fn repeated_lookups_of_the_same_name_agree() {
		let (mut fs, _path) = fresh(16, 16);
		fs.creat(0, InodeType::Regular, b"a").unwrap();
		let first = fs.lookup(0, b"a").unwrap();
		for _ in 0..5 {
			assert_eq!(fs.lookup(0, b"a").unwrap(), first);
		}
	}

	#[test]
	fn distinct_names_never_alias_to_the_same_inum() {
		let (mut fs, _path) = fresh(16, 16);
		fs.creat(0, InodeType::Regular, b"a").unwrap();
		fs.creat(0, InodeType::Regular, b"b").unwrap();
		let a = fs.lookup(0, b"a").unwrap();
		let b = fs.lookup(0, b"b").unwrap();
		assert_ne!(a, b);
	}
}
