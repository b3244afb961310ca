//! First-fit allocation over the inode and data bitmaps (spec §4.2, §4.6,
//! §4.7). Kept as a thin, independently testable layer over `Bitmap`;
//! `Fs` drives it together with dirty-bit tracking (see `fs.rs`).

use crate::bitmap::Bitmap;
use crate::error::Error;
use crate::error::Result;

/// Finds and marks allocated the first free bit below `bitmap.len()`.
/// Does not touch any dirty-tracking bitmap — the caller marks that.
pub fn alloc_first_fit(bitmap: &mut Bitmap) -> Result<u32> {
	let i = bitmap.first_zero(bitmap.len()).ok_or(Error::NoSpace)?;
	bitmap.set(i);
	Ok(i)
}

/// Finds the first free bit without marking it allocated — used by `creat`
/// to speculatively reserve up to two data slots before committing to
/// either (spec §4.6).
pub fn peek_first_fit(bitmap: &Bitmap, skip: &[u32]) -> Option<u32> {
	(0..bitmap.len()).find(|&i| !bitmap.get(i) && !skip.contains(&i))
}
