//! Error taxonomy for the engine (spec §7).
//!
//! These propagate as ordinary `Result`s; nothing in this crate panics or
//! aborts the process. A `FatalCorruption` returned from `Fs::mount` is the
//! caller's (the server binary's) cue to abort — the library itself stays
//! panic-free and testable.

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// The full internal error taxonomy. The wire protocol collapses most of
/// these to a single `-1`; see `vsfs-proto` for the exceptions lookup keeps.
#[derive(Debug)]
pub enum Error {
	/// `pinum`/`inum` outside `[0, num_inodes)`.
	BadInum,
	/// Inode bit not set.
	NoSuchInode,
	/// Expected a directory, found a regular file.
	NotDirectory,
	/// Expected a regular file, found a directory.
	NotRegular,
	/// Name absent from the directory.
	NotFound,
	/// Name exceeds `MAX_NAME_LEN - 1` bytes.
	NameTooLong,
	/// Name already present in the directory.
	AlreadyExists,
	/// Allocator could not satisfy the request.
	NoSpace,
	/// Invalid `offset`/`nbytes` combination.
	OutOfRange,
	/// Unlink attempted on a non-empty directory.
	NotEmpty,
	/// Backing-store failure during a read or write.
	Io(io::Error),
	/// Invariant violated at mount time (short read, mis-sized record).
	FatalCorruption(&'static str),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::BadInum => write!(f, "inode number out of range"),
			Error::NoSuchInode => write!(f, "no such inode"),
			Error::NotDirectory => write!(f, "not a directory"),
			Error::NotRegular => write!(f, "not a regular file"),
			Error::NotFound => write!(f, "name not found"),
			Error::NameTooLong => write!(f, "name too long"),
			Error::AlreadyExists => write!(f, "name already exists"),
			Error::NoSpace => write!(f, "no space left on device"),
			Error::OutOfRange => write!(f, "offset/nbytes out of range"),
			Error::NotEmpty => write!(f, "directory not empty"),
			Error::Io(e) => write!(f, "i/o error: {e}"),
			Error::FatalCorruption(msg) => write!(f, "fatal corruption: {msg}"),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Self {
		Error::Io(e)
	}
}
