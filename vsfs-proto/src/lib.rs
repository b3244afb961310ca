//! Wire encoding for the vsfs datagram channel.
//!
//! A request datagram is ASCII decimal fields, space-separated, followed by
//! a single NUL separator byte and a raw payload (a name, including its own
//! NUL terminator, or a write buffer). A reply datagram is a leading ASCII
//! status integer and, for a successful read, a NUL byte then the payload.
//! Opcodes and framing are grounded on `server.c`/`mfs.c`; opcode 1 is never
//! assigned there and stays reserved here too.

use std::fmt;

use vsfs::Error;
use vsfs::InodeType;

pub const OP_LOOKUP: i32 = 0;
pub const OP_WRITE: i32 = 2;
pub const OP_READ: i32 = 3;
pub const OP_CREAT: i32 = 4;
pub const OP_UNLINK: i32 = 5;

/// Largest datagram this protocol moves in either direction. Writes and
/// reads are capped at one block, so a generous margin over `BLOCK_SIZE`
/// plus header fields comfortably covers every message.
pub const BUFFER_SIZE: usize = 8192;

#[derive(Debug, Clone)]
pub enum Request {
	Lookup { pinum: i32, name: Vec<u8> },
	Write { inum: i32, offset: u32, nbytes: u32, buf: Vec<u8> },
	Read { inum: i32, offset: u32, nbytes: u32 },
	Creat { pinum: i32, kind: InodeType, name: Vec<u8> },
	Unlink { pinum: i32, name: Vec<u8> },
}

#[derive(Debug)]
pub enum DecodeError {
	Empty,
	BadOpcode(i32),
	Truncated,
	MissingPayload,
}

impl fmt::Display for DecodeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DecodeError::Empty => write!(f, "empty datagram"),
			DecodeError::BadOpcode(op) => write!(f, "unrecognized opcode {op}"),
			DecodeError::Truncated => write!(f, "datagram truncated before expected fields"),
			DecodeError::MissingPayload => write!(f, "datagram missing NUL-delimited payload"),
		}
	}
}

impl std::error::Error for DecodeError {}

/// Splits `buf` at the first NUL byte into (ascii header, payload-after-NUL).
/// Absence of a NUL is only an error for opcodes that require a payload.
fn split_on_nul(buf: &[u8]) -> Option<(&[u8], &[u8])> {
	let pos = buf.iter().position(|&b| b == 0)?;
	Some((&buf[..pos], &buf[pos + 1..]))
}

fn parse_ints(header: &[u8], want: usize) -> Option<Vec<i32>> {
	let text = std::str::from_utf8(header).ok()?;
	let fields: Vec<i32> = text
		.split_ascii_whitespace()
		.map(|f| f.parse::<i32>())
		.collect::<Result<_, _>>()
		.ok()?;
	if fields.len() < want {
		return None;
	}
	Some(fields)
}

impl Request {
	pub fn encode(&self) -> Vec<u8> {
		let mut out = Vec::new();
		match self {
			Request::Lookup { pinum, name } => {
				out.extend_from_slice(format!("{OP_LOOKUP} {pinum}").as_bytes());
				out.push(0);
				out.extend_from_slice(name);
				if !name.ends_with(&[0]) {
					out.push(0);
				}
			}
			Request::Write { inum, offset, nbytes, buf } => {
				out.extend_from_slice(format!("{OP_WRITE} {inum} {offset} {nbytes}").as_bytes());
				out.push(0);
				out.extend_from_slice(buf);
			}
			Request::Read { inum, offset, nbytes } => {
				out.extend_from_slice(format!("{OP_READ} {inum} {offset} {nbytes}").as_bytes());
			}
			Request::Creat { pinum, kind, name } => {
				let kind_code = *kind as i32;
				out.extend_from_slice(format!("{OP_CREAT} {pinum} {kind_code}").as_bytes());
				out.push(0);
				out.extend_from_slice(name);
				if !name.ends_with(&[0]) {
					out.push(0);
				}
			}
			Request::Unlink { pinum, name } => {
				out.extend_from_slice(format!("{OP_UNLINK} {pinum}").as_bytes());
				out.push(0);
				out.extend_from_slice(name);
				if !name.ends_with(&[0]) {
					out.push(0);
				}
			}
		}
		out
	}

	pub fn decode(buf: &[u8]) -> Result<Request, DecodeError> {
		if buf.is_empty() {
			return Err(DecodeError::Empty);
		}
		let space = buf.iter().position(|&b| b == b' ' || b == 0).unwrap_or(buf.len());
		let opcode: i32 = std::str::from_utf8(&buf[..space])
			.ok()
			.and_then(|s| s.parse().ok())
			.ok_or(DecodeError::Truncated)?;

		match opcode {
			OP_LOOKUP => {
				let (header, payload) = split_on_nul(buf).ok_or(DecodeError::MissingPayload)?;
				let fields = parse_ints(header, 2).ok_or(DecodeError::Truncated)?;
				Ok(Request::Lookup { pinum: fields[1], name: strip_trailing_nul(payload) })
			}
			OP_WRITE => {
				let (header, payload) = split_on_nul(buf).ok_or(DecodeError::MissingPayload)?;
				let fields = parse_ints(header, 4).ok_or(DecodeError::Truncated)?;
				let nbytes = fields[3].max(0) as u32;
				let buf = payload.get(..nbytes as usize).unwrap_or(payload).to_vec();
				Ok(Request::Write { inum: fields[1], offset: fields[2] as u32, nbytes, buf })
			}
			OP_READ => {
				let fields = parse_ints(buf, 4).ok_or(DecodeError::Truncated)?;
				Ok(Request::Read { inum: fields[1], offset: fields[2] as u32, nbytes: fields[3] as u32 })
			}
			OP_CREAT => {
				let (header, payload) = split_on_nul(buf).ok_or(DecodeError::MissingPayload)?;
				let fields = parse_ints(header, 3).ok_or(DecodeError::Truncated)?;
				let kind = InodeType::from_raw(fields[2]).unwrap_or(InodeType::Regular);
				Ok(Request::Creat { pinum: fields[1], kind, name: strip_trailing_nul(payload) })
			}
			OP_UNLINK => {
				let (header, payload) = split_on_nul(buf).ok_or(DecodeError::MissingPayload)?;
				let fields = parse_ints(header, 2).ok_or(DecodeError::Truncated)?;
				Ok(Request::Unlink { pinum: fields[1], name: strip_trailing_nul(payload) })
			}
			other => Err(DecodeError::BadOpcode(other)),
		}
	}
}

fn strip_trailing_nul(name: &[u8]) -> Vec<u8> {
	match name.iter().position(|&b| b == 0) {
		Some(pos) => name[..pos].to_vec(),
		None => name.to_vec(),
	}
}

/// Maps an internal `Error` to the wire's integer status code. `lookup` is
/// the sole opcode that keeps the reference's distinct negative codes
/// (`ufs_lookup` in `ufs.c`: -2 bad inum, -3 no such inode, -4 not a
/// directory, -1 name not found); every other opcode collapses any error to
/// `-1`, matching `server.c`, which never branches on `ufs_*`'s return value
/// beyond sign.
pub fn lookup_status(result: &Result<u32, Error>) -> i32 {
	match result {
		Ok(inum) => *inum as i32,
		Err(Error::BadInum) => -2,
		Err(Error::NoSuchInode) => -3,
		Err(Error::NotDirectory) => -4,
		Err(_) => -1,
	}
}

pub fn status_of<T>(result: &Result<T, Error>) -> i32 {
	match result {
		Ok(_) => 0,
		Err(_) => -1,
	}
}

#[derive(Debug)]
pub enum Reply {
	Status(i32),
	Read { status: i32, payload: Vec<u8> },
}

impl Reply {
	pub fn encode(&self) -> Vec<u8> {
		match self {
			Reply::Status(code) => code.to_string().into_bytes(),
			Reply::Read { status, payload } => {
				let mut out = status.to_string().into_bytes();
				out.push(0);
				out.extend_from_slice(payload);
				out
			}
		}
	}

	pub fn decode_status(buf: &[u8]) -> Option<i32> {
		let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
		std::str::from_utf8(&buf[..end]).ok()?.trim().parse().ok()
	}

	pub fn decode_read_payload(buf: &[u8]) -> Option<&[u8]> {
		let pos = buf.iter().position(|&b| b == 0)?;
		Some(&buf[pos + 1..])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_round_trips() {
		let req = Request::Lookup { pinum: 0, name: b"dir".to_vec() };
		let encoded = req.encode();
		let decoded = Request::decode(&encoded).unwrap();
		match decoded {
			Request::Lookup { pinum, name } => {
				assert_eq!(pinum, 0);
				assert_eq!(name, b"dir");
			}
			_ => panic!("wrong variant"),
		}
	}

	#[test]
	fn write_round_trips_binary_payload() {
		let payload = vec![0xffu8, 0x00, 0x7f, 1, 2, 3];
		let req = Request::Write { inum: 3, offset: 10, nbytes: payload.len() as u32, buf: payload.clone() };
		let encoded = req.encode();
		let decoded = Request::decode(&encoded).unwrap();
		match decoded {
			Request::Write { inum, offset, nbytes, buf } => {
				assert_eq!(inum, 3);
				assert_eq!(offset, 10);
				assert_eq!(nbytes, payload.len() as u32);
				assert_eq!(buf, payload);
			}
			_ => panic!("wrong variant"),
		}
	}

	#[test]
	fn read_has_no_trailing_payload() {
		let req = Request::Read { inum: 1, offset: 0, nbytes: 4096 };
		let decoded = Request::decode(&req.encode()).unwrap();
		match decoded {
			Request::Read { inum, offset, nbytes } => {
				assert_eq!((inum, offset, nbytes), (1, 0, 4096));
			}
			_ => panic!("wrong variant"),
		}
	}

	#[test]
	fn creat_round_trips_kind() {
		let req = Request::Creat { pinum: 0, kind: InodeType::Directory, name: b"sub".to_vec() };
		let decoded = Request::decode(&req.encode()).unwrap();
		match decoded {
			Request::Creat { pinum, kind, name } => {
				assert_eq!(pinum, 0);
				assert!(matches!(kind, InodeType::Directory));
				assert_eq!(name, b"sub");
			}
			_ => panic!("wrong variant"),
		}
	}

	#[test]
	fn unknown_opcode_rejected() {
		let buf = b"9 0\x00name\x00".to_vec();
		assert!(matches!(Request::decode(&buf), Err(DecodeError::BadOpcode(9))));
	}

	#[test]
	fn reply_status_round_trips() {
		let reply = Reply::Status(-1);
		let encoded = reply.encode();
		assert_eq!(Reply::decode_status(&encoded), Some(-1));
	}

	#[test]
	fn reply_read_carries_payload_after_nul() {
		let reply = Reply::Read { status: 0, payload: vec![1, 2, 3, 4] };
		let encoded = reply.encode();
		assert_eq!(Reply::decode_status(&encoded), Some(0));
		assert_eq!(Reply::decode_read_payload(&encoded), Some(&[1u8, 2, 3, 4][..]));
	}

	#[test]
	fn lookup_status_preserves_distinguished_errors() {
		assert_eq!(lookup_status(&Ok(5)), 5);
		assert_eq!(lookup_status(&Err(Error::BadInum)), -2);
		assert_eq!(lookup_status(&Err(Error::NoSuchInode)), -3);
		assert_eq!(lookup_status(&Err(Error::NotDirectory)), -4);
		assert_eq!(lookup_status(&Err(Error::NotFound)), -1);
	}

	#[test]
	fn other_ops_collapse_errors_to_minus_one() {
		assert_eq!(status_of(&Ok(())), 0);
		assert_eq!(status_of::<()>(&Err(Error::NoSpace)), -1);
		assert_eq!(status_of::<()>(&Err(Error::NotEmpty)), -1);
	}
}
