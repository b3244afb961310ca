//! `mfs` — the client side of the vsfs datagram protocol. A Rust rendition
//! of `mfs.c`'s `MFS_*` calls: each call encodes a `Request`, hands it to
//! `proc_call`, and decodes the status (and, for reads, the payload) out of
//! the reply. `proc_call`'s resend-on-timeout loop replaces `mfs.c`'s
//! `select()`-based wait with `UdpSocket::set_read_timeout`.

use std::net::ToSocketAddrs;
use std::net::UdpSocket;
use std::time::Duration;

use vsfs::InodeType;
use vsfs_proto::Reply;
use vsfs_proto::Request;
use vsfs_proto::BUFFER_SIZE;

/// Matches `mfs.c`'s `TIMEOUT` — how long `proc_call` waits for a reply
/// before resending the request.
const TIMEOUT: Duration = Duration::from_secs(5);

pub struct Mfs {
	socket: UdpSocket,
}

impl Mfs {
	/// Binds an ephemeral local socket and connects it to `hostname:port`,
	/// mirroring `MFS_Init`'s `UDP_Open` + `UDP_FillSockAddr`.
	pub fn init<A: ToSocketAddrs>(addr: A) -> std::io::Result<Mfs> {
		let socket = UdpSocket::bind("0.0.0.0:0")?;
		socket.connect(addr)?;
		socket.set_read_timeout(Some(TIMEOUT))?;
		Ok(Mfs { socket })
	}

	/// Sends `msg` and waits up to `TIMEOUT` for a reply, resending on
	/// every timeout — the `WouldBlock`/`TimedOut` retry loop is the
	/// idiomatic equivalent of the reference's `select()` spin.
	fn proc_call(&self, msg: &[u8]) -> std::io::Result<Vec<u8>> {
		loop {
			log::debug!("client::sending request ({} bytes)", msg.len());
			self.socket.send(msg)?;

			log::debug!("client::waiting for reply");
			let mut buf = [0u8; BUFFER_SIZE];
			match self.socket.recv(&mut buf) {
				Ok(len) => return Ok(buf[..len].to_vec()),
				Err(e)
					if e.kind() == std::io::ErrorKind::WouldBlock
						|| e.kind() == std::io::ErrorKind::TimedOut =>
				{
					continue;
				}
				Err(e) => return Err(e),
			}
		}
	}

	pub fn lookup(&self, pinum: i32, name: &str) -> std::io::Result<i32> {
		let msg = Request::Lookup { pinum, name: name.as_bytes().to_vec() }.encode();
		let reply = self.proc_call(&msg)?;
		Ok(Reply::decode_status(&reply).unwrap_or(-1))
	}

	pub fn write(&self, inum: i32, buf: &[u8], offset: i32, nbytes: i32) -> std::io::Result<i32> {
		let msg = Request::Write { inum, offset: offset as u32, nbytes: nbytes as u32, buf: buf.to_vec() }
			.encode();
		let reply = self.proc_call(&msg)?;
		Ok(Reply::decode_status(&reply).unwrap_or(-1))
	}

	pub fn read(&self, inum: i32, buf: &mut [u8], offset: i32, nbytes: i32) -> std::io::Result<i32> {
		let msg = Request::Read { inum, offset: offset as u32, nbytes: nbytes as u32 }.encode();
		let reply = self.proc_call(&msg)?;
		let status = Reply::decode_status(&reply).unwrap_or(-1);
		if status == 0 {
			if let Some(payload) = Reply::decode_read_payload(&reply) {
				let n = payload.len().min(buf.len());
				buf[..n].copy_from_slice(&payload[..n]);
			}
		}
		Ok(status)
	}

	pub fn creat(&self, pinum: i32, kind: InodeType, name: &str) -> std::io::Result<i32> {
		let msg = Request::Creat { pinum, kind, name: name.as_bytes().to_vec() }.encode();
		let reply = self.proc_call(&msg)?;
		Ok(Reply::decode_status(&reply).unwrap_or(-1))
	}

	pub fn unlink(&self, pinum: i32, name: &str) -> std::io::Result<i32> {
		let msg = Request::Unlink { pinum, name: name.as_bytes().to_vec() }.encode();
		let reply = self.proc_call(&msg)?;
		Ok(Reply::decode_status(&reply).unwrap_or(-1))
	}
}
