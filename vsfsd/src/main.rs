//! `vsfsd` — the datagram request/reply server. A direct translation of
//! `server.c`'s single-threaded read/dispatch/reply loop onto
//! `std::net::UdpSocket`, with the five `ufs_*` calls replaced by `Fs`
//! methods and the request/reply bytes handled by `vsfs-proto`.

use std::env;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::process::exit;

use vsfs::Fs;
use vsfs_proto::lookup_status;
use vsfs_proto::status_of;
use vsfs_proto::DecodeError;
use vsfs_proto::Reply;
use vsfs_proto::Request;
use vsfs_proto::BUFFER_SIZE;

struct Args {
	prog: String,
	port: u16,
	image_path: PathBuf,
}

fn parse_args() -> Args {
	let mut iter = env::args();
	let prog = iter.next().unwrap_or_else(|| "vsfsd".to_owned());
	let port = iter.next().unwrap_or_else(|| usage_exit(&prog));
	let image = iter.next().unwrap_or_else(|| usage_exit(&prog));
	let port: u16 = port.parse().unwrap_or_else(|_| {
		eprintln!("{prog}: invalid port `{port}`");
		exit(1);
	});
	Args { prog, port, image_path: PathBuf::from(image) }
}

fn usage_exit(prog: &str) -> ! {
	eprintln!("usage: {prog} <port> <image-path>");
	exit(1);
}

fn main() {
	env_logger::init();
	let args = parse_args();

	let mut fs = Fs::mount(&args.image_path).unwrap_or_else(|e| {
		log::error!("{}: failed to mount: {e}", args.image_path.display());
		exit(1);
	});

	let socket = UdpSocket::bind(("0.0.0.0", args.port)).unwrap_or_else(|e| {
		eprintln!("{}: bind port {}: {e}", args.prog, args.port);
		exit(1);
	});
	log::info!("vsfsd::listening on port {}", args.port);

	let mut buf = [0u8; BUFFER_SIZE];
	loop {
		let (len, peer) = match socket.recv_from(&mut buf) {
			Ok(v) => v,
			Err(e) => {
				log::warn!("vsfsd::recv failed: {e}");
				continue;
			}
		};
		log::debug!("vsfsd::read {len} bytes from {peer}");

		let request = match Request::decode(&buf[..len]) {
			Ok(req) => req,
			Err(DecodeError::Empty) => continue,
			Err(e) => {
				log::warn!("vsfsd::malformed request from {peer}: {e}");
				continue;
			}
		};

		let reply = handle(&mut fs, request);
		log::debug!("vsfsd::replying to {peer}");
		if let Err(e) = socket.send_to(&reply.encode(), peer) {
			log::warn!("vsfsd::send to {peer} failed: {e}");
		}
	}
}

fn handle(fs: &mut Fs, request: Request) -> Reply {
	match request {
		Request::Lookup { pinum, name } => {
			let result = fs.lookup(pinum, &name);
			Reply::Status(lookup_status(&result))
		}
		Request::Write { inum, offset, nbytes, buf } => {
			let result = fs.write(inum, &buf, offset, nbytes);
			Reply::Status(status_of(&result))
		}
		Request::Read { inum, offset, nbytes } => {
			let mut payload = vec![0u8; nbytes as usize];
			let result = fs.read(inum, &mut payload, offset, nbytes);
			let status = status_of(&result);
			if result.is_err() {
				payload.clear();
			}
			Reply::Read { status, payload }
		}
		Request::Creat { pinum, kind, name } => {
			let result = fs.creat(pinum, kind, &name);
			Reply::Status(status_of(&result))
		}
		Request::Unlink { pinum, name } => {
			let result = fs.unlink(pinum, &name);
			Reply::Status(status_of(&result))
		}
	}
}
