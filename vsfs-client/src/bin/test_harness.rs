//! `vsfs-test` — a scripted client-side exercise of a running `vsfsd`,
//! translating `test.c`'s scenario: build `/dir/dir2/file`, write and
//! reread a 10,000-byte random string in pieces, overwrite a middle
//! section, then unlink. Run against an empty disk image.

use std::env;
use std::process::exit;

use mfs::Mfs;
use vsfs::InodeType;

fn rand_bytes(len: usize, seed: u64) -> Vec<u8> {
	let mut s = seed;
	(0..len)
		.map(|_| {
			s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
			b'a' + ((s >> 33) % 26) as u8
		})
		.collect()
}

fn check(label: &str, got: i32, want: i32) {
	if got != want {
		eprintln!("FAIL {label}: got {got}, want {want}");
		exit(1);
	}
	println!("ok   {label}: {got}");
}

fn main() {
	env_logger::init();
	println!("-----------> WARNING: run on an empty disk image <------------");

	let mut args = env::args().skip(1);
	let host = args.next().unwrap_or_else(|| "localhost".to_owned());
	let port: u16 = args.next().and_then(|p| p.parse().ok()).unwrap_or(6969);

	let mfs = Mfs::init((host.as_str(), port)).unwrap_or_else(|e| {
		eprintln!("vsfs-test: connect to {host}:{port}: {e}");
		exit(1);
	});

	check("lookup 0 ..", mfs.lookup(0, "..").unwrap(), 0);
	check("lookup 0 .", mfs.lookup(0, ".").unwrap(), 0);

	check("creat 0 dir", mfs.creat(0, InodeType::Directory, "dir").unwrap(), 0);
	check("creat 1 dir2", mfs.creat(1, InodeType::Directory, "dir2").unwrap(), 0);
	check("creat 2 file", mfs.creat(2, InodeType::Regular, "file").unwrap(), 0);

	check("lookup 0 dir", mfs.lookup(0, "dir").unwrap(), 1);
	check("lookup 1 dir2", mfs.lookup(1, "dir2").unwrap(), 2);
	check("lookup 2 file", mfs.lookup(2, "file").unwrap(), 3);

	let mut s = rand_bytes(10_000, 1);
	for i in 0..5 {
		let status = mfs.write(3, &s[2000 * i..2000 * i + 2000], (2000 * i) as i32, 2000).unwrap();
		check(&format!("write chunk {i}"), status, 0);
	}

	for i in 0..=5 {
		let mut buf = vec![0u8; 4000];
		let status = mfs.read(3, &mut buf, (1000 * i) as i32, 4000).unwrap();
		check(&format!("read window {i}"), status, 0);
		assert_eq!(&buf[..], &s[1000 * i..1000 * i + 4000], "window {i} mismatch");
	}

	let s2 = rand_bytes(3000, 2);
	s[3000..6000].copy_from_slice(&s2);
	check("overwrite 3000..6000", mfs.write(3, &s2, 3000, 3000).unwrap(), 0);

	for i in 0..=5 {
		let mut buf = vec![0u8; 4000];
		let status = mfs.read(3, &mut buf, (1000 * i) as i32, 4000).unwrap();
		check(&format!("reread window {i}"), status, 0);
		assert_eq!(&buf[..], &s[1000 * i..1000 * i + 4000], "window {i} mismatch after overwrite");
	}

	check("unlink non-empty dir2", mfs.unlink(1, "dir2").unwrap(), -1);
	check("unlink file", mfs.unlink(2, "file").unwrap(), 0);
	check("lookup removed file", mfs.lookup(2, "file").unwrap(), -1);
	check("unlink now-empty dir2", mfs.unlink(1, "dir2").unwrap(), 0);
	check("lookup removed dir2", mfs.lookup(1, "dir2").unwrap(), -1);

	println!("all checks passed");
}
