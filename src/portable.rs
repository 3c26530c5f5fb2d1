//! Portable phpass hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! This is the fallback algorithm of the phpass framework, called
//! "portable" because it needs nothing beyond MD5, which every PHP
//! installation has. WordPress uses it for all of its stored passwords.
//! Being MD5-based it's fast to attack, and shouldn't be chosen for new
//! systems except for compatibility.
//!
//! # Example
//!
//! ```
//! use phpass::portable;
//!
//! assert_eq!(portable::hash_with(
//!     "$P$9IQRaTwmfeRo7ud9Fh4E2PdI0S3r.L0",
//!     "test12345").unwrap(),
//!     "$P$9IQRaTwmfeRo7ud9Fh4E2PdI0S3r.L0");
//! ```
//!
//! # Parameters
//!
//! * __Password length__: unlimited.
//!
//! * __Salt length__: exactly 8 characters.
//!
//! * __Work factor__: logarithmic value between 7 and 30, inclusive.
//! The default is 14.
//!
//! # Hash Format
//!
//! The format of the hash is
//! __`$P$`__*`{work_factor}{salt}{checksum}`*, where:
//!
//! * *`{work_factor}`* is the alphabet symbol at the position equal to the
//!   work factor. The default, 14, is written as `C`.
//!
//! * *`{salt}`* is the 8-character salt string.
//!
//! * *`{checksum}`* is a 22-character Base64 encoding of the checksum.
//!
//! The whole hash is always 34 characters long.
//!
//! # Algorithm
//!
//! The initial state is MD5(*salt* ‖ *password*). It's then replaced
//! 2<sup>*work_factor*</sup> times by MD5(*state* ‖ *password*), and the
//! final state is encoded to give the checksum.

use std::fmt;
use log::{debug, trace};
use md5::{Md5, Digest};
use md5::digest::FixedOutput;
use md5::digest::generic_array::GenericArray;
use super::{Result, HashSetup, IntoHashSetup, consteq};
use crate::enc_dec::{check_hash64, hash64_encode};
use crate::error::Error;
use crate::random;
use crate::parse::{self, HashIterator};
use crate::work_factor::WorkFactor;

/// Hash identifier.
pub const MAGIC: &str = "$P$";
/// Salt length.
pub const SALT_LEN: usize = 8;
/// Checksum length.
pub const CHECKSUM_LEN: usize = 22;
/// Length of the setting prefix: identifier, work factor and salt.
pub const SETTING_LEN: usize = MAGIC_LEN + 1 + SALT_LEN;
/// Length of a complete hash.
pub const HASH_LEN: usize = SETTING_LEN + CHECKSUM_LEN;
/// Length of an MD5 digest.
pub const DIGEST_LEN: usize = 16;

const MAGIC_LEN: usize = 3;

/// Run the iterated digest.
///
/// The salt isn't checked here; it's fed to MD5 as given. The loop always
/// runs for the full number of iterations.
pub fn digest(salt: &str, pass: &[u8], work_factor: WorkFactor) -> [u8; DIGEST_LEN] {
    trace!("portable digest, work factor {}", work_factor);
    let mut out = [0u8; DIGEST_LEN];
    let state = GenericArray::from_mut_slice(&mut out);
    let mut dgst = Md5::new();
    dgst.update(salt.as_bytes());
    dgst.update(pass);
    dgst.finalize_into_reset(state);
    for _ in 0..work_factor.iterations() {
	dgst.update(&*state);
	dgst.update(pass);
	dgst.finalize_into_reset(state);
    }
    out
}

fn checksum(pass: &[u8], salt: &str, work_factor: WorkFactor) -> String {
    let mut enc = hash64_encode(&digest(salt, pass, work_factor));
    enc.truncate(CHECKSUM_LEN);
    enc
}

// Alphabet first: once it passes, the salt is ASCII and bytes equal chars.
fn check_salt(salt: &str) -> Result<()> {
    check_hash64(salt)?;
    if salt.len() != SALT_LEN {
	debug!("salt length {} instead of {}", salt.len(), SALT_LEN);
	return Err(Error::MalformedHash);
    }
    Ok(())
}

fn do_portable_hash(pass: &[u8], salt: &str, work_factor: WorkFactor) -> Result<String> {
    check_salt(salt)?;
    Ok(format!("{}{}{}{}", MAGIC, work_factor.symbol(), salt, checksum(pass, salt, work_factor)))
}

/// Hash a password with a randomly generated salt and the default
/// work factor.
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    let saltstr = random::gen_salt_str(SALT_LEN);
    do_portable_hash(pass.as_ref(), &saltstr, WorkFactor::default())
}

fn parse_setting<'a>(hs: &mut parse::HashSlice<'a>) -> Result<(WorkFactor, &'a str)> {
    if hs.take(MAGIC_LEN) != Some(MAGIC) {
	debug!("hash string doesn't start with {}", MAGIC);
	return Err(Error::MalformedHash);
    }
    let wf_sym = hs.take(1).and_then(|s| s.chars().next()).ok_or(Error::MalformedHash)?;
    let salt = hs.take(SALT_LEN).ok_or(Error::MalformedHash)?;
    let work_factor = WorkFactor::from_symbol(wf_sym)?;
    check_salt(salt)?;
    Ok((work_factor, salt))
}

fn parse_portable_hash(hash: &str) -> Result<HashSetup> {
    let (work_factor, salt) = parse_setting(&mut parse::HashSlice::new(hash))?;
    Ok(HashSetup { salt: Some(salt), work_factor: Some(work_factor.log2()) })
}

/// Hash a password with user-provided parameters.
///
/// If the `param` argument is a `&str`, it must start with a setting in the
/// hash format: the identifier, the work factor symbol and the salt. A
/// complete hash is also accepted, and anything after the salt is ignored.
/// An out-of-range work factor or a salt which isn't exactly eight alphabet
/// characters is an error. The work factor is checked before any hashing
/// is done.
pub fn hash_with<'a, IHS, B>(param: IHS, pass: B) -> Result<String>
    where IHS: IntoHashSetup<'a>, B: AsRef<[u8]>
{
    let hs = IHS::into_hash_setup(param, parse_portable_hash)?;
    let work_factor = match hs.work_factor {
	Some(wf) => WorkFactor::new(wf)?,
	None => WorkFactor::default(),
    };
    if let Some(salt) = hs.salt {
	do_portable_hash(pass.as_ref(), salt, work_factor)
    } else {
	let salt = random::gen_salt_str(SALT_LEN);
	do_portable_hash(pass.as_ref(), &salt, work_factor)
    }
}

/// Verify that the hash corresponds to a password.
///
/// Returns `Ok(false)` if the password doesn't match, and an error if the
/// hash can't be parsed. The checksums are compared in constant time.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> Result<bool> {
    let ph = PortableHash::parse(hash)?;
    Ok(consteq(ph.checksum, &checksum(pass.as_ref(), ph.salt, ph.work_factor)))
}

/// A parsed portable hash.
///
/// Parsing goes by fixed character offsets. The string must have at least
/// 34 characters; anything following the checksum is ignored. Every field
/// must consist of alphabet characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortableHash<'a> {
    work_factor: WorkFactor,
    salt: &'a str,
    checksum: &'a str,
}

impl<'a> PortableHash<'a> {
    /// Split a stored hash into its components.
    ///
    /// Fails with `MalformedHash` if the string is too short or has the
    /// wrong identifier, with `InvalidSymbol` if the work factor, salt or
    /// checksum contain a character outside the alphabet, and with
    /// `InvalidWorkFactor` if the work factor symbol is valid but out of
    /// range.
    pub fn parse(hash: &'a str) -> Result<PortableHash<'a>> {
	let nchars = hash.chars().count();
	if nchars < HASH_LEN {
	    debug!("hash string has {} characters, needs {}", nchars, HASH_LEN);
	    return Err(Error::MalformedHash);
	}
	let mut hs = parse::HashSlice::new(hash);
	let (work_factor, salt) = parse_setting(&mut hs)?;
	let checksum = hs.take(CHECKSUM_LEN).ok_or(Error::MalformedHash)?;
	check_hash64(checksum)?;
	Ok(PortableHash { work_factor, salt, checksum })
    }

    /// The work factor.
    pub fn work_factor(&self) -> WorkFactor {
	self.work_factor
    }

    /// The salt.
    pub fn salt(&self) -> &'a str {
	self.salt
    }

    /// The encoded checksum.
    pub fn checksum(&self) -> &'a str {
	self.checksum
    }
}

impl<'a> fmt::Display for PortableHash<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
	write!(f, "{}{}{}{}", MAGIC, self.work_factor.symbol(), self.salt, self.checksum)
    }
}

#[cfg(test)]
mod tests {
    use md5::{Md5, Digest};
    use super::{digest, hash, hash_with, verify, PortableHash, HASH_LEN};
    use crate::HashSetup;
    use crate::enc_dec::hash64_encode;
    use crate::error::Error;
    use crate::work_factor::WorkFactor;

    #[test]
    fn reference_vector() {
	assert_eq!(hash_with("$P$9IQRaTwmfeRo7ud9Fh4E2PdI0S3r.L0", "test12345").unwrap(),
	    "$P$9IQRaTwmfeRo7ud9Fh4E2PdI0S3r.L0");
	assert_eq!(verify("test12345", "$P$9IQRaTwmfeRo7ud9Fh4E2PdI0S3r.L0"), Ok(true));
	assert_eq!(verify("test12346", "$P$9IQRaTwmfeRo7ud9Fh4E2PdI0S3r.L0"), Ok(false));
    }

    #[test]
    fn custom() {
	assert_eq!(hash_with(HashSetup { salt: Some("jF.jd1bB"), work_factor: Some(14) }, "password").unwrap(),
	    "$P$CjF.jd1bBHvv8bYHJUEn5PUoguol9w1");
	assert_eq!(hash_with(HashSetup { salt: Some("jF.jd1bB"), work_factor: None }, "correcthorse").unwrap(),
	    "$P$CjF.jd1bBhqAeK8ZbhJ7nQoRUR.uBC0");
	assert_eq!(hash_with("$P$5jF.jd1bB", "password").unwrap(),
	    "$P$5jF.jd1bB7mApxw.MMxJBnypBulTmN1");
    }

    #[test]
    fn empty_password() {
	let h = hash_with(HashSetup { salt: Some("jF.jd1bB"), work_factor: Some(7) }, "").unwrap();
	assert_eq!(h, "$P$5jF.jd1bB5ildaLa.wcaGoecEF0h/Z.");
	assert_eq!(verify("", &h), Ok(true));
	assert_eq!(verify(" ", &h), Ok(false));
    }

    #[test]
    fn utf8_password() {
	let h = "$P$6Dwa6I9Oe6aWWSx33EVHwoS1X8ffA20";
	assert_eq!(verify("pässwörd", h), Ok(true));
	assert_eq!(verify("pässwörd".as_bytes(), h), Ok(true));
	assert_eq!(verify("passwort", h), Ok(false));
    }

    #[test]
    fn digest_is_deterministic() {
	let wf = WorkFactor::new(7).unwrap();
	let d1 = digest("jF.jd1bB", b"password", wf);
	let d2 = digest("jF.jd1bB", b"password", wf);
	assert_eq!(d1, d2);
	assert_eq!(&hash64_encode(&d1)[..], "7mApxw.MMxJBnypBulTmN1");
	assert_ne!(digest("jF.jd1bC", b"password", wf), d1);
	assert_ne!(digest("jF.jd1bB", b"password", WorkFactor::new(8).unwrap()), d1);
    }

    #[test]
    fn shape() {
	for wf in 7..=12 {
	    let h = hash_with(HashSetup { salt: None, work_factor: Some(wf) }, "password").unwrap();
	    assert_eq!(h.len(), HASH_LEN);
	    assert!(h.starts_with("$P$"));
	    assert_eq!(PortableHash::parse(&h).unwrap().work_factor().log2(), wf);
	    assert_eq!(verify("password", &h), Ok(true));
	    assert_eq!(verify("Password", &h), Ok(false));
	}
    }

    #[test]
    fn random_salts() {
	let h1 = hash("correctpassword").unwrap();
	let h2 = hash("correctpassword").unwrap();
	assert_eq!(&h1[..4], "$P$C");
	assert_ne!(&h1[4..12], &h2[4..12]);
	assert_eq!(verify("correctpassword", &h1), Ok(true));
	assert_eq!(verify("wrongpassword", &h1), Ok(false));
    }

    #[test]
    fn bad_work_factor() {
	for &wf in &[0, 6, 31, 64, u32::MAX] {
	    assert_eq!(hash_with(HashSetup { salt: None, work_factor: Some(wf) }, "password"),
		Err(Error::InvalidWorkFactor(wf)));
	}
	assert_eq!(hash_with("$P$3jF.jd1bB", "password"), Err(Error::InvalidWorkFactor(5)));
	assert_eq!(verify("x", "$P$TjF.jd1bB6t9fxwFbhNgIZhp0RozS1/"), Err(Error::InvalidWorkFactor(31)));
    }

    #[test]
    fn bad_salt() {
	assert_eq!(hash_with(HashSetup { salt: Some("jF.jd1b"), work_factor: None }, "password"),
	    Err(Error::MalformedHash));
	assert_eq!(hash_with(HashSetup { salt: Some("jF.jd1bB0"), work_factor: None }, "password"),
	    Err(Error::MalformedHash));
	assert_eq!(hash_with(HashSetup { salt: Some("jF.jd1b$"), work_factor: None }, "password"),
	    Err(Error::InvalidSymbol('$')));
	assert_eq!(hash_with("$P$CjF.jd1b", "password"), Err(Error::MalformedHash));
    }

    #[test]
    fn malformed() {
	assert_eq!(verify("x", "not-a-valid-hash"), Err(Error::MalformedHash));
	assert_eq!(verify("x", "$Q$CjF.jd1bB6t9fxwFbhNgIZhp0RozS1/"), Err(Error::MalformedHash));
	assert_eq!(verify("x", "$P$CjF.jd1bB6t9fxwFbhNgIZhp0RozS1"), Err(Error::MalformedHash));
	assert_eq!(verify("x", ""), Err(Error::MalformedHash));
	assert_eq!(verify("x", "$P$!jF.jd1bB6t9fxwFbhNgIZhp0RozS1/"), Err(Error::InvalidSymbol('!')));
    }

    #[test]
    fn non_ascii() {
	// 33 characters, 34 bytes
	assert_eq!(verify("x", "$P$CjF.jd1é6t9fxwFbhNgIZhp0RozS1/"), Err(Error::MalformedHash));
	assert_eq!(verify("x", "$P$CjF.jd1éB6t9fxwFbhNgIZhp0RozS1/"), Err(Error::InvalidSymbol('é')));
	assert_eq!(verify("x", "$P$éjF.jd1bB6t9fxwFbhNgIZhp0RozS1/"), Err(Error::InvalidSymbol('é')));
	assert_eq!(verify("x", "$P$CjF.jd1bB6t9fxwFbhNgIZhp0RozS1é"), Err(Error::InvalidSymbol('é')));
	assert_eq!(verify("x", "$P$CjF.jd1bB6t9fxwFbhNgIZhp0RozS1$"), Err(Error::InvalidSymbol('$')));
	assert_eq!(hash_with("$P$CjF.jd1éB", "password"), Err(Error::InvalidSymbol('é')));
	assert_eq!(hash_with(HashSetup { salt: Some("jF.jd1é"), work_factor: None }, "password"),
	    Err(Error::InvalidSymbol('é')));
    }

    #[test]
    fn digest_chain() {
	let wf = WorkFactor::new(7).unwrap();
	let mut state = Md5::digest(b"jF.jd1bBpassword");
	for _ in 0..wf.iterations() {
	    let mut dgst = Md5::new();
	    dgst.update(&state);
	    dgst.update(b"password");
	    state = dgst.finalize();
	}
	assert_eq!(&digest("jF.jd1bB", b"password", wf)[..], &state[..]);
    }

    #[test]
    fn parsed_components() {
	let h = "$P$CjF.jd1bB6t9fxwFbhNgIZhp0RozS1/";
	let ph = PortableHash::parse(h).unwrap();
	assert_eq!(ph.work_factor(), WorkFactor::new(14).unwrap());
	assert_eq!(ph.salt(), "jF.jd1bB");
	assert_eq!(ph.checksum(), "6t9fxwFbhNgIZhp0RozS1/");
	assert_eq!(ph.to_string(), h);
	let long = format!("{}\n", h);
	assert_eq!(PortableHash::parse(&long).unwrap().to_string(), h);
    }

    #[test]
    fn concurrent() {
	let handles = (0..4).map(|i| std::thread::spawn(move || {
	    let pass = format!("password{}", i);
	    let h = hash_with(HashSetup { salt: None, work_factor: Some(8) }, &pass).unwrap();
	    verify(&pass, &h)
	})).collect::<Vec<_>>();
	for h in handles {
	    assert_eq!(h.join().unwrap(), Ok(true));
	}
    }
}
