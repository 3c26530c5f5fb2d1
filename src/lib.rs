//! Portable phpass password hashing and verification.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! phpass "portable" hashes are the `$P$` strings stored by WordPress,
//! phpBB and many other PHP applications. They're built from an iterated
//! MD5 digest, and aren't recommended for new systems; this crate exists
//! so that such hashes can be created and checked by Rust code sharing a
//! database with the PHP side. See the [portable](portable) module for the
//! details of the algorithm and the hash format.
//!
//! # Getting Started
//!
//! Add the following to the `[dependencies]` section of your `Cargo.toml`:
//!
//! ```toml
//! phpass = "0.1"
//! ```
//!
//! # Examples
//!
//! To verify a password:
//!
//! ```
//! let h = "$P$9IQRaTwmfeRo7ud9Fh4E2PdI0S3r.L0";
//! assert_eq!(phpass::verify("test12345", h), Ok(true));
//! assert_eq!(phpass::verify("test12346", h), Ok(false));
//! ```
//!
//! A structurally invalid hash is an error, distinct from a wrong password:
//!
//! ```
//! use phpass::error::Error;
//!
//! assert_eq!(phpass::verify("test12345", "$1$5pZSV9va"), Err(Error::MalformedHash));
//! ```
//!
//! To hash a password using default parameters:
//!
//! ```
//! let h = phpass::hash("password").unwrap();
//! assert!(h.starts_with("$P$C"));
//! ```
//!
//! To choose the work factor, or to supply the salt:
//!
//! ```
//! use phpass::HashSetup;
//!
//! let h = phpass::hash_with(HashSetup { salt: Some("jF.jd1bB"), work_factor: Some(8) },
//!     "password").unwrap();
//! assert_eq!(&h[..12], "$P$6jF.jd1bB");
//! ```
//!
//! Passwords are accepted as anything that can be viewed as bytes. A `&str`
//! is hashed as its UTF-8 encoding, which is what PHP does with the strings
//! it receives from UTF-8 web forms. An empty password is hashed like any
//! other; whether it's acceptable is a decision for the application.
//!
//! All functions are synchronous and keep no shared state, so they can be
//! called from any number of threads at once. With high work factors the
//! computation can take a while, and it can't be interrupted; run it on a
//! separate thread or a blocking task pool if that matters.

#![warn(missing_docs)]

pub mod enc_dec;
pub mod error;
pub mod work_factor;
pub mod portable;

pub use crate::portable::{hash, hash_with, verify, PortableHash};
pub use crate::work_factor::WorkFactor;

/// Type alias for the Result type.
pub type Result<T> = std::result::Result<T, error::Error>;

/// Setup struct for hashing customization.
///
/// If `salt` is set to `None`, a random salt will be generated. If
/// `work_factor` is `None`, the default of 14 is used. A custom salt must be
/// exactly eight characters from the hash alphabet.
#[derive(Debug, Clone, Copy)]
pub struct HashSetup<'a> {
    /// Custom salt.
    pub salt: Option<&'a str>,
    /// Base-2 logarithm of the number of iterations.
    pub work_factor: Option<u32>,
}

impl<'a> Default for HashSetup<'a> {
    fn default() -> Self {
	HashSetup { salt: None, work_factor: Some(work_factor::DEFAULT_WORK_FACTOR) }
    }
}

/// A trait for converting a type into a `HashSetup` struct.
pub trait IntoHashSetup<'a> {
    /// The conversion function.
    fn into_hash_setup(self, f: fn(&'a str) -> Result<HashSetup<'a>>) -> Result<HashSetup<'a>>;
}

impl<'a> IntoHashSetup<'a> for &'a str {
    fn into_hash_setup(self, f: fn(&'a str) -> Result<HashSetup<'a>>) -> Result<HashSetup<'a>> {
	f(self)
    }
}

impl<'a> IntoHashSetup<'a> for HashSetup<'a> {
    fn into_hash_setup(self, _f: fn(&'a str) -> Result<HashSetup<'a>>) -> Result<HashSetup<'a>> {
	Ok(self)
    }
}

// Running time depends only on the length of the inputs.
fn consteq(stored: &str, calculated: &str) -> bool {
    if stored.len() != calculated.len() {
	return false;
    }
    0 == stored.bytes().zip(calculated.bytes()).fold(0, |xs, (h1, h2)| xs | h1 ^ h2)
}

mod random {
    use rand::Rng;
    use rand::rngs::OsRng;
    use rand::distributions::Standard;
    use crate::enc_dec::hash64_encode;

    pub fn gen_salt_str(chars: usize) -> String {
	let bytes = ((chars + 3) / 4) * 3;
	let rv = OsRng.sample_iter(&Standard).take(bytes).collect::<Vec<u8>>();
	let mut sstr = hash64_encode(&rv);
	while sstr.len() > chars {
	    sstr.pop();
	}
	sstr
    }

    #[cfg(test)]
    mod tests {
	use super::gen_salt_str;
	use crate::enc_dec::check_hash64;

	#[test]
	fn salt_shape() {
	    for &n in &[1, 2, 7, 8, 9, 16] {
		let s = gen_salt_str(n);
		assert_eq!(s.len(), n);
		assert!(check_hash64(&s).is_ok());
	    }
	}

	#[test]
	fn salts_differ() {
	    let a = gen_salt_str(8);
	    let b = gen_salt_str(8);
	    let c = gen_salt_str(8);
	    assert!(a != b || b != c);
	}
    }
}

mod parse {
    /// A trait for traversing a hash string.
    ///
    /// Portable hashes consist of fixed-size fields with no delimiters,
    /// so the only operation needed is extracting the next `n` characters.
    pub trait HashIterator {
	/// The substring that is returned by methods.
	type Elem;

	/// Extract a fixed-size substring.
	///
	/// There must be <i>at least</i> `n` characters remaining in the
	/// string. If there are less, `None` is returned, and the string is
	/// drained. Widths are counted in characters, not bytes, so a
	/// multibyte character never ends up split between two fields.
	fn take(&mut self, n: usize) -> Option<Self::Elem>;
    }

    pub struct HashSlice<'a> {
	rest: &'a str,
	drained: bool,
    }

    impl<'a> HashSlice<'a> {
	pub fn new(hash: &'a str) -> HashSlice<'a> {
	    HashSlice { rest: hash, drained: false }
	}
    }

    impl<'a> HashIterator for HashSlice<'a> {
	type Elem = &'a str;

	fn take(&mut self, n: usize) -> Option<Self::Elem> {
	    if self.drained {
		return None;
	    }
	    let mut chars = self.rest.char_indices();
	    let mut endp = 0;
	    for _ in 0..n {
		match chars.next() {
		    Some((i, c)) => endp = i + c.len_utf8(),
		    None => {
			self.drained = true;
			return None;
		    },
		}
	    }
	    let (elem, rest) = self.rest.split_at(endp);
	    self.rest = rest;
	    Some(elem)
	}
    }

}
