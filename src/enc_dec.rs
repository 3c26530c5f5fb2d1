//! The phpass alphabet and radix encoding.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The alphabet is the traditional __crypt__(3) one, where index 0 is `.`
//! and index 63 is `z`. Encoding packs bytes little-endian into 6-bit
//! groups, three bytes to four symbols. When the input runs out inside a
//! group, the group ends with the symbol holding the low bits of the last
//! byte, so a trailing group of one or two bytes gives two symbols, and a
//! final full group gives three. A 16-byte digest becomes 22 symbols. The
//! stored hash is never decoded back into bytes, so there is no decoder.
//!
//! # Example
//!
//! ```
//! use phpass::enc_dec::{hash64_encode, index_of, symbol_at};
//!
//! assert_eq!(symbol_at(14), 'C');
//! assert_eq!(index_of('C').unwrap(), 14);
//! assert_eq!(hash64_encode(&[0xff; 16]), "zzzzzzzzzzzzzzzzzzzzz1");
//! ```

use crate::error::Error;
use super::Result;

/// Number of symbols in the alphabet.
pub const ALPHABET_LEN: usize = 64;

const CRYPT_HASH64: &[u8; ALPHABET_LEN] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

// Indexed by (byte - 0x20); 0x40 marks a byte outside the alphabet.
const CRYPT_HASH64_ENC_MAP: &[u8; 96] = b"\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x00\x01\
					  \x02\x03\x04\x05\x06\x07\x08\x09\x0a\x0b\x40\x40\x40\x40\x40\x40\
					  \x40\x0c\x0d\x0e\x0f\x10\x11\x12\x13\x14\x15\x16\x17\x18\x19\x1a\
					  \x1b\x1c\x1d\x1e\x1f\x20\x21\x22\x23\x24\x25\x40\x40\x40\x40\x40\
					  \x40\x26\x27\x28\x29\x2a\x2b\x2c\x2d\x2e\x2f\x30\x31\x32\x33\x34\
					  \x35\x36\x37\x38\x39\x3a\x3b\x3c\x3d\x3e\x3f\x40\x40\x40\x40\x40";

/// Return the alphabet symbol at `index`.
///
/// The index must be in the range 0 to 63, inclusive. Larger values are a
/// caller bug; they panic in debug builds.
pub fn symbol_at(index: u8) -> char {
    debug_assert!((index as usize) < ALPHABET_LEN, "alphabet index {} out of range", index);
    sextet(index as u32)
}

fn sextet(val: u32) -> char {
    CRYPT_HASH64[(val & 0x3F) as usize] as char
}

/// Return the position of `sym` in the alphabet.
///
/// Fails with `InvalidSymbol` if the character isn't in the alphabet.
pub fn index_of(sym: char) -> Result<u8> {
    let dec = (sym as u32)
	.checked_sub(0x20)
	.and_then(|b| CRYPT_HASH64_ENC_MAP.get(b as usize))
	.copied()
	.unwrap_or(0x40);
    if dec as usize >= ALPHABET_LEN {
	return Err(Error::InvalidSymbol(sym));
    }
    Ok(dec)
}

/// Check that every character of `s` is in the alphabet.
pub fn check_hash64(s: &str) -> Result<()> {
    for c in s.chars() {
	index_of(c)?;
    }
    Ok(())
}

/// Encode a byte slice with the phpass radix encoding.
pub fn hash64_encode(bs: &[u8]) -> String {
    let mut out = String::with_capacity((bs.len() + 2) / 3 * 4);
    let mut i = 0;
    while i < bs.len() {
	let mut val = bs[i] as u32;
	i += 1;
	out.push(sextet(val));
	if i < bs.len() {
	    val |= (bs[i] as u32) << 8;
	    i += 1;
	}
	out.push(sextet(val >> 6));
	if i >= bs.len() {
	    break;
	}
	val |= (bs[i] as u32) << 16;
	i += 1;
	out.push(sextet(val >> 12));
	if i >= bs.len() {
	    break;
	}
	out.push(sextet(val >> 18));
    }
    out
}
