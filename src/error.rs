//! Error values.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! A wrong password is not an error: [`verify`](../fn.verify.html) returns
//! `Ok(false)` for it. The values below describe structural problems with
//! the inputs, which callers may want to report differently.
use std::fmt;
use std::error::Error as StdError;

/// Possible errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The work factor is outside the allowed range.
    InvalidWorkFactor(u32),
    /// A character is not in the hash alphabet.
    InvalidSymbol(char),
    /// The hash string is too short or doesn't start with `$P$`.
    MalformedHash,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidWorkFactor(wf) => write!(f, "Invalid work factor: {}", wf),
            Error::InvalidSymbol(c) => write!(f, "Invalid symbol: {:?}", c),
            Error::MalformedHash => write!(f, "Malformed hash string"),
        }
    }
}

impl StdError for Error {}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display() {
	assert_eq!(Error::InvalidWorkFactor(31).to_string(), "Invalid work factor: 31");
	assert_eq!(Error::InvalidSymbol('!').to_string(), "Invalid symbol: '!'");
	assert_eq!(Error::MalformedHash.to_string(), "Malformed hash string");
    }
}
