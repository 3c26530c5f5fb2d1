//! The bounded work factor.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The work factor is the base-2 logarithm of the number of digest
//! iterations, between 7 and 30, inclusive. Increasing the value by 1
//! doubles the amount of work. In the hash string it's stored as the
//! alphabet symbol at its own position, so the default of 14 is `C`.
//!
//! A `WorkFactor` can only be obtained through a range-checked
//! constructor, so code which receives one doesn't need to check it again.

use std::convert::TryFrom;
use std::fmt;
use crate::enc_dec::{index_of, symbol_at};
use crate::error::Error;
use super::Result;

/// Minimum work factor.
pub const MIN_WORK_FACTOR: u32 = 7;
/// Maximum work factor.
pub const MAX_WORK_FACTOR: u32 = 30;
/// Default work factor.
///
/// The value is the one used by WordPress.
pub const DEFAULT_WORK_FACTOR: u32 = 14;

/// Validated work factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkFactor(u32);

impl WorkFactor {
    /// Create a work factor, checking the range.
    pub fn new(log2: u32) -> Result<WorkFactor> {
	if log2 < MIN_WORK_FACTOR || log2 > MAX_WORK_FACTOR {
	    return Err(Error::InvalidWorkFactor(log2));
	}
	Ok(WorkFactor(log2))
    }

    /// Decode a work factor from its symbol in a hash string.
    ///
    /// A character outside the alphabet gives `InvalidSymbol`; a valid
    /// symbol at an out-of-range position gives `InvalidWorkFactor`.
    pub fn from_symbol(sym: char) -> Result<WorkFactor> {
	WorkFactor::new(index_of(sym)? as u32)
    }

    /// The logarithmic value.
    pub fn log2(self) -> u32 {
	self.0
    }

    /// The number of digest iterations, 2<sup>`log2`</sup>.
    pub fn iterations(self) -> u32 {
	1 << self.0
    }

    /// The symbol representing this work factor in a hash string.
    pub fn symbol(self) -> char {
	symbol_at(self.0 as u8)
    }
}

impl Default for WorkFactor {
    fn default() -> Self {
	WorkFactor(DEFAULT_WORK_FACTOR)
    }
}

impl TryFrom<u32> for WorkFactor {
    type Error = Error;

    fn try_from(log2: u32) -> Result<WorkFactor> {
	WorkFactor::new(log2)
    }
}

impl fmt::Display for WorkFactor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
	write!(f, "{}", self.0)
    }
}
