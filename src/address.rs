//! Canonical chain address and its validator.
//!
//! Addresses are 20-byte account identifiers written as `0x` followed by 40 hex
//! characters. Input may be all lower case, all upper case, or mixed case; mixed
//! case must carry a valid EIP-55 checksum. The canonical form is lower case with
//! the `0x` prefix, and that is the identity key used everywhere else.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of hex characters in an address body.
pub const ADDRESS_HEX_LEN: usize = 40;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
	#[error("address is empty")]
	Empty,
	#[error("address must be 40 hex characters, got {0}")]
	InvalidLength(usize),
	#[error("address contains a non-hex character: {0:?}")]
	InvalidCharacter(char),
	#[error("address checksum mismatch, expected {expected}")]
	BadChecksum { expected: String },
}

/// Canonical, lower-cased address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
	/// Validate and canonicalize a raw address string.
	///
	/// Surrounding whitespace is ignored and the `0x` prefix is optional on input.
	/// Well-formed addresses that nobody has ever used are still valid.
	pub fn validate(raw: &str) -> Result<Self, AddressError> {
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			return Err(AddressError::Empty);
		}

		let body = trimmed
			.strip_prefix("0x")
			.or_else(|| trimmed.strip_prefix("0X"))
			.unwrap_or(trimmed);

		if body.len() != ADDRESS_HEX_LEN {
			return Err(AddressError::InvalidLength(body.len()));
		}
		if let Some(c) = body.chars().find(|c| !c.is_ascii_hexdigit()) {
			return Err(AddressError::InvalidCharacter(c));
		}

		let lower = body.to_ascii_lowercase();
		let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
		let has_upper = body.chars().any(|c| c.is_ascii_uppercase());

		if has_lower && has_upper {
			let expected = checksum_body(&lower);
			if expected != body {
				return Err(AddressError::BadChecksum {
					expected: format!("0x{}", expected),
				});
			}
		}

		Ok(Self(format!("0x{}", lower)))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// EIP-55 mixed-case rendering of this address.
	pub fn to_checksum(&self) -> String {
		format!("0x{}", checksum_body(&self.0[2..]))
	}

	/// Case-insensitive comparison against an arbitrary string, used when matching
	/// entries that came from an external store which may not be canonical.
	pub fn matches(&self, other: &str) -> bool {
		let other = other.trim();
		let other = other
			.strip_prefix("0x")
			.or_else(|| other.strip_prefix("0X"))
			.unwrap_or(other);
		self.0[2..].eq_ignore_ascii_case(other)
	}
}

/// Apply the EIP-55 casing rule to a lower-case hex body.
fn checksum_body(lower: &str) -> String {
	let hash = Keccak256::digest(lower.as_bytes());
	let hash_hex = hex::encode(hash);

	lower
		.chars()
		.zip(hash_hex.chars())
		.map(|(c, h)| {
			if c.is_ascii_alphabetic() && h.to_digit(16).unwrap_or(0) >= 8 {
				c.to_ascii_uppercase()
			} else {
				c
			}
		})
		.collect()
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for Address {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl FromStr for Address {
	type Err = AddressError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::validate(s)
	}
}

impl TryFrom<String> for Address {
	type Error = AddressError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::validate(&value)
	}
}

impl From<Address> for String {
	fn from(value: Address) -> Self {
		value.0
	}
}
