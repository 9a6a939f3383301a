use primitive_types::U256;

/// `10^exp`, or `None` when it does not fit in 256 bits (`exp > 77`).
pub fn checked_exp10(exp: u32) -> Option<U256> {
	U256::from(10u8).checked_pow(U256::from(exp))
}

/// Render `amount` (in the smallest unit, `decimals` fractional digits) as a
/// fixed-point string with `places` fractional digits, rounding half up.
///
/// Never panics: a divisor past `U256::MAX` exceeds every amount, so the value
/// rounds to zero, and an overflowing scale-up saturates.
pub fn format_token_amount(amount: U256, decimals: u32, places: u32) -> String {
	let scaled = if decimals >= places {
		match checked_exp10(decimals - places) {
			Some(divisor) => {
				let (quotient, remainder) = amount.div_mod(divisor);
				// half up
				if remainder.saturating_mul(U256::from(2u8)) >= divisor {
					quotient.saturating_add(U256::one())
				} else {
					quotient
				}
			}
			None => U256::zero(),
		}
	} else {
		match checked_exp10(places - decimals) {
			Some(factor) => amount.saturating_mul(factor),
			None if amount.is_zero() => U256::zero(),
			None => U256::MAX,
		}
	};

	if places == 0 {
		return scaled.to_string();
	}

	let (whole, fraction) = match checked_exp10(places) {
		Some(unit) => scaled.div_mod(unit),
		None => (U256::zero(), scaled),
	};
	format!(
		"{}.{:0>width$}",
		whole,
		fraction.to_string(),
		width = places as usize
	)
}

/// `0x1234...abcd` style abbreviation.
pub fn shorten_address(address: &str) -> String {
	if address.len() <= 10 {
		return address.to_string();
	}
	format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_format_rounds_half_up() {
		let one_and_change = U256::from(1_234_567_890_000_000_000u64);
		assert_eq!(format_token_amount(one_and_change, 18, 2), "1.23");

		let rounds_up = U256::from(1_995_000_000_000_000_000u64);
		assert_eq!(format_token_amount(rounds_up, 18, 2), "2.00");

		let just_below = U256::from(1_994_999_999_999_999_999u64);
		assert_eq!(format_token_amount(just_below, 18, 2), "1.99");
	}

	#[test]
	fn test_format_small_and_zero() {
		assert_eq!(format_token_amount(U256::zero(), 18, 2), "0.00");
		assert_eq!(format_token_amount(U256::from(5u8), 18, 2), "0.00");
		assert_eq!(format_token_amount(U256::from(7u8), 1, 2), "0.70");
		assert_eq!(format_token_amount(U256::from(42u8), 0, 0), "42");
	}

	#[test]
	fn test_format_large_amount_keeps_precision() {
		// 10^30 wei does not fit in f64 exactly
		let big = U256::exp10(30) + U256::from(5u64) * U256::exp10(15);
		assert_eq!(format_token_amount(big, 18, 2), "1000000000000.01");
	}

	#[test]
	fn test_format_extreme_precision_does_not_panic() {
		assert_eq!(format_token_amount(U256::from(5u8), 90, 2), "0.00");
		assert_eq!(format_token_amount(U256::MAX, 255, 2), "0.00");
		assert_eq!(format_token_amount(U256::zero(), 0, 90).len(), 92);
		assert!(format_token_amount(U256::one(), 0, 80).starts_with("0."));
	}

	#[test]
	fn test_checked_exp10_bounds() {
		assert_eq!(checked_exp10(0), Some(U256::one()));
		assert_eq!(checked_exp10(18), Some(U256::from(1_000_000_000_000_000_000u64)));
		assert!(checked_exp10(77).is_some());
		assert_eq!(checked_exp10(78), None);
	}

	#[test]
	fn test_shorten_address() {
		assert_eq!(
			shorten_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
			"0x5aae...eaed"
		);
		assert_eq!(shorten_address("0x1234"), "0x1234");
	}
}
