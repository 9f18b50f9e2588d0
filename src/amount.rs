//! Token amount handling across differing decimals
//!
//! The source chain token carries 8 decimals while the OFT minted on the
//! destination chain carries 18. Amounts travel across the wire in *shared
//! decimals* (8 here), so each side converts with its own conversion rate:
//!
//! - source adapter: `10^(8 - 8) = 1`
//! - destination OFT: `10^(18 - 8) = 10^10` ([`CONVERSION_MULTIPLIER`])
//!
//! Anything below the conversion rate is dust and is removed before sending.

use alloy_primitives::utils::{format_units, parse_units, ParseUnits};
use alloy_primitives::U256;

use crate::error::{BridgeError, Result};

/// Decimals of the token locked on the source chain.
pub const SOURCE_TOKEN_DECIMALS: u8 = 8;

/// Decimals of the OFT on the destination chain.
pub const OFT_DECIMALS: u8 = 18;

/// Decimals used for amounts inside cross-chain messages.
pub const SHARED_DECIMALS: u8 = 8;

/// Multiplier between a source amount and the destination amount it mints.
pub const CONVERSION_MULTIPLIER: U256 = U256::from_limbs([10_000_000_000, 0, 0, 0]);

/// Parses a human readable amount (e.g. `"50"` or `"0.5"`) into base units.
///
/// # Example
///
/// ```rust
/// use lockbridge::amount::parse_amount;
/// use alloy_primitives::U256;
///
/// let amount = parse_amount("50", 8).unwrap();
/// assert_eq!(amount, U256::from(5_000_000_000u64));
/// ```
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    match parse_units(amount.trim(), decimals)? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => Err(BridgeError::InvalidAmount {
            amount: amount.to_string(),
            reason: "amount must not be negative".to_string(),
        }),
    }
}

/// Formats base units back into a human readable amount.
pub fn format_amount(amount: U256, decimals: u8) -> Result<String> {
    Ok(format_units(amount, decimals)?)
}

/// Returns `10^(local_decimals - shared_decimals)`.
pub fn conversion_rate(local_decimals: u8, shared_decimals: u8) -> Result<U256> {
    let exponent = local_decimals.checked_sub(shared_decimals).ok_or_else(|| {
        BridgeError::InvalidConfig(format!(
            "local decimals ({local_decimals}) below shared decimals ({shared_decimals})"
        ))
    })?;
    Ok(U256::from(10u64).pow(U256::from(exponent)))
}

/// Drops everything below `rate` from a local amount.
pub fn remove_dust(amount_ld: U256, rate: U256) -> U256 {
    (amount_ld / rate) * rate
}

/// Local decimals -> shared decimals. Dust is truncated.
pub fn to_shared(amount_ld: U256, rate: U256) -> U256 {
    amount_ld / rate
}

/// Shared decimals -> local decimals. `None` on overflow.
pub fn to_local(amount_sd: U256, rate: U256) -> Option<U256> {
    amount_sd.checked_mul(rate)
}

/// Minimum acceptable amount keeping `percent` of `amount` (e.g. 95 for 5% slippage).
pub fn min_amount_with_slippage(amount: U256, percent: u64) -> U256 {
    amount.saturating_mul(U256::from(percent)) / U256::from(100u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("50", 8, 5_000_000_000u64)]
    #[case("100", 8, 10_000_000_000u64)]
    #[case("0.5", 8, 50_000_000u64)]
    #[case(" 1 ", 0, 1u64)]
    fn test_parse_amount(#[case] input: &str, #[case] decimals: u8, #[case] expected: u64) {
        assert_eq!(parse_amount(input, decimals).unwrap(), U256::from(expected));
    }

    #[test]
    fn test_parse_amount_rejects_negative_and_garbage() {
        assert!(matches!(
            parse_amount("-5", 8),
            Err(BridgeError::InvalidAmount { .. })
        ));
        assert!(matches!(parse_amount("abc", 8), Err(BridgeError::Units(_))));
    }

    #[test]
    fn test_format_amount() {
        let formatted = format_amount(U256::from(5_000_000_000u64), 8).unwrap();
        assert_eq!(formatted, "50.00000000");
    }

    #[test]
    fn test_conversion_multiplier_matches_decimals() {
        let rate = conversion_rate(OFT_DECIMALS, SHARED_DECIMALS).unwrap();
        assert_eq!(rate, CONVERSION_MULTIPLIER);
        assert_eq!(
            conversion_rate(SOURCE_TOKEN_DECIMALS, SHARED_DECIMALS).unwrap(),
            U256::from(1)
        );
        assert!(conversion_rate(6, 8).is_err());
    }

    #[test]
    fn test_source_to_destination_scaling() {
        // 60 tokens on the source mint 60 * 10^10 base units on the destination
        let sent = parse_amount("60", SOURCE_TOKEN_DECIMALS).unwrap();
        let source_rate = conversion_rate(SOURCE_TOKEN_DECIMALS, SHARED_DECIMALS).unwrap();
        let dest_rate = conversion_rate(OFT_DECIMALS, SHARED_DECIMALS).unwrap();

        let shared = to_shared(sent, source_rate);
        let received = to_local(shared, dest_rate).unwrap();
        assert_eq!(received, sent * CONVERSION_MULTIPLIER);
        assert_eq!(received, parse_amount("60", OFT_DECIMALS).unwrap());
    }

    #[test]
    fn test_remove_dust() {
        let rate = CONVERSION_MULTIPLIER;
        let amount = CONVERSION_MULTIPLIER * U256::from(3) + U256::from(42);
        assert_eq!(remove_dust(amount, rate), CONVERSION_MULTIPLIER * U256::from(3));
        assert_eq!(remove_dust(U256::from(42), U256::from(1)), U256::from(42));
    }

    #[rstest]
    #[case(95, 9_500)]
    #[case(80, 8_000)]
    #[case(100, 10_000)]
    fn test_min_amount_with_slippage(#[case] percent: u64, #[case] expected: u64) {
        assert_eq!(
            min_amount_with_slippage(U256::from(10_000u64), percent),
            U256::from(expected)
        );
    }
}
