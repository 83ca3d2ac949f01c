// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::types::{AccountId, PublicKey};

/// yoctoNEAR per NEAR.
pub const YOCTO_PER_NEAR: u128 = 1_000_000_000_000_000_000_000_000;
/// Gas units per Tgas.
pub const GAS_PER_TGAS: u64 = 1_000_000_000_000;

const YOCTO_DECIMALS: u32 = 24;

/// Parse an account ID from string.
pub fn parse_account_id(s: &str) -> Result<AccountId> {
    AccountId::from_str(s)
}

/// Parse a public key from `ed25519:<base58>` or bare base58.
pub fn parse_public_key(s: &str) -> Result<PublicKey> {
    PublicKey::from_str(s)
}

/// Parse a token amount into yoctoNEAR.
///
/// Plain numbers are NEAR (`"1.5"`, `"0.01 NEAR"`); a `yocto` suffix takes
/// the integer as-is (`"1000 yocto"`).
pub fn parse_near_amount(s: &str) -> Result<u128> {
    let s = s.trim();
    let lower = s.to_lowercase();
    if let Some(v) = lower.strip_suffix("yocto") {
        return v
            .trim()
            .parse::<u128>()
            .map_err(|e| Error::validation(format!("invalid yocto amount '{s}': {e}")));
    }
    let v = lower.strip_suffix("near").unwrap_or(&lower).trim();
    let decimal = Decimal::from_str(v)
        .map_err(|e| Error::validation(format!("invalid amount '{s}': {e}")))?;
    if decimal.is_sign_negative() {
        return Err(Error::validation(format!("amount '{s}' is negative")));
    }
    if decimal.scale() > YOCTO_DECIMALS {
        return Err(Error::validation(format!(
            "amount '{s}' has more than {YOCTO_DECIMALS} decimals"
        )));
    }

    // Decimal cannot hold 10^24 * whole for large amounts, so scale the
    // whole and fractional parts separately.
    let whole = decimal.trunc();
    let frac = decimal - whole;
    let overflow = || Error::validation(format!("overflow occurred when scaling '{s}'"));
    let whole = whole
        .to_u128()
        .ok_or_else(overflow)?
        .checked_mul(YOCTO_PER_NEAR)
        .ok_or_else(overflow)?;
    let frac = (frac * Decimal::from(10u64.pow(12)) * Decimal::from(10u64.pow(12)))
        .trunc()
        .to_u128()
        .ok_or_else(overflow)?;
    whole.checked_add(frac).ok_or_else(overflow)
}

/// Parse a gas amount. Accepts raw gas (`"30000000000000"`) or a `Tgas`
/// suffix (`"300 Tgas"`, `"2.5tgas"`).
pub fn parse_gas(s: &str) -> Result<u64> {
    let s = s.trim();
    let lower = s.to_lowercase();
    let overflow = || Error::validation(format!("gas '{s}' overflows u64"));
    match lower.strip_suffix("tgas") {
        Some(v) => {
            let decimal = Decimal::from_str(v.trim())
                .map_err(|e| Error::validation(format!("invalid gas '{s}': {e}")))?;
            if decimal.is_sign_negative() {
                return Err(Error::validation(format!("gas '{s}' is negative")));
            }
            decimal
                .checked_mul(Decimal::from(GAS_PER_TGAS))
                .ok_or_else(overflow)?
                .trunc()
                .to_u64()
                .ok_or_else(overflow)
        }
        None => lower
            .parse::<u64>()
            .map_err(|e| Error::validation(format!("invalid gas '{s}': {e}"))),
    }
}

/// Format yoctoNEAR as a decimal NEAR string, e.g. `1.5`.
pub fn format_near_amount(yocto: u128) -> String {
    let whole = yocto / YOCTO_PER_NEAR;
    let frac = yocto % YOCTO_PER_NEAR;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:024}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_amounts() {
        assert_eq!(parse_near_amount("0").unwrap(), 0);
        assert_eq!(parse_near_amount("1").unwrap(), YOCTO_PER_NEAR);
        assert_eq!(parse_near_amount("1.5 NEAR").unwrap(), YOCTO_PER_NEAR * 3 / 2);
        assert_eq!(parse_near_amount("0.000000000000000000000001").unwrap(), 1);
        assert_eq!(parse_near_amount("1000 yocto").unwrap(), 1000);
        assert_eq!(parse_near_amount("1000000000").unwrap(), 1_000_000_000 * YOCTO_PER_NEAR);

        assert!(parse_near_amount("-1").is_err());
        assert!(parse_near_amount("abc").is_err());
        assert!(parse_near_amount("0.0000000000000000000000001").is_err());
        // u128::MAX yocto is about 3.4e14 NEAR.
        assert!(matches!(
            parse_near_amount("1000000000000000"),
            Err(Error::Validation(_))
        ));
        assert!(parse_near_amount("340282366920938463463374607431768211456 yocto").is_err());
    }

    #[test]
    fn gas_amounts() {
        assert_eq!(parse_gas("300 Tgas").unwrap(), 300_000_000_000_000);
        assert_eq!(parse_gas("2.5tgas").unwrap(), 2_500_000_000_000);
        assert_eq!(parse_gas("300000000000000").unwrap(), 300_000_000_000_000);
        assert!(parse_gas("99999999999 Tgas").is_err());
        assert!(parse_gas("lots").is_err());
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_near_amount(YOCTO_PER_NEAR * 3 / 2), "1.5");
        assert_eq!(format_near_amount(0), "0");
        assert_eq!(format_near_amount(1), "0.000000000000000000000001");
    }
}
