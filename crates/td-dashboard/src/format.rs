//! Pure conversions between chain values and what the dashboard shows.

use alloy_primitives::U256;
use td_api_types::{Address, NftMetadata};

use crate::config::{IPFS_SCHEME, PLACEHOLDER_IMAGE};
use crate::error::DashboardError;

/// Rewrites an `ipfs://` URI onto the HTTP gateway. Other URIs are only trimmed.
pub fn resolve_content_uri(uri: &str, gateway: &str) -> String {
    let uri = uri.trim();
    match uri.strip_prefix(IPFS_SCHEME) {
        Some(path) => format!("{gateway}{path}"),
        None => uri.to_owned(),
    }
}

/// The metadata image resolved through the gateway, or the placeholder when
/// the document has no usable image.
pub fn resolve_image_url(metadata: &NftMetadata, gateway: &str) -> String {
    match metadata.image.as_deref().map(str::trim) {
        Some(image) if !image.is_empty() => resolve_content_uri(image, gateway),
        _ => PLACEHOLDER_IMAGE.to_owned(),
    }
}

fn ten_pow(exp: u32) -> U256 {
    U256::from(10).pow(U256::from(exp))
}

/// Converts base units to a decimal string with `precision` fractional digits,
/// rounding half up.
pub fn format_units(amount: U256, decimals: u32, precision: u32) -> String {
    let kept = precision.min(decimals);
    let divisor = ten_pow(decimals - kept);
    let quotient = amount / divisor;
    let remainder = amount % divisor;
    let scaled = if remainder * U256::from(2) >= divisor && divisor > U256::from(1) {
        quotient.saturating_add(U256::from(1))
    } else {
        quotient
    };

    let mut digits = scaled.to_string();
    let kept = kept as usize;
    if kept > 0 {
        if digits.len() <= kept {
            digits = format!("{}{digits}", "0".repeat(kept + 1 - digits.len()));
        }
        digits.insert(digits.len() - kept, '.');
    }

    let padding = (precision - kept as u32) as usize;
    if padding > 0 {
        if kept == 0 {
            digits.push('.');
        }
        digits.push_str(&"0".repeat(padding));
    }
    digits
}

/// Parses a positive decimal amount such as `1.5` into base units.
pub fn parse_units(input: &str, decimals: u32) -> Result<U256, DashboardError> {
    let invalid = || DashboardError::InvalidAmount(input.to_owned());
    let trimmed = input.trim();

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > decimals as usize {
        return Err(invalid());
    }

    let whole = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).map_err(|_| invalid())?
    };
    let padded = format!("{fraction:0<width$}", width = decimals as usize);
    let fraction = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded, 10).map_err(|_| invalid())?
    };

    let amount = whole
        .checked_mul(ten_pow(decimals))
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(invalid)?;
    if amount.is_zero() {
        return Err(invalid());
    }
    Ok(amount)
}

pub fn parse_destination(input: &str) -> Result<Address, DashboardError> {
    Address::parse(input).map_err(|reason| DashboardError::InvalidAddress {
        input: input.to_owned(),
        reason,
    })
}

/// `1 Asset`, `0 Assets`, `3 Assets`.
pub fn asset_count_label(count: usize) -> String {
    if count == 1 {
        "1 Asset".to_owned()
    } else {
        format!("{count} Assets")
    }
}
