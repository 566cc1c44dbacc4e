//! Input guards shared by the HTTP routes and the transaction builders.
//! Every failure here is a `Validation` error, raised before any chain call.

use crate::chain::{parse_address, Address};
use crate::error::{Error, Result};

/// 10000 basis points = 100 %.
pub const MAX_BASIS_POINTS: i64 = 10_000;
pub const MAX_AIRDROP_BATCH: usize = 100;

pub fn address(field: &str, value: &str) -> Result<Address> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("Champ requis manquant: {field}")));
    }
    parse_address(value).map_err(|e| Error::Validation(format!("{field}: {e}")))
}

pub fn positive_amount(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation(format!("{field} doit être > 0")));
    }
    Ok(value)
}

pub fn split_ratio(ratio: i64) -> Result<u64> {
    if !(0..=MAX_BASIS_POINTS).contains(&ratio) {
        return Err(Error::Validation(format!(
            "splitRatio doit être entre 0 et {MAX_BASIS_POINTS} (reçu {ratio})"
        )));
    }
    Ok(ratio as u64)
}

pub fn airdrop_batch_len(len: usize) -> Result<()> {
    if len == 0 {
        return Err(Error::Validation("Aucun recipient fourni".into()));
    }
    if len > MAX_AIRDROP_BATCH {
        return Err(Error::Validation(format!(
            "Limite de {MAX_AIRDROP_BATCH} recipients par batch"
        )));
    }
    Ok(())
}

/// Scores go on-chain as `u64`; fractions are truncated.
pub fn score(value: f64) -> Result<u64> {
    if !value.is_finite() || value < 0.0 || value > u64::MAX as f64 {
        return Err(Error::Validation(format!("score invalide: {value}")));
    }
    Ok(value.trunc() as u64)
}

/// Clamp a requested page size into `1..=max`, `default` when absent.
pub fn page_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.unwrap_or(default).clamp(1, max)
}
