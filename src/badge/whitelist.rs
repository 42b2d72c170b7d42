//! Whitelist address screening and batching.

use std::collections::HashSet;

/// Addresses per `add_to_whitelist` transaction in a bulk upload.
pub const WHITELIST_BATCH_SIZE: usize = 50;

/// Named NEAR account on mainnet or testnet.
pub fn is_valid_account_id(account: &str) -> bool {
    let account = account.trim();
    [".near", ".testnet"].iter().any(|suffix| {
        account
            .strip_suffix(suffix)
            .is_some_and(|name| !name.is_empty() && !name.contains(char::is_whitespace))
    })
}

/// Trim, keep valid account ids, drop repeats. Order of first appearance is kept.
pub fn screen_addresses<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| is_valid_account_id(s))
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Split addresses into upload batches.
pub fn batches(addresses: &[String]) -> std::slice::Chunks<'_, String> {
    addresses.chunks(WHITELIST_BATCH_SIZE)
}
