/// Syntax validators for ledger account addresses and domain names
///
/// Both checks are pure and run before any network call, so malformed
/// input never costs a round trip.
use std::sync::OnceLock;

use regex::Regex;

use crate::{codec, Result, VouchError};

/// Dot-separated labels of 1-63 chars, no label starting or ending with a
/// hyphen, top label at least two letters.
const DOMAIN_PATTERN: &str =
    r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}$";

fn domain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DOMAIN_PATTERN).unwrap())
}

/// Check that the string decodes as a canonical account address.
pub fn validate_account_address(address: &str) -> Result<()> {
    if codec::is_account_address(address) {
        Ok(())
    } else {
        Err(VouchError::InvalidAccountAddress(address.to_string()))
    }
}

/// Check that the string is a syntactically valid domain name.
pub fn validate_domain(domain: &str) -> Result<()> {
    // 253 characters is the practical upper bound for a full name.
    if domain.len() > 253 || !domain_regex().is_match(domain) {
        return Err(VouchError::InvalidDomain(domain.to_string()));
    }
    Ok(())
}
