/// Manifest fetch and parse
///
/// A domain vouches for validators by hosting a plain-text manifest at a
/// fixed well-known path. The fetch side is a narrow trait so tests can
/// serve canned bodies; the parser extracts the key set from the
/// `[validation_public_key]` section.
use std::collections::HashSet;

use async_trait::async_trait;

use crate::{validate, Result, VouchError};

/// Well-known path of the manifest under the domain root.
pub const MANIFEST_PATH: &str = "ripple.txt";

/// Section header holding the validator keys, matched case-insensitively.
const VALIDATION_KEY_SECTION: &str = "validation_public_key";

/// Retrieval of a domain's raw manifest body.
///
/// Implementations collapse every failure mode, unreachable host,
/// non-success status or missing resource alike, into
/// [`VouchError::RippleTxtNotFound`]; callers cannot distinguish them.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    async fn fetch(&self, domain: &str) -> Result<String>;
}

/// `ManifestFetcher` over HTTPS.
pub struct HttpManifestFetcher {
    client: reqwest::Client,
}

impl Default for HttpManifestFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpManifestFetcher {
    pub fn new() -> Self {
        HttpManifestFetcher {
            client: reqwest::Client::builder()
                .user_agent(concat!("vouch/", env!("CARGO_PKG_VERSION")))
                .timeout(std::time::Duration::from_secs(20))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap(),
        }
    }

    fn manifest_url(domain: &str) -> String {
        format!("https://{}/{}", domain, MANIFEST_PATH)
    }
}

#[async_trait]
impl ManifestFetcher for HttpManifestFetcher {
    async fn fetch(&self, domain: &str) -> Result<String> {
        let url = Self::manifest_url(domain);
        tracing::debug!(url = %url, "fetching manifest");
        let not_found = || VouchError::RippleTxtNotFound(domain.to_string());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|_| not_found())?
            .error_for_status()
            .map_err(|_| not_found())?;
        response.text().await.map_err(|_| not_found())
    }
}

/// Extract the candidate validation public keys from a manifest body.
///
/// Lines group under bracketed section headers. Blank lines and `#`
/// comments are skipped everywhere; lines under unrecognized sections are
/// ignored; within the validators section the first whitespace-delimited
/// field of each line is a candidate key.
pub fn parse_validation_keys(body: &str) -> HashSet<String> {
    let mut keys = HashSet::new();
    let mut in_section = false;
    for raw in body.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            let name = &line[1..line.len() - 1];
            in_section = name.eq_ignore_ascii_case(VALIDATION_KEY_SECTION);
            continue;
        }
        if in_section {
            if let Some(token) = line.split_whitespace().next() {
                keys.insert(token.to_string());
            }
        }
    }
    keys
}

/// Fetch and parse the set of keys a domain vouches for.
///
/// The domain is validated before any network call. An absent or empty
/// validators section fails the same way a missing key later does.
pub async fn fetch_public_keys(
    fetcher: &dyn ManifestFetcher,
    domain: &str,
) -> Result<HashSet<String>> {
    validate::validate_domain(domain)?;
    let body = fetcher.fetch(domain).await?;
    let keys = parse_validation_keys(&body);
    if keys.is_empty() {
        tracing::debug!(domain, "manifest has no validation public keys");
        return Err(VouchError::ValidationPublicKeyNotFound(domain.to_string()));
    }
    tracing::debug!(domain, count = keys.len(), "parsed manifest key set");
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BODY: &str = "\
# example manifest
[domain]
ripple.com

[validation_public_key]
n949f75evCHwgyP4fPVgaHqNHxUVN15PsJEZ3B3HnXPcPjcZAoy7

[ips]
192.0.2.1 51235
";

    #[test]
    fn test_parses_keys_from_validators_section() {
        let keys = parse_validation_keys(BODY);
        assert_eq!(keys.len(), 1);
        assert!(keys.contains("n949f75evCHwgyP4fPVgaHqNHxUVN15PsJEZ3B3HnXPcPjcZAoy7"));
    }

    #[test]
    fn test_section_header_is_case_insensitive() {
        let body = "[Validation_Public_Key]\nnKey1\n";
        assert!(parse_validation_keys(body).contains("nKey1"));
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let body = "[validation_public_key]\n\n# a comment\nnKey1\n\nnKey2 trailing note\n";
        let keys = parse_validation_keys(body);
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("nKey1"));
        // Only the first whitespace-delimited field counts
        assert!(keys.contains("nKey2"));
    }

    #[test]
    fn test_ignores_unknown_sections() {
        let body = "[accounts]\nrSomeAccount\n[ips]\n192.0.2.1\n";
        assert!(parse_validation_keys(body).is_empty());
    }

    #[test]
    fn test_section_resets_at_next_header() {
        let body = "[validation_public_key]\nnKey1\n[ips]\n192.0.2.1\n";
        let keys = parse_validation_keys(body);
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_manifest_url() {
        assert_eq!(
            HttpManifestFetcher::manifest_url("ripple.com"),
            "https://ripple.com/ripple.txt"
        );
    }
}
