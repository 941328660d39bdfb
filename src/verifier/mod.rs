/// Verification orchestrator
///
/// Composes the codec, validators, ledger resolver and manifest fetcher
/// into the top-level question: which domain, if any, vouches for this
/// validation public key?
use std::collections::HashSet;

use url::Url;

use crate::ledger::{LedgerResolver, RippledClient};
use crate::manifest::{self, HttpManifestFetcher, ManifestFetcher};
use crate::{codec, validate, Result, VouchError};

/// Verifies the claimed domain of a validator identity.
///
/// Collaborators are held as trait objects so tests can substitute
/// in-memory fakes for the ledger and the manifest transport. The
/// verifier itself keeps no state between calls; repeated calls against
/// unchanged collaborators return identical results.
pub struct DomainVerifier {
    ledger: Box<dyn LedgerResolver>,
    manifests: Box<dyn ManifestFetcher>,
}

impl Default for DomainVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainVerifier {
    /// Verifier against the default public ledger cluster.
    pub fn new() -> Self {
        DomainVerifier {
            ledger: Box::new(RippledClient::default()),
            manifests: Box::new(HttpManifestFetcher::new()),
        }
    }

    /// Verifier against a specific rippled JSON-RPC endpoint.
    pub fn with_endpoint(endpoint: Url) -> Self {
        DomainVerifier {
            ledger: Box::new(RippledClient::new(endpoint)),
            manifests: Box::new(HttpManifestFetcher::new()),
        }
    }

    /// Verifier over arbitrary collaborators, for tests and embedders.
    pub fn with_collaborators(
        ledger: Box<dyn LedgerResolver>,
        manifests: Box<dyn ManifestFetcher>,
    ) -> Self {
        DomainVerifier { ledger, manifests }
    }

    /// The raw hex-encoded domain attribute of an account.
    pub async fn get_domain_hex_from_address(&self, address: &str) -> Result<String> {
        validate::validate_account_address(address)?;
        match self.ledger.domain_attribute(address).await? {
            Some(hex) => Ok(hex),
            None => Err(VouchError::AccountDomainNotFound(address.to_string())),
        }
    }

    /// The decoded, syntax-checked domain an account publishes.
    pub async fn get_domain_from_address(&self, address: &str) -> Result<String> {
        let hex = self.get_domain_hex_from_address(address).await?;
        let domain = codec::hex_to_text(&hex)?;
        validate::validate_domain(&domain)?;
        Ok(domain)
    }

    /// The set of validation public keys a domain's manifest vouches for.
    pub async fn get_validation_public_keys_from_domain(
        &self,
        domain: &str,
    ) -> Result<HashSet<String>> {
        manifest::fetch_public_keys(self.manifests.as_ref(), domain).await
    }

    /// Verify which domain vouches for a validation public key.
    ///
    /// Trust anchors at the master identity when one is known: a supplied
    /// master key wins, otherwise the ledger is asked whether the key is
    /// an ephemeral key with a delegating master. Anchoring at the master
    /// means ephemeral rotation never forces a new domain record. The
    /// match accepts either the validation key or the master key, since
    /// manifests list one or the other.
    pub async fn verify_validator_domain(
        &self,
        validation_public_key: &str,
        master_public_key: Option<&str>,
    ) -> Result<String> {
        // The supplied anchor must be a well-formed key before any
        // network call is made.
        codec::account_id_from_validation_key(
            master_public_key.unwrap_or(validation_public_key),
        )?;

        let supplied = master_public_key.map(str::to_string);
        let resolved = match &supplied {
            Some(_) => None,
            None => self.ledger.master_key(validation_public_key).await?,
        };
        let master = supplied.or(resolved);

        let anchor = master.as_deref().unwrap_or(validation_public_key);
        let address = codec::account_id_from_validation_key(anchor)?;
        tracing::debug!(key = anchor, address = %address, "resolved lookup account");

        let domain = self.get_domain_from_address(&address).await?;
        let keys = self.get_validation_public_keys_from_domain(&domain).await?;

        let matched = keys.contains(validation_public_key)
            || master.as_deref().is_some_and(|m| keys.contains(m));
        if matched {
            tracing::info!(domain = %domain, key = validation_public_key, "validator domain verified");
            Ok(domain)
        } else {
            Err(VouchError::ValidationPublicKeyNotFound(domain))
        }
    }
}
