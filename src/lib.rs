pub mod codec;
pub mod ledger;
pub mod manifest;
pub mod validate;
pub mod verifier;

pub use crate::codec::hex_to_text;
pub use crate::ledger::{LedgerResolver, RippledClient};
pub use crate::manifest::{HttpManifestFetcher, ManifestFetcher};
pub use crate::validate::{validate_account_address, validate_domain};
pub use crate::verifier::DomainVerifier;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VouchError {
    #[error("invalid account address: {0}")]
    InvalidAccountAddress(String),

    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    #[error("account has no domain attribute: {0}")]
    AccountDomainNotFound(String),

    #[error("ripple.txt not found at domain: {0}")]
    RippleTxtNotFound(String),

    #[error("validation public key not found at domain: {0}")]
    ValidationPublicKeyNotFound(String),

    #[error("ledger transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ledger rpc error: {0}")]
    LedgerRpc(String),
}

impl VouchError {
    /// The offending input the error was raised for, when one exists.
    pub fn subject(&self) -> Option<&str> {
        match self {
            VouchError::InvalidAccountAddress(s)
            | VouchError::InvalidDomain(s)
            | VouchError::AccountDomainNotFound(s)
            | VouchError::RippleTxtNotFound(s)
            | VouchError::ValidationPublicKeyNotFound(s) => Some(s),
            VouchError::Transport(_) | VouchError::LedgerRpc(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VouchError>;
