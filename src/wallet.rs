// src/wallet.rs
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("no active wallet account")]
    NoActiveAccount,
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Narrow seam to whatever wallet the user connected. The service only needs
/// an active address to default the sender; `sign` is here for chain-backed
/// gateway implementations, which hand transactions to the wallet to sign.
pub trait WalletProvider: Send + Sync {
    fn active_address(&self) -> Option<String>;
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, WalletError>;
}

/// Development wallet configured through `VOTECHAIN_WALLET_ADDR`. It knows an
/// address but holds no key material, so it never signs anything.
pub struct EnvWallet {
    address: Option<String>,
}

impl EnvWallet {
    pub fn from_env() -> Self {
        let address = std::env::var("VOTECHAIN_WALLET_ADDR")
            .ok()
            .filter(|addr| !addr.is_empty());
        EnvWallet { address }
    }

    pub fn with_address(address: impl Into<String>) -> Self {
        EnvWallet {
            address: Some(address.into()),
        }
    }

    pub fn disconnected() -> Self {
        EnvWallet { address: None }
    }
}

impl WalletProvider for EnvWallet {
    fn active_address(&self) -> Option<String> {
        self.address.clone()
    }

    fn sign(&self, _payload: &[u8]) -> Result<Vec<u8>, WalletError> {
        Err(WalletError::Signing(
            "env wallet holds no signing key".into(),
        ))
    }
}
