//! Proxy wallet address derivation (CREATE2).
//!
//! Pure and deterministic: the predicted address must match what the
//! on-chain factory produces when deploying with `salt = keccak256(owner)`.
//! No network calls — the session may trust a derived address before the
//! proxy exists on-chain.

use std::str::FromStr;

use alloy::primitives::{Address, B256, keccak256};

use super::error::SessionError;

/// A derivation scheme: factory + init code hash pair.
///
/// The current and legacy proxy factories each form one scheme; the
/// legacy scheme exists only for `LegacyWalletRecovery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationScheme {
    /// Factory contract that deploys proxies.
    pub factory: Address,
    /// keccak256 of the proxy creation code.
    pub init_code_hash: B256,
}

impl DerivationScheme {
    /// Derive the proxy address this scheme produces for an owner.
    ///
    /// `salt = keccak256(left_pad32(owner))`, then standard CREATE2:
    /// `keccak256(0xff ++ factory ++ salt ++ init_code_hash)[12..]`.
    pub fn derive(&self, owner: Address) -> Address {
        let mut padded = [0u8; 32];
        padded[12..].copy_from_slice(owner.as_slice());
        let salt = keccak256(padded);
        self.factory.create2(salt, self.init_code_hash)
    }
}

/// Derive a proxy address from string inputs at the API boundary.
///
/// Fails only on malformed input with `InvalidAddress`.
pub fn derive_proxy_address(
    owner: &str,
    factory: &str,
    init_code_hash: &str,
) -> Result<Address, SessionError> {
    let owner = parse_address(owner)?;
    let factory = parse_address(factory)?;
    let hash = B256::from_str(init_code_hash)
        .map_err(|_| SessionError::InvalidAddress(init_code_hash.to_string()))?;

    Ok(DerivationScheme { factory, init_code_hash: hash }.derive(owner))
}

/// Parse a checksummed or lowercase hex address.
pub fn parse_address(input: &str) -> Result<Address, SessionError> {
    Address::from_str(input).map_err(|_| SessionError::InvalidAddress(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme() -> DerivationScheme {
        DerivationScheme {
            factory: "0xaB45c5A4B0c941a2F231C04C3f49182e1A254052"
                .parse()
                .unwrap(),
            init_code_hash: keccak256(b"proxy-init-code"),
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let owner: Address = "0x56687bf447db6ffa42ffe2204a05edaa20f55839"
            .parse()
            .unwrap();
        let a = scheme().derive(owner);
        let b = scheme().derive(owner);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_owners_get_distinct_proxies() {
        let a = scheme().derive(Address::repeat_byte(0x11));
        let b = scheme().derive(Address::repeat_byte(0x22));
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_schemes_get_distinct_proxies() {
        let owner = Address::repeat_byte(0x33);
        let legacy = DerivationScheme {
            factory: scheme().factory,
            init_code_hash: keccak256(b"legacy-init-code"),
        };
        assert_ne!(scheme().derive(owner), legacy.derive(owner));
    }

    #[test]
    fn malformed_owner_is_invalid_address() {
        let result = derive_proxy_address(
            "not-an-address",
            "0xaB45c5A4B0c941a2F231C04C3f49182e1A254052",
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        );
        assert!(matches!(result, Err(SessionError::InvalidAddress(_))));
    }

    #[test]
    fn matches_manual_create2_computation() {
        let owner = Address::repeat_byte(0x44);
        let s = scheme();

        let mut padded = [0u8; 32];
        padded[12..].copy_from_slice(owner.as_slice());
        let salt = keccak256(padded);

        let mut preimage = Vec::with_capacity(85);
        preimage.push(0xff);
        preimage.extend_from_slice(s.factory.as_slice());
        preimage.extend_from_slice(salt.as_slice());
        preimage.extend_from_slice(s.init_code_hash.as_slice());
        let expected = Address::from_slice(&keccak256(&preimage)[12..]);

        assert_eq!(s.derive(owner), expected);
    }
}
