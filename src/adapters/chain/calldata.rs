//! Raw Calldata Encoding - ERC-20 / ERC-1155 Call Building
//!
//! Builds calldata by hand: 4-byte selector from keccak256 of the
//! function signature, followed by 32-byte left-padded arguments.
//! Covers the reads the `ChainReader` needs and the writes the
//! approval batch and recovery transfer submit through the relayer.

use alloy::primitives::{Address, Bytes, U256, keccak256};

/// First four bytes of keccak256 over a function signature.
fn selector(signature: &[u8]) -> [u8; 4] {
    let hash = keccak256(signature);
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Left-pad an address to a 32-byte ABI word.
fn pad_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

/// Encode a bool as a 32-byte ABI word.
fn pad_bool(value: bool) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[31] = u8::from(value);
    word
}

/// `allowance(address,address)` read calldata.
pub fn erc20_allowance(owner: Address, spender: Address) -> Bytes {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&selector(b"allowance(address,address)"));
    data.extend_from_slice(&pad_address(owner));
    data.extend_from_slice(&pad_address(spender));
    Bytes::from(data)
}

/// `balanceOf(address)` read calldata.
pub fn erc20_balance_of(holder: Address) -> Bytes {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&selector(b"balanceOf(address)"));
    data.extend_from_slice(&pad_address(holder));
    Bytes::from(data)
}

/// `isApprovedForAll(address,address)` read calldata.
pub fn is_approved_for_all(owner: Address, operator: Address) -> Bytes {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&selector(b"isApprovedForAll(address,address)"));
    data.extend_from_slice(&pad_address(owner));
    data.extend_from_slice(&pad_address(operator));
    Bytes::from(data)
}

/// `approve(address,uint256)` write calldata.
pub fn erc20_approve(spender: Address, amount: U256) -> Bytes {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&selector(b"approve(address,uint256)"));
    data.extend_from_slice(&pad_address(spender));
    data.extend_from_slice(&amount.to_be_bytes::<32>());
    Bytes::from(data)
}

/// `setApprovalForAll(address,bool)` write calldata.
pub fn set_approval_for_all(operator: Address, approved: bool) -> Bytes {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&selector(b"setApprovalForAll(address,bool)"));
    data.extend_from_slice(&pad_address(operator));
    data.extend_from_slice(&pad_bool(approved));
    Bytes::from(data)
}

/// `transfer(address,uint256)` write calldata.
pub fn erc20_transfer(to: Address, amount: U256) -> Bytes {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&selector(b"transfer(address,uint256)"));
    data.extend_from_slice(&pad_address(to));
    data.extend_from_slice(&amount.to_be_bytes::<32>());
    Bytes::from(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Known selectors from the canonical ABI.
    #[test]
    fn selectors_match_canonical_values() {
        assert_eq!(selector(b"approve(address,uint256)"), [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(selector(b"transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector(b"balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(selector(b"allowance(address,address)"), [0xdd, 0x62, 0xed, 0x3e]);
        assert_eq!(
            selector(b"setApprovalForAll(address,bool)"),
            [0xa2, 0x2c, 0xb4, 0x65]
        );
        assert_eq!(
            selector(b"isApprovedForAll(address,address)"),
            [0xe9, 0x85, 0xe9, 0xc5]
        );
    }

    #[test]
    fn approve_calldata_layout() {
        let spender = Address::repeat_byte(0xaa);
        let data = erc20_approve(spender, U256::MAX);

        assert_eq!(data.len(), 68);
        assert_eq!(&data[0..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        // 12 zero bytes, then the address
        assert!(data[4..16].iter().all(|b| *b == 0));
        assert_eq!(&data[16..36], spender.as_slice());
        // max uint256 is all 0xff
        assert!(data[36..68].iter().all(|b| *b == 0xff));
    }

    #[test]
    fn set_approval_for_all_encodes_bool_in_last_byte() {
        let operator = Address::repeat_byte(0xbb);
        let data = set_approval_for_all(operator, true);

        assert_eq!(data.len(), 68);
        assert!(data[36..67].iter().all(|b| *b == 0));
        assert_eq!(data[67], 1);
    }

    #[test]
    fn transfer_calldata_carries_amount() {
        let to = Address::repeat_byte(0xcc);
        let data = erc20_transfer(to, U256::from(1_000_000u64));

        assert_eq!(data.len(), 68);
        let amount = U256::from_be_slice(&data[36..68]);
        assert_eq!(amount, U256::from(1_000_000u64));
    }
}
