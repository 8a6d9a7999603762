//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify address derivation, pricing, and order
//! book invariants across random inputs.

use proptest::prelude::*;

use alloy::primitives::{Address, B256, keccak256};

use polymarket_proxy_trader::domain::address::DerivationScheme;
use polymarket_proxy_trader::domain::book::OrderBookSnapshot;
use polymarket_proxy_trader::domain::intent::Side;
use polymarket_proxy_trader::usecases::pricer::buffered_price;

fn addr_from_bytes(bytes: [u8; 20]) -> Address {
    Address::from_slice(&bytes)
}

// ── Address Derivation Properties ───────────────────────────

proptest! {
    /// The same owner and scheme always derive the same proxy.
    #[test]
    fn derivation_is_a_pure_function(
        owner in any::<[u8; 20]>(),
        factory in any::<[u8; 20]>(),
        seed in any::<[u8; 32]>(),
    ) {
        let scheme = DerivationScheme {
            factory: addr_from_bytes(factory),
            init_code_hash: B256::from(seed),
        };
        let owner = addr_from_bytes(owner);
        prop_assert_eq!(scheme.derive(owner), scheme.derive(owner));
    }

    /// Changing the init code hash changes the derived address.
    #[test]
    fn init_code_hash_separates_schemes(
        owner in any::<[u8; 20]>(),
        factory in any::<[u8; 20]>(),
        seed in any::<[u8; 32]>(),
    ) {
        let current = DerivationScheme {
            factory: addr_from_bytes(factory),
            init_code_hash: B256::from(seed),
        };
        let legacy = DerivationScheme {
            factory: current.factory,
            init_code_hash: keccak256(seed),
        };
        prop_assume!(current.init_code_hash != legacy.init_code_hash);

        let owner = addr_from_bytes(owner);
        prop_assert_ne!(current.derive(owner), legacy.derive(owner));
    }
}

// ── Pricing Properties ──────────────────────────────────────

proptest! {
    /// A buffered buy price always pays at least the raw price and
    /// never exceeds the ceiling.
    #[test]
    fn buy_buffer_pays_up_within_the_ceiling(raw in 0.01f64..0.96) {
        let price = buffered_price(raw, Side::Buy, 0.03, 0.99);
        prop_assert!(price > raw, "buffered {price} must exceed raw {raw}");
        prop_assert!(price <= 0.99, "buffered {price} above ceiling");
    }

    /// A buffered sell price always gives way and never drops below
    /// the floor.
    #[test]
    fn sell_buffer_gives_way_within_the_floor(raw in 0.04f64..0.99) {
        let price = buffered_price(raw, Side::Sell, 0.03, 0.99);
        prop_assert!(price < raw, "buffered {price} must undercut raw {raw}");
        prop_assert!(price >= 0.01 - 1e-12, "buffered {price} below floor");
    }

    /// Buffering is monotone: a better raw price never produces a
    /// worse buffered price.
    #[test]
    fn buffering_is_monotone(
        raw1 in 0.01f64..0.95,
        delta in 0.001f64..0.04,
    ) {
        let raw2 = raw1 + delta;
        let p1 = buffered_price(raw1, Side::Buy, 0.03, 0.99);
        let p2 = buffered_price(raw2, Side::Buy, 0.03, 0.99);
        prop_assert!(p2 >= p1);
    }
}

// ── Order Book Properties ───────────────────────────────────

proptest! {
    /// Spread is non-negative whenever the book is crossed correctly,
    /// and depth equals the sum of level sizes.
    #[test]
    fn snapshot_invariants_hold(
        bid in 0.01f64..0.49,
        ask_gap in 0.0f64..0.5,
        sizes in prop::collection::vec(0.1f64..1000.0, 1..8),
    ) {
        let ask = bid + ask_gap;
        let bids: Vec<(f64, f64)> = sizes.iter().map(|s| (bid, *s)).collect();
        let asks: Vec<(f64, f64)> = sizes.iter().map(|s| (ask, *s)).collect();

        let book = OrderBookSnapshot::from_levels("tok", &bids, &asks);

        prop_assert!(book.spread >= 0.0);
        prop_assert_eq!(book.best_bid, Some(bid));
        prop_assert!(!book.is_low_liquidity);

        let total: f64 = sizes.iter().sum();
        prop_assert!((book.bid_depth - total).abs() < 1e-9);
        prop_assert!((book.ask_depth - total).abs() < 1e-9);
    }

    /// A one-sided book is always flagged as low liquidity.
    #[test]
    fn one_sided_books_are_low_liquidity(
        price in 0.01f64..0.99,
        size in 0.1f64..1000.0,
    ) {
        let book = OrderBookSnapshot::from_levels("tok", &[(price, size)], &[]);
        prop_assert!(book.is_low_liquidity);
        prop_assert_eq!(book.spread, 0.0);
    }
}
