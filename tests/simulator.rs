//! Price random-walk tests: bounds, flooring, and cent rounding.

use papertrade::simulator::{MAX_DRIFT, PRICE_FLOOR, drift_price, random_factor, round_price};

#[test]
fn round_price_snaps_to_cents() {
    assert_eq!(round_price(2540.754999), 2540.75);
    assert_eq!(round_price(2540.755001), 2540.76);
    assert_eq!(round_price(100.0), 100.0);
}

#[test]
fn drift_applies_factor_and_rounds() {
    assert_eq!(drift_price(100.0, 0.025), 102.5);
    assert_eq!(drift_price(100.0, -0.03), 97.0);
    assert_eq!(drift_price(1452.85, 0.0), 1452.85);
}

#[test]
fn drift_floors_at_one_cent() {
    assert_eq!(drift_price(0.01, -MAX_DRIFT), PRICE_FLOOR);
    assert_eq!(drift_price(0.005, 0.0), PRICE_FLOOR);
}

#[test]
fn drift_never_produces_nonpositive_price() {
    let mut rng = rand::thread_rng();
    let mut price = 0.01;
    for _ in 0..10_000 {
        price = drift_price(price, random_factor(&mut rng));
        assert!(price >= PRICE_FLOOR, "price fell to {price}");
    }
}

#[test]
fn random_factor_stays_in_bounds() {
    let mut rng = rand::thread_rng();
    for _ in 0..10_000 {
        let factor = random_factor(&mut rng);
        assert!((-MAX_DRIFT..=MAX_DRIFT).contains(&factor));
    }
}

#[test]
fn drift_tracks_a_realistic_walk() {
    // A long walk from a seed price stays positive and never gains more than
    // 3% per step.
    let mut rng = rand::thread_rng();
    let mut price = 2540.75;
    for _ in 0..1_000 {
        let next = drift_price(price, random_factor(&mut rng));
        assert!(next > 0.0);
        // Allow a cent of slack for rounding at either edge.
        assert!(next <= price * (1.0 + MAX_DRIFT) + 0.01);
        assert!(next >= (price * (1.0 - MAX_DRIFT) - 0.01).max(PRICE_FLOOR));
        price = next;
    }
}
