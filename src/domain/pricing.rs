//! Reproduction of Sailwind's internal pricing curve.
//!
//! The game derives the unit sell price from a product's current supply
//! level with an asymmetric quadratic: above 0.5 supply the curve is
//! shallow, at or below 0.5 it drops steeply. All prices are in whole
//! currency units, rounded up.

/// Markup the game applies on top of the sell price when the player buys.
pub const BUY_MARKUP: f64 = 1.023;

/// Unit sell price for a product with the given converted base price at
/// the given supply level.
///
/// Supply is normally in [0, 1] but memory readings are not bounds-checked,
/// so the quadratic is evaluated as-is for out-of-range inputs.
pub fn sell_price(base_price: f64, supply: f64) -> i64 {
    // Strict comparison: supply exactly 0.5 is on the steep branch.
    let coeff = if supply > 0.5 { 0.38 } else { -1.68 };
    let price =
        (coeff * base_price / 10_000.0) * supply * supply - (coeff.abs() * base_price / 50.0) * supply
            + base_price;
    price.ceil() as i64
}

/// Unit buy price: the sell price plus the game's fixed markup.
pub fn buy_price(base_price: f64, supply: f64) -> i64 {
    markup(sell_price(base_price, supply))
}

/// Applies [`BUY_MARKUP`] to an already-computed sell price.
pub fn markup(sell_price: i64) -> i64 {
    (sell_price as f64 * BUY_MARKUP).ceil() as i64
}
