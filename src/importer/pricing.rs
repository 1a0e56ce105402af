// ==========================================
// Vendi Backoffice - Automatic pricing calculator
// ==========================================
// Pure function: cost + markup% + rounding mode -> sale price.
// Arithmetic runs on integer cents; f64 only at the edges, so the
// batch path and the live preview endpoint produce identical values.
// ==========================================

use crate::domain::types::RoundingMode;

/// Minimum price enforced by the down_9_90 / up_9_90 modes.
pub const MIN_PRICE_9_90_CENTS: i64 = 990;

pub struct Calculator;

impl Calculator {
    /// Parse a cost value typed by the user (accepts comma or dot as
    /// the decimal separator). Returns None when blank or invalid.
    pub fn parse_cost(value: &str) -> Option<f64> {
        let s = value.trim();
        if s.is_empty() {
            return None;
        }
        s.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Calculate the sale price.
    ///
    /// # Arguments
    /// - cost: must be positive, else None
    /// - markup_percent: e.g. 35 for 35%
    /// - rounding_mode: see RoundingMode
    ///
    /// # Returns
    /// - Some(price): cents always end in 90; the two *_9_90 modes
    ///   never go below 9.90
    /// - None: cost missing/not positive
    pub fn calculate(cost: f64, markup_percent: f64, rounding_mode: RoundingMode) -> Option<f64> {
        if !cost.is_finite() || cost <= 0.0 {
            return None;
        }

        let raw_cents = Self::raw_price_cents(cost, markup_percent);
        let cents = Self::round_cents(raw_cents, rounding_mode);
        Some(cents as f64 / 100.0)
    }

    /// Convenience for string costs (live preview endpoint).
    pub fn calculate_str(
        cost: &str,
        markup_percent: f64,
        rounding_mode: RoundingMode,
    ) -> Option<f64> {
        Self::calculate(Self::parse_cost(cost)?, markup_percent, rounding_mode)
    }

    /// Raw price before mode rounding: cost * (1 + markup/100),
    /// rounded half-up to 2 decimal places.
    pub fn raw_price(cost: f64, markup_percent: f64) -> f64 {
        Self::raw_price_cents(cost, markup_percent) as f64 / 100.0
    }

    fn raw_price_cents(cost: f64, markup_percent: f64) -> i64 {
        let raw = cost * (1.0 + markup_percent / 100.0);
        // f64::round is half-away-from-zero, which is half-up for the
        // positive amounts reaching this point.
        (raw * 100.0).round() as i64
    }

    fn round_cents(raw_cents: i64, mode: RoundingMode) -> i64 {
        let result = match mode {
            RoundingMode::Down990 => Self::round_down_9_90(raw_cents),
            RoundingMode::Up990 => Self::round_up_9_90(raw_cents),
            RoundingMode::Cents90 => Self::round_cents_90(raw_cents),
        };

        match mode {
            RoundingMode::Down990 | RoundingMode::Up990 => result.max(MIN_PRICE_9_90_CENTS),
            RoundingMode::Cents90 => result,
        }
    }

    /// Round down to the previous X9.90 (56.50 -> 49.90, 10.00 -> 9.90).
    fn round_down_9_90(raw_cents: i64) -> i64 {
        let int = raw_cents.div_euclid(100);
        if int < 10 {
            return MIN_PRICE_9_90_CENTS;
        }

        let last_digit = int % 10;
        let mut base = if last_digit >= 9 {
            int
        } else {
            int - (last_digit + 1)
        };
        if base < 9 {
            base = 9;
        }
        base * 100 + 90
    }

    /// Round up to the next X9.90 (56.50 -> 59.90, 59.91 -> 69.90).
    fn round_up_9_90(raw_cents: i64) -> i64 {
        let int = (raw_cents + 99).div_euclid(100); // integer ceil
        if int <= 9 {
            return MIN_PRICE_9_90_CENTS;
        }

        let last_digit = int % 10;
        let base = if last_digit == 9 {
            int
        } else {
            int + (9 - last_digit)
        };
        base * 100 + 90
    }

    /// Keep the integer part, force cents to .90 (56.50 -> 56.90).
    fn round_cents_90(raw_cents: i64) -> i64 {
        raw_cents.div_euclid(100) * 100 + 90
    }
}
