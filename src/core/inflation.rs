/// Deflates a nominal amount `years` into the future back to today's money.
///
/// `inflation_rate` is in percent. A rate of -100% or lower has no meaningful
/// discount factor, so the nominal value is returned unchanged.
pub fn real_value(nominal: f64, inflation_rate: f64, years: u32) -> f64 {
    let factor = 1.0 + inflation_rate / 100.0;
    if factor <= 0.0 {
        return nominal;
    }
    nominal / factor.powi(years as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_inflation_is_identity() {
        assert_eq!(real_value(123_456.0, 0.0, 20), 123_456.0);
    }

    #[test]
    fn one_year_at_six_percent() {
        assert!((real_value(106.0, 6.0, 1) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn positive_inflation_shrinks_value() {
        assert!(real_value(1_000.0, 6.0, 10) < 1_000.0);
    }
}
