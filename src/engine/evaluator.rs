//! # engine::evaluator
//!
//! **Position Evaluator**: unrealised gain as a fraction (0.05 = 5%).

use crate::models::Position;

/// Prefers the broker's own P/L fraction; otherwise derives it from the
/// average entry and current price.  `None` means the gain is unknown and the
/// position must not be sold.  A non-finite broker figure is unknown; it does
/// not fall through to the price formula.
pub fn gain_fraction(position: &Position) -> Option<f64> {
    if let Some(plpc) = position.unrealized_plpc {
        return plpc.is_finite().then_some(plpc);
    }

    match (position.current_price, position.avg_entry_price) {
        (Some(current), Some(avg)) if avg > 0.0 => Some((current - avg) / avg),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PositionSide;

    fn position(plpc: Option<f64>, avg: Option<f64>, current: Option<f64>) -> Position {
        Position {
            symbol:          "AAPL".to_string(),
            side:            PositionSide::Long,
            qty:             Some("10".to_string()),
            avg_entry_price: avg,
            current_price:   current,
            unrealized_plpc: plpc,
        }
    }

    #[test]
    fn broker_figure_wins() {
        assert_eq!(gain_fraction(&position(Some(0.08), Some(100.0), Some(101.0))), Some(0.08));
    }

    #[test]
    fn fallback_formula_is_exact_at_five_percent() {
        assert_eq!(gain_fraction(&position(None, Some(100.0), Some(105.0))), Some(0.05));
    }

    #[test]
    fn non_finite_broker_figure_is_unknown_even_with_prices() {
        assert_eq!(gain_fraction(&position(Some(f64::NAN), Some(100.0), Some(110.0))), None);
        assert_eq!(gain_fraction(&position(Some(f64::INFINITY), Some(100.0), Some(110.0))), None);
    }

    #[test]
    fn losses_are_negative() {
        assert_eq!(gain_fraction(&position(None, Some(200.0), Some(150.0))), Some(-0.25));
    }

    #[test]
    fn unknown_without_usable_prices() {
        assert_eq!(gain_fraction(&position(None, None, Some(105.0))), None);
        assert_eq!(gain_fraction(&position(None, Some(100.0), None)), None);
        assert_eq!(gain_fraction(&position(None, Some(0.0), Some(105.0))), None);
        assert_eq!(gain_fraction(&position(None, Some(-5.0), Some(105.0))), None);
    }
}
