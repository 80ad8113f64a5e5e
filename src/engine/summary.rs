use crate::domain::{Decimal, Position, SummaryStats};

/// Reduce a position set to portfolio statistics.
///
/// A closed position wins when its realized P/L (falling back to net P/L) is
/// strictly positive; every other closed position counts as a loss.
pub fn calculate_summary(positions: &[Position]) -> SummaryStats {
    let mut stats = SummaryStats::default();

    for position in positions {
        stats.total_pl += position.net_pl;
        stats.total_premium_collected += position.total_credit;

        if position.is_open() {
            stats.open_positions += 1;
            continue;
        }

        stats.closed_positions += 1;
        if position.realized_pl.unwrap_or(position.net_pl).is_positive() {
            stats.wins += 1;
        } else {
            stats.losses += 1;
        }
    }

    let decided = stats.wins + stats.losses;
    if decided > 0 {
        stats.win_rate = Decimal::from(stats.wins as i64) / Decimal::from(decided as i64);
    }
    stats
}
