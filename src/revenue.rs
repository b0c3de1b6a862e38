use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};
use rust_decimal::Decimal;

use crate::ledger::PaidOrder;

/// Twelve calendar-month revenue accumulators, index 0 = January.
///
/// Built fresh per request; never persisted. Orders from different years
/// land in the same bucket when they share a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenueSeries {
    totals: [Decimal; 12],
}

impl RevenueSeries {
    pub fn zero() -> Self {
        Self {
            totals: [Decimal::ZERO; 12],
        }
    }

    pub fn totals(&self) -> &[Decimal; 12] {
        &self.totals
    }

    /// Sum across all twelve buckets
    pub fn grand_total(&self) -> Decimal {
        self.totals.iter().copied().sum()
    }

    fn add(&mut self, month0: usize, amount: Decimal) {
        self.totals[month0] += amount;
    }
}

/// Resolve the reporting offset from configured minutes, falling back to UTC
/// if the value is out of chrono's accepted range.
pub fn reporting_offset(offset_minutes: i32) -> FixedOffset {
    match FixedOffset::east_opt(offset_minutes * 60) {
        Some(offset) => offset,
        None => {
            tracing::warn!(
                "Reporting offset {} minutes out of range, using UTC",
                offset_minutes
            );
            Utc.fix()
        }
    }
}

/// Bucket paid-order revenue by calendar month.
///
/// Each order contributes the sum of its item prices to exactly one bucket,
/// chosen by the order's creation month after shifting the stored UTC
/// timestamp into the reporting offset. Addition is commutative, so the
/// result does not depend on input order.
pub fn monthly_revenue(orders: &[PaidOrder], offset: FixedOffset) -> RevenueSeries {
    let mut series = RevenueSeries::zero();

    for order in orders {
        let revenue_for_order: Decimal = order.item_prices.iter().copied().sum();

        let created = match DateTime::<Utc>::from_timestamp(order.created_at, 0) {
            Some(ts) => ts,
            None => {
                tracing::warn!(
                    "Order timestamp {} out of range, excluded from series",
                    order.created_at
                );
                continue;
            }
        };

        let month0 = created.with_timezone(&offset).month0() as usize;
        series.add(month0, revenue_for_order);
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
            .timestamp()
    }

    fn order(created_at: i64, prices: &[Decimal]) -> PaidOrder {
        PaidOrder {
            created_at,
            item_prices: prices.to_vec(),
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let series = monthly_revenue(&[], utc());
        assert_eq!(series.totals().len(), 12);
        assert!(series.totals().iter().all(|t| *t == Decimal::ZERO));
    }

    #[test]
    fn test_january_scenario() {
        let orders = vec![
            order(ts(2024, 1, 5, 12, 0), &[dec!(10.00), dec!(5.00)]),
            order(ts(2024, 1, 20, 12, 0), &[dec!(3.00)]),
        ];

        let series = monthly_revenue(&orders, utc());
        assert_eq!(series.totals()[0], dec!(18.00));
        for total in &series.totals()[1..] {
            assert_eq!(*total, Decimal::ZERO);
        }
    }

    #[test]
    fn test_order_with_no_items_contributes_zero() {
        let orders = vec![order(ts(2024, 3, 1, 0, 0), &[])];

        let series = monthly_revenue(&orders, utc());
        assert_eq!(series.grand_total(), Decimal::ZERO);
    }

    #[test]
    fn test_same_month_across_years_merges() {
        let orders = vec![
            order(ts(2023, 7, 1, 0, 0), &[dec!(1.50)]),
            order(ts(2024, 7, 31, 23, 59), &[dec!(2.50)]),
        ];

        let series = monthly_revenue(&orders, utc());
        assert_eq!(series.totals()[6], dec!(4.00));
    }

    #[test]
    fn test_conservation() {
        let orders = vec![
            order(ts(2024, 1, 1, 0, 0), &[dec!(10.00), dec!(0.05)]),
            order(ts(2024, 6, 15, 9, 30), &[dec!(99.99)]),
            order(ts(2024, 12, 31, 23, 0), &[dec!(0.01), dec!(0.01), dec!(0.01)]),
        ];
        let expected: Decimal = orders
            .iter()
            .flat_map(|o| o.item_prices.iter())
            .copied()
            .sum();

        let series = monthly_revenue(&orders, utc());
        assert_eq!(series.grand_total(), expected);
    }

    #[test]
    fn test_permutation_invariance() {
        let orders = vec![
            order(ts(2024, 2, 1, 0, 0), &[dec!(7.00)]),
            order(ts(2024, 2, 2, 0, 0), &[dec!(11.00)]),
            order(ts(2024, 9, 9, 0, 0), &[dec!(13.00)]),
        ];
        let reversed: Vec<PaidOrder> = orders.iter().rev().cloned().collect();

        assert_eq!(
            monthly_revenue(&orders, utc()),
            monthly_revenue(&reversed, utc())
        );
    }

    #[test]
    fn test_offset_moves_month_boundary_order() {
        // 23:30 UTC on Jan 31 is already February two hours east
        let orders = vec![order(ts(2024, 1, 31, 23, 30), &[dec!(5.00)])];

        let series_utc = monthly_revenue(&orders, utc());
        assert_eq!(series_utc.totals()[0], dec!(5.00));

        let series_east = monthly_revenue(&orders, reporting_offset(120));
        assert_eq!(series_east.totals()[0], Decimal::ZERO);
        assert_eq!(series_east.totals()[1], dec!(5.00));
    }

    #[test]
    fn test_out_of_range_reporting_offset_falls_back_to_utc() {
        assert_eq!(reporting_offset(100_000), utc());
    }

    #[test]
    fn test_invalid_timestamp_is_excluded() {
        let orders = vec![
            order(i64::MAX, &[dec!(5.00)]),
            order(ts(2024, 4, 1, 0, 0), &[dec!(2.00)]),
        ];

        let series = monthly_revenue(&orders, utc());
        assert_eq!(series.grand_total(), dec!(2.00));
    }
}
