//! Dashboard statistics over a window of recent donations
//!
//! Amounts are summed as plain numbers regardless of currency. Sums saturate
//! at `Decimal::MAX` instead of overflowing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Donation, PaymentMethod};

/// Number of distinct donor names shown on the dashboard
pub const RECENT_DONOR_LIMIT: usize = 5;

/// Number of days kept in the daily series
pub const DAILY_WINDOW: usize = 7;

const TREND_WINDOW: usize = 5;

/// Count and total for one grouping key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Number of donations
    pub count: usize,
    /// Sum of amounts
    pub amount: Decimal,
}

impl Bucket {
    fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.amount = saturating_add(self.amount, amount);
    }
}

fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(if b.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

/// Direction of recent activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Newer window raised more than the older one
    Increasing,
    /// Newer window raised less than the older one
    Decreasing,
    /// Both windows equal
    Stable,
}

/// Amount donated on one calendar day (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAmount {
    /// Day
    pub date: NaiveDate,
    /// Sum of amounts created that day
    pub amount: Decimal,
}

/// Summary rendered on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationStats {
    /// Donations considered
    pub count: usize,
    /// Sum of amounts
    pub total_amount: Decimal,
    /// Mean amount, zero when empty
    pub average_amount: Decimal,
    /// Per charity id
    pub by_charity: BTreeMap<String, Bucket>,
    /// Per payment method
    pub by_payment_method: BTreeMap<PaymentMethod, Bucket>,
    /// First names of non-anonymous donors, newest first, deduplicated
    pub recent_donors: Vec<String>,
    /// Activity trend
    pub trend: Trend,
    /// Latest days with donations, oldest first
    pub daily: Vec<DailyAmount>,
}

impl DonationStats {
    /// Summarize donations ordered newest first
    #[must_use]
    pub fn compute(donations: &[Donation]) -> Self {
        let mut total = Decimal::ZERO;
        let mut by_charity: BTreeMap<String, Bucket> = BTreeMap::new();
        let mut by_payment_method: BTreeMap<PaymentMethod, Bucket> = BTreeMap::new();
        let mut per_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        let mut recent_donors: Vec<String> = Vec::new();

        for donation in donations {
            total = saturating_add(total, donation.amount);
            by_charity
                .entry(donation.charity.clone())
                .or_default()
                .add(donation.amount);
            by_payment_method
                .entry(donation.payment_method)
                .or_default()
                .add(donation.amount);
            let day = per_day.entry(donation.created_at.date_naive()).or_default();
            *day = saturating_add(*day, donation.amount);

            let name = &donation.donor.first_name;
            if !donation.donor.is_anonymous
                && recent_donors.len() < RECENT_DONOR_LIMIT
                && !recent_donors.contains(name)
            {
                recent_donors.push(name.clone());
            }
        }

        let average_amount = if donations.is_empty() {
            Decimal::ZERO
        } else {
            total / Decimal::from(donations.len())
        };

        let skip = per_day.len().saturating_sub(DAILY_WINDOW);
        let daily = per_day
            .into_iter()
            .skip(skip)
            .map(|(date, amount)| DailyAmount { date, amount })
            .collect();

        Self {
            count: donations.len(),
            total_amount: total,
            average_amount,
            by_charity,
            by_payment_method,
            recent_donors,
            trend: trend(donations),
            daily,
        }
    }
}

/// Compare the amount raised by the newest window against the one before it
fn trend(donations: &[Donation]) -> Trend {
    let window_sum = |window: &[Donation]| {
        window
            .iter()
            .fold(Decimal::ZERO, |acc, d| saturating_add(acc, d.amount))
    };
    let split = donations.len().min(TREND_WINDOW);
    let (recent, rest) = donations.split_at(split);
    let older = &rest[..rest.len().min(TREND_WINDOW)];
    match window_sum(recent).cmp(&window_sum(older)) {
        std::cmp::Ordering::Greater => Trend::Increasing,
        std::cmp::Ordering::Less => Trend::Decreasing,
        std::cmp::Ordering::Equal => Trend::Stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DonationId, DonationStatus, Donor};
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn donation(name: &str, charity: &str, amount: i64, days_ago: i64, anon: bool) -> Donation {
        let base = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        Donation {
            id: DonationId::new(),
            donor: Donor {
                first_name: name.to_string(),
                last_name: "Doe".to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: None,
                is_anonymous: anon,
            },
            charity: charity.to_string(),
            amount: Decimal::from(amount),
            currency: "USD".to_string(),
            payment_method: if amount > 60 {
                PaymentMethod::Crypto
            } else {
                PaymentMethod::CreditCard
            },
            message: None,
            status: DonationStatus::Completed,
            transaction_hash: None,
            created_at: base - Duration::days(days_ago),
        }
    }

    #[test]
    fn empty_window() {
        let stats = DonationStats::compute(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total_amount, Decimal::ZERO);
        assert_eq!(stats.average_amount, Decimal::ZERO);
        assert_eq!(stats.trend, Trend::Stable);
        assert!(stats.daily.is_empty());
    }

    #[test]
    fn totals_and_buckets() {
        let donations = vec![
            donation("John", "global-water-foundation", 100, 0, false),
            donation("Jane", "education-for-all", 50, 1, false),
            donation("John", "global-water-foundation", 30, 1, false),
            donation("Anon", "education-for-all", 20, 2, true),
        ];
        let stats = DonationStats::compute(&donations);

        assert_eq!(stats.count, 4);
        assert_eq!(stats.total_amount, Decimal::from(200));
        assert_eq!(stats.average_amount, Decimal::from(50));
        assert_eq!(
            stats.by_charity["global-water-foundation"],
            Bucket { count: 2, amount: Decimal::from(130) }
        );
        assert_eq!(
            stats.by_payment_method[&PaymentMethod::CreditCard],
            Bucket { count: 3, amount: Decimal::from(100) }
        );
        assert_eq!(stats.recent_donors, vec!["John", "Jane"]);
        assert_eq!(stats.daily.len(), 3);
        assert_eq!(stats.daily[2].amount, Decimal::from(100));
    }

    #[test]
    fn trend_compares_windows() {
        let series = |amounts: &[i64]| -> Vec<Donation> {
            amounts
                .iter()
                .enumerate()
                .map(|(i, a)| donation("Lee", "education-for-all", *a, i as i64, false))
                .collect()
        };
        assert_eq!(trend(&[]), Trend::Stable);
        assert_eq!(trend(&series(&[10, 10])), Trend::Increasing);
        assert_eq!(trend(&series(&[10; 10])), Trend::Stable);
        assert_eq!(
            trend(&series(&[1, 1, 1, 1, 1, 50, 50, 50, 50, 50])),
            Trend::Decreasing
        );
        // only the ten newest count
        assert_eq!(
            trend(&series(&[10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 999])),
            Trend::Stable
        );
    }

    #[test]
    fn huge_amounts_saturate() {
        let mut donations = vec![
            donation("Max", "global-water-foundation", 1, 0, false),
            donation("Max", "global-water-foundation", 1, 0, false),
        ];
        for d in &mut donations {
            d.amount = Decimal::from_scientific("5e28").unwrap();
        }
        let stats = DonationStats::compute(&donations);
        assert_eq!(stats.total_amount, Decimal::MAX);
        assert_eq!(stats.by_charity["global-water-foundation"].amount, Decimal::MAX);
        assert_eq!(stats.daily[0].amount, Decimal::MAX);
        assert_eq!(stats.average_amount, Decimal::MAX / Decimal::from(2));
        assert_eq!(stats.trend, Trend::Increasing);
    }

    #[test]
    fn daily_series_keeps_latest_days() {
        let donations: Vec<Donation> = (0..10)
            .map(|d| donation("Kim", "childrens-health-fund", 10, d, false))
            .collect();
        let stats = DonationStats::compute(&donations);
        assert_eq!(stats.daily.len(), DAILY_WINDOW);
        assert!(stats.daily.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(stats.recent_donors, vec!["Kim"]);
    }
}
