use std::collections::BTreeMap;

use credit_core::adaptive::z_scores;
use credit_core::{CompanyProfile, Direction};
use serde::{Deserialize, Serialize};

/// Aggregated relationship with one counterparty in one direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyStat {
    pub counterparty_id: String,
    pub direction: Direction,
    pub total: f64,
    pub count: usize,
    pub mean: f64,
    /// Most frequent transaction type; "N/A" when none
    pub top_kind: String,
    /// Population z-score of `total` among the same-direction counterparties
    pub importance: f64,
}

#[derive(Default)]
struct Accumulator<'a> {
    total: f64,
    count: usize,
    kinds: BTreeMap<&'a str, usize>,
}

/// Counterparty statistics for one direction, largest total first.
pub fn stats(profile: &CompanyProfile, direction: Direction) -> Vec<CounterpartyStat> {
    let flows = profile.flows();
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for flow in flows.iter().filter(|f| f.direction == direction) {
        let acc = groups.entry(flow.counterparty_id.as_str()).or_default();
        acc.total += flow.amount;
        acc.count += 1;
        *acc.kinds.entry(flow.kind.as_str()).or_insert(0) += 1;
    }

    let totals: Vec<f64> = groups.values().map(|a| a.total).collect();
    let importance = z_scores(&totals);

    let mut out: Vec<CounterpartyStat> = groups
        .into_iter()
        .zip(importance)
        .map(|((counterparty, acc), z)| {
            // Ties go to the lexically first type
            let top_kind = acc
                .kinds
                .iter()
                .fold(None::<(&str, usize)>, |best, (kind, n)| match best {
                    Some((_, best_n)) if best_n >= *n => best,
                    _ => Some((*kind, *n)),
                })
                .map(|(kind, _)| kind.to_string())
                .unwrap_or_else(|| "N/A".to_string());

            CounterpartyStat {
                counterparty_id: counterparty.to_string(),
                direction,
                total: acc.total,
                count: acc.count,
                mean: if acc.count > 0 { acc.total / acc.count as f64 } else { 0.0 },
                top_kind,
                importance: z,
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.counterparty_id.cmp(&b.counterparty_id))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use credit_core::{CompanyMonthlyRecord, Transaction};

    fn tx(payer: &str, receiver: &str, amount: f64, kind: &str) -> Transaction {
        Transaction {
            payer_id: payer.to_string(),
            receiver_id: receiver.to_string(),
            amount,
            kind: kind.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        }
    }

    fn profile(txs: Vec<Transaction>) -> CompanyProfile {
        let record = CompanyMonthlyRecord {
            company_id: "A".to_string(),
            period: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            balance: 1.0,
            revenue: 1.0,
            sector: "Retail".to_string(),
        };
        CompanyProfile::new("A", vec![record], txs).unwrap()
    }

    #[test]
    fn test_outgoing_stats_sorted_by_total() {
        let p = profile(vec![
            tx("A", "B", 100.0, "PIX"),
            tx("A", "B", 300.0, "TED"),
            tx("A", "B", 50.0, "TED"),
            tx("A", "C", 900.0, "BOLETO"),
            tx("D", "A", 10.0, "PIX"),
        ]);
        let out = stats(&p, Direction::Outgoing);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].counterparty_id, "C");
        assert_eq!(out[1].count, 3);
        assert_eq!(out[1].top_kind, "TED");
        assert!((out[1].mean - 150.0).abs() < 1e-9);
        assert!(out[0].importance > 0.0 && out[1].importance < 0.0);
    }

    #[test]
    fn test_single_counterparty_has_zero_importance() {
        let p = profile(vec![tx("D", "A", 10.0, "PIX"), tx("D", "A", 20.0, "TED")]);
        let out = stats(&p, Direction::Incoming);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].importance, 0.0);
        // tie between PIX and TED resolves lexically
        assert_eq!(out[0].top_kind, "PIX");
        assert!(stats(&p, Direction::Outgoing).is_empty());
    }

    #[test]
    fn test_self_transfer_counts_on_both_sides() {
        let p = profile(vec![tx("A", "A", 40.0, "TED"), tx("A", "B", 60.0, "PIX")]);

        let outgoing = stats(&p, Direction::Outgoing);
        assert_eq!(outgoing.len(), 2);
        assert_eq!(outgoing[1].counterparty_id, "A");

        let incoming = stats(&p, Direction::Incoming);
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].counterparty_id, "A");
        assert_eq!(incoming[0].direction, Direction::Incoming);
        assert_eq!(incoming[0].total, 40.0);
    }
}
