use crate::{ModelUsage, PricingTable, Tip, TipKind, UsageAggregate};

const FREE_SHARE_TARGET: f64 = 0.3;
const CACHE_RATE_TARGET: f64 = 30.0;
const COST_RATIO_ALERT: f64 = 5.0;
const DAILY_SPEND_ALERT: f64 = 1.0;

fn tip(text: String, kind: TipKind) -> Tip {
    Tip { text, kind }
}

/// Derives the advisory tip list from the current aggregate and pricing
/// table. Never fails; a rule whose denominator is zero is skipped, and an
/// empty aggregate yields a single informational tip.
pub fn generate_tips(aggregate: &UsageAggregate, pricing: &PricingTable) -> Vec<Tip> {
    let models = &aggregate.models;
    let summary = &aggregate.summary;
    if models.is_empty() {
        return vec![tip("No usage data yet".to_string(), TipKind::Info)];
    }

    let mut tips = Vec::new();

    let top = &models[0];
    if top.cost > 0.0 {
        let pct = top.cost / summary.total_cost * 100.0;
        tips.push(tip(
            format!(
                "{} accounts for {:.1}% of total spend (${:.4})",
                top.key, pct, top.cost
            ),
            TipKind::Info,
        ));
    }

    let free: Vec<&ModelUsage> = models
        .iter()
        .filter(|model| {
            matches!(
                pricing.get(&model.key),
                Some(price) if price.input == 0.0 && price.output == 0.0
            )
        })
        .collect();
    if !free.is_empty() && summary.total_calls > 0 {
        let free_calls: u64 = free.iter().map(|model| model.calls).sum();
        let share = free_calls as f64 / summary.total_calls as f64;
        let kind = if share < FREE_SHARE_TARGET {
            TipKind::Warning
        } else {
            TipKind::Success
        };
        tips.push(tip(
            format!(
                "Free models handled {:.1}% of calls ({}/{}); route simple tasks there to cut spend",
                share * 100.0,
                free_calls,
                summary.total_calls
            ),
            kind,
        ));
    }

    let input: u64 = models.iter().map(|model| model.input).sum();
    let cache_read: u64 = models.iter().map(|model| model.cache_read).sum();
    if input + cache_read > 0 {
        let rate = cache_read as f64 / (input + cache_read) as f64 * 100.0;
        let kind = if rate > CACHE_RATE_TARGET {
            TipKind::Success
        } else {
            TipKind::Warning
        };
        tips.push(tip(
            format!(
                "Cache hit rate is {:.1}%; keeping a conversation in one session improves reuse",
                rate
            ),
            kind,
        ));
    }

    let paid: Vec<&ModelUsage> = models.iter().filter(|model| model.cost > 0.0).collect();
    if paid.len() >= 2 {
        // Already cost-sorted: first is the most expensive bucket.
        let expensive = paid[0];
        let cheap = paid[paid.len() - 1];
        if expensive.calls > 0 && cheap.calls > 0 {
            let expensive_avg = expensive.cost / expensive.calls as f64;
            let cheap_avg = cheap.cost / cheap.calls as f64;
            if expensive_avg > cheap_avg * COST_RATIO_ALERT {
                let ratio = (expensive_avg / cheap_avg).round();
                tips.push(tip(
                    format!(
                        "{} averages {:.0}x the per-call cost of {}; consider the cheaper model for simple tasks",
                        expensive.key, ratio, cheap.key
                    ),
                    TipKind::Warning,
                ));
            }
        }
    }

    if summary.today_cost > DAILY_SPEND_ALERT {
        tips.push(tip(
            format!("Spend today has reached ${:.2}", summary.today_cost),
            TipKind::Danger,
        ));
    }

    tips
}
