//! View tracking against the persisted watermark
//!
//! The traffic endpoint only covers the last 14 days, so a cumulative count
//! has to be maintained across runs. The persisted watermark marks the last
//! fully-closed day already included; any newer closed day is added exactly
//! once, and today's still-changing count is displayed but never persisted.

use super::rate_limit::RateLimitGate;
use crate::config::Settings;
use crate::github::{ApiResult, ApiSource, DailyViews};
use crate::store::CounterStore;
use chrono::NaiveDate;
use std::collections::BTreeSet;

const LOG_TARGET: &str = "     views";

/// Finalized view metrics for the summary
#[derive(Debug)]
pub struct ViewMetrics {
    /// Cumulative count over closed days plus today's transient count
    pub total: u64,
    /// First day included in the count
    pub from_date: NaiveDate,
}

/// Per-day records merged against the watermark
#[derive(Debug, Default)]
struct MergedViews {
    /// Today's views; displayed but not persisted, the day is still open
    today_count: u64,
    /// Views on closed days newer than the watermark
    fresh: u64,
    /// Closed days that contributed to `fresh`
    observed: BTreeSet<NaiveDate>,
}

impl MergedViews {
    /// Fold one repository's records in. A record counts when its day is
    /// newer than the watermark and not today; with no watermark every
    /// closed day counts.
    fn merge(&mut self, records: &[DailyViews], today: NaiveDate, last_viewed: Option<NaiveDate>) {
        for record in records {
            let date = record.date();
            if date == today {
                self.today_count += record.count;
            } else if last_viewed.is_none_or(|last| date > last) {
                self.fresh += record.count;
                let _ = self.observed.insert(date);
            }
        }
    }
}

/// Merge freshly fetched per-day view counts with the persisted watermark.
pub async fn track<S: ApiSource, C: CounterStore>(
    source: &S,
    store: &C,
    settings: &Settings,
    repos: &BTreeSet<String>,
    today: NaiveDate,
) -> crate::Result<ViewMetrics> {
    let yesterday = today.pred_opt().expect("every representable day has a predecessor");

    let mut merged = MergedViews::default();
    let mut gate = RateLimitGate::new("traffic");

    for repo in repos {
        if gate.is_tripped() {
            break;
        }

        match source.traffic_views(repo).await {
            ApiResult::Success(records) => merged.merge(&records, today, settings.last_viewed),
            ApiResult::RateLimited(_) => gate.trip(),
            ApiResult::NotFound => {
                log::debug!(target: LOG_TARGET, "No traffic data for '{repo}'");
            }
            ApiResult::Failed(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch traffic for '{repo}': {e:#}");
            }
        }
    }

    // Candidate set for the earliest observed day; seeded so it is never
    // empty even when no record survived the watermark
    let mut observed = merged.observed;
    let _ = observed.insert(yesterday);
    if let Some(last) = settings.last_viewed {
        let _ = observed.insert(last);
    }
    let min_observed = *observed.iter().next().expect("observed set is seeded above");

    if settings.store_repo_views {
        let cumulative = settings.views_baseline + merged.fresh;
        store.set_cumulative_views(cumulative)?;

        // Yesterday is the latest fully-closed day; the watermark never
        // regresses because fetched records are at most 14 days old
        store.set_last_viewed(yesterday)?;

        let from_date = settings.first_viewed.unwrap_or(min_observed);
        store.set_first_viewed(from_date)?;

        log::info!(target: LOG_TARGET, "Counted {} new view(s), {} today", merged.fresh, merged.today_count);

        Ok(ViewMetrics {
            total: cumulative + merged.today_count,
            from_date,
        })
    } else {
        Ok(ViewMetrics {
            total: merged.fresh + merged.today_count,
            from_date: min_observed,
        })
    }
}
