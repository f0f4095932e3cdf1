use chrono::{DateTime, Duration, TimeZone, Utc};

/// Unmerged branches are held to a fixed 30-day bar, independent of the
/// configurable weeks threshold. The two bars are intentionally separate.
pub const ABANDON_WINDOW_DAYS: i64 = 30;

pub const REASON_MERGED_STALE: &str = "merged & stale";
pub const REASON_ABANDONED: &str = "older than a month";
pub const REASON_MERGED_NOT_STALE: &str = "merged but not stale";
pub const REASON_RECENT: &str = "recent activity";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationStatus {
    Unknown,
    Integrated,
    NotIntegrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Delete { reason: &'static str },
    WarnStale,
    Keep { reason: &'static str },
}

/// Cutoffs in unix seconds, computed once at sweep start so a long-running
/// sweep applies the same bars to every branch.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub now: i64,
    pub cutoff: i64,
    pub abandon_cutoff: i64,
}

impl Thresholds {
    pub fn from_weeks(weeks: u32) -> Self {
        Self::at(Utc::now(), weeks)
    }

    pub fn at(now: DateTime<Utc>, weeks: u32) -> Self {
        Self {
            now: now.timestamp(),
            cutoff: (now - Duration::weeks(i64::from(weeks))).timestamp(),
            abandon_cutoff: (now - Duration::days(ABANDON_WINDOW_DAYS)).timestamp(),
        }
    }

    pub fn cutoff_date(&self) -> String {
        format_date(self.cutoff)
    }
}

pub fn format_date(unix: i64) -> String {
    match Utc.timestamp_opt(unix, 0).single() {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "unknown".to_string(),
    }
}

/// Total mapping from (integration status, last activity) to a verdict.
/// Every swept branch receives exactly one verdict.
pub fn decide(status: IntegrationStatus, last_activity: i64, thresholds: &Thresholds) -> Verdict {
    match status {
        IntegrationStatus::Integrated => {
            if last_activity < thresholds.cutoff {
                Verdict::Delete {
                    reason: REASON_MERGED_STALE,
                }
            } else {
                Verdict::Keep {
                    reason: REASON_MERGED_NOT_STALE,
                }
            }
        }
        // The engine classifies before deciding, so Unknown only reaches
        // here through a direct call; treat it like unmerged work.
        IntegrationStatus::NotIntegrated | IntegrationStatus::Unknown => {
            if last_activity < thresholds.abandon_cutoff {
                Verdict::Delete {
                    reason: REASON_ABANDONED,
                }
            } else if last_activity < thresholds.cutoff {
                Verdict::WarnStale
            } else {
                Verdict::Keep {
                    reason: REASON_RECENT,
                }
            }
        }
    }
}
