//! Week window planning.
//!
//! Snapshots are cut backward from the latest observed day in whole
//! 7-day blocks. A trailing partial week at the start of the data is
//! discarded.

use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};

/// Days per week window.
pub const DAYS_PER_WEEK: i64 = 7;

/// An inclusive range of day indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    /// First day of the window
    pub start: i64,
    /// Last day of the window
    pub end: i64,
}

impl DayWindow {
    /// The 7-day block ending on `end`.
    pub fn week_ending(end: i64) -> Self {
        Self {
            start: end - DAYS_PER_WEEK + 1,
            end,
        }
    }

    /// Check if a day falls within this window.
    pub fn contains(&self, day: i64) -> bool {
        day >= self.start && day <= self.end
    }

    pub fn len_days(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// How many snapshots the observed day range supports for a lag depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPlan {
    pub min_day: i64,
    pub max_day: i64,
    pub num_days: i64,
    pub num_weeks: i64,
    /// Lag features per snapshot, including the target week
    pub lag_depth: usize,
    pub num_weeks_considered: usize,
}

impl WeekPlan {
    /// Plan snapshots from the observed day indices.
    ///
    /// Fails when there are no days, when `lag_depth` is zero, or when the
    /// history is too short for even one complete snapshot.
    pub fn from_days<I>(days: I, lag_depth: usize) -> Result<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        if lag_depth == 0 {
            return Err(PanelError::Configuration(
                "lag depth must be at least 1".to_string(),
            ));
        }

        let (min_day, max_day) = days
            .into_iter()
            .fold(None, |range: Option<(i64, i64)>, day| match range {
                Some((lo, hi)) => Some((lo.min(day), hi.max(day))),
                None => Some((day, day)),
            })
            .ok_or_else(|| {
                PanelError::Configuration("transaction table has no day indices".to_string())
            })?;

        let num_days = max_day - min_day + 1;
        let num_weeks = num_days / DAYS_PER_WEEK;
        // num_days >= 1, so num_weeks is never negative.
        let whole_weeks = num_weeks as u64;
        if lag_depth as u64 > whole_weeks {
            return Err(PanelError::Configuration(format!(
                "{num_days} days of history give {num_weeks} whole week(s), \
                 not enough for {lag_depth} lag week(s)"
            )));
        }

        Ok(Self {
            min_day,
            max_day,
            num_days,
            num_weeks,
            lag_depth,
            num_weeks_considered: (whole_weeks - lag_depth as u64 + 1) as usize,
        })
    }

    /// Cutoff day of snapshot `week`, counting back from the latest day.
    pub fn cutoff_day(&self, week: usize) -> i64 {
        self.max_day - week as i64 * DAYS_PER_WEEK
    }

    /// Cutoff days of all snapshots, latest first.
    pub fn cutoff_days(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.num_weeks_considered).map(move |week| self.cutoff_day(week))
    }

    /// Window for lag offset `lag` of the snapshot cut at `cutoff_day`.
    pub fn lag_window(cutoff_day: i64, lag: usize) -> DayWindow {
        DayWindow::week_ending(cutoff_day - lag as i64 * DAYS_PER_WEEK)
    }
}
