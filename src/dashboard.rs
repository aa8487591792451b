use std::io::Write;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::{
    engine::{
        comparison::{compare, PeriodComparison, PeriodStats},
        entry::{ActivityEntry, DateWindow},
        goals::{weekly_progress, GoalProgress},
        heatmap::{heatmap, HeatmapGrid},
        normalize::normalize,
        periods::{breakdown, summarize, Bucket, Period, PeriodSummary},
        rollup::rollup,
        streak::{active_dates, streaks, Streaks},
    },
    export::write_csv,
    storage::{
        entities::{DraftBlockEntity, TimeEntryEntity},
        DraftRepository, EntryStore,
    },
    utils::{
        clock::Clock,
        time::{days_remaining_in_week, week_start},
    },
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub period: Period,
    pub summary: PeriodSummary,
    pub breakdown: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekProgress {
    pub window: DateWindow,
    pub days_remaining: u32,
    pub goals: Vec<GoalProgress>,
}

/// Bridges the stores and the engine. Every operation fetches what it needs, normalizes it and
/// runs the matching computation with "now" taken from the injected [Clock].
pub struct Dashboard<S: EntryStore, D: DraftRepository> {
    store: S,
    drafts: D,
    clock: Box<dyn Clock>,
}

impl<S: EntryStore, D: DraftRepository> Dashboard<S, D> {
    pub fn new(store: S, drafts: D, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            drafts,
            clock,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Logged sessions and planner drafts of the window as one list.
    #[instrument(skip(self))]
    pub async fn load_entries(&self, window: DateWindow) -> Result<Vec<ActivityEntry>> {
        let (first, last) = (window.first_day(), window.last_day());
        let logged = self.store.fetch_entries(first, last).await?;

        let mut weeks = vec![];
        let mut week = Some(week_start(first));
        while let Some(monday) = week.filter(|v| *v <= last) {
            weeks.push(monday);
            week = Period::Week.next_start(monday);
        }

        let drafts = try_join_all(weeks.into_iter().map(|v| self.drafts.get_draft_blocks(v)))
            .await?
            .into_iter()
            .flatten()
            .filter(|v| window.contains(NaiveDateTime::new(v.date, v.start_time)))
            .collect::<Vec<_>>();

        debug!("Loaded {} sessions and {} drafts", logged.len(), drafts.len());
        Ok(normalize(logged, drafts))
    }

    /// Totals of the `period` containing `anchor`, broken down into days (or months for a year).
    #[instrument(skip(self))]
    pub async fn period_report(&self, period: Period, anchor: NaiveDate) -> Result<PeriodReport> {
        let window = period.window_containing(anchor);
        let entries = self.load_entries(window).await?;
        let now = self.now();
        Ok(PeriodReport {
            period,
            summary: summarize(&entries, window, now),
            breakdown: breakdown(&entries, window, period.bucket(), now),
        })
    }

    /// Goal progress of the week containing `anchor`.
    #[instrument(skip(self))]
    pub async fn week_progress(&self, anchor: NaiveDate) -> Result<WeekProgress> {
        let window = Period::Week.window_containing(anchor);
        let (entries, goals, categories, daily_logs) = futures::try_join!(
            self.load_entries(window),
            self.store.fetch_goals(),
            self.store.fetch_categories(),
            self.store
                .fetch_daily_logs(window.first_day(), window.last_day()),
        )?;

        let today = self.clock.today();
        let days_remaining = if window.last_day() < today {
            0
        } else if window.first_day() > today {
            7
        } else {
            days_remaining_in_week(today)
        };

        let week_rollup = rollup(&entries, window, self.now());
        Ok(WeekProgress {
            window,
            days_remaining,
            goals: weekly_progress(&goals, &categories, &week_rollup, &daily_logs, days_remaining),
        })
    }

    /// Streaks over days tracked from `since` until today.
    #[instrument(skip(self))]
    pub async fn streaks(&self, since: NaiveDate) -> Result<Streaks> {
        let today = self.clock.today();
        let entries = self.load_entries(DateWindow::from_days(since, today)).await?;
        Ok(streaks(&active_dates(&entries, self.now()), today))
    }

    #[instrument(skip(self))]
    pub async fn heatmap(&self, year: i32) -> Result<HeatmapGrid> {
        let window = Period::Year.window_containing(
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| anyhow!("Unsupported year {year}"))?,
        );
        let entries = self.load_entries(window).await?;
        Ok(heatmap(&entries, year, self.now()))
    }

    /// Compares the `period` containing `anchor` with the one right before it.
    #[instrument(skip(self))]
    pub async fn compare_with_previous(
        &self,
        period: Period,
        anchor: NaiveDate,
    ) -> Result<(PeriodStats, PeriodStats, PeriodComparison)> {
        let current_window = period.window_containing(anchor);
        let previous_window = period.previous_window(current_window);
        let entries = self
            .load_entries(DateWindow::new(previous_window.start, current_window.end))
            .await?;
        let now = self.now();

        let current = PeriodStats::collect(&entries, current_window, now);
        let previous = PeriodStats::collect(&entries, previous_window, now);
        let comparison = compare(&current, &previous);
        Ok((current, previous, comparison))
    }

    pub async fn export(&self, window: DateWindow, writer: &mut (impl Write + Send)) -> Result<usize> {
        let entries = self.load_entries(window).await?;
        let rows = write_csv(&entries, self.now(), writer)?;
        info!("Exported {rows} rows");
        Ok(rows)
    }

    pub async fn plan_block(&self, block: DraftBlockEntity) -> Result<()> {
        let week = week_start(block.date);
        let mut blocks = self.drafts.get_draft_blocks(week).await?;
        blocks.push(block);
        self.drafts.save_draft_blocks(week, blocks).await
    }

    /// Turns a planner block into a logged session. The draft stays in the planner, flagged as
    /// logged, so it isn't counted twice.
    ///
    /// The flag is persisted before the session is appended. If appending fails the flag is
    /// cleared again, so a failure on either side never leaves the block counted both as logged
    /// and as planned.
    #[instrument(skip(self))]
    pub async fn confirm_block(&self, week: NaiveDate, id: &str) -> Result<TimeEntryEntity> {
        let mut blocks = self.drafts.get_draft_blocks(week).await?;
        let index = blocks
            .iter()
            .position(|v| v.id.as_ref() == id)
            .ok_or_else(|| anyhow!("No planned block {id} in week of {week}"))?;
        let block = &mut blocks[index];
        if block.is_logged {
            return Err(anyhow!("Block {id} was already logged"));
        }
        block.is_logged = true;

        let entry = TimeEntryEntity {
            id: block.id.clone(),
            date: block.date,
            time: block.start_time,
            duration_minutes: block.duration_minutes,
            work_type: block.work_type,
            category_id: block.category_id.clone(),
        };
        self.drafts.save_draft_blocks(week, blocks.clone()).await?;

        if let Err(e) = self.store.append_entry(entry.clone()).await {
            blocks[index].is_logged = false;
            if let Err(rollback) = self.drafts.save_draft_blocks(week, blocks).await {
                error!("Failed to restore planned block {id}: {rollback:?}");
            }
            return Err(e.context(format!("Failed to log planned block {id}")));
        }
        Ok(entry)
    }
}
