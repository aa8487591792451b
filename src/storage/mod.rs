//! Storage is organized through two interfaces, [EntryStore] and [DraftRepository].
//! The basic idea of the file based implementation is:
//!  - Every user has a directory with all of their data.
//!  - Sessions are stored in per-day record files as JSON lines, so a date range only touches
//!    the files of that range.
//!  - Goals, categories, daily logs and planner drafts are small JSON documents that are
//!    rewritten as a whole.

pub mod entities;
pub mod file_store;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use entities::{Category, DailyLog, DraftBlockEntity, TimeEntryEntity, WeeklyGoal};

/// Interface of the store holding a user's records. Implementations are already scoped to a
/// single user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Sessions whose date falls between `start` and `end`, both inclusive.
    async fn fetch_entries(&self, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<TimeEntryEntity>>;

    async fn fetch_goals(&self) -> Result<Vec<WeeklyGoal>>;

    async fn fetch_categories(&self) -> Result<Vec<Category>>;

    /// Daily logs dated between `start` and `end`, both inclusive.
    async fn fetch_daily_logs(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyLog>>;

    async fn append_entry(&self, entry: TimeEntryEntity) -> Result<()>;

    /// There is at most one goal per category, the last write wins.
    async fn upsert_goal(&self, goal: WeeklyGoal) -> Result<()>;

    async fn upsert_category(&self, category: Category) -> Result<()>;

    async fn upsert_daily_log(&self, log: DailyLog) -> Result<()>;
}

/// Keeps blocks drafted in the weekly planner. Weeks are identified by their Monday.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftRepository: Send + Sync {
    async fn get_draft_blocks(&self, week_start: NaiveDate) -> Result<Vec<DraftBlockEntity>>;

    async fn save_draft_blocks(
        &self,
        week_start: NaiveDate,
        blocks: Vec<DraftBlockEntity>,
    ) -> Result<()>;
}
