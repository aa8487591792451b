use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use futures::{stream, StreamExt, TryStreamExt};
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use crate::utils::time::{date_to_record_name, days_between, week_key};

use super::{
    entities::{Category, DailyLog, DraftBlockEntity, TimeEntryEntity, WeeklyGoal},
    DraftRepository, EntryStore,
};

const ENTRIES_DIR: &str = "entries";
const DAILY_DIR: &str = "daily";
const DRAFTS_DIR: &str = "drafts";
const GOALS_FILE: &str = "goals.json";
const CATEGORIES_FILE: &str = "categories.json";

/// Number of day files read concurrently when extracting a range.
const READ_AHEAD: usize = 4;

/// The main realization of [EntryStore]. Keeps data of a single user in `dir`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(dir.join(ENTRIES_DIR))?;
        std::fs::create_dir_all(dir.join(DAILY_DIR))?;
        Ok(Self { dir })
    }

    fn entries_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(ENTRIES_DIR).join(date_to_record_name(date))
    }

    fn daily_log_path(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(DAILY_DIR)
            .join(format!("{}.json", date_to_record_name(date)))
    }
}

#[async_trait]
impl EntryStore for FileStore {
    async fn fetch_entries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeEntryEntity>> {
        let days = stream::iter(days_between(start, end))
            .map(|day| read_lines::<TimeEntryEntity>(self.entries_path(day)))
            .buffered(READ_AHEAD)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(days.into_iter().flatten().collect())
    }

    async fn fetch_goals(&self) -> Result<Vec<WeeklyGoal>> {
        read_document(&self.dir.join(GOALS_FILE)).await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        read_document(&self.dir.join(CATEGORIES_FILE)).await
    }

    async fn fetch_daily_logs(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyLog>> {
        let logs = stream::iter(days_between(start, end))
            .map(|day| {
                let path = self.daily_log_path(day);
                async move { read_document::<Option<DailyLog>>(&path).await }
            })
            .buffered(READ_AHEAD)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(logs.into_iter().flatten().collect())
    }

    async fn append_entry(&self, entry: TimeEntryEntity) -> Result<()> {
        append_line(&self.entries_path(entry.date), &entry).await
    }

    async fn upsert_goal(&self, goal: WeeklyGoal) -> Result<()> {
        update_document(&self.dir.join(GOALS_FILE), |goals: &mut Vec<WeeklyGoal>| {
            match goals.iter().position(|v| v.category_id == goal.category_id) {
                Some(index) => goals[index] = goal,
                None => goals.push(goal),
            }
        })
        .await
    }

    async fn upsert_category(&self, category: Category) -> Result<()> {
        update_document(
            &self.dir.join(CATEGORIES_FILE),
            |categories: &mut Vec<Category>| match categories
                .iter()
                .position(|v| v.id == category.id)
            {
                Some(index) => categories[index] = category,
                None => categories.push(category),
            },
        )
        .await
    }

    async fn upsert_daily_log(&self, log: DailyLog) -> Result<()> {
        update_document(
            &self.daily_log_path(log.log_date),
            |stored: &mut Option<DailyLog>| *stored = Some(log),
        )
        .await
    }
}

/// File based [DraftRepository]. Every planner week is a separate JSON document.
pub struct FileDraftRepository {
    dir: PathBuf,
}

impl FileDraftRepository {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        let dir = dir.join(DRAFTS_DIR);
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn week_path(&self, week_start: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", week_key(week_start)))
    }
}

#[async_trait]
impl DraftRepository for FileDraftRepository {
    async fn get_draft_blocks(&self, week_start: NaiveDate) -> Result<Vec<DraftBlockEntity>> {
        read_document(&self.week_path(week_start)).await
    }

    async fn save_draft_blocks(
        &self,
        week_start: NaiveDate,
        blocks: Vec<DraftBlockEntity>,
    ) -> Result<()> {
        update_document(
            &self.week_path(week_start),
            |stored: &mut Vec<DraftBlockEntity>| *stored = blocks,
        )
        .await
    }
}

/// Reads a JSON lines file. Lines that can't be parsed are skipped, a missing file is empty.
async fn read_lines<T: DeserializeOwned>(path: PathBuf) -> Result<Vec<T>> {
    async fn extract<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, std::io::Error> {
        debug!("Extracting {path:?}");
        let file = File::open(path).await?;
        file.lock_shared()?;
        let mut lines = BufReader::new(file).lines();
        let mut values = vec![];
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(&line) {
                Ok(v) => values.push(v),
                Err(e) => {
                    // ignore illegal values, they may be left by an interrupted write
                    warn!("During parsing in path {path:?} found illegal json string {line}: {e}")
                }
            }
        }

        lines.into_inner().into_inner().unlock_async().await?;
        Ok(values)
    }

    match extract(&path).await {
        Ok(values) => Ok(values),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
        Err(e) => Err(e).with_context(|| format!("Failed to read records from {path:?}")),
    }
}

async fn append_line<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buffer = serde_json::to_vec(value)?;
    buffer.push(b'\n');

    let mut file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open {path:?}"))?;
    file.lock_exclusive()?;
    let result = async {
        file.write_all(&buffer).await?;
        file.flush().await
    }
    .await;
    file.unlock_async().await?;
    Ok(result?)
}

/// Reads a JSON document. A missing or empty file gives the default value.
async fn read_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e).with_context(|| format!("Failed to open {path:?}")),
    };
    file.lock_shared()?;
    let mut content = String::new();
    let read = file.read_to_string(&mut content).await;
    file.unlock_async().await?;
    read?;
    parse_document(path, &content)
}

/// Rewrites a JSON document while holding an exclusive lock, so concurrent writers don't lose
/// each other's updates.
async fn update_document<T, F>(path: &Path, update: F) -> Result<()>
where
    T: DeserializeOwned + Serialize + Default,
    F: FnOnce(&mut T),
{
    let mut file = File::options()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await
        .with_context(|| format!("Failed to open {path:?}"))?;

    file.lock_exclusive()?;
    let result = update_locked(&mut file, path, update).await;
    file.unlock_async().await?;
    result
}

async fn update_locked<T, F>(file: &mut File, path: &Path, update: F) -> Result<()>
where
    T: DeserializeOwned + Serialize + Default,
    F: FnOnce(&mut T),
{
    let mut content = String::new();
    file.read_to_string(&mut content).await?;
    let mut value = parse_document::<T>(path, &content)?;
    update(&mut value);

    let buffer = serde_json::to_vec_pretty(&value)?;
    file.rewind().await?;
    file.set_len(0).await?;
    file.write_all(&buffer).await?;
    file.flush().await?;
    Ok(())
}

fn parse_document<T: DeserializeOwned + Default>(path: &Path, content: &str) -> Result<T> {
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(content).with_context(|| format!("Corrupted document {path:?}"))
}
