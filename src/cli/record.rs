use anyhow::Result;
use chrono::Local;
use clap::{Args, Subcommand};
use tracing::info;

use crate::{
    engine::entry::WorkType,
    storage::{
        entities::{Category, DailyLog, DraftBlockEntity, TimeEntryEntity, TrackingMode, WeeklyGoal},
        EntryStore,
    },
    utils::time::week_start,
};

use super::{
    dates::{parse_day, parse_moment, DATE_EXAMPLES},
    CliContext, FileDashboard,
};

#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    #[arg(long, short, help = format!("Start of the session, now by default. {DATE_EXAMPLES}"))]
    at: Option<String>,
    #[arg(long, short, help = "Length of the session in minutes")]
    minutes: u32,
    #[arg(long = "type", short = 't', default_value = "deep")]
    work_type: WorkType,
    #[arg(long, short, help = "Category id")]
    category: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    #[command(about = "Record a finished session")]
    Log {
        #[command(flatten)]
        session: SessionArgs,
    },
    #[command(about = "Draft a block in the weekly planner")]
    Plan {
        #[command(flatten)]
        session: SessionArgs,
    },
    #[command(about = "Turn a planned block into a logged session")]
    Confirm {
        #[arg(help = "Id of the planned block")]
        id: String,
        #[arg(long, short, help = "Any day of the block's week, today by default")]
        week: Option<String>,
    },
    #[command(about = "Create or update a category")]
    Category {
        id: String,
        name: String,
        #[arg(long, default_value = "")]
        emoji: String,
        #[arg(long, default_value = "#808080")]
        color: String,
        #[arg(long, help = "Parent category id. Sub-categories don't take part in goals")]
        parent: Option<String>,
        #[arg(
            long,
            help = "How progress is tracked. Guessed from the name when omitted"
        )]
        mode: Option<TrackingMode>,
    },
    #[command(about = "Set the weekly goal of a category")]
    Goal {
        category: String,
        #[arg(help = "Target hours per week")]
        hours: f64,
        #[arg(long, help = "Keep the goal but stop tracking it")]
        disable: bool,
    },
    #[command(about = "Write the daily log")]
    Daily {
        #[arg(long, short, help = format!("Day of the log, today by default. {DATE_EXAMPLES}"))]
        date: Option<String>,
        #[arg(long, help = "Minutes spent on social media")]
        social_minutes: Option<u32>,
        #[arg(long)]
        notes: Option<String>,
    },
}

pub async fn process_record_command(
    dashboard: &FileDashboard,
    context: &CliContext,
    command: RecordCommand,
) -> Result<()> {
    match command {
        RecordCommand::Log { session } => {
            let entry = to_entity(session, context)?;
            dashboard.store().append_entry(entry.clone()).await?;
            info!("Logged {entry:?}");
            println!("Logged {} ({} minutes)", entry.id, entry.duration_minutes.unwrap_or(0));
        }
        RecordCommand::Plan { session } => {
            let entry = to_entity(session, context)?;
            let block = DraftBlockEntity {
                id: entry.id,
                date: entry.date,
                start_time: entry.time,
                duration_minutes: entry.duration_minutes,
                work_type: entry.work_type,
                category_id: entry.category_id,
                is_logged: false,
            };
            let (id, week) = (block.id.clone(), week_start(block.date));
            dashboard.plan_block(block).await?;
            println!("Planned {id} for the week of {week}");
        }
        RecordCommand::Confirm { id, week } => {
            let week = parse_day(week.as_deref(), context.date_style, "week")?;
            let entry = dashboard.confirm_block(week_start(week), &id).await?;
            println!("Logged {} on {} {}", entry.id, entry.date, entry.time);
        }
        RecordCommand::Category {
            id,
            name,
            emoji,
            color,
            parent,
            mode,
        } => {
            let tracking_mode = mode.unwrap_or_else(|| TrackingMode::infer_from_name(&name));
            dashboard
                .store()
                .upsert_category(Category {
                    id: id.into(),
                    name,
                    emoji,
                    color,
                    parent_id: parent.map(Into::into),
                    tracking_mode,
                })
                .await?;
        }
        RecordCommand::Goal {
            category,
            hours,
            disable,
        } => {
            dashboard
                .store()
                .upsert_goal(WeeklyGoal {
                    category_id: category.into(),
                    target_hours: hours.max(0.),
                    enabled: !disable,
                })
                .await?;
        }
        RecordCommand::Daily {
            date,
            social_minutes,
            notes,
        } => {
            let log_date = parse_day(date.as_deref(), context.date_style, "date")?;
            dashboard
                .store()
                .upsert_daily_log(DailyLog {
                    log_date,
                    social_media_minutes: social_minutes.map(i64::from),
                    notes,
                })
                .await?;
        }
    }
    Ok(())
}

fn to_entity(session: SessionArgs, context: &CliContext) -> Result<TimeEntryEntity> {
    let start = parse_moment(session.at.as_deref(), context.date_style, "start")?;
    Ok(TimeEntryEntity {
        id: new_id().into(),
        date: start.date(),
        time: start.time(),
        duration_minutes: Some(session.minutes.into()),
        work_type: session.work_type,
        category_id: session.category,
    })
}

/// Id derived from the creation time, unique per user.
fn new_id() -> String {
    Local::now().format("%Y%m%d%H%M%S%6f").to_string()
}
