use std::{fs::File, io::Write, path::PathBuf};

use ansi_term::{Colour, Style};
use anyhow::Result;
use chrono::{Datelike, Months};
use clap::Subcommand;
use serde::Serialize;

use crate::{
    dashboard::{PeriodReport, WeekProgress},
    engine::{
        comparison::{MetricDelta, PeriodComparison, PeriodStats},
        entry::DateWindow,
        heatmap::{HeatmapGrid, HeatmapLevel},
        periods::Period,
        rollup::category_label,
    },
    utils::time::{format_minutes, round_hours},
};

use super::{
    dates::{parse_day, DATE_EXAMPLES},
    CliContext, FileDashboard,
};

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    #[command(about = "Totals of a day, week, month or year")]
    Summary {
        #[arg(default_value = "week")]
        period: Period,
        #[arg(long, short, help = format!("Any day inside the period, today by default. {DATE_EXAMPLES}"))]
        date: Option<String>,
    },
    #[command(about = "Progress towards weekly goals")]
    Goals {
        #[arg(long, short, help = format!("Any day of the week, today by default. {DATE_EXAMPLES}"))]
        date: Option<String>,
    },
    #[command(about = "Current and best run of tracked days")]
    Streak {
        #[arg(long, short, help = "First day to look at, a year ago by default")]
        since: Option<String>,
    },
    #[command(about = "Calendar of the year colored by tracked hours")]
    Heatmap {
        #[arg(long, short, help = "Year to draw, the current one by default")]
        year: Option<i32>,
    },
    #[command(about = "Compare a period with the one right before it")]
    Compare {
        #[arg(default_value = "month")]
        period: Period,
        #[arg(long, short, help = format!("Any day inside the period, today by default. {DATE_EXAMPLES}"))]
        date: Option<String>,
    },
    #[command(about = "Write finished sessions as CSV")]
    Export {
        #[arg(long, short, help = "First day, start of the current month by default")]
        start: Option<String>,
        #[arg(long, short, help = "Last day, today by default")]
        end: Option<String>,
        #[arg(long, short, help = "File to write into. Prints to stdout when omitted")]
        output: Option<PathBuf>,
    },
}

pub async fn process_report_command(
    dashboard: &FileDashboard,
    context: &CliContext,
    command: ReportCommand,
) -> Result<()> {
    let style = context.date_style;
    match command {
        ReportCommand::Summary { period, date } => {
            let anchor = parse_day(date.as_deref(), style, "date")?;
            let report = dashboard.period_report(period, anchor).await?;
            print_or_json(context, &report, print_report)
        }
        ReportCommand::Goals { date } => {
            let anchor = parse_day(date.as_deref(), style, "date")?;
            let progress = dashboard.week_progress(anchor).await?;
            print_or_json(context, &progress, |v| print!("{}", render_progress(v)))
        }
        ReportCommand::Streak { since } => {
            let since = match since {
                Some(v) => parse_day(Some(v.as_str()), style, "since")?,
                None => {
                    let today = dashboard.now().date();
                    today.checked_sub_months(Months::new(12)).unwrap_or(today)
                }
            };
            let streaks = dashboard.streaks(since).await?;
            print_or_json(context, &streaks, |v| {
                println!("Current streak\t{} days", v.current);
                println!("Best streak\t{} days", v.best);
            })
        }
        ReportCommand::Heatmap { year } => {
            let year = year.unwrap_or_else(|| dashboard.now().year());
            let grid = dashboard.heatmap(year).await?;
            print_or_json(context, &grid, |v| print!("{}", render_heatmap(v)))
        }
        ReportCommand::Compare { period, date } => {
            let anchor = parse_day(date.as_deref(), style, "date")?;
            let result = dashboard.compare_with_previous(period, anchor).await?;
            print_or_json(context, &result, |(current, previous, comparison)| {
                print_comparison(current, previous, comparison)
            })
        }
        ReportCommand::Export { start, end, output } => {
            let end = parse_day(end.as_deref(), style, "end")?;
            let start = match start {
                Some(v) => parse_day(Some(v.as_str()), style, "start")?,
                None => Period::Month.start_of(end),
            };
            let mut writer: Box<dyn Write + Send> = match &output {
                Some(path) => Box::new(File::create(path)?),
                None => Box::new(std::io::stdout()),
            };
            let rows = dashboard
                .export(DateWindow::from_days(start, end), &mut writer)
                .await?;
            if let Some(path) = output {
                println!("Exported {rows} sessions into {path:?}");
            }
            Ok(())
        }
    }
}

fn print_or_json<T: Serialize>(context: &CliContext, value: &T, print: impl FnOnce(&T)) -> Result<()> {
    if context.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print(value);
    }
    Ok(())
}

fn print_report(report: &PeriodReport) {
    let summary = &report.summary;
    println!(
        "{} {} - {}",
        report.period,
        summary.window.first_day(),
        summary.window.last_day()
    );
    println!("Total\t{}", format_minutes(summary.totals.total_minutes));
    println!(
        "Deep\t{}\tShallow\t{}\tRatio\t{}",
        format_minutes(summary.totals.deep_minutes),
        format_minutes(summary.totals.shallow_minutes),
        summary.deep_shallow_ratio
    );
    println!(
        "Active days\t{}/{}\tAverage\t{}",
        summary.days_active,
        summary.days_in_window,
        format_minutes(summary.average_minutes_per_active_day.round() as u64)
    );
    if summary.planned_minutes > 0 {
        println!("Planned\t{}", format_minutes(summary.planned_minutes));
    }
    println!();

    let mut categories = summary.categories.iter().collect::<Vec<_>>();
    categories.sort_by(|a, b| b.1.total_minutes.cmp(&a.1.total_minutes));
    for (key, totals) in categories {
        println!("{}h\t{}", round_hours(totals.total_minutes), category_label(key));
    }
    println!();

    let date_format = if report.period == Period::Year { "%B" } else { "%a %x" };
    for bucket in report.breakdown.iter().filter(|v| !v.totals.is_empty()) {
        println!(
            "{}\t{}",
            bucket.start.format(date_format),
            format_minutes(bucket.totals.total_minutes)
        );
    }
}

/// Header line plus one line per goal.
pub fn render_progress(progress: &WeekProgress) -> String {
    let mut out = format!(
        "Week of {}, {} days left\n",
        progress.window.first_day(),
        progress.days_remaining
    );
    for goal in &progress.goals {
        let mark = if goal.is_met() {
            Colour::Green.paint("✓")
        } else {
            Style::new().dimmed().paint("·")
        };
        out.push_str(&format!(
            "{mark} {}\t{:.1}/{:.1}h\t{}%\t{:.1}h/day needed\n",
            goal.category_id,
            goal.current_hours,
            goal.target_hours,
            goal.completion,
            goal.pace_needed_per_day
        ));
    }
    out
}

fn print_comparison(current: &PeriodStats, previous: &PeriodStats, comparison: &PeriodComparison) {
    println!(
        "{} - {} against {} - {}",
        current.window.first_day(),
        current.window.last_day(),
        previous.window.first_day(),
        previous.window.last_day()
    );
    print_delta("Hours", &comparison.hours);
    print_delta("Active days", &comparison.days_active);
    print_delta("Hours per active day", &comparison.average_hours_per_active_day);
}

fn print_delta(name: &str, delta: &MetricDelta) {
    println!(
        "{name}\t{:.1}\t{:.1}\t{} {:+.1}",
        delta.current, delta.previous, delta.trend, delta.difference
    );
}

fn heatmap_cell(level: HeatmapLevel) -> String {
    let colour = match level {
        HeatmapLevel::Outside => return " ".to_string(),
        HeatmapLevel::None => return Style::new().dimmed().paint("□").to_string(),
        HeatmapLevel::Light => Colour::Fixed(22),
        HeatmapLevel::Moderate => Colour::Fixed(28),
        HeatmapLevel::High => Colour::Fixed(34),
        HeatmapLevel::Intense => Colour::Fixed(40),
    };
    colour.paint("■").to_string()
}

/// One line per weekday, one column per week.
pub fn render_heatmap(grid: &HeatmapGrid) -> String {
    const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    let mut out = String::new();
    for (row, name) in WEEKDAYS.iter().enumerate() {
        out.push_str(name);
        out.push(' ');
        for week in grid {
            if let Some(cell) = week.get(row) {
                out.push_str(&heatmap_cell(cell.level));
            }
        }
        out.push('\n');
    }
    out
}
