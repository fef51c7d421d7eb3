use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use dayplan_core::time::parse_timezone;
use dayplan_core::{
    SchedulerKernel, TaskStatus, fill_today, focus_summary, normalize_records, project_focus,
    project_schedule,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod report;
mod state;

use config::{Config, load_config, resolve_path};

#[derive(Parser, Debug)]
#[command(
    name = "dayplan",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("DAYPLAN_BUILD_SHA"), ")"),
    about = "Plan today's time blocks from a task store export"
)]
struct Cli {
    /// Config file (default: ~/.dayplan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pack eligible tasks into today's blocks
    Plan {
        /// JSON task export (array, or object with `records`)
        #[arg(long)]
        tasks: PathBuf,

        /// JSON array of {start, end, kind} blocks (default: built from [day] config)
        #[arg(long)]
        blocks: Option<PathBuf>,

        /// Day to plan, YYYY-MM-DD (default: today in the configured timezone)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Plan tasks even when auto-schedule is off
        #[arg(long)]
        ignore_auto: bool,

        /// Re-plan tasks already marked Scheduled
        #[arg(long)]
        include_scheduled: bool,

        /// Print the full result as JSON
        #[arg(long, conflicts_with = "patches")]
        json: bool,

        /// Print store patches (JSON) instead of the plan
        #[arg(long)]
        patches: bool,
    },

    /// Top up the Today slate with a category-balanced pick
    FillToday {
        #[arg(long)]
        tasks: PathBuf,

        /// Slate size (default: [focus] target)
        #[arg(long)]
        target: Option<usize>,

        #[arg(long, conflicts_with = "patches")]
        json: bool,

        #[arg(long)]
        patches: bool,
    },

    /// Show the day template's blocks
    Blocks {
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        json: bool,
    },

    /// Configuration file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    // stdout carries results; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dayplan=info,dayplan_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(config_path)?,
            ConfigCommand::Show => {
                let cfg = load_config(config_path)?;
                println!("# {}", resolve_path(config_path)?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Plan {
            tasks,
            blocks,
            date,
            ignore_auto,
            include_scheduled,
            json,
            patches,
        } => {
            let cfg = load_config(config_path)?;
            let tz = timezone(&cfg)?;
            let day = date.unwrap_or_else(|| today(tz));

            let mut options = cfg.scheduler.clone();
            options.ignore_auto_flag |= ignore_auto;
            options.include_already_scheduled |= include_scheduled;
            let kernel = SchedulerKernel::new(options)?;

            let blocks = match blocks {
                Some(p) => input::read_blocks(&p)?,
                None => cfg.day.template.build(day, &cfg.day.timezone)?,
            };
            let records = input::read_records(&tasks)?;
            debug!(records = records.len(), blocks = blocks.len(), %day, "loaded inputs");

            let result = kernel
                .plan_records(day, &records, &blocks)
                .context("planning failed")?;

            if patches {
                print_json(&project_schedule(&result, &cfg.writeback))?;
            } else if json {
                print_json(&result)?;
            } else {
                report::print_plan(&result, tz);
            }
        }

        Command::FillToday {
            tasks,
            target,
            json,
            patches,
        } => {
            let cfg = load_config(config_path)?;
            let target = target.unwrap_or(cfg.focus.target);
            let map = cfg.category_map();

            let mut tasks = normalize_records(&input::read_records(&tasks)?);
            let fill = fill_today(&tasks, target, &map);

            if patches {
                print_json(&project_focus(&fill.picks))?;
            } else if json {
                print_json(&fill)?;
            } else {
                for t in tasks.iter_mut() {
                    if fill.picks.iter().any(|p| p.task.id == t.id) {
                        t.status = TaskStatus::Today;
                    }
                }
                let summary = focus_summary(&tasks, &map, target);
                report::print_fill(&fill, summary.as_deref());
            }
        }

        Command::Blocks { date, json } => {
            let cfg = load_config(config_path)?;
            let tz = timezone(&cfg)?;
            let day = date.unwrap_or_else(|| today(tz));
            let blocks = cfg.day.template.build(day, &cfg.day.timezone)?;
            if json {
                print_json(&blocks)?;
            } else {
                report::print_blocks(&blocks, tz);
            }
        }
    }

    Ok(())
}

fn timezone(cfg: &Config) -> Result<Tz> {
    parse_timezone(&cfg.day.timezone).context("[day] timezone")
}

fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
