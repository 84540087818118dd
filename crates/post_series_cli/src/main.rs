//! Command-line entry point for post series.
//!
//! # Responsibility
//! - Resolve settings, start logging, open the database.
//! - Run one maintenance command or serve JSON requests over stdin.

mod cli;
mod config;

use anyhow::{bail, Context};
use clap::Parser;
use cli::{Cli, Commands};
use config::{load_settings, Overrides, Settings};
use log::info;
use post_series_ajax::SeriesEndpoint;
use post_series_core::db::open_db;
use post_series_core::{
    core_version, init_logging, Capability, ItemListQuery, ItemService, ItemStatus, LogSettings,
    NonceAction, Series, SeriesPart, SeriesService, SqliteItemRepository, SqliteSeriesRepository,
};
use rusqlite::Connection;
use serde::Serialize;
use std::io::{BufRead, Write};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let overrides = Overrides {
        db_path: cli.db.clone(),
        log_level: cli.log_level.clone(),
        log_dir: cli.log_dir.clone(),
    };
    let settings = load_settings(cli.config.as_deref(), &overrides)?;

    if let Some(log_dir) = &settings.log_dir {
        let log_settings = LogSettings::new(&settings.log_level, log_dir)?;
        init_logging(&log_settings)?;
    }

    if let Commands::Version = cli.command {
        println!("post_series_core version={}", core_version());
        return Ok(());
    }

    let conn = open_db(&settings.db_path)
        .with_context(|| format!("failed to open database '{}'", settings.db_path.display()))?;
    info!(
        "event=cli_start module=cli status=ok command={}",
        command_name(&cli.command)
    );
    run(&cli, &settings, &conn)
}

fn run(cli: &Cli, settings: &Settings, conn: &Connection) -> anyhow::Result<()> {
    let series = SeriesService::new(SqliteSeriesRepository::try_new(conn)?);

    match &cli.command {
        Commands::AddItem { title, status } => {
            let status = parse_status(status)?;
            let items = ItemService::new(SqliteItemRepository::try_new(conn)?);
            let id = items.create_item(title, status)?;
            emit(cli.json, &serde_json::json!({ "id": id }), || {
                format!("item {id} ({status})")
            })
        }
        Commands::ListItems {
            status,
            limit,
            offset,
        } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let items = ItemService::new(SqliteItemRepository::try_new(conn)?);
            let listed = items.list_items(&ItemListQuery {
                status,
                limit: *limit,
                offset: *offset,
            })?;
            emit(cli.json, &listed, || {
                listed
                    .iter()
                    .map(|item| format!("{}\t{}\t{}", item.id, item.status, item.display_title()))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Commands::Rename { item_id, title } => {
            let items = ItemService::new(SqliteItemRepository::try_new(conn)?);
            let Some(mut item) = items.get_item(*item_id)? else {
                bail!("item {item_id} not found");
            };
            item.title = title.clone();
            items.update_item(&item)?;
            emit(cli.json, &item, || format!("item {item_id} renamed"))
        }
        Commands::Publish { item_id } => {
            let items = ItemService::new(SqliteItemRepository::try_new(conn)?);
            let item = items.publish(*item_id)?;
            emit(cli.json, &item, || format!("item {} ({})", item.id, item.status))
        }
        Commands::Trash { item_id } => {
            let items = ItemService::new(SqliteItemRepository::try_new(conn)?);
            items.trash_item(*item_id)?;
            emit(
                cli.json,
                &serde_json::json!({ "id": item_id, "status": ItemStatus::Trash }),
                || format!("item {item_id} ({})", ItemStatus::Trash),
            )
        }
        Commands::Capabilities => {
            let granted = capability_rows(&settings.capabilities);
            emit(cli.json, &granted, || {
                granted
                    .iter()
                    .map(|row| format!("{}\t{}", row.capability, row.description))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Commands::CreateSeries { name } => {
            let created = series.create_series(name)?;
            emit(cli.json, &created, || describe_series(&created))
        }
        Commands::ListSeries => {
            let all = series.list_series()?;
            emit(cli.json, &all, || {
                all.iter().map(describe_series).collect::<Vec<_>>().join("\n")
            })
        }
        Commands::Assign { item_id, series: series_id } => {
            series.assign_membership(*item_id, *series_id)?;
            emit(
                cli.json,
                &serde_json::json!({ "post_id": item_id, "series_id": series_id }),
                || match series_id {
                    Some(series_id) => format!("item {item_id} -> series {series_id}"),
                    None => format!("item {item_id} removed from its series"),
                },
            )
        }
        Commands::SetPart { item_id, part } => {
            series.set_part_number(*item_id, *part)?;
            let stored = series.part_number(*item_id)?;
            emit(
                cli.json,
                &serde_json::json!({ "post_id": item_id, "part": stored }),
                || match stored {
                    Some(part) => format!("item {item_id} is part {part}"),
                    None => format!("item {item_id} has no part number"),
                },
            )
        }
        Commands::Parts {
            series_id,
            current,
            published,
        } => {
            let parts = if *published {
                series.published_parts(*series_id)?
            } else {
                series.get_ordered_parts(*series_id, *current)?
            };
            emit(cli.json, &parts, || describe_parts(&parts))
        }
        Commands::Reorder { ids } => {
            let updated = series.apply_reorder(ids)?;
            emit(cli.json, &serde_json::json!({ "updated": updated }), || {
                format!("{updated} item(s) renumbered")
            })
        }
        Commands::Panel { item_id } => {
            let panel = series.editor_panel(*item_id)?;
            emit(cli.json, &panel, || {
                let selected = panel
                    .selected_series
                    .map_or_else(|| "none".to_string(), |id| id.to_string());
                let part = panel
                    .part_number
                    .map_or_else(|| "none".to_string(), |part| part.to_string());
                format!(
                    "series={selected} part={part} available={}",
                    panel.series.len()
                )
            })
        }
        Commands::Nonce { action } => {
            let Some(action) = NonceAction::parse(action) else {
                bail!("unknown action `{action}`");
            };
            if settings.session_key.is_none() {
                bail!("session_key is not configured; tokens would not outlive this process");
            }
            println!("{}", settings.session_guard().issue_nonce(action));
            Ok(())
        }
        Commands::Dispatch => {
            let endpoint = SeriesEndpoint::new(series, settings.session_guard());
            serve_lines(&endpoint)
        }
        Commands::Version => Ok(()),
    }
}

fn serve_lines<R, G>(endpoint: &SeriesEndpoint<R, G>) -> anyhow::Result<()>
where
    R: post_series_core::SeriesRepository,
    G: post_series_core::RequestGuard,
{
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    let mut handled = 0usize;

    for line in stdin.lock().lines() {
        let line = line.context("failed to read request line")?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(stdout, "{}", endpoint.handle_json(&line))?;
        stdout.flush()?;
        handled += 1;
    }

    info!("event=cli_dispatch module=cli status=ok handled={}", handled);
    Ok(())
}

fn emit<T: Serialize>(
    json: bool,
    value: &T,
    human: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        let text = human();
        if !text.is_empty() {
            println!("{text}");
        }
    }
    Ok(())
}

fn parse_status(raw: &str) -> anyhow::Result<ItemStatus> {
    match ItemStatus::parse(raw) {
        Some(status) => Ok(status),
        None => bail!("unknown status `{raw}`; expected publish|draft|pending|private|trash"),
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct CapabilityRow {
    capability: String,
    description: &'static str,
}

fn capability_rows(capabilities: &[Capability]) -> Vec<CapabilityRow> {
    capabilities
        .iter()
        .map(|capability| CapabilityRow {
            capability: capability.to_string(),
            description: capability.description(),
        })
        .collect()
}

fn describe_series(series: &Series) -> String {
    format!("{}\t{}\t{}", series.id, series.slug, series.name)
}

fn describe_parts(parts: &[SeriesPart]) -> String {
    parts
        .iter()
        .enumerate()
        .map(|(index, part)| {
            let marker = if part.is_current { " *" } else { "" };
            format!("{}. [{}] {}{marker}", index + 1, part.id, part.title)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::AddItem { .. } => "add-item",
        Commands::ListItems { .. } => "list-items",
        Commands::Rename { .. } => "rename",
        Commands::Publish { .. } => "publish",
        Commands::Trash { .. } => "trash",
        Commands::Capabilities => "capabilities",
        Commands::CreateSeries { .. } => "create-series",
        Commands::ListSeries => "list-series",
        Commands::Assign { .. } => "assign",
        Commands::SetPart { .. } => "set-part",
        Commands::Parts { .. } => "parts",
        Commands::Reorder { .. } => "reorder",
        Commands::Panel { .. } => "panel",
        Commands::Nonce { .. } => "nonce",
        Commands::Dispatch => "dispatch",
        Commands::Version => "version",
    }
}
