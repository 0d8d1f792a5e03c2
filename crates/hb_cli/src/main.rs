//! Match store CLI
//!
//! Inspect, export and import stored handball matches without the UI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use hb_core::engine::stats;
use hb_core::{export_match_json, import_match_json, SaveManager};

#[derive(Parser)]
#[command(name = "hb_cli")]
#[command(about = "Inspect and manage stored handball matches", long_about = None)]
struct Cli {
    /// Match store directory (defaults to ./matches)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored matches, most recently saved first
    List {
        /// Only matches belonging to this account
        #[arg(long)]
        owner: Option<String>,
    },

    /// Print one match with its statistics
    Show {
        /// Match id
        id: Uuid,
    },

    /// Write a match as shareable JSON
    Export {
        /// Match id
        id: Uuid,

        /// Output file path (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Read a shared JSON export into the store
    Import {
        /// Input JSON file path
        file: PathBuf,
    },

    /// Remove a stored match
    Delete {
        /// Match id
        id: Uuid,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let manager = match cli.dir {
        Some(dir) => SaveManager::new(dir),
        None => SaveManager::default_dir(),
    };

    match cli.command {
        Commands::List { owner } => {
            let summaries = match owner {
                Some(ref owner) => manager.list_by_owner(owner),
                None => manager.list(),
            };
            if summaries.is_empty() {
                println!("No stored matches");
                return Ok(());
            }
            println!("📋 {} stored match(es)", summaries.len());
            for summary in &summaries {
                println!(
                    "   {}  {}  {}",
                    summary.id,
                    summary.format_timestamp(),
                    summary.get_display_text()
                );
            }
        }

        Commands::Show { id } => {
            let state = manager
                .load(id)
                .with_context(|| format!("Failed to load match {}", id))?;
            print_match(&state);
        }

        Commands::Export { id, out } => {
            let state = manager
                .load(id)
                .with_context(|| format!("Failed to load match {}", id))?;
            let json = export_match_json(&state);
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write export: {}", path.display()))?;
                    println!("✅ Exported match {} to {}", id, path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read export file: {}", file.display()))?;
            let Some(state) = import_match_json(&json) else {
                anyhow::bail!("❌ {} is not a valid match export", file.display());
            };
            manager.save(&state).context("Failed to store imported match")?;
            println!(
                "✅ Imported {} vs {} as match {}",
                state.metadata.our_team, state.metadata.opponent_team, state.id
            );
        }

        Commands::Delete { id } => {
            if !manager.exists(id) {
                anyhow::bail!("❌ No stored match {}", id);
            }
            manager.delete(id)?;
            println!("🗑️ Deleted match {}", id);
        }
    }

    Ok(())
}

fn print_match(state: &hb_core::MatchState) {
    println!(
        "🤾 {} vs {} ({}:{})",
        state.metadata.our_team, state.metadata.opponent_team, state.home_score, state.away_score
    );
    println!(
        "   Period {}, clock {}s, {} event(s)",
        state.current_period,
        state.game_time,
        state.events.len()
    );

    let report = stats::compute(state);
    println!(
        "\n   Team totals: {} goals / {} shots, {} saves, {} turnovers, {}×2', {} timeout(s)",
        report.our_totals.goals,
        report.our_totals.shots,
        report.our_totals.saves,
        report.our_totals.turnovers,
        report.our_totals.two_minutes,
        report.our_totals.timeouts
    );

    if !report.player_lines.is_empty() {
        println!("\n    #  Player              G/S    TO   2'    Time");
        for line in &report.player_lines {
            println!(
                "   {:>2}  {:<18} {:>2}/{:<3} {:>3} {:>3} {:>7}{}",
                line.number,
                line.name,
                line.goals,
                line.shots,
                line.turnovers,
                line.two_minutes,
                format_seconds(line.playing_time_secs),
                if line.disqualified { "  (sent off)" } else { "" }
            );
        }
    }

    if !report.shot_zones.is_empty() {
        println!("\n   Shots by zone:");
        for zone in &report.shot_zones {
            println!("   {:?}: {}/{}", zone.zone, zone.goals, zone.shots);
        }
    }
}

fn format_seconds(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
