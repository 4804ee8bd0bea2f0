//! Thin CLI over the competition library: validate documents, print
//! standings and schedules, and record scores.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use volleyball_competition::{CompleteFlag, Competition, MatchEntry};

#[derive(Parser)]
#[command(name = "vbc")]
#[command(about = "Volleyball competition manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a competition document
    Validate {
        /// Competition JSON file
        file: PathBuf,
    },
    /// Print the standings table of a league group
    Standings {
        file: PathBuf,
        stage: String,
        group: String,
    },
    /// Print the full match schedule, breaks included
    Schedule { file: PathBuf },
    /// Record scores for a match and save the document back
    Score {
        file: PathBuf,
        stage: String,
        group: String,
        match_id: String,
        /// Home scores: one value for continuous, one per set for sets
        #[arg(long, value_delimiter = ',', required = true)]
        home: Vec<u32>,
        /// Away scores, same shape as --home
        #[arg(long, value_delimiter = ',', required = true)]
        away: Vec<u32>,
        /// Explicitly mark the match complete or incomplete
        #[arg(long)]
        complete: Option<bool>,
        /// Drop the explicit complete flag so completion is derived again
        #[arg(long, conflicts_with = "complete")]
        clear_complete: bool,
    },
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), volleyball_competition::CompetitionError> {
    match cli.command {
        Commands::Validate { file } => {
            let competition = Competition::load_file(&file)?;
            println!(
                "{} is valid: \"{}\", {} team(s), {} stage(s), {}",
                file.display(),
                competition.name,
                competition.teams.len(),
                competition.stages.len(),
                if competition.is_complete() {
                    "complete"
                } else {
                    "in progress"
                }
            );
        }
        Commands::Standings { file, stage, group } => {
            let competition = Competition::load_file(&file)?;
            let group = competition.group(&stage, &group)?;
            let Some(table) = group.standings() else {
                println!("group {} has no standings table", group.id());
                return Ok(());
            };
            println!(
                "{:<4} {:<20} {:>3} {:>3} {:>3} {:>3} {:>5} {:>5} {:>5}",
                "pos", "team", "P", "W", "L", "D", "PF", "PA", "PTS"
            );
            for (i, entry) in table.entries.iter().enumerate() {
                let team = competition.get_team(&entry.team_id);
                println!(
                    "{:<4} {:<20} {:>3} {:>3} {:>3} {:>3} {:>5} {:>5} {:>5}",
                    i + 1,
                    team.name,
                    entry.played,
                    entry.wins,
                    entry.losses,
                    entry.draws,
                    entry.points_for,
                    entry.points_against,
                    entry.league_points
                );
            }
        }
        Commands::Schedule { file } => {
            let competition = Competition::load_file(&file)?;
            for stage in &competition.stages {
                for group in stage.groups() {
                    println!("{} / {}", stage.id, group.id());
                    for entry in group.matches() {
                        match entry {
                            MatchEntry::Match(m) => {
                                let home = competition.get_team(&m.home_team.id);
                                let away = competition.get_team(&m.away_team.id);
                                println!(
                                    "  {} {} {}  {} v {}  {}",
                                    m.date.as_deref().unwrap_or("----------"),
                                    m.start.as_deref().unwrap_or("--:--"),
                                    m.id,
                                    home.name,
                                    away.name,
                                    if m.is_complete() { "done" } else { "" }
                                );
                            }
                            MatchEntry::Break(b) => {
                                println!(
                                    "  {} {} [{}]",
                                    b.date.as_deref().unwrap_or("----------"),
                                    b.start.as_deref().unwrap_or("--:--"),
                                    b.name.as_deref().unwrap_or("break")
                                );
                            }
                        }
                    }
                }
            }
        }
        Commands::Score {
            file,
            stage,
            group,
            match_id,
            home,
            away,
            complete,
            clear_complete,
        } => {
            let complete = if clear_complete {
                CompleteFlag::Clear
            } else {
                complete.map_or(CompleteFlag::Keep, CompleteFlag::Set)
            };
            let mut competition = Competition::load_file(&file)?;
            competition.update_match_scores(&stage, &group, &match_id, home, away, complete)?;
            competition.save()?;
            println!("recorded scores for {} in {}/{}", match_id, stage, group);
        }
    }
    Ok(())
}
