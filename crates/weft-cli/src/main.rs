#![forbid(unsafe_code)]

mod output;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use output::OutputMode;
use weft_core::db::{
    loader::{LoadStats, Loader},
    open_graph,
    project::Projector,
    query,
};
use weft_core::{ErrorCode, config};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "weft: organizational process mining over event logs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Path of the SQLite graph store (overrides weft.toml).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Pipeline",
        about = "Load event-log files into the graph",
        long_about = "Load one or more semicolon-delimited event-log files into the graph. \
                      Work events accumulate: loading the same file twice doubles its rows.",
        after_help = "EXAMPLES:\n    # Load two logs\n    wf load sprint1.csv sprint2.csv\n\n    # Start from an empty graph\n    wf load sprint1.csv --clear"
    )]
    Load {
        /// Event-log files. Defaults to the files configured in weft.toml.
        files: Vec<PathBuf>,

        /// Clear the graph before loading.
        #[arg(long)]
        clear: bool,
    },

    #[command(
        next_help_heading = "Pipeline",
        about = "Derive collaboration and interaction edges",
        long_about = "Run both projection passes over the loaded work events. Projection is \
                      cumulative: re-running without a clear doubles every weight.",
        after_help = "EXAMPLES:\n    wf project"
    )]
    Project,

    #[command(
        next_help_heading = "Pipeline",
        about = "Clear, load, and project in one step",
        after_help = "EXAMPLES:\n    # Rebuild the graph from the configured logs\n    wf reload\n\n    # Rebuild from explicit files\n    wf reload sprint1.csv sprint2.csv --json"
    )]
    Reload {
        /// Event-log files. Defaults to the files configured in weft.toml.
        files: Vec<PathBuf>,
    },

    #[command(
        next_help_heading = "Pipeline",
        about = "Delete every node and relationship",
        long_about = "Delete every node and relationship in the graph. Destructive and \
                      immediate; there is no confirmation."
    )]
    Clear,

    #[command(
        next_help_heading = "Read",
        about = "Console analysis summary",
        long_about = "Print an analysis summary over the whole loaded range: organization \
                      snapshot, top role interactions, overtime risk, and longest projects."
    )]
    Report,

    #[command(next_help_heading = "Read", about = "Organization evolution over a month range")]
    Org {
        #[command(subcommand)]
        command: OrgCommands,
    },

    #[command(
        next_help_heading = "Read",
        about = "Ranked role-pair interactions",
        after_help = "EXAMPLES:\n    # Full ranking\n    wf interactions\n\n    # Strongest five\n    wf interactions --top 5"
    )]
    Interactions {
        /// Return only the strongest N interactions.
        #[arg(long)]
        top: Option<usize>,
    },

    #[command(next_help_heading = "Read", about = "Person-pair collaborations for one month")]
    Collab {
        /// Month bucket, YYYY-MM.
        month: String,
    },

    #[command(next_help_heading = "Read", about = "Collaboration totals per month")]
    Monthly {
        /// Restrict to one year (YYYY).
        #[arg(long)]
        year: Option<String>,
    },

    #[command(next_help_heading = "Read", about = "People most active outside 07:00-18:59")]
    Overtime,

    #[command(next_help_heading = "Read", about = "Longest cases by first-to-last event span")]
    Durations,

    #[command(next_help_heading = "Read", about = "Mean case duration in days")]
    AvgDuration,

    #[command(next_help_heading = "Read", about = "Slowest role-to-role handovers")]
    Handover,

    #[command(next_help_heading = "Read", about = "Work-event counts by weekday and hour")]
    Utilization,

    #[command(next_help_heading = "Read", about = "Role/interaction graph for diagramming")]
    Bpmn,

    #[command(next_help_heading = "Read", about = "List all roles")]
    Roles,

    #[command(next_help_heading = "Read", about = "List all people")]
    Users,
}

#[derive(Subcommand, Debug)]
enum OrgCommands {
    #[command(about = "Aggregate counters over a month range")]
    Snapshot {
        /// First month of the range, YYYY-MM.
        #[arg(long)]
        from: String,
        /// Last month of the range, YYYY-MM.
        #[arg(long)]
        to: String,
    },

    #[command(about = "Per-month counters over a range, zero-filled")]
    Trend {
        /// First month of the range, YYYY-MM.
        #[arg(long)]
        from: String,
        /// Last month of the range, YYYY-MM.
        #[arg(long)]
        to: String,
    },
}

impl Commands {
    /// Error code reported when a handler fails without a typed core error.
    const fn fallback_code(&self) -> ErrorCode {
        match self {
            Self::Load { .. } | Self::Project | Self::Reload { .. } | Self::Clear => {
                ErrorCode::InternalUnexpected
            }
            _ => ErrorCode::QueryFailed,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate result shapes
// ---------------------------------------------------------------------------

/// Result envelope for `wf load` and `wf reload`.
#[derive(Debug, Serialize)]
struct ReloadOutcome {
    rows_loaded: usize,
    rows_skipped: usize,
    files_loaded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    collaborations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interactions: Option<usize>,
}

/// Result envelope for `wf report`.
#[derive(Debug, Serialize)]
struct Report {
    snapshot: Option<query::OrgSnapshot>,
    top_interactions: Vec<query::RoleInteraction>,
    overtime: Vec<query::OvertimeRisk>,
    longest_projects: Vec<query::ProjectDuration>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let fallback = cli.command.fallback_code();
    if let Err(err) = run(cli) {
        output::render_error(&err, fallback);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("WEFT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mode = OutputMode::resolve(cli.json);
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let cfg = config::load_config(&cwd)?;
    let db_path = cli.db.unwrap_or_else(|| cfg.store.path.clone());
    tracing::debug!(db = %db_path.display(), "opening graph store");
    let conn = open_graph(&db_path)?;

    match cli.command {
        Commands::Load { files, clear } => {
            let files = files_or_config(files, &cfg)?;
            let loader = Loader::new(&conn);
            if clear {
                loader.clear()?;
            }
            let mut stats = LoadStats::default();
            for file in &files {
                stats.absorb(loader.load_file(file)?);
            }
            let outcome = ReloadOutcome {
                rows_loaded: stats.accepted,
                rows_skipped: stats.skipped,
                files_loaded: files.len(),
                collaborations: None,
                interactions: None,
            };
            render_outcome(mode, &outcome)
        }

        Commands::Project => {
            let stats = Projector::new(&conn).run()?;
            output::render(mode, &stats, |s, w| {
                output::kv(w, "Collaborations", s.collaborations.to_string())?;
                output::kv(w, "Interactions", s.interactions.to_string())
            })
        }

        Commands::Reload { files } => {
            let files = files_or_config(files, &cfg)?;
            let loader = Loader::new(&conn);
            loader.clear()?;
            let mut stats = LoadStats::default();
            for file in &files {
                stats.absorb(loader.load_file(file)?);
            }
            let projected = Projector::new(&conn).run()?;
            let outcome = ReloadOutcome {
                rows_loaded: stats.accepted,
                rows_skipped: stats.skipped,
                files_loaded: files.len(),
                collaborations: Some(projected.collaborations),
                interactions: Some(projected.interactions),
            };
            render_outcome(mode, &outcome)
        }

        Commands::Clear => {
            Loader::new(&conn).clear()?;
            output::render(mode, &serde_json::json!({ "cleared": true }), |_, w| {
                writeln!(w, "Graph cleared.")
            })
        }

        Commands::Report => render_report(mode, &conn),

        Commands::Org { command } => match command {
            OrgCommands::Snapshot { from, to } => {
                let snap = query::organization_snapshot(&conn, &from, &to)?;
                output::render(mode, &snap, |s, w| {
                    output::section(w, &format!("Organization {}", s.phase))?;
                    output::kv(w, "Active users", s.active_users.to_string())?;
                    output::kv(w, "Active roles", s.active_roles.to_string())?;
                    output::kv(w, "Total interactions", s.total_interactions.to_string())
                })
            }
            OrgCommands::Trend { from, to } => {
                let trend = query::organization_trend(&conn, &from, &to)?;
                output::render(mode, &trend, |points, w| {
                    writeln!(w, "{:<10} {:>6} {:>6} {:>13}", "month", "users", "roles", "interactions")?;
                    for p in points {
                        writeln!(
                            w,
                            "{:<10} {:>6} {:>6} {:>13}",
                            p.phase, p.active_users, p.active_roles, p.total_interactions
                        )?;
                    }
                    Ok(())
                })
            }
        },

        Commands::Interactions { top } => {
            let ranked = query::role_interactions(&conn, top)?;
            output::render(mode, &ranked, |rows, w| {
                writeln!(w, "{:<20} {:<20} {:>8}", "role a", "role b", "weight")?;
                for r in rows {
                    writeln!(w, "{:<20} {:<20} {:>8}", r.role_a, r.role_b, r.weight)?;
                }
                Ok(())
            })
        }

        Commands::Collab { month } => {
            let rows = query::user_collaboration(&conn, &month)?;
            output::render(mode, &rows, |rows, w| {
                for r in rows {
                    writeln!(
                        w,
                        "{} ({}) <-> {} ({}): {}",
                        r.user_a, r.role_a, r.user_b, r.role_b, r.weight
                    )?;
                }
                Ok(())
            })
        }

        Commands::Monthly { year } => {
            let rows = query::monthly_interactions(&conn, year.as_deref())?;
            output::render(mode, &rows, |rows, w| {
                for r in rows {
                    writeln!(w, "{:<10} {:>8}", r.month, r.total_interactions)?;
                }
                Ok(())
            })
        }

        Commands::Overtime => {
            let rows = query::overtime_risk(&conn)?;
            output::render(mode, &rows, |rows, w| {
                writeln!(w, "{:<20} {:<20} {:>8}", "person", "role", "events")?;
                for r in rows {
                    writeln!(w, "{:<20} {:<20} {:>8}", r.name, r.role, r.overtime_count)?;
                }
                Ok(())
            })
        }

        Commands::Durations => {
            let rows = query::project_durations(&conn)?;
            output::render(mode, &rows, |rows, w| {
                writeln!(w, "{:<32} {:>6}", "case", "days")?;
                for r in rows {
                    writeln!(w, "{:<32} {:>6}", r.case_id, r.duration_days)?;
                }
                Ok(())
            })
        }

        Commands::AvgDuration => {
            let avg = query::average_project_duration(&conn)?;
            output::render(
                mode,
                &serde_json::json!({ "avg_duration_days": avg }),
                |_, w| writeln!(w, "Average case duration: {avg} days"),
            )
        }

        Commands::Handover => {
            let rows = query::handover_flow(&conn)?;
            output::render(mode, &rows, |rows, w| {
                writeln!(w, "{:<20} {:<20} {:>10}", "from role", "to role", "avg hours")?;
                for r in rows {
                    writeln!(
                        w,
                        "{:<20} {:<20} {:>10}",
                        r.source_role, r.target_role, r.avg_duration_hours
                    )?;
                }
                Ok(())
            })
        }

        Commands::Utilization => {
            let rows = query::resource_utilization(&conn)?;
            output::render(mode, &rows, |rows, w| {
                writeln!(w, "{:>7} {:>4} {:>6}", "weekday", "hour", "count")?;
                for r in rows {
                    writeln!(w, "{:>7} {:>4} {:>6}", r.weekday, r.hour, r.count)?;
                }
                Ok(())
            })
        }

        Commands::Bpmn => {
            let graph = query::bpmn_export(&conn)?;
            output::render(mode, &graph, |g, w| {
                writeln!(w, "{} roles, {} interactions", g.nodes.len(), g.edges.len())?;
                for e in &g.edges {
                    writeln!(w, "{} -> {} [{}]", e.source, e.target, e.label)?;
                }
                Ok(())
            })
        }

        Commands::Roles => {
            let names = query::all_roles(&conn)?;
            render_names(mode, &names)
        }

        Commands::Users => {
            let names = query::all_users(&conn)?;
            render_names(mode, &names)
        }
    }
}

/// Fall back to the `weft.toml` ingest file list when no files were given.
fn files_or_config(files: Vec<PathBuf>, cfg: &config::WeftConfig) -> Result<Vec<PathBuf>> {
    if !files.is_empty() {
        return Ok(files);
    }
    let configured = cfg.ingest.resolved_files();
    if configured.is_empty() {
        bail!("no event-log files given and none configured under [ingest] in weft.toml");
    }
    Ok(configured)
}

fn render_outcome(mode: OutputMode, outcome: &ReloadOutcome) -> Result<()> {
    output::render(mode, outcome, |o, w| {
        output::kv(w, "Rows loaded", o.rows_loaded.to_string())?;
        output::kv(w, "Rows skipped", o.rows_skipped.to_string())?;
        output::kv(w, "Files loaded", o.files_loaded.to_string())?;
        if let (Some(c), Some(i)) = (o.collaborations, o.interactions) {
            output::kv(w, "Collaborations", c.to_string())?;
            output::kv(w, "Interactions", i.to_string())?;
        }
        Ok(())
    })
}

fn render_names(mode: OutputMode, names: &[String]) -> Result<()> {
    output::render(mode, &names, |names, w| {
        for name in *names {
            writeln!(w, "{name}")?;
        }
        Ok(())
    })
}

/// The `wf report` summary: snapshot over the loaded range plus the top
/// rankings, mirroring what an analyst checks first.
fn render_report(mode: OutputMode, conn: &rusqlite::Connection) -> Result<()> {
    let snapshot = match query::month_bounds(conn)? {
        Some((min, max)) => Some(query::organization_snapshot(conn, &min, &max)?),
        None => None,
    };
    let report = Report {
        snapshot,
        top_interactions: query::role_interactions(conn, Some(5))?,
        overtime: query::overtime_risk(conn)?,
        longest_projects: query::project_durations(conn)?,
    };

    output::render(mode, &report, |r, w| {
        match &r.snapshot {
            Some(s) => {
                output::section(w, &format!("Organization ({})", s.phase))?;
                output::kv(w, "Active users", s.active_users.to_string())?;
                output::kv(w, "Active roles", s.active_roles.to_string())?;
                output::kv(w, "Total interactions", s.total_interactions.to_string())?;
            }
            None => writeln!(w, "Graph is empty; run `wf reload` first.")?,
        }

        writeln!(w)?;
        output::section(w, "Top role interactions")?;
        for i in &r.top_interactions {
            writeln!(w, "{:<20} {:<20} {:>8}", i.role_a, i.role_b, i.weight)?;
        }

        writeln!(w)?;
        output::section(w, "Overtime risk")?;
        for o in &r.overtime {
            writeln!(w, "{:<20} {:<20} {:>8}", o.name, o.role, o.overtime_count)?;
        }

        writeln!(w)?;
        output::section(w, "Longest projects")?;
        for p in &r.longest_projects {
            writeln!(w, "{:<32} {:>6}", p.case_id, p.duration_days)?;
        }
        Ok(())
    })
}
