//! `fishbone` command line front end.
//!
//! # Responsibility
//! - Map subcommands onto `DiagramService` operations.
//! - Print results as JSON on stdout; errors go to stderr with their status.

use anyhow::Context;
use clap::{Parser, Subcommand};
use fishbone_core::{
    init_logging_from_config, open_db, seed_demo_data, CategorySeed, CommitMode, CoreConfig,
    DiagramEdit, DiagramService, ReplaceDiagramRequest, ServiceError, SqliteDiagramRepository,
    SqliteUserRepository,
};
use log::info;
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about = "Edit fishbone (cause-and-effect) diagrams")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "FISHBONE_DB_PATH")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true, env = "FISHBONE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "FISHBONE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Reject writes based on a stale revision instead of overwriting.
    #[arg(long, global = true)]
    checked: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all users
    Users,

    /// Create a user
    AddUser { name: String },

    /// Insert demo users and diagrams into an empty database
    Seed,

    /// List diagrams owned by a user
    List { owner: Uuid },

    /// Print one diagram
    Show {
        diagram: Uuid,

        /// Only show the diagram when it belongs to this user
        #[arg(long)]
        owner: Option<Uuid>,
    },

    /// Create a diagram for a user
    ///
    /// New diagrams start with the six standard categories unless
    /// `FISHBONE_SEED_CATEGORIES=false` is set or `--empty` is passed.
    Create {
        owner: Uuid,
        problem: String,

        /// Start with no categories instead of the six standard ones
        #[arg(long)]
        empty: bool,
    },

    /// Replace the problem statement
    SetProblem { diagram: Uuid, problem: String },

    /// Append a top-level category
    AddCategory {
        diagram: Uuid,
        name: String,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Append a sub-cause under an existing cause
    AddCause {
        diagram: Uuid,
        parent: Uuid,
        name: String,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Rename a cause and replace its notes
    EditCause {
        diagram: Uuid,
        cause: Uuid,
        name: String,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a cause and everything beneath it
    DeleteCause { diagram: Uuid, cause: Uuid },

    /// Move a cause under another cause, or to the top level
    MoveCause {
        diagram: Uuid,
        cause: Uuid,

        /// New parent; the cause becomes a top-level category when omitted
        #[arg(long)]
        parent: Option<Uuid>,

        /// Sibling index, clamped to the end
        #[arg(long)]
        position: Option<usize>,
    },

    /// Replace problem and causes from a JSON document
    ///
    /// The document has the shape `{"problem": "...", "causes": [...]}` with an
    /// optional `revision`.
    Replace {
        diagram: Uuid,

        /// JSON file to read, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Delete a diagram
    Delete { diagram: Uuid },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ServiceError>() {
                Some(service_err) => {
                    eprintln!("error[{}]: {service_err}", service_err.http_status())
                }
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<CoreConfig> {
    let mut config = CoreConfig::from_env().map_err(anyhow::Error::msg)?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    init_logging_from_config(&config).map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("opening database `{}`", config.db_path.display()))?;
    let diagrams = SqliteDiagramRepository::try_new(&conn)?;
    let users = SqliteUserRepository::try_new(&conn)?;

    if let Commands::Seed = cli.command {
        let written = seed_demo_data(&users, &diagrams)?;
        return print_json(&serde_json::json!({ "diagrams_created": written }));
    }

    let mode = if cli.checked {
        CommitMode::RevisionChecked
    } else {
        CommitMode::LastWriteWins
    };
    let service = DiagramService::with_commit_mode(diagrams, users, mode);
    info!(
        "event=cli_command module=cli status=start command={}",
        command_label(&cli.command)
    );

    match cli.command {
        Commands::Users => print_json(&service.list_users()?),
        Commands::AddUser { name } => print_json(&service.create_user(&name)?),
        Commands::Seed => Ok(()),
        Commands::List { owner } => print_json(&service.list_diagrams(owner)?),
        Commands::Show { diagram, owner } => {
            let found = match owner {
                Some(owner) => service.get_owned_diagram(owner, diagram)?,
                None => service.get_diagram(diagram)?,
            };
            print_json(&found)
        }
        Commands::Create {
            owner,
            problem,
            empty,
        } => {
            let seed = if empty {
                CategorySeed::Empty
            } else {
                config.category_seed()
            };
            print_json(&service.create_diagram(owner, &problem, seed)?)
        }
        Commands::SetProblem { diagram, problem } => {
            let edit = DiagramEdit::SetProblem { problem };
            print_json(&service.apply_edit(diagram, &edit)?)
        }
        Commands::AddCategory {
            diagram,
            name,
            notes,
        } => {
            let edit = DiagramEdit::AddCategory { name, notes };
            print_json(&service.apply_edit(diagram, &edit)?)
        }
        Commands::AddCause {
            diagram,
            parent,
            name,
            notes,
        } => {
            let edit = DiagramEdit::AddSubCause {
                parent_id: parent,
                name,
                notes,
            };
            print_json(&service.apply_edit(diagram, &edit)?)
        }
        Commands::EditCause {
            diagram,
            cause,
            name,
            notes,
        } => {
            let edit = DiagramEdit::EditCause {
                cause_id: cause,
                name,
                notes,
            };
            print_json(&service.apply_edit(diagram, &edit)?)
        }
        Commands::DeleteCause { diagram, cause } => {
            let edit = DiagramEdit::DeleteCause { cause_id: cause };
            print_json(&service.apply_edit(diagram, &edit)?)
        }
        Commands::MoveCause {
            diagram,
            cause,
            parent,
            position,
        } => {
            let edit = DiagramEdit::MoveCause {
                cause_id: cause,
                new_parent_id: parent,
                position,
            };
            print_json(&service.apply_edit(diagram, &edit)?)
        }
        Commands::Replace { diagram, input } => {
            let request = read_replace_request(&input)?;
            print_json(&service.replace_diagram(diagram, request)?)
        }
        Commands::Delete { diagram } => {
            let deleted = service.delete_diagram(diagram)?;
            print_json(&serde_json::json!({ "deleted": deleted }))
        }
    }
}

fn read_replace_request(input: &str) -> anyhow::Result<ReplaceDiagramRequest> {
    let text = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input).with_context(|| format!("reading `{input}`"))?
    };
    serde_json::from_str(&text).context("replace document is not valid JSON")
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn command_label(command: &Commands) -> &'static str {
    match command {
        Commands::Users => "users",
        Commands::AddUser { .. } => "add_user",
        Commands::Seed => "seed",
        Commands::List { .. } => "list",
        Commands::Show { .. } => "show",
        Commands::Create { .. } => "create",
        Commands::SetProblem { .. } => "set_problem",
        Commands::AddCategory { .. } => "add_category",
        Commands::AddCause { .. } => "add_cause",
        Commands::EditCause { .. } => "edit_cause",
        Commands::DeleteCause { .. } => "delete_cause",
        Commands::MoveCause { .. } => "move_cause",
        Commands::Replace { .. } => "replace",
        Commands::Delete { .. } => "delete",
    }
}
