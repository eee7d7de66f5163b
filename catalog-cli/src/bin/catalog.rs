//! Course Catalog CLI
//!
//! Manage course types, courses, offerings and student registrations stored
//! in a local data directory.
//!
//! # Commands
//!
//! - `type` - Add, rename, delete and list course types
//! - `course` - Add, rename, delete and list courses
//! - `offering` - Pair courses with course types, filter by type
//! - `student` - Register students and list an offering's roster
//! - `show` - Print the whole dataset as JSON
//!
//! # Examples
//!
//! ```bash
//! catalog type add Lecture
//! catalog course add Algorithms
//!
//! # Pick course and type from lists on a terminal
//! catalog offering add
//!
//! # Or pass ids directly
//! catalog offering add --course 1700000000002 --type 1700000000001
//! catalog student register 1700000000003 Alice
//! catalog student list 1700000000003
//!
//! # Deleting a type removes its offerings and their registrations
//! catalog type rm 1700000000001 --yes
//! ```

use anyhow::{Context, Result};
use catalog_cli::render::{format_cascade, format_offering, format_roster, format_row, Roster};
use catalog_cli::validation::{parse_id, parse_offering_selection, parse_optional_id};
use catalog_cli::{Backend, CatalogConfig, InputError, NamedKind};
use catalog_core::{CatalogStore, EntityId, KeyValueStorage};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

type Store = CatalogStore<Box<dyn KeyValueStorage>>;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(version, about = "Manage course types, courses, offerings and registrations", long_about = None)]
struct Cli {
    /// Directory holding the catalog data
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Storage backend (files, sqlite)
    #[arg(long, global = true, default_value = "files")]
    backend: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage course types
    Type {
        #[command(subcommand)]
        command: NamedCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        command: NamedCommands,
    },

    /// Manage course offerings
    Offering {
        #[command(subcommand)]
        command: OfferingCommands,
    },

    /// Register students and view rosters
    Student {
        #[command(subcommand)]
        command: StudentCommands,
    },

    /// Print the whole dataset as JSON
    Show,
}

#[derive(Subcommand)]
enum NamedCommands {
    /// Create a new entry
    Add {
        /// Name (must not be blank)
        name: String,
    },

    /// Rename an entry (existing offerings keep their names)
    Rename {
        /// Id of the entry
        id: String,

        /// New name
        name: String,
    },

    /// Delete an entry and every offering that uses it
    Rm {
        /// Id of the entry
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List all entries
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum OfferingCommands {
    /// Create an offering from a course and a course type
    Add {
        /// Course id (prompted for on a terminal if omitted)
        #[arg(long)]
        course: Option<String>,

        /// Course type id (prompted for on a terminal if omitted)
        #[arg(long = "type", value_name = "TYPE")]
        course_type: Option<String>,
    },

    /// Point an offering at another course and course type
    Update {
        /// Offering id
        id: String,

        /// New course id
        #[arg(long)]
        course: Option<String>,

        /// New course type id
        #[arg(long = "type", value_name = "TYPE")]
        course_type: Option<String>,
    },

    /// Delete an offering and its registrations
    Rm {
        /// Offering id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List offerings, optionally only those of one course type
    List {
        /// Course type id to filter by
        #[arg(long = "type", value_name = "TYPE")]
        course_type: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum StudentCommands {
    /// Register a student for an offering
    Register {
        /// Offering id
        offering: String,

        /// Student name (must not be blank)
        name: String,
    },

    /// List the students registered for an offering
    List {
        /// Offering id
        offering: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Terminal capabilities for the current run
struct Ui {
    interactive: bool,
}

impl Ui {
    fn success(&self, message: &str) {
        println!("{} {}", "✅".green(), message.green().bold());
    }

    fn notice(&self, message: &str) {
        println!("{} {}", "⚠️ ".yellow(), message.yellow());
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", format!("❌ {}", message).red().bold());
    }

    /// Ask before a destructive action; always true when not on a terminal
    fn confirm(&self, prompt: &str, skip: bool) -> Result<bool> {
        if skip || !self.interactive {
            return Ok(true);
        }

        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        Ok(answer)
    }

    /// Let the user pick one entry; `None` if cancelled or nothing to pick
    fn select(&self, prompt: &str, entries: &[(EntityId, String)]) -> Result<Option<EntityId>> {
        if !self.interactive || entries.is_empty() {
            return Ok(None);
        }

        let labels: Vec<String> = entries.iter().map(|(_, name)| name.clone()).collect();
        let picked = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact_opt()
            .context("Failed to read selection")?;

        Ok(picked.map(|index| entries[index].0))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Check for NO_COLOR environment variable and TTY
    let use_color = !cli.no_color && env::var("NO_COLOR").is_err() && io::stdout().is_terminal();
    if !use_color {
        colored::control::set_override(false);
    }

    // Initialize tracing (stderr, so listings stay clean on stdout)
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let ui = Ui {
        interactive: io::stdin().is_terminal() && io::stdout().is_terminal(),
    };

    match run(cli, &ui) {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<InputError>() {
            Some(input_error) => {
                ui.alert(&input_error.to_string());
                std::process::exit(1);
            }
            None => Err(err),
        },
    }
}

fn run(cli: Cli, ui: &Ui) -> Result<()> {
    let backend: Backend = cli.backend.parse()?;
    let config = CatalogConfig::resolve(cli.data_dir, backend);
    let storage = config
        .open_storage()
        .with_context(|| format!("Failed to open storage in {}", config.data_dir.display()))?;
    let mut store = CatalogStore::open(storage).context("Failed to load catalog")?;

    match cli.command {
        Commands::Type { command } => run_named(NamedKind::CourseType, command, &mut store, ui),
        Commands::Course { command } => run_named(NamedKind::Course, command, &mut store, ui),
        Commands::Offering { command } => run_offering(command, &mut store, ui),
        Commands::Student { command } => run_student(command, &mut store, ui),
        Commands::Show => {
            let json = serde_json::to_string_pretty(store.catalog().snapshot())?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn run_named(kind: NamedKind, command: NamedCommands, store: &mut Store, ui: &Ui) -> Result<()> {
    let label = kind.label();

    match command {
        NamedCommands::Add { name } => {
            let created = match kind {
                NamedKind::CourseType => store.create_course_type(&name)?.map(|t| t.id),
                NamedKind::Course => store.create_course(&name)?.map(|c| c.id),
            };
            match created {
                Some(id) => ui.success(&format!("Created {} '{}' (id {})", label, name, id)),
                None => ui.notice(&format!("Name must not be blank; no {} created", label)),
            }
        }

        NamedCommands::Rename { id, name } => {
            let id = parse_id("id", &id)?;
            let renamed = match kind {
                NamedKind::CourseType => store.update_course_type(id, &name)?,
                NamedKind::Course => store.update_course(id, &name)?,
            };
            if renamed {
                ui.success(&format!("Renamed {} {} to '{}'", label, id, name));
            } else {
                ui.notice(&format!(
                    "No {} with id {}, or blank name; nothing changed",
                    label, id
                ));
            }
        }

        NamedCommands::Rm { id, yes } => {
            let id = parse_id("id", &id)?;
            let name = match kind {
                NamedKind::CourseType => store.catalog().course_type(id).map(|t| t.name.clone()),
                NamedKind::Course => store.catalog().course(id).map(|c| c.name.clone()),
            };
            let Some(name) = name else {
                ui.notice(&format!("No {} with id {}", label, id));
                return Ok(());
            };

            let prompt = format!("Delete {} '{}' and all of its offerings?", label, name);
            if !ui.confirm(&prompt, yes)? {
                ui.notice("Cancelled");
                return Ok(());
            }

            let report = match kind {
                NamedKind::CourseType => store.delete_course_type(id)?,
                NamedKind::Course => store.delete_course(id)?,
            };
            ui.success(&format!(
                "Deleted {} '{}' (removed {})",
                label,
                name,
                format_cascade(&report)
            ));
        }

        NamedCommands::List { json } => {
            let catalog = store.catalog();
            if json {
                let output = match kind {
                    NamedKind::CourseType => serde_json::to_string_pretty(catalog.course_types())?,
                    NamedKind::Course => serde_json::to_string_pretty(catalog.courses())?,
                };
                println!("{}", output);
                return Ok(());
            }

            let rows: Vec<String> = match kind {
                NamedKind::CourseType => catalog
                    .course_types()
                    .iter()
                    .map(|t| format_row(t.id, &t.name))
                    .collect(),
                NamedKind::Course => catalog
                    .courses()
                    .iter()
                    .map(|c| format_row(c.id, &c.name))
                    .collect(),
            };
            if rows.is_empty() {
                println!("No {}s.", label);
            }
            for row in rows {
                println!("{}", row);
            }
        }
    }

    Ok(())
}

fn run_offering(command: OfferingCommands, store: &mut Store, ui: &Ui) -> Result<()> {
    match command {
        OfferingCommands::Add {
            course,
            course_type,
        } => {
            let (course_id, course_type_id) = match (course, course_type) {
                (Some(course), Some(course_type)) => {
                    parse_offering_selection(Some(&course), Some(&course_type))?
                }
                (course, course_type) => select_offering_parents(store, ui, course, course_type)?,
            };

            match store.create_course_offering(course_id, course_type_id)? {
                Some(offering) => ui.success(&format!(
                    "Created offering '{}' (id {})",
                    offering.name, offering.id
                )),
                None => ui.notice(&format!(
                    "Course {} or course type {} does not exist; no offering created",
                    course_id, course_type_id
                )),
            }
        }

        OfferingCommands::Update {
            id,
            course,
            course_type,
        } => {
            let id = parse_id("offering id", &id)?;
            let (course_id, course_type_id) =
                parse_offering_selection(course.as_deref(), course_type.as_deref())?;

            if store.update_course_offering(id, course_id, course_type_id)? {
                let name = store
                    .catalog()
                    .course_offering(id)
                    .map(|o| o.name.clone())
                    .unwrap_or_default();
                ui.success(&format!("Updated offering {} to '{}'", id, name));
            } else {
                ui.notice(&format!(
                    "Offering {}, course {} or course type {} does not exist; nothing changed",
                    id, course_id, course_type_id
                ));
            }
        }

        OfferingCommands::Rm { id, yes } => {
            let id = parse_id("offering id", &id)?;
            let Some(name) = store.catalog().course_offering(id).map(|o| o.name.clone()) else {
                ui.notice(&format!("No offering with id {}", id));
                return Ok(());
            };

            let prompt = format!("Delete offering '{}' and its registrations?", name);
            if !ui.confirm(&prompt, yes)? {
                ui.notice("Cancelled");
                return Ok(());
            }

            let report = store.delete_course_offering(id)?;
            ui.success(&format!(
                "Deleted offering '{}' (removed {})",
                name,
                format_cascade(&report)
            ));
        }

        OfferingCommands::List { course_type, json } => {
            let type_id = parse_optional_id("course type id", course_type.as_deref())?;
            let offerings = store.catalog().filter_offerings_by_type(type_id);

            if json {
                println!("{}", serde_json::to_string_pretty(&offerings)?);
            } else if offerings.is_empty() {
                println!("No course offerings.");
            } else {
                for offering in offerings {
                    println!("{}", format_offering(offering));
                }
            }
        }
    }

    Ok(())
}

/// Fill in missing course / course type ids from terminal selection lists
fn select_offering_parents(
    store: &Store,
    ui: &Ui,
    course: Option<String>,
    course_type: Option<String>,
) -> Result<(EntityId, EntityId)> {
    let catalog = store.catalog();

    let course_id = match course {
        Some(raw) => Some(parse_id("course id", &raw)?),
        None => {
            let entries: Vec<(EntityId, String)> = catalog
                .courses()
                .iter()
                .map(|c| (c.id, c.name.clone()))
                .collect();
            ui.select("Select Course", &entries)?
        }
    };
    let Some(course_id) = course_id else {
        return Err(InputError::MissingOfferingSelection.into());
    };

    let course_type_id = match course_type {
        Some(raw) => Some(parse_id("course type id", &raw)?),
        None => {
            let entries: Vec<(EntityId, String)> = catalog
                .course_types()
                .iter()
                .map(|t| (t.id, t.name.clone()))
                .collect();
            ui.select("Select Course Type", &entries)?
        }
    };
    let Some(course_type_id) = course_type_id else {
        return Err(InputError::MissingOfferingSelection.into());
    };

    Ok((course_id, course_type_id))
}

fn run_student(command: StudentCommands, store: &mut Store, ui: &Ui) -> Result<()> {
    match command {
        StudentCommands::Register { offering, name } => {
            let offering_id = parse_id("offering id", &offering)?;

            match store.register_student(offering_id, &name)? {
                Some(registration) => {
                    let target = store
                        .catalog()
                        .course_offering(offering_id)
                        .map(|o| format!("'{}'", o.name))
                        .unwrap_or_else(|| format!("offering {}", offering_id));
                    ui.success(&format!(
                        "Registered '{}' for {}",
                        registration.student_name, target
                    ));
                }
                None => ui.notice("Student name must not be blank; nobody registered"),
            }
        }

        StudentCommands::List { offering, json } => {
            let offering_id = parse_id("offering id", &offering)?;
            let registrations = store.catalog().list_registered_students(offering_id);

            if json {
                let roster = Roster::new(offering_id, &registrations);
                println!("{}", serde_json::to_string_pretty(&roster)?);
            } else {
                println!("{}", format_roster(&registrations));
            }
        }
    }

    Ok(())
}
