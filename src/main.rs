use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use daykountdown::colour::{PALETTE, to_rgb};
use daykountdown::{Config, DEFAULT_COLOUR, Exporter, Importer, Kountdown, KountdownModel, SortKind, Store, parse_datetime};
use eyre::{Result, eyre};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daykountdown")]
#[command(about = "DayKountdown CLI - track the days left until the events you care about")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Database file (overrides the configured one)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List kountdowns
    List {
        /// Order for this listing (default: the remembered order)
        #[arg(short, long, value_enum)]
        sort: Option<SortKind>,
    },

    /// Add a kountdown
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Target date, e.g. 2025-12-25 or 2025-12-25T18:00:00
        #[arg(long)]
        date: String,
        #[arg(short, long, default_value = DEFAULT_COLOUR)]
        colour: String,
    },

    /// Edit the kountdown at ROW (as shown by `list`); omitted fields are kept
    Edit {
        row: usize,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(short, long)]
        colour: Option<String>,
    },

    /// Remove the kountdown at ROW (as shown by `list`)
    Remove { row: usize },

    /// Remove every kountdown
    Clear,

    /// Remember a sort order for future listings
    Sort {
        #[arg(value_enum)]
        kind: SortKind,
    },

    /// Export all kountdowns to a JSON file
    Export {
        /// Destination (default: the configured export name)
        path: Option<PathBuf>,
    },

    /// Read kountdowns from a JSON file
    Import {
        path: PathBuf,

        /// Add the imported kountdowns to the database
        #[arg(long)]
        apply: bool,
    },

    /// Show the role catalog exposed to views
    Roles,

    /// Show the built-in colour palette
    Palette,
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_file);
    let mut config = Config::load(&config_path)?;
    if let Some(db) = &cli.db {
        config.database = db.clone();
    }

    let store = Store::open(&config.database)?;
    let mut model = KountdownModel::with_sort(store, config.sort)?;

    match cli.command {
        Commands::List { sort } => {
            if let Some(sort) = sort {
                model.sort_model(sort);
            }
            print_list(&model);
        }
        Commands::Add {
            name,
            description,
            date,
            colour,
        } => {
            let date = parse_date_arg(&date)?;
            if !model.add_kountdown(&name, &description, date, &colour) {
                return Err(eyre!("Failed to add kountdown"));
            }
            println!("Added {}", paint(&name, &colour));
        }
        Commands::Edit {
            row,
            name,
            description,
            date,
            colour,
        } => {
            let current = model
                .record(row)
                .ok_or_else(|| eyre!("No kountdown at row {}", row))?;
            let date = match date {
                Some(d) => parse_date_arg(&d)?,
                None => current
                    .datetime()
                    .ok_or_else(|| eyre!("Stored date {:?} is not valid; pass --date", current.date))?,
            };
            let name = name.unwrap_or(current.name);
            let description = description.unwrap_or(current.description);
            let colour = colour.unwrap_or(current.colour);

            if !model.edit_kountdown(row, &name, &description, date, &colour) {
                return Err(eyre!("Failed to edit kountdown at row {}", row));
            }
            println!("Updated {}", paint(&name, &colour));
        }
        Commands::Remove { row } => {
            let name = model.record(row).map(|k| k.name).unwrap_or_default();
            if !model.remove_kountdown(row) {
                return Err(eyre!("Failed to remove kountdown at row {}", row));
            }
            println!("Removed {}", name);
        }
        Commands::Clear => {
            if !model.remove_all_kountdowns() {
                return Err(eyre!("Failed to remove kountdowns"));
            }
            println!("Removed all kountdowns");
        }
        Commands::Sort { kind } => {
            config.sort = kind;
            config.save(&config_path)?;
            model.sort_model(kind);
            print_list(&model);
        }
        Commands::Export { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(&config.export_name));
            if !Exporter::export_to_file(model.store(), Some(&path)) {
                return Err(eyre!("Failed to export to {}", path.display()));
            }
            println!("Exported {} kountdowns to {}", model.store().count()?, path.display());
        }
        Commands::Import { path, apply } => {
            let mut importer = Importer::new(DEFAULT_COLOUR);
            importer.on_import_completed(|kountdowns| {
                println!("Read {} kountdowns", kountdowns.len());
            });

            if !importer.import_from_file(Some(&path)) {
                println!("Nothing imported from {}", path.display());
                return Ok(());
            }

            for k in importer.imported() {
                println!("  [{}] {} {}", k.index, paint(&k.name, &k.colour), k.date.dimmed());
            }

            if apply {
                let mut added = 0;
                for k in importer.imported() {
                    let Some(date) = parse_datetime(&k.date) else {
                        eprintln!("Skipping {:?}: invalid date {:?}", k.name, k.date);
                        continue;
                    };
                    if model.add_kountdown(&k.name, &k.description, date, &k.colour) {
                        added += 1;
                    } else {
                        eprintln!("Skipping {:?}: could not be stored", k.name);
                    }
                }
                println!("Added {} of {} kountdowns", added, importer.imported().len());
            }
        }
        Commands::Roles => {
            for (id, name) in model.role_names() {
                println!("{:>5}  {}", id, name);
            }
        }
        Commands::Palette => {
            for name in PALETTE {
                println!("{}", paint(name, name));
            }
            println!("{} (default text colour)", DEFAULT_COLOUR);
        }
    }

    Ok(())
}

fn parse_date_arg(s: &str) -> Result<DateTime<Utc>> {
    parse_datetime(s).ok_or_else(|| eyre!("Invalid date {:?} (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)", s))
}

fn paint(text: &str, colour: &str) -> String {
    match to_rgb(colour) {
        Some((r, g, b)) => text.truecolor(r, g, b).to_string(),
        None => text.to_string(),
    }
}

fn print_list(model: &KountdownModel) {
    if model.row_count() == 0 {
        println!("No kountdowns yet");
        return;
    }

    let now = Utc::now();
    for (row, k) in model.records().iter().enumerate() {
        println!(
            "{:>3}  {:<24} {}  {}",
            row,
            paint(&k.name, &k.colour),
            days_left(k, now),
            k.description.dimmed()
        );
    }
}

fn days_left(k: &Kountdown, now: DateTime<Utc>) -> String {
    match k.datetime() {
        Some(date) => {
            let days = (date - now).num_days();
            match days {
                0 => "today".to_string(),
                d if d > 0 => format!("in {} days", d),
                d => format!("{} days ago", -d),
            }
        }
        None => format!("invalid date {:?}", k.date),
    }
}
