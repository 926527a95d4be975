//! Nanofactory
//!
//! Ore requirement and fuel capacity calculator for chained reactions.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::info;

use nanofactory::models::{DEFAULT_BASE, DEFAULT_BUDGET, DEFAULT_TARGET};
use nanofactory::{batch, calculator, capacity, db, logging, parse};

#[derive(Parser)]
#[command(name = "nanofactory")]
#[command(about = "Ore requirement and fuel capacity calculator for chained reactions")]
struct Cli {
    /// Path to the SQLite reaction store
    #[arg(short, long, global = true, env = "NANOFACTORY_DB", default_value = "reactions.db")]
    database: PathBuf,

    /// Base resource that has no reaction
    #[arg(long, global = true, default_value = DEFAULT_BASE)]
    base: String,

    /// Material to produce
    #[arg(long, global = true, default_value = DEFAULT_TARGET)]
    target: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a reaction file: ore for one unit, then the most a budget can make
    Solve {
        /// Reaction list, one `Q1 M1, Q2 M2 => Qn Mn` per line
        file: PathBuf,

        /// Base resource available for the capacity search
        #[arg(short, long, default_value_t = DEFAULT_BUDGET)]
        budget: u64,

        /// Show a production summary for one unit
        #[arg(short, long)]
        verbose: bool,
    },

    /// Solve every reaction file in a directory tree
    Batch {
        dir: PathBuf,

        /// Extension of reaction files
        #[arg(short, long, default_value = "txt")]
        extension: String,

        #[arg(short, long, default_value_t = DEFAULT_BUDGET)]
        budget: u64,
    },

    /// Parse a reaction file and store it in the database
    Import {
        file: PathBuf,

        /// Clear stored reactions before importing
        #[arg(long)]
        clear: bool,
    },

    /// Ore needed for a quantity of the target, from stored reactions
    Ore {
        #[arg(short, long, default_value_t = 1)]
        quantity: u64,

        /// Show reactions run and leftover surplus
        #[arg(short, long)]
        verbose: bool,
    },

    /// Most of the target a budget can produce, from stored reactions
    Capacity {
        #[arg(short, long, default_value_t = DEFAULT_BUDGET)]
        budget: u64,
    },

    /// List all stored reactions
    ListReactions,

    /// List all materials mentioned by stored reactions
    ListMaterials,

    /// Initialize empty database with schema
    Init,

    /// Load the classic example reactions (13312 ore per fuel)
    LoadSample,
}

const SAMPLE_REACTIONS: &str = "\
157 ORE => 5 NZVS
165 ORE => 6 DCFZ
44 XJWVT, 5 KHKGT, 1 QDVJ, 29 NZVS, 9 GPVTF, 48 HKGWZ => 1 FUEL
12 HKGWZ, 1 GPVTF, 8 PSHF => 9 QDVJ
179 ORE => 7 PSHF
177 ORE => 5 HKGWZ
7 DCFZ, 7 PSHF => 2 XJWVT
165 ORE => 2 GPVTF
3 DCFZ, 7 NZVS, 5 HKGWZ, 10 PSHF => 8 KHKGT
";

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            budget,
            verbose,
        } => {
            let book = parse::read_book(&file, &cli.base)?;
            info!(file = %file.display(), reactions = book.len(), "parsed reactions");

            if verbose {
                println!("{}", calculator::summarize(&book, &cli.target, 1)?);
            }

            let solution = batch::solve(&book, &cli.target, budget)?;
            println!("{}", solution.ore_per_unit);
            println!("{}", solution.capacity.quantity);
        }

        Commands::Batch {
            dir,
            extension,
            budget,
        } => {
            let report = batch::solve_directory(&dir, &extension, &cli.base, &cli.target, budget);

            for (path, solution) in &report.solved {
                println!(
                    "{:<40} {:>12} {:>16}",
                    path.display(),
                    solution.ore_per_unit,
                    solution.capacity.quantity
                );
            }
            for (path, error) in &report.failed {
                println!("{:<40} error: {}", path.display(), error);
            }
            println!("\n{}", report);
        }

        Commands::Import { file, clear } => {
            let book = parse::read_book(&file, &cli.base)?;
            let mut conn = open_store(&cli.database)?;
            let source = file.display().to_string();
            let stored = if clear {
                println!("Replacing stored reactions...");
                db::replace_book(&mut conn, &book, Some(&source))?
            } else {
                db::store_book(&mut conn, &book, Some(&source))?
            };
            println!("Imported {} reactions from {}", stored, source);
        }

        Commands::Ore { quantity, verbose } => {
            let conn = open_store(&cli.database)?;
            let book = db::load_book(&conn, &cli.base)?;
            if verbose {
                println!("{}", calculator::summarize(&book, &cli.target, quantity)?);
            } else {
                println!("{}", calculator::ore_for(&book, &cli.target, quantity)?);
            }
        }

        Commands::Capacity { budget } => {
            let conn = open_store(&cli.database)?;
            let book = db::load_book(&conn, &cli.base)?;
            let result = capacity::max_producible(&book, &cli.target, budget)?;
            info!(probes = result.probes, ore_used = result.ore_used, "capacity search done");
            println!("{}", result.quantity);
        }

        Commands::ListReactions => {
            let conn = open_store(&cli.database)?;
            let reactions = db::list_reactions(&conn)?;
            if reactions.is_empty() {
                println!("No reactions in database. Run 'import' or 'load-sample' first.");
            } else {
                for r in reactions {
                    let inputs: Vec<String> = r
                        .inputs
                        .iter()
                        .map(|i| format!("{} {}", i.quantity, i.material))
                        .collect();
                    println!("{} => {} {}", inputs.join(", "), r.batch_size, r.output);
                }
            }
        }

        Commands::ListMaterials => {
            let conn = open_store(&cli.database)?;
            let materials = db::list_materials(&conn)?;
            if materials.is_empty() {
                println!("No materials in database. Run 'import' or 'load-sample' first.");
            } else {
                println!("Materials:");
                for m in materials {
                    let marker = if m == cli.base { " (base)" } else { "" };
                    println!("  {}{}", m, marker);
                }
            }
        }

        Commands::Init => {
            open_store(&cli.database)?;
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            let book = parse::parse_book(SAMPLE_REACTIONS, &cli.base)?;
            let mut conn = open_store(&cli.database)?;
            let stored = db::replace_book(&mut conn, &book, Some("sample"))?;
            println!("Loaded {} sample reactions", stored);
        }
    }

    Ok(())
}

fn open_store(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    db::init_schema(&conn)?;
    Ok(conn)
}
