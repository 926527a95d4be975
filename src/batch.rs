//! Solving reaction files: one at a time or a whole directory

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::calculator::{self, ResolveError};
use crate::capacity::{self, Capacity};
use crate::models::ReactionBook;
use crate::parse;

/// Both answers for one reaction list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// Base resource for a single unit of the target
    pub ore_per_unit: u64,
    pub capacity: Capacity,
}

pub fn solve(book: &ReactionBook, target: &str, budget: u64) -> Result<Solution, ResolveError> {
    let ore_per_unit = calculator::ore_for(book, target, 1)?;
    let capacity = capacity::max_producible(book, target, budget)?;
    Ok(Solution {
        ore_per_unit,
        capacity,
    })
}

pub fn solve_file(path: &Path, base: &str, target: &str, budget: u64) -> Result<Solution> {
    let book = parse::read_book(path, base)?;
    Ok(solve(&book, target, budget)?)
}

/// Outcome of solving every reaction file under a directory
#[derive(Debug, Default)]
pub struct BatchReport {
    pub solved: Vec<(PathBuf, Solution)>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Solve every `*.{extension}` file under `dir`. Failures are recorded, not fatal.
pub fn solve_directory(
    dir: &Path,
    extension: &str,
    base: &str,
    target: &str,
    budget: u64,
) -> BatchReport {
    let mut report = BatchReport::default();

    let files = parse::find_reaction_files(dir, extension);
    info!(dir = %dir.display(), files = files.len(), "solving reaction files");

    for path in files {
        match solve_file(&path, base, target, budget) {
            Ok(solution) => {
                info!(
                    file = %path.display(),
                    ore_per_unit = solution.ore_per_unit,
                    max = solution.capacity.quantity,
                    "solved"
                );
                report.solved.push((path, solution));
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(file = %path.display(), error = %message, "failed to solve");
                report.failed.push((path, message));
            }
        }
    }

    report
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Solved {} files. Failed: {}",
            self.solved.len(),
            self.failed.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_book;

    #[test]
    fn solve_reports_both_answers() {
        let book = parse_book("2 ORE => 1 FUEL", "ORE").unwrap();
        let solution = solve(&book, "FUEL", 11).unwrap();
        assert_eq!(solution.ore_per_unit, 2);
        assert_eq!(solution.capacity.quantity, 5);
        assert_eq!(solution.capacity.ore_used, 10);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = solve_file(Path::new("/definitely/not/here.txt"), "ORE", "FUEL", 10).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn report_summary_line() {
        let report = BatchReport::default();
        assert_eq!(report.to_string(), "Solved 0 files. Failed: 0");
    }
}
