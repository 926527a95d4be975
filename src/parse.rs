//! Reaction list parsing
//!
//! Reads lines of the form `7 A, 1 E => 1 FUEL` into [`Reaction`]s and
//! finds reaction files on disk for batch runs.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use walkdir::WalkDir;

use crate::models::{BookError, Ingredient, Reaction, ReactionBook};

// Pattern: "<quantity> <material>"
static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\S+)\s+(\w+)\s*$").expect("term pattern compiles"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected exactly one `=>`")]
    MissingArrow { line: usize },

    #[error("line {line}: malformed term `{term}`, expected `<quantity> <material>`")]
    BadTerm { line: usize, term: String },

    #[error("line {line}: `{value}` is not a quantity")]
    BadQuantity { line: usize, value: String },

    #[error("line {line}: quantities must be positive")]
    ZeroQuantity { line: usize },

    #[error("line {line}: a reaction produces exactly one material")]
    MultipleOutputs { line: usize },

    #[error("line {line}: total quantity of {material} is too large")]
    QuantityOverflow { line: usize, material: String },

    #[error("line {line}: {material} already has a reaction")]
    DuplicateReaction { line: usize, material: String },
}

/// Failure to turn a reaction list into a [`ReactionBook`]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid reactions in {}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: Box<LoadError>,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Book(#[from] BookError),
}

/// Parse a single reaction line. `line_no` is only used for error reporting.
pub fn parse_line(line: &str, line_no: usize) -> Result<Reaction, ParseError> {
    let mut sides = line.split("=>");
    let (Some(lhs), Some(rhs), None) = (sides.next(), sides.next(), sides.next()) else {
        return Err(ParseError::MissingArrow { line: line_no });
    };

    if rhs.contains(',') {
        return Err(ParseError::MultipleOutputs { line: line_no });
    }
    let (batch_size, output) = parse_term(rhs, line_no)?;

    let mut inputs: Vec<Ingredient> = Vec::new();
    for term in lhs.split(',') {
        let (quantity, material) = parse_term(term, line_no)?;
        // Repeated inputs on one line add up
        match inputs.iter_mut().find(|i| i.material == material) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(quantity).ok_or_else(|| {
                    ParseError::QuantityOverflow {
                        line: line_no,
                        material: existing.material.clone(),
                    }
                })?;
            }
            None => inputs.push(Ingredient { material, quantity }),
        }
    }

    Ok(Reaction {
        output,
        batch_size,
        inputs,
    })
}

fn parse_term(term: &str, line_no: usize) -> Result<(u64, String), ParseError> {
    let cap = TERM_RE.captures(term).ok_or_else(|| ParseError::BadTerm {
        line: line_no,
        term: term.trim().to_string(),
    })?;

    let quantity = cap[1].parse::<u64>().map_err(|_| ParseError::BadQuantity {
        line: line_no,
        value: cap[1].to_string(),
    })?;
    if quantity == 0 {
        return Err(ParseError::ZeroQuantity { line: line_no });
    }

    Ok((quantity, cap[2].to_string()))
}

/// Parse a whole reaction list, skipping blank lines
pub fn parse_reactions(input: &str) -> Result<Vec<Reaction>, ParseError> {
    let mut seen = HashSet::new();
    let mut reactions = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let reaction = parse_line(line, idx + 1)?;
        if !seen.insert(reaction.output.clone()) {
            return Err(ParseError::DuplicateReaction {
                line: idx + 1,
                material: reaction.output,
            });
        }
        reactions.push(reaction);
    }

    Ok(reactions)
}

/// Parse and validate a reaction list into a book rooted at `base`
pub fn parse_book(input: &str, base: &str) -> Result<ReactionBook, LoadError> {
    let reactions = parse_reactions(input)?;
    Ok(ReactionBook::new(base, reactions)?)
}

pub fn read_book(path: &Path, base: &str) -> Result<ReactionBook, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_book(&content, base).map_err(|e| LoadError::Invalid {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

/// Find all files under `dir` with the given extension, sorted by path
pub fn find_reaction_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == extension))
        .collect();
    files.sort();
    files
}
