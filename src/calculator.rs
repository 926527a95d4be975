//! Ore requirement calculator logic

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, trace};

use crate::models::{Reaction, ReactionBook, SurplusLedger};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no reaction produces {0}")]
    UnknownMaterial(String),

    #[error("quantity overflow while producing {0}")]
    Overflow(String),
}

/// Base resource consumed to produce `required` units of `material`.
///
/// Surplus from rounding up to whole batches is banked in `ledger` and drawn
/// on by later requests in the same run. The base resource is returned as-is
/// and never touches the ledger.
pub fn resolve(
    material: &str,
    required: u64,
    book: &ReactionBook,
    ledger: &mut SurplusLedger,
) -> Result<u64, ResolveError> {
    resolve_with_stack(material, required, book, ledger, None)
}

/// A reaction whose inputs are still being resolved
struct Frame<'a> {
    material: &'a str,
    reaction: &'a Reaction,
    batches: u64,
    next_input: usize,
    ore: u64,
}

impl Frame<'_> {
    fn add_ore(&mut self, consumed: u64) -> Result<(), ResolveError> {
        self.ore = self
            .ore
            .checked_add(consumed)
            .ok_or_else(|| ResolveError::Overflow(self.material.to_string()))?;
        Ok(())
    }
}

enum Step<'a> {
    Done(u64),
    Expand(Frame<'a>),
}

/// Settle `required` units of `material` against the ledger and, if batches
/// must run, return a frame for their inputs
fn enter<'a>(
    material: &'a str,
    required: u64,
    book: &'a ReactionBook,
    ledger: &mut SurplusLedger,
    batches_run: Option<&mut BTreeMap<String, u64>>,
) -> Result<Step<'a>, ResolveError> {
    if book.is_base(material) {
        return Ok(Step::Done(required));
    }

    let reaction = book
        .get(material)
        .ok_or_else(|| ResolveError::UnknownMaterial(material.to_string()))?;

    let needed = required - ledger.draw(material, required);
    if needed == 0 {
        return Ok(Step::Done(0));
    }

    let batches = needed.div_ceil(reaction.batch_size);
    let produced = batches
        .checked_mul(reaction.batch_size)
        .ok_or_else(|| ResolveError::Overflow(material.to_string()))?;
    ledger.bank(material, produced - needed);

    trace!(material, needed, batches, surplus = produced - needed, "running reaction");

    if let Some(tally) = batches_run {
        let count = tally.entry(material.to_string()).or_default();
        *count = count.saturating_add(batches);
    }

    Ok(Step::Expand(Frame {
        material,
        reaction,
        batches,
        next_input: 0,
        ore: 0,
    }))
}

// Depth-first over an explicit stack, inputs in listed order, so chain
// length is bounded only by the book
fn resolve_with_stack(
    material: &str,
    required: u64,
    book: &ReactionBook,
    ledger: &mut SurplusLedger,
    mut batches_run: Option<&mut BTreeMap<String, u64>>,
) -> Result<u64, ResolveError> {
    let mut stack = match enter(material, required, book, ledger, batches_run.as_deref_mut())? {
        Step::Done(ore) => return Ok(ore),
        Step::Expand(frame) => vec![frame],
    };

    while let Some(top) = stack.last_mut() {
        let reaction = top.reaction;
        let Some(input) = reaction.inputs.get(top.next_input) else {
            let finished = top.ore;
            stack.pop();
            match stack.last_mut() {
                Some(parent) => parent.add_ore(finished)?,
                None => return Ok(finished),
            }
            continue;
        };
        top.next_input += 1;

        let amount = top
            .batches
            .checked_mul(input.quantity)
            .ok_or_else(|| ResolveError::Overflow(input.material.clone()))?;

        match enter(&input.material, amount, book, ledger, batches_run.as_deref_mut())? {
            Step::Done(ore) => top.add_ore(ore)?,
            Step::Expand(frame) => stack.push(frame),
        }
    }

    // The root frame always returns from inside the loop
    Ok(0)
}

/// Base resource needed for `quantity` units of `target`, starting from an empty ledger
pub fn ore_for(book: &ReactionBook, target: &str, quantity: u64) -> Result<u64, ResolveError> {
    let mut ledger = SurplusLedger::default();
    resolve(target, quantity, book, &mut ledger)
}

/// Summary of one resolution run
#[derive(Debug, Clone)]
pub struct ProductionSummary {
    pub target: String,
    pub quantity: u64,
    pub base: String,
    pub ore: u64,
    pub batches: Vec<(String, u64)>,
    pub leftovers: Vec<(String, u64)>,
}

/// Resolve `quantity` units of `target` and record what ran along the way
pub fn summarize(
    book: &ReactionBook,
    target: &str,
    quantity: u64,
) -> Result<ProductionSummary, ResolveError> {
    let mut ledger = SurplusLedger::default();
    let mut batches = BTreeMap::new();
    let ore = resolve_with_stack(target, quantity, book, &mut ledger, Some(&mut batches))?;

    debug!(material = target, quantity, ore, reactions = batches.len(), "summarized production");

    Ok(ProductionSummary {
        target: target.to_string(),
        quantity,
        base: book.base().to_string(),
        ore,
        batches: batches.into_iter().collect(),
        leftovers: ledger.leftovers(),
    })
}

impl std::fmt::Display for ProductionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Production Summary ===")?;
        writeln!(f, "Target: {} x {}", self.quantity, self.target)?;
        writeln!(f, "{} consumed: {}", self.base, self.ore)?;
        writeln!(f)?;

        writeln!(f, "Reactions run:")?;
        for (material, batches) in &self.batches {
            writeln!(f, "  {:>10}x {}", batches, material)?;
        }

        if !self.leftovers.is_empty() {
            writeln!(f)?;
            writeln!(f, "Leftover surplus:")?;
            for (material, amount) in &self.leftovers {
                writeln!(f, "  {:>10}  {}", amount, material)?;
            }
        }

        Ok(())
    }
}
