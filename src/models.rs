//! Data models for reactions and the surplus ledger

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

pub const DEFAULT_BASE: &str = "ORE";
pub const DEFAULT_TARGET: &str = "FUEL";
pub const DEFAULT_BUDGET: u64 = 1_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub material: String,
    pub quantity: u64,
}

/// One recipe: `inputs` consumed per batch, `batch_size` units of `output` produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub output: String,
    pub batch_size: u64,
    pub inputs: Vec<Ingredient>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("{output} has more than one reaction")]
    DuplicateReaction { output: String },

    #[error("reaction for {output} has a zero batch size")]
    ZeroBatch { output: String },

    #[error("{material} is the base resource and cannot have a reaction")]
    BaseHasReaction { material: String },

    #[error("reaction for {output} needs {material}, which no reaction produces")]
    UndefinedInput { output: String, material: String },

    #[error("reactions form a cycle through {material}")]
    Cycle { material: String },
}

/// Validated dependency map from derived material to its reaction.
///
/// Immutable once built. Every input is either the base resource or has a
/// reaction, and no material transitively requires itself.
#[derive(Debug, Clone)]
pub struct ReactionBook {
    base: String,
    reactions: BTreeMap<String, Reaction>,
}

impl ReactionBook {
    pub fn new(
        base: impl Into<String>,
        reactions: impl IntoIterator<Item = Reaction>,
    ) -> Result<Self, BookError> {
        let mut by_output = BTreeMap::new();
        for reaction in reactions {
            let output = reaction.output.clone();
            if by_output.insert(output.clone(), reaction).is_some() {
                return Err(BookError::DuplicateReaction { output });
            }
        }

        let book = Self {
            base: base.into(),
            reactions: by_output,
        };
        book.validate()?;
        Ok(book)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn is_base(&self, material: &str) -> bool {
        material == self.base
    }

    pub fn get(&self, material: &str) -> Option<&Reaction> {
        self.reactions.get(material)
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }

    /// Reactions ordered by output name
    pub fn reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values()
    }

    fn validate(&self) -> Result<(), BookError> {
        if self.reactions.contains_key(&self.base) {
            return Err(BookError::BaseHasReaction {
                material: self.base.clone(),
            });
        }

        for reaction in self.reactions.values() {
            if reaction.batch_size == 0 {
                return Err(BookError::ZeroBatch {
                    output: reaction.output.clone(),
                });
            }
            for input in &reaction.inputs {
                if !self.is_base(&input.material) && !self.reactions.contains_key(&input.material) {
                    return Err(BookError::UndefinedInput {
                        output: reaction.output.clone(),
                        material: input.material.clone(),
                    });
                }
            }
        }

        // Depth-first search with an explicit stack; `Visiting` marks the current path
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        for start in self.reactions.keys() {
            if marks.contains_key(start.as_str()) {
                continue;
            }
            let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];
            marks.insert(start.as_str(), Mark::Visiting);

            while let Some((material, next)) = stack.pop() {
                let inputs = &self.reactions[material].inputs;
                if next == inputs.len() {
                    marks.insert(material, Mark::Done);
                    continue;
                }
                stack.push((material, next + 1));

                let child = inputs[next].material.as_str();
                if self.is_base(child) {
                    continue;
                }
                match marks.get(child) {
                    Some(Mark::Visiting) => {
                        return Err(BookError::Cycle {
                            material: child.to_string(),
                        });
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(child, Mark::Visiting);
                        stack.push((child, 0));
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Mark {
    Visiting,
    Done,
}

/// Over-produced quantities banked during one resolution run.
///
/// Never share a ledger between unrelated runs; each run starts from
/// `SurplusLedger::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurplusLedger {
    banked: HashMap<String, u64>,
}

impl SurplusLedger {
    pub fn get(&self, material: &str) -> u64 {
        self.banked.get(material).copied().unwrap_or(0)
    }

    /// Draw up to `wanted` units from the bank, returning how many were drawn
    pub fn draw(&mut self, material: &str, wanted: u64) -> u64 {
        match self.banked.get_mut(material) {
            Some(banked) => {
                let drawn = (*banked).min(wanted);
                *banked -= drawn;
                drawn
            }
            None => 0,
        }
    }

    pub fn bank(&mut self, material: &str, amount: u64) {
        if amount == 0 && !self.banked.contains_key(material) {
            return;
        }
        *self.banked.entry(material.to_string()).or_default() += amount;
    }

    /// Non-zero entries, sorted by material
    pub fn leftovers(&self) -> Vec<(String, u64)> {
        let mut list: Vec<_> = self
            .banked
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(material, amount)| (material.clone(), *amount))
            .collect();
        list.sort();
        list
    }

    pub fn is_empty(&self) -> bool {
        self.banked.values().all(|amount| *amount == 0)
    }
}
