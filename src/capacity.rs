//! Capacity search: the most target units a base-resource budget can buy

use tracing::debug;

use crate::calculator::{ore_for, ResolveError};
use crate::models::ReactionBook;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    /// Largest producible quantity of the target
    pub quantity: u64,
    /// Base resource consumed by `quantity` units
    pub ore_used: u64,
    /// Resolver runs spent on the search
    pub probes: u32,
}

struct Prober<'a> {
    book: &'a ReactionBook,
    target: &'a str,
    budget: u64,
    probes: u32,
}

impl Prober<'_> {
    /// Cost of `quantity` units if it fits the budget. Every probe starts
    /// from a fresh ledger; overflow counts as over budget.
    fn cost_within_budget(&mut self, quantity: u64) -> Result<Option<u64>, ResolveError> {
        self.probes += 1;
        match ore_for(self.book, self.target, quantity) {
            Ok(ore) if ore <= self.budget => Ok(Some(ore)),
            Ok(_) | Err(ResolveError::Overflow(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Binary search for the largest quantity of `target` whose cost fits `budget`
pub fn max_producible(
    book: &ReactionBook,
    target: &str,
    budget: u64,
) -> Result<Capacity, ResolveError> {
    let mut prober = Prober {
        book,
        target,
        budget,
        probes: 0,
    };

    let Some(unit_cost) = prober.cost_within_budget(1)? else {
        return Ok(Capacity {
            quantity: 0,
            ore_used: 0,
            probes: prober.probes,
        });
    };

    // Grow the bracket until a probe no longer fits
    let mut low = 1u64;
    let mut low_cost = unit_cost;
    let mut high = loop {
        let Some(next) = low.checked_mul(2) else {
            break u64::MAX;
        };
        match prober.cost_within_budget(next)? {
            Some(cost) => {
                low = next;
                low_cost = cost;
            }
            None => break next - 1,
        }
    };

    // `low` always fits; everything above `high` is known not to
    while low < high {
        let mid = low + (high - low).div_ceil(2);
        match prober.cost_within_budget(mid)? {
            Some(cost) => {
                low = mid;
                low_cost = cost;
            }
            None => high = mid - 1,
        }
    }

    debug!(material = target, budget, quantity = low, probes = prober.probes, "capacity search converged");

    Ok(Capacity {
        quantity: low,
        ore_used: low_cost,
        probes: prober.probes,
    })
}
