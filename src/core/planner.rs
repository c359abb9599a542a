//! SZ-006: Planner — recursive dependency resolution over the cookbook.
//!
//! Depth-first search that picks, for each needed variable, the first
//! candidate recipe whose ingredients are populated or can themselves be
//! manufactured. The resulting plan is in post-order: an ingredient's
//! recipe always precedes the recipe that consumes it, so linear
//! execution satisfies every data dependency.

use tracing::{debug, error, trace};

use super::cookbook::Cookbook;
use super::error::SazonError;
use crate::fields::FieldSet;

/// One plan entry: the product variable and a stable candidate index
/// into the cookbook's list for that variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub product: String,
    pub candidate: usize,
}

/// Dependency-ordered sequence of plan steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_steps(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub(crate) fn push(&mut self, step: PlanStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// True when a step in the plan manufactures `name`.
    pub fn produces(&self, name: &str) -> bool {
        self.steps.iter().any(|step| step.product == name)
    }

    /// Product names in execution order.
    pub fn products(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.product.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Try to append a plan for `target` to `plan`.
///
/// A variable is available when it is populated in the field set (present
/// and not in `needed`), already manufactured by the plan, or a recipe
/// chain for it can be found here. On success `target` is removed from
/// `needed`. Returns `Ok(false)` when no candidate recipe is viable —
/// planning failure is the normal outcome for an underivable variable,
/// not an error.
///
/// `depth` is the recursion depth; callers pass 0. The search fails with
/// [`SazonError::PlanningCycle`] once the depth exceeds the cookbook
/// size, which only a cyclic cookbook can reach.
pub fn plan_variable(
    cookbook: &Cookbook,
    fs: &FieldSet,
    needed: &mut Vec<String>,
    target: &str,
    need_tlad: bool,
    depth: usize,
    plan: &mut Plan,
) -> Result<bool, SazonError> {
    trace!(variable = %target, depth, "plan_variable");

    // A sibling recursion may already have satisfied this target. A name
    // that was never needed counts only if it is populated or planned;
    // otherwise fall through and try to manufacture it.
    if !needed.iter().any(|v| v == target) && (fs.has(target) || plan.produces(target)) {
        return Ok(true);
    }

    if depth > cookbook.len() {
        return Err(SazonError::PlanningCycle {
            target: target.to_string(),
            depth,
        });
    }

    let candidates = cookbook.candidates(target);
    if candidates.is_empty() {
        debug!(variable = %target, "cookbook has no recipe for target");
        return Ok(false);
    }

    for (candidate, recipe) in candidates.iter().enumerate() {
        if need_tlad && !recipe.has_tlad() {
            debug!(recipe = %recipe.name(), "skipping recipe without TL/AD");
            continue;
        }

        let mut have_all = true;
        for ingredient in recipe.ingredients() {
            if ingredient == target {
                error!(
                    recipe = %recipe.name(),
                    variable = %target,
                    "ingredient list contains the recipe's own product"
                );
                have_all = false;
                break;
            }

            let populated = fs.has(&ingredient) && !needed.iter().any(|v| v == &ingredient);
            let available = populated
                || plan_variable(cookbook, fs, needed, &ingredient, need_tlad, depth + 1, plan)?;

            debug!(
                ingredient = %ingredient,
                available,
                recipe = %recipe.name(),
                "ingredient availability"
            );
            if !available {
                have_all = false;
                break;
            }
        }

        if have_all {
            debug!(variable = %target, recipe = %recipe.name(), "recipe added to plan");
            plan.push(PlanStep {
                product: target.to_string(),
                candidate,
            });
            needed.retain(|v| v != target);
            return Ok(true);
        }
    }

    Ok(false)
}
