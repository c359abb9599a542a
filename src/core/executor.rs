//! SZ-007: Executor — NL/TL/AD plan runs and trajectory capture.
//!
//! All three modes share a pre-flight per step: resolve the recipe from
//! the cookbook, assert the ingredients exist, prepare or validate the
//! product field, run the optional setup pass, then dispatch. NL and TL
//! iterate the plan forward; AD iterates it in reverse because the
//! adjoint propagates against the non-linear data flow.
//!
//! A failing step aborts the whole run and leaves the field set with
//! whatever products were already written; callers must treat it as
//! undefined on error.

use tracing::{debug, trace};

use super::cookbook::Cookbook;
use super::error::SazonError;
use super::planner::{Plan, PlanStep};
use super::recipe::Recipe;
use crate::fields::{Field, FieldSet};

fn recipe_for<'a>(cookbook: &'a Cookbook, step: &PlanStep) -> Result<&'a dyn Recipe, SazonError> {
    cookbook
        .recipe_at(&step.product, step.candidate)
        .ok_or_else(|| SazonError::InvalidPlanStep {
            product: step.product.clone(),
            candidate: step.candidate,
        })
}

/// The planner guarantees ingredient presence; a miss here is a bug.
fn check_ingredients(recipe: &dyn Recipe, fs: &FieldSet) -> Result<(), SazonError> {
    for ingredient in recipe.ingredients() {
        if !fs.has(&ingredient) {
            return Err(SazonError::MissingIngredient {
                ingredient,
                recipe: recipe.name().to_string(),
            });
        }
    }
    Ok(())
}

/// TL/AD pre-flight: the product must already be allocated, and its
/// level count must match the trajectory captured at linearization time.
fn check_product_for_linear(
    recipe: &dyn Recipe,
    step: &PlanStep,
    fs: &FieldSet,
    trajectory: &FieldSet,
) -> Result<(), SazonError> {
    if !fs.has(&step.product) {
        return Err(SazonError::MissingProduct {
            product: step.product.clone(),
            recipe: recipe.name().to_string(),
        });
    }
    if trajectory.has(&step.product) {
        let captured = trajectory.field(&step.product)?.shape();
        let found = fs.field(&step.product)?.shape();
        if captured != found {
            return Err(SazonError::ShapeMismatch {
                field: step.product.clone(),
                expected: captured,
                found,
            });
        }
    }
    Ok(())
}

fn run_setup(recipe: &dyn Recipe, fs: &FieldSet) -> Result<(), SazonError> {
    if recipe.requires_setup() {
        recipe.setup(fs)?;
    }
    Ok(())
}

fn escalate(recipe: &dyn Recipe, step: &PlanStep, success: bool) -> Result<(), SazonError> {
    if success {
        Ok(())
    } else {
        Err(SazonError::RecipeExecutionFailure {
            recipe: recipe.name().to_string(),
            product: step.product.clone(),
        })
    }
}

/// Run the plan's non-linear recipes in forward order, allocating
/// product fields that do not exist yet.
pub fn execute_plan_nl(
    cookbook: &Cookbook,
    fs: &mut FieldSet,
    plan: &Plan,
) -> Result<(), SazonError> {
    trace!(steps = plan.len(), "execute_plan_nl");
    for step in plan.steps() {
        let recipe = recipe_for(cookbook, step)?;
        debug!(product = %step.product, recipe = %recipe.name(), "NL step");

        check_ingredients(recipe, fs)?;

        let needed_levels = recipe.product_levels(fs)?;
        if fs.has(&step.product) {
            let found = fs.field(&step.product)?.levels();
            if found < needed_levels {
                return Err(SazonError::InsufficientLevels {
                    field: step.product.clone(),
                    recipe: recipe.name().to_string(),
                    found,
                    needed: needed_levels,
                });
            }
        } else {
            let function_space = recipe.product_function_space(fs)?;
            debug!(product = %step.product, levels = needed_levels, "allocating product field");
            fs.add(Field::new(step.product.clone(), function_space, needed_levels))?;
        }

        run_setup(recipe, fs)?;
        let success = recipe.execute_nl(fs)?;
        escalate(recipe, step, success)?;
    }
    Ok(())
}

/// Run the plan's tangent-linear recipes in forward order against the
/// saved trajectory. Product fields must already exist.
pub fn execute_plan_tl(
    cookbook: &Cookbook,
    fs: &mut FieldSet,
    plan: &Plan,
    trajectory: &FieldSet,
) -> Result<(), SazonError> {
    trace!(steps = plan.len(), "execute_plan_tl");
    for step in plan.steps() {
        let recipe = recipe_for(cookbook, step)?;
        debug!(product = %step.product, recipe = %recipe.name(), "TL step");

        check_product_for_linear(recipe, step, fs, trajectory)?;
        check_ingredients(recipe, fs)?;
        run_setup(recipe, fs)?;

        let success = recipe.execute_tl(fs, trajectory)?;
        escalate(recipe, step, success)?;
    }
    Ok(())
}

/// Run the plan's adjoint recipes in reverse order against the saved
/// trajectory.
pub fn execute_plan_ad(
    cookbook: &Cookbook,
    fs: &mut FieldSet,
    plan: &Plan,
    trajectory: &FieldSet,
) -> Result<(), SazonError> {
    trace!(steps = plan.len(), "execute_plan_ad");
    for step in plan.steps().iter().rev() {
        let recipe = recipe_for(cookbook, step)?;
        debug!(product = %step.product, recipe = %recipe.name(), "AD step");

        check_product_for_linear(recipe, step, fs, trajectory)?;
        check_ingredients(recipe, fs)?;
        run_setup(recipe, fs)?;

        let success = recipe.execute_ad(fs, trajectory)?;
        escalate(recipe, step, success)?;
    }
    Ok(())
}

/// Deep-copy every field into a fresh container: the linearization point
/// for subsequent TL/AD runs. Never aliases the input buffers.
pub fn capture_trajectory(fs: &FieldSet) -> FieldSet {
    fs.deep_copy()
}
