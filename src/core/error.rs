//! SZ-001: Crate-wide error type.
//!
//! Planning *failure* (no viable recipe chain for a target) is not an
//! error — the target simply stays in the needed-variables list. These
//! variants cover construction problems, contract breaches, and recipe
//! failures that must abort the call.

use thiserror::Error;

/// Canonical error type for the sazon engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SazonError {
    /// Cookbook definition names a recipe absent from the registry.
    #[error("cookbook definition names unknown recipe {name:?}")]
    UnknownRecipe { name: String },

    /// A recipe name was registered twice.
    #[error("recipe {name:?} is already registered")]
    DuplicateRecipe { name: String },

    /// A cookbook entry lists a recipe whose product is a different variable.
    #[error("recipe {recipe:?} produces {product:?} but is listed under cookbook entry {entry:?}")]
    RecipeProductMismatch {
        recipe: String,
        product: String,
        entry: String,
    },

    /// A recipe queried a config variable that was never supplied.
    #[error("missing config variable {name:?}")]
    MissingConfig { name: String },

    /// A recipe queried a config variable with the wrong type accessor.
    #[error("config variable {name:?} holds {stored}, not {requested}")]
    ConfigTypeMismatch {
        name: String,
        requested: &'static str,
        stored: &'static str,
    },

    /// Planner recursion exceeded the depth bound (cookbook cycle).
    #[error("planning recursion depth {depth} exceeded while resolving {target:?}; the cookbook contains a dependency cycle")]
    PlanningCycle { target: String, depth: usize },

    /// Field lookup by name failed.
    #[error("field set has no field named {name:?}")]
    UnknownField { name: String },

    /// A field with the same name is already in the field set.
    #[error("field {name:?} is already in the field set")]
    DuplicateField { name: String },

    /// Executor pre-flight found a planned ingredient missing (planner bug).
    #[error("ingredient {ingredient:?} for recipe {recipe:?} is missing from the field set")]
    MissingIngredient { ingredient: String, recipe: String },

    /// TL/AD execution requires the product field to pre-exist.
    #[error("product {product:?} for recipe {recipe:?} must already be allocated for TL/AD execution")]
    MissingProduct { product: String, recipe: String },

    /// A pre-existing product field is too small for the recipe.
    #[error("field {field:?} has {found} levels, recipe {recipe:?} needs {needed}")]
    InsufficientLevels {
        field: String,
        recipe: String,
        found: usize,
        needed: usize,
    },

    /// Two fields that must agree in shape do not.
    #[error("field {field:?} shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        field: String,
        expected: [usize; 2],
        found: [usize; 2],
    },

    /// A recipe rejected an ingredient's `"units"` metadata tag.
    #[error("field {field:?} carries units {found:?}, recipe {recipe:?} expects {expected:?}")]
    UnitMismatch {
        field: String,
        recipe: String,
        expected: String,
        found: String,
    },

    /// A recipe reported failure from its execute method.
    #[error("recipe {recipe:?} failed while producing {product:?}")]
    RecipeExecutionFailure { recipe: String, product: String },

    /// A stored plan step no longer resolves against the cookbook.
    #[error("plan step references missing cookbook entry {product:?} candidate {candidate}")]
    InvalidPlanStep { product: String, candidate: usize },

    /// A declarative definition failed to parse.
    #[error("cookbook definition parse error: {0}")]
    CookbookParse(String),
}
