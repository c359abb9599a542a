//! Sazon — derived-variable synthesis for gridded atmospheric fields.
//!
//! A cookbook of recipes, a recursive dependency planner, and a
//! three-mode (non-linear / tangent-linear / adjoint) executor for
//! variational data assimilation.

pub mod core;
pub mod fields;
pub mod recipes;

pub use crate::core::config::{ConfigValue, ConfigVars};
pub use crate::core::cookbook::{Cookbook, CookbookDefinition};
pub use crate::core::engine::{Sazon, SazonConfig};
pub use crate::core::error::SazonError;
pub use crate::core::planner::{Plan, PlanStep};
pub use crate::core::recipe::{Recipe, RecipeFactory, RecipeParameters, RecipeRegistry};
pub use crate::fields::{Field, FieldSet, FunctionSpace};
