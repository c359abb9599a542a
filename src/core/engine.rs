//! SZ-008: Public API — the changeVar family over one cookbook instance.
//!
//! `change_var` and `change_var_traj` plan fresh on every call;
//! `change_var_tl` and `change_var_ad` re-execute the plan captured by
//! the most recent `change_var_traj` against the trajectory it saved.
//! All four mutate the caller's field set and needed-variables list and
//! return the names they populated.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::config::{ConfigValue, ConfigVars};
use super::cookbook::{default_cookbook_definition, Cookbook, CookbookDefinition};
use super::error::SazonError;
use super::executor;
use super::planner::{self, Plan};
use super::recipe::{RecipeParameters, RecipeRegistry};
use crate::fields::FieldSet;
use crate::recipes;

/// Construction-time configuration: the cookbook definition, optional
/// per-recipe parameter blocks, and the constants recipes may query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SazonConfig {
    /// Output variable name → ordered candidate recipe names.
    #[serde(default = "default_cookbook_definition")]
    pub cookbook: CookbookDefinition,

    /// Parameter blocks, matched to recipes by name.
    #[serde(default)]
    pub recipes: Vec<RecipeParameters>,

    /// Constants for the config store; built in code, not parsed.
    #[serde(skip)]
    pub config_vars: ConfigVars,
}

impl Default for SazonConfig {
    fn default() -> Self {
        Self {
            cookbook: default_cookbook_definition(),
            recipes: Vec::new(),
            config_vars: ConfigVars::new(),
        }
    }
}

impl SazonConfig {
    /// The default cookbook, no parameter blocks, no constants.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookbook(cookbook: CookbookDefinition) -> Self {
        Self {
            cookbook,
            ..Self::default()
        }
    }

    /// Add one constant to the config store.
    pub fn add_to_config(&mut self, name: impl Into<String>, value: impl Into<ConfigValue>) {
        self.config_vars.set(name, value);
    }

    pub fn with_recipe_params(mut self, recipes: Vec<RecipeParameters>) -> Self {
        self.recipes = recipes;
        self
    }
}

/// Parse a construction config from a YAML document.
pub fn parse_config(yaml: &str) -> Result<SazonConfig, SazonError> {
    serde_yaml_ng::from_str(yaml).map_err(|e| SazonError::CookbookParse(e.to_string()))
}

/// Parse a construction config from a YAML file.
pub fn load_config(path: &Path) -> Result<SazonConfig, SazonError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SazonError::CookbookParse(format!("cannot read {}: {}", path.display(), e)))?;
    parse_config(&content)
}

/// Derived-variable synthesis engine.
///
/// The cookbook, registry, and config store are fixed at construction.
/// `change_var`, `change_var_tl`, and `change_var_ad` only mutate their
/// arguments, so one instance serves many read-only callers;
/// `change_var_traj` rewrites the stored plan and trajectory and needs
/// exclusive access.
pub struct Sazon {
    cookbook: Cookbook,
    config: Arc<ConfigVars>,
    plan: Plan,
    trajectory: FieldSet,
}

impl Sazon {
    /// Build against the built-in recipe registry.
    pub fn new(config: SazonConfig) -> Result<Self, SazonError> {
        let registry = recipes::builtin_registry()?;
        Self::with_registry(config, &registry)
    }

    /// Build against a caller-supplied registry (the extension point for
    /// recipes defined outside this crate).
    pub fn with_registry(config: SazonConfig, registry: &RecipeRegistry) -> Result<Self, SazonError> {
        let SazonConfig {
            cookbook,
            recipes: recipe_params,
            config_vars,
        } = config;
        let config_vars = Arc::new(config_vars);
        let cookbook = Cookbook::build(&cookbook, &recipe_params, registry, &config_vars)?;
        Ok(Self {
            cookbook,
            config: config_vars,
            plan: Plan::new(),
            trajectory: FieldSet::new(),
        })
    }

    pub fn cookbook(&self) -> &Cookbook {
        &self.cookbook
    }

    pub fn config(&self) -> &ConfigVars {
        &self.config
    }

    /// The plan captured by the most recent [`change_var_traj`](Self::change_var_traj).
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The trajectory captured by the most recent
    /// [`change_var_traj`](Self::change_var_traj). Immutable until the
    /// next capture.
    pub fn trajectory(&self) -> &FieldSet {
        &self.trajectory
    }

    /// Non-linear variable change: plan whatever `needed` asks for from
    /// the populated fields, execute the plan, and report the variables
    /// populated. Satisfied names are removed from `needed` in place.
    pub fn change_var(
        &self,
        fs: &mut FieldSet,
        needed: &mut Vec<String>,
    ) -> Result<Vec<String>, SazonError> {
        trace!("entering change_var");
        let on_entry = needed.clone();
        let mut plan = Plan::new();

        // plan_variable mutates `needed` and recurses, so iterate a copy.
        for target in &on_entry {
            debug!(variable = %target, "planning");
            planner::plan_variable(&self.cookbook, fs, needed, target, false, 0, &mut plan)?;
        }
        executor::execute_plan_nl(&self.cookbook, fs, &plan)?;

        trace!("leaving change_var");
        Ok(produced(&on_entry, needed))
    }

    /// Non-linear variable change that also captures the linearization
    /// point: only recipes with TL/AD are planned, the plan is stored,
    /// and the resulting field set is deep-copied into the trajectory.
    pub fn change_var_traj(
        &mut self,
        fs: &mut FieldSet,
        needed: &mut Vec<String>,
    ) -> Result<Vec<String>, SazonError> {
        trace!("entering change_var_traj");
        let on_entry = needed.clone();
        let mut plan = Plan::new();

        for target in &on_entry {
            debug!(variable = %target, "planning with TL/AD filter");
            planner::plan_variable(&self.cookbook, fs, needed, target, true, 0, &mut plan)?;
        }
        executor::execute_plan_nl(&self.cookbook, fs, &plan)?;

        self.trajectory = executor::capture_trajectory(fs);
        self.plan = plan;

        trace!("leaving change_var_traj");
        Ok(produced(&on_entry, needed))
    }

    /// Tangent-linear variable change over the stored plan. Reports the
    /// stored plan's products and removes them from `needed`.
    pub fn change_var_tl(
        &self,
        fs: &mut FieldSet,
        needed: &mut Vec<String>,
    ) -> Result<Vec<String>, SazonError> {
        trace!("entering change_var_tl");
        executor::execute_plan_tl(&self.cookbook, fs, &self.plan, &self.trajectory)?;

        let populated = self.plan.products();
        needed.retain(|v| !populated.contains(v));
        trace!("leaving change_var_tl");
        Ok(populated)
    }

    /// Adjoint variable change: the stored plan in reverse order.
    /// `vars_to_adjoint` should name the same variables passed to
    /// `change_var_traj`, already populated with sensitivities.
    pub fn change_var_ad(
        &self,
        fs: &mut FieldSet,
        vars_to_adjoint: &mut Vec<String>,
    ) -> Result<Vec<String>, SazonError> {
        trace!("entering change_var_ad");
        executor::execute_plan_ad(&self.cookbook, fs, &self.plan, &self.trajectory)?;

        let adjointed = self.plan.products();
        vars_to_adjoint.retain(|v| !adjointed.contains(v));
        trace!("leaving change_var_ad");
        Ok(adjointed)
    }
}

/// Names on entry that are gone on exit: the populated set.
fn produced(on_entry: &[String], on_exit: &[String]) -> Vec<String> {
    on_entry
        .iter()
        .filter(|name| !on_exit.contains(name))
        .cloned()
        .collect()
}
