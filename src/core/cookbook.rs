//! SZ-005: Cookbook — ordered candidate recipes per output variable.
//!
//! Built once from a declarative definition (`output name → recipe
//! names`) plus optional per-recipe parameter blocks, then read-only.
//! Candidate order is caller preference: the planner tries earlier
//! entries first.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::config::ConfigVars;
use super::error::SazonError;
use super::recipe::{Recipe, RecipeParameters, RecipeRegistry};

/// Declarative cookbook definition: output variable name → ordered list
/// of recipe names.
pub type CookbookDefinition = IndexMap<String, Vec<String>>;

/// Parse a cookbook definition from a YAML mapping.
pub fn parse_definition(yaml: &str) -> Result<CookbookDefinition, SazonError> {
    serde_yaml_ng::from_str(yaml).map_err(|e| SazonError::CookbookParse(e.to_string()))
}

/// Load a cookbook definition from a YAML file.
pub fn load_definition(path: &Path) -> Result<CookbookDefinition, SazonError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SazonError::CookbookParse(format!("cannot read {}: {}", path.display(), e)))?;
    parse_definition(&content)
}

/// The catalog shipped with the crate's built-in recipes.
pub fn default_cookbook_definition() -> CookbookDefinition {
    let mut definition = CookbookDefinition::new();
    definition.insert(
        "pt".to_string(),
        vec!["t_to_pt".to_string(), "t_exner_to_pt".to_string()],
    );
    definition.insert("tv".to_string(), vec!["tq_to_tv".to_string()]);
    definition.insert("qt".to_string(), vec!["qsum_to_qt".to_string()]);
    definition.insert("rho".to_string(), vec!["ptv_to_rho".to_string()]);
    definition.insert("uwind_at_10m".to_string(), vec!["u_to_u10".to_string()]);
    definition.insert("vwind_at_10m".to_string(), vec!["v_to_v10".to_string()]);
    definition
}

/// Immutable catalog mapping each derivable variable to its candidate
/// recipe instances. Recipes are exclusively owned here; plans refer to
/// them by `(output name, candidate index)`.
pub struct Cookbook {
    entries: IndexMap<String, Vec<Box<dyn Recipe>>>,
}

impl Cookbook {
    /// Construct every recipe named by `definition` through `registry`.
    ///
    /// A parameter block applies to the first recipe whose name matches
    /// its `name` member; recipes without a matching block get a
    /// defaulted one. Unknown recipe names and product/entry mismatches
    /// are construction-time errors.
    pub fn build(
        definition: &CookbookDefinition,
        recipe_params: &[RecipeParameters],
        registry: &RecipeRegistry,
        config: &Arc<ConfigVars>,
    ) -> Result<Self, SazonError> {
        let mut entries: IndexMap<String, Vec<Box<dyn Recipe>>> = IndexMap::new();

        for (output, recipe_names) in definition {
            let mut candidates: Vec<Box<dyn Recipe>> = Vec::with_capacity(recipe_names.len());
            for recipe_name in recipe_names {
                let params = recipe_params
                    .iter()
                    .find(|p| &p.name == recipe_name)
                    .cloned()
                    .unwrap_or_else(|| RecipeParameters::named(recipe_name.clone()));

                let recipe = registry.create(recipe_name, &params, Arc::clone(config))?;
                if recipe.product() != output {
                    return Err(SazonError::RecipeProductMismatch {
                        recipe: recipe_name.clone(),
                        product: recipe.product().to_string(),
                        entry: output.clone(),
                    });
                }
                debug!(output = %output, recipe = %recipe_name, "cookbook entry constructed");
                candidates.push(recipe);
            }
            entries.insert(output.clone(), candidates);
        }

        Ok(Self { entries })
    }

    /// Ordered candidate recipes for `output`; empty when no entry exists.
    pub fn candidates(&self, output: &str) -> &[Box<dyn Recipe>] {
        self.entries.get(output).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve one candidate by stable index.
    pub fn recipe_at(&self, output: &str, candidate: usize) -> Option<&dyn Recipe> {
        self.entries
            .get(output)
            .and_then(|list| list.get(candidate))
            .map(Box::as_ref)
    }

    /// Output variable names, in definition order.
    pub fn output_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of output entries (also the planner's recursion bound).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Cookbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (output, candidates) in &self.entries {
            map.entry(
                output,
                &candidates.iter().map(|r| r.name()).collect::<Vec<_>>(),
            );
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes;

    fn builtin() -> RecipeRegistry {
        recipes::builtin_registry().unwrap()
    }

    #[test]
    fn test_sz005_parse_definition_yaml() {
        let yaml = r#"
pt: [t_to_pt, t_exner_to_pt]
tv: [tq_to_tv]
"#;
        let definition = parse_definition(yaml).unwrap();
        assert_eq!(definition.len(), 2);
        assert_eq!(definition["pt"], vec!["t_to_pt", "t_exner_to_pt"]);
        assert_eq!(definition["tv"], vec!["tq_to_tv"]);
    }

    #[test]
    fn test_sz005_parse_definition_rejects_garbage() {
        assert!(matches!(
            parse_definition("- just\n- a\n- list\n"),
            Err(SazonError::CookbookParse(_))
        ));
    }

    #[test]
    fn test_sz005_load_definition_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookbook.yaml");
        std::fs::write(&path, "pt: [t_to_pt]\n").unwrap();

        let definition = load_definition(&path).unwrap();
        assert_eq!(definition["pt"], vec!["t_to_pt"]);
    }

    #[test]
    fn test_sz005_build_default_cookbook() {
        let config = Arc::new(ConfigVars::new());
        let cookbook = Cookbook::build(
            &default_cookbook_definition(),
            &[],
            &builtin(),
            &config,
        )
        .unwrap();

        assert_eq!(cookbook.len(), 6);
        assert_eq!(cookbook.candidates("pt").len(), 2);
        assert_eq!(cookbook.candidates("pt")[0].name(), "t_to_pt");
        assert_eq!(cookbook.candidates("nonexistent").len(), 0);
        assert!(cookbook.recipe_at("pt", 1).is_some());
        assert!(cookbook.recipe_at("pt", 2).is_none());
    }

    #[test]
    fn test_sz005_unknown_recipe_is_fatal() {
        let mut definition = CookbookDefinition::new();
        definition.insert("pt".to_string(), vec!["no_such_recipe".to_string()]);

        let config = Arc::new(ConfigVars::new());
        let err = Cookbook::build(&definition, &[], &builtin(), &config).unwrap_err();
        assert_eq!(
            err,
            SazonError::UnknownRecipe {
                name: "no_such_recipe".to_string()
            }
        );
    }

    #[test]
    fn test_sz005_product_mismatch_is_fatal() {
        // t_to_pt produces "pt"; listing it under "tv" must fail.
        let mut definition = CookbookDefinition::new();
        definition.insert("tv".to_string(), vec!["t_to_pt".to_string()]);

        let config = Arc::new(ConfigVars::new());
        let err = Cookbook::build(&definition, &[], &builtin(), &config).unwrap_err();
        assert!(matches!(
            err,
            SazonError::RecipeProductMismatch { ref entry, .. } if entry == "tv"
        ));
    }

    #[test]
    fn test_sz005_parameter_block_matched_by_recipe_name() {
        let yaml = r#"
- name: t_to_pt
  p0: 850.0
"#;
        let params: Vec<RecipeParameters> = serde_yaml_ng::from_str(yaml).unwrap();

        let mut definition = CookbookDefinition::new();
        definition.insert("pt".to_string(), vec!["t_to_pt".to_string()]);

        let config = Arc::new(ConfigVars::new());
        let cookbook = Cookbook::build(&definition, &params, &builtin(), &config).unwrap();
        // The block was accepted; behavior is covered by the recipe tests.
        assert_eq!(cookbook.candidates("pt").len(), 1);
    }
}
