//! SZ-004: Recipe contract, parameter blocks, and the factory registry.
//!
//! A recipe is a pure transform from an ordered list of ingredient
//! variables to a single product variable. Recipes are instantiated once
//! at cookbook construction from a parameter block plus a shared
//! reference to the config store, and are immutable afterwards.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::config::ConfigVars;
use super::error::SazonError;
use crate::fields::{FieldSet, FunctionSpace};

/// Capability set every transform satisfies. The sole extension point:
/// new derived variables are added by implementing this trait and
/// registering a factory under a unique name.
pub trait Recipe: std::fmt::Debug + Send + Sync {
    /// Stable identifier, unique per recipe class; used by the registry.
    fn name(&self) -> &str;

    /// Variable name this recipe manufactures.
    fn product(&self) -> &str;

    /// Ordered list of variable names consumed.
    fn ingredients(&self) -> Vec<String>;

    /// True iff `execute_tl` and `execute_ad` are implemented.
    fn has_tlad(&self) -> bool {
        false
    }

    fn requires_setup(&self) -> bool {
        false
    }

    /// Optional pre-execution pass, invoked by the executor immediately
    /// before each of NL/TL/AD when [`requires_setup`](Self::requires_setup)
    /// is true.
    fn setup(&self, _fs: &FieldSet) -> Result<(), SazonError> {
        Ok(())
    }

    /// Level count the product should have, given the current field set.
    fn product_levels(&self, fs: &FieldSet) -> Result<usize, SazonError>;

    /// Function space for the product field, given the current field set.
    fn product_function_space(&self, fs: &FieldSet) -> Result<FunctionSpace, SazonError>;

    /// Read ingredients from `fs`, write the product into `fs`.
    /// `Ok(false)` reports recipe failure; the executor escalates it.
    fn execute_nl(&self, fs: &mut FieldSet) -> Result<bool, SazonError>;

    /// Linearized variant: perturbations in `fs`, linearization state in
    /// `trajectory`. Recipes advertising `has_tlad` must override.
    fn execute_tl(&self, _fs: &mut FieldSet, _trajectory: &FieldSet) -> Result<bool, SazonError> {
        Ok(false)
    }

    /// Adjoint variant: adjoint sensitivities in `fs`, linearization
    /// state in `trajectory`. Recipes advertising `has_tlad` must override.
    fn execute_ad(&self, _fs: &mut FieldSet, _trajectory: &FieldSet) -> Result<bool, SazonError> {
        Ok(false)
    }
}

/// A declarative parameter block for one recipe: the recipe name it
/// applies to plus free-form keyed options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeParameters {
    pub name: String,

    #[serde(flatten)]
    pub options: IndexMap<String, serde_yaml_ng::Value>,
}

impl RecipeParameters {
    /// A defaulted block carrying only the recipe name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: IndexMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_yaml_ng::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn option_f64(&self, key: &str) -> Option<f64> {
        match self.options.get(key) {
            Some(serde_yaml_ng::Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        match self.options.get(key) {
            Some(serde_yaml_ng::Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Produces a recipe instance from its parameter block and the shared
/// config store.
pub type RecipeFactory =
    fn(&RecipeParameters, Arc<ConfigVars>) -> Result<Box<dyn Recipe>, SazonError>;

/// Named collection of recipe factories, populated at construction.
#[derive(Default)]
pub struct RecipeRegistry {
    factories: IndexMap<String, RecipeFactory>,
}

impl RecipeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. Duplicate registration is fatal.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: RecipeFactory,
    ) -> Result<(), SazonError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(SazonError::DuplicateRecipe { name });
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Instantiate a recipe by registered name.
    pub fn create(
        &self,
        name: &str,
        params: &RecipeParameters,
        config: Arc<ConfigVars>,
    ) -> Result<Box<dyn Recipe>, SazonError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SazonError::UnknownRecipe {
                name: name.to_string(),
            })?;
        factory(params, config)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for RecipeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeRegistry")
            .field("recipes", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Minimal recipe doubles shared by the core test modules.

    use std::sync::{Arc, Mutex};

    use super::*;

    /// Configurable fake: fixed product/ingredients, optional TL/AD,
    /// NL copies the first ingredient into the product. Records every
    /// dispatch into a shared journal for ordering assertions.
    #[derive(Debug)]
    pub struct FakeRecipe {
        pub recipe_name: String,
        pub product_name: String,
        pub ingredient_names: Vec<String>,
        pub tlad: bool,
        pub journal: Arc<Mutex<Vec<String>>>,
    }

    impl FakeRecipe {
        pub fn new(name: &str, product: &str, ingredients: &[&str]) -> Self {
            Self {
                recipe_name: name.to_string(),
                product_name: product.to_string(),
                ingredient_names: ingredients.iter().map(|s| s.to_string()).collect(),
                tlad: false,
                journal: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn with_tlad(mut self) -> Self {
            self.tlad = true;
            self
        }

        pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
            self.journal = journal;
            self
        }

        fn record(&self, mode: &str) {
            self.journal
                .lock()
                .unwrap()
                .push(format!("{}:{}", mode, self.recipe_name));
        }

        fn write_product(&self, fs: &mut FieldSet) -> Result<(), SazonError> {
            let source = fs.field(&self.ingredient_names[0])?.values().clone();
            let product = fs.field_mut(&self.product_name)?;
            let levels = product.levels().min(source.ncols());
            let nodes = product.nodes();
            for level in 0..levels {
                for node in 0..nodes {
                    product.values_mut()[[node, level]] = source[[node, level]];
                }
            }
            Ok(())
        }
    }

    impl Recipe for FakeRecipe {
        fn name(&self) -> &str {
            &self.recipe_name
        }

        fn product(&self) -> &str {
            &self.product_name
        }

        fn ingredients(&self) -> Vec<String> {
            self.ingredient_names.clone()
        }

        fn has_tlad(&self) -> bool {
            self.tlad
        }

        fn product_levels(&self, fs: &FieldSet) -> Result<usize, SazonError> {
            Ok(fs.field(&self.ingredient_names[0])?.levels())
        }

        fn product_function_space(&self, fs: &FieldSet) -> Result<FunctionSpace, SazonError> {
            Ok(fs.field(&self.ingredient_names[0])?.function_space().clone())
        }

        fn execute_nl(&self, fs: &mut FieldSet) -> Result<bool, SazonError> {
            self.record("nl");
            self.write_product(fs)?;
            Ok(true)
        }

        fn execute_tl(
            &self,
            fs: &mut FieldSet,
            _trajectory: &FieldSet,
        ) -> Result<bool, SazonError> {
            self.record("tl");
            self.write_product(fs)?;
            Ok(true)
        }

        fn execute_ad(
            &self,
            _fs: &mut FieldSet,
            _trajectory: &FieldSet,
        ) -> Result<bool, SazonError> {
            self.record("ad");
            Ok(true)
        }
    }

    /// A recipe whose NL execution always reports failure.
    #[derive(Debug)]
    pub struct FailingRecipe;

    impl Recipe for FailingRecipe {
        fn name(&self) -> &str {
            "always_fails"
        }

        fn product(&self) -> &str {
            "broken"
        }

        fn ingredients(&self) -> Vec<String> {
            vec!["t".to_string()]
        }

        fn product_levels(&self, fs: &FieldSet) -> Result<usize, SazonError> {
            Ok(fs.field("t")?.levels())
        }

        fn product_function_space(&self, fs: &FieldSet) -> Result<FunctionSpace, SazonError> {
            Ok(fs.field("t")?.function_space().clone())
        }

        fn execute_nl(&self, _fs: &mut FieldSet) -> Result<bool, SazonError> {
            Ok(false)
        }
    }
}
