//! SZ-011: Potential temperature from temperature and the Exner function.

use std::sync::Arc;

use crate::core::config::ConfigVars;
use crate::core::error::SazonError;
use crate::core::recipe::{Recipe, RecipeParameters};
use crate::fields::{FieldSet, FunctionSpace};

use super::check_units;

/// `pt = t / exner`. NL-only alternative to `t_to_pt` for callers whose
/// model carries the Exner pressure directly.
#[derive(Debug, Default)]
pub struct ExnerToPTemp;

impl ExnerToPTemp {
    pub const NAME: &'static str = "t_exner_to_pt";

    pub fn factory(
        _params: &RecipeParameters,
        _config: Arc<ConfigVars>,
    ) -> Result<Box<dyn Recipe>, SazonError> {
        Ok(Box::new(Self))
    }
}

impl Recipe for ExnerToPTemp {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn product(&self) -> &str {
        "pt"
    }

    fn ingredients(&self) -> Vec<String> {
        vec!["t".to_string(), "exner".to_string()]
    }

    fn product_levels(&self, fs: &FieldSet) -> Result<usize, SazonError> {
        Ok(fs.field("t")?.levels())
    }

    fn product_function_space(&self, fs: &FieldSet) -> Result<FunctionSpace, SazonError> {
        Ok(fs.field("t")?.function_space().clone())
    }

    fn execute_nl(&self, fs: &mut FieldSet) -> Result<bool, SazonError> {
        check_units(fs, "t", "K", Self::NAME)?;
        check_units(fs, "exner", "1", Self::NAME)?;

        let t = fs.field("t")?.values().clone();
        let exner = fs.field("exner")?.values().clone();

        let product = fs.field_mut("pt")?;
        product
            .metadata_mut()
            .insert("units".to_string(), "K".to_string());
        let (nodes, levels) = (t.nrows(), t.ncols());
        for level in 0..levels {
            for node in 0..nodes {
                product.values_mut()[[node, level]] =
                    t[[node, level]] / exner[[node, level]];
            }
        }
        Ok(true)
    }
}
