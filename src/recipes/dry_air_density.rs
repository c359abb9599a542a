//! SZ-015: Dry-air density from pressure and virtual temperature.

use std::sync::Arc;

use crate::core::config::ConfigVars;
use crate::core::error::SazonError;
use crate::core::recipe::{Recipe, RecipeParameters};
use crate::fields::{FieldSet, FunctionSpace};

use super::check_units;

/// Ideal-gas density `rho = p / (rd · tv)`. The gas constant `rd` has no
/// sensible default and must be supplied through the config store; the
/// lookup happens at execution so construction stays infallible.
#[derive(Debug)]
pub struct DryAirDensity {
    config: Arc<ConfigVars>,
}

impl DryAirDensity {
    pub const NAME: &'static str = "ptv_to_rho";

    pub fn factory(
        _params: &RecipeParameters,
        config: Arc<ConfigVars>,
    ) -> Result<Box<dyn Recipe>, SazonError> {
        Ok(Box::new(Self { config }))
    }
}

impl Recipe for DryAirDensity {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn product(&self) -> &str {
        "rho"
    }

    fn ingredients(&self) -> Vec<String> {
        vec!["p".to_string(), "tv".to_string()]
    }

    fn product_levels(&self, fs: &FieldSet) -> Result<usize, SazonError> {
        Ok(fs.field("p")?.levels())
    }

    fn product_function_space(&self, fs: &FieldSet) -> Result<FunctionSpace, SazonError> {
        Ok(fs.field("p")?.function_space().clone())
    }

    fn execute_nl(&self, fs: &mut FieldSet) -> Result<bool, SazonError> {
        let rd = self.config.get_double("rd")?;

        check_units(fs, "p", "Pa", Self::NAME)?;
        check_units(fs, "tv", "K", Self::NAME)?;

        let p = fs.field("p")?.values().clone();
        let tv = fs.field("tv")?.values().clone();

        let product = fs.field_mut("rho")?;
        product
            .metadata_mut()
            .insert("units".to_string(), "kg m-3".to_string());
        let (nodes, levels) = (p.nrows(), p.ncols());
        for level in 0..levels {
            for node in 0..nodes {
                product.values_mut()[[node, level]] =
                    p[[node, level]] / (rd * tv[[node, level]]);
            }
        }
        Ok(true)
    }
}
