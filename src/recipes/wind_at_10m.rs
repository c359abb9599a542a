//! SZ-014: 10-meter wind from a 3-D wind component.

use std::sync::Arc;

use crate::core::config::ConfigVars;
use crate::core::error::SazonError;
use crate::core::recipe::{Recipe, RecipeParameters};
use crate::fields::{FieldSet, FunctionSpace};

use super::check_units;

/// Extracts the lowest model level of a wind component into a
/// single-level diagnostic field. The lowest model level is the last
/// vertical index.
#[derive(Debug)]
pub struct WindAt10m {
    name: &'static str,
    product: &'static str,
    ingredient: &'static str,
}

impl WindAt10m {
    pub const U_NAME: &'static str = "u_to_u10";
    pub const V_NAME: &'static str = "v_to_v10";

    pub fn u() -> Self {
        Self {
            name: Self::U_NAME,
            product: "uwind_at_10m",
            ingredient: "u",
        }
    }

    pub fn v() -> Self {
        Self {
            name: Self::V_NAME,
            product: "vwind_at_10m",
            ingredient: "v",
        }
    }

    pub fn u_factory(
        _params: &RecipeParameters,
        _config: Arc<ConfigVars>,
    ) -> Result<Box<dyn Recipe>, SazonError> {
        Ok(Box::new(Self::u()))
    }

    pub fn v_factory(
        _params: &RecipeParameters,
        _config: Arc<ConfigVars>,
    ) -> Result<Box<dyn Recipe>, SazonError> {
        Ok(Box::new(Self::v()))
    }
}

impl Recipe for WindAt10m {
    fn name(&self) -> &str {
        self.name
    }

    fn product(&self) -> &str {
        self.product
    }

    fn ingredients(&self) -> Vec<String> {
        vec![self.ingredient.to_string()]
    }

    fn has_tlad(&self) -> bool {
        true
    }

    fn product_levels(&self, _fs: &FieldSet) -> Result<usize, SazonError> {
        Ok(1)
    }

    fn product_function_space(&self, fs: &FieldSet) -> Result<FunctionSpace, SazonError> {
        Ok(fs.field(self.ingredient)?.function_space().clone())
    }

    fn execute_nl(&self, fs: &mut FieldSet) -> Result<bool, SazonError> {
        check_units(fs, self.ingredient, "m s-1", self.name)?;

        let wind = fs.field(self.ingredient)?.values().clone();
        let lowest = wind.ncols() - 1;

        let product = fs.field_mut(self.product)?;
        product
            .metadata_mut()
            .insert("units".to_string(), "m s-1".to_string());
        for node in 0..wind.nrows() {
            product.values_mut()[[node, 0]] = wind[[node, lowest]];
        }
        Ok(true)
    }

    fn execute_tl(&self, fs: &mut FieldSet, _trajectory: &FieldSet) -> Result<bool, SazonError> {
        let dwind = fs.field(self.ingredient)?.values().clone();
        let lowest = dwind.ncols() - 1;

        let product = fs.field_mut(self.product)?;
        for node in 0..dwind.nrows() {
            product.values_mut()[[node, 0]] = dwind[[node, lowest]];
        }
        Ok(true)
    }

    fn execute_ad(&self, fs: &mut FieldSet, _trajectory: &FieldSet) -> Result<bool, SazonError> {
        let product_bar = fs.field(self.product)?.values().clone();

        let wind_bar = fs.field_mut(self.ingredient)?;
        let lowest = wind_bar.levels() - 1;
        for node in 0..product_bar.nrows() {
            wind_bar.values_mut()[[node, lowest]] += product_bar[[node, 0]];
        }
        fs.field_mut(self.product)?.values_mut().fill(0.0);
        Ok(true)
    }
}
