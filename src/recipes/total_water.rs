//! SZ-013: Total water from vapor, liquid, and ice specific contents.

use std::sync::Arc;

use crate::core::config::ConfigVars;
use crate::core::error::SazonError;
use crate::core::recipe::{Recipe, RecipeParameters};
use crate::fields::{FieldSet, FunctionSpace};

use super::check_units;

/// `qt = qv + ql + qi`, element-wise. Uses the setup pass to reject
/// ingredient fields whose shapes disagree before any value is touched.
#[derive(Debug, Default)]
pub struct TotalWater;

impl TotalWater {
    pub const NAME: &'static str = "qsum_to_qt";
    const INGREDIENTS: [&'static str; 3] = ["qv", "ql", "qi"];

    pub fn factory(
        _params: &RecipeParameters,
        _config: Arc<ConfigVars>,
    ) -> Result<Box<dyn Recipe>, SazonError> {
        Ok(Box::new(Self))
    }
}

impl Recipe for TotalWater {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn product(&self) -> &str {
        "qt"
    }

    fn ingredients(&self) -> Vec<String> {
        Self::INGREDIENTS.iter().map(|s| s.to_string()).collect()
    }

    fn has_tlad(&self) -> bool {
        true
    }

    fn requires_setup(&self) -> bool {
        true
    }

    fn setup(&self, fs: &FieldSet) -> Result<(), SazonError> {
        let reference = fs.field("qv")?.shape();
        for name in &Self::INGREDIENTS[1..] {
            let found = fs.field(name)?.shape();
            if found != reference {
                return Err(SazonError::ShapeMismatch {
                    field: name.to_string(),
                    expected: reference,
                    found,
                });
            }
        }
        Ok(())
    }

    fn product_levels(&self, fs: &FieldSet) -> Result<usize, SazonError> {
        Ok(fs.field("qv")?.levels())
    }

    fn product_function_space(&self, fs: &FieldSet) -> Result<FunctionSpace, SazonError> {
        Ok(fs.field("qv")?.function_space().clone())
    }

    fn execute_nl(&self, fs: &mut FieldSet) -> Result<bool, SazonError> {
        for name in &Self::INGREDIENTS {
            check_units(fs, name, "kg kg-1", Self::NAME)?;
        }

        let qv = fs.field("qv")?.values().clone();
        let ql = fs.field("ql")?.values().clone();
        let qi = fs.field("qi")?.values().clone();

        let product = fs.field_mut("qt")?;
        product
            .metadata_mut()
            .insert("units".to_string(), "kg kg-1".to_string());
        let (nodes, levels) = (qv.nrows(), qv.ncols());
        for level in 0..levels {
            for node in 0..nodes {
                product.values_mut()[[node, level]] =
                    qv[[node, level]] + ql[[node, level]] + qi[[node, level]];
            }
        }
        Ok(true)
    }

    fn execute_tl(&self, fs: &mut FieldSet, _trajectory: &FieldSet) -> Result<bool, SazonError> {
        // The sum is linear: the TL operator is the NL operator on the
        // perturbations, with no dependence on the trajectory.
        let qv = fs.field("qv")?.values().clone();
        let ql = fs.field("ql")?.values().clone();
        let qi = fs.field("qi")?.values().clone();

        let product = fs.field_mut("qt")?;
        let (nodes, levels) = (qv.nrows(), qv.ncols());
        for level in 0..levels {
            for node in 0..nodes {
                product.values_mut()[[node, level]] =
                    qv[[node, level]] + ql[[node, level]] + qi[[node, level]];
            }
        }
        Ok(true)
    }

    fn execute_ad(&self, fs: &mut FieldSet, _trajectory: &FieldSet) -> Result<bool, SazonError> {
        let qt_bar = fs.field("qt")?.values().clone();
        let (nodes, levels) = (qt_bar.nrows(), qt_bar.ncols());

        for name in &Self::INGREDIENTS {
            let ingredient_bar = fs.field_mut(name)?;
            for level in 0..levels {
                for node in 0..nodes {
                    ingredient_bar.values_mut()[[node, level]] += qt_bar[[node, level]];
                }
            }
        }
        fs.field_mut("qt")?.values_mut().fill(0.0);
        Ok(true)
    }
}
