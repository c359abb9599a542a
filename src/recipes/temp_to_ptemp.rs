//! SZ-010: Potential temperature from temperature and surface pressure.

use std::sync::Arc;

use tracing::debug;

use crate::core::config::ConfigVars;
use crate::core::error::SazonError;
use crate::core::recipe::{Recipe, RecipeParameters};
use crate::fields::{FieldSet, FunctionSpace};

use super::check_units;

const DEFAULT_P0: f64 = 1000.0;
const DEFAULT_KAPPA: f64 = 0.286;

/// The Poisson relation `pt = t · (p0 / ps)^kappa` on every node and
/// level; `ps` carries a single surface level. `p0` and `kappa` come
/// from the parameter block when given, else the config store, else the
/// defaults above.
#[derive(Debug)]
pub struct TempToPTemp {
    p0: f64,
    kappa: f64,
}

impl TempToPTemp {
    pub const NAME: &'static str = "t_to_pt";

    pub fn from_params(
        params: &RecipeParameters,
        config: Arc<ConfigVars>,
    ) -> Result<Self, SazonError> {
        let p0 = match params.option_f64("p0") {
            Some(v) => v,
            None => config.get_double_or("p0", DEFAULT_P0)?,
        };
        let kappa = match params.option_f64("kappa") {
            Some(v) => v,
            None => config.get_double_or("kappa", DEFAULT_KAPPA)?,
        };
        debug!(p0, kappa, "t_to_pt constructed");
        Ok(Self { p0, kappa })
    }

    pub fn factory(
        params: &RecipeParameters,
        config: Arc<ConfigVars>,
    ) -> Result<Box<dyn Recipe>, SazonError> {
        Ok(Box::new(Self::from_params(params, config)?))
    }

    fn ratio(&self, ps: f64) -> f64 {
        (self.p0 / ps).powf(self.kappa)
    }
}

impl Recipe for TempToPTemp {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn product(&self) -> &str {
        "pt"
    }

    fn ingredients(&self) -> Vec<String> {
        vec!["t".to_string(), "ps".to_string()]
    }

    fn has_tlad(&self) -> bool {
        true
    }

    fn product_levels(&self, fs: &FieldSet) -> Result<usize, SazonError> {
        Ok(fs.field("t")?.levels())
    }

    fn product_function_space(&self, fs: &FieldSet) -> Result<FunctionSpace, SazonError> {
        Ok(fs.field("t")?.function_space().clone())
    }

    fn execute_nl(&self, fs: &mut FieldSet) -> Result<bool, SazonError> {
        check_units(fs, "t", "K", Self::NAME)?;
        check_units(fs, "ps", "hPa", Self::NAME)?;

        let t = fs.field("t")?.values().clone();
        let ps = fs.field("ps")?.values().clone();

        let product = fs.field_mut("pt")?;
        product
            .metadata_mut()
            .insert("units".to_string(), "K".to_string());
        let (nodes, levels) = (t.nrows(), t.ncols());
        for level in 0..levels {
            for node in 0..nodes {
                product.values_mut()[[node, level]] =
                    t[[node, level]] * self.ratio(ps[[node, 0]]);
            }
        }
        Ok(true)
    }

    fn execute_tl(&self, fs: &mut FieldSet, trajectory: &FieldSet) -> Result<bool, SazonError> {
        let t0 = trajectory.field("t")?.values().clone();
        let ps0 = trajectory.field("ps")?.values().clone();
        let dt = fs.field("t")?.values().clone();
        let dps = fs.field("ps")?.values().clone();

        let product = fs.field_mut("pt")?;
        let (nodes, levels) = (dt.nrows(), dt.ncols());
        for level in 0..levels {
            for node in 0..nodes {
                let ratio = self.ratio(ps0[[node, 0]]);
                product.values_mut()[[node, level]] = ratio * dt[[node, level]]
                    - self.kappa * t0[[node, level]] * ratio / ps0[[node, 0]]
                        * dps[[node, 0]];
            }
        }
        Ok(true)
    }

    fn execute_ad(&self, fs: &mut FieldSet, trajectory: &FieldSet) -> Result<bool, SazonError> {
        let t0 = trajectory.field("t")?.values().clone();
        let ps0 = trajectory.field("ps")?.values().clone();
        let pt_bar = fs.field("pt")?.values().clone();
        let (nodes, levels) = (t0.nrows(), t0.ncols());

        {
            let t_bar = fs.field_mut("t")?;
            for level in 0..levels {
                for node in 0..nodes {
                    t_bar.values_mut()[[node, level]] +=
                        self.ratio(ps0[[node, 0]]) * pt_bar[[node, level]];
                }
            }
        }
        {
            let ps_bar = fs.field_mut("ps")?;
            for level in 0..levels {
                for node in 0..nodes {
                    let ratio = self.ratio(ps0[[node, 0]]);
                    ps_bar.values_mut()[[node, 0]] -= self.kappa * t0[[node, level]] * ratio
                        / ps0[[node, 0]]
                        * pt_bar[[node, level]];
                }
            }
        }
        fs.field_mut("pt")?.values_mut().fill(0.0);
        Ok(true)
    }
}
