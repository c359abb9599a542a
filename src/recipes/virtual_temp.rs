//! SZ-012: Virtual temperature from temperature and specific humidity.

use std::sync::Arc;

use tracing::debug;

use crate::core::config::ConfigVars;
use crate::core::error::SazonError;
use crate::core::recipe::{Recipe, RecipeParameters};
use crate::fields::{FieldSet, FunctionSpace};

use super::check_units;

const DEFAULT_ZVIR: f64 = 0.61;

/// `tv = t · (1 + zvir · q)` where `zvir = Rv/Rd − 1`.
#[derive(Debug)]
pub struct VirtualTemp {
    zvir: f64,
}

impl VirtualTemp {
    pub const NAME: &'static str = "tq_to_tv";

    pub fn from_params(
        params: &RecipeParameters,
        config: Arc<ConfigVars>,
    ) -> Result<Self, SazonError> {
        let zvir = match params.option_f64("zvir") {
            Some(v) => v,
            None => config.get_double_or("zvir", DEFAULT_ZVIR)?,
        };
        debug!(zvir, "tq_to_tv constructed");
        Ok(Self { zvir })
    }

    pub fn factory(
        params: &RecipeParameters,
        config: Arc<ConfigVars>,
    ) -> Result<Box<dyn Recipe>, SazonError> {
        Ok(Box::new(Self::from_params(params, config)?))
    }
}

impl Recipe for VirtualTemp {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn product(&self) -> &str {
        "tv"
    }

    fn ingredients(&self) -> Vec<String> {
        vec!["t".to_string(), "q".to_string()]
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
        check_units(fs, "q", "kg kg-1", Self::NAME)?;

        let t = fs.field("t")?.values().clone();
        let q = fs.field("q")?.values().clone();

        let product = fs.field_mut("tv")?;
        product
            .metadata_mut()
            .insert("units".to_string(), "K".to_string());
        let (nodes, levels) = (t.nrows(), t.ncols());
        for level in 0..levels {
            for node in 0..nodes {
                product.values_mut()[[node, level]] =
                    t[[node, level]] * (1.0 + self.zvir * q[[node, level]]);
            }
        }
        Ok(true)
    }

    fn execute_tl(&self, fs: &mut FieldSet, trajectory: &FieldSet) -> Result<bool, SazonError> {
        let t0 = trajectory.field("t")?.values().clone();
        let q0 = trajectory.field("q")?.values().clone();
        let dt = fs.field("t")?.values().clone();
        let dq = fs.field("q")?.values().clone();

        let product = fs.field_mut("tv")?;
        let (nodes, levels) = (dt.nrows(), dt.ncols());
        for level in 0..levels {
            for node in 0..nodes {
                product.values_mut()[[node, level]] = (1.0 + self.zvir * q0[[node, level]])
                    * dt[[node, level]]
                    + self.zvir * t0[[node, level]] * dq[[node, level]];
            }
        }
        Ok(true)
    }

    fn execute_ad(&self, fs: &mut FieldSet, trajectory: &FieldSet) -> Result<bool, SazonError> {
        let t0 = trajectory.field("t")?.values().clone();
        let q0 = trajectory.field("q")?.values().clone();
        let tv_bar = fs.field("tv")?.values().clone();
        let (nodes, levels) = (t0.nrows(), t0.ncols());

        {
            let t_bar = fs.field_mut("t")?;
            for level in 0..levels {
                for node in 0..nodes {
                    t_bar.values_mut()[[node, level]] +=
                        (1.0 + self.zvir * q0[[node, level]]) * tv_bar[[node, level]];
                }
            }
        }
        {
            let q_bar = fs.field_mut("q")?;
            for level in 0..levels {
                for node in 0..nodes {
                    q_bar.values_mut()[[node, level]] +=
                        self.zvir * t0[[node, level]] * tv_bar[[node, level]];
                }
            }
        }
        fs.field_mut("tv")?.values_mut().fill(0.0);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::super::test_util::{dot, grid, random_field};
    use super::*;
    use crate::fields::Field;

    fn defaulted() -> VirtualTemp {
        VirtualTemp::from_params(
            &RecipeParameters::named(VirtualTemp::NAME),
            Arc::new(ConfigVars::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_sz012_nl_moist_correction() {
        let recipe = defaulted();
        let mut fs = FieldSet::new();
        fs.add(
            Field::from_values("t", grid(1), array![[300.0]])
                .unwrap()
                .with_units("K"),
        )
        .unwrap();
        fs.add(
            Field::from_values("q", grid(1), array![[0.01]])
                .unwrap()
                .with_units("kg kg-1"),
        )
        .unwrap();
        fs.add(Field::new("tv", grid(1), 1)).unwrap();

        recipe.execute_nl(&mut fs).unwrap();
        assert_relative_eq!(
            fs.field("tv").unwrap().values()[[0, 0]],
            300.0 * (1.0 + 0.61 * 0.01),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sz012_dry_air_is_unchanged() {
        let recipe = defaulted();
        let mut fs = FieldSet::new();
        fs.add(
            Field::from_values("t", grid(1), array![[288.0]])
                .unwrap()
                .with_units("K"),
        )
        .unwrap();
        fs.add(
            Field::from_values("q", grid(1), array![[0.0]])
                .unwrap()
                .with_units("kg kg-1"),
        )
        .unwrap();
        fs.add(Field::new("tv", grid(1), 1)).unwrap();

        recipe.execute_nl(&mut fs).unwrap();
        assert_relative_eq!(fs.field("tv").unwrap().values()[[0, 0]], 288.0);
    }

    #[test]
    fn test_sz012_adjoint_identity() {
        let recipe = defaulted();
        let mut rng = StdRng::seed_from_u64(11);
        let (nodes, levels) = (3, 5);

        let mut trajectory = FieldSet::new();
        trajectory
            .add(random_field(&mut rng, "t", nodes, levels, 250.0..310.0, "K"))
            .unwrap();
        trajectory
            .add(random_field(
                &mut rng,
                "q",
                nodes,
                levels,
                0.0..0.02,
                "kg kg-1",
            ))
            .unwrap();

        let mut dx = FieldSet::new();
        dx.add(random_field(&mut rng, "t", nodes, levels, -1.0..1.0, "K"))
            .unwrap();
        dx.add(random_field(
            &mut rng,
            "q",
            nodes,
            levels,
            -1e-3..1e-3,
            "kg kg-1",
        ))
        .unwrap();
        dx.add(Field::new("tv", grid(nodes), levels)).unwrap();

        let mut dy = FieldSet::new();
        dy.add(random_field(&mut rng, "t", nodes, levels, -1.0..1.0, "K"))
            .unwrap();
        dy.add(random_field(
            &mut rng,
            "q",
            nodes,
            levels,
            -1.0..1.0,
            "kg kg-1",
        ))
        .unwrap();
        dy.add(random_field(&mut rng, "tv", nodes, levels, -1.0..1.0, "K"))
            .unwrap();

        let mut m_dx = dx.deep_copy();
        recipe.execute_tl(&mut m_dx, &trajectory).unwrap();
        let mut mt_dy = dy.deep_copy();
        recipe.execute_ad(&mut mt_dy, &trajectory).unwrap();

        let names = ["t", "q", "tv"];
        assert_relative_eq!(
            dot(&m_dx, &dy, &names),
            dot(&dx, &mt_dy, &names),
            max_relative = 1e-12
        );
    }
}
