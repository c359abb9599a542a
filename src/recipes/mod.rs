//! SZ-009: Shipped recipe implementations.
//!
//! Each file holds one transform satisfying the recipe contract. The
//! physics is deliberately simple; these recipes exist to populate the
//! default cookbook and to exercise every corner of the contract
//! (parameter blocks, config lookups, setup passes, TL/AD pairs,
//! products with reshaped output).

pub mod dry_air_density;
pub mod exner_to_ptemp;
pub mod temp_to_ptemp;
pub mod total_water;
pub mod virtual_temp;
pub mod wind_at_10m;

pub use dry_air_density::DryAirDensity;
pub use exner_to_ptemp::ExnerToPTemp;
pub use temp_to_ptemp::TempToPTemp;
pub use total_water::TotalWater;
pub use virtual_temp::VirtualTemp;
pub use wind_at_10m::WindAt10m;

use crate::core::error::SazonError;
use crate::core::recipe::RecipeRegistry;
use crate::fields::FieldSet;

/// Registry pre-populated with every recipe in this module.
pub fn builtin_registry() -> Result<RecipeRegistry, SazonError> {
    let mut registry = RecipeRegistry::new();
    registry.register(TempToPTemp::NAME, TempToPTemp::factory)?;
    registry.register(ExnerToPTemp::NAME, ExnerToPTemp::factory)?;
    registry.register(VirtualTemp::NAME, VirtualTemp::factory)?;
    registry.register(TotalWater::NAME, TotalWater::factory)?;
    registry.register(WindAt10m::U_NAME, WindAt10m::u_factory)?;
    registry.register(WindAt10m::V_NAME, WindAt10m::v_factory)?;
    registry.register(DryAirDensity::NAME, DryAirDensity::factory)?;
    Ok(registry)
}

/// Validate an ingredient's `"units"` metadata tag. A missing tag counts
/// as a mismatch; recipes fail loudly rather than convert.
pub(crate) fn check_units(
    fs: &FieldSet,
    field: &str,
    expected: &str,
    recipe: &str,
) -> Result<(), SazonError> {
    let found = fs.field(field)?.units().unwrap_or("").to_string();
    if found != expected {
        return Err(SazonError::UnitMismatch {
            field: field.to_string(),
            recipe: recipe.to_string(),
            expected: expected.to_string(),
            found,
        });
    }
    Ok(())
}
