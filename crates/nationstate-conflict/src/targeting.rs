//! Checks shared by every hostile action against a city.

use nationstate_types::{Nation, Tile};

use crate::error::ConflictError;

/// Verify `attacker` may act against the city on `tile` owned by `defender`.
///
/// The tile must hold a city owned by `defender`, not by `attacker`, and
/// `attacker` must have surveyed it.
pub fn validate_target(attacker: &Nation, defender: &Nation, tile: &Tile) -> Result<(), ConflictError> {
    let Some(city) = &tile.city else {
        return Err(ConflictError::TileHasNoCity(tile.id));
    };
    if city.owner == attacker.id {
        return Err(ConflictError::OwnCity(tile.id));
    }
    if city.owner != defender.id {
        return Err(ConflictError::DefenderMismatch {
            tile: tile.id,
            nation: defender.id.clone(),
        });
    }
    if !tile.is_surveyed_by(&attacker.id) {
        return Err(ConflictError::NotSurveyed(tile.id));
    }
    Ok(())
}
