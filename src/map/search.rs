use std::collections::BTreeSet;

use tracing::debug;

use crate::error::EditError;
use crate::geom::Shape;
use crate::map::{Map, UnitId, UnitRef, LevelId};

impl Map {
    /// Find the units of the seed selection that lie inside (or outside) a
    /// boundary, as coarse as possible.
    ///
    /// Seed units at `seed_level` are tested first: base units by their
    /// representative point, coarser units by polygon containment (`inside`)
    /// or disjointness (`!inside`). The part of the selection those units do
    /// not resolve is carried down level by level, and each finer level
    /// contributes the units lying inside that remainder. Every base unit under
    /// the selection ends up on exactly one side of the boundary.
    ///
    /// A missing boundary contains nothing: searching inside it returns no
    /// units, searching outside it returns the whole selection.
    pub fn find_units(
        &self,
        seed_ids: &[UnitId],
        seed_level: LevelId,
        boundary: Option<&Shape>,
        inside: bool,
    ) -> Result<Vec<UnitRef<'_>>, EditError> {
        if boundary.is_none() && inside {
            return Ok(Vec::new());
        }

        let seed_rank = self.level_index(seed_level)?;
        let layer = &self.layers[seed_rank];
        let seeds = seed_ids.iter().copied().collect::<BTreeSet<_>>();
        let positions = seeds.iter()
            .map(|&id| layer.position(id).ok_or(EditError::UnknownUnit(id)))
            .collect::<Result<Vec<_>, _>>()?;

        let selection = Shape::union_all(positions.iter().map(|&idx| layer.geom(idx)), self.epsg);
        let boundary = boundary.cloned().unwrap_or_else(|| Shape::empty(selection.epsg()));

        let mut found = positions.into_iter()
            .filter(|&idx| layer.matches(idx, &boundary, inside))
            .map(|idx| layer.unit_ref(idx))
            .collect::<Vec<_>>();

        if layer.is_base() {
            return Ok(found);
        }

        for layer in &self.layers[seed_rank + 1..] {
            let collected = Shape::union_all(found.iter().map(|unit| unit.geom), self.epsg);
            let unresolved = selection.difference(&collected);
            let remainder = if inside {
                boundary.intersection(&unresolved)
            } else {
                unresolved.difference(&boundary)
            };

            if remainder.is_empty() {
                debug!(level = %layer.level().id, "nothing left to resolve");
                continue;
            }

            let region = remainder.simplify(self.simplify_tolerance);
            let matches = layer.units_inside(&region);
            debug!(level = %layer.level().id, count = matches.len(), inside, "resolved remainder");
            found.extend(matches.into_iter().map(|idx| layer.unit_ref(idx)));
        }

        Ok(found)
    }
}
