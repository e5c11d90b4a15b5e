use tracing::trace;

use crate::map::{Map, UnitId};
use crate::plan::District;

impl District {
    /// Adjust the computed characteristics by the contribution of `units`:
    /// added when `combine` is true, removed otherwise.
    ///
    /// Only subjects with a non-zero sum over `units` are touched; a missing
    /// characteristic starts at zero. Returns whether anything changed.
    pub fn delta_stats(&mut self, units: &[UnitId], combine: bool, map: &Map) -> bool {
        let mut changed = false;
        for subject in map.subjects() {
            let Some(sum) = map.sum_characteristic(units, subject.id) else { continue };
            if sum == 0.0 {
                continue;
            }

            let number = self.stats.entry(subject.id).or_insert(0.0);
            if combine { *number += sum } else { *number -= sum }
            trace!(district = %self.district_id, subject = %subject.name, delta = sum, combine, "adjusted aggregate");
            changed = true;
        }
        changed
    }
}
