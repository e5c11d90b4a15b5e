use serde::Serialize;

use crate::geom::Shape;
use crate::map::SubjectId;
use crate::plan::{DistrictId, Plan};

/// One row of the outward district feed: a district as of a version, one of
/// its computed characteristics, and its simplified boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictFeature {
    pub district_id: DistrictId,
    pub name: String,
    pub version: u32,
    pub subject: SubjectId,
    pub number: f64,
    pub simple: Shape,
}

impl Plan {
    /// The districts current at `version` that hold a value for `subject`,
    /// ordered by district id.
    pub fn district_feed(&self, version: u32, subject: SubjectId) -> Vec<DistrictFeature> {
        self.store.current_districts(version).into_iter()
            .filter_map(|district| district.computed(subject).map(|number| DistrictFeature {
                district_id: district.district_id,
                name: district.name.clone(),
                version: district.version,
                subject,
                number,
                simple: district.simple.clone(),
            }))
            .collect()
    }

    /// Union of the boundaries of the districts current at `version`.
    pub fn territory(&self, version: u32) -> Shape {
        Shape::union_all(self.store.current_districts(version).into_iter().map(|district| district.shape()), self.epsg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::DEFAULT_EPSG;
    use crate::plan::{PlanId, UserId};

    #[test]
    fn districts_without_the_subject_are_left_out() {
        let mut plan = Plan::new(PlanId(1), "Plan", UserId(1), DEFAULT_EPSG);
        let mut unassigned = plan.districts()[0].snapshot(0);
        unassigned.stats.insert(SubjectId(1), 450.0);
        plan.store.insert(unassigned);

        let feed = plan.district_feed(0, SubjectId(1));
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].district_id, DistrictId::UNASSIGNED);
        assert_eq!(feed[0].number, 450.0);
        assert!(feed[0].simple.is_empty());

        assert!(plan.district_feed(0, SubjectId(2)).is_empty());
    }

    #[test]
    fn feed_serializes_to_json() {
        let feature = DistrictFeature {
            district_id: DistrictId(2),
            name: "District 2".into(),
            version: 4,
            subject: SubjectId(1),
            number: 12.5,
            simple: Shape::empty(DEFAULT_EPSG),
        };
        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["district_id"], 2);
        assert_eq!(json["version"], 4);
        assert_eq!(json["number"], 12.5);
    }
}
