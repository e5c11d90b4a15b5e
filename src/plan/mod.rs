mod access;
mod district;
mod edit;
mod feed;
mod ids;
mod plan;
mod stats;
mod store;

pub use access::{User, UserId};
pub use district::District;
pub use edit::StagedEdit;
pub use feed::DistrictFeature;
pub use ids::{DistrictId, PlanId, SnapshotId};
pub use plan::Plan;
pub use store::DistrictStore;
