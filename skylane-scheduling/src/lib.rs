pub mod continuity;
pub mod eligibility;
pub mod planner;
pub mod reconciler;

pub use continuity::ContinuityChecker;
pub use eligibility::{CrewCandidates, CrewRequirement, EligibilityResolver};
pub use planner::{FlightPlan, FlightPlanner};
pub use reconciler::reconcile;

#[cfg(test)]
pub(crate) mod testkit;
