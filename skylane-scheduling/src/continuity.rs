use chrono::{DateTime, Utc};
use skylane_core::{Datastore, Error, FlightStore, ResourceRef};
use skylane_shared::HOME_BASE;

/// Decides whether a resource can legally take a flight departing from
/// `origin` at `departure`, given its existing schedule chain.
///
/// Only the chain tail — the latest non-cancelled assignment by effective
/// arrival — is consulted. That is sufficient because flight creation is
/// the single code path that extends a chain, and it runs this same check
/// first; by induction every stored chain is linear and its tail carries
/// the resource's final location and release time.
pub struct ContinuityChecker<'a> {
    store: &'a dyn Datastore,
}

impl<'a> ContinuityChecker<'a> {
    pub fn new(store: &'a dyn Datastore) -> Self {
        Self { store }
    }

    pub async fn is_eligible(
        &self,
        resource: &ResourceRef,
        origin: &str,
        departure: DateTime<Utc>,
    ) -> Result<bool, Error> {
        match self.store.chain_tail(resource).await? {
            // Never flown: anchored at the home base.
            None => Ok(origin == HOME_BASE),
            Some(tail) => {
                Ok(origin == tail.destination && departure >= tail.effective_arrival)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::*;
    use skylane_core::ResourceRef;
    use skylane_shared::CrewRole;
    use skylane_store::MemoryStore;

    #[tokio::test]
    async fn test_unscheduled_resource_is_anchored_at_home_base() {
        let store = MemoryStore::new();
        seed_big_aircraft(&store, "4X-EKA").await;

        let checker = ContinuityChecker::new(&store);
        let resource = ResourceRef::Aircraft("4X-EKA".to_string());

        assert!(checker
            .is_eligible(&resource, "TLV", dt(2025, 6, 1, 8, 0))
            .await
            .unwrap());
        assert!(!checker
            .is_eligible(&resource, "JFK", dt(2025, 6, 1, 8, 0))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_chain_tail_fixes_next_origin_and_release_time() {
        let store = MemoryStore::new();
        // TLV -> JFK, 400 minutes: effective arrival 14:40.
        let route = seed_route(&store, "TLV", "JFK", 400).await;
        seed_big_aircraft(&store, "4X-EKA").await;
        seed_flight(&store, route.id, "4X-EKA", dt(2025, 6, 1, 8, 0)).await;

        let checker = ContinuityChecker::new(&store);
        let resource = ResourceRef::Aircraft("4X-EKA".to_string());

        // Wrong origin: the aircraft ends up in JFK, not TLV.
        assert!(!checker
            .is_eligible(&resource, "TLV", dt(2025, 6, 2, 8, 0))
            .await
            .unwrap());

        // Right origin but before the chain tail releases the aircraft.
        assert!(!checker
            .is_eligible(&resource, "JFK", dt(2025, 6, 1, 14, 39))
            .await
            .unwrap());

        // Exactly at the effective arrival is allowed.
        assert!(checker
            .is_eligible(&resource, "JFK", dt(2025, 6, 1, 14, 40))
            .await
            .unwrap());
        assert!(checker
            .is_eligible(&resource, "JFK", dt(2025, 6, 2, 8, 0))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_cancelled_flights_leave_the_chain() {
        let store = MemoryStore::new();
        let route = seed_route(&store, "TLV", "JFK", 400).await;
        seed_big_aircraft(&store, "4X-EKA").await;
        let flight_id = seed_flight(&store, route.id, "4X-EKA", dt(2025, 6, 1, 8, 0)).await;

        cancel_flight_row(&store, flight_id).await;

        let checker = ContinuityChecker::new(&store);
        let resource = ResourceRef::Aircraft("4X-EKA".to_string());

        // With its only flight cancelled the aircraft is back at TLV.
        assert!(checker
            .is_eligible(&resource, "TLV", dt(2025, 6, 2, 8, 0))
            .await
            .unwrap());
        assert!(!checker
            .is_eligible(&resource, "JFK", dt(2025, 6, 2, 8, 0))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_crew_chains_are_tracked_per_member() {
        let store = MemoryStore::new();
        let route = seed_route(&store, "TLV", "JFK", 400).await;
        seed_big_aircraft(&store, "4X-EKA").await;
        seed_pilot(&store, "P-100", true).await;
        seed_pilot(&store, "P-200", true).await;
        seed_flight_with_crew(
            &store,
            route.id,
            "4X-EKA",
            dt(2025, 6, 1, 8, 0),
            &["P-100".to_string()],
            &[],
        )
        .await;

        let checker = ContinuityChecker::new(&store);

        let assigned = ResourceRef::Crew(CrewRole::Pilot, "P-100".to_string());
        let unassigned = ResourceRef::Crew(CrewRole::Pilot, "P-200".to_string());

        assert!(checker
            .is_eligible(&assigned, "JFK", dt(2025, 6, 2, 8, 0))
            .await
            .unwrap());
        assert!(!checker
            .is_eligible(&assigned, "TLV", dt(2025, 6, 2, 8, 0))
            .await
            .unwrap());
        assert!(checker
            .is_eligible(&unassigned, "TLV", dt(2025, 6, 2, 8, 0))
            .await
            .unwrap());
    }
}
