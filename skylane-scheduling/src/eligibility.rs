use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use skylane_core::{CrewStore, Datastore, Error, FleetStore, FlightStore, ResourceRef, TimeWindow};
use skylane_shared::{Aircraft, AircraftSize, CrewMember, CrewRole, Route};
use tracing::debug;

use crate::continuity::ContinuityChecker;

/// Crew headcount demanded by an aircraft size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrewRequirement {
    pub pilots: usize,
    pub attendants: usize,
}

impl CrewRequirement {
    pub fn for_size(size: AircraftSize) -> Self {
        match size {
            AircraftSize::Big => CrewRequirement {
                pilots: 3,
                attendants: 6,
            },
            AircraftSize::Small => CrewRequirement {
                pilots: 2,
                attendants: 3,
            },
        }
    }
}

/// Candidate crew for a planned flight. A shortfall is a warning for the
/// caller, not an error: the partial sets are still returned and the
/// manager decides whether to proceed or abandon.
#[derive(Debug, Clone, Serialize)]
pub struct CrewCandidates {
    pub pilots: Vec<CrewMember>,
    pub attendants: Vec<CrewMember>,
    pub required: CrewRequirement,
}

impl CrewCandidates {
    pub fn pilot_shortfall(&self) -> bool {
        self.pilots.len() < self.required.pilots
    }

    pub fn attendant_shortfall(&self) -> bool {
        self.attendants.len() < self.required.attendants
    }

    pub fn has_shortfall(&self) -> bool {
        self.pilot_shortfall() || self.attendant_shortfall()
    }
}

/// Produces the assignable resource sets for a planned flight: size and
/// qualification rules first, then time-overlap, then location continuity.
pub struct EligibilityResolver<'a> {
    store: &'a dyn Datastore,
}

impl<'a> EligibilityResolver<'a> {
    pub fn new(store: &'a dyn Datastore) -> Self {
        Self { store }
    }

    fn window_for(route: &Route, departure: DateTime<Utc>) -> TimeWindow {
        TimeWindow::new(
            departure,
            departure + Duration::minutes(route.duration_minutes as i64),
        )
    }

    pub async fn assignable_aircraft(
        &self,
        route: &Route,
        departure: DateTime<Utc>,
    ) -> Result<Vec<Aircraft>, Error> {
        let window = Self::window_for(route, departure);
        let checker = ContinuityChecker::new(self.store);

        let mut candidates = Vec::new();
        for aircraft in self.store.list_aircraft().await? {
            if route.is_long_haul() && aircraft.size != AircraftSize::Big {
                continue;
            }
            let resource = ResourceRef::Aircraft(aircraft.tail_number.clone());
            if self
                .store
                .has_overlapping_assignment(&resource, &window)
                .await?
            {
                continue;
            }
            if !checker
                .is_eligible(&resource, &route.origin, departure)
                .await?
            {
                continue;
            }
            candidates.push(aircraft);
        }
        debug!(
            route_id = route.id,
            candidates = candidates.len(),
            "resolved assignable aircraft"
        );
        Ok(candidates)
    }

    pub async fn assignable_crew(
        &self,
        route: &Route,
        departure: DateTime<Utc>,
        aircraft: &Aircraft,
    ) -> Result<CrewCandidates, Error> {
        let required = CrewRequirement::for_size(aircraft.size);
        let pilots = self
            .assignable_members(route, departure, CrewRole::Pilot)
            .await?;
        let attendants = self
            .assignable_members(route, departure, CrewRole::Attendant)
            .await?;

        let candidates = CrewCandidates {
            pilots,
            attendants,
            required,
        };
        if candidates.has_shortfall() {
            debug!(
                route_id = route.id,
                pilots = candidates.pilots.len(),
                attendants = candidates.attendants.len(),
                required_pilots = required.pilots,
                required_attendants = required.attendants,
                "crew candidate shortfall"
            );
        }
        Ok(candidates)
    }

    async fn assignable_members(
        &self,
        route: &Route,
        departure: DateTime<Utc>,
        role: CrewRole,
    ) -> Result<Vec<CrewMember>, Error> {
        let window = Self::window_for(route, departure);
        let checker = ContinuityChecker::new(self.store);

        let mut candidates = Vec::new();
        for member in self.store.list_crew(role, route.is_long_haul()).await? {
            let resource = ResourceRef::Crew(role, member.employee_id.clone());
            if self
                .store
                .has_overlapping_assignment(&resource, &window)
                .await?
            {
                continue;
            }
            if !checker
                .is_eligible(&resource, &route.origin, departure)
                .await?
            {
                continue;
            }
            candidates.push(member);
        }
        Ok(candidates)
    }
}
