use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use skylane_core::{
    CrewStore, Datastore, Error, FleetStore, FlightStore, NewFlight, ResourceRef, RouteStore,
    TimeWindow,
};
use skylane_shared::{AircraftSize, CrewRole, Route};
use tracing::info;

use crate::continuity::ContinuityChecker;
use crate::eligibility::CrewRequirement;

/// A manager's flight-creation submission: the chosen aircraft and crew
/// for a route and departure time.
#[derive(Debug, Clone, Deserialize)]
pub struct FlightPlan {
    pub route_id: i64,
    pub tail_number: String,
    pub departure: DateTime<Utc>,
    pub economy_price_cents: i32,
    pub business_price_cents: i32,
    pub pilots: Vec<String>,
    pub attendants: Vec<String>,
}

/// Turns a validated plan into a flight plus its crew assignments, in one
/// unit of work.
///
/// Every rule the eligibility resolver applied when listing candidates is
/// re-checked here against current state — the submission may be stale or
/// tampered with, so the earlier candidate lists count for nothing.
pub struct FlightPlanner<'a> {
    store: &'a dyn Datastore,
}

impl<'a> FlightPlanner<'a> {
    pub fn new(store: &'a dyn Datastore) -> Self {
        Self { store }
    }

    pub async fn create_flight(
        &self,
        plan: &FlightPlan,
        now: DateTime<Utc>,
    ) -> Result<i64, Error> {
        if plan.departure <= now {
            return Err(Error::validation("departure must be in the future"));
        }
        if plan.economy_price_cents <= 0 || plan.business_price_cents < 0 {
            return Err(Error::validation("prices must be positive"));
        }

        let route = self
            .store
            .route(plan.route_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("route {}", plan.route_id)))?;
        let aircraft = self
            .store
            .aircraft(&plan.tail_number)
            .await?
            .ok_or_else(|| Error::not_found(format!("aircraft {}", plan.tail_number)))?;

        if route.is_long_haul() && aircraft.size != AircraftSize::Big {
            return Err(Error::validation(
                "long-haul routes require a big aircraft",
            ));
        }

        let required = CrewRequirement::for_size(aircraft.size);
        if plan.pilots.len() != required.pilots {
            return Err(Error::Validation(format!(
                "expected {} pilots, got {}",
                required.pilots,
                plan.pilots.len()
            )));
        }
        if plan.attendants.len() != required.attendants {
            return Err(Error::Validation(format!(
                "expected {} attendants, got {}",
                required.attendants,
                plan.attendants.len()
            )));
        }

        let mut seen = HashSet::new();
        for employee_id in plan.pilots.iter().chain(plan.attendants.iter()) {
            if !seen.insert(employee_id.as_str()) {
                return Err(Error::Validation(format!(
                    "crew member {employee_id} selected twice"
                )));
            }
        }

        let window = TimeWindow::new(
            plan.departure,
            plan.departure + Duration::minutes(route.duration_minutes as i64),
        );
        self.check_resource(
            &route,
            &window,
            plan.departure,
            ResourceRef::Aircraft(plan.tail_number.clone()),
        )
        .await?;
        self.check_crew(&route, &window, plan.departure, &plan.pilots, CrewRole::Pilot)
            .await?;
        self.check_crew(
            &route,
            &window,
            plan.departure,
            &plan.attendants,
            CrewRole::Attendant,
        )
        .await?;

        let flight = NewFlight {
            route_id: route.id,
            tail_number: plan.tail_number.clone(),
            departure: plan.departure,
            economy_price_cents: plan.economy_price_cents,
            business_price_cents: plan.business_price_cents,
        };
        let flight_id = self
            .store
            .insert_flight(&flight, &plan.pilots, &plan.attendants)
            .await?;

        info!(
            flight_id,
            route_id = route.id,
            tail_number = %plan.tail_number,
            "flight created"
        );
        Ok(flight_id)
    }

    async fn check_crew(
        &self,
        route: &Route,
        window: &TimeWindow,
        departure: DateTime<Utc>,
        employee_ids: &[String],
        role: CrewRole,
    ) -> Result<(), Error> {
        for employee_id in employee_ids {
            let member = self
                .store
                .crew_member(employee_id)
                .await?
                .ok_or_else(|| Error::not_found(format!("crew member {employee_id}")))?;
            if member.role != role {
                return Err(Error::Validation(format!(
                    "{employee_id} is not a {}",
                    role.as_str().to_lowercase()
                )));
            }
            if route.is_long_haul() && !member.long_haul_qualified {
                return Err(Error::Validation(format!(
                    "{employee_id} is not qualified for long-haul flights"
                )));
            }
            self.check_resource(
                route,
                window,
                departure,
                ResourceRef::Crew(role, employee_id.clone()),
            )
            .await?;
        }
        Ok(())
    }

    async fn check_resource(
        &self,
        route: &Route,
        window: &TimeWindow,
        departure: DateTime<Utc>,
        resource: ResourceRef,
    ) -> Result<(), Error> {
        if self
            .store
            .has_overlapping_assignment(&resource, window)
            .await?
        {
            return Err(Error::Validation(format!(
                "{} already has a flight in that window",
                describe(&resource)
            )));
        }
        let checker = ContinuityChecker::new(self.store);
        if !checker
            .is_eligible(&resource, &route.origin, departure)
            .await?
        {
            return Err(Error::Validation(format!(
                "{} cannot depart from {} at that time",
                describe(&resource),
                route.origin
            )));
        }
        Ok(())
    }
}

fn describe(resource: &ResourceRef) -> String {
    match resource {
        ResourceRef::Aircraft(tail) => format!("aircraft {tail}"),
        ResourceRef::Crew(role, id) => {
            format!("{} {id}", role.as_str().to_lowercase())
        }
    }
}
