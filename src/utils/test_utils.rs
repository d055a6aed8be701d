use chrono::{Duration, NaiveDate};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strum::IntoEnumIterator;

use crate::model::structures::{
    directory::{Constructor, Driver, LineageEntry},
    event::{Event, SessionResult},
    session_type::SessionType,
    ConstructorId, DriverId
};

const RANDOM_STATUSES: &[&str] = &["Engine", "Accident", "Gearbox", "Collision", "Disqualified", "+1 Lap"];

/// Events are spaced two weeks apart starting on the 1st of March.
pub fn event_date(season: i32, round: i32) -> NaiveDate {
    let opener = NaiveDate::from_ymd_opt(season, 3, 1).expect("Expected a valid season opener date");
    opener + Duration::days(14 * (round as i64 - 1))
}

pub fn generate_result(
    session: SessionType,
    driver_id: DriverId,
    constructor_id: ConstructorId,
    position: Option<i32>,
    status: Option<&str>
) -> SessionResult {
    SessionResult {
        session,
        driver_id,
        constructor_id,
        position,
        status: status.map(|s| s.to_string())
    }
}

pub fn generate_event(id: i32, season: i32, round: i32, results: Vec<SessionResult>) -> Event {
    Event {
        id,
        season,
        round,
        date: event_date(season, round),
        name: Some(format!("Round {} of {}", round, season)),
        results
    }
}

/// An event where every driver finishes both sessions in `grid` order.
pub fn generate_grid_event(id: i32, season: i32, round: i32, grid: &[(DriverId, ConstructorId)]) -> Event {
    let results = SessionType::iter()
        .flat_map(|session| {
            grid.iter().enumerate().map(move |(i, &(driver_id, constructor_id))| {
                generate_result(
                    session,
                    driver_id,
                    constructor_id,
                    Some(i as i32 + 1),
                    Some("Finished")
                )
            })
        })
        .collect();

    generate_event(id, season, round, results)
}

/// Two teammates where `winner` beats `loser` in qualifying and the race.
pub fn generate_teammate_event(
    id: i32,
    season: i32,
    round: i32,
    constructor_id: ConstructorId,
    winner: DriverId,
    loser: DriverId
) -> Event {
    generate_grid_event(id, season, round, &[(winner, constructor_id), (loser, constructor_id)])
}

pub fn generate_drivers(n_constructors: i32) -> Vec<Driver> {
    (1..=n_constructors)
        .flat_map(|c| [c * 10 + 1, c * 10 + 2])
        .map(|id| Driver {
            id,
            name: format!("Driver {}", id)
        })
        .collect()
}

pub fn generate_constructors(n_constructors: i32) -> Vec<Constructor> {
    (1..=n_constructors)
        .map(|id| Constructor {
            id,
            name: format!("Constructor {}", id)
        })
        .collect()
}

/// Constructor `n + 1` continues constructor 1's lineage, so generated seasons
/// exercise a rebrand.
pub fn generate_lineages(n_constructors: i32) -> Vec<LineageEntry> {
    vec![LineageEntry {
        constructor_id: n_constructors + 1,
        lineage_id: 1
    }]
}

/// Random but reproducible seasons. Constructor `c` fields drivers `10c + 1`
/// and `10c + 2`; from the second half of the seasons constructor 1 races as
/// constructor `n_constructors + 1`. Roughly one row in six retires with a
/// random status.
pub fn generate_seasons(n_seasons: i32, rounds: i32, n_constructors: i32, seed: u64) -> Vec<Event> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut events = Vec::with_capacity((n_seasons * rounds) as usize);
    let mut id = 1;

    for s in 0..n_seasons {
        let season = 1990 + s;
        for round in 1..=rounds {
            let mut results = Vec::new();
            for session in SessionType::iter() {
                let mut grid: Vec<(DriverId, ConstructorId)> = (1..=n_constructors)
                    .flat_map(|c| {
                        let entrant = if c == 1 && s >= n_seasons / 2 { n_constructors + 1 } else { c };
                        [(c * 10 + 1, entrant), (c * 10 + 2, entrant)]
                    })
                    .collect();
                grid.shuffle(&mut rng);

                for (i, (driver_id, constructor_id)) in grid.into_iter().enumerate() {
                    let retired = session == SessionType::Race && rng.random_range(0..6) == 0;
                    let (position, status) = if retired {
                        let status = RANDOM_STATUSES[rng.random_range(0..RANDOM_STATUSES.len())];
                        (None, status)
                    } else {
                        (Some(i as i32 + 1), "Finished")
                    };

                    results.push(generate_result(session, driver_id, constructor_id, position, Some(status)));
                }
            }

            events.push(generate_event(id, season, round, results));
            id += 1;
        }
    }

    events
}
