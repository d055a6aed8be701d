use std::f64::consts::PI;

use indexmap::IndexMap;
use tracing::warn;

use crate::model::{
    config::{Glicko2Config, VolatilitySolver},
    constants::GLICKO_SCALE,
    root_finding::{bisection, illinois, RootSearch},
    structures::{matchup::Matchup, rating::GlickoRating, LineageId}
};

/// One result against one opponent inside a rating period, on the display scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opponent {
    pub rating: f64,
    pub deviation: f64,
    pub score: f64
}

/// Lineage state before and after one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlickoUpdate {
    pub before: GlickoRating,
    pub after: GlickoRating
}

#[derive(Debug, Clone, Default)]
pub struct Glicko2Engine {
    config: Glicko2Config
}

impl Glicko2Engine {
    pub fn new(config: Glicko2Config) -> Glicko2Engine {
        Glicko2Engine { config }
    }

    pub fn initial_rating(&self) -> GlickoRating {
        GlickoRating::new(
            self.config.initial_rating,
            self.config.initial_deviation,
            self.config.initial_volatility
        )
    }

    fn to_mu(&self, rating: f64) -> f64 {
        (rating - self.config.initial_rating) / GLICKO_SCALE
    }

    fn from_mu(&self, mu: f64) -> f64 {
        mu * GLICKO_SCALE + self.config.initial_rating
    }

    pub fn g(phi: f64) -> f64 {
        1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
    }

    pub fn expected_score(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
        1.0 / (1.0 + (-Self::g(phi_j) * (mu - mu_j)).exp())
    }

    /// # Rating period
    ///
    /// Standard Glicko-2 update of `state` against every result in `opponents`.
    /// All opponent values must come from before the period. An empty slice
    /// takes the no-opponent branch and only grows the deviation.
    ///
    /// Results are clamped to the configured rating, deviation and volatility bounds.
    pub fn rate_period(&self, state: &GlickoRating, opponents: &[Opponent]) -> GlickoRating {
        if opponents.is_empty() {
            return self.inflate_deviation(state);
        }

        let mu = self.to_mu(state.rating);
        let phi = state.deviation / GLICKO_SCALE;
        let sigma = state.volatility;

        let mut v_inv = 0.0;
        let mut score_sum = 0.0;
        for opponent in opponents {
            let mu_j = self.to_mu(opponent.rating);
            let phi_j = opponent.deviation / GLICKO_SCALE;
            let g = Self::g(phi_j);
            let e = Self::expected_score(mu, mu_j, phi_j);

            v_inv += g * g * e * (1.0 - e);
            score_sum += g * (opponent.score - e);
        }

        let v = 1.0 / v_inv;
        let delta = v * score_sum;

        let sigma_prime = self.solve_volatility(phi, sigma, v, delta);
        let phi_star = (phi * phi + sigma_prime * sigma_prime).sqrt();
        let phi_prime = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
        let mu_prime = mu + phi_prime * phi_prime * score_sum;

        GlickoRating {
            rating: self
                .from_mu(mu_prime)
                .clamp(self.config.rating_floor, self.config.rating_ceiling),
            deviation: (phi_prime * GLICKO_SCALE).clamp(self.config.deviation_floor, self.config.deviation_ceiling),
            volatility: sigma_prime,
            races: state.races + 1,
            matchups: state.matchups + opponents.len() as u32
        }
    }

    /// Deviation growth for a period without opponents: phi' = sqrt(phi^2 + sigma^2),
    /// capped at the deviation ceiling. Rating and volatility are untouched.
    pub fn inflate_deviation(&self, state: &GlickoRating) -> GlickoRating {
        let phi = state.deviation / GLICKO_SCALE;
        let phi_prime = (phi * phi + state.volatility * state.volatility).sqrt();

        GlickoRating {
            deviation: (phi_prime * GLICKO_SCALE).min(self.config.deviation_ceiling),
            ..*state
        }
    }

    /// Finds the new volatility by locating the root of Glickman's f(x) with
    /// x = ln(sigma'^2), then clamps it to the configured bounds.
    fn solve_volatility(&self, phi: f64, sigma: f64, v: f64, delta: f64) -> f64 {
        let tau = self.config.tau;
        let a = (sigma * sigma).ln();
        let phi_sq = phi * phi;
        let delta_sq = delta * delta;

        let f = |x: f64| {
            let ex = x.exp();
            let denom = phi_sq + v + ex;
            ex * (delta_sq - phi_sq - v - ex) / (2.0 * denom * denom) - (x - a) / (tau * tau)
        };

        let lower = if delta_sq > phi_sq + v {
            (delta_sq - phi_sq - v).ln()
        } else {
            let mut k = 1.0;
            let mut steps = 0;
            while f(a - k * tau) < 0.0 && steps < self.config.solver_max_iterations {
                k += 1.0;
                steps += 1;
            }
            a - k * tau
        };

        let search: RootSearch = match self.config.solver {
            VolatilitySolver::Illinois => illinois(
                f,
                a,
                lower,
                self.config.solver_tolerance,
                self.config.solver_max_iterations
            ),
            VolatilitySolver::Bisection => bisection(
                f,
                a,
                lower,
                self.config.solver_tolerance,
                self.config.solver_max_iterations
            )
        };

        if !search.converged {
            warn!(
                iterations = search.iterations,
                root = search.root,
                "Volatility solver hit its iteration cap; using best bracket estimate"
            );
        }

        let sigma_prime = (search.root / 2.0).exp();
        if sigma_prime.is_finite() {
            sigma_prime.clamp(self.config.volatility_floor, self.config.volatility_ceiling)
        } else {
            warn!(volatility = sigma, "Volatility solver produced a non-finite value; keeping the previous volatility");
            sigma.clamp(self.config.volatility_floor, self.config.volatility_ceiling)
        }
    }

    /// # Event batch
    ///
    /// Treats the event as one rating period. Each lineage that appears in a
    /// non-excluded matchup is rated once against every opponent it met, using
    /// the opponent states returned by `current`, which must reflect the ratings
    /// before this event. Lineages without an applied matchup are not returned.
    pub fn rate_event<F>(&self, matchups: &[Matchup], current: F) -> IndexMap<LineageId, GlickoUpdate>
    where
        F: Fn(LineageId) -> GlickoRating
    {
        let mut periods: IndexMap<LineageId, (GlickoRating, Vec<Opponent>)> = IndexMap::new();

        for matchup in matchups.iter().filter(|m| !m.is_excluded()) {
            let a = periods
                .entry(matchup.a)
                .or_insert_with(|| (current(matchup.a), Vec::new()))
                .0;
            let b = periods
                .entry(matchup.b)
                .or_insert_with(|| (current(matchup.b), Vec::new()))
                .0;

            if let Some((_, opponents)) = periods.get_mut(&matchup.a) {
                opponents.push(Opponent {
                    rating: b.rating,
                    deviation: b.deviation,
                    score: matchup.outcome.score_a()
                });
            }
            if let Some((_, opponents)) = periods.get_mut(&matchup.b) {
                opponents.push(Opponent {
                    rating: a.rating,
                    deviation: a.deviation,
                    score: matchup.outcome.score_b()
                });
            }
        }

        periods
            .into_iter()
            .map(|(id, (before, opponents))| {
                let update = GlickoUpdate {
                    before,
                    after: self.rate_period(&before, &opponents)
                };
                (id, update)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        constants::*,
        structures::matchup::{ExclusionReason, Outcome}
    };
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn state(rating: f64, deviation: f64, volatility: f64) -> GlickoRating {
        GlickoRating::new(rating, deviation, volatility)
    }

    fn glickman_opponents() -> Vec<Opponent> {
        vec![
            Opponent {
                rating: 1400.0,
                deviation: 30.0,
                score: 1.0
            },
            Opponent {
                rating: 1550.0,
                deviation: 100.0,
                score: 0.0
            },
            Opponent {
                rating: 1700.0,
                deviation: 300.0,
                score: 0.0
            },
        ]
    }

    #[test]
    fn test_glickman_worked_example() {
        let engine = Glicko2Engine::default();
        let result = engine.rate_period(&state(1500.0, 200.0, 0.06), &glickman_opponents());

        assert_abs_diff_eq!(result.rating, 1464.06, epsilon = 0.05);
        assert_abs_diff_eq!(result.deviation, 151.52, epsilon = 0.05);
        assert_abs_diff_eq!(result.volatility, 0.05999, epsilon = 1e-4);
        assert_eq!(result.races, 1);
        assert_eq!(result.matchups, 3);
    }

    #[test]
    fn test_bisection_matches_illinois() {
        let illinois = Glicko2Engine::default();
        let bisection = Glicko2Engine::new(Glicko2Config {
            solver: VolatilitySolver::Bisection,
            ..Glicko2Config::default()
        });

        let a = illinois.rate_period(&state(1500.0, 200.0, 0.06), &glickman_opponents());
        let b = bisection.rate_period(&state(1500.0, 200.0, 0.06), &glickman_opponents());

        assert_abs_diff_eq!(a.rating, b.rating, epsilon = 1e-3);
        assert_abs_diff_eq!(a.deviation, b.deviation, epsilon = 1e-3);
        assert_abs_diff_eq!(a.volatility, b.volatility, epsilon = 1e-5);
    }

    #[test]
    fn test_no_opponents_grows_deviation() {
        let engine = Glicko2Engine::default();
        let before = state(1600.0, 100.0, 0.06);
        let after = engine.rate_period(&before, &[]);

        let phi = 100.0 / GLICKO_SCALE;
        let expected = (phi * phi + 0.06 * 0.06).sqrt() * GLICKO_SCALE;
        assert_abs_diff_eq!(after.deviation, expected, epsilon = 1e-9);
        assert!(after.deviation > before.deviation);
        assert_abs_diff_eq!(after.rating, 1600.0);
        assert_abs_diff_eq!(after.volatility, 0.06);
        assert_eq!(after.races, 0);
    }

    #[test]
    fn test_no_opponents_deviation_capped() {
        let engine = Glicko2Engine::default();
        let after = engine.inflate_deviation(&state(1500.0, 349.9, 0.06));

        assert_abs_diff_eq!(after.deviation, DEVIATION_CEILING);
    }

    #[test]
    fn test_rate_event_is_zero_sum_for_equals() {
        let engine = Glicko2Engine::default();
        let matchups = vec![Matchup::decided(1, 2, Outcome::AWins)];

        let updates = engine.rate_event(&matchups, |_| engine.initial_rating());

        let up = updates[&1].after.rating - 1500.0;
        let down = 1500.0 - updates[&2].after.rating;
        assert!(up > 0.0);
        assert_abs_diff_eq!(up, down, epsilon = 1e-9);
        assert!(updates[&1].after.deviation < DEFAULT_DEVIATION);
    }

    #[test]
    fn test_rate_event_collects_all_opponents() {
        let engine = Glicko2Engine::default();
        let matchups = vec![
            Matchup::decided(1, 2, Outcome::AWins),
            Matchup::decided(1, 3, Outcome::Draw),
            Matchup::excluded(2, 3, ExclusionReason::MechanicalFailure),
        ];

        let updates = engine.rate_event(&matchups, |_| engine.initial_rating());

        assert_eq!(updates[&1].after.matchups, 2);
        assert_eq!(updates[&2].after.matchups, 1);
        assert_eq!(updates[&3].after.matchups, 1);
        assert_eq!(updates[&1].after.races, 1);
    }

    proptest! {
        #[test]
        fn prop_expected_score_grows_with_gap(
            mu_j in -3.0f64..3.0,
            phi_j in 0.17f64..2.02,
            gap in 0.0f64..3.0,
            step in 0.01f64..1.0
        ) {
            let lower = Glicko2Engine::expected_score(mu_j + gap, mu_j, phi_j);
            let higher = Glicko2Engine::expected_score(mu_j + gap + step, mu_j, phi_j);

            prop_assert!(higher > lower);
            prop_assert!(lower >= 0.5 - 1e-12);
        }

        #[test]
        fn prop_results_within_bounds(
            rating in 800.0f64..2200.0,
            deviation in 30.0f64..350.0,
            volatility in 0.01f64..0.5,
            opponents in proptest::collection::vec((800.0f64..2200.0, 30.0f64..350.0, 0u8..3), 1..12)
        ) {
            let engine = Glicko2Engine::default();
            let opponents: Vec<Opponent> = opponents
                .into_iter()
                .map(|(r, d, s)| Opponent { rating: r, deviation: d, score: s as f64 / 2.0 })
                .collect();

            let result = engine.rate_period(&state(rating, deviation, volatility), &opponents);

            prop_assert!((GLICKO_RATING_FLOOR..=GLICKO_RATING_CEILING).contains(&result.rating));
            prop_assert!((DEVIATION_FLOOR..=DEVIATION_CEILING).contains(&result.deviation));
            prop_assert!((VOLATILITY_FLOOR..=VOLATILITY_CEILING).contains(&result.volatility));
        }
    }
}
