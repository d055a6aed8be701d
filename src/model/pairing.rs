use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use tracing::warn;

use crate::model::{
    classification::{compare_positions, resolve, ClassificationRules, Resolution, Standing},
    config::SkillAdjustmentConfig,
    lineage::LineageResolver,
    structures::{
        event::{Event, SessionResult},
        matchup::Matchup,
        session_type::SessionType,
        DriverId, LineageId
    }
};

/// Turns one session of an event into driver and lineage matchups.
#[derive(Debug, Clone)]
pub struct PairingEngine {
    rules: ClassificationRules,
    lineages: LineageResolver,
    skill: SkillAdjustmentConfig
}

impl PairingEngine {
    pub fn new(rules: ClassificationRules, lineages: LineageResolver, skill: SkillAdjustmentConfig) -> PairingEngine {
        PairingEngine { rules, lineages, skill }
    }

    pub fn rules(&self) -> &ClassificationRules {
        &self.rules
    }

    pub fn lineages(&self) -> &LineageResolver {
        &self.lineages
    }

    /// Rows of one session with repeated drivers dropped. The first row for a
    /// driver wins. Every other pairing function takes these rows, so build them
    /// once per session.
    pub fn session_rows<'a>(&self, event: &'a Event, session: SessionType) -> Vec<&'a SessionResult> {
        let mut seen = HashSet::new();
        event
            .session_results(session)
            .filter(|row| {
                let first = seen.insert(row.driver_id);
                if !first {
                    warn!(
                        event_id = event.id,
                        driver_id = row.driver_id,
                        %session,
                        "Driver appears twice in one session, ignoring the later row"
                    );
                }
                first
            })
            .collect()
    }

    /// # Driver pairing
    ///
    /// Drivers are only compared with teammates: every pair of drivers sharing a
    /// constructor in this session yields one matchup. Pairs are emitted in
    /// ascending (constructor, driver) order so the output is deterministic.
    pub fn driver_matchups(&self, rows: &[&SessionResult]) -> Vec<Matchup> {
        let teams: BTreeMap<i32, Vec<&SessionResult>> = rows
            .iter()
            .map(|&row| (row.constructor_id, row))
            .into_group_map()
            .into_iter()
            .collect();

        teams
            .into_values()
            .flat_map(|team| {
                team.into_iter()
                    .sorted_by_key(|row| row.driver_id)
                    .tuple_combinations()
                    .map(|(a, b)| self.driver_matchup(a, b))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn driver_matchup(&self, a: &SessionResult, b: &SessionResult) -> Matchup {
        match resolve(&self.rules.standing(a), &self.rules.standing(b), compare_positions) {
            Resolution::Decided(outcome) => Matchup::decided(a.driver_id, b.driver_id, outcome),
            Resolution::Excluded(reason) => Matchup::excluded(a.driver_id, b.driver_id, reason)
        }
    }

    /// Score for a finishing position: `max_score` for a win, falling by
    /// `position_slope` per place and never below zero. A missing position scores zero.
    pub fn raw_performance(&self, position: Option<i32>) -> f64 {
        match position {
            Some(p) => (self.skill.max_score - (p - 1) as f64 * self.skill.position_slope).max(0.0),
            None => 0.0
        }
    }

    /// Removes the driver's share of a result: a driver rated above the baseline
    /// contributes less, one rated below contributes more.
    pub fn adjusted_performance(&self, raw: f64, driver_rating: f64) -> f64 {
        raw - (driver_rating - self.skill.baseline) / self.skill.divisor
    }

    /// # Lineage performance
    ///
    /// Groups the session's rows by lineage and reduces each group to one
    /// standing:
    ///
    /// - The best skill-adjusted sample among finishing rows. Rows whose driver
    ///   has no rating (per `driver_rating`) contribute no sample.
    /// - If every row of the group is a non-finish, a driver error makes the
    ///   lineage a driver error, otherwise it is mechanical.
    /// - A group with a finishing row but no sample (its finishers are all
    ///   unrated) is left out, as is a group with nothing usable.
    pub fn lineage_standings<F>(&self, rows: &[&SessionResult], driver_rating: F) -> BTreeMap<LineageId, Standing<f64>>
    where
        F: Fn(DriverId) -> Option<f64>
    {
        let groups = rows
            .iter()
            .map(|&row| (self.lineages.resolve(row.constructor_id), row))
            .into_group_map();

        let mut standings = BTreeMap::new();
        for (lineage, rows) in groups {
            let mut best: Option<f64> = None;
            let mut driver_error = false;
            let mut mechanical = false;
            let mut ranked = false;

            for row in rows {
                match self.rules.standing(row) {
                    Standing::Mechanical => mechanical = true,
                    Standing::DriverError => driver_error = true,
                    Standing::Ranked(position) => {
                        ranked = true;
                        if let Some(rating) = driver_rating(row.driver_id) {
                            let sample = self.adjusted_performance(self.raw_performance(position), rating);
                            best = Some(best.map_or(sample, |b| b.max(sample)));
                        }
                    }
                }
            }

            let standing = match (best, ranked, driver_error, mechanical) {
                (Some(performance), _, _, _) => Standing::Ranked(performance),
                (None, true, _, _) => continue,
                (None, false, true, _) => Standing::DriverError,
                (None, false, false, true) => Standing::Mechanical,
                (None, false, false, false) => continue
            };
            standings.insert(lineage, standing);
        }

        standings
    }

    /// # Lineage pairing
    ///
    /// Every pair of lineages present in the session yields one matchup, decided
    /// by the shared head-to-head policy with higher performance winning.
    pub fn lineage_matchups<F>(&self, rows: &[&SessionResult], driver_rating: F) -> Vec<Matchup>
    where
        F: Fn(DriverId) -> Option<f64>
    {
        self.lineage_standings(rows, driver_rating)
            .iter()
            .tuple_combinations()
            .map(|((&a, sa), (&b, sb))| match resolve(sa, sb, |x: &f64, y: &f64| x.total_cmp(y)) {
                Resolution::Decided(outcome) => Matchup::decided(a, b, outcome),
                Resolution::Excluded(reason) => Matchup::excluded(a, b, reason)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::structures::{
            directory::LineageEntry,
            matchup::{ExclusionReason, Outcome}
        },
        utils::test_utils::{generate_event, generate_result}
    };
    use approx::assert_abs_diff_eq;

    fn engine() -> PairingEngine {
        PairingEngine::new(
            ClassificationRules::default(),
            LineageResolver::default(),
            SkillAdjustmentConfig::default()
        )
    }

    fn rows(event: &Event, session: SessionType) -> Vec<&SessionResult> {
        engine().session_rows(event, session)
    }

    fn race(driver_id: DriverId, constructor_id: i32, position: Option<i32>, status: &str) -> SessionResult {
        generate_result(SessionType::Race, driver_id, constructor_id, position, Some(status))
    }

    #[test]
    fn test_raw_performance() {
        let engine = engine();

        assert_abs_diff_eq!(engine.raw_performance(Some(1)), 100.0);
        assert_abs_diff_eq!(engine.raw_performance(Some(5)), 80.0);
        assert_abs_diff_eq!(engine.raw_performance(Some(21)), 0.0);
        assert_abs_diff_eq!(engine.raw_performance(Some(30)), 0.0);
        assert_abs_diff_eq!(engine.raw_performance(None), 0.0);
    }

    #[test]
    fn test_adjusted_performance() {
        let engine = engine();

        assert_abs_diff_eq!(engine.adjusted_performance(100.0, 1500.0), 100.0);
        assert_abs_diff_eq!(engine.adjusted_performance(100.0, 1700.0), 80.0);
        assert_abs_diff_eq!(engine.adjusted_performance(50.0, 1300.0), 70.0);
    }

    #[test]
    fn test_teammates_only() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![
                race(1, 10, Some(1), "Finished"),
                race(2, 10, Some(4), "Finished"),
                race(3, 20, Some(2), "Finished"),
                race(4, 20, Some(3), "Finished"),
                race(5, 30, Some(5), "Finished"),
            ]
        );

        let matchups = engine().driver_matchups(&rows(&event, SessionType::Race));

        assert_eq!(
            matchups,
            vec![
                Matchup::decided(1, 2, Outcome::AWins),
                Matchup::decided(3, 4, Outcome::AWins),
            ]
        );
    }

    #[test]
    fn test_three_driver_team() {
        let event = generate_event(
            1,
            1955,
            1,
            vec![
                race(3, 10, Some(7), "Finished"),
                race(1, 10, Some(2), "Finished"),
                race(2, 10, None, "Accident"),
            ]
        );

        let matchups = engine().driver_matchups(&rows(&event, SessionType::Race));

        assert_eq!(
            matchups,
            vec![
                Matchup::decided(1, 2, Outcome::AWins),
                Matchup::decided(1, 3, Outcome::AWins),
                Matchup::decided(2, 3, Outcome::BWins),
            ]
        );
    }

    #[test]
    fn test_mechanical_excluded() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![race(1, 10, Some(14), "Engine"), race(2, 10, Some(9), "Finished")]
        );

        let matchups = engine().driver_matchups(&rows(&event, SessionType::Race));

        assert_eq!(matchups.len(), 1);
        assert_eq!(matchups[0].exclusion, Some(ExclusionReason::MechanicalFailure));
    }

    #[test]
    fn test_double_driver_error_excluded() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![race(1, 10, None, "Collision"), race(2, 10, None, "Spun off")]
        );

        let matchups = engine().driver_matchups(&rows(&event, SessionType::Race));

        assert_eq!(matchups[0].exclusion, Some(ExclusionReason::BothDriverError));
    }

    #[test]
    fn test_driver_error_loses_to_unplaced() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![race(1, 10, Some(3), "Accident"), race(2, 10, None, "Disqualified")]
        );

        let matchups = engine().driver_matchups(&rows(&event, SessionType::Race));

        assert_eq!(matchups, vec![Matchup::decided(1, 2, Outcome::BWins)]);
    }

    #[test]
    fn test_sessions_are_separate() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![
                generate_result(SessionType::Qualifying, 1, 10, Some(2), None),
                generate_result(SessionType::Qualifying, 2, 10, Some(1), None),
                race(1, 10, Some(1), "Finished"),
            ]
        );

        let engine = engine();
        assert_eq!(
            engine.driver_matchups(&rows(&event, SessionType::Qualifying)),
            vec![Matchup::decided(1, 2, Outcome::BWins)]
        );
        assert!(engine.driver_matchups(&rows(&event, SessionType::Race)).is_empty());
    }

    #[test]
    fn test_duplicate_driver_row_ignored() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![
                race(1, 10, Some(1), "Finished"),
                race(1, 10, Some(8), "Finished"),
                race(2, 10, Some(4), "Finished"),
            ]
        );

        let matchups = engine().driver_matchups(&rows(&event, SessionType::Race));

        assert_eq!(matchups, vec![Matchup::decided(1, 2, Outcome::AWins)]);
    }

    #[test]
    fn test_lineage_performance_is_best_adjusted_sample() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![
                race(1, 10, Some(1), "Finished"),
                race(2, 10, Some(3), "Finished"),
                race(3, 20, Some(2), "Finished"),
            ]
        );
        // Driver 1 is strong, so their win is worth less than driver 2's third
        let ratings = |id: DriverId| match id {
            1 => Some(1800.0),
            2 => Some(1400.0),
            3 => Some(1500.0),
            _ => None
        };

        let standings = engine().lineage_standings(&rows(&event, SessionType::Race), ratings);

        assert_eq!(standings[&10], Standing::Ranked(100.0));
        assert_eq!(standings[&20], Standing::Ranked(95.0));
    }

    #[test]
    fn test_unrated_drivers_are_skipped() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![race(1, 10, Some(1), "Finished"), race(2, 20, Some(2), "Finished")]
        );

        let standings = engine().lineage_standings(&rows(&event, SessionType::Race), |id| (id == 2).then_some(1500.0));

        assert!(!standings.contains_key(&10));
        assert_eq!(standings[&20], Standing::Ranked(95.0));
    }

    #[test]
    fn test_lineage_non_finish_standings() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![
                race(1, 10, None, "Engine"),
                race(2, 10, None, "Accident"),
                race(3, 20, None, "Gearbox"),
                race(4, 30, Some(6), "Finished"),
            ]
        );

        let standings = engine().lineage_standings(&rows(&event, SessionType::Race), |_| Some(1500.0));

        assert_eq!(standings[&10], Standing::DriverError);
        assert_eq!(standings[&20], Standing::Mechanical);
        assert_eq!(standings[&30], Standing::Ranked(75.0));

        let matchups = engine().lineage_matchups(&rows(&event, SessionType::Race), |_| Some(1500.0));
        assert_eq!(
            matchups,
            vec![
                Matchup::excluded(10, 20, ExclusionReason::MechanicalFailure),
                Matchup::decided(10, 30, Outcome::BWins),
                Matchup::excluded(20, 30, ExclusionReason::MechanicalFailure),
            ]
        );
    }

    #[test]
    fn test_unrated_finisher_keeps_lineage_out() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![
                race(5, 10, Some(1), "Finished"),
                race(1, 10, None, "Accident"),
                race(6, 30, Some(4), "Finished"),
                race(7, 30, None, "Engine"),
                race(3, 20, Some(2), "Finished"),
                race(4, 20, Some(3), "Finished"),
            ]
        );
        // Drivers 5 and 6 debut this event and have no rating yet
        let ratings = |id: DriverId| (id != 5 && id != 6).then_some(1500.0);

        let standings = engine().lineage_standings(&rows(&event, SessionType::Race), ratings);

        assert!(!standings.contains_key(&10));
        assert!(!standings.contains_key(&30));
        assert_eq!(standings[&20], Standing::Ranked(95.0));
        assert!(engine()
            .lineage_matchups(&rows(&event, SessionType::Race), ratings)
            .is_empty());
    }

    #[test]
    fn test_lineage_merges_constructors() {
        let engine = PairingEngine::new(
            ClassificationRules::default(),
            LineageResolver::new(&[LineageEntry {
                constructor_id: 11,
                lineage_id: 10
            }]),
            SkillAdjustmentConfig::default()
        );
        let event = generate_event(
            1,
            2010,
            1,
            vec![
                race(1, 10, Some(4), "Finished"),
                race(2, 11, Some(2), "Finished"),
                race(3, 20, Some(3), "Finished"),
            ]
        );

        let matchups = engine.lineage_matchups(&rows(&event, SessionType::Race), |_| Some(1500.0));

        assert_eq!(matchups, vec![Matchup::decided(10, 20, Outcome::AWins)]);
        // Drivers of different constructors are never teammates, even within one lineage
        assert!(engine.driver_matchups(&rows(&event, SessionType::Race)).is_empty());
    }

    #[test]
    fn test_equal_performance_is_draw() {
        let event = generate_event(
            1,
            2010,
            1,
            vec![race(1, 10, Some(3), "Finished"), race(2, 20, Some(1), "Finished")]
        );
        // 90 - 0 == 100 - 10
        let ratings = |id: DriverId| if id == 1 { Some(1500.0) } else { Some(1600.0) };

        let matchups = engine().lineage_matchups(&rows(&event, SessionType::Race), ratings);

        assert_eq!(matchups, vec![Matchup::decided(10, 20, Outcome::Draw)]);
    }
}
