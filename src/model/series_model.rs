use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use strum::IntoEnumIterator;
use tracing::{debug, error, info};

use crate::{
    error::ProcessorError,
    model::{
        classification::ClassificationRules,
        config::EngineConfig,
        elo::{EloEngine, EloUpdate},
        export::Exporter,
        glicko2::{Glicko2Engine, GlickoUpdate},
        lineage::LineageResolver,
        normalization::SeasonNormalizer,
        pairing::PairingEngine,
        rating_store::{AdjustmentContext, RatingStore},
        structures::{
            adjustment_type::AdjustmentType,
            event::{Event, EventKey},
            matchup::Matchup,
            rating::{EloRating, GlickoRating},
            replay_stats::{EventSummary, MatchupCounts, NormalizationReport, ReplayStats, SessionCounts},
            session_type::SessionType,
            snapshot::{DriverSnapshot, LineageSnapshot, SnapshotExport},
            DriverId, LineageId
        }
    },
    utils::progress_utils::progress_bar
};

#[derive(Debug, Clone, Copy)]
struct Cursor {
    key: EventKey,
    season: i32,
    closed: bool
}

/// Competitors with at least one applied matchup in the open season.
#[derive(Debug, Default)]
struct ActivePool {
    drivers: HashMap<SessionType, HashSet<DriverId>>,
    lineages: HashMap<SessionType, HashSet<LineageId>>
}

/// Everything one session of an event will change, computed from pre-event state.
struct StagedSession {
    session: SessionType,
    driver_matchups: Vec<Matchup>,
    lineage_matchups: Vec<Matchup>,
    drivers: IndexMap<DriverId, EloUpdate>,
    lineages: IndexMap<LineageId, GlickoUpdate>,
    inactive: Vec<(LineageId, GlickoRating, GlickoRating)>
}

/// Replays a series chronologically, keeping driver Elo and lineage Glicko-2
/// state for both session types.
pub struct SeriesModel {
    config: EngineConfig,
    pairing: PairingEngine,
    elo: EloEngine,
    glicko: Glicko2Engine,
    normalizer: SeasonNormalizer,
    drivers: RatingStore<EloRating>,
    lineages: RatingStore<GlickoRating>,
    cursor: Option<Cursor>,
    active: ActivePool,
    halted: bool,
    stats: ReplayStats
}

impl SeriesModel {
    pub fn new(config: EngineConfig, lineages: LineageResolver) -> SeriesModel {
        let rules = config
            .classification
            .as_ref()
            .map(ClassificationRules::new)
            .unwrap_or_default();

        SeriesModel {
            pairing: PairingEngine::new(rules, lineages, config.skill.clone()),
            elo: EloEngine::new(config.elo.clone()),
            glicko: Glicko2Engine::new(config.glicko.clone()),
            normalizer: SeasonNormalizer::new(config.normalization.clone()),
            drivers: RatingStore::new(config.track_adjustments),
            lineages: RatingStore::new(config.track_adjustments),
            cursor: None,
            active: ActivePool::default(),
            halted: false,
            stats: ReplayStats::default(),
            config
        }
    }

    /// Replays `events` in the given order and closes the final season.
    ///
    /// Stops at the first ordering violation; state stays as it was after the
    /// last accepted event.
    pub fn process(&mut self, events: &[Event]) -> Result<ReplayStats, ProcessorError> {
        let bar = progress_bar(events.len() as u64, "Replaying events".to_string());
        for event in events {
            if let Err(e) = self.process_event(event) {
                bar.abandon();
                return Err(e);
            }
            bar.inc(1);
        }

        self.finish();
        bar.finish();

        info!(
            events = self.stats.events,
            seasons = self.stats.seasons_closed,
            drivers = self.drivers.competitors().len(),
            lineages = self.lineages.competitors().len(),
            "Replay complete"
        );

        Ok(self.stats.clone())
    }

    /// # Event processing
    ///
    /// 1. Rejects events that go back in (date, round) or season order. After a
    ///    rejection every further call fails with [`ProcessorError::Halted`].
    /// 2. Closes and normalizes the previous season if this event opens a new one.
    /// 3. Builds driver and lineage matchups for each session and rates them
    ///    against the pre-event state.
    /// 4. Commits all changes of the event together.
    pub fn process_event(&mut self, event: &Event) -> Result<EventSummary, ProcessorError> {
        if self.halted {
            return Err(ProcessorError::Halted);
        }

        if let Err(e) = self.check_order(event) {
            error!(event_id = event.id, "{}", e);
            self.halted = e.is_ordering_violation();
            return Err(e);
        }

        let opens_season = matches!(self.cursor, Some(c) if c.season != event.season && !c.closed);
        let closed_season = if opens_season { self.close_season() } else { None };

        let staged: Vec<StagedSession> = SessionType::iter().map(|s| self.stage(event, s)).collect();
        let summary = self.commit(event, staged, closed_season);

        self.cursor = Some(Cursor {
            key: event.key(),
            season: event.season,
            closed: false
        });
        self.stats.record(&summary);

        Ok(summary)
    }

    fn check_order(&self, event: &Event) -> Result<(), ProcessorError> {
        let Some(cursor) = self.cursor else {
            return Ok(());
        };

        if event.key() < cursor.key {
            return Err(ProcessorError::OutOfOrder {
                previous: cursor.key,
                next: event.key()
            });
        }
        if event.season < cursor.season {
            return Err(ProcessorError::SeasonRegression {
                previous: cursor.season,
                next: event.season
            });
        }
        if cursor.closed && event.season == cursor.season {
            return Err(ProcessorError::SeasonAlreadyClosed { season: cursor.season });
        }

        Ok(())
    }

    fn stage(&self, event: &Event, session: SessionType) -> StagedSession {
        let rows = self.pairing.session_rows(event, session);
        let driver_matchups = self.pairing.driver_matchups(&rows);
        let drivers = self.elo.rate_event(&driver_matchups, |id| {
            self.drivers
                .get(id, session)
                .copied()
                .unwrap_or_else(|| self.elo.initial_rating())
        });

        let lineage_matchups = self
            .pairing
            .lineage_matchups(&rows, |id| self.drivers.get(id, session).map(|s| s.rating));
        let lineages = self.glicko.rate_event(&lineage_matchups, |id| {
            self.lineages
                .get(id, session)
                .copied()
                .unwrap_or_else(|| self.glicko.initial_rating())
        });

        let inactive = self
            .lineages
            .rated_in(session)
            .filter(|id| !lineages.contains_key(id))
            .filter_map(|id| {
                self.lineages
                    .get(id, session)
                    .map(|before| (id, *before, self.glicko.inflate_deviation(before)))
            })
            .collect();

        StagedSession {
            session,
            driver_matchups,
            lineage_matchups,
            drivers,
            lineages,
            inactive
        }
    }

    fn commit(
        &mut self,
        event: &Event,
        staged: Vec<StagedSession>,
        closed_season: Option<NormalizationReport>
    ) -> EventSummary {
        for row in &event.results {
            self.drivers.record_activity(row.driver_id, event.season, event.id);
            let lineage = self.pairing.lineages().resolve(row.constructor_id);
            self.lineages.record_activity(lineage, event.season, event.id);
        }

        let matched = AdjustmentContext {
            adjustment_type: AdjustmentType::Match,
            event_id: Some(event.id),
            season: event.season
        };
        let inactivity = AdjustmentContext {
            adjustment_type: AdjustmentType::Inactivity,
            ..matched
        };

        let mut applied = MatchupCounts::default();
        let mut excluded = MatchupCounts::default();
        let mut inactive_lineages = 0;

        for stage in staged {
            let session = stage.session;
            count(&stage.driver_matchups, session, &mut applied.drivers, &mut excluded.drivers);
            count(&stage.lineage_matchups, session, &mut applied.lineages, &mut excluded.lineages);

            let active_drivers = self.active.drivers.entry(session).or_default();
            for (id, update) in stage.drivers {
                self.drivers.commit(id, session, &update.before, update.after, matched);
                active_drivers.insert(id);
            }

            let active_lineages = self.active.lineages.entry(session).or_default();
            for (id, update) in stage.lineages {
                self.lineages.commit(id, session, &update.before, update.after, matched);
                active_lineages.insert(id);
            }

            for (id, before, after) in stage.inactive {
                if after.deviation != before.deviation {
                    self.lineages.commit(id, session, &before, after, inactivity);
                    inactive_lineages += 1;
                }
            }
        }

        debug!(
            event_id = event.id,
            season = event.season,
            round = event.round,
            driver_matchups = applied.drivers.total(),
            lineage_matchups = applied.lineages.total(),
            excluded = excluded.drivers.total() + excluded.lineages.total(),
            "Committed event"
        );

        EventSummary {
            event_id: event.id,
            applied,
            excluded,
            inactive_lineages,
            closed_season
        }
    }

    /// # Season close
    ///
    /// Shifts each session's driver and lineage pools so the competitors rated
    /// during the closing season average the baseline. Runs at most once per
    /// season; returns `None` when there is no open season or normalization is
    /// disabled.
    pub fn close_season(&mut self) -> Option<NormalizationReport> {
        let season = match self.cursor.as_mut() {
            Some(cursor) if !cursor.closed => {
                cursor.closed = true;
                cursor.season
            }
            _ => return None
        };

        self.stats.seasons_closed += 1;
        let active = std::mem::take(&mut self.active);

        if !self.normalizer.is_enabled() {
            debug!(season, "Season closed without normalization");
            return None;
        }

        let elo_bounds = (self.config.elo.rating_floor, self.config.elo.rating_ceiling);
        let glicko_bounds = (self.config.glicko.rating_floor, self.config.glicko.rating_ceiling);
        let empty = HashSet::new();
        let mut report = NormalizationReport {
            season,
            drivers: Vec::new(),
            lineages: Vec::new()
        };

        for session in SessionType::iter() {
            let pool = active.drivers.get(&session).unwrap_or(&empty);
            if let Some(shift) = self.normalizer.normalize(&mut self.drivers, pool, session, elo_bounds, season) {
                report.drivers.push(shift);
            }

            let pool = active.lineages.get(&session).unwrap_or(&empty);
            if let Some(shift) = self
                .normalizer
                .normalize(&mut self.lineages, pool, session, glicko_bounds, season)
            {
                report.lineages.push(shift);
            }
        }

        info!(
            season,
            driver_pools = report.drivers.len(),
            lineage_pools = report.lineages.len(),
            "Closed season"
        );

        Some(report)
    }

    /// Closes the last open season. Call once the input is exhausted.
    pub fn finish(&mut self) -> Option<NormalizationReport> {
        self.close_season()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn stats(&self) -> &ReplayStats {
        &self.stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lineage_resolver(&self) -> &LineageResolver {
        self.pairing.lineages()
    }

    pub fn drivers(&self) -> &RatingStore<EloRating> {
        &self.drivers
    }

    pub fn lineages(&self) -> &RatingStore<GlickoRating> {
        &self.lineages
    }

    pub fn driver_rating(&self, id: DriverId, session: SessionType) -> Option<&EloRating> {
        self.drivers.get(id, session)
    }

    pub fn lineage_rating(&self, id: LineageId, session: SessionType) -> Option<&GlickoRating> {
        self.lineages.get(id, session)
    }

    pub fn driver_snapshots(&self, names: &HashMap<DriverId, String>) -> Vec<DriverSnapshot> {
        Exporter::new(&self.config.export).driver_snapshots(&self.drivers, &self.elo.initial_rating(), names)
    }

    pub fn lineage_snapshots(&self, names: &HashMap<LineageId, String>) -> Vec<LineageSnapshot> {
        Exporter::new(&self.config.export).lineage_snapshots(&self.lineages, &self.glicko.initial_rating(), names)
    }

    /// Read-only export of the current state.
    pub fn export(
        &self,
        driver_names: &HashMap<DriverId, String>,
        lineage_names: &HashMap<LineageId, String>
    ) -> SnapshotExport {
        SnapshotExport {
            keyword_table_version: self.pairing.rules().version(),
            stats: self.stats.clone(),
            drivers: self.driver_snapshots(driver_names),
            lineages: self.lineage_snapshots(lineage_names)
        }
    }
}

fn count(matchups: &[Matchup], session: SessionType, applied: &mut SessionCounts, excluded: &mut SessionCounts) {
    let n_excluded = matchups.iter().filter(|m| m.is_excluded()).count() as u32;
    applied.add(session, matchups.len() as u32 - n_excluded);
    excluded.add(session, n_excluded);
}
