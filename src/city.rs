//! City view state: the latest snapshot plus the optimistic upgrade window.
//!
//! Snapshots are authoritative. Each poll result replaces the whole
//! snapshot, which is also how provisional queue entries disappear: the
//! client never removes a queue entry itself.

use std::collections::BTreeSet;

use crate::error::ClientError;
use crate::protocol::{CitySnapshot, QueueEntry, UpgradeRequest};

/// What the view has to do once an upgrade request has settled.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconcile {
    /// Accepted. Re-poll once after the delay to pick up the real queue.
    RepollAfter { delay_ms: u32 },
    /// Failed. Tell the player, then re-poll right away to drop the
    /// provisional entry.
    RepollNow { alert: String },
}

/// The side effects a settled upgrade can trigger. The view implements
/// this with browser timers and `window.alert`.
pub trait ReconcileEffects {
    fn repoll_after(&mut self, delay_ms: u32);
    fn alert(&mut self, message: &str);
    fn repoll_now(&mut self);
}

impl Reconcile {
    pub fn apply(self, effects: &mut impl ReconcileEffects) {
        match self {
            Reconcile::RepollAfter { delay_ms } => effects.repoll_after(delay_ms),
            Reconcile::RepollNow { alert } => {
                effects.alert(&alert);
                effects.repoll_now();
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CityState {
    snapshot: Option<CitySnapshot>,
    in_flight: BTreeSet<String>,
    repoll_delay_ms: u32,
}

impl CityState {
    pub fn new(repoll_delay_ms: u32) -> CityState {
        CityState { snapshot: None, in_flight: BTreeSet::new(), repoll_delay_ms }
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn snapshot(&self) -> Option<&CitySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_in_flight(&self, building: &str) -> bool {
        self.in_flight.contains(building)
    }

    pub fn apply_snapshot(&mut self, snapshot: CitySnapshot) {
        log::debug!(
            "city {} refreshed: {} queued upgrade(s)",
            snapshot.id,
            snapshot.queue.len()
        );
        self.snapshot = Some(snapshot);
    }

    /// Poll failures keep whatever the player is already looking at.
    pub fn poll_failed(&mut self, err: &ClientError) {
        if err.is_transport() {
            log::warn!("city poll did not reach the backend: {}", err);
        } else {
            log::error!("failed to fetch city: {}", err);
        }
    }

    /// Applies the provisional queue entry and returns the request to send,
    /// or `None` when nothing should be sent (still loading, unknown
    /// building, a level with no successor, or an upgrade for it is already
    /// in flight).
    pub fn begin_upgrade(&mut self, building: &str) -> Option<UpgradeRequest> {
        let snapshot = self.snapshot.as_mut()?;
        let level = match snapshot.level_of(building) {
            Some(level) => level,
            None => {
                log::warn!("ignoring upgrade for unknown building {:?}", building);
                return None;
            }
        };
        let Some(target) = level.checked_add(1) else {
            log::warn!("{} is already at the highest level", building);
            return None;
        };
        if !self.in_flight.insert(building.to_string()) {
            return None;
        }

        snapshot.queue.push(QueueEntry::provisional(building, target));
        log::info!("upgrading {} to level {}", building, target);

        Some(UpgradeRequest {
            city_id: snapshot.id.clone(),
            building: building.to_string(),
            level: target,
        })
    }

    pub fn finish_upgrade(&mut self, building: &str, result: Result<(), ClientError>) -> Reconcile {
        self.in_flight.remove(building);
        match result {
            Ok(()) => Reconcile::RepollAfter { delay_ms: self.repoll_delay_ms },
            Err(err) => {
                if err.is_transport() {
                    log::warn!("upgrade of {} did not reach the backend: {}", building, err);
                } else {
                    log::warn!("upgrade of {} rejected: {}", building, err);
                }
                Reconcile::RepollNow { alert: err.alert_message() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode;
    use serde_json::json;

    fn snapshot(queue: serde_json::Value) -> CitySnapshot {
        decode(
            &json!({
                "id": "c1",
                "cityName": "Stickville",
                "buildings": {"town_hall": 3, "farm": 1},
                "resources": {"wood": 100, "stone": 50},
                "buildingsQueue": queue
            })
            .to_string(),
        )
        .unwrap()
    }

    fn loaded() -> CityState {
        let mut state = CityState::new(1000);
        state.apply_snapshot(snapshot(json!([])));
        state
    }

    #[test]
    fn snapshot_is_kept_verbatim() {
        let mut state = CityState::new(1000);
        assert!(state.is_loading());

        let incoming = snapshot(json!([
            {"building": "farm", "level": 2, "completeTime": "2025-03-01T10:00:05Z"}
        ]));
        state.apply_snapshot(incoming.clone());
        assert!(!state.is_loading());
        assert_eq!(state.snapshot(), Some(&incoming));
    }

    #[test]
    fn upgrade_appends_provisional_entry_synchronously() {
        let mut state = loaded();
        let req = state.begin_upgrade("town_hall").unwrap();

        assert_eq!(
            req,
            UpgradeRequest { city_id: "c1".into(), building: "town_hall".into(), level: 4 }
        );
        let queue = &state.snapshot().unwrap().queue;
        assert_eq!(queue.last(), Some(&QueueEntry::provisional("town_hall", 4)));
        assert!(state.is_in_flight("town_hall"));
        assert_eq!(state.snapshot().unwrap().resources["wood"], 100);
    }

    #[test]
    fn provisional_entries_keep_submission_order() {
        let mut state = CityState::new(1000);
        state.apply_snapshot(snapshot(json!([
            {"building": "farm", "level": 2, "completeTime": "2025-03-01T10:00:05Z"}
        ])));
        state.begin_upgrade("town_hall").unwrap();
        state.finish_upgrade("town_hall", Ok(()));
        state.begin_upgrade("farm").unwrap();

        let names: Vec<_> = state
            .snapshot()
            .unwrap()
            .queue
            .iter()
            .map(|e| (e.building.as_str(), e.level))
            .collect();
        assert_eq!(names, vec![("farm", 2), ("town_hall", 4), ("farm", 2)]);
    }

    #[test]
    fn in_flight_building_cannot_be_upgraded_twice() {
        let mut state = loaded();
        assert!(state.begin_upgrade("farm").is_some());
        assert!(state.begin_upgrade("farm").is_none());
        assert!(state.begin_upgrade("town_hall").is_some());
        assert_eq!(state.snapshot().unwrap().queue.len(), 2);
    }

    #[test]
    fn nothing_is_sent_while_loading_or_for_unknown_buildings() {
        let mut state = CityState::new(1000);
        assert!(state.begin_upgrade("farm").is_none());

        let mut state = loaded();
        assert!(state.begin_upgrade("castle").is_none());
        assert!(state.snapshot().unwrap().queue.is_empty());
    }

    #[test]
    fn success_repolls_after_delay_and_poll_replaces_queue() {
        let mut state = CityState::new(750);
        state.apply_snapshot(snapshot(json!([])));
        state.begin_upgrade("farm").unwrap();

        assert_eq!(state.finish_upgrade("farm", Ok(())), Reconcile::RepollAfter { delay_ms: 750 });
        assert!(!state.is_in_flight("farm"));

        let authoritative = snapshot(json!([
            {"building": "farm", "level": 2, "completeTime": "2025-03-01T10:00:05Z"}
        ]));
        state.apply_snapshot(authoritative.clone());
        assert_eq!(state.snapshot(), Some(&authoritative));
    }

    #[test]
    fn failure_alerts_and_repoll_discards_provisional_entry() {
        let mut state = loaded();
        state.begin_upgrade("farm").unwrap();

        let rejected = Err(ClientError::Rejected { status: 400, message: "not enough wood".into() });
        assert_eq!(
            state.finish_upgrade("farm", rejected),
            Reconcile::RepollNow { alert: "Upgrade failed: not enough wood".into() }
        );
        assert!(!state.is_in_flight("farm"));

        // backend never scheduled it
        state.apply_snapshot(snapshot(json!([])));
        assert!(state.snapshot().unwrap().queue.is_empty());
    }

    #[test]
    fn transport_failure_alerts_network_error() {
        let mut state = loaded();
        state.begin_upgrade("farm").unwrap();
        let reconcile = state.finish_upgrade("farm", Err(ClientError::Transport("Failed to fetch".into())));
        assert_eq!(reconcile, Reconcile::RepollNow { alert: "Upgrade failed: Network error".into() });
    }

    #[test]
    fn negative_levels_are_kept_and_upgradable() {
        let mut state = CityState::new(1000);
        let incoming: CitySnapshot = decode(
            &json!({"id": "c1", "cityName": "A", "buildings": {"farm": -1}, "resources": {}}).to_string(),
        )
        .unwrap();
        state.apply_snapshot(incoming.clone());
        assert_eq!(state.snapshot(), Some(&incoming));
        assert_eq!(state.begin_upgrade("farm").map(|r| r.level), Some(0));
    }

    #[test]
    fn level_overflow_refuses_upgrade() {
        let mut state = CityState::new(1000);
        state.apply_snapshot(
            decode(
                &json!({"id": "c1", "cityName": "A", "buildings": {"farm": i64::MAX}, "resources": {}})
                    .to_string(),
            )
            .unwrap(),
        );
        assert!(state.begin_upgrade("farm").is_none());
        assert!(!state.is_in_flight("farm"));
        assert!(state.snapshot().unwrap().queue.is_empty());
    }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl ReconcileEffects for Recorder {
        fn repoll_after(&mut self, delay_ms: u32) {
            self.0.push(format!("repoll after {}", delay_ms));
        }
        fn alert(&mut self, message: &str) {
            self.0.push(format!("alert {}", message));
        }
        fn repoll_now(&mut self) {
            self.0.push("repoll now".to_string());
        }
    }

    #[test]
    fn accepted_upgrade_only_schedules_delayed_repoll() {
        let mut state = CityState::new(1000);
        state.apply_snapshot(snapshot(json!([])));
        state.begin_upgrade("farm").unwrap();

        let mut effects = Recorder::default();
        state.finish_upgrade("farm", Ok(())).apply(&mut effects);
        assert_eq!(effects.0, vec!["repoll after 1000"]);
    }

    #[test]
    fn failed_upgrade_alerts_then_repolls_immediately() {
        let mut state = loaded();
        state.begin_upgrade("farm").unwrap();

        let mut effects = Recorder::default();
        state
            .finish_upgrade("farm", Err(ClientError::Rejected { status: 409, message: "queue full".into() }))
            .apply(&mut effects);
        assert_eq!(effects.0, vec!["alert Upgrade failed: queue full", "repoll now"]);
    }

    #[test]
    fn poll_failure_leaves_state_untouched() {
        let mut state = loaded();
        state.begin_upgrade("farm").unwrap();
        let before = state.snapshot().cloned();

        state.poll_failed(&ClientError::Transport("offline".into()));
        assert_eq!(state.snapshot().cloned(), before);
        assert!(state.is_in_flight("farm"));
    }
}
