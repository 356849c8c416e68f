//! Foo/Bar resource trainer demo.
//!
//! Unlike the city view, actions here apply their resource delta up front
//! and roll it back if the backend refuses.

use crate::error::ClientError;
use crate::protocol::FooBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerAction {
    /// Costs 1 Bar, yields 1 Foo after 3 ticks on the backend.
    TrainFoo,
    /// Costs 1 Bar, produces 2.
    BuildBar,
}

impl TrainerAction {
    pub fn from_attr(attr: &str) -> Option<TrainerAction> {
        match attr {
            "train-foo" => Some(TrainerAction::TrainFoo),
            "build-bar" => Some(TrainerAction::BuildBar),
            _ => None,
        }
    }

    pub fn attr(self) -> &'static str {
        match self {
            TrainerAction::TrainFoo => "train-foo",
            TrainerAction::BuildBar => "build-bar",
        }
    }

    pub fn min_bar(self) -> i64 {
        match self {
            TrainerAction::TrainFoo => 1,
            TrainerAction::BuildBar => 2,
        }
    }

    fn bar_delta(self) -> i64 {
        match self {
            TrainerAction::TrainFoo => -1,
            TrainerAction::BuildBar => 1,
        }
    }

    fn shortage(self) -> &'static str {
        match self {
            TrainerAction::TrainFoo => "Not enough Bar to train Foo",
            TrainerAction::BuildBar => "Not enough Bar to build Bar",
        }
    }

    fn failure(self) -> &'static str {
        match self {
            TrainerAction::TrainFoo => "Failed to train Foo",
            TrainerAction::BuildBar => "Failed to build Bar",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerState {
    pub foo: i64,
    pub bar: i64,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for TrainerState {
    fn default() -> Self {
        TrainerState { foo: 0, bar: 0, loading: true, error: None }
    }
}

impl TrainerState {
    pub fn can_afford(&self, action: TrainerAction) -> bool {
        self.bar >= action.min_bar()
    }

    pub fn apply_poll(&mut self, counters: FooBar) {
        self.foo = counters.foo;
        self.bar = counters.bar;
        self.error = None;
        self.loading = false;
    }

    pub fn poll_failed(&mut self, err: &ClientError) {
        log::error!("failed to fetch game state: {}", err);
        self.error = Some(match err {
            ClientError::Rejected { message, .. } => format!("Failed to fetch game state: {}", message),
            other => other.to_string(),
        });
        self.loading = false;
    }

    /// Local baseline production between polls.
    pub fn tick(&mut self) {
        self.bar += 1;
    }

    /// Returns whether the request should be sent.
    pub fn begin(&mut self, action: TrainerAction) -> bool {
        if !self.can_afford(action) {
            self.error = Some(action.shortage().to_string());
            return false;
        }
        self.bar += action.bar_delta();
        true
    }

    pub fn finish(&mut self, action: TrainerAction, result: Result<(), ClientError>) {
        match result {
            Ok(()) => self.error = None,
            Err(err) => {
                log::warn!("{}: {}", action.failure(), err);
                self.bar -= action.bar_delta();
                self.error = Some(match err {
                    ClientError::Rejected { message, .. } => format!("{}: {}", action.failure(), message),
                    other => other.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_bar(bar: i64) -> TrainerState {
        let mut state = TrainerState::default();
        state.apply_poll(FooBar { foo: 0, bar });
        state
    }

    #[test]
    fn poll_replaces_counters_and_clears_error() {
        let mut state = TrainerState::default();
        assert!(state.loading);
        state.error = Some("stale".into());
        state.apply_poll(FooBar { foo: 3, bar: 7 });
        assert_eq!(state, TrainerState { foo: 3, bar: 7, loading: false, error: None });
    }

    #[test]
    fn poll_failure_is_surfaced() {
        let mut state = TrainerState::default();
        state.poll_failed(&ClientError::Rejected { status: 500, message: "Internal Server Error".into() });
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Failed to fetch game state: Internal Server Error"));
    }

    #[test]
    fn train_foo_spends_bar_and_rolls_back_on_failure() {
        let mut state = with_bar(1);
        assert!(state.begin(TrainerAction::TrainFoo));
        assert_eq!(state.bar, 0);

        state.finish(
            TrainerAction::TrainFoo,
            Err(ClientError::Rejected { status: 400, message: "Bad Request".into() }),
        );
        assert_eq!(state.bar, 1);
        assert_eq!(state.error.as_deref(), Some("Failed to train Foo: Bad Request"));
    }

    #[test]
    fn build_bar_nets_one_bar_and_keeps_it_on_success() {
        let mut state = with_bar(2);
        assert!(state.begin(TrainerAction::BuildBar));
        state.finish(TrainerAction::BuildBar, Ok(()));
        assert_eq!(state.bar, 3);
        assert_eq!(state.error, None);
    }

    #[test]
    fn build_bar_rollback_on_network_error() {
        let mut state = with_bar(5);
        state.begin(TrainerAction::BuildBar);
        state.finish(TrainerAction::BuildBar, Err(ClientError::Transport("Failed to fetch".into())));
        assert_eq!(state.bar, 5);
        assert_eq!(state.error.as_deref(), Some("Failed to fetch"));
    }

    #[test]
    fn unaffordable_actions_are_refused_locally() {
        let mut state = with_bar(1);
        assert!(!state.begin(TrainerAction::BuildBar));
        assert_eq!(state.bar, 1);
        assert_eq!(state.error.as_deref(), Some("Not enough Bar to build Bar"));

        let mut state = with_bar(0);
        assert!(!state.begin(TrainerAction::TrainFoo));
        assert_eq!(state.error.as_deref(), Some("Not enough Bar to train Foo"));
    }

    #[test]
    fn tick_adds_one_bar() {
        let mut state = with_bar(0);
        state.tick();
        state.tick();
        assert_eq!(state.bar, 2);
    }

    #[test]
    fn action_attrs_round_trip() {
        for action in [TrainerAction::TrainFoo, TrainerAction::BuildBar] {
            assert_eq!(TrainerAction::from_attr(action.attr()), Some(action));
        }
        assert_eq!(TrainerAction::from_attr("launch"), None);
    }
}
