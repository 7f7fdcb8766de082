//! Running score and in-memory high score, driven entirely by the bus.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::HandlerError;
use crate::events::{Channel, EventBus, GameEvent, Subscriptions};

#[derive(Debug, Default)]
struct ScoreState {
    score: u64,
    high_score: u64,
    new_high_score: bool,
}

/// Adds up destroyed entities' score values.
///
/// - `EntityDestroyed`: adds the entity's value, publishes `ScoreChanged`
/// - `GameStarted`: resets to zero, publishes `ScoreChanged(0)`
/// - `GameOver`: records a new high score if this game beat it
#[derive(Debug)]
pub struct ScoreKeeper {
    state: Arc<Mutex<ScoreState>>,
    _subscriptions: Subscriptions,
}

impl ScoreKeeper {
    /// Subscribes a keeper with a starting high score of `high_score`.
    #[must_use]
    pub fn new(bus: &EventBus, high_score: u64) -> Self {
        let state = Arc::new(Mutex::new(ScoreState {
            high_score,
            ..ScoreState::default()
        }));
        let mut subscriptions = Subscriptions::new(bus);

        {
            let state = Arc::clone(&state);
            let bus = bus.clone();
            subscriptions.add(Channel::EntityDestroyed, move |event| {
                let GameEvent::EntityDestroyed(entity) = event else {
                    return Ok(());
                };
                let points = u64::try_from(entity.score_value)
                    .ok()
                    .filter(|points| *points > 0)
                    .ok_or_else(|| {
                        HandlerError::new(format!(
                            "ignoring non-positive score value {} for {}",
                            entity.score_value, entity.id
                        ))
                    })?;

                let total = {
                    let mut state = state.lock();
                    state.score += points;
                    state.score
                };
                let _ = bus.publish(GameEvent::ScoreChanged(total));
                Ok(())
            });
        }
        {
            let state = Arc::clone(&state);
            let bus = bus.clone();
            subscriptions.add(Channel::GameStarted, move |_| {
                {
                    let mut state = state.lock();
                    state.score = 0;
                    state.new_high_score = false;
                }
                let _ = bus.publish(GameEvent::ScoreChanged(0));
                Ok(())
            });
        }
        {
            let state = Arc::clone(&state);
            subscriptions.add(Channel::GameOver, move |_| {
                let mut state = state.lock();
                if state.score > state.high_score {
                    state.high_score = state.score;
                    state.new_high_score = true;
                    info!(high_score = state.high_score, "new high score");
                } else {
                    debug!(score = state.score, "game over");
                }
                Ok(())
            });
        }

        Self {
            state,
            _subscriptions: subscriptions,
        }
    }

    /// Current game's score.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.state.lock().score
    }

    /// Best score seen.
    #[must_use]
    pub fn high_score(&self) -> u64 {
        self.state.lock().high_score
    }

    /// Whether the last finished game set the high score.
    #[must_use]
    pub fn is_new_high_score(&self) -> bool {
        self.state.lock().new_high_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::{EntityRef, Tier};
    use shatter_core::EntityId;
    use shatter_shared::Vec2;

    fn destroyed(serial: u32, score_value: i32) -> GameEvent {
        GameEvent::EntityDestroyed(EntityRef {
            id: EntityId::new(serial, 0),
            tier: Tier::Small,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            score_value,
        })
    }

    #[test]
    fn test_accumulates_and_publishes() {
        let bus = EventBus::new();
        let keeper = ScoreKeeper::new(&bus, 0);
        let totals = Arc::new(Mutex::new(Vec::new()));
        {
            let totals = Arc::clone(&totals);
            bus.subscribe(Channel::ScoreChanged, move |event| {
                if let GameEvent::ScoreChanged(total) = event {
                    totals.lock().push(*total);
                }
                Ok(())
            });
        }

        let _ = bus.publish(destroyed(1, 20));
        let _ = bus.publish(destroyed(2, 100));
        assert_eq!(keeper.score(), 120);
        assert_eq!(*totals.lock(), vec![20, 120]);
    }

    #[test]
    fn test_non_positive_values_rejected() {
        let bus = EventBus::new();
        let keeper = ScoreKeeper::new(&bus, 0);

        let report = bus.publish(destroyed(1, 0));
        assert_eq!(report.failures.len(), 1);
        let report = bus.publish(destroyed(2, -5));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(keeper.score(), 0);
    }

    #[test]
    fn test_high_score_on_game_over() {
        let bus = EventBus::new();
        let keeper = ScoreKeeper::new(&bus, 50);

        let _ = bus.publish(destroyed(1, 20));
        let _ = bus.publish(GameEvent::GameOver);
        assert_eq!(keeper.high_score(), 50);
        assert!(!keeper.is_new_high_score());

        let _ = bus.publish(GameEvent::GameStarted);
        assert_eq!(keeper.score(), 0);
        let _ = bus.publish(destroyed(2, 100));
        let _ = bus.publish(GameEvent::GameOver);
        assert_eq!(keeper.high_score(), 100);
        assert!(keeper.is_new_high_score());
    }
}
