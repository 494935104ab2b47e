use coursegate_core::types::Timestamp;

/// Source of the current instant used when evaluating unlock windows.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    /// Wall-clock time.
    System,
    /// A fixed instant, for tests and previews.
    Fixed(Timestamp),
}

impl Clock {
    pub fn now(&self) -> Timestamp {
        match self {
            Self::System => chrono::Utc::now(),
            Self::Fixed(at) => *at,
        }
    }
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Course sessions are not stored here: every request decodes its own
/// boundary input.
#[derive(Debug, Clone, Copy)]
pub struct AppState {
    /// Clock used for window evaluation.
    pub clock: Clock,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_is_stable() {
        let at = chrono::Utc.timestamp_opt(1_750_000_000, 0).unwrap();
        let state = AppState {
            clock: Clock::Fixed(at),
        };
        assert_eq!(state.clock.now(), at);
        assert_eq!(state.clock.now().timestamp(), 1_750_000_000);
    }
}
