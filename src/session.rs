//! The single active game round.
//!
//! One `GameSession` is shared (via `Arc`) by the bundle generator, which is the
//! only writer, and the guess evaluator, which only reads. The target frequency
//! and its range index live in one `Option<Target>` behind one mutex, so a
//! reader sees either the whole previous round or the whole new one.
//!
//! There is one session per engine: a second bundle request
//! replaces the target of the first, whoever asked for it.

use parking_lot::Mutex;

/// The hidden answer of the current round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub target_hz: f64,
    pub range_index: usize,
}

#[derive(Debug, Default)]
pub struct GameSession {
    current: Mutex<Option<Target>>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current round, returning the one it superseded.
    pub fn set(&self, target_hz: f64, range_index: usize) -> Option<Target> {
        self.current.lock().replace(Target {
            target_hz,
            range_index,
        })
    }

    /// Snapshot of the current round, if any.
    pub fn get(&self) -> Option<Target> {
        *self.current.lock()
    }

    pub fn clear(&self) -> Option<Target> {
        self.current.lock().take()
    }

    pub fn is_active(&self) -> bool {
        self.current.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_empty() {
        let session = GameSession::new();
        assert!(!session.is_active());
        assert_eq!(session.get(), None);
    }

    #[test]
    fn set_overwrites_previous_round() {
        let session = GameSession::new();
        assert_eq!(session.set(300.0, 1), None);
        let previous = session.set(5000.0, 4);
        assert_eq!(
            previous,
            Some(Target {
                target_hz: 300.0,
                range_index: 1
            })
        );
        assert_eq!(session.get().unwrap().range_index, 4);
    }

    #[test]
    fn get_does_not_consume() {
        let session = GameSession::new();
        session.set(440.0, 1);
        assert!(session.get().is_some());
        assert!(session.get().is_some());
        assert!(session.clear().is_some());
        assert!(!session.is_active());
    }

    #[test]
    fn concurrent_readers_never_see_torn_pairs() {
        // Writers always store hz == index * 1000, so any mismatch is a torn read.
        let session = Arc::new(GameSession::new());
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let s = Arc::clone(&session);
                thread::spawn(move || {
                    for i in 0..2000usize {
                        let idx = (w * 2000 + i) % 5;
                        s.set(idx as f64 * 1000.0, idx);
                    }
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let s = Arc::clone(&session);
                thread::spawn(move || {
                    for _ in 0..2000 {
                        if let Some(t) = s.get() {
                            assert_eq!(t.target_hz, t.range_index as f64 * 1000.0);
                        }
                    }
                })
            })
            .collect();
        for h in writers.into_iter().chain(readers) {
            h.join().unwrap();
        }
    }
}
