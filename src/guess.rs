//! Scoring a guessed interval against the hidden target.

use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::error::{GameError, Result};
use crate::session::GameSession;

/// Where the target lies relative to a wrong guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Higher,
    Lower,
}

/// Result of one guess. The target is revealed once a guess is made.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuessOutcome {
    pub correct: bool,
    pub relation: Option<Relation>,
    pub frequency_hz: f64,
}

/// Parse one guess bound, rejecting anything that is not a finite number.
pub fn parse_bound(name: &str, raw: Option<&str>) -> Result<f64> {
    let raw = raw.ok_or_else(|| GameError::InvalidGuessFormat(format!("missing '{name}'")))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| GameError::InvalidGuessFormat(format!("'{name}' is not a number: {raw:?}")))?;
    if !value.is_finite() {
        return Err(GameError::InvalidGuessFormat(format!("'{name}' must be finite, got {raw:?}")));
    }
    Ok(value)
}

/// Reads the shared session and scores guesses. Never writes to it.
#[derive(Debug, Clone)]
pub struct GuessEvaluator {
    session: Arc<GameSession>,
}

impl GuessEvaluator {
    pub fn new(session: Arc<GameSession>) -> Self {
        Self { session }
    }

    /// Score the interval `[min_guess, max_guess]`; swapped bounds are reordered.
    pub fn evaluate(&self, min_guess: f64, max_guess: f64) -> Result<GuessOutcome> {
        if !(min_guess.is_finite() && max_guess.is_finite()) {
            return Err(GameError::InvalidGuessFormat(format!(
                "bounds must be finite, got {min_guess} and {max_guess}"
            )));
        }
        let target = self.session.get().ok_or(GameError::NoActiveSession)?;
        let (lo, hi) = if min_guess > max_guess {
            (max_guess, min_guess)
        } else {
            (min_guess, max_guess)
        };

        let hz = target.target_hz;
        let correct = lo <= hz && hz <= hi;
        let relation = match correct {
            true => None,
            false if hz < lo => Some(Relation::Lower),
            false => Some(Relation::Higher),
        };
        debug!("Guess [{lo}, {hi}] correct={correct}");

        Ok(GuessOutcome {
            correct,
            relation,
            frequency_hz: hz,
        })
    }

    /// Score a guess whose bounds arrive as text, e.g. from a query string.
    pub fn evaluate_raw(&self, min: Option<&str>, max: Option<&str>) -> Result<GuessOutcome> {
        let min = parse_bound("min", min)?;
        let max = parse_bound("max", max)?;
        self.evaluate(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::tests::test_generator;

    fn evaluator_with_target(hz: f64) -> GuessEvaluator {
        let session = Arc::new(GameSession::new());
        session.set(hz, 1);
        GuessEvaluator::new(session)
    }

    #[test]
    fn no_round_yet() {
        let eval = GuessEvaluator::new(Arc::new(GameSession::new()));
        assert!(matches!(eval.evaluate(20.0, 120.0), Err(GameError::NoActiveSession)));
    }

    #[test]
    fn scores_against_generated_round() {
        let generator = test_generator(21);
        generator.generate_with_target(1, 300.0).unwrap();
        let eval = GuessEvaluator::new(generator.session().clone());

        let hit = eval.evaluate(121.0, 500.0).unwrap();
        assert!(hit.correct);
        assert_eq!(hit.relation, None);
        assert_eq!(hit.frequency_hz, 300.0);

        let above = eval.evaluate(501.0, 800.0).unwrap();
        assert!(!above.correct);
        assert_eq!(above.relation, Some(Relation::Lower));

        let below = eval.evaluate(20.0, 120.0).unwrap();
        assert!(!below.correct);
        assert_eq!(below.relation, Some(Relation::Higher));
    }

    #[test]
    fn swapped_bounds_are_normalized() {
        let eval = evaluator_with_target(300.0);
        assert_eq!(eval.evaluate(800.0, 500.0).unwrap(), eval.evaluate(500.0, 800.0).unwrap());
        assert!(eval.evaluate(500.0, 121.0).unwrap().correct);
    }

    #[test]
    fn bounds_are_inclusive() {
        let eval = evaluator_with_target(500.0);
        assert!(eval.evaluate(121.0, 500.0).unwrap().correct);
        assert!(eval.evaluate(500.0, 800.0).unwrap().correct);
        assert!(eval.evaluate(500.0, 500.0).unwrap().correct);
    }

    #[test]
    fn guessing_does_not_end_the_round() {
        let eval = evaluator_with_target(300.0);
        eval.evaluate(20.0, 120.0).unwrap();
        assert!(eval.evaluate(121.0, 500.0).unwrap().correct);
    }

    #[test]
    fn raw_bounds_are_parsed() {
        let eval = evaluator_with_target(300.0);
        let outcome = eval.evaluate_raw(Some(" 121 "), Some("500.5")).unwrap();
        assert!(outcome.correct);
    }

    #[test]
    fn malformed_bounds_are_rejected() {
        let eval = evaluator_with_target(300.0);
        for (min, max) in [
            (Some("abc"), Some("500")),
            (Some("121"), None),
            (None, Some("500")),
            (Some("NaN"), Some("500")),
            (Some("121"), Some("inf")),
            (Some(""), Some("500")),
        ] {
            let err = eval.evaluate_raw(min, max).unwrap_err();
            assert!(matches!(err, GameError::InvalidGuessFormat(_)), "{min:?}/{max:?} gave {err:?}");
        }
        assert!(matches!(
            eval.evaluate(f64::NAN, 10.0),
            Err(GameError::InvalidGuessFormat(_))
        ));
    }

    #[test]
    fn malformed_input_wins_over_missing_session() {
        let eval = GuessEvaluator::new(Arc::new(GameSession::new()));
        assert!(matches!(
            eval.evaluate_raw(Some("x"), Some("1")),
            Err(GameError::InvalidGuessFormat(_))
        ));
    }

    #[test]
    fn outcome_json_shape() {
        let eval = evaluator_with_target(300.0);
        let wrong = serde_json::to_value(eval.evaluate(501.0, 800.0).unwrap()).unwrap();
        assert_eq!(wrong["correct"], false);
        assert_eq!(wrong["relation"], "lower");
        assert_eq!(wrong["frequency_hz"], 300.0);

        let right = serde_json::to_value(eval.evaluate(121.0, 500.0).unwrap()).unwrap();
        assert!(right["relation"].is_null());
    }
}
