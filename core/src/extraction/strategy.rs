//! Ordered fallback chains.
//!
//! A resolver lists its strategies in priority order; each step either
//! resolves, asks for the next strategy, or fails hard.

use std::fmt::Debug;

use log::debug;

use crate::error::Result;

/// Outcome of one strategy step
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    /// The strategy produced a definite answer
    Resolved(T),
    /// The strategy does not apply; try the next one
    Next,
}

/// Turns missing or inconsistent metadata into [`Step::Next`]
///
/// Every other error is passed through as a hard failure.
pub fn attempt<T>(result: Result<T>) -> Result<Step<T>> {
    match result {
        Ok(value) => Ok(Step::Resolved(value)),
        Err(e) if e.is_recoverable() => {
            debug!("{}", e);
            Ok(Step::Next)
        }
        Err(e) => Err(e),
    }
}

/// Runs `strategies` in order until one resolves
///
/// Returns `None` when every strategy asked for the next one.
pub fn first_resolved<S, T, F>(strategies: &[S], mut step: F) -> Result<Option<(S, T)>>
where
    S: Copy + Debug,
    F: FnMut(S) -> Result<Step<T>>,
{
    for &strategy in strategies {
        match step(strategy)? {
            Step::Resolved(value) => {
                debug!("resolved with {:?}", strategy);
                return Ok(Some((strategy, value)));
            }
            Step::Next => debug!("{:?} did not apply", strategy),
        }
    }
    Ok(None)
}
