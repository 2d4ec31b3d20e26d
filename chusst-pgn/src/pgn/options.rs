use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// What to do when a move inside a variation cannot be validated.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationErrorPolicy {
    /// Keep everything resolved so far, leave the rest of the variation unresolved and record a
    /// diagnostic.
    #[default]
    AbortVariation,
    /// Fail the whole game.
    AbortGame,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub validate_variations: bool,
    pub variation_errors: VariationErrorPolicy,
    pub max_tokens: Option<usize>,
    pub time_limit_ms: Option<u64>,
    /// Worker threads for multi-game parsing, `None` for the global pool.
    pub threads: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            validate_variations: true,
            variation_errors: VariationErrorPolicy::default(),
            max_tokens: None,
            time_limit_ms: None,
            threads: None,
        }
    }
}

pub trait HasStopSignal {
    fn stop(&mut self) -> bool;
}

impl HasStopSignal for () {
    fn stop(&mut self) -> bool {
        false
    }
}

impl HasStopSignal for &AtomicBool {
    fn stop(&mut self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<S: HasStopSignal + ?Sized> HasStopSignal for &mut S {
    fn stop(&mut self) -> bool {
        (**self).stop()
    }
}

/// Token and wall-clock limits taken from [`ParseOptions`].
#[derive(Clone, Debug)]
pub(crate) struct Budget {
    max_tokens: Option<usize>,
    deadline: Option<Instant>,
    tokens: usize,
}

impl Budget {
    pub(crate) fn new(options: &ParseOptions) -> Self {
        Budget {
            max_tokens: options.max_tokens,
            deadline: options
                .time_limit_ms
                .map(|limit| Instant::now() + Duration::from_millis(limit)),
            tokens: 0,
        }
    }

    pub(crate) fn tokens(&self) -> usize {
        self.tokens
    }

    /// Whether the wall-clock limit has passed, without counting a token.
    pub(crate) fn expired(&self) -> bool {
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }
}

impl HasStopSignal for Budget {
    fn stop(&mut self) -> bool {
        if matches!(self.max_tokens, Some(max_tokens) if self.tokens >= max_tokens) {
            return true;
        }
        if self.expired() {
            return true;
        }

        self.tokens += 1;
        false
    }
}
