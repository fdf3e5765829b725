//! Emotional strategies rotated across concurrent theme generations.
//!
//! Independent parallel generations drift toward the same emotional framing.
//! Each concurrent theme request is therefore pinned to a different
//! [`EmotionalStrategy`], drawn without replacement from a shuffled deck that
//! is refilled only once every strategy has been handed out.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Narrative framing applied to a generated theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalStrategy {
    Empathy,
    Desire,
    Excitement,
    Inspiration,
    Urgency,
}

impl EmotionalStrategy {
    pub const ALL: [EmotionalStrategy; 5] = [
        EmotionalStrategy::Empathy,
        EmotionalStrategy::Desire,
        EmotionalStrategy::Excitement,
        EmotionalStrategy::Inspiration,
        EmotionalStrategy::Urgency,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Empathy => "Empathy",
            Self::Desire => "Desire",
            Self::Excitement => "Excitement",
            Self::Inspiration => "Inspiration",
            Self::Urgency => "Urgency",
        }
    }

    /// Instruction fragment appended to the theme prompt.
    pub fn guidance(self) -> &'static str {
        match self {
            Self::Empathy => {
                "Open from the customer's pain and show that the brand truly understands it."
            }
            Self::Desire => {
                "Paint the outcome the customer wants so vividly that they crave it."
            }
            Self::Excitement => {
                "Lead with novelty and energy; make the brand feel like a discovery."
            }
            Self::Inspiration => {
                "Tell a transformation story that makes the customer believe they can change."
            }
            Self::Urgency => {
                "Frame the cost of waiting and give a concrete reason to act now."
            }
        }
    }
}

/// Hands out strategies without replacement, reshuffling once exhausted.
pub struct StrategyRotation<R> {
    rng: R,
    deck: Vec<EmotionalStrategy>,
}

impl<R: Rng> StrategyRotation<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            deck: Vec::with_capacity(EmotionalStrategy::ALL.len()),
        }
    }

    /// Draw the next strategy.
    pub fn next_strategy(&mut self) -> EmotionalStrategy {
        if self.deck.is_empty() {
            self.deck.extend_from_slice(&EmotionalStrategy::ALL);
            self.deck.shuffle(&mut self.rng);
        }
        // The deck was refilled above, so it is never empty here.
        self.deck.pop().unwrap_or(EmotionalStrategy::Empathy)
    }

    /// Draw `n` strategies in order.
    pub fn take(&mut self, n: usize) -> Vec<EmotionalStrategy> {
        (0..n).map(|_| self.next_strategy()).collect()
    }
}

/// Assign strategies to `n` concurrent generations using the thread RNG.
pub fn assign_strategies(n: usize) -> Vec<EmotionalStrategy> {
    StrategyRotation::new(rand::rng()).take(n)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
