//! Per-timestep reward collection and aggregation strategies.
//!
//! After every component advanced, the manager reads each reward into a
//! [`TimestepRewards`] (ascending `ComponentId`) and folds it into one `i64`
//! with the configured [`RewardAggregator`].
//!
//! | Strategy            | Aggregate                                          |
//! |---------------------|----------------------------------------------------|
//! | [`SumRewards`]      | Sum of all rewards (default)                       |
//! | [`WeightedRewards`] | Sum of `weight × reward`, unlisted weight 1        |
//! | [`MinRewards`]      | Worst single reward, 0 with no components          |

use std::collections::BTreeMap;

use sim_core::{ComponentId, Timestep};

// ── TimestepRewards ───────────────────────────────────────────────────────────

/// Rewards reported by every component for one timestep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestepRewards {
    timestep: Timestep,
    /// Sorted by ascending id.
    rewards:  Vec<(ComponentId, i32)>,
}

impl TimestepRewards {
    pub fn new(timestep: Timestep, mut rewards: Vec<(ComponentId, i32)>) -> Self {
        rewards.sort_unstable_by_key(|&(id, _)| id);
        Self { timestep, rewards }
    }

    pub fn timestep(&self) -> Timestep {
        self.timestep
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn get(&self, id: ComponentId) -> Option<i32> {
        self.rewards
            .binary_search_by_key(&id, |&(c, _)| c)
            .ok()
            .map(|i| self.rewards[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, i32)> + '_ {
        self.rewards.iter().copied()
    }

    /// Plain sum, widened to `i64`.
    pub fn total(&self) -> i64 {
        self.rewards.iter().map(|&(_, r)| i64::from(r)).sum()
    }
}

// ── RewardAggregator ──────────────────────────────────────────────────────────

/// Folds one timestep's rewards into a single value.
///
/// Implementations must not depend on anything but the reward set, so the
/// same run always produces the same aggregates.
pub trait RewardAggregator: Send + Sync {
    fn aggregate(&self, rewards: &TimestepRewards) -> i64;
}

/// Sum of every component's reward.
#[derive(Debug, Default, Clone, Copy)]
pub struct SumRewards;

impl RewardAggregator for SumRewards {
    fn aggregate(&self, rewards: &TimestepRewards) -> i64 {
        rewards.total()
    }
}

/// Sum of `weight × reward`.  Components without an explicit weight count 1.
///
/// Products and the running sum saturate at the `i64` bounds; the sum is
/// folded in ascending id order.
#[derive(Debug, Default, Clone)]
pub struct WeightedRewards {
    weights: BTreeMap<ComponentId, i64>,
}

impl WeightedRewards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weight(mut self, id: ComponentId, weight: i64) -> Self {
        self.weights.insert(id, weight);
        self
    }

    pub fn weight_of(&self, id: ComponentId) -> i64 {
        self.weights.get(&id).copied().unwrap_or(1)
    }
}

impl RewardAggregator for WeightedRewards {
    fn aggregate(&self, rewards: &TimestepRewards) -> i64 {
        rewards
            .iter()
            .map(|(id, r)| self.weight_of(id).saturating_mul(i64::from(r)))
            .fold(0, i64::saturating_add)
    }
}

/// The worst single reward of the timestep.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinRewards;

impl RewardAggregator for MinRewards {
    fn aggregate(&self, rewards: &TimestepRewards) -> i64 {
        rewards.iter().map(|(_, r)| i64::from(r)).min().unwrap_or(0)
    }
}
