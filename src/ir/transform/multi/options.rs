//! Policies for MultiDynamics composition.

use serde::{Deserialize, Serialize};

/// Order of the transitions attached to each composite regime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOrder {
    /// Sub-component by sub-component, each in declaration order.
    #[default]
    ComponentMajor,
    /// Every `OnCondition` first, then every `OnEvent`, each group in
    /// sub-component order.
    KindMajor,
}

/// What a sender into an analog reduce port is dimension-checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReduceDimensionPolicy {
    /// Each sender against the reduce port's declared dimension.
    #[default]
    AgainstPort,
    /// Senders only against each other.
    PairwiseSenders,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    pub transition_order: TransitionOrder,
    pub reduce_dimensions: ReduceDimensionPolicy,
    /// Build the regime product on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            transition_order: TransitionOrder::default(),
            reduce_dimensions: ReduceDimensionPolicy::default(),
            parallel: true,
        }
    }
}
