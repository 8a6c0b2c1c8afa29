// ABOUTME: Plan emitter: orders stacks so every producer precedes its consumers.
// ABOUTME: Kahn's algorithm with declaration order as the tie-break, so output is deterministic.

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use super::builder::DependencyGraph;
use crate::types::{ParameterName, StackName};

/// One entry of the apply sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    pub stack: StackName,
    pub reads: BTreeSet<ParameterName>,
    pub writes: BTreeSet<ParameterName>,
    /// Stacks that must have been applied first, in apply order.
    pub after: Vec<StackName>,
}

/// Serial apply sequence for a validated graph. Emitting does not execute
/// anything; execution belongs to the provisioning engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyPlan {
    pub steps: Vec<PlanStep>,
}

impl ApplyPlan {
    pub fn emit(graph: &DependencyGraph) -> Self {
        let count = graph.len();
        let mut remaining: Vec<usize> = (0..count).map(|i| graph.upstream(i).len()).collect();
        let mut ready: BinaryHeap<Reverse<usize>> = remaining
            .iter()
            .enumerate()
            .filter(|&(_, &deps)| deps == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(count);
        let mut position = vec![usize::MAX; count];

        while let Some(Reverse(node)) = ready.pop() {
            position[node] = order.len();
            order.push(node);

            for &consumer in graph.downstream(node) {
                remaining[consumer] -= 1;
                if remaining[consumer] == 0 {
                    ready.push(Reverse(consumer));
                }
            }
        }

        // DependencyGraph rejects cycles at construction, so every stack is placed.
        debug_assert_eq!(order.len(), count, "dependency graph contained a cycle");

        let stacks = graph.stacks();
        let steps = order
            .iter()
            .map(|&index| {
                let stack = &stacks[index];
                let mut after: Vec<usize> = graph.upstream(index).iter().copied().collect();
                after.sort_by_key(|&p| position[p]);

                PlanStep {
                    stack: stack.name.clone(),
                    reads: stack.reads.clone(),
                    writes: stack.writes.clone(),
                    after: after.into_iter().map(|p| stacks[p].name.clone()).collect(),
                }
            })
            .collect();

        tracing::debug!("emitted apply plan with {} step(s)", count);
        Self { steps }
    }

    /// Stack names in apply order.
    pub fn order(&self) -> Vec<&StackName> {
        self.steps.iter().map(|s| &s.stack).collect()
    }

    /// Zero-based position of a stack in the sequence.
    pub fn position(&self, stack: &StackName) -> Option<usize> {
        self.steps.iter().position(|s| &s.stack == stack)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
