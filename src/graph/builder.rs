// ABOUTME: Derives the stack dependency graph from parameter reads and writes.
// ABOUTME: Rejects duplicate stacks, ambiguous or missing producers, and cycles.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::descriptor::StackDescriptor;
use super::error::GraphError;
use crate::types::{ParameterName, StackName};

/// Producer label used for parameters seeded outside any stack.
pub(crate) const EXTERNAL_PRODUCER: &str = "<external>";

/// `producer` must be applied before `consumer` because the consumer reads
/// `parameters` that the producer writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub producer: StackName,
    pub consumer: StackName,
    pub parameters: Vec<ParameterName>,
}

/// A validated, acyclic dependency graph. Only constructible through
/// [`DependencyGraph::build`] and friends, so holding one means every read
/// has exactly one producer and there are no cycles.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    stacks: Vec<StackDescriptor>,
    externals: BTreeSet<ParameterName>,
    producers: BTreeMap<ParameterName, usize>,
    edges: Vec<DependencyEdge>,
    upstream: Vec<BTreeSet<usize>>,
    downstream: Vec<BTreeSet<usize>>,
}

impl DependencyGraph {
    /// Build a graph where every read must be satisfied by some stack.
    pub fn build(stacks: &[StackDescriptor]) -> Result<Self, GraphError> {
        Self::build_with_externals(stacks, &BTreeSet::new())
    }

    /// Build a graph where reads may also be satisfied by parameters seeded
    /// outside the plan.
    pub fn build_with_externals(
        stacks: &[StackDescriptor],
        externals: &BTreeSet<ParameterName>,
    ) -> Result<Self, GraphError> {
        check_duplicate_stacks(stacks)?;
        let producers = resolve_producers(stacks, externals)?;

        let count = stacks.len();
        let mut upstream = vec![BTreeSet::new(); count];
        let mut downstream = vec![BTreeSet::new(); count];
        let mut induced: BTreeMap<(usize, usize), Vec<ParameterName>> = BTreeMap::new();

        for (consumer, stack) in stacks.iter().enumerate() {
            for parameter in &stack.reads {
                match producers.get(parameter) {
                    Some(&producer) => {
                        upstream[consumer].insert(producer);
                        downstream[producer].insert(consumer);
                        induced
                            .entry((consumer, producer))
                            .or_default()
                            .push(parameter.clone());
                    }
                    None if externals.contains(parameter) => {}
                    None => {
                        return Err(GraphError::UnresolvedDependency {
                            parameter: parameter.clone(),
                            consumer: stack.name.clone(),
                        });
                    }
                }
            }
        }

        if let Some(path) = find_cycle(stacks, &downstream) {
            return Err(GraphError::CyclicDependency { path });
        }

        let edges = induced
            .into_iter()
            .map(|((consumer, producer), parameters)| DependencyEdge {
                producer: stacks[producer].name.clone(),
                consumer: stacks[consumer].name.clone(),
                parameters,
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "dependency graph: {} stack(s), {} edge(s), {} external parameter(s)",
            count,
            edges.len(),
            externals.len()
        );

        Ok(Self {
            stacks: stacks.to_vec(),
            externals: externals.clone(),
            producers,
            edges,
            upstream,
            downstream,
        })
    }

    /// Stacks in declaration order.
    pub fn stacks(&self) -> &[StackDescriptor] {
        &self.stacks
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Edges ordered by consumer, then producer, in declaration order.
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    pub fn stack(&self, name: &StackName) -> Option<&StackDescriptor> {
        self.stacks.iter().find(|s| &s.name == name)
    }

    /// The stack that writes `parameter`, or `None` for external or unknown parameters.
    pub fn producer_of(&self, parameter: &ParameterName) -> Option<&StackName> {
        self.producers
            .get(parameter)
            .map(|&index| &self.stacks[index].name)
    }

    pub fn is_external(&self, parameter: &ParameterName) -> bool {
        self.externals.contains(parameter)
    }

    /// Stacks that must be applied before `name`.
    pub fn dependencies_of(&self, name: &StackName) -> Vec<&StackName> {
        self.index_of(name)
            .map(|i| self.upstream[i].iter().map(|&p| &self.stacks[p].name).collect())
            .unwrap_or_default()
    }

    /// Stacks that read something `name` writes.
    pub fn dependents_of(&self, name: &StackName) -> Vec<&StackName> {
        self.index_of(name)
            .map(|i| {
                self.downstream[i]
                    .iter()
                    .map(|&c| &self.stacks[c].name)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Written parameters that no stack reads.
    pub fn unconsumed_writes(&self) -> Vec<(&StackName, &ParameterName)> {
        let read: HashSet<&ParameterName> = self.stacks.iter().flat_map(|s| &s.reads).collect();
        self.stacks
            .iter()
            .flat_map(|s| s.writes.iter().map(move |w| (&s.name, w)))
            .filter(|(_, w)| !read.contains(w))
            .collect()
    }

    /// External parameters that no stack reads.
    pub fn unused_externals(&self) -> Vec<&ParameterName> {
        self.externals
            .iter()
            .filter(|p| !self.stacks.iter().any(|s| s.reads.contains(*p)))
            .collect()
    }

    pub(crate) fn upstream(&self, index: usize) -> &BTreeSet<usize> {
        &self.upstream[index]
    }

    pub(crate) fn downstream(&self, index: usize) -> &BTreeSet<usize> {
        &self.downstream[index]
    }

    fn index_of(&self, name: &StackName) -> Option<usize> {
        self.stacks.iter().position(|s| &s.name == name)
    }
}

fn check_duplicate_stacks(stacks: &[StackDescriptor]) -> Result<(), GraphError> {
    let mut seen = HashSet::new();
    for stack in stacks {
        if !seen.insert(&stack.name) {
            return Err(GraphError::DuplicateStack(stack.name.clone()));
        }
    }
    Ok(())
}

/// Map every written parameter to its single producing stack.
fn resolve_producers(
    stacks: &[StackDescriptor],
    externals: &BTreeSet<ParameterName>,
) -> Result<BTreeMap<ParameterName, usize>, GraphError> {
    let mut claimed: BTreeMap<&ParameterName, Vec<String>> = BTreeMap::new();
    for parameter in externals {
        claimed
            .entry(parameter)
            .or_default()
            .push(EXTERNAL_PRODUCER.to_string());
    }
    for stack in stacks {
        for parameter in &stack.writes {
            claimed
                .entry(parameter)
                .or_default()
                .push(stack.name.to_string());
        }
    }

    // Report the first conflict in declaration order.
    for stack in stacks {
        for parameter in &stack.writes {
            if let Some(producers) = claimed.get(parameter)
                && producers.len() > 1
            {
                return Err(GraphError::AmbiguousProducer {
                    parameter: parameter.clone(),
                    producers: producers.clone(),
                });
            }
        }
    }

    let mut producers = BTreeMap::new();
    for (index, stack) in stacks.iter().enumerate() {
        for parameter in &stack.writes {
            producers.insert(parameter.clone(), index);
        }
    }
    Ok(producers)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first search in declaration order. Returns the first cycle found,
/// closed by repeating its first stack.
fn find_cycle(stacks: &[StackDescriptor], downstream: &[BTreeSet<usize>]) -> Option<Vec<StackName>> {
    fn visit(
        node: usize,
        downstream: &[BTreeSet<usize>],
        marks: &mut [Mark],
        path: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        marks[node] = Mark::InProgress;
        path.push(node);

        for &next in &downstream[node] {
            match marks[next] {
                Mark::InProgress => {
                    let start = path.iter().position(|&n| n == next).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Mark::Unvisited => {
                    if let Some(cycle) = visit(next, downstream, marks, path) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }

        path.pop();
        marks[node] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; stacks.len()];
    let mut path = Vec::new();

    for start in 0..stacks.len() {
        if marks[start] == Mark::Unvisited
            && let Some(cycle) = visit(start, downstream, &mut marks, &mut path)
        {
            return Some(cycle.into_iter().map(|i| stacks[i].name.clone()).collect());
        }
    }
    None
}
