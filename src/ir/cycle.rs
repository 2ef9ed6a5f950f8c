//! Validation of the target collection before any step is planned.
//!
//! Checks run in a fixed order: duplicate names, unknown dependencies, then
//! cycles. The dependency walk follows declared names depth-first and keeps
//! a visiting set to spot back edges.

use std::collections::HashMap;

use crate::target::Target;

use super::IrGenError;

/// Tracks the visitation state of a node during cycle detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Index targets by name, rejecting duplicates and unknown dependencies.
pub(super) fn index(targets: &[Target]) -> Result<HashMap<&str, &Target>, IrGenError> {
    let mut by_name: HashMap<&str, &Target> = HashMap::with_capacity(targets.len());
    for target in targets {
        if let Some(first) = by_name.insert(target.name.as_str(), target) {
            return Err(IrGenError::DuplicateTarget {
                name: target.name.clone(),
                first: first.dir.clone(),
                second: target.dir.clone(),
            });
        }
    }
    for target in targets {
        if let Some(missing) = target.deps.iter().find(|d| !by_name.contains_key(d.as_str())) {
            return Err(IrGenError::UnknownDependency {
                target: target.name.clone(),
                dependency: missing.clone(),
            });
        }
    }
    Ok(by_name)
}

/// Fail with [`IrGenError::CircularDependency`] if any dependency chain loops.
///
/// Expects `by_name` to cover every dependency, as produced by [`index`].
pub(super) fn detect(
    targets: &[Target],
    by_name: &HashMap<&str, &Target>,
) -> Result<(), IrGenError> {
    let mut detector = CycleDetector::new(by_name);
    for target in targets {
        if detector.is_visited(&target.name) {
            continue;
        }
        if let Some(cycle) = detector.visit(&target.name) {
            return Err(IrGenError::CircularDependency { cycle });
        }
    }
    Ok(())
}

struct CycleDetector<'a> {
    by_name: &'a HashMap<&'a str, &'a Target>,
    stack: Vec<&'a str>,
    states: HashMap<&'a str, VisitState>,
}

impl<'a> CycleDetector<'a> {
    fn new(by_name: &'a HashMap<&'a str, &'a Target>) -> Self {
        Self {
            by_name,
            stack: Vec::new(),
            states: HashMap::new(),
        }
    }

    fn is_visited(&self, node: &str) -> bool {
        matches!(self.states.get(node), Some(VisitState::Visited))
    }

    fn visit(&mut self, node: &'a str) -> Option<Vec<String>> {
        match self.states.get(node) {
            Some(VisitState::Visited) => return None,
            Some(VisitState::Visiting) => {
                let idx = self.stack.iter().position(|n| *n == node).unwrap_or(0);
                let mut cycle: Vec<String> = self
                    .stack
                    .iter()
                    .skip(idx)
                    .map(|n| (*n).to_owned())
                    .collect();
                cycle.push(node.to_owned());
                return Some(canonicalize_cycle(cycle));
            }
            None => {
                self.states.insert(node, VisitState::Visiting);
            }
        }

        self.stack.push(node);
        let by_name = self.by_name;
        if let Some(target) = by_name.get(node) {
            for dep in &target.deps {
                if let Some(cycle) = self.visit(dep.as_str()) {
                    return Some(cycle);
                }
            }
        }
        self.stack.pop();
        self.states.insert(node, VisitState::Visited);
        None
    }
}

/// Rotate a closed cycle so it starts at its smallest name.
fn canonicalize_cycle(mut cycle: Vec<String>) -> Vec<String> {
    if cycle.len() < 2 {
        return cycle;
    }
    let len = cycle.len() - 1;
    let start = cycle
        .iter()
        .take(len)
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(idx, _)| idx);
    let (prefix, suffix) = cycle.split_at_mut(len);
    prefix.rotate_left(start);
    if let (Some(first), Some(slot)) = (prefix.first().cloned(), suffix.first_mut()) {
        *slot = first;
    }
    cycle
}
