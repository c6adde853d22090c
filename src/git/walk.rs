//! git::walk
//!
//! Lazy commit-graph traversal in a caller-chosen order.
//!
//! Each commit is yielded at most once even when several start points or
//! merge parents reach it.

use std::collections::{BinaryHeap, HashSet, VecDeque};

use super::interface::{Git, GitError};
use crate::core::types::Oid;

/// Order in which history is visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkOrder {
    /// Newest committer time first.
    #[default]
    Time,
    /// Pre-order, first parent before later parents.
    DepthFirst,
    /// Level by level from the start points.
    BreadthFirst,
}

enum Frontier {
    Time(BinaryHeap<(i64, Oid)>),
    Stack(Vec<Oid>),
    Queue(VecDeque<Oid>),
}

/// Iterator over commits reachable from a set of start points.
pub struct CommitWalk<'g> {
    git: &'g Git,
    frontier: Frontier,
    seen: HashSet<Oid>,
}

impl Git {
    /// Walk history from `starts` in the given order.
    pub fn walk(&self, starts: &[Oid], order: WalkOrder) -> Result<CommitWalk<'_>, GitError> {
        let mut walk = CommitWalk {
            git: self,
            frontier: match order {
                WalkOrder::Time => Frontier::Time(BinaryHeap::new()),
                WalkOrder::DepthFirst => Frontier::Stack(Vec::new()),
                WalkOrder::BreadthFirst => Frontier::Queue(VecDeque::new()),
            },
            seen: HashSet::new(),
        };
        match &mut walk.frontier {
            // The stack pops from the end, so the first start must go last.
            Frontier::Stack(stack) => stack.extend(starts.iter().rev().cloned()),
            _ => {
                for oid in starts {
                    walk.enqueue(oid.clone())?;
                }
            }
        }
        Ok(walk)
    }
}

impl CommitWalk<'_> {
    fn enqueue(&mut self, oid: Oid) -> Result<(), GitError> {
        match &mut self.frontier {
            Frontier::Time(heap) => {
                if self.seen.insert(oid.clone()) {
                    let time = self.git.commit_time(&oid)?;
                    heap.push((time, oid));
                }
            }
            Frontier::Queue(queue) => {
                if self.seen.insert(oid.clone()) {
                    queue.push_back(oid);
                }
            }
            Frontier::Stack(stack) => stack.push(oid),
        }
        Ok(())
    }

    fn pop(&mut self) -> Option<Oid> {
        match &mut self.frontier {
            Frontier::Time(heap) => heap.pop().map(|(_, oid)| oid),
            Frontier::Queue(queue) => queue.pop_front(),
            Frontier::Stack(stack) => {
                while let Some(oid) = stack.pop() {
                    if self.seen.insert(oid.clone()) {
                        return Some(oid);
                    }
                }
                None
            }
        }
    }

    fn step(&mut self) -> Result<Option<Oid>, GitError> {
        let Some(oid) = self.pop() else {
            return Ok(None);
        };
        let parents = self.git.commit_parents(&oid)?;
        if let Frontier::Stack(_) = self.frontier {
            for parent in parents.into_iter().rev() {
                self.enqueue(parent)?;
            }
        } else {
            for parent in parents {
                self.enqueue(parent)?;
            }
        }
        Ok(Some(oid))
    }
}

impl Iterator for CommitWalk<'_> {
    type Item = Result<Oid, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step().transpose()
    }
}
