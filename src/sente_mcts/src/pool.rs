// Copyright 2024 Karl Sundequist Blomdahl <karl.sundequist.blomdahl@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A slab of `Node`s shared across all search threads (§5 "Resource
//! discipline"). Nodes are never dropped individually -- a subtree is
//! released back to the pool in one `release_subtree` call, walked
//! iteratively so that releasing a deep tree cannot blow the stack.

use std::sync::{Arc, Mutex, RwLock};

use crate::node::Node;

pub type NodeId = usize;

pub struct NodePool {
    slots: RwLock<Vec<Option<Arc<Node>>>>,
    free: Mutex<Vec<NodeId>>
}

impl NodePool {
    pub fn new() -> NodePool {
        NodePool { slots: RwLock::new(Vec::new()), free: Mutex::new(Vec::new()) }
    }

    /// Inserts `node`, reusing a freed slot if one is available.
    pub fn insert(&self, node: Node) -> NodeId {
        let node = Arc::new(node);
        let mut free = self.free.lock().unwrap();

        if let Some(id) = free.pop() {
            self.slots.write().unwrap()[id] = Some(node);
            id
        } else {
            drop(free);
            let mut slots = self.slots.write().unwrap();
            slots.push(Some(node));
            slots.len() - 1
        }
    }

    pub fn get(&self, id: NodeId) -> Arc<Node> {
        self.slots.read().unwrap()[id].as_ref()
            .expect("NodeId references a slot that has not been released")
            .clone()
    }

    pub fn try_get(&self, id: NodeId) -> Option<Arc<Node>> {
        self.slots.read().unwrap().get(id).and_then(|slot| slot.clone())
    }

    pub fn num_in_use(&self) -> usize {
        self.slots.read().unwrap().iter().filter(|slot| slot.is_some()).count()
    }

    /// Frees `root` and every node reachable from it, keeping `except` (if
    /// given) and its own descendants alive -- used when promoting a new
    /// root so that the kept child's subtree survives while every sibling
    /// subtree, and the old root itself, is released (§4.1 "play").
    pub fn release_subtree(&self, root: NodeId, except: Option<NodeId>) {
        let mut stack = vec![root];
        let mut to_free = Vec::new();

        while let Some(id) = stack.pop() {
            if Some(id) == except {
                continue;
            }

            if let Some(node) = self.try_get(id) {
                for (_, child_id) in node.children() {
                    stack.push(child_id);
                }
            }

            to_free.push(id);
        }

        let mut slots = self.slots.write().unwrap();
        let mut free = self.free.lock().unwrap();

        for id in to_free {
            slots[id] = None;
            free.push(id);
        }
    }
}

impl Default for NodePool {
    fn default() -> NodePool {
        NodePool::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sente_go::{Board, Color, Rule};

    fn leaf() -> Node {
        Node::new_child(Board::new(9, 9, Rule::Japanese, 7.5, false), 0, 0, Color::Black, 0, 0.5)
    }

    #[test]
    fn insert_and_get_round_trips() {
        let pool = NodePool::new();
        let id = pool.insert(leaf());

        assert_eq!(pool.get(id).xy(), (0, 0));
        assert_eq!(pool.num_in_use(), 1);
    }

    #[test]
    fn insert_reuses_freed_slots() {
        let pool = NodePool::new();
        let a = pool.insert(leaf());
        pool.release_subtree(a, None);

        assert_eq!(pool.num_in_use(), 0);

        let b = pool.insert(leaf());
        assert_eq!(b, a);
        assert_eq!(pool.num_in_use(), 1);
    }

    #[test]
    fn release_subtree_keeps_the_excepted_branch() {
        let pool = NodePool::new();
        let root = pool.insert(Node::new_root(Board::new(9, 9, Rule::Japanese, 7.5, false)));
        let kept = pool.insert(leaf());

        pool.release_subtree(root, Some(kept));

        assert!(pool.try_get(root).is_none());
        assert!(pool.try_get(kept).is_some());
    }
}
