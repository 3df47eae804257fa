//! Control-flow graph over base blocks.

use crate::block::BaseBlock;
use rustc_hash::{FxHashMap, FxHashSet};

/// A labelled directed graph of base blocks.
///
/// Edges come straight from block terminators; the graph adds the reverse
/// (predecessor) view and simple reachability, enough for downstream passes.
pub struct ControlFlowGraph {
    /// Block label -> labels of its successors.
    pub successors: FxHashMap<String, FxHashSet<String>>,
    /// Block label -> labels of its predecessors.
    pub predecessors: FxHashMap<String, FxHashSet<String>>,
    /// Labels in block order.
    pub order: Vec<String>,
}

impl ControlFlowGraph {
    /// Builds the graph for one function's blocks.
    pub fn new(blocks: &[BaseBlock]) -> Self {
        let mut successors: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
        let mut predecessors: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
        let mut order = Vec::with_capacity(blocks.len());

        for block in blocks {
            order.push(block.label.clone());
            successors.entry(block.label.clone()).or_default();
            predecessors.entry(block.label.clone()).or_default();
        }
        for block in blocks {
            for successor in &block.successors {
                successors
                    .get_mut(&block.label)
                    .unwrap()
                    .insert(successor.clone());
                predecessors
                    .entry(successor.clone())
                    .or_default()
                    .insert(block.label.clone());
            }
        }

        Self {
            successors,
            predecessors,
            order,
        }
    }

    /// Labels reachable from `entry`, including `entry` itself.
    pub fn reachable_from(&self, entry: &str) -> FxHashSet<String> {
        let mut seen = FxHashSet::default();
        let mut work = vec![entry.to_string()];
        while let Some(label) = work.pop() {
            if !seen.insert(label.clone()) {
                continue;
            }
            if let Some(next) = self.successors.get(&label) {
                work.extend(next.iter().cloned());
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::build_blocks;
    use minicc_sem::analyze;
    use minicc_util::Handler;

    fn cfg_of(source: &str) -> (Vec<crate::BaseBlock>, ControlFlowGraph) {
        let handler = Handler::new_quiet();
        let program = minicc_par::parse(minicc_lex::tokenize(source)).expect("should parse");
        let analysis = analyze(&program, &handler);
        assert!(!handler.has_errors());
        let blocks = build_blocks(&analysis.sentences);
        let cfg = ControlFlowGraph::new(&blocks);
        (blocks, cfg)
    }

    #[test]
    fn predecessors_mirror_successors() {
        let (blocks, cfg) = cfg_of("int g(){int i; i=0; while(i<10){i=i+1;} return i;}");
        for block in &blocks {
            for successor in &block.successors {
                assert!(cfg.predecessors[successor].contains(&block.label));
            }
        }
    }

    #[test]
    fn loop_head_has_two_predecessors() {
        let (_, cfg) = cfg_of("int g(){int i; i=0; while(i<10){i=i+1;} return i;}");
        // The condition block is entered from before the loop and from the
        // body tail.
        assert!(cfg
            .predecessors
            .values()
            .any(|predecessors| predecessors.len() == 2));
    }

    #[test]
    fn everything_reachable_from_function_entry() {
        let (blocks, cfg) = cfg_of("int f(int x){ if (x) return 1; return 0; }");
        let reachable = cfg.reachable_from(&blocks[0].label);
        assert_eq!(reachable.len(), blocks.len());
    }
}
