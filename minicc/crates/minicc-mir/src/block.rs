//! Base-block construction.

use minicc_sem::{Sentence, SentenceKind};
use serde::Serialize;

/// A maximal single-entry run of sentences ending at a terminator.
#[derive(Debug, Clone, Serialize)]
pub struct BaseBlock {
    pub id: usize,
    /// The block's entry label; synthetic (`KS<n>`) when the block is only
    /// reached by fall-through.
    pub label: String,
    pub sentences: Vec<Sentence>,
    /// Labels of the successor blocks, in branch order.
    pub successors: Vec<String>,
}

impl BaseBlock {
    fn new(id: usize, label: Option<&str>) -> Self {
        Self {
            id,
            label: label
                .map(str::to_string)
                .unwrap_or_else(|| format!("KS{id}")),
            sentences: Vec::new(),
            successors: Vec::new(),
        }
    }

    fn add_successor(&mut self, label: &str) {
        if !self.successors.iter().any(|s| s == label) {
            self.successors.push(label.to_string());
        }
    }
}

/// Whether a sentence separates functions instead of living inside a block.
fn is_block_boundary(kind: &SentenceKind) -> bool {
    matches!(
        kind,
        SentenceKind::DefineGlobalVar { .. }
            | SentenceKind::DefineGlobalArray { .. }
            | SentenceKind::DefineFunc { .. }
            | SentenceKind::DeclareFunc { .. }
            | SentenceKind::FuncEnd
    )
}

/// Splits the sentence stream into base blocks.
pub fn build_blocks(sentences: &[Sentence]) -> Vec<BaseBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<BaseBlock> = None;

    for sentence in sentences {
        if is_block_boundary(&sentence.kind) {
            // FuncEnd also closes an open block (a void function may fall
            // through to its bare `ret`).
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }

        // A label always starts a fresh block.
        if sentence.label.is_some() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            current = Some(BaseBlock::new(blocks.len(), sentence.label.as_deref()));
        }
        let block = current.get_or_insert_with(|| BaseBlock::new(blocks.len(), None));
        block.sentences.push(sentence.clone());

        match &sentence.kind {
            SentenceKind::Jmp { target } => {
                block.add_successor(target);
                blocks.push(current.take().unwrap());
            }
            SentenceKind::IfJmp {
                true_label,
                false_label,
                ..
            } => {
                block.add_successor(true_label);
                block.add_successor(false_label);
                blocks.push(current.take().unwrap());
            }
            SentenceKind::Return { .. } => {
                blocks.push(current.take().unwrap());
            }
            _ => {}
        }
    }
    if let Some(block) = current.take() {
        blocks.push(block);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use minicc_sem::analyze;
    use minicc_util::Handler;

    fn blocks_of(source: &str) -> Vec<BaseBlock> {
        let handler = Handler::new_quiet();
        let program = minicc_par::parse(minicc_lex::tokenize(source)).expect("should parse");
        let analysis = analyze(&program, &handler);
        assert!(!handler.has_errors());
        build_blocks(&analysis.sentences)
    }

    #[test]
    fn straight_line_function_is_one_chain() {
        let blocks = blocks_of("int main(){int a; a=1; return a;}");
        // Entry block falls into the leave block via the return funnel.
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].label.starts_with("KS"));
        assert_eq!(blocks[0].successors.len(), 1);
        assert_eq!(blocks[1].label, blocks[0].successors[0]);
        assert!(blocks[1].successors.is_empty());
    }

    #[test]
    fn while_loop_shape() {
        let blocks = blocks_of("int g(){int i; i=0; while(i<10){ if(i==5) break; i=i+1;} return i;}");
        // Every block ends in exactly one terminator.
        for block in &blocks {
            let terminators = block
                .sentences
                .iter()
                .filter(|s| s.is_terminator())
                .count();
            assert_eq!(terminators, 1, "block {} malformed", block.label);
            assert!(block.sentences.last().unwrap().is_terminator());
        }
        // The condition block has two successors and is the target of a back
        // edge from the body tail.
        let cond = blocks
            .iter()
            .find(|b| b.successors.len() == 2)
            .expect("loop condition branches");
        assert!(blocks
            .iter()
            .any(|b| b.id > cond.id && b.successors.contains(&cond.label)));
    }

    #[test]
    fn globals_do_not_open_blocks() {
        let blocks = blocks_of("int a; int b[3]; int main(){return a;}");
        for block in &blocks {
            assert!(!block
                .sentences
                .iter()
                .any(|s| matches!(s.kind, SentenceKind::DefineGlobalVar { .. })));
        }
    }

    #[test]
    fn successors_always_resolve_to_blocks() {
        let blocks =
            blocks_of("int f(int x){ if (x>0 && x<10) return 1; return 0; }");
        let labels: Vec<&str> = blocks.iter().map(|b| b.label.as_str()).collect();
        for block in &blocks {
            for successor in &block.successors {
                assert!(
                    labels.contains(&successor.as_str()),
                    "dangling edge {} -> {successor}",
                    block.label
                );
            }
        }
    }
}
