//! Grafting parsed records onto the tree.

use shakmaty::Chess;
use tracing::info;

use super::{Engine, ImportMode, extend, fresh_tree};
use crate::error::{Error, Result};
use crate::oracle::MoveOracle;
use crate::pgn::{Line, read_record};
use crate::puzzle::parse_fen;
use crate::tree::{NodeId, VariationTree};

impl<O: MoveOracle> Engine<O> {
    /// Import a record using the configured import mode.
    pub fn import_record(&mut self, text: &str) -> Result<()> {
        self.import_record_with(text, self.config.import_mode)
    }

    /// Import a record. On failure the tree, headers and cursor are
    /// unchanged; on success the cursor is at the root.
    pub fn import_record_with(&mut self, text: &str, mode: ImportMode) -> Result<()> {
        let record = read_record(text)?;

        let fen_offset = record.header_offset("FEN").unwrap_or(0);
        let start = match record.headers.fen() {
            Some(fen) => {
                Some(parse_fen(fen).map_err(|err| Error::parse(fen_offset, err.to_string()))?)
            }
            None => None,
        };

        let mut tree = match mode {
            ImportMode::Replace => fresh_tree(&self.oracle, start.unwrap_or_default()),
            ImportMode::Merge => {
                let start_key = self.oracle.position_key(&start.unwrap_or_default());
                if start_key != self.tree.root_node().key() {
                    return Err(Error::parse(
                        fen_offset,
                        "record starts from a different position",
                    ));
                }
                self.tree.clone()
            }
        };

        let root = tree.root();
        if let Some(comment) = &record.line.comment {
            tree.append_comment(root, comment)?;
        }
        graft(&self.oracle, &mut tree, root, &record.line, false)?;
        tree.jump_to(root)?;

        match mode {
            ImportMode::Replace => {
                self.headers = record.headers;
                if let Some(result) = &record.result {
                    self.headers.set_default("Result", result);
                }
                self.puzzle = None;
            }
            ImportMode::Merge => {
                for (key, value) in record.headers.iter() {
                    self.headers.set_default(key, value);
                }
            }
        }
        self.tree = tree;
        self.last_result = None;
        info!(nodes = self.tree.len(), %mode, "imported record");
        Ok(())
    }
}

/// Add `line` below `from`. Each move's variations are alternatives to
/// that move, so they hang from the same parent.
fn graft<O: MoveOracle>(
    oracle: &O,
    tree: &mut VariationTree,
    from: NodeId,
    line: &Line,
    lead_comment: bool,
) -> Result<()> {
    let mut parent = from;
    for (i, entry) in line.moves.iter().enumerate() {
        let position: Chess = tree.node(parent)?.position().clone();
        let mv = oracle
            .parse_move(&position, &entry.san)
            .map_err(|err| Error::parse(entry.offset, err.to_string()))?;
        let (node, _) = extend(oracle, tree, parent, &position, &mv)?;

        if i == 0 && lead_comment {
            if let Some(comment) = &line.comment {
                tree.append_comment(node, comment)?;
            }
        }
        for &nag in &entry.nags {
            tree.add_nag(node, nag)?;
        }
        if let Some(comment) = &entry.comment {
            tree.append_comment(node, comment)?;
        }
        for variation in &entry.variations {
            graft(oracle, tree, parent, variation, true)?;
        }
        parent = node;
    }
    Ok(())
}
