//! Record writer: headers and move text from a variation tree.

use std::fmt::Write as _;

use shakmaty::Position;

use super::headers::Headers;
use crate::tree::{NodeId, VariationTree};

const LINE_WIDTH: usize = 80;

#[derive(Clone, Copy, Debug)]
pub struct WriteOptions {
    /// Skip every side line.
    pub main_line_only: bool,
    /// Write `{...}` comments and `$n` annotations.
    pub comments: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            main_line_only: false,
            comments: true,
        }
    }
}

pub fn write_record(tree: &VariationTree, headers: &Headers, options: WriteOptions) -> String {
    let mut out = String::new();
    for (key, value) in headers.export_order() {
        let value = value.replace('\\', "\\\\").replace('"', "\\\"");
        let _ = writeln!(out, "[{} \"{}\"]", key, value);
    }
    out.push('\n');

    let mut text = MoveText::default();
    let root = tree.root_node();
    if options.comments {
        if let Some(comment) = root.comment() {
            text.comment(comment);
        }
    }
    if let Some(&first) = root.children().first() {
        write_line(tree, root.id(), first, options, &mut text);
    }
    text.push(headers.result().to_string());

    out.push_str(&text.wrap());
    out.push('\n');
    out
}

/// Position in one line of the move text being written.
struct Frame {
    parent: NodeId,
    current: NodeId,
    /// Whether a Black move here needs its `N...` number.
    numbered: bool,
    /// Next sibling of `current` to write as a variation, `None` until
    /// `current` itself has been written.
    next_sibling: Option<usize>,
}

/// Write `first` (a child of `parent`) and the main line below it, with the
/// siblings of each main-line move as nested variations. Iterative, one
/// frame per open variation.
fn write_line(
    tree: &VariationTree,
    parent: NodeId,
    first: NodeId,
    options: WriteOptions,
    text: &mut MoveText,
) {
    let mut stack = vec![Frame {
        parent,
        current: first,
        numbered: true,
        next_sibling: None,
    }];

    while let Some(frame) = stack.last_mut() {
        let (Some(parent_node), Some(node)) = (tree.get(frame.parent), tree.get(frame.current))
        else {
            return;
        };

        let Some(sibling) = frame.next_sibling else {
            let number = parent_node.position().fullmoves();
            if parent_node.position().turn().is_white() {
                text.push(format!("{}.", number));
            } else if frame.numbered {
                text.push(format!("{}...", number));
            }
            text.push(node.san().unwrap_or("--").to_string());
            frame.numbered = false;

            if options.comments {
                for nag in node.nags() {
                    text.push(format!("${}", nag));
                }
                if let Some(comment) = node.comment() {
                    text.comment(comment);
                    frame.numbered = true;
                }
            }

            let siblings = parent_node.children();
            let is_main = siblings.first() == Some(&frame.current);
            frame.next_sibling = Some(if is_main && !options.main_line_only {
                1
            } else {
                siblings.len()
            });
            continue;
        };

        if let Some(&variation) = parent_node.children().get(sibling) {
            frame.next_sibling = Some(sibling + 1);
            frame.numbered = true;
            let parent = frame.parent;
            text.open();
            stack.push(Frame {
                parent,
                current: variation,
                numbered: true,
                next_sibling: None,
            });
            continue;
        }

        match node.children().first() {
            Some(&next) => {
                frame.parent = frame.current;
                frame.current = next;
                frame.next_sibling = None;
            }
            None => {
                stack.pop();
                if !stack.is_empty() {
                    text.close();
                }
            }
        }
    }
}

/// Move text tokens, joined with spaces and wrapped on output.
#[derive(Default)]
struct MoveText {
    tokens: Vec<String>,
    open_pending: bool,
}

impl MoveText {
    fn push(&mut self, token: String) {
        if self.open_pending {
            self.open_pending = false;
            self.tokens.push(format!("({}", token));
        } else {
            self.tokens.push(token);
        }
    }

    fn comment(&mut self, comment: &str) {
        self.push(format!("{{{}}}", comment.replace('}', ")")));
    }

    fn open(&mut self) {
        self.open_pending = true;
    }

    fn close(&mut self) {
        if let Some(last) = self.tokens.last_mut() {
            last.push(')');
        }
    }

    fn wrap(&self) -> String {
        let mut out = String::new();
        let mut width = 0;
        for token in &self.tokens {
            if width > 0 && width + 1 + token.len() > LINE_WIDTH {
                out.push('\n');
                width = 0;
            } else if width > 0 {
                out.push(' ');
                width += 1;
            }
            out.push_str(token);
            width += token.len();
        }
        out
    }
}
