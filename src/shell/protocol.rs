use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use shakmaty::{Color, Position};
use tracing::warn;

use crate::engine::{Engine, ImportMode, MoveOutcome};
use crate::error::Error;
use crate::puzzle::{PuzzleSet, PuzzleVerdict};
use crate::tree::{NodeId, NodeMark};

/// Whether the command loop keeps reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    pub engine: Engine,
    puzzles: PuzzleSet,
}

impl Shell {
    pub fn new(engine: Engine) -> Self {
        Shell {
            engine,
            puzzles: PuzzleSet::default(),
        }
    }

    pub fn with_puzzles(mut self, puzzles: PuzzleSet) -> Self {
        self.puzzles = puzzles;
        self
    }

    pub fn puzzles(&self) -> &PuzzleSet {
        &self.puzzles
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let flow = self.execute(line, out)?;
            out.flush()?;
            if flow == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Run one command line. Engine errors are reported on `out` and do not
    /// stop the loop.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&first) = parts.first() else {
            return Ok(Flow::Continue);
        };
        let rest = line[first.len()..].trim();

        let result = match first {
            "quit" | "exit" => return Ok(Flow::Quit),
            "new" => self.cmd_new(rest, out),
            "move" | "m" => self.cmd_move(rest, out),
            "undo" | "back" => self
                .engine
                .undo()
                .map_err(Into::into)
                .and_then(|id| self.report_node(id, out)),
            "redo" | "fwd" => self.cmd_redo(&parts, out),
            "jump" => self.cmd_jump(rest, out),
            "promote" => self.cmd_promote(rest, out),
            "comment" => self.cmd_comment(rest),
            "nag" => self.cmd_nag(rest),
            "import" => self.cmd_import(rest, ImportMode::Replace, out),
            "merge" => self.cmd_import(rest, ImportMode::Merge, out),
            "export" => write!(out, "{}", self.engine.export_record()).map_err(Into::into),
            "puzzles" => self.cmd_puzzles(rest, out),
            "puzzle" => self.cmd_puzzle(rest, out),
            "retry" => self
                .engine
                .reset_to_last_correct()
                .map_err(Into::into)
                .and_then(|id| self.report_node(id, out)),
            "hint" => self.cmd_hint(out),
            "options" => self.cmd_options(out),
            "setoption" => self.cmd_setoption(&parts),
            "d" | "display" => self.cmd_display(out),
            "moves" => writeln!(out, "{}", self.engine.legal_moves().join(" ")).map_err(Into::into),
            "status" => self.cmd_status(out),
            "tree" => self.cmd_tree(out),
            _ => self.cmd_move(line, out),
        };

        match result {
            Ok(()) => {}
            Err(CommandError::Engine(err)) => {
                warn!(command = first, error = %err, "command failed");
                writeln!(out, "error: {}", err)?;
            }
            Err(CommandError::Io(err)) => return Err(err),
        }
        Ok(Flow::Continue)
    }

    fn cmd_new<W: Write>(&mut self, fen: &str, out: &mut W) -> CommandResult {
        let fen = if fen.is_empty() || fen == "startpos" { None } else { Some(fen) };
        self.engine.reset(fen)?;
        self.report_node(self.engine.cursor(), out)
    }

    fn cmd_move<W: Write>(&mut self, text: &str, out: &mut W) -> CommandResult {
        let outcome = self.engine.submit_move(text)?;
        self.report_move(&outcome, out)
    }

    fn cmd_redo<W: Write>(&mut self, parts: &[&str], out: &mut W) -> CommandResult {
        let index = match parts.get(1) {
            Some(s) => Some(s.parse().map_err(|_| invalid_argument("redo", s))?),
            None => None,
        };
        let id = self.engine.advance(index)?;
        self.report_node(id, out)
    }

    fn cmd_jump<W: Write>(&mut self, arg: &str, out: &mut W) -> CommandResult {
        let id: NodeId = arg.parse().map_err(|_| invalid_argument("jump", arg))?;
        let id = self.engine.jump_to(id)?;
        self.report_node(id, out)
    }

    fn cmd_promote<W: Write>(&mut self, arg: &str, out: &mut W) -> CommandResult {
        let id = if arg.is_empty() {
            self.engine.cursor()
        } else {
            arg.parse().map_err(|_| invalid_argument("promote", arg))?
        };
        self.engine.promote_line(id)?;
        writeln!(out, "promoted {}", id)?;
        Ok(())
    }

    fn cmd_comment(&mut self, text: &str) -> CommandResult {
        let comment = if text.is_empty() { None } else { Some(text.to_string()) };
        self.engine.set_comment(comment)?;
        Ok(())
    }

    fn cmd_nag(&mut self, arg: &str) -> CommandResult {
        let nag = arg
            .trim_start_matches('$')
            .parse()
            .map_err(|_| invalid_argument("nag", arg))?;
        self.engine.add_nag(nag)?;
        Ok(())
    }

    fn cmd_import<W: Write>(&mut self, path: &str, mode: ImportMode, out: &mut W) -> CommandResult {
        let text = fs::read_to_string(Path::new(path))
            .map_err(|err| Error::io(format!("read {}", path), err))?;
        self.engine.import_record_with(&text, mode)?;
        writeln!(out, "imported {} nodes", self.engine.tree().len())?;
        Ok(())
    }

    fn cmd_puzzles<W: Write>(&mut self, path: &str, out: &mut W) -> CommandResult {
        if !path.is_empty() {
            self.puzzles = PuzzleSet::load(Path::new(path))?;
        }
        for puzzle in self.puzzles.iter() {
            let title = puzzle.title.as_deref().unwrap_or("");
            match puzzle.rating {
                Some(rating) => writeln!(out, "{} ({}) {}", puzzle.id, rating, title)?,
                None => writeln!(out, "{} {}", puzzle.id, title)?,
            }
        }
        Ok(())
    }

    fn cmd_puzzle<W: Write>(&mut self, arg: &str, out: &mut W) -> CommandResult {
        let puzzle = match arg {
            "" | "random" => self.puzzles.pick_random(),
            "off" => {
                self.engine.clear_puzzle();
                return Ok(());
            }
            id => self.puzzles.get(id),
        }
        .cloned()
        .ok_or_else(|| Error::UnknownPuzzle(arg.to_string()))?;

        let id = puzzle.id.clone();
        self.engine.load_puzzle(puzzle)?;
        let color = match self.engine.puzzle().map(|p| p.player()) {
            Some(Color::Black) => "black",
            _ => "white",
        };
        writeln!(out, "puzzle {} ({} to play)", id, color)?;
        self.report_node(self.engine.cursor(), out)
    }

    fn cmd_hint<W: Write>(&mut self, out: &mut W) -> CommandResult {
        match self.engine.puzzle_hint()? {
            Some(san) => writeln!(out, "hint {}", san)?,
            None => writeln!(out, "hint none")?,
        }
        Ok(())
    }

    fn cmd_options<W: Write>(&self, out: &mut W) -> CommandResult {
        for line in self.engine.config().describe() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    /// `setoption name <words> [value <words>]`
    fn cmd_setoption(&mut self, parts: &[&str]) -> CommandResult {
        let mut name = String::new();
        let mut value = String::new();
        let mut in_name = false;
        let mut in_value = false;

        for part in parts.iter().skip(1) {
            match *part {
                "name" => { in_name = true; in_value = false; }
                "value" => { in_name = false; in_value = true; }
                _ => {
                    let target = if in_name {
                        &mut name
                    } else if in_value {
                        &mut value
                    } else {
                        continue;
                    };
                    if !target.is_empty() {
                        target.push(' ');
                    }
                    target.push_str(part);
                }
            }
        }

        self.engine.config_mut().apply_option(&name, Some(&value))?;
        Ok(())
    }

    fn cmd_display<W: Write>(&self, out: &mut W) -> CommandResult {
        let node = self.engine.current();
        writeln!(out, "\n{:?}", node.position().board())?;
        writeln!(out, "fen {}", node.fen())?;
        writeln!(out, "node {} ply {}", node.id(), node.ply())?;
        if let Some(comment) = node.comment() {
            writeln!(out, "comment {}", comment)?;
        }
        Ok(())
    }

    fn cmd_status<W: Write>(&self, out: &mut W) -> CommandResult {
        writeln!(out, "status {:?}", self.engine.status())?;
        if let Some(progress) = self.engine.puzzle_progress() {
            writeln!(
                out,
                "puzzle {:?} mistakes {} hints {}",
                progress.state, progress.mistakes, progress.hints
            )?;
        }
        Ok(())
    }

    /// Indented listing of every node; `*` marks the cursor.
    fn cmd_tree<W: Write>(&self, out: &mut W) -> CommandResult {
        let tree = self.engine.tree();
        let mut stack = vec![(tree.root(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = tree.node(id)?;
            let label = match node.parent().and_then(|p| tree.get(p)) {
                Some(parent) => node.label(parent),
                None => "start".to_string(),
            };
            let marker = if id == tree.cursor() { "*" } else { " " };
            let mark = match node.mark() {
                Some(NodeMark::Solution) => " +",
                Some(NodeMark::Deviation) => " x",
                None => "",
            };
            writeln!(
                out,
                "{}{:indent$}[{}] {}{}",
                marker,
                "",
                id,
                label,
                mark,
                indent = depth * 2
            )?;
            for &child in node.children().iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        Ok(())
    }

    fn report_move<W: Write>(&self, outcome: &MoveOutcome, out: &mut W) -> CommandResult {
        self.report_node(outcome.node, out)?;
        if let Some(verdict) = outcome.verdict {
            let text = match verdict {
                PuzzleVerdict::Correct { alternate: false } => "correct",
                PuzzleVerdict::Correct { alternate: true } => "correct (alternate line)",
                PuzzleVerdict::Solved { alternate: false } => "solved",
                PuzzleVerdict::Solved { alternate: true } => "solved (alternate line)",
                PuzzleVerdict::Incorrect => "incorrect",
            };
            writeln!(out, "{}", text)?;
        }
        if let Some(reply) = outcome.reply {
            write!(out, "reply ")?;
            self.report_node(reply, out)?;
        }
        Ok(())
    }

    fn report_node<W: Write>(&self, id: NodeId, out: &mut W) -> CommandResult {
        let tree = self.engine.tree();
        let node = tree.node(id)?;
        match node.parent().and_then(|p| tree.get(p)) {
            Some(parent) => writeln!(out, "node {} {}", id, node.label(parent))?,
            None => writeln!(out, "node {} start", id)?,
        }
        Ok(())
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(Engine::new())
    }
}

/// Failures of a single command: engine errors are shown to the user, I/O
/// errors on the output stop the loop.
enum CommandError {
    Engine(Error),
    Io(io::Error),
}

impl From<Error> for CommandError {
    fn from(err: Error) -> Self {
        CommandError::Engine(err)
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        CommandError::Io(err)
    }
}

type CommandResult = std::result::Result<(), CommandError>;

fn invalid_argument(command: &str, value: &str) -> Error {
    Error::InvalidOption {
        name: command.to_string(),
        value: value.to_string(),
    }
}
