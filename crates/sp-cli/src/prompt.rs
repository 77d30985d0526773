//! Interactive cycle breaking on the terminal

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sp_core::{CoreError, CoreResult, CycleDecider, CycleGroup};

/// Asks which reference field to drop for each pairwise cycle.
///
/// The line editor is opened on the first cycle, so plans without
/// cycles never touch the terminal.
#[derive(Default)]
pub(crate) struct PromptDecider {
    editor: Option<DefaultEditor>,
}

impl PromptDecider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn editor(&mut self, pair: &str) -> CoreResult<&mut DefaultEditor> {
        if self.editor.is_none() {
            let editor = DefaultEditor::new().map_err(|e| aborted(pair, e.to_string()))?;
            self.editor = Some(editor);
        }
        self.editor
            .as_mut()
            .ok_or_else(|| aborted(pair, "terminal unavailable"))
    }
}

impl CycleDecider for PromptDecider {
    fn choose(&mut self, group: &CycleGroup) -> CoreResult<usize> {
        let label = group.label();
        let choices = group.choices();

        println!();
        println!("Reference cycle: {}", label);
        for (i, choice) in choices.iter().enumerate() {
            println!("  {}) {}", i + 1, choice);
        }

        let prompt = format!("Choose a field to drop [1-{}]: ", choices.len());
        let editor = self.editor(&label)?;
        loop {
            match editor.readline(&prompt) {
                Ok(line) => match parse_choice(&line, choices.len()) {
                    Some(index) => return Ok(index),
                    None => println!("Enter a number between 1 and {}", choices.len()),
                },
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                    return Err(aborted(&label, "no choice was made"));
                }
                Err(e) => return Err(aborted(&label, e.to_string())),
            }
        }
    }
}

fn aborted(pair: &str, reason: impl Into<String>) -> CoreError {
    CoreError::CycleResolutionAborted {
        pair: pair.to_string(),
        reason: reason.into(),
    }
}

/// One-based menu entry to a zero-based edge index
fn parse_choice(input: &str, available: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    (1..=available).contains(&n).then(|| n - 1)
}
