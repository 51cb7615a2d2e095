//! Terminal-backed file selection.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use debridlink_core::{Selection, SelectionOption, Selector};

/// Prints numbered options to stderr and reads the choice from a line of input.
pub struct PromptSelector<R> {
    input: Mutex<R>,
}

impl PromptSelector<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> PromptSelector<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

/// Map a typed line to a selection. Options are numbered from 1.
pub fn parse_choice(line: &str, options: &[SelectionOption]) -> Selection {
    let Ok(number) = line.trim().parse::<usize>() else {
        return Selection::Cancelled;
    };
    match number.checked_sub(1).and_then(|i| options.get(i).map(|o| (i, o))) {
        Some((index, option)) if !option.is_cancel => Selection::Chosen(index),
        _ => Selection::Cancelled,
    }
}

#[async_trait]
impl<R> Selector for PromptSelector<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn present(&self, header: &str, options: &[SelectionOption]) -> Selection {
        eprintln!("{}", header);
        for (index, option) in options.iter().enumerate() {
            eprintln!("  {}) {}", index + 1, option.label);
        }
        eprint!("> ");

        let mut line = String::new();
        let mut input = self.input.lock().await;
        match input.read_line(&mut line).await {
            Ok(0) | Err(_) => Selection::Cancelled,
            Ok(_) => parse_choice(&line, options),
        }
    }
}
