//! Scripted selector for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::resolver::{Selection, SelectionOption, Selector};

/// A prompt shown to the selector.
#[derive(Debug, Clone)]
pub struct RecordedPrompt {
    pub header: String,
    pub options: Vec<SelectionOption>,
}

impl RecordedPrompt {
    /// Option labels in display order.
    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }
}

/// A selector that answers every prompt with the same selection.
#[derive(Debug)]
pub struct ScriptedSelector {
    selection: Selection,
    prompts: Arc<RwLock<Vec<RecordedPrompt>>>,
}

impl ScriptedSelector {
    /// Pick the option at `index`.
    pub fn choosing(index: usize) -> Self {
        Self {
            selection: Selection::Chosen(index),
            prompts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Cancel every prompt.
    pub fn cancelling() -> Self {
        Self {
            selection: Selection::Cancelled,
            prompts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Prompts presented so far.
    pub async fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts.read().await.clone()
    }
}

#[async_trait]
impl Selector for ScriptedSelector {
    async fn present(&self, header: &str, options: &[SelectionOption]) -> Selection {
        self.prompts.write().await.push(RecordedPrompt {
            header: header.to_string(),
            options: options.to_vec(),
        });
        self.selection
    }
}
