//! Typed messages between widgets, the controller and the host
//!
//! Widgets send `EditorCommand`s over an mpsc channel; the controller drains
//! the channel on its event loop and reports outcomes to the host as
//! `EditorEvent`s.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::markdown::table::TableOperation;

/// A request from a widget to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// Structural table edit on the table whose source started at `source_from`
    TableOperation {
        op: TableOperation,
        row_index: i32,
        col_index: usize,
        source_from: usize,
        source_to: usize,
    },
    /// Flip the task marker at `pos`, rendered with state `checked`
    ToggleCheckbox { pos: usize, checked: bool },
    /// Follow an in-document `#anchor`
    ScrollToAnchor { anchor_id: String },
    /// Open a URL in the system browser
    OpenExternal { url: String },
    /// Put text on the system clipboard
    CopyToClipboard { text: String },
    /// Show the construct at `pos` raw
    EnterEditMode { pos: usize },
}

/// Notifications for the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The buffer changed; carries the full new text
    Changed(String),
    /// The host should scroll to this 1-based line
    NavigateToLine(usize),
    /// A table operation was applied to the given span
    TableOperation {
        op: TableOperation,
        row_index: i32,
        col_index: usize,
        source_from: usize,
        source_to: usize,
    },
    /// An in-document anchor was followed
    ScrollToAnchor { anchor_id: String },
}

/// Both ends of the widget command channel.
#[derive(Debug)]
pub struct CommandChannel {
    sender: Sender<EditorCommand>,
    receiver: Receiver<EditorCommand>,
}

impl Default for CommandChannel {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }
}

impl CommandChannel {
    /// A sender handed to views so they can dispatch commands.
    pub fn sender(&self) -> Sender<EditorCommand> {
        self.sender.clone()
    }

    /// Take every pending command without blocking.
    pub fn drain(&self) -> Vec<EditorCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = self.receiver.try_recv() {
            commands.push(command);
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_drains_in_order() {
        let channel = CommandChannel::default();
        let sender = channel.sender();
        sender
            .send(EditorCommand::EnterEditMode { pos: 1 })
            .unwrap();
        sender
            .send(EditorCommand::OpenExternal {
                url: "https://x.org".to_string(),
            })
            .unwrap();

        let drained = channel.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], EditorCommand::EnterEditMode { pos: 1 });
        assert!(channel.drain().is_empty());
    }
}
