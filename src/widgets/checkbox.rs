//! Task list checkbox

use crate::editor::EditorCommand;

/// Checkbox for a `[ ]` / `[x]` task marker starting at `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckboxWidget {
    pub checked: bool,
    pub pos: usize,
}

impl CheckboxWidget {
    pub fn toggle_command(&self) -> EditorCommand {
        EditorCommand::ToggleCheckbox {
            pos: self.pos,
            checked: self.checked,
        }
    }
}

/// Replacement for the 3-byte marker at `pos`, if the text there still
/// matches the state the checkbox was rendered with.
pub fn toggle_replacement(text: &str, pos: usize, checked: bool) -> Option<&'static str> {
    let current = text.as_bytes().get(pos..pos + 3)?;
    match (checked, current) {
        (false, b"[ ]") => Some("[x]"),
        (true, b"[x]") | (true, b"[X]") => Some("[ ]"),
        _ => None,
    }
}
