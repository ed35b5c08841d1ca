use std::fmt::Write;

use assembly_core::abstract_editor::{Editable, UndoService};

/// Renders the undo/redo history as text, newest at the top.
///
/// Redo entries come first with the next-to-redo closest to the cursor
/// marker, then the undo entries, most recent first.
pub fn render<T: Editable>(history: &UndoService<T>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Undo: {} | Redo: {} | Limit: {}",
        history.undo_count(),
        history.redo_count(),
        history.max_undo()
    );

    let redo: Vec<&str> = history.redo_descriptions().collect();
    for desc in redo.iter().rev() {
        let _ = writeln!(out, "  REDO {desc}");
    }

    let _ = writeln!(out, "▸ current");

    for desc in history.undo_descriptions() {
        let _ = writeln!(out, "  UNDO {desc}");
    }
    out
}
