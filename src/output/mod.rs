//! Output of stats payloads: JSON files and a text view for the CLI.

pub mod json;
pub mod text;

// Re-export main entry points
pub use json::{read_stats, write_stats};
pub use text::render_text_timeline;
