//! Configuration and constants for the panel.

/// Current stats payload schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Template namespace of the debug toolbar itself.
///
/// Renders under this prefix are always excluded from recording so the
/// toolbar cannot pollute its own statistics.
pub const TOOLBAR_TEMPLATE_PREFIX: &str = "debug_toolbar/";

/// Backgrounds whose 24-bit value falls below this cutoff get white text,
/// everything at or above it gets black text.
pub const TEXT_COLOR_CUTOFF: u32 = 0x8fffff;

/// Summary bucket for records that carry no template name
pub const ANONYMOUS_TEMPLATE_NAME: &str = "<anonymous>";

/// Character width of the bar area in the text timeline view
pub const TEXT_TIMELINE_WIDTH: usize = 50;

/// Maximum depth of nested `{% include %}` renders before the built-in
/// engine refuses, so a self-including template cannot overflow the stack
pub const MAX_INCLUDE_DEPTH: usize = 32;
