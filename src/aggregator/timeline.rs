//! Timeline percentage math.

/// The `[t_min, t_max]` span covering every recorded render of a request;
/// the denominator for all percentage fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    t_min: f64,
    t_max: f64,
}

/// Where a span sits on the timeline, in percent of the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineSlot {
    pub offset_p: f64,
    pub duration_p: f64,
    pub rel_duration_p: f64,
}

impl Window {
    pub fn from_bounds(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    pub fn t_min(&self) -> f64 {
        self.t_min
    }

    pub fn t_max(&self) -> f64 {
        self.t_max
    }

    /// Window width in seconds; zero for a single instantaneous render
    pub fn width(&self) -> f64 {
        self.t_max - self.t_min
    }

    /// Place a span on the timeline.
    pub fn slot(&self, start: f64, end: f64) -> TimelineSlot {
        let offset_p = percent(start - self.t_min, self.width());
        let duration_p = percent(end - start, self.width());
        let rel_duration_p = percent(duration_p, 100.0 - offset_p);
        TimelineSlot {
            offset_p,
            duration_p,
            rel_duration_p,
        }
    }
}

/// `100 * part / whole`, clamped to [0, 100].
///
/// A degenerate denominator (zero-width window, or a span starting at the
/// very end of the window) is defined as 100 — "this fills the whole
/// visible range" — never a division error or NaN.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        100.0
    } else {
        ((part / whole) * 100.0).clamp(0.0, 100.0)
    }
}
