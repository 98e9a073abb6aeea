//! Deterministic color assignment for timeline rows.
//!
//! Backgrounds come from a contrasting sequence generator: starting from
//! black, each round adds the next-lower bit (128, 64, 32, ...) to every
//! combination of RGB channels already produced, so early colors are
//! maximally far apart. Text is black or white, picked by thresholding the
//! 24-bit background value against a fixed cutoff.

use crate::utils::config::TEXT_COLOR_CUTOFF;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::VecDeque;

/// Channel combinations, in yield order
const TRIPLES: [[u8; 3]; 7] = [
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 1, 0],
    [0, 1, 1],
    [1, 0, 1],
    [1, 1, 1],
];

/// Background/text pair attached to every timeline row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPair {
    /// Background as "#rrggbb"
    pub bg: String,

    /// Text as "#ffffff" or "#000000"
    pub text: String,
}

impl ColorPair {
    /// Pair a background with its readable text color.
    pub fn from_background(rgb: [u8; 3]) -> Self {
        let value = ((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[2] as u32;
        let text = if value < TEXT_COLOR_CUTOFF {
            "#ffffff"
        } else {
            "#000000"
        };
        Self {
            bg: format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]),
            text: text.to_string(),
        }
    }
}

/// Never-repeating contrasting background sequence.
///
/// Yields black forever once the bit rounds are exhausted; with eight
/// rounds of combinations that point is unreachable in practice.
pub struct ContrastingColors {
    bit: u16,
    so_far: Vec<[u8; 3]>,
    pending: VecDeque<[u8; 3]>,
}

impl ContrastingColors {
    pub fn new() -> Self {
        Self {
            bit: 128,
            so_far: vec![[0, 0, 0]],
            pending: VecDeque::new(),
        }
    }

    fn refill(&mut self) {
        let snapshot = self.so_far.clone();
        for triple in TRIPLES {
            for prev in &snapshot {
                let rgb = [
                    (prev[0] as u16 + triple[0] as u16 * self.bit) as u8,
                    (prev[1] as u16 + triple[1] as u16 * self.bit) as u8,
                    (prev[2] as u16 + triple[2] as u16 * self.bit) as u8,
                ];
                self.so_far.push(rgb);
                self.pending.push_back(rgb);
            }
        }
        self.bit >>= 1;
    }
}

impl Iterator for ContrastingColors {
    type Item = [u8; 3];

    fn next(&mut self) -> Option<[u8; 3]> {
        if self.pending.is_empty() {
            if self.bit == 0 {
                return Some([0, 0, 0]);
            }
            self.refill();
        }
        self.pending.pop_front()
    }
}

impl Default for ContrastingColors {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-recorder color assignment keyed by nesting level.
///
/// The same level always yields the same color for the lifetime of this
/// value; new levels consume the next color from the sequence.
pub struct LevelColors {
    generator: ContrastingColors,
    assigned: HashMap<usize, ColorPair>,
}

impl LevelColors {
    pub fn new() -> Self {
        Self {
            generator: ContrastingColors::new(),
            assigned: HashMap::new(),
        }
    }

    pub fn get(&mut self, level: usize) -> ColorPair {
        let generator = &mut self.generator;
        self.assigned
            .entry(level)
            .or_insert_with(|| {
                // The sequence is infinite, so the unwrap cannot fire
                ColorPair::from_background(generator.next().unwrap_or([0, 0, 0]))
            })
            .clone()
    }
}

impl Default for LevelColors {
    fn default() -> Self {
        Self::new()
    }
}

struct KindColors {
    generator: ContrastingColors,
    assigned: HashMap<&'static str, ColorPair>,
}

static NODE_KIND_COLORS: Lazy<Mutex<KindColors>> = Lazy::new(|| {
    Mutex::new(KindColors {
        generator: ContrastingColors::new(),
        assigned: HashMap::new(),
    })
});

/// Process-wide color for a node type tag.
///
/// Stable for the lifetime of the process; colors are cosmetic, so the
/// shared cache across requests is acceptable.
pub fn node_kind_color(kind: &'static str) -> ColorPair {
    let mut guard = NODE_KIND_COLORS.lock();
    let cache = &mut *guard;
    let generator = &mut cache.generator;
    cache
        .assigned
        .entry(kind)
        .or_insert_with(|| ColorPair::from_background(generator.next().unwrap_or([0, 0, 0])))
        .clone()
}
