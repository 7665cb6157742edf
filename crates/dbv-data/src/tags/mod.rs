//! Tag color registry
//!
//! Every distinct tag gets one palette color the first time it is seen and
//! keeps it from then on. Which color is drawn is up to the injected
//! [`ColorSource`].

mod sources;

pub use sources::{FixedColorSource, HashedColorSource, RandomColorSource, SeededColorSource};

use dbv_core::{ColorSource, TagColor};
use indexmap::IndexMap;
use tracing::debug;

/// Result of a color lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagLookup {
    pub color: TagColor,

    /// Whether this lookup made a new assignment
    pub assigned: bool,
}

/// Remembered tag to color assignments
#[derive(Debug, Clone, PartialEq)]
pub struct TagColorRegistry {
    colors: IndexMap<String, TagColor>,
    palette: Vec<TagColor>,
}

impl Default for TagColorRegistry {
    fn default() -> Self {
        Self::new(&TagColor::PALETTE)
    }
}

impl TagColorRegistry {
    /// Empty registry drawing from `palette`; an empty palette means the reference one
    pub fn new(palette: &[TagColor]) -> Self {
        let palette = if palette.is_empty() {
            TagColor::PALETTE.to_vec()
        } else {
            palette.to_vec()
        };
        Self {
            colors: IndexMap::new(),
            palette,
        }
    }

    /// Registry seeded with stored assignments
    pub fn from_map(colors: IndexMap<String, TagColor>, palette: &[TagColor]) -> Self {
        Self {
            colors,
            ..Self::new(palette)
        }
    }

    /// Color of `tag`, assigning one on first sight.
    ///
    /// The tag is trimmed before lookup. Repeated calls with the same tag
    /// return the same color and make no further assignment.
    pub fn color_for(&mut self, tag: &str, source: &mut dyn ColorSource) -> TagLookup {
        let tag = tag.trim();
        if let Some(&color) = self.colors.get(tag) {
            return TagLookup {
                color,
                assigned: false,
            };
        }

        let index = source.pick(tag, self.palette.len()) % self.palette.len();
        let color = self.palette[index];
        debug!("Assigned color {} to tag {:?}", color, tag);
        self.colors.insert(tag.to_string(), color);
        TagLookup {
            color,
            assigned: true,
        }
    }

    /// Stored color of `tag`, without assigning
    pub fn get(&self, tag: &str) -> Option<TagColor> {
        self.colors.get(tag.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn palette(&self) -> &[TagColor] {
        &self.palette
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TagColor)> {
        self.colors.iter().map(|(tag, color)| (tag.as_str(), *color))
    }

    /// Assignments in first-seen order, as persisted
    pub fn as_map(&self) -> &IndexMap<String, TagColor> {
        &self.colors
    }
}
