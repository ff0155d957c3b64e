use std::collections::HashMap;

use crate::styles::{
    assemble, edge, galactic, glitch, liquid, scanwave, stipple,
    traits::{MotionStyle, StyleEntry},
};

/// Dispatch table of motion styles
///
/// Each entry pairs a start-state initializer with a per-frame motion
/// transform, plus the easing and compositing overrides of that style.
pub struct StyleRegistry {
    styles: HashMap<MotionStyle, StyleEntry>,
}

impl StyleRegistry {
    /// Create a new style registry with all built-in styles
    pub fn new() -> Self {
        let mut registry = Self {
            styles: HashMap::new(),
        };

        registry.register_builtin_styles();
        registry
    }

    fn register_builtin_styles(&mut self) {
        for entry in [
            assemble::entry(),
            edge::elastic(),
            galactic::entry(),
            glitch::entry(),
            liquid::entry(),
            edge::vortex(),
            scanwave::entry(),
            stipple::entry(),
        ] {
            self.register(entry);
        }
    }

    /// Register or replace the entry for `entry.style`
    pub fn register(&mut self, entry: StyleEntry) {
        self.styles.insert(entry.style, entry);
    }

    pub fn get(&self, style: MotionStyle) -> Option<&StyleEntry> {
        self.styles.get(&style)
    }

    /// Look a style up by its case-insensitive name
    pub fn get_by_name(&self, name: &str) -> Option<&StyleEntry> {
        name.parse().ok().and_then(|style| self.get(style))
    }

    /// Registered styles in declaration order
    pub fn available_styles(&self) -> Vec<MotionStyle> {
        MotionStyle::ALL
            .into_iter()
            .filter(|style| self.styles.contains_key(style))
            .collect()
    }

    pub fn has_style(&self, style: MotionStyle) -> bool {
        self.styles.contains_key(&style)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
