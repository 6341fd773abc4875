//! Maps the page section in view to the layers that should be showing.

use fnv::FnvHashMap;

use crate::layers::{LayerKind, LayerStack};

/// Identifier of a page section, as reported by the viewport observer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Known sections and the layers each one shows. A section may show any
/// subset of the section-bound layers, including none.
pub type SectionTable = &'static [(&'static str, &'static [LayerKind])];

pub const SECTION_TABLE: SectionTable = &[
    ("about", &[LayerKind::Cloud]),
    ("skills", &[LayerKind::Halftone]),
    ("experience", &[LayerKind::Wave]),
    ("education", &[LayerKind::Cloud]),
    ("projects", &[LayerKind::Halftone]),
    ("contact", &[LayerKind::Wave]),
];

/// Shown for sections missing from the table.
pub const FALLBACK_LAYERS: &[LayerKind] = &[LayerKind::Cloud];

pub struct SectionBinder {
    table: FnvHashMap<&'static str, &'static [LayerKind]>,
    current: Option<SectionId>,
}

impl Default for SectionBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionBinder {
    pub fn new() -> Self {
        Self::with_table(SECTION_TABLE)
    }

    pub fn with_table(table: SectionTable) -> Self {
        Self {
            table: table.iter().copied().collect(),
            current: None,
        }
    }

    pub fn current(&self) -> Option<&SectionId> {
        self.current.as_ref()
    }

    pub fn layers_for(&self, id: &SectionId) -> &'static [LayerKind] {
        self.table
            .get(id.as_str())
            .copied()
            .unwrap_or(FALLBACK_LAYERS)
    }

    /// Shows every section-bound layer in the set for `id` and hides the rest.
    /// Returns false when `id` is already the active section.
    pub fn apply(&mut self, id: SectionId, layers: &mut LayerStack) -> bool {
        if self.current.as_ref() == Some(&id) {
            log::debug!("[sections] '{id}' already active");
            return false;
        }
        let shown = self.layers_for(&id);
        for kind in LayerKind::SECTION_BOUND {
            layers.get_mut(kind).set_visible(shown.contains(&kind));
        }
        log::info!("[sections] '{id}' -> {shown:?}");
        self.current = Some(id);
        true
    }
}
