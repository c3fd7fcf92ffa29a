/// Fixed thumbnail size catalog
///
/// Process-wide static configuration; the thumbnail stage iterates the table
/// in full, in order, for every image. Keeping it compiled-in preserves a
/// deterministic output set per image.
use serde::{Deserialize, Serialize};

/// Semantic category of a thumbnail variant, used for client-side selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailKind {
    Tiny,
    Small,
    Medium,
    Large,
    SLarge,
    XLarge,
    Square,
    Wide,
    Tall,
    Preview,
}

impl ThumbnailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::SLarge => "slarge",
            Self::XLarge => "xlarge",
            Self::Square => "square",
            Self::Wide => "wide",
            Self::Tall => "tall",
            Self::Preview => "preview",
        }
    }
}

/// One catalog entry: exact output dimensions plus identifying label
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
    pub label: &'static str,
    pub kind: ThumbnailKind,
}

pub static THUMBNAIL_SIZES: &[ThumbnailSize] = &[
    ThumbnailSize { width: 100, height: 100, label: "100x100", kind: ThumbnailKind::Tiny },
    ThumbnailSize { width: 150, height: 150, label: "150x150", kind: ThumbnailKind::Small },
    ThumbnailSize { width: 300, height: 300, label: "300x300", kind: ThumbnailKind::Medium },
    ThumbnailSize { width: 600, height: 400, label: "600x400", kind: ThumbnailKind::Large },
    ThumbnailSize { width: 400, height: 600, label: "400x600", kind: ThumbnailKind::Large },
    ThumbnailSize { width: 800, height: 600, label: "800x600", kind: ThumbnailKind::SLarge },
    ThumbnailSize { width: 600, height: 800, label: "600x800", kind: ThumbnailKind::SLarge },
    ThumbnailSize { width: 1024, height: 768, label: "1024x768", kind: ThumbnailKind::XLarge },
    ThumbnailSize { width: 768, height: 1024, label: "768x1024", kind: ThumbnailKind::XLarge },
    ThumbnailSize { width: 200, height: 200, label: "square", kind: ThumbnailKind::Square },
    ThumbnailSize { width: 400, height: 200, label: "wide", kind: ThumbnailKind::Wide },
    ThumbnailSize { width: 200, height: 400, label: "tall", kind: ThumbnailKind::Tall },
    ThumbnailSize { width: 100, height: 100, label: "preview", kind: ThumbnailKind::Preview },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_thirteen_entries() {
        assert_eq!(THUMBNAIL_SIZES.len(), 13);
    }

    #[test]
    fn labels_are_unique() {
        let labels: HashSet<&str> = THUMBNAIL_SIZES.iter().map(|s| s.label).collect();
        assert_eq!(labels.len(), THUMBNAIL_SIZES.len());
    }

    #[test]
    fn dimensions_are_positive() {
        for size in THUMBNAIL_SIZES {
            assert!(size.width > 0 && size.height > 0, "bad entry {}", size.label);
        }
    }
}
