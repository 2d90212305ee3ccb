//! Card content and the geometry captured when a card is tapped

use folio_core::{Rect, ViewId, ViewTree};

use crate::config::TransitionConfig;
use crate::error::Result;

/// The content model shown on a card and its detail screen
#[derive(Clone, Debug, PartialEq)]
pub struct CardContent {
    pub primary: String,
    pub secondary: String,
    pub description: String,
    /// Rendered at the highlighted (pressed) scale
    pub highlighted: bool,
}

impl CardContent {
    pub fn new(
        primary: impl Into<String>,
        secondary: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            description: description.into(),
            highlighted: false,
        }
    }

    /// The same content prepared for the highlighted card
    pub fn highlighted(&self) -> Self {
        Self {
            highlighted: true,
            ..self.clone()
        }
    }
}

/// A tap on a card in the list
#[derive(Clone, Debug, PartialEq)]
pub struct TapInfo {
    pub cell: ViewId,
    pub content: CardContent,
}

/// Geometry and content a card transition starts from
///
/// Captured once when the card is tapped and never re-read, so layout
/// passes during the transition cannot change where the card returns to.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionParams {
    /// The cell's frame on screen as displayed, including its live scale
    pub from_card_frame: Rect,
    /// The cell's frame on screen ignoring its own scale
    pub from_card_frame_without_transform: Rect,
    pub from_cell: ViewId,
    pub content: CardContent,
}

impl TransitionParams {
    /// Snapshot a cell's on-screen geometry
    pub fn capture(tree: &ViewTree, cell: ViewId, content: CardContent) -> Result<Self> {
        let from_card_frame = tree.presentation_frame_on_screen(cell)?;
        let from_card_frame_without_transform = tree.untransformed_frame_on_screen(cell)?;
        tracing::debug!(
            cell = cell.to_raw(),
            ?from_card_frame,
            ?from_card_frame_without_transform,
            "captured card geometry"
        );
        Ok(Self {
            from_card_frame,
            from_card_frame_without_transform,
            from_cell: cell,
            content,
        })
    }
}

/// Shrink a pressed card to the highlighted factor, or restore it
pub fn set_card_highlighted(
    tree: &mut ViewTree,
    cell: ViewId,
    highlighted: bool,
    config: &TransitionConfig,
) -> Result<()> {
    let scale = if highlighted {
        config.card_highlighted_factor
    } else {
        1.0
    };
    tree.set_scale(cell, scale)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Size;

    #[test]
    fn test_capture_highlighted_cell() {
        let mut tree = ViewTree::new(Size::new(375.0, 812.0));
        let root = tree.root();
        let list = tree.create_scroll_view("list", Rect::new(0.0, 0.0, 375.0, 812.0));
        let cell = tree.create_view("cell", Rect::new(20.0, 300.0, 335.0, 402.0));
        tree.add_subview(root, list).unwrap();
        tree.add_subview(list, cell).unwrap();
        set_card_highlighted(&mut tree, cell, true, &TransitionConfig::standard()).unwrap();

        let params = TransitionParams::capture(&tree, cell, CardContent::new("a", "b", "c")).unwrap();
        assert!(params
            .from_card_frame_without_transform
            .approx_eq(&Rect::new(20.0, 300.0, 335.0, 402.0), 1e-3));
        assert!((params.from_card_frame.width() - 335.0 * 0.96).abs() < 1e-3);
        let visual = params.from_card_frame.center();
        let untransformed = params.from_card_frame_without_transform.center();
        assert!((visual.x - untransformed.x).abs() < 1e-3);
        assert!((visual.y - untransformed.y).abs() < 1e-3);
    }

    #[test]
    fn test_unhighlight_restores_scale() {
        let mut tree = ViewTree::new(Size::new(375.0, 812.0));
        let cell = tree.create_view("cell", Rect::new(0.0, 0.0, 100.0, 100.0));
        let config = TransitionConfig::standard();
        set_card_highlighted(&mut tree, cell, true, &config).unwrap();
        assert_eq!(tree.scale(cell).unwrap(), 0.96);
        set_card_highlighted(&mut tree, cell, false, &config).unwrap();
        assert_eq!(tree.scale(cell).unwrap(), 1.0);
    }

    #[test]
    fn test_highlighted_content_keeps_text() {
        let content = CardContent::new("GAME OF THE DAY", "Minecraft", "The ocean is big.");
        let highlighted = content.highlighted();
        assert!(highlighted.highlighted);
        assert!(!content.highlighted);
        assert_eq!(highlighted.primary, content.primary);
    }
}
