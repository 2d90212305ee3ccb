//! Retained view tree
//!
//! A minimal retained hierarchy of rectangular views. Each node stores its
//! untransformed frame in its parent's coordinate space plus the handful of
//! visual properties the card transitions animate: corner radius, a uniform
//! scale applied about the view's center, and a hidden flag. Scroll views
//! additionally carry [`ScrollMetrics`] in a side table.
//!
//! The tree is shared between the animation scheduler, the transition
//! animators and the screens through [`SharedViewTree`]. Everything runs on
//! the UI thread, so a plain `Rc<RefCell<_>>` is enough.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, Key, SlotMap};
use smallvec::SmallVec;

use crate::error::{Result, ViewTreeError};
use crate::geometry::{Point, Rect, Size};

new_key_type! {
    pub struct ViewId;
}

impl ViewId {
    /// Convert to a raw u64 representation (useful in log fields)
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }
}

/// Shared, single-threaded handle to a view tree
pub type SharedViewTree = Rc<RefCell<ViewTree>>;

/// A property of a view that the animation runtime can interpolate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewProperty {
    /// Frame origin x (parent coordinates)
    X,
    /// Frame origin y (parent coordinates)
    Y,
    Width,
    Height,
    CornerRadius,
    /// Uniform scale about the view's center
    Scale,
    /// Vertical content offset of a scroll view
    ContentOffsetY,
}

/// Scroll state exposed by a scrollable view
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    pub content_offset: Point,
    /// The user has touched the content and may start dragging
    pub is_tracking: bool,
    /// The user is actively dragging the content
    pub is_dragging: bool,
    pub scroll_enabled: bool,
    pub shows_vertical_indicator: bool,
}

impl Default for ScrollMetrics {
    fn default() -> Self {
        Self {
            content_offset: Point::ZERO,
            is_tracking: false,
            is_dragging: false,
            scroll_enabled: true,
            shows_vertical_indicator: true,
        }
    }
}

/// A single node in the view tree
#[derive(Clone, Debug)]
pub struct ViewNode {
    /// Untransformed frame in the parent's coordinate space
    pub frame: Rect,
    pub corner_radius: f32,
    /// Uniform scale applied about the frame's center
    pub scale: f32,
    pub hidden: bool,
    /// Debug name shown in traces
    pub name: &'static str,
    parent: Option<ViewId>,
    children: SmallVec<[ViewId; 4]>,
}

impl ViewNode {
    fn new(name: &'static str, frame: Rect) -> Self {
        Self {
            frame,
            corner_radius: 0.0,
            scale: 1.0,
            hidden: false,
            name,
            parent: None,
            children: SmallVec::new(),
        }
    }

    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    pub fn children(&self) -> &[ViewId] {
        &self.children
    }
}

/// The retained view hierarchy
///
/// The root view covers the screen and never moves. Views created with
/// [`ViewTree::create_view`] start detached and are attached with
/// [`ViewTree::add_subview`].
pub struct ViewTree {
    nodes: SlotMap<ViewId, ViewNode>,
    scroll: FxHashMap<ViewId, ScrollMetrics>,
    root: ViewId,
}

impl ViewTree {
    /// Create a tree whose root view covers a screen of the given size
    pub fn new(screen: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ViewNode::new("window", screen.to_rect()));
        Self {
            nodes,
            scroll: FxHashMap::default(),
            root,
        }
    }

    /// Create a tree already wrapped in a shared handle
    pub fn shared(screen: Size) -> SharedViewTree {
        Rc::new(RefCell::new(Self::new(screen)))
    }

    pub fn root(&self) -> ViewId {
        self.root
    }

    pub fn screen_bounds(&self) -> Rect {
        self.nodes[self.root].frame.bounds()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Create a detached view
    pub fn create_view(&mut self, name: &'static str, frame: Rect) -> ViewId {
        self.nodes.insert(ViewNode::new(name, frame))
    }

    /// Create a detached scroll view with default metrics
    pub fn create_scroll_view(&mut self, name: &'static str, frame: Rect) -> ViewId {
        let id = self.create_view(name, frame);
        self.scroll.insert(id, ScrollMetrics::default());
        id
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.nodes.contains_key(view)
    }

    pub fn node(&self, view: ViewId) -> Result<&ViewNode> {
        self.nodes.get(view).ok_or(ViewTreeError::UnknownView(view))
    }

    fn node_mut(&mut self, view: ViewId) -> Result<&mut ViewNode> {
        self.nodes
            .get_mut(view)
            .ok_or(ViewTreeError::UnknownView(view))
    }

    pub fn parent(&self, view: ViewId) -> Option<ViewId> {
        self.nodes.get(view).and_then(|n| n.parent)
    }

    pub fn children(&self, view: ViewId) -> &[ViewId] {
        self.nodes
            .get(view)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// True if `ancestor` is `view` or one of its ancestors
    pub fn is_ancestor(&self, ancestor: ViewId, view: ViewId) -> bool {
        let mut current = Some(view);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// True if the view is reachable from the root
    pub fn is_attached(&self, view: ViewId) -> bool {
        self.contains(view) && self.is_ancestor(self.root, view)
    }

    /// Add `child` as the topmost subview of `parent`, detaching it from its
    /// current parent first
    pub fn add_subview(&mut self, parent: ViewId, child: ViewId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root || self.is_ancestor(child, parent) {
            return Err(ViewTreeError::Cycle { parent, child });
        }
        self.detach(child);
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach a view (and its subtree) from its parent. The nodes stay alive.
    pub fn remove_from_parent(&mut self, view: ViewId) -> Result<()> {
        if view == self.root {
            return Err(ViewTreeError::RootImmutable);
        }
        self.node(view)?;
        self.detach(view);
        Ok(())
    }

    fn detach(&mut self, view: ViewId) {
        let Some(parent) = self.nodes.get_mut(view).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != view);
        }
    }

    /// Detach a view and free it along with all of its descendants
    pub fn destroy_view(&mut self, view: ViewId) -> Result<()> {
        self.remove_from_parent(view)?;
        let mut stack = vec![view];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                stack.extend(node.children);
            }
            self.scroll.remove(&id);
        }
        tracing::trace!(view = view.to_raw(), "view destroyed");
        Ok(())
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn frame(&self, view: ViewId) -> Result<Rect> {
        Ok(self.node(view)?.frame)
    }

    pub fn set_frame(&mut self, view: ViewId, frame: Rect) -> Result<()> {
        self.node_mut(view)?.frame = frame;
        Ok(())
    }

    pub fn corner_radius(&self, view: ViewId) -> Result<f32> {
        Ok(self.node(view)?.corner_radius)
    }

    pub fn set_corner_radius(&mut self, view: ViewId, radius: f32) -> Result<()> {
        self.node_mut(view)?.corner_radius = radius;
        Ok(())
    }

    pub fn scale(&self, view: ViewId) -> Result<f32> {
        Ok(self.node(view)?.scale)
    }

    pub fn set_scale(&mut self, view: ViewId, scale: f32) -> Result<()> {
        self.node_mut(view)?.scale = scale;
        Ok(())
    }

    pub fn is_hidden(&self, view: ViewId) -> Result<bool> {
        Ok(self.node(view)?.hidden)
    }

    pub fn set_hidden(&mut self, view: ViewId, hidden: bool) -> Result<()> {
        self.node_mut(view)?.hidden = hidden;
        Ok(())
    }

    /// Read an animatable property
    pub fn property(&self, view: ViewId, property: ViewProperty) -> Result<f32> {
        let node = self.node(view)?;
        Ok(match property {
            ViewProperty::X => node.frame.origin.x,
            ViewProperty::Y => node.frame.origin.y,
            ViewProperty::Width => node.frame.size.width,
            ViewProperty::Height => node.frame.size.height,
            ViewProperty::CornerRadius => node.corner_radius,
            ViewProperty::Scale => node.scale,
            ViewProperty::ContentOffsetY => self.scroll_metrics(view)?.content_offset.y,
        })
    }

    /// Write an animatable property
    pub fn set_property(&mut self, view: ViewId, property: ViewProperty, value: f32) -> Result<()> {
        if property == ViewProperty::ContentOffsetY {
            self.scroll_metrics_mut(view)?.content_offset.y = value;
            return Ok(());
        }
        let node = self.node_mut(view)?;
        match property {
            ViewProperty::X => node.frame.origin.x = value,
            ViewProperty::Y => node.frame.origin.y = value,
            ViewProperty::Width => node.frame.size.width = value,
            ViewProperty::Height => node.frame.size.height = value,
            ViewProperty::CornerRadius => node.corner_radius = value,
            ViewProperty::Scale => node.scale = value,
            ViewProperty::ContentOffsetY => unreachable!(),
        }
        Ok(())
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    pub fn scroll_metrics(&self, view: ViewId) -> Result<&ScrollMetrics> {
        self.node(view)?;
        self.scroll
            .get(&view)
            .ok_or(ViewTreeError::NotScrollable(view))
    }

    pub fn scroll_metrics_mut(&mut self, view: ViewId) -> Result<&mut ScrollMetrics> {
        self.node(view)?;
        self.scroll
            .get_mut(&view)
            .ok_or(ViewTreeError::NotScrollable(view))
    }

    // =========================================================================
    // Coordinate conversion
    // =========================================================================

    /// Map a point from `view`'s local (bounds) space into screen space,
    /// applying every ancestor's scale
    pub fn convert_point_to_screen(&self, view: ViewId, point: Point) -> Result<Point> {
        let mut p = point;
        let mut current = Some(view);
        while let Some(id) = current {
            let node = self.node(id)?;
            let center = node.frame.center();
            let half_w = node.frame.size.width / 2.0;
            let half_h = node.frame.size.height / 2.0;
            p = Point::new(
                center.x + node.scale * (p.x - half_w),
                center.y + node.scale * (p.y - half_h),
            );
            current = node.parent;
        }
        Ok(p)
    }

    /// Map a rect expressed in `view`'s local space into screen space
    pub fn convert_rect_to_screen(&self, view: ViewId, rect: Rect) -> Result<Rect> {
        let a = self.convert_point_to_screen(view, rect.origin)?;
        let b = self.convert_point_to_screen(view, Point::new(rect.max_x(), rect.max_y()))?;
        Ok(Rect::from_points(a, b))
    }

    /// The view's frame as it currently appears on screen, including its own
    /// scale and the scales of its ancestors
    pub fn presentation_frame_on_screen(&self, view: ViewId) -> Result<Rect> {
        let node = self.node(view)?;
        let visual = node.frame.scaled_about_center(node.scale);
        match node.parent {
            Some(parent) => self.convert_rect_to_screen(parent, visual),
            None => Ok(visual),
        }
    }

    /// The view's frame on screen ignoring its own scale
    pub fn untransformed_frame_on_screen(&self, view: ViewId) -> Result<Rect> {
        let node = self.node(view)?;
        let frame = Rect::from_center(node.frame.center(), node.frame.size);
        match node.parent {
            Some(parent) => self.convert_rect_to_screen(parent, frame),
            None => Ok(frame),
        }
    }
}
