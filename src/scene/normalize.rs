use crate::foundation::core::{Point, Rect};
use crate::scene::model::{ContainerNode, ImageNode, SceneNode, TextNode};

/// A node together with its resolved absolute top-left corner.
#[derive(Debug)]
pub struct Placed<'a, T> {
    /// The source node.
    pub node: &'a T,
    /// Absolute position in the root's coordinate space.
    pub origin: Point,
}

impl<T> Clone for Placed<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Placed<'_, T> {}

impl<T> Placed<'_, T> {
    /// Absolute left edge.
    pub fn left(&self) -> f64 {
        self.origin.x
    }

    /// Absolute top edge.
    pub fn top(&self) -> f64 {
        self.origin.y
    }
}

impl Placed<'_, ContainerNode> {
    /// Absolute box of the container.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, (self.node.width, self.node.height))
    }
}

impl Placed<'_, ImageNode> {
    /// Absolute box of the image.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, (self.node.width, self.node.height))
    }
}

/// A [`SceneNode`] with absolute, fully resolved coordinates.
#[derive(Clone, Copy, Debug)]
pub enum NormalizedNode<'a> {
    /// Normalized container.
    Container(Placed<'a, ContainerNode>),
    /// Normalized image.
    Image(Placed<'a, ImageNode>),
    /// Normalized text.
    Text(Placed<'a, TextNode>),
}

impl NormalizedNode<'_> {
    /// Absolute top-left corner.
    pub fn origin(&self) -> Point {
        match self {
            Self::Container(p) => p.origin,
            Self::Image(p) => p.origin,
            Self::Text(p) => p.origin,
        }
    }
}

/// Resolve `node`'s position against its parent's absolute offset.
///
/// Deferred coordinates are evaluated here, once per call. Sizes are left untouched and
/// children are not visited; they are normalized against this node's origin when drawn.
pub fn normalize(node: &SceneNode, parent: Point) -> NormalizedNode<'_> {
    let (left, top) = node.position();
    let origin = Point::new(parent.x + left.resolve(), parent.y + top.resolve());
    match node {
        SceneNode::Container(node) => NormalizedNode::Container(Placed { node, origin }),
        SceneNode::Image(node) => NormalizedNode::Image(Placed { node, origin }),
        SceneNode::Text(node) => NormalizedNode::Text(Placed { node, origin }),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/normalize.rs"]
mod tests;
