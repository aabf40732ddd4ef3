use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::scene::model::Coord;

#[test]
fn child_offset_adds_to_parent_origin() {
    let child = SceneNode::from(TextNode::new("x").at(10.0, 10.0));
    let n = normalize(&child, Point::new(50.0, 50.0));
    assert_eq!(n.origin(), Point::new(60.0, 60.0));
    assert!(matches!(n, NormalizedNode::Text(_)));
}

#[test]
fn three_levels_compose_additively() {
    let inner = ImageNode::new("a.png", 5.0, 5.0).at(3.0, 4.0);
    let middle = ContainerNode::new(50.0, 50.0).at(20.0, 30.0).child(inner);
    let outer = SceneNode::from(ContainerNode::new(100.0, 100.0).at(1.0, 2.0).child(middle));

    let NormalizedNode::Container(o) = normalize(&outer, Point::ZERO) else {
        panic!("expected container");
    };
    let NormalizedNode::Container(m) = normalize(&o.node.children[0], o.origin) else {
        panic!("expected container");
    };
    let NormalizedNode::Image(i) = normalize(&m.node.children[0], m.origin) else {
        panic!("expected image");
    };
    assert_eq!(i.origin, Point::new(24.0, 36.0));
    assert_eq!(i.rect(), Rect::new(24.0, 36.0, 29.0, 41.0));
    assert_eq!(m.rect().size(), (50.0, 50.0).into());
}

#[test]
fn deferred_coordinates_resolve_once_per_normalization() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let mut text = TextNode::new("lazy");
    text.left = Coord::deferred(move || {
        counter.set(counter.get() + 1);
        7.5
    });
    text.top = Coord::Fixed(2.0);
    let node = SceneNode::from(text);

    let n = normalize(&node, Point::new(1.0, 1.0));
    assert_eq!(n.origin(), Point::new(8.5, 3.0));
    assert_eq!(calls.get(), 1);
}
