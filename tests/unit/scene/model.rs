use std::cell::Cell;

use serde_json::json;

use super::*;

#[test]
fn parses_tagged_node_tree() {
    let node: SceneNode = serde_json::from_value(json!({
        "type": "container",
        "left": 10,
        "top": 20,
        "width": 100,
        "height": 50,
        "backgroundColor": "#ff0000",
        "borderRadius": [4, 8],
        "overflow": "hidden",
        "children": [
            { "type": "image", "src": "a.png", "width": 10, "height": 10, "objectFit": "cover" },
            { "type": "text", "content": "hi", "textDecoration": "line-through", "fontWeight": "bold" }
        ]
    }))
    .unwrap();

    let SceneNode::Container(c) = node else {
        panic!("expected container");
    };
    assert_eq!(c.left.resolve(), 10.0);
    assert_eq!(c.background_color, Some(Color::rgba(255, 0, 0, 255)));
    assert_eq!(c.border_radius, Some(Radius::Corners(vec![4.0, 8.0])));
    assert_eq!(c.overflow, Overflow::Hidden);
    assert_eq!(c.children.len(), 2);

    let SceneNode::Image(img) = &c.children[0] else {
        panic!("expected image");
    };
    assert_eq!(img.object_fit, ObjectFit::Cover);
    assert_eq!(img.left.resolve(), 0.0);

    let SceneNode::Text(t) = &c.children[1] else {
        panic!("expected text");
    };
    assert_eq!(t.text_decoration, TextDecoration::LineThrough);
    assert_eq!(t.font_weight, FontWeight::BOLD);
    assert_eq!(t.width, None);
    assert_eq!(t.text_align, TextAlign::Left);
}

#[test]
fn rejects_unknown_type_and_bad_radius() {
    assert!(serde_json::from_value::<SceneNode>(json!({"type": "video"})).is_err());
    assert!(
        serde_json::from_value::<Radius>(json!([1, 2, 3, 4, 5])).is_err()
    );
    assert!(serde_json::from_value::<Radius>(json!([])).is_err());
    assert_eq!(
        serde_json::from_value::<Radius>(json!(6)).unwrap(),
        Radius::Uniform(6.0)
    );
}

#[test]
fn font_weight_accepts_numbers_and_keywords() {
    let w: FontWeight = serde_json::from_value(json!(500)).unwrap();
    assert_eq!(w, FontWeight(500));
    let w: FontWeight = serde_json::from_value(json!("600")).unwrap();
    assert_eq!(w, FontWeight(600));
    let w: FontWeight = serde_json::from_value(json!("normal")).unwrap();
    assert_eq!(w, FontWeight::NORMAL);
    assert!(serde_json::from_value::<FontWeight>(json!("heavy-ish")).is_err());
    assert!(serde_json::from_value::<FontWeight>(json!(0)).is_err());
}

#[test]
fn deferred_coord_runs_on_resolve() {
    let calls = std::rc::Rc::new(Cell::new(0));
    let counter = calls.clone();
    let c = Coord::deferred(move || {
        counter.set(counter.get() + 1);
        42.0
    });
    assert_eq!(calls.get(), 0);
    assert_eq!(c.resolve(), 42.0);
    assert_eq!(calls.get(), 1);
    assert_eq!(format!("{c:?}"), "Deferred(..)");
}

#[test]
fn builders_set_position_and_children() {
    let c = ContainerNode::new(200.0, 100.0)
        .at(5.0, 6.0)
        .child(TextNode::new("a"))
        .child(ImageNode::new("b.png", 10.0, 10.0).at(1.0, 2.0));
    assert_eq!(c.children.len(), 2);
    let (l, t) = c.children[1].position();
    assert_eq!((l.resolve(), t.resolve()), (1.0, 2.0));
    assert_eq!((c.left.resolve(), c.top.resolve()), (5.0, 6.0));
}
