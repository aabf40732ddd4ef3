use super::*;

const BOX: Rect = Rect::new(10.0, 20.0, 110.0, 120.0);

#[test]
fn fill_and_matching_aspect_keep_the_box() {
    assert_eq!(place_image(300.0, 100.0, BOX, ObjectFit::Fill), BOX);
    assert_eq!(place_image(50.0, 50.0, BOX, ObjectFit::Contain), BOX);
    assert_eq!(place_image(50.0, 50.0, BOX, ObjectFit::Cover), BOX);
}

#[test]
fn contain_wide_image_centers_vertically() {
    let r = place_image(200.0, 100.0, BOX, ObjectFit::Contain);
    assert_eq!(r.width(), 100.0);
    assert_eq!(r.height(), 50.0);
    assert_eq!(r.y0 + r.height() / 2.0, BOX.y0 + BOX.height() / 2.0);
    assert_eq!(r.x0, BOX.x0);
}

#[test]
fn cover_wide_image_centers_horizontally() {
    let r = place_image(200.0, 100.0, BOX, ObjectFit::Cover);
    assert_eq!(r.height(), 100.0);
    assert_eq!(r.width(), 200.0);
    assert_eq!(r.x0, BOX.x0 - 50.0);
    assert_eq!(r.x0 + r.width() / 2.0, BOX.x0 + BOX.width() / 2.0);
    assert_eq!(r.y0, BOX.y0);
}

#[test]
fn tall_images_mirror_the_logic() {
    let contain = place_image(50.0, 200.0, BOX, ObjectFit::Contain);
    assert_eq!((contain.width(), contain.height()), (25.0, 100.0));
    assert_eq!(contain.x0, 10.0 + 37.5);

    let cover = place_image(50.0, 200.0, BOX, ObjectFit::Cover);
    assert_eq!((cover.width(), cover.height()), (100.0, 400.0));
    assert_eq!(cover.y0, 20.0 - 150.0);
}

#[test]
fn degenerate_sizes_fall_back_to_the_box() {
    assert_eq!(place_image(0.0, 10.0, BOX, ObjectFit::Cover), BOX);
    let empty = Rect::new(0.0, 0.0, 0.0, 10.0);
    assert_eq!(place_image(10.0, 10.0, empty, ObjectFit::Contain), empty);
}
