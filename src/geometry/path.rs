use std::f64::consts::{FRAC_PI_2, PI};

use crate::foundation::core::{BezPath, Point, Rect, Vec2};

/// Flattening tolerance for corner arcs, in logical pixels.
const ARC_TOLERANCE: f64 = 0.01;

/// Closed path around `rect` with per-corner radii `[top_left, top_right, bottom_right,
/// bottom_left]`.
///
/// Radii are expected to be normalized already. The path starts after the top-left corner and
/// runs clockwise: top edge, top-right arc, right edge, and so on. All-zero radii produce a
/// plain rectangle.
pub fn rounded_rect_path(rect: Rect, radii: [f64; 4]) -> BezPath {
    let Rect { x0, y0, x1, y1 } = rect;
    let [tl, tr, br, bl] = radii;
    let mut path = BezPath::new();

    if radii.iter().all(|r| *r == 0.0) {
        path.move_to((x0, y0));
        path.line_to((x1, y0));
        path.line_to((x1, y1));
        path.line_to((x0, y1));
        path.close_path();
        return path;
    }

    path.move_to((x0 + tl, y0));
    path.line_to((x1 - tr, y0));
    corner(&mut path, Point::new(x1 - tr, y0 + tr), tr, -FRAC_PI_2);
    path.line_to((x1, y1 - br));
    corner(&mut path, Point::new(x1 - br, y1 - br), br, 0.0);
    path.line_to((x0 + bl, y1));
    corner(&mut path, Point::new(x0 + bl, y1 - bl), bl, FRAC_PI_2);
    path.line_to((x0, y0 + tl));
    corner(&mut path, Point::new(x0 + tl, y0 + tl), tl, PI);
    path.close_path();
    path
}

fn corner(path: &mut BezPath, center: Point, radius: f64, start_angle: f64) {
    if radius <= 0.0 {
        return;
    }
    let arc = kurbo::Arc::new(center, Vec2::new(radius, radius), start_angle, FRAC_PI_2, 0.0);
    path.extend(arc.append_iter(ARC_TOLERANCE));
}
