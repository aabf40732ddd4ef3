use crate::scene::model::Radius;

/// Expand `radius` to `[top_left, top_right, bottom_right, bottom_left]` and clamp each corner to
/// half the box's shorter side.
///
/// Negative and non-finite values collapse to `0`.
pub fn normalize_radius(radius: &Radius, width: f64, height: f64) -> [f64; 4] {
    let corners = match radius {
        Radius::Uniform(r) => [*r; 4],
        Radius::Corners(v) => match v.as_slice() {
            [a] => [*a; 4],
            [a, b] => [*a, *b, *a, *b],
            [a, b, c] => [*a, *b, *c, *b],
            [a, b, c, d, ..] => [*a, *b, *c, *d],
            [] => [0.0; 4],
        },
    };
    let limit = (width / 2.0).min(height / 2.0).max(0.0);
    corners.map(|r| {
        if r.is_finite() {
            r.min(limit).max(0.0)
        } else {
            0.0
        }
    })
}
