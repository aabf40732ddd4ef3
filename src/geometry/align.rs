use crate::scene::model::TextAlign;

/// Left edge of a line of `text_width` aligned inside a box of `width` starting at `left`.
///
/// Without a box width there is nothing to align against and `left` is returned. A missing
/// `text_width` counts as zero.
pub fn align_offset(
    left: f64,
    align: TextAlign,
    width: Option<f64>,
    text_width: Option<f64>,
) -> f64 {
    let Some(width) = width else {
        return left;
    };
    let text_width = text_width.unwrap_or(0.0);
    match align {
        TextAlign::Left => left,
        TextAlign::Center => left + (width - text_width) / 2.0,
        TextAlign::Right => left + width - text_width,
    }
}
