use crate::foundation::core::Rect;
use crate::scene::model::ObjectFit;

/// Rectangle an image of intrinsic size `(image_w, image_h)` is drawn into for `target`.
///
/// `Fill`, and any mode where the aspect ratios already match, return `target` unchanged.
/// `Contain` shrinks the overflowing axis and centers along it. `Cover` grows the other axis
/// instead, so the result spills past `target` and relies on the surrounding clip.
pub fn place_image(image_w: f64, image_h: f64, target: Rect, fit: ObjectFit) -> Rect {
    let (w, h) = (target.width(), target.height());
    if fit == ObjectFit::Fill || image_w <= 0.0 || image_h <= 0.0 || w <= 0.0 || h <= 0.0 {
        return target;
    }

    let image_aspect = image_w / image_h;
    let box_aspect = w / h;
    if image_aspect == box_aspect {
        return target;
    }

    let width_bound = match fit {
        ObjectFit::Contain => image_aspect > box_aspect,
        ObjectFit::Cover | ObjectFit::Fill => image_aspect < box_aspect,
    };

    if width_bound {
        let height = image_h / (image_w / w);
        let top = target.y0 + (h - height) * 0.5;
        Rect::new(target.x0, top, target.x1, top + height)
    } else {
        let width = image_w / (image_h / h);
        let left = target.x0 + (w - width) * 0.5;
        Rect::new(left, target.y0, left + width, target.y1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/object_fit.rs"]
mod tests;
