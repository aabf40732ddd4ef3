use super::*;

fn pixel(frame: &RasterFrame, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
}

fn rect_path(r: Rect) -> BezPath {
    crate::geometry::path::rounded_rect_path(r, [0.0; 4])
}

const RED: Color = Color::rgba(255, 0, 0, 255);
const BLUE: Color = Color::rgba(0, 0, 255, 255);

#[test]
fn fill_rect_covers_only_its_pixels() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    s.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), RED);
    let frame = s.read_pixels().unwrap();

    assert_eq!((frame.width, frame.height), (4, 4));
    assert!(frame.premultiplied);
    assert_eq!(pixel(&frame, 0, 0), [255, 0, 0, 255]);
    assert_eq!(pixel(&frame, 3, 3), [0, 0, 0, 0]);
}

#[test]
fn scale_maps_logical_to_device_pixels() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    s.scale(2.0);
    s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), RED);
    let frame = s.read_pixels().unwrap();

    assert_eq!(pixel(&frame, 1, 1), [255, 0, 0, 255]);
    assert_eq!(pixel(&frame, 2, 2), [0, 0, 0, 0]);
}

#[test]
fn restore_drops_the_clip() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    s.save();
    s.clip(&rect_path(Rect::new(0.0, 0.0, 2.0, 4.0)));
    s.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), RED);
    s.restore();
    s.fill_rect(Rect::new(0.0, 3.0, 4.0, 4.0), BLUE);
    let frame = s.read_pixels().unwrap();

    assert_eq!(pixel(&frame, 0, 0), [255, 0, 0, 255]);
    assert_eq!(pixel(&frame, 3, 0), [0, 0, 0, 0]);
    assert_eq!(pixel(&frame, 3, 3), [0, 0, 255, 255]);
}

#[test]
fn unbalanced_saves_are_unwound_on_read() {
    let mut s = CpuSurface::new(2, 2).unwrap();
    s.save();
    s.clip(&rect_path(Rect::new(0.0, 0.0, 1.0, 2.0)));
    s.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), RED);
    let frame = s.read_pixels().unwrap();
    assert_eq!(pixel(&frame, 0, 0), [255, 0, 0, 255]);
    assert_eq!(pixel(&frame, 1, 0), [0, 0, 0, 0]);
}

#[test]
fn image_is_stretched_into_rect() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    let green = DecodedImage {
        width: 1,
        height: 1,
        rgba8_premul: Arc::new(vec![0, 255, 0, 255]),
    };
    s.draw_image(&green, Rect::new(0.0, 0.0, 4.0, 4.0)).unwrap();
    let frame = s.read_pixels().unwrap();
    assert_eq!(pixel(&frame, 2, 2), [0, 255, 0, 255]);
}

#[test]
fn malformed_image_is_rejected() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    let broken = DecodedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new(vec![0; 3]),
    };
    assert!(s.draw_image(&broken, Rect::new(0.0, 0.0, 4.0, 4.0)).is_err());
}

#[test]
fn resize_clears_and_validates() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    s.scale(3.0);
    s.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), RED);
    s.resize(6, 2).unwrap();
    assert_eq!(s.size(), (6, 2));

    let frame = s.read_pixels().unwrap();
    assert_eq!(pixel(&frame, 0, 0), [0, 0, 0, 0]);

    assert!(matches!(s.resize(0, 2), Err(PosterError::Validation(_))));
    assert!(matches!(s.resize(70_000, 2), Err(PosterError::Unsupported(_))));
}

#[test]
fn garbage_font_bytes_fail_to_register() {
    let mut s = CpuSurface::new(1, 1).unwrap();
    let font = FontData {
        family: "Nope".to_owned(),
        bytes: Arc::new(vec![1, 2, 3, 4]),
    };
    assert!(s.register_font(&font).is_err());
}

#[test]
fn empty_text_measures_zero() {
    let mut s = CpuSurface::new(1, 1).unwrap();
    assert_eq!(s.measure_text(""), 0.0);
}

#[test]
fn trailing_spaces_count_towards_width() {
    let mut s = CpuSurface::new(1, 1).unwrap();
    s.set_font(&FontSpec {
        size: 20.0,
        ..FontSpec::default()
    });
    let word = s.measure_text("Hello");
    if word == 0.0 {
        // No system fonts to shape with.
        return;
    }
    let one = s.measure_text("Hello ");
    let three = s.measure_text("Hello   ");
    assert!(one > word, "{one} <= {word}");
    assert!(three > one, "{three} <= {one}");
    assert!(s.measure_text(" ") > 0.0);
}

#[test]
fn resize_drops_converted_images() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    let green = DecodedImage {
        width: 1,
        height: 1,
        rgba8_premul: Arc::new(vec![0, 255, 0, 255]),
    };
    s.draw_image(&green, Rect::new(0.0, 0.0, 4.0, 4.0)).unwrap();
    assert_eq!(s.image_cache.len(), 1);

    s.resize(4, 4).unwrap();
    assert!(s.image_cache.is_empty());
    assert!(s.glyph_fonts.is_empty());
}

fn system_font_files(limit: usize) -> Vec<std::path::PathBuf> {
    fn walk(dir: &Path, out: &mut Vec<std::path::PathBuf>, limit: usize) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            if out.len() >= limit {
                return;
            }
            let path = entry.path();
            if path.is_dir() {
                walk(&path, out, limit);
            } else if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("ttf")) {
                out.push(path);
            }
        }
    }

    let mut out = Vec::new();
    walk(Path::new("/usr/share/fonts"), &mut out, limit);
    out
}

#[test]
fn redeclared_family_switches_to_the_latest_file() {
    let files = system_font_files(2);
    if files.len() < 2 {
        return;
    }
    let font = |path: &Path| FontData {
        family: "Brand".to_owned(),
        bytes: Arc::new(std::fs::read(path).unwrap()),
    };
    let (first, second) = (font(&files[0]), font(&files[1]));

    let mut s = CpuSurface::new(1, 1).unwrap();
    s.register_font(&first).unwrap();
    let first_name = s.aliases["Brand"].clone();

    s.register_font(&second).unwrap();
    assert_eq!(s.faces.len(), 2);
    assert_eq!(s.aliases["Brand"], s.faces[&("Brand".to_owned(), Arc::as_ptr(&second.bytes) as usize)].1);

    // Back to the first file without registering it again.
    s.register_font(&first).unwrap();
    assert_eq!(s.aliases["Brand"], first_name);
    assert_eq!(s.faces.len(), 2);
}
