use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "posterkit_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn checker(width: u32, height: u32) -> RasterFrame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            if (x + y) % 2 == 0 {
                data.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                data.extend_from_slice(&[0, 0, 64, 128]);
            }
        }
    }
    RasterFrame {
        width,
        height,
        data,
        premultiplied: true,
    }
}

#[test]
fn defaults_cover_the_whole_surface() {
    let req = ExportOptions::default().resolve(40, 30).unwrap();
    assert_eq!((req.x, req.y, req.width, req.height), (0, 0, 40, 30));
    assert_eq!((req.dest_width, req.dest_height), (40, 30));
    assert_eq!(req.file_type, FileType::Png);
    assert_eq!(req.quality, DEFAULT_JPEG_QUALITY);
}

#[test]
fn region_defaults_to_the_remainder() {
    let opts = ExportOptions {
        x: 10,
        y: 5,
        ..ExportOptions::default()
    };
    let req = opts.resolve(40, 30).unwrap();
    assert_eq!((req.width, req.height), (30, 25));
}

#[test]
fn invalid_regions_are_rejected() {
    let outside = ExportOptions {
        x: 40,
        ..ExportOptions::default()
    };
    assert!(matches!(outside.resolve(40, 30), Err(PosterError::Validation(_))));

    let too_wide = ExportOptions {
        x: 10,
        width: Some(31),
        ..ExportOptions::default()
    };
    assert!(too_wide.resolve(40, 30).is_err());

    let bad_quality = ExportOptions {
        quality: Some(1.5),
        ..ExportOptions::default()
    };
    assert!(bad_quality.resolve(40, 30).is_err());
}

#[test]
fn options_parse_from_json() {
    let opts: ExportOptions = serde_json::from_str(
        r#"{"x": 2, "destWidth": 10, "fileType": "jpeg", "quality": 0.5}"#,
    )
    .unwrap();
    assert_eq!(opts.x, 2);
    assert_eq!(opts.dest_width, Some(10));
    assert_eq!(opts.file_type, FileType::Jpg);
    assert_eq!(opts.quality, Some(0.5));
}

#[test]
fn png_export_crops_and_scales() {
    let dir = temp_dir("export_png");
    let exporter = FileExporter::new(&dir);
    let opts = ExportOptions {
        x: 1,
        width: Some(2),
        height: Some(2),
        dest_width: Some(4),
        dest_height: Some(6),
        path: Some(PathBuf::from("out/crop.png")),
        ..ExportOptions::default()
    };
    let frame = checker(4, 2);
    let req = opts.resolve(frame.width, frame.height).unwrap();
    let written = pollster::block_on(exporter.export(frame, req)).unwrap();

    assert_eq!(written.path, dir.join("out/crop.png"));
    let img = image::open(&written.path).unwrap();
    assert_eq!((img.width(), img.height()), (4, 6));
}

#[test]
fn png_keeps_straight_alpha() {
    let dir = temp_dir("export_alpha");
    let frame = checker(2, 1);
    let req = ExportOptions::default().resolve(2, 1).unwrap();
    let written = pollster::block_on(FileExporter::new(&dir).export(frame, req)).unwrap();

    let img = image::open(&written.path).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 0, 128, 128]);
    assert_eq!(written.path.extension().unwrap(), "png");
}

#[test]
fn jpeg_export_writes_requested_size() {
    let dir = temp_dir("export_jpg");
    let opts = ExportOptions {
        file_type: FileType::Jpg,
        quality: Some(0.8),
        ..ExportOptions::default()
    };
    let frame = checker(8, 8);
    let req = opts.resolve(8, 8).unwrap();
    let written = pollster::block_on(FileExporter::new(&dir).export(frame, req)).unwrap();

    assert_eq!(written.path.extension().unwrap(), "jpg");
    let img = image::open(&written.path).unwrap();
    assert_eq!((img.width(), img.height()), (8, 8));
}

#[test]
fn mismatched_frame_is_an_export_error() {
    let frame = RasterFrame {
        width: 4,
        height: 4,
        data: vec![0; 3],
        premultiplied: true,
    };
    let req = ExportOptions::default().resolve(4, 4).unwrap();
    let err = pollster::block_on(FileExporter::new(temp_dir("export_bad")).export(frame, req))
        .unwrap_err();
    assert!(matches!(err, PosterError::Export(_)));
}
