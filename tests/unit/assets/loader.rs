use std::io::Cursor;

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

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn loads_and_decodes_image_from_root() {
    let tmp = temp_dir("loader_image");
    std::fs::create_dir_all(&tmp).unwrap();
    let img = image::RgbaImage::from_raw(3, 2, vec![255u8; 3 * 2 * 4]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(tmp.join("logo.png"), &buf).unwrap();

    let loader = FsAssetLoader::new(&tmp);
    let decoded = pollster::block_on(loader.load_image("logo.png")).unwrap();
    assert_eq!((decoded.width, decoded.height), (3, 2));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_files_fail_with_the_source_key() {
    let loader = FsAssetLoader::new(temp_dir("loader_missing"));
    let err = pollster::block_on(loader.load_image("nope.png")).unwrap_err();
    assert_eq!(err.key, "nope.png");

    let err = pollster::block_on(loader.load_font("Brand", "brand.ttf")).unwrap_err();
    assert_eq!(err.key, "brand.ttf");
}

#[test]
fn traversal_is_rejected_before_touching_disk() {
    let loader = FsAssetLoader::new(".");
    let err = pollster::block_on(loader.load_image("../secret.png")).unwrap_err();
    assert!(err.message.contains(".."));
}

#[cfg(not(feature = "http"))]
#[test]
fn remote_sources_need_http_feature() {
    let loader = FsAssetLoader::new(".");
    let err = pollster::block_on(loader.load_image("https://example.com/a.png")).unwrap_err();
    assert!(err.message.contains("http"));
}

#[test]
fn many_loads_share_a_bounded_pool() {
    let tmp = temp_dir("loader_pool");
    std::fs::create_dir_all(&tmp).unwrap();
    for i in 0..6u32 {
        let img = image::RgbaImage::from_raw(i + 1, 1, vec![9u8; (i as usize + 1) * 4]).unwrap();
        img.save_with_format(tmp.join(format!("{i}.png")), image::ImageFormat::Png)
            .unwrap();
    }

    let loader = FsAssetLoader::with_threads(&tmp, 2).unwrap();
    assert_eq!(loader.threads(), Some(2));
    let pending: Vec<_> = (0..6).map(|i| loader.load_image(&format!("{i}.png"))).collect();
    let widths: Vec<u32> = pollster::block_on(futures::future::join_all(pending))
        .into_iter()
        .map(|r| r.unwrap().width)
        .collect();
    assert_eq!(widths, vec![1, 2, 3, 4, 5, 6]);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn zero_loader_threads_is_a_validation_error() {
    let err = FsAssetLoader::with_threads(".", 0).unwrap_err();
    assert!(matches!(err, PosterError::Validation(_)));
    assert_eq!(FsAssetLoader::new(".").threads(), None);
}
