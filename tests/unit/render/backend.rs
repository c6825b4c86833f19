use super::*;

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "panelcraft_backend_{tag}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn checker(w: u32, h: u32) -> image::RgbImage {
    image::RgbImage::from_fn(w, h, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgb([250, 250, 250])
        } else {
            image::Rgb([10, 10, 10])
        }
    })
}

#[test]
fn jpeg_and_png_decode_back_to_same_size() {
    for encoding in [OutputEncoding::default(), OutputEncoding::Png] {
        let img = EncodedImage::encode(&checker(17, 9), encoding).unwrap();
        assert_eq!((img.width, img.height), (17, 9));
        let decoded = image::load_from_memory(&img.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (17, 9));
    }
}

#[test]
fn extensions_match_encoding() {
    assert_eq!(OutputEncoding::default().extension(), "jpg");
    assert_eq!(OutputEncoding::Png.extension(), "png");
    assert_eq!(OutputEncoding::default(), OutputEncoding::Jpeg { quality: 92 });
}

#[test]
fn write_creates_parents_and_leaves_no_temp_files() {
    let dir = temp_dir("write");
    let path = dir.join("nested").join("out.png");
    let img = EncodedImage::encode(&checker(4, 4), OutputEncoding::Png).unwrap();
    write_encoded(&path, &img).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), img.bytes);

    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn write_into_file_parent_is_render_error() {
    let dir = temp_dir("blocked");
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let img = EncodedImage::encode(&checker(2, 2), OutputEncoding::Png).unwrap();
    let err = write_encoded(&blocker.join("out.png"), &img).unwrap_err();
    assert!(matches!(err, PanelError::Render(_)));
    std::fs::remove_dir_all(&dir).ok();
}
