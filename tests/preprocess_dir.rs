use image::{Rgb, RgbImage};
use std::fs;
use tempfile::TempDir;

use parklot::preprocess::{preprocess_dir, OUTPUT_SIZE};

#[test]
fn writes_resized_images_under_the_same_names() {
    let input = TempDir::new().expect("input");
    let output = TempDir::new().expect("output");

    for (name, size) in [("wide.jpg", (320, 180)), ("tall.png", (90, 200))] {
        RgbImage::from_fn(size.0, size.1, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        })
        .save(input.path().join(name))
        .expect("write fixture");
    }
    // a broken file with an image extension is skipped, not fatal
    fs::write(input.path().join("corrupt.jpg"), b"not a jpeg").expect("write corrupt");

    let processed = preprocess_dir(input.path(), output.path()).expect("preprocess");
    assert_eq!(processed, 2);

    for name in ["wide.jpg", "tall.png"] {
        let out = image::open(output.path().join(name))
            .expect("open output")
            .into_luma8();
        assert_eq!(
            out.dimensions(),
            (OUTPUT_SIZE, OUTPUT_SIZE),
            "{} not resized",
            name
        );
    }
    assert!(!output.path().join("corrupt.jpg").exists());
}
