use std::io::Cursor;

use quire::{images_to_pdf, ConversionOptions, FitMode, PageSize, Rgb, SortOrder, SourceImage};

fn jpeg_source(name: &str, width: u32, height: u32) -> SourceImage {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 251) as u8, (y % 251) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    SourceImage {
        bytes: buf.into_inner(),
        filename: name.to_string(),
    }
}

fn png_rgba_source(name: &str, width: u32, height: u32, rgba: [u8; 4]) -> SourceImage {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    SourceImage {
        bytes: buf.into_inner(),
        filename: name.to_string(),
    }
}

fn media_box(doc: &lopdf::Document, page_id: lopdf::ObjectId) -> (f32, f32) {
    let page_dict = doc.get_dictionary(page_id).unwrap();
    let mb = page_dict.get(b"MediaBox").unwrap().as_array().unwrap();
    (
        mb[2].as_float().unwrap(),
        mb[3].as_float().unwrap(),
    )
}

/// the (width, height) operands of the image transform on a page
fn drawn_image_size(doc: &lopdf::Document, page_id: lopdf::ObjectId) -> (f32, f32) {
    let data = doc.get_page_content(page_id).unwrap();
    let content = lopdf::content::Content::decode(&data).unwrap();
    let cm = content
        .operations
        .iter()
        .find(|op| op.operator == "cm")
        .expect("no cm operation on page");
    (
        cm.operands[0].as_float().unwrap(),
        cm.operands[3].as_float().unwrap(),
    )
}

fn first_page_image_width(doc: &lopdf::Document, page_id: lopdf::ObjectId) -> i64 {
    let page_dict = doc.get_dictionary(page_id).unwrap();
    let resources_ref = page_dict.get(b"Resources").unwrap();
    let (_, resources_obj) = doc.dereference(resources_ref).unwrap();
    let xobjects_ref = resources_obj.as_dict().unwrap().get(b"XObject").unwrap();
    let (_, xobjects_obj) = doc.dereference(xobjects_ref).unwrap();
    let im0_ref = xobjects_obj.as_dict().unwrap().get(b"Im0").unwrap();
    let (_, im0_obj) = doc.dereference(im0_ref).unwrap();
    match im0_obj {
        lopdf::Object::Stream(stream) => stream.dict.get(b"Width").unwrap().as_i64().unwrap(),
        _ => panic!("Im0 is not a stream"),
    }
}

#[test]
fn three_jpegs_default_options() {
    let sources = vec![
        jpeg_source("a.jpg", 640, 480),
        jpeg_source("b.jpg", 480, 640),
        jpeg_source("c.jpg", 300, 300),
    ];
    let converted = images_to_pdf(sources, &ConversionOptions::default()).unwrap();
    assert_eq!(converted.pages, 3);

    let doc = lopdf::Document::load_mem(&converted.bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 3);

    // default margins are 36pt, so every drawn image fits in page - 72pt
    for page_id in pages.values() {
        let (page_w, page_h) = media_box(&doc, *page_id);
        let (img_w, img_h) = drawn_image_size(&doc, *page_id);
        assert!(img_w <= page_w - 72.0 + 1e-2);
        assert!(img_h <= page_h - 72.0 + 1e-2);
    }

    assert!(converted.filename.starts_with("images_to_pdf_"));
    assert!(converted.filename.ends_with(".pdf"));
}

#[test]
fn output_passes_structural_validation() {
    let converted = images_to_pdf(
        vec![jpeg_source("one.jpg", 100, 100)],
        &ConversionOptions::default(),
    )
    .unwrap();
    assert!(converted.bytes.starts_with(b"%PDF-"));
    quire::validate::validate_pdf(&converted.bytes).unwrap();
}

#[test]
fn corrupt_image_fails_the_whole_batch() {
    let sources = vec![
        jpeg_source("1.jpg", 64, 64),
        jpeg_source("2.jpg", 64, 64),
        SourceImage {
            bytes: b"garbage bytes, definitely not an image".to_vec(),
            filename: "3-broken.jpg".to_string(),
        },
        jpeg_source("4.jpg", 64, 64),
        jpeg_source("5.jpg", 64, 64),
    ];
    let err = images_to_pdf(sources, &ConversionOptions::default()).unwrap_err();
    match err {
        quire::ConvertError::ImageDecode { filename, .. } => {
            assert_eq!(filename, "3-broken.jpg");
        }
        other => panic!("expected ImageDecode, got {other:?}"),
    }
}

#[test]
fn empty_batch_is_rejected_before_processing() {
    let err = images_to_pdf(Vec::new(), &ConversionOptions::default()).unwrap_err();
    assert!(err.is_caller_error());
}

#[test]
fn invalid_options_fail_atomically() {
    let opts = ConversionOptions {
        dpi: 10_000,
        ..Default::default()
    };
    let err = images_to_pdf(vec![jpeg_source("x.jpg", 10, 10)], &opts).unwrap_err();
    assert!(err.is_caller_error());
    assert!(err.to_string().contains("10000"));
}

#[test]
fn filename_order_controls_page_order() {
    // uploaded order is b (wide) then a (narrow); filename order flips it
    let sources = vec![jpeg_source("b.jpg", 400, 100), jpeg_source("a.jpg", 50, 100)];
    let opts = ConversionOptions {
        order: SortOrder::Filename,
        ..Default::default()
    };
    let converted = images_to_pdf(sources, &opts).unwrap();

    let doc = lopdf::Document::load_mem(&converted.bytes).unwrap();
    let pages = doc.get_pages();
    let first = pages.values().next().unwrap();
    assert_eq!(first_page_image_width(&doc, *first), 50);
}

#[test]
fn auto_page_size_comes_from_first_image_only() {
    let sources = vec![
        jpeg_source("first.jpg", 600, 300),
        jpeg_source("second.jpg", 3000, 3000),
    ];
    let opts = ConversionOptions {
        page_size: PageSize::Auto,
        ..Default::default()
    };
    let converted = images_to_pdf(sources, &opts).unwrap();

    let doc = lopdf::Document::load_mem(&converted.bytes).unwrap();
    for page_id in doc.get_pages().values() {
        // 600x300 px at 300 dpi = 144x72 pt, reused for page 2
        let (w, h) = media_box(&doc, *page_id);
        assert!((w - 144.0).abs() < 1e-2);
        assert!((h - 72.0).abs() < 1e-2);
    }
}

#[test]
fn cover_mode_overflows_the_usable_area() {
    let sources = vec![jpeg_source("wide.jpg", 2000, 500)];
    let opts = ConversionOptions {
        fit: FitMode::Cover,
        ..Default::default()
    };
    let converted = images_to_pdf(sources, &opts).unwrap();

    let doc = lopdf::Document::load_mem(&converted.bytes).unwrap();
    let pages = doc.get_pages();
    let page_id = pages.values().next().unwrap();
    let (page_w, _) = media_box(&doc, *page_id);
    let (img_w, _) = drawn_image_size(&doc, *page_id);
    assert!(img_w > page_w - 72.0, "cover should exceed the usable width");
}

#[test]
fn background_color_reaches_the_content_stream() {
    let sources = vec![jpeg_source("p.jpg", 100, 100)];
    let opts = ConversionOptions {
        bg_color: Rgb::parse("#FF0000").unwrap(),
        ..Default::default()
    };
    let converted = images_to_pdf(sources, &opts).unwrap();

    let doc = lopdf::Document::load_mem(&converted.bytes).unwrap();
    let pages = doc.get_pages();
    let page_id = pages.values().next().unwrap();
    let data = doc.get_page_content(*page_id).unwrap();
    let content = lopdf::content::Content::decode(&data).unwrap();
    let rg = content
        .operations
        .iter()
        .find(|op| op.operator == "rg")
        .expect("no background fill color");
    assert!((rg.operands[0].as_float().unwrap() - 1.0).abs() < 1e-3);
    assert!(rg.operands[1].as_float().unwrap() < 1e-3);
    assert!(rg.operands[2].as_float().unwrap() < 1e-3);
}

#[test]
fn transparent_png_is_flattened_onto_the_background() {
    // fully transparent image on a red background: the embedded JPEG
    // should decode to (nearly) pure red
    let sources = vec![png_rgba_source("clear.png", 32, 32, [0, 0, 255, 0])];
    let opts = ConversionOptions {
        bg_color: Rgb::parse("#FF0000").unwrap(),
        ..Default::default()
    };
    let converted = images_to_pdf(sources, &opts).unwrap();

    let doc = lopdf::Document::load_mem(&converted.bytes).unwrap();
    let pages = doc.get_pages();
    let page_id = pages.values().next().unwrap();
    let page_dict = doc.get_dictionary(*page_id).unwrap();
    let resources_ref = page_dict.get(b"Resources").unwrap();
    let (_, resources_obj) = doc.dereference(resources_ref).unwrap();
    let xobjects_ref = resources_obj.as_dict().unwrap().get(b"XObject").unwrap();
    let (_, xobjects_obj) = doc.dereference(xobjects_ref).unwrap();
    let im0_ref = xobjects_obj.as_dict().unwrap().get(b"Im0").unwrap();
    let (_, im0_obj) = doc.dereference(im0_ref).unwrap();
    let jpeg = match im0_obj {
        lopdf::Object::Stream(stream) => stream.content.clone(),
        _ => panic!("Im0 is not a stream"),
    };

    let decoded = image::load_from_memory(&jpeg).unwrap().into_rgb8();
    let px = decoded.get_pixel(16, 16);
    assert!(px.0[0] > 240 && px.0[1] < 16 && px.0[2] < 16, "got {:?}", px.0);
}
