use std::io::Cursor;

use base64::Engine;

use super::*;

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn data_url_image_is_decoded() {
    let mut store = ImageStore::new();
    let url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes()));
    let r = ingest_upload(&mut store, UploadInput::DataUrl(url))
        .unwrap()
        .unwrap();
    assert_eq!((r.width, r.height), (2, 2));
    assert!(r.source.starts_with("upload:image/png:"));
}

#[test]
fn non_image_inputs_are_ignored_silently() {
    let mut store = ImageStore::new();
    let url = format!("data:text/plain;base64,{}", STANDARD.encode(b"hello"));
    assert!(ingest_upload(&mut store, UploadInput::DataUrl(url)).unwrap().is_none());

    let dropped = UploadInput::Bytes {
        mime: Some("application/pdf".into()),
        bytes: b"%PDF-1.7".to_vec(),
    };
    assert!(ingest_upload(&mut store, dropped).unwrap().is_none());

    let unknown = UploadInput::Bytes {
        mime: None,
        bytes: b"plain text".to_vec(),
    };
    assert!(ingest_upload(&mut store, unknown).unwrap().is_none());
    assert!(store.is_empty());
}

#[test]
fn identical_uploads_share_a_cache_entry() {
    let mut store = ImageStore::new();
    let a = ingest_upload(
        &mut store,
        UploadInput::Bytes {
            mime: Some("image/png".into()),
            bytes: png_bytes(),
        },
    )
    .unwrap()
    .unwrap();
    let b = ingest_upload(
        &mut store,
        UploadInput::Bytes {
            mime: Some("image/png".into()),
            bytes: png_bytes(),
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(a.id, b.id);
    assert_eq!(store.len(), 1);
}

#[test]
fn malformed_image_data_url_is_an_error() {
    let mut store = ImageStore::new();
    assert!(ingest_upload(&mut store, UploadInput::DataUrl("data:image/png;base64".into())).is_err());
    assert!(
        ingest_upload(&mut store, UploadInput::DataUrl("data:image/png;base64,@@@".into()))
            .is_err()
    );
    assert!(ingest_upload(&mut store, UploadInput::DataUrl("data:image/png,abc".into())).is_err());
}

#[test]
fn plain_text_drop_is_ignored_without_error() {
    let mut store = ImageStore::new();
    for text in ["https://example.com/cat.png", "hello", ""] {
        assert!(
            ingest_upload(&mut store, UploadInput::DataUrl(text.into()))
                .unwrap()
                .is_none()
        );
    }
    assert!(store.is_empty());
}
