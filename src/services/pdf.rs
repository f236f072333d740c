//! PDF manipulation helpers: page counting, page extraction, and lossless
//! wrapping of raster images into single-page PDFs. All of these are
//! CPU-bound; callers run them on a blocking thread.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn page_count(path: &Path) -> Result<u32, PdfError> {
    let doc = Document::load(path)?;
    Ok(doc.get_pages().len() as u32)
}

/// Write a copy of `src` to `dest` containing only the selected zero-based
/// pages, in ascending order. `src` is never mutated.
pub fn extract_pages(src: &Path, dest: &Path, keep: &[u32]) -> Result<(), PdfError> {
    let mut doc = Document::load(src)?;
    let total = doc.get_pages().len() as u32;

    // lopdf numbers pages from 1; drop everything not selected.
    let keep: BTreeSet<u32> = keep.iter().map(|p| p + 1).collect();
    let delete: Vec<u32> = (1..=total).filter(|n| !keep.contains(n)).collect();

    doc.delete_pages(&delete);
    doc.renumber_objects();
    doc.compress();
    doc.save(dest)?;

    Ok(())
}

/// Wrap a JPEG into a one-page PDF. The compressed pixel data is embedded
/// verbatim as a DCTDecode stream, so no re-encoding happens.
pub fn wrap_jpeg(src: &Path, dest: &Path) -> Result<(), PdfError> {
    let data = std::fs::read(src)?;
    let probe = image::open(src)?;
    let (width, height) = (probe.width(), probe.height());
    let color_space = if probe.color().has_color() {
        "DeviceRGB"
    } else {
        "DeviceGray"
    };

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        data,
    )
    .with_compression(false);

    write_image_pdf(dest, image_stream, width, height)
}

/// Wrap a PNG into a one-page PDF. The image is decoded once and embedded
/// as a Flate-compressed RGB stream, which stays lossless.
pub fn wrap_png(src: &Path, dest: &Path) -> Result<(), PdfError> {
    let img = image::open(src)?.to_rgb8();
    let (width, height) = img.dimensions();

    let mut image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        img.into_raw(),
    );
    image_stream.compress()?;

    write_image_pdf(dest, image_stream, width, height)
}

/// One page sized to the image at one point per pixel, with the image
/// drawn across the full media box.
fn write_image_pdf(dest: &Path, image: Stream, width: u32, height: u32) -> Result<(), PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (width as i64).into(),
                    0.into(),
                    0.into(),
                    (height as i64).into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (width as i64).into(),
            (height as i64).into(),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(dest)?;
    Ok(())
}
