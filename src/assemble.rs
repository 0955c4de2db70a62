//! Sequential PDF assembly over the ordered, normalized image list.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::layout::{self, PageGeometry};
use crate::normalize::NormalizedImage;
use crate::options::ConversionOptions;

/// Builds one document page by page. Created with the first normalized
/// image because in auto mode that image fixes the page size for the
/// whole document; pages 2..N reuse the same geometry.
pub struct Assembler {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<Object>,
    geometry: PageGeometry,
    options: ConversionOptions,
}

impl Assembler {
    pub fn new(options: &ConversionOptions, first_image: &NormalizedImage) -> Assembler {
        // version 1.4: classic cross-reference table, no object streams,
        // for the broadest reader compatibility
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let geometry = layout::resolve_page_geometry(
            options.page_size,
            options.orientation,
            Some((first_image.width, first_image.height)),
            options.dpi,
        );

        let mut info = lopdf::Dictionary::new();
        info.set(
            "Title",
            Object::String(b"Converted Images".to_vec(), StringFormat::Literal),
        );
        info.set(
            "Subject",
            Object::String(b"Image to PDF Conversion".to_vec(), StringFormat::Literal),
        );
        info.set(
            "Producer",
            Object::String(
                format!("quire {}", env!("CARGO_PKG_VERSION")).into_bytes(),
                StringFormat::Literal,
            ),
        );
        info.set(
            "Creator",
            Object::String(
                b"quire image-to-pdf converter".to_vec(),
                StringFormat::Literal,
            ),
        );
        info.set(
            "CreationDate",
            Object::String(
                format!("D:{}Z", Utc::now().format("%Y%m%d%H%M%S")).into_bytes(),
                StringFormat::Literal,
            ),
        );
        let info_id = doc.add_object(Object::Dictionary(info));
        doc.trailer.set("Info", info_id);

        Assembler {
            doc,
            pages_id,
            page_ids: Vec::new(),
            geometry,
            options: options.clone(),
        }
    }

    /// Geometry shared by every page of this document.
    pub fn page_geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// Embed one normalized image as the next page: background fill,
    /// JPEG XObject, placement transform. Consumes the image buffer.
    pub fn append_page(&mut self, image: NormalizedImage) -> Result<()> {
        let placement = layout::place_image(
            image.width,
            image.height,
            self.geometry,
            self.options.margins,
            self.options.fit,
        );
        debug!(
            width = image.width,
            height = image.height,
            x = placement.x_pt,
            y = placement.y_pt,
            "placing page image"
        );

        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => Object::Name(b"XObject".to_vec()),
                "Subtype" => Object::Name(b"Image".to_vec()),
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => Object::Name(b"DeviceRGB".to_vec()),
                "BitsPerComponent" => 8,
                "Filter" => Object::Name(b"DCTDecode".to_vec()),
                "Length" => image.jpeg.len() as i64,
            },
            image.jpeg,
        ));

        // background first so contain-mode margins show the requested
        // color, then the image; no clip path even when cover overflows
        let [r, g, b] = self.options.bg_color.to_f32();
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "rg",
                    vec![Object::Real(r), Object::Real(g), Object::Real(b)],
                ),
                Operation::new(
                    "re",
                    vec![
                        0.into(),
                        0.into(),
                        Object::Real(self.geometry.width_pt),
                        Object::Real(self.geometry.height_pt),
                    ],
                ),
                Operation::new("f", vec![]),
                Operation::new("Q", vec![]),
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(placement.width_pt),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(placement.height_pt),
                        Object::Real(placement.x_pt),
                        Object::Real(placement.y_pt),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = self.doc.add_object(Stream::new(
            dictionary! {},
            content
                .encode()
                .map_err(|e| ConvertError::Assembly(format!("content stream encoding: {e}")))?,
        ));

        let resources_id = self.doc.add_object(dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        });

        let page_id = self.doc.add_object(dictionary! {
            "Type" => Object::Name(b"Page".to_vec()),
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(self.geometry.width_pt),
                Object::Real(self.geometry.height_pt),
            ],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        self.page_ids.push(page_id.into());
        Ok(())
    }

    /// Pages tree, catalog, trailer; serialize the document to bytes.
    pub fn finalize(mut self) -> Result<Vec<u8>> {
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Kids" => self.page_ids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| ConvertError::Assembly(format!("serializing document: {e}")))?;
        Ok(bytes)
    }
}
