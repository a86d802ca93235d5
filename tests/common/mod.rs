// Test PDFs are generated with lopdf (no committed fixtures).
#![allow(dead_code)]

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use pdf_flattener::pdf::reader::PdfReader;

/// Content stream that draws "Page <n>".
pub fn page_content(n: usize) -> Vec<u8> {
    format!("BT /F1 24 Tf 72 720 Td (Page {n}) Tj ET").into_bytes()
}

pub fn literal(text: &str) -> Object {
    Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
}

/// Builds small PDFs: pages with text content, an optional /Info and form fields.
///
/// Resources and MediaBox live on the Pages node so copying has to pull
/// inherited attributes down onto each page.
pub struct PdfBuilder {
    pub doc: Document,
    pub catalog_id: ObjectId,
    pub page_ids: Vec<ObjectId>,
}

impl PdfBuilder {
    pub fn new(num_pages: usize) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut page_ids = Vec::new();
        for n in 1..=num_pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(n)));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
                "Count" => num_pages as i64,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            catalog_id,
            page_ids,
        }
    }

    pub fn info(mut self, info: Dictionary) -> Self {
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);
        self
    }

    /// Add a field whose dictionary is merged with its widget annotation on `page` (0-based).
    pub fn widget_field(&mut self, page: usize, mut field: Dictionary) -> ObjectId {
        let page_id = self.page_ids[page];
        field.set("Type", "Annot");
        field.set("Subtype", "Widget");
        field.set("P", page_id);
        field.set(
            "Rect",
            vec![
                Object::Integer(72),
                Object::Integer(600),
                Object::Integer(272),
                Object::Integer(620),
            ],
        );
        let id = self.doc.add_object(field);
        self.push_annot(page_id, id);
        self.fields_mut().push(Object::Reference(id));
        id
    }

    /// Add a radio group whose widgets (without /T) sit on `page`.
    pub fn radio_group(&mut self, page: usize, name: &str, buttons: usize) -> ObjectId {
        let page_id = self.page_ids[page];
        let group_id = self.doc.new_object_id();
        let mut kids = Vec::new();
        for _ in 0..buttons {
            let widget_id = self.doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Widget",
                "Parent" => group_id,
                "P" => page_id,
                "Rect" => vec![
                    Object::Integer(72),
                    Object::Integer(500),
                    Object::Integer(92),
                    Object::Integer(520),
                ],
            });
            self.push_annot(page_id, widget_id);
            kids.push(Object::Reference(widget_id));
        }
        self.doc.objects.insert(
            group_id,
            Object::Dictionary(dictionary! {
                "FT" => "Btn",
                "Ff" => pdf_flattener::pdf::forms::RADIO,
                "T" => literal(name),
                "Kids" => kids,
            }),
        );
        self.fields_mut().push(Object::Reference(group_id));
        group_id
    }

    /// Add a field listed in /Fields but not placed on any page.
    pub fn orphan_field(&mut self, field: Dictionary) -> ObjectId {
        let id = self.doc.add_object(field);
        self.fields_mut().push(Object::Reference(id));
        id
    }

    /// Replace the AcroForm /Fields array.
    pub fn set_fields(&mut self, fields: Vec<Object>) {
        *self.fields_mut() = fields;
    }

    pub fn catalog_mut(&mut self) -> &mut Dictionary {
        self.doc
            .get_object_mut(self.catalog_id)
            .and_then(Object::as_dict_mut)
            .expect("catalog")
    }

    pub fn bytes(mut self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).expect("save test PDF");
        buf
    }

    pub fn reader(self) -> PdfReader {
        PdfReader::from_bytes(&self.bytes()).expect("decode test PDF")
    }

    pub fn save(self, path: &Path) {
        std::fs::write(path, self.bytes()).expect("write test PDF");
    }

    fn push_annot(&mut self, page_id: ObjectId, annot_id: ObjectId) {
        let page = self
            .doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .expect("page dict");
        match page.get_mut(b"Annots") {
            Ok(Object::Array(annots)) => annots.push(Object::Reference(annot_id)),
            _ => page.set("Annots", vec![Object::Reference(annot_id)]),
        }
    }

    fn fields_mut(&mut self) -> &mut Vec<Object> {
        let catalog = self.catalog_mut();
        if !catalog.has(b"AcroForm") {
            catalog.set(
                "AcroForm",
                dictionary! { "Fields" => Vec::<Object>::new() },
            );
        }
        match catalog.get_mut(b"AcroForm") {
            Ok(Object::Dictionary(acroform)) => match acroform.get_mut(b"Fields") {
                Ok(Object::Array(fields)) => fields,
                _ => panic!("AcroForm has no Fields array"),
            },
            _ => panic!("AcroForm is not a dictionary"),
        }
    }
}

pub fn text_field(name: &str) -> Dictionary {
    dictionary! { "FT" => "Tx", "T" => literal(name), "V" => literal("hello") }
}

pub fn checkbox_field(name: &str) -> Dictionary {
    dictionary! { "FT" => "Btn", "T" => literal(name), "V" => "Off" }
}

pub fn load(bytes: &[u8]) -> Document {
    Document::load_mem(bytes).expect("load output PDF")
}

/// Content stream bytes of every page, in page order.
pub fn page_contents(doc: &Document) -> Vec<Vec<u8>> {
    doc.get_pages()
        .values()
        .map(|&id| doc.get_page_content(id).expect("page content"))
        .collect()
}

/// /Ff of the field called `name`, found through the page widget annotations.
pub fn widget_field_flags(doc: &Document, name: &str) -> Option<i64> {
    for &page_id in doc.get_pages().values() {
        let page = doc.get_dictionary(page_id).ok()?;
        let Ok(annots) = page.get(b"Annots").and_then(Object::as_array) else {
            continue;
        };
        for annot in annots {
            let Ok(annot_id) = annot.as_reference() else {
                continue;
            };
            let Ok(widget) = doc.get_dictionary(annot_id) else {
                continue;
            };
            let field = if widget.has(b"T") {
                widget
            } else {
                match widget.get(b"Parent").and_then(Object::as_reference) {
                    Ok(parent_id) => doc.get_dictionary(parent_id).ok()?,
                    Err(_) => continue,
                }
            };
            let matches = matches!(
                field.get(b"T"),
                Ok(Object::String(bytes, _)) if bytes.as_slice() == name.as_bytes()
            );
            if matches {
                return Some(field.get(b"Ff").and_then(Object::as_i64).unwrap_or(0));
            }
        }
    }
    None
}
