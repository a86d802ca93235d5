use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};

use crate::pdf::copier::ObjectCopier;

/// 平坦化後のPDFを組み立てる。
///
/// 作成直後からページ0枚の有効なドキュメント（Catalog + 空のPagesノード）になっており、
/// ページを追加するたびに /Kids と /Count を更新する。
pub struct FlattenedWriter {
    doc: Document,
    pages_id: ObjectId,
    info_id: Option<ObjectId>,
    page_count: usize,
}

impl FlattenedWriter {
    pub fn new(version: &str) -> Self {
        let mut doc = Document::with_version(version);

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            pages_id,
            info_id: None,
            page_count: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Pagesノードのオブジェクトidを返す。
    pub fn pages_id(&self) -> ObjectId {
        self.pages_id
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// /Info 辞書を設定する。再設定した場合は同じオブジェクトを置き換える。
    pub fn set_info(&mut self, info: Dictionary) {
        match self.info_id {
            Some(id) => {
                self.doc.objects.insert(id, Object::Dictionary(info));
            }
            None => {
                let id = self.doc.add_object(info);
                self.doc.trailer.set("Info", id);
                self.info_id = Some(id);
            }
        }
    }

    /// 入力PDFのページを1枚コピーして末尾に追加する。
    pub fn copy_page_from(
        &mut self,
        copier: &mut ObjectCopier<'_>,
        source_page: ObjectId,
    ) -> crate::error::Result<ObjectId> {
        let page_id = copier.copy_page(&mut self.doc, source_page, self.pages_id)?;
        self.append_page(page_id)?;
        Ok(page_id)
    }

    /// 既に出力ドキュメント内にあるページをページツリーの末尾に追加する。
    pub fn append_page(&mut self, page_id: ObjectId) -> crate::error::Result<()> {
        let pages = self
            .doc
            .get_object_mut(self.pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| crate::error::PdfFlattenError::pdf_write(e.to_string()))?;

        match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
            _ => {
                return Err(crate::error::PdfFlattenError::pdf_write(
                    "Pages node has no Kids array",
                ));
            }
        }
        self.page_count += 1;
        pages.set("Count", self.page_count as i64);
        Ok(())
    }

    /// PDFドキュメントをバイト列として出力する。
    pub fn save_to_bytes(&mut self, compress: bool) -> crate::error::Result<Vec<u8>> {
        if compress {
            self.doc.compress();
        }
        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| crate::error::PdfFlattenError::pdf_write(e.to_string()))?;
        Ok(buf)
    }
}
