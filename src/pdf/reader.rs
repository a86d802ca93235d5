use lopdf::{Document, Object, ObjectId};

use crate::pdf::forms::{self, FormField};
use crate::pdf::metadata::DocumentInfo;

/// デコード済みの入力PDF。
pub struct PdfReader {
    doc: Document,
}

impl PdfReader {
    /// メモリ上のバイト列をPDFとしてデコードする。
    pub fn from_bytes(bytes: &[u8]) -> crate::error::Result<Self> {
        let doc = Document::load_mem(bytes)?;
        Ok(Self { doc })
    }

    pub fn from_document(doc: Document) -> Self {
        Self { doc }
    }

    /// 内部のlopdf Documentへの参照を返す。
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// ページ数を返す。
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// ページのオブジェクトIDをページ順に返す。
    pub fn page_ids(&self) -> Vec<ObjectId> {
        // get_pages() は1始まりのページ番号をキーとするBTreeMap
        self.doc.get_pages().into_values().collect()
    }

    /// トレーラの /Info 辞書からメタデータを取得する。
    ///
    /// /Info が存在しない、または辞書でない場合は全項目未設定を返す。
    pub fn metadata(&self) -> DocumentInfo {
        let info = match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => self.doc.get_dictionary(*id).ok(),
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        };
        info.map(|dict| DocumentInfo::from_dict(&self.doc, dict))
            .unwrap_or_default()
    }

    /// AcroFormの末端フィールドを列挙する。
    pub fn form_fields(&self) -> crate::error::Result<Vec<FormField>> {
        forms::collect_fields(&self.doc)
    }
}
