// Document information dictionary: read from the source, rebuild for the output.

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat, text_string};

/// Producer string written into every flattened document.
pub const PRODUCER: &str = "PDF Flattener";

/// 入力PDFの /Info 辞書から取り出したメタデータ。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub keywords: Option<String>,
}

impl DocumentInfo {
    /// /Info 辞書からメタデータを読み取る。
    ///
    /// 値が間接参照の場合は解決する。文字列でない値は未設定として扱う。
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let text = |key: &[u8]| -> Option<String> {
            let obj = dict.get(key).ok()?;
            let obj = match obj {
                Object::Reference(id) => doc.get_object(*id).ok()?,
                other => other,
            };
            decode_text_string(obj)
        };

        DocumentInfo {
            title: text(b"Title"),
            author: text(b"Author"),
            subject: text(b"Subject"),
            creator: text(b"Creator"),
            producer: text(b"Producer"),
            keywords: text(b"Keywords"),
        }
    }

    /// 出力PDF用の /Info 辞書を構築する。
    ///
    /// Title/Author/Subject/Creator はコピーし、未設定なら空文字列にする。
    /// Producer は固定値、作成日時と更新日時は同じ `now` を使う。
    /// Keywords はコピーしない。
    pub fn to_output_dictionary(&self, now: DateTime<Utc>) -> Dictionary {
        let or_empty = |value: &Option<String>| text_string(value.as_deref().unwrap_or(""));
        let date = Object::String(format_pdf_date(now).into_bytes(), StringFormat::Literal);

        let mut dict = Dictionary::new();
        dict.set("Title", or_empty(&self.title));
        dict.set("Author", or_empty(&self.author));
        dict.set("Subject", or_empty(&self.subject));
        dict.set("Creator", or_empty(&self.creator));
        dict.set("Producer", text_string(PRODUCER));
        dict.set("CreationDate", date.clone());
        dict.set("ModDate", date);
        dict
    }
}

/// Format a timestamp as a PDF date string in UTC (`D:YYYYMMDDHHmmSSZ`).
pub fn format_pdf_date(at: DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%SZ").to_string()
}

/// PDF テキスト文字列をデコードする。文字列以外は `None`。
///
/// BOM の付いた UTF-16BE / UTF-8 と PDFDocEncoding を lopdf で解釈する。
/// 不正なバイト列は置換文字を含む文字列として返す。
pub fn decode_text_string(obj: &Object) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };
    match lopdf::decode_text_string(obj) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!(error = %e, "malformed text string decoded lossily");
            Some(lossy_text(bytes))
        }
    }
}

fn lossy_text(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(rest) => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}
