// AcroForm field enumeration and the read-only flag.

use std::collections::HashSet;
use std::fmt;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::PdfFlattenError;
use crate::pdf::metadata::decode_text_string;

/// Field flag bit 1: the user may not change the value.
pub const READ_ONLY: i64 = 1;
/// Button flag bit 16.
pub const RADIO: i64 = 1 << 15;
/// Button flag bit 17.
pub const PUSHBUTTON: i64 = 1 << 16;
/// Choice flag bit 18.
pub const COMBO: i64 = 1 << 17;

/// フィールド種別。デコード時に /FT と /Ff から決定する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    CheckBox,
    RadioGroup,
    Dropdown,
    Other,
}

impl FieldKind {
    /// /FT の値と実効フラグから種別を判定する。
    pub fn classify(field_type: Option<&[u8]>, flags: i64) -> Self {
        match field_type {
            Some(b"Tx") => FieldKind::Text,
            Some(b"Btn") if flags & PUSHBUTTON != 0 => FieldKind::Other,
            Some(b"Btn") if flags & RADIO != 0 => FieldKind::RadioGroup,
            Some(b"Btn") => FieldKind::CheckBox,
            Some(b"Ch") if flags & COMBO != 0 => FieldKind::Dropdown,
            _ => FieldKind::Other,
        }
    }

    /// 読み取り専用化の対象かどうか。
    pub fn is_flattenable(self) -> bool {
        match self {
            FieldKind::Text | FieldKind::CheckBox | FieldKind::RadioGroup | FieldKind::Dropdown => {
                true
            }
            FieldKind::Other => false,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::CheckBox => "checkbox",
            FieldKind::RadioGroup => "radio group",
            FieldKind::Dropdown => "dropdown",
            FieldKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// 末端フィールド（値を持つフィールド）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub id: ObjectId,
    /// 完全修飾名（部分名を `.` で連結）。
    pub name: String,
    pub kind: FieldKind,
    /// 自身または親から継承した /Ff。
    pub flags: i64,
}

impl FormField {
    pub fn is_read_only(&self) -> bool {
        self.flags & READ_ONLY != 0
    }
}

struct PendingNode {
    obj: Object,
    parent_name: Option<String>,
    field_type: Option<Vec<u8>>,
    flags: i64,
}

/// カタログの /AcroForm から末端フィールドをドキュメント順に列挙する。
///
/// /AcroForm が無い場合は空のベクタを返す。/AcroForm や /Fields の型が不正な場合は
/// `FormError` を返す。解決できない個々のノードは警告を出して読み飛ばす。
pub fn collect_fields(doc: &Document) -> crate::error::Result<Vec<FormField>> {
    let catalog = doc
        .catalog()
        .map_err(|e| PdfFlattenError::form(format!("Cannot read document catalog: {e}")))?;

    let acroform = match catalog.get(b"AcroForm") {
        Err(_) => return Ok(Vec::new()),
        Ok(obj) => resolve_dict(doc, obj)
            .ok_or_else(|| PdfFlattenError::form("AcroForm is not a dictionary"))?,
    };

    let fields = match acroform.get(b"Fields") {
        Err(_) => return Ok(Vec::new()),
        Ok(obj) => resolve_array(doc, obj)
            .ok_or_else(|| PdfFlattenError::form("AcroForm Fields is not an array"))?,
    };

    let mut stack: Vec<PendingNode> = fields
        .iter()
        .rev()
        .map(|obj| PendingNode {
            obj: obj.clone(),
            parent_name: None,
            field_type: None,
            flags: 0,
        })
        .collect();

    let mut visited: HashSet<ObjectId> = HashSet::new();
    let mut result = Vec::new();

    while let Some(node) = stack.pop() {
        let id = match node.obj {
            Object::Reference(id) => id,
            _ => {
                tracing::warn!("skipping form field that is not an indirect object");
                continue;
            }
        };
        if !visited.insert(id) {
            continue;
        }
        let dict = match doc.get_dictionary(id) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(object = ?id, error = %e, "skipping unresolvable form field");
                continue;
            }
        };

        let name = match (node.parent_name, partial_name(dict)) {
            (Some(parent), Some(own)) => Some(format!("{parent}.{own}")),
            (Some(parent), None) => Some(parent),
            (None, own) => own,
        };
        let field_type = match dict.get(b"FT") {
            Ok(Object::Name(ft)) => Some(ft.clone()),
            _ => node.field_type,
        };
        let flags = match dict.get(b"Ff") {
            Ok(Object::Integer(ff)) => *ff,
            _ => node.flags,
        };

        let child_fields = child_fields(doc, dict);
        if child_fields.is_empty() {
            result.push(FormField {
                id,
                name: name.unwrap_or_default(),
                kind: FieldKind::classify(field_type.as_deref(), flags),
                flags,
            });
        } else {
            for kid in child_fields.into_iter().rev() {
                stack.push(PendingNode {
                    obj: kid,
                    parent_name: name.clone(),
                    field_type: field_type.clone(),
                    flags,
                });
            }
        }
    }

    Ok(result)
}

/// 指定オブジェクトの /Ff に読み取り専用ビットを立てる。
///
/// /Ff が無い場合は `inherited_flags` を基準にする。他のビットは保持する。
/// 戻り値は書き込んだフラグ値。
pub fn set_read_only(
    doc: &mut Document,
    id: ObjectId,
    inherited_flags: i64,
) -> crate::error::Result<i64> {
    let dict = doc
        .get_object_mut(id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfFlattenError::form(format!("field {} {} unusable: {e}", id.0, id.1)))?;

    let current = match dict.get(b"Ff") {
        Ok(Object::Integer(ff)) => *ff,
        Ok(other) => {
            return Err(PdfFlattenError::form(format!(
                "field {} {} has a non-integer Ff entry: {other:?}",
                id.0, id.1
            )));
        }
        Err(_) => inherited_flags,
    };

    let updated = current | READ_ONLY;
    dict.set("Ff", Object::Integer(updated));
    Ok(updated)
}

fn partial_name(dict: &Dictionary) -> Option<String> {
    dict.get(b"T").ok().and_then(decode_text_string)
}

// Kids carrying /T are fields; the rest are widget annotations.
fn child_fields(doc: &Document, dict: &Dictionary) -> Vec<Object> {
    let Some(kids) = dict.get(b"Kids").ok().and_then(|obj| resolve_array(doc, obj)) else {
        return Vec::new();
    };
    kids.iter()
        .filter(|kid| resolve_dict(doc, kid).is_some_and(|d| d.has(b"T")))
        .cloned()
        .collect()
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(d) => Some(d),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

fn resolve_array<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Vec<Object>> {
    match obj {
        Object::Array(a) => Some(a),
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok(),
        _ => None,
    }
}
