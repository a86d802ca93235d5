use std::path::Path;

use serde::Deserialize;

/// 読み取り専用フラグを書き込む対象。
///
/// フィールドの列挙は常に入力PDFのフォームに対して行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTarget {
    /// 出力PDFにコピーされたフィールドオブジェクトに書き込む。
    Output,
    /// 入力PDFのフィールドオブジェクトに書き込む（出力には反映されない）。
    Source,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub field_target: FieldTarget,
    pub compress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            field_target: FieldTarget::Output,
            compress: false,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::PdfFlattenError::config(format!("Failed to parse settings YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
