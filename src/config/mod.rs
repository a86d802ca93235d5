pub mod settings;

use settings::Settings;
use std::path::Path;

/// 設定ファイル名。入力PDFと同じディレクトリに置く。
pub const SETTINGS_FILE_NAME: &str = "pdf_flattener.yaml";

/// 入力PDFのパスから設定ファイルを自動検出して読み込む。
///
/// 入力PDFと同じディレクトリに `pdf_flattener.yaml` が存在すれば読み込み、
/// 存在しなければデフォルト設定を返す。
pub fn load_settings_for_input(input_path: &Path) -> crate::error::Result<Settings> {
    let dir = input_path
        .parent()
        .ok_or_else(|| crate::error::PdfFlattenError::config("Cannot determine input directory"))?;

    let settings_path = dir.join(SETTINGS_FILE_NAME);

    if settings_path.exists() {
        tracing::debug!(path = %settings_path.display(), "loading settings");
        Settings::from_file(&settings_path)
    } else {
        Ok(Settings::default())
    }
}
