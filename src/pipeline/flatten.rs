// 平坦化パイプライン: メタデータ → ページコピー → フィールド読み取り専用化

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lopdf::ObjectId;

use crate::config::settings::{FieldTarget, Settings};
use crate::pdf::copier::ObjectCopier;
use crate::pdf::forms::{self, FieldKind};
use crate::pdf::reader::PdfReader;
use crate::pdf::writer::FlattenedWriter;

/// Options that change how the pipeline behaves.
#[derive(Debug, Clone, Copy)]
pub struct FlattenOptions {
    pub field_target: FieldTarget,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        FlattenOptions {
            field_target: FieldTarget::Output,
        }
    }
}

impl From<&Settings> for FlattenOptions {
    fn from(settings: &Settings) -> Self {
        FlattenOptions {
            field_target: settings.field_target,
        }
    }
}

/// What happened to a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldStatus {
    /// The read-only flag was set.
    ReadOnly,
    /// The field kind is not one the pipeline flattens.
    Unsupported,
    /// No page of the output references the field.
    NotInOutput,
    /// Setting the flag failed; the reason is kept.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutcome {
    pub name: String,
    pub kind: FieldKind,
    pub status: FieldStatus,
}

/// Summary of one flatten run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenReport {
    pub pages: usize,
    pub fields: Vec<FieldOutcome>,
    /// Set when the form could not be accessed and the field pass was skipped.
    pub form_error: Option<String>,
}

impl FlattenReport {
    pub fn field(&self, name: &str) -> Option<&FieldOutcome> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn read_only_count(&self) -> usize {
        self.count(|status| matches!(status, FieldStatus::ReadOnly))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|status| matches!(status, FieldStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&FieldStatus) -> bool) -> usize {
        self.fields.iter().filter(|f| pred(&f.status)).count()
    }
}

/// Output of [`flatten`]: the assembled document and its report.
pub struct Flattened {
    pub writer: FlattenedWriter,
    pub report: FlattenReport,
}

/// Flatten a decoded document, stamping it with the current time.
pub fn flatten(source: PdfReader, options: &FlattenOptions) -> crate::error::Result<Flattened> {
    flatten_at(source, options, Utc::now())
}

/// Flatten a decoded document using `now` for both creation and modification dates.
///
/// Fails only when copying a page fails. Problems with the interactive form
/// are logged and recorded in the report.
pub fn flatten_at(
    mut source: PdfReader,
    options: &FlattenOptions,
    now: DateTime<Utc>,
) -> crate::error::Result<Flattened> {
    let mut writer = FlattenedWriter::new(&source.document().version);
    writer.set_info(source.metadata().to_output_dictionary(now));

    let page_ids = source.page_ids();
    let id_map = {
        let mut copier = ObjectCopier::new(source.document());
        for &page_id in &page_ids {
            copier.reserve(writer.document_mut(), page_id);
        }
        for (index, &page_id) in page_ids.iter().enumerate() {
            let copied = writer.copy_page_from(&mut copier, page_id)?;
            tracing::debug!(page = index + 1, source = ?page_id, output = ?copied, "copied page");
        }
        copier.into_id_map()
    };

    let (fields, form_error) =
        mark_fields_read_only(&mut source, &mut writer, &id_map, options.field_target);

    Ok(Flattened {
        report: FlattenReport {
            pages: writer.page_count(),
            fields,
            form_error,
        },
        writer,
    })
}

fn mark_fields_read_only(
    source: &mut PdfReader,
    writer: &mut FlattenedWriter,
    id_map: &HashMap<ObjectId, ObjectId>,
    target: FieldTarget,
) -> (Vec<FieldOutcome>, Option<String>) {
    let fields = match source.form_fields() {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!(error = %e, "could not process form fields; skipping field pass");
            return (Vec::new(), Some(e.to_string()));
        }
    };

    let mut outcomes = Vec::with_capacity(fields.len());
    for field in fields {
        let status = if !field.kind.is_flattenable() {
            FieldStatus::Unsupported
        } else {
            let result = match target {
                FieldTarget::Source => {
                    forms::set_read_only(source.document_mut(), field.id, field.flags).map(Some)
                }
                FieldTarget::Output => match id_map.get(&field.id) {
                    Some(&copy) => {
                        forms::set_read_only(writer.document_mut(), copy, field.flags).map(Some)
                    }
                    None => Ok(None),
                },
            };
            match result {
                Ok(Some(_)) => FieldStatus::ReadOnly,
                Ok(None) => {
                    tracing::debug!(field = %field.name, "field not referenced by any copied page");
                    FieldStatus::NotInOutput
                }
                Err(e) => {
                    tracing::warn!(field = %field.name, kind = %field.kind, error = %e, "could not flatten field");
                    FieldStatus::Failed(e.to_string())
                }
            }
        };
        outcomes.push(FieldOutcome {
            name: field.name,
            kind: field.kind,
            status,
        });
    }
    (outcomes, None)
}
