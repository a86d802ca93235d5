// Process-wide command registration with an explicit activate/dispose lifecycle.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::PdfFlattenError;
use crate::host::Host;
use crate::host::command::{CommandOutcome, flatten_pdf_command};

/// Identifier under which the flatten command is registered.
pub const FLATTEN_COMMAND_ID: &str = "pdf-flattener.flattenPdf";

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Handle owning the command registration. Dropping it unregisters the command.
#[derive(Debug)]
pub struct Registration {
    command_id: &'static str,
}

/// Register the flatten command. Only one registration may be live per process.
pub fn activate() -> crate::error::Result<Registration> {
    if ACTIVE.swap(true, Ordering::SeqCst) {
        return Err(PdfFlattenError::host("PDF Flattener is already active"));
    }
    tracing::info!(command = FLATTEN_COMMAND_ID, "PDF Flattener is now active");
    Ok(Registration {
        command_id: FLATTEN_COMMAND_ID,
    })
}

/// Whether a registration is currently live.
pub fn is_active() -> bool {
    ACTIVE.load(Ordering::SeqCst)
}

impl Registration {
    pub fn command_id(&self) -> &'static str {
        self.command_id
    }

    /// Dispatch a registered command.
    pub fn execute(
        &self,
        command_id: &str,
        host: &dyn Host,
        path: Option<PathBuf>,
    ) -> crate::error::Result<CommandOutcome> {
        if command_id != self.command_id {
            return Err(PdfFlattenError::host(format!(
                "command '{command_id}' not found"
            )));
        }
        Ok(flatten_pdf_command(host, path))
    }

    pub fn deactivate(self) {}
}

impl Drop for Registration {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::SeqCst);
        tracing::info!("PDF Flattener is now deactivated");
    }
}
