//! Git ref name lookup.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use reviewhub_core::error::AppError;
use reviewhub_core::types::ChangeId;
use reviewhub_entity::PatchSetId;

/// Arguments for the ref-name command
#[derive(Debug, Args)]
pub struct RefNameArgs {
    /// Change number
    pub change: i32,
    /// Patch set number
    pub patch_set: i32,
}

#[derive(Debug, Serialize, Tabled)]
struct RefRow {
    /// Patch set key
    patch_set: String,
    /// Git reference
    ref_name: String,
}

/// Execute the ref-name command
pub fn execute(args: &RefNameArgs, format: OutputFormat) -> Result<(), AppError> {
    if args.change <= 0 || args.patch_set <= 0 {
        return Err(AppError::validation(
            "Change and patch set numbers must be positive",
        ));
    }

    let id = PatchSetId::new(ChangeId::new(args.change), args.patch_set);
    match format {
        OutputFormat::Table => println!("{}", id.ref_name()),
        OutputFormat::Json => output::print_item(
            &RefRow {
                patch_set: id.to_string(),
                ref_name: id.ref_name(),
            },
            format,
        ),
    }
    Ok(())
}
