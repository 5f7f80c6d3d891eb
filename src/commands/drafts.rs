//! Draft comment CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use reviewhub_core::error::AppError;
use reviewhub_core::types::AccountId;
use reviewhub_entity::{CommentKey, PatchKey, PatchLineComment, PatchSetId};
use reviewhub_service::{DraftService, RequestContext, SaveDraftRequest};

/// Arguments for draft commands
#[derive(Debug, Args)]
pub struct DraftsArgs {
    /// Draft subcommand
    #[command(subcommand)]
    pub command: DraftsCommand,
}

/// File a draft is attached to, and who is acting
#[derive(Debug, Args)]
pub struct Target {
    /// Patch set as CHANGE,PATCH_SET, e.g. 1234,2
    #[arg(long)]
    pub patch: PatchSetId,
    /// File path within the patch set
    #[arg(long)]
    pub file: String,
    /// Acting reviewer account
    #[arg(long)]
    pub account: AccountId,
}

impl Target {
    fn patch_key(&self) -> PatchKey {
        PatchKey::new(self.patch, self.file.clone())
    }
}

/// Draft subcommands
#[derive(Debug, Subcommand)]
pub enum DraftsCommand {
    /// List your drafts on a file
    List {
        #[command(flatten)]
        target: Target,
    },
    /// Create a draft, or edit one with --uuid
    Save {
        #[command(flatten)]
        target: Target,
        /// Existing draft to edit
        #[arg(long)]
        uuid: Option<String>,
        /// Line number
        #[arg(long)]
        line: i32,
        /// Diff side: 0 for old, 1 for new
        #[arg(long, default_value_t = PatchLineComment::SIDE_NEW)]
        side: i16,
        /// Comment text
        #[arg(short, long)]
        message: String,
    },
    /// Delete one of your drafts
    Delete {
        #[command(flatten)]
        target: Target,
        /// Draft to delete
        #[arg(long)]
        uuid: String,
    },
}

/// Draft display row for table output
#[derive(Debug, Serialize, Tabled)]
struct DraftRow {
    /// Comment id
    uuid: String,
    /// File
    file: String,
    /// Line
    line: i32,
    /// Diff side
    side: &'static str,
    /// Last written
    written_on: String,
    /// Text
    message: String,
}

impl From<&PatchLineComment> for DraftRow {
    fn from(c: &PatchLineComment) -> Self {
        Self {
            uuid: c.key.uuid.clone(),
            file: c.key.patch.file_name.clone(),
            line: c.line_nbr,
            side: if c.side == PatchLineComment::SIDE_OLD {
                "old"
            } else {
                "new"
            },
            written_on: c.written_on.format("%Y-%m-%d %H:%M").to_string(),
            message: c.message.clone(),
        }
    }
}

/// Execute draft commands
pub async fn execute(
    args: &DraftsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;
    let service = DraftService::new(store, config.review.transaction_retries);

    match &args.command {
        DraftsCommand::List { target } => {
            let ctx = RequestContext::new(target.account);
            let drafts = service.my_drafts(&ctx, &target.patch_key()).await?;
            let rows: Vec<DraftRow> = drafts.iter().map(DraftRow::from).collect();
            output::print_list(&rows, format);
        }
        DraftsCommand::Save {
            target,
            uuid,
            line,
            side,
            message,
        } => {
            let ctx = RequestContext::new(target.account);
            let mut request =
                SaveDraftRequest::new(target.patch_key(), *line, message.clone()).with_side(*side);
            if let Some(uuid) = uuid {
                request = request.with_uuid(uuid.clone());
            }
            let saved = service.save_draft(&ctx, request).await?;
            output::print_item(&DraftRow::from(&saved), format);
        }
        DraftsCommand::Delete { target, uuid } => {
            let ctx = RequestContext::new(target.account);
            let key = CommentKey::new(target.patch_key(), uuid.clone());
            service.delete_draft(&ctx, &key).await?;
            output::print_success(&format!("Draft '{uuid}' deleted"));
        }
    }

    Ok(())
}
