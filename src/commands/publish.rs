//! Publish command: drafts, votes and a summary message in one go.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use reviewhub_core::error::AppError;
use reviewhub_core::types::AccountId;
use reviewhub_entity::{ApprovalCategoryValueId, PatchSetId};
use reviewhub_service::{ApprovalTypes, LogNotifier, PublishService, RequestContext};

/// Arguments for the publish command
#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Patch set as CHANGE,PATCH_SET, e.g. 1234,2
    #[arg(long)]
    pub patch_set: PatchSetId,
    /// Acting reviewer account
    #[arg(long)]
    pub account: AccountId,
    /// Free-text review message
    #[arg(short, long)]
    pub message: Option<String>,
    /// Vote as CATEGORY=VALUE, e.g. CRVW=+2; may be repeated
    #[arg(short, long = "approval")]
    pub approvals: Vec<ApprovalCategoryValueId>,
}

/// Publication summary for table output
#[derive(Debug, Serialize, Tabled)]
struct PublishRow {
    /// Change number
    change: String,
    /// Git ref of the patch set
    ref_name: String,
    /// Comments published
    comments: usize,
    /// Recorded message
    message: String,
}

/// Execute the publish command
pub async fn execute(
    args: &PublishArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;
    let service = PublishService::new(
        store,
        Arc::new(ApprovalTypes::from_config(&config.review)),
        Arc::new(LogNotifier),
        config.review.transaction_retries,
        config.notification.enabled,
    );

    let ctx = RequestContext::new(args.account);
    let result = service
        .publish_comments(
            &ctx,
            args.patch_set,
            args.message.clone(),
            args.approvals.clone(),
        )
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&result),
        OutputFormat::Table => {
            output::print_item(
                &PublishRow {
                    change: result.change.change_id.to_string(),
                    ref_name: result.patch_set.ref_name(),
                    comments: result.comments.len(),
                    message: result
                        .message
                        .as_ref()
                        .map(|m| m.message.trim_end().to_string())
                        .unwrap_or_default(),
                },
                format,
            );
            output::print_success("Review published");
        }
    }

    Ok(())
}
