use std::sync::Arc;

use campus_config::CampusConfig;
use campus_core::Submission;
use campus_grader::Grader;
use tokio_util::sync::CancellationToken;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::GradeArgs;
use crate::output::output;

pub async fn handle(
    args: &GradeArgs,
    flags: &GlobalFlags,
    config: &CampusConfig,
) -> anyhow::Result<()> {
    let submission = Submission {
        submission_text: args.text.clone(),
        submission_file_url: args.file_url.clone(),
        rubric: args.rubric.clone(),
        assignment_type: args.assignment_type.clone(),
    };
    let grader = Arc::new(Grader::from_config(config));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = grader.grade(&submission, &cancel).await;
    watcher.abort();
    output(&result?, flags.format)
}
