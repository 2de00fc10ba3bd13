use std::sync::Arc;

use anyhow::Context;
use campus_config::CampusConfig;
use campus_grader::{Grader, GradingServer, GradingService};
use tokio_util::sync::CancellationToken;

use crate::cli::root_commands::ServeArgs;

pub async fn handle(args: &ServeArgs, config: &CampusConfig) -> anyhow::Result<()> {
    let bind = args.bind.as_deref().unwrap_or(&config.grader.bind);
    let cancel = CancellationToken::new();

    let service = GradingService::new(Arc::new(Grader::from_config(config)))
        .with_cancellation(cancel.child_token());
    let server = GradingServer::bind(bind, service)
        .with_context(|| format!("serve: cannot listen on {bind}"))?;
    if let Some(addr) = server.local_addr() {
        eprintln!("Grading endpoint on http://{addr}/ (Ctrl-C to stop)");
    }

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; shutting down");
            on_interrupt.cancel();
        }
    });

    server.run(cancel).await?;
    Ok(())
}
