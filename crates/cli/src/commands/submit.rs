//! `gridctl submit --application <id> <user-selection>`: one-shot submission,
//! without starting the long-running agent loop.

use gc_core::ApplicationId;
use tracing::info;

use crate::config::ConfigProvider;
use crate::error::CliError;
use crate::startup;

pub async fn run(
    config_provider: &dyn ConfigProvider,
    application: ApplicationId,
    user_selection: &str,
) -> Result<(), CliError> {
    let config = config_provider.load().await?;
    let ctx = startup::build(&config, startup::DEFAULT_CAPACITY).await?;

    let ids = ctx.scheduler.submit(application, user_selection).await?;
    for id in &ids {
        info!(case_id = %id, "submitted");
        println!("{id}");
    }
    Ok(())
}
