//! `gridctl status`: a summary for this machine/user — configuration and
//! results waiting to be pulled. There is no IPC to a separately-running
//! `gridctl agent run` process (§1's non-goals exclude hiding the shared
//! filesystem behind RPC), so this does not report another process's
//! in-flight job count; `gridctl agent run`'s own logs cover that.

use gc_registry::CaseRegistry;
use serde::Serialize;

use crate::config::ConfigProvider;
use crate::error::CliError;
use crate::startup;

#[derive(Serialize)]
struct StatusReport {
    machine: String,
    user: String,
    user_group: String,
    instance: String,
    supported_applications: Vec<String>,
    results_awaiting_retrieval: usize,
}

pub async fn run(config_provider: &dyn ConfigProvider, json: bool) -> Result<(), CliError> {
    let config = config_provider.load().await?;
    let ctx = startup::build(&config, startup::DEFAULT_CAPACITY).await?;

    let receivable = ctx.registry.find_receivable(&config.machine, &config.user).await?;

    let report = StatusReport {
        machine: config.machine.to_string(),
        user: config.user.to_string(),
        user_group: config.user_group.to_string(),
        instance: config.instance.to_string(),
        supported_applications: config.supported_applications().iter().map(|a| a.to_string()).collect(),
        results_awaiting_retrieval: receivable.len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("machine:      {}", report.machine);
        println!("user:         {}", report.user);
        println!("group:        {}", report.user_group);
        println!("instance:     {}", report.instance);
        println!("applications: {}", report.supported_applications.join(", "));
        println!("awaiting retrieval: {}", report.results_awaiting_retrieval);
    }

    Ok(())
}
