//! `gridctl case show <id>` / `gridctl case receive <id>`.

use gc_core::{CaseId, CaseRecord};
use gc_registry::CaseRegistry;
use serde::Serialize;

use crate::config::ConfigProvider;
use crate::error::CliError;
use crate::startup;

/// The §6 status projection shape: `{id, application, status,
/// counterparty_machine, timing}`.
#[derive(Serialize)]
struct CaseProjection {
    id: String,
    application: String,
    status: String,
    /// The machine on the other side of this case from the caller's
    /// perspective: the current (or most recent) processor if this machine
    /// is the originator, else the originator.
    counterparty_machine: Option<String>,
    submitted_at: u64,
    received_at: Option<u64>,
    last_heartbeat: Option<u64>,
}

fn project(record: &CaseRecord, local_machine: &gc_core::MachineId) -> CaseProjection {
    let counterparty_machine = if &record.origin.machine == local_machine {
        record
            .processors
            .current
            .as_ref()
            .map(|p| p.machine.to_string())
            .or_else(|| record.processors.attempts.last().map(|a| a.machine.to_string()))
    } else {
        Some(record.origin.machine.to_string())
    };

    CaseProjection {
        id: record.id.to_string(),
        application: record.application.to_string(),
        status: record.status.to_string(),
        counterparty_machine,
        submitted_at: record.origin.submitted_at,
        received_at: record.origin.received_at,
        last_heartbeat: record.last_heartbeat,
    }
}

pub async fn show(config_provider: &dyn ConfigProvider, id: &CaseId, json: bool) -> Result<(), CliError> {
    let config = config_provider.load().await?;
    let ctx = startup::build(&config, startup::DEFAULT_CAPACITY).await?;

    let record = ctx.registry.get(id).await?.ok_or_else(|| CliError::CaseNotFound(id.clone()))?;
    let projection = project(&record, &config.machine);

    if json {
        println!("{}", serde_json::to_string_pretty(&projection)?);
    } else {
        println!("id:           {}", projection.id);
        println!("application:  {}", projection.application);
        println!("status:       {}", projection.status);
        println!("counterparty: {}", projection.counterparty_machine.as_deref().unwrap_or("-"));
        println!("submitted_at: {}", projection.submitted_at);
        if let Some(received_at) = projection.received_at {
            println!("received_at:  {received_at}");
        }
        if let Some(hb) = projection.last_heartbeat {
            println!("last_heartbeat: {hb}");
        }
    }
    Ok(())
}

pub async fn receive(config_provider: &dyn ConfigProvider, id: &CaseId) -> Result<(), CliError> {
    let config = config_provider.load().await?;
    let ctx = startup::build(&config, startup::DEFAULT_CAPACITY).await?;

    let received = ctx.scheduler.receive_case(id).await?;
    if received {
        println!("received {id}");
    } else {
        println!("{id} is not yet ready to receive");
    }
    Ok(())
}
