//! Submission flow: `adapter.send` produces one or more input bundles, each
//! is zipped and uploaded to the Case Archive, and only then is a
//! `CaseRecord` inserted into the registry (I4) — a case is never visible
//! to `find_claimable` before its input archive exists.

use std::sync::Arc;

use gc_core::{ApplicationId, CaseId, CaseRecord, CaseStatus, Clock, Origin, Processors};
use tracing::instrument;

use crate::bundle::zip_files;
use crate::error::SchedulerError;
use crate::scheduler::Scheduler;

impl<C: Clock + 'static> Scheduler<C> {
    #[instrument(skip(self, user_selection), fields(application = %application))]
    pub async fn submit(
        &self,
        application: ApplicationId,
        user_selection: &str,
    ) -> Result<Vec<CaseId>, SchedulerError> {
        let adapter = self
            .adapters
            .get(&application)
            .ok_or_else(|| SchedulerError::UnknownApplication(application.clone()))?
            .clone();

        let bundles = adapter.send(user_selection).await?;
        let now = self.clock.epoch_ms();
        let mut ids = Vec::with_capacity(bundles.len());

        for bundle in bundles {
            let id = CaseId::new();
            let bytes = zip_files(&bundle.files)?;
            let path = self
                .archive
                .put_input(&id, &self.config.user, &self.config.machine, &bytes)
                .await?;

            let record = CaseRecord {
                id: id.clone(),
                user_group: self.config.user_group.clone(),
                instance: self.config.instance.clone(),
                application: application.clone(),
                status: CaseStatus::ToProcess,
                path: path.to_canonical_string(),
                origin: Origin {
                    machine: self.config.machine.clone(),
                    user: self.config.user.clone(),
                    submitted_at: now,
                    received_at: None,
                },
                processors: Processors::default(),
                last_heartbeat: None,
            };

            self.registry.insert(record).await?;
            ids.push(id);
        }

        Ok(ids)
    }
}
