// ============================================================================
// Assessly Core - Reports Service
// File: crates/assessly-core/src/services/reports_service.rs
// Description: Report definitions and synchronous generation
// ============================================================================

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use assessly_shared::{Page, Pagination};

use crate::domain::{NewReport, Report, ReportFilter, ReportStatus, Role, TenantScope};
use crate::error::DomainError;
use crate::repositories::ReportRepository;
use crate::services::report_generator::ReportGenerator;

pub struct ReportsService {
    reports: Arc<dyn ReportRepository>,
    generator: Arc<dyn ReportGenerator>,
    stale_after: Duration,
}

impl ReportsService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        generator: Arc<dyn ReportGenerator>,
        stale_after: Duration,
    ) -> Self {
        Self {
            reports,
            generator,
            stale_after,
        }
    }

    pub async fn list_reports(
        &self,
        scope: &TenantScope,
        filter: &ReportFilter,
        pagination: Pagination,
    ) -> Result<Page<Report>, DomainError> {
        let (items, total) = self
            .reports
            .list(&scope.organization_id, filter, pagination)
            .await?;
        Ok(Page::new(items, total, pagination))
    }

    pub async fn get_report(&self, scope: &TenantScope, id: &Uuid) -> Result<Report, DomainError> {
        self.reports
            .find_by_id(&scope.organization_id, id)
            .await?
            .ok_or(DomainError::ReportNotFound(*id))
    }

    pub async fn create_report(&self, scope: &TenantScope, input: NewReport) -> Result<Report, DomainError> {
        scope.require_role(Role::Member)?;
        let report = Report::new(scope.organization_id, scope.user_id, input)?;
        let report = self.reports.create(&report).await?;
        info!(
            "Report {} ({}) created by {}",
            report.id,
            report.report_type.as_str(),
            scope.user_id
        );
        Ok(report)
    }

    pub async fn delete_report(&self, scope: &TenantScope, id: &Uuid) -> Result<(), DomainError> {
        scope.require_role(Role::Manager)?;
        if !self.reports.soft_delete(&scope.organization_id, id).await? {
            return Err(DomainError::ReportNotFound(*id));
        }
        info!("Report {} deleted by {}", id, scope.user_id);
        Ok(())
    }

    /// Run the generator and persist the outcome.
    ///
    /// Generator failures are stored on the report (`failed` + message) rather
    /// than returned; only lookup, locking and persistence errors propagate.
    /// A report stuck in `generating` past the stale window can be generated again.
    pub async fn generate_report(&self, scope: &TenantScope, id: &Uuid) -> Result<Report, DomainError> {
        scope.require_role(Role::Member)?;

        let existing = self.get_report(scope, id).await?;
        if existing.generation_in_progress(Utc::now(), self.stale_after) {
            return Err(DomainError::ReportAlreadyGenerating(*id));
        }

        // Lost race against a concurrent generate call
        let report = self
            .reports
            .begin_generation(&scope.organization_id, id, self.stale_after.num_seconds())
            .await?
            .ok_or(DomainError::ReportAlreadyGenerating(*id))?;

        // Detached: a dropped request (timeout, disconnect) must not strand the
        // report in `generating`.
        let task = tokio::spawn(run_generation(
            self.reports.clone(),
            self.generator.clone(),
            report,
            *scope,
        ));
        task.await
            .map_err(|e| DomainError::InternalError(format!("Report generation task failed: {}", e)))?
    }
}

async fn run_generation(
    reports: Arc<dyn ReportRepository>,
    generator: Arc<dyn ReportGenerator>,
    mut report: Report,
    scope: TenantScope,
) -> Result<Report, DomainError> {
    match generator.generate_report(&report, &scope).await {
        Ok(result) => {
            report.complete(result);
            info!("Report {} generated", report.id);
        }
        Err(e) => {
            warn!("Report {} generation failed: {}", report.id, e);
            report.fail(generation_message(e));
        }
    }

    match reports.update(&report).await {
        Ok(saved) => Ok(saved),
        Err(e) => {
            error!("Failed to store outcome of report {}: {}", report.id, e);
            let message = format!("Failed to store report result: {}", e);
            if let Err(abort) = reports
                .abort_generation(&report.organization_id, &report.id, &message)
                .await
            {
                error!("Failed to release report {} from generating: {}", report.id, abort);
            }
            Err(e)
        }
    }
}

fn generation_message(error: DomainError) -> String {
    match error {
        DomainError::ValidationError(msg) | DomainError::ReportGenerationFailed(msg) => msg,
        other => other.to_string(),
    }
}
