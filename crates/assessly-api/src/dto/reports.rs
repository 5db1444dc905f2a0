use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use assessly_core::{NewReport, ReportFilter, ReportStatus, ReportType};
use assessly_shared::Pagination;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReportListQuery {
    #[validate(range(min = 1, message = "Page starts at 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<u32>,
    pub report_type: Option<ReportType>,
    pub status: Option<ReportStatus>,
}

impl ReportListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    pub fn filter(&self) -> ReportFilter {
        ReportFilter {
            report_type: self.report_type,
            status: self.status,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportRequest {
    #[validate(length(min = 3, max = 200, message = "Report name must be between 3 and 200 characters"))]
    pub name: String,
    pub report_type: ReportType,
    pub parameters: Option<Value>,
}

impl From<CreateReportRequest> for NewReport {
    fn from(req: CreateReportRequest) -> Self {
        NewReport {
            name: req.name,
            report_type: req.report_type,
            parameters: req.parameters,
        }
    }
}
