use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::IntoParams;

use crate::api::response::{ApiError, ApiResponse};
use crate::config::Config;
use crate::pdf::{PdfRenderer, WAGE_REGISTER_PAGE};
use crate::report::html::HtmlRenderer;
use crate::report::layout::{LayoutOptions, ReportHeader, build_register};
use crate::report::shaper::shape_rows;
use crate::report::storage::ReportStore;
use crate::repository::payroll::{PayrollSource, ReportFilter};
use crate::utils::params::{parse_id, present, require_all};

const NON_NUMERIC_MESSAGE: &str = "Corporate id, factory id, and structure id must be numeric.";

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    #[param(example = "1")]
    pub corporate_id: Option<String>,
    #[param(example = "2")]
    pub factory_id: Option<String>,
    #[param(example = "2024-02")]
    pub month: Option<String>,
    /// Restricts the report to one salary structure
    #[param(example = "7")]
    pub structure_id: Option<String>,
}

impl ReportQuery {
    fn filter(&self) -> Result<ReportFilter, ApiError> {
        let [company_id, factory_id, month] = require_all(
            [&self.corporate_id, &self.factory_id, &self.month],
            "Corporate id, factory id, and month are required.",
        )?;

        Ok(ReportFilter {
            company_id: parse_id(company_id, NON_NUMERIC_MESSAGE)?,
            factory_id: parse_id(factory_id, NON_NUMERIC_MESSAGE)?,
            month: month.to_string(),
            structure_id: present(&self.structure_id)
                .map(|id| parse_id(id, NON_NUMERIC_MESSAGE))
                .transpose()?,
        })
    }
}

/// Everything the report endpoint needs besides the data source and the
/// rendering backend.
pub struct ReportContext {
    pub store: ReportStore,
    pub html: HtmlRenderer,
    pub layout: LayoutOptions,
}

impl ReportContext {
    pub fn from_config(config: &Config) -> Result<Self, tera::Error> {
        Ok(Self {
            store: ReportStore::new(
                config.reports_dir.clone(),
                config.reports_url_prefix.clone(),
                config.report_file_prefix.clone(),
            ),
            html: HtmlRenderer::new()?,
            layout: LayoutOptions {
                deduction_summary: config.deduction_summary,
                payment_mode: config.payment_mode.clone(),
            },
        })
    }
}

/// Generate the wage register PDF
#[utoipa::path(
    get,
    path = "/api/corporate-data-params",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report written; path is served statically", body = Object, example = json!({
            "success": true,
            "message": "Report generated successfully",
            "filePath": "/reports/report-1706774400000.pdf"
        })),
        (status = 400, description = "Missing or non-numeric filter", body = Object, example = json!({
            "success": false,
            "message": "Corporate id, factory id, and month are required."
        })),
        (status = 404, description = "No salary records for the filters", body = Object, example = json!({
            "success": false,
            "message": "No data found for the selected filters."
        })),
        (status = 429, description = "Too many report requests"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "success": false,
            "message": "Internal Server Error"
        }))
    ),
    tag = "Report"
)]
#[instrument(name = "generate_report", skip(source, renderer, reports))]
pub async fn generate_report(
    source: web::Data<dyn PayrollSource>,
    renderer: web::Data<dyn PdfRenderer>,
    reports: web::Data<ReportContext>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = query.filter()?;

    let rows = source.report_rows(&filter).await?;
    let Some(first) = rows.first() else {
        return Err(ApiError::NotFound("No data found for the selected filters.".to_string()));
    };

    let shaped = shape_rows(&rows)?;
    let register = build_register(ReportHeader::from_row(first), &shaped, &reports.layout);
    let html = reports.html.render(&register, &WAGE_REGISTER_PAGE)?;

    let pending = reports.store.allocate().await?;
    renderer.render(&html, pending.staging_path()).await?;
    let file = pending.commit().await?;

    info!(
        company_id = filter.company_id,
        factory_id = filter.factory_id,
        month = %filter.month,
        employees = rows.len(),
        file = %file.public_path,
        "Report generated"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::file(file.public_path, "Report generated successfully")))
}
