use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use crate::api::response::{ApiError, ApiResponse};
use crate::repository::payroll::{NameFilter, PayrollSource};
use crate::utils::params::require_all;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FactoryQuery {
    /// Company name as stored in the company master
    #[param(example = "Acme")]
    pub corporate_name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    #[param(example = "Acme")]
    pub corporate_name: Option<String>,
    #[param(example = "Plant A")]
    pub factory_name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CorporateDataQuery {
    #[param(example = "Acme")]
    pub corporate_name: Option<String>,
    #[param(example = "Plant A")]
    pub factory_name: Option<String>,
    /// Salary month as stored in the salary records
    #[param(example = "2024-01")]
    pub month: Option<String>,
}

/// List company names
#[utoipa::path(
    get,
    path = "/api/corporates",
    responses(
        (status = 200, description = "Distinct company names", body = Object, example = json!({
            "success": true,
            "message": "Corporate names fetched successfully",
            "data": [{"corporate_name": "Acme"}]
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "success": false,
            "message": "Internal Server Error"
        }))
    ),
    tag = "Corporate"
)]
#[instrument(name = "list_corporates", skip(source))]
pub async fn list_corporates(source: web::Data<dyn PayrollSource>) -> Result<HttpResponse, ApiError> {
    let rows = source.corporate_names().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(rows).with_message("Corporate names fetched successfully")))
}

/// List factory names of a company
#[utoipa::path(
    get,
    path = "/api/factories",
    params(FactoryQuery),
    responses(
        (status = 200, description = "Distinct factory names, possibly empty", body = Object, example = json!({
            "success": true,
            "data": [{"factory_name": "Plant A"}]
        })),
        (status = 400, description = "Missing company name", body = Object, example = json!({
            "success": false,
            "message": "Corporate name is required."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Corporate"
)]
#[instrument(name = "list_factories", skip(source))]
pub async fn list_factories(
    source: web::Data<dyn PayrollSource>,
    query: web::Query<FactoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let [corporate_name] = require_all([&query.corporate_name], "Corporate name is required.")?;

    let rows = source.factory_names(corporate_name).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(rows)))
}

/// List salary months of a company's factory
#[utoipa::path(
    get,
    path = "/api/months",
    params(MonthQuery),
    responses(
        (status = 200, description = "Distinct months, possibly empty", body = Object, example = json!({
            "success": true,
            "data": [{"month": "2024-01"}]
        })),
        (status = 400, description = "Missing company or factory name", body = Object, example = json!({
            "success": false,
            "message": "Corporate name and factory name are required."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Corporate"
)]
#[instrument(name = "list_months", skip(source))]
pub async fn list_months(
    source: web::Data<dyn PayrollSource>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, ApiError> {
    let [corporate_name, factory_name] = require_all(
        [&query.corporate_name, &query.factory_name],
        "Corporate name and factory name are required.",
    )?;

    let rows = source.months(corporate_name, factory_name).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(rows)))
}

/// Salary records of a factory for one month
#[utoipa::path(
    get,
    path = "/api/corporate-data",
    params(CorporateDataQuery),
    responses(
        (status = 200, description = "One row per employee", body = Object, example = json!({
            "success": true,
            "data": [{"name": "Ravi Kumar", "net_payable": "23000"}]
        })),
        (status = 400, description = "Missing filter", body = Object, example = json!({
            "success": false,
            "message": "Corporate name, factory name, and month are required."
        })),
        (status = 404, description = "No salary records for the filters", body = Object, example = json!({
            "success": false,
            "message": "No employee data found for the selected filters."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Corporate"
)]
#[instrument(name = "corporate_data", skip(source))]
pub async fn corporate_data(
    source: web::Data<dyn PayrollSource>,
    query: web::Query<CorporateDataQuery>,
) -> Result<HttpResponse, ApiError> {
    let [corporate_name, factory_name, month] = require_all(
        [&query.corporate_name, &query.factory_name, &query.month],
        "Corporate name, factory name, and month are required.",
    )?;

    let filter = NameFilter {
        corporate_name: corporate_name.to_string(),
        factory_name: factory_name.to_string(),
        month: month.to_string(),
    };
    let rows = source.payroll_rows(&filter).await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound(
            "No employee data found for the selected filters.".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::data(rows)))
}
