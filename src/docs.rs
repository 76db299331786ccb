use crate::model::corporate::{CorporateName, FactoryName, SalaryMonth};
use crate::model::payroll::PayrollRow;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wage Register API",
        version = "0.1.0",
        description = r#"
## Wage Register

Read-only lookups over the corporate HRMS payroll database and a printable
**wage register** for one factory and month.

### Lookups
- Companies, their factories, and the months with salary records
- Raw salary records for a factory and month, embedded JSON included

### Report
`/corporate-data-params` lays every employee of the period out in a six-column
register (employee info, rate, payable, deduction, wages, employer part),
prints it to an A4 landscape PDF and returns the path it is served from.

### Response Format
Every endpoint answers with `{success, message?, data?, filePath?}`.
"#,
    ),
    paths(
        crate::api::corporate::list_corporates,
        crate::api::corporate::list_factories,
        crate::api::corporate::list_months,
        crate::api::corporate::corporate_data,
        crate::api::report::generate_report,
    ),
    components(schemas(CorporateName, FactoryName, SalaryMonth, PayrollRow)),
    tags(
        (name = "Corporate", description = "Company, factory, month and salary record lookups"),
        (name = "Report", description = "Wage register PDF generation"),
    )
)]
pub struct ApiDoc;
