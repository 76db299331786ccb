use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::MySqlPool;
use tracing::debug;

use crate::model::corporate::{CorporateName, FactoryName, SalaryMonth};
use crate::model::payroll::{PayrollRow, ReportRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    pub corporate_name: String,
    pub factory_name: String,
    pub month: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    pub company_id: u64,
    pub factory_id: u64,
    pub month: String,
    pub structure_id: Option<u64>,
}

/// Read-only lookups against the payroll tables.
pub trait PayrollSource: Send + Sync {
    fn corporate_names(&self) -> BoxFuture<'_, Result<Vec<CorporateName>, sqlx::Error>>;

    fn factory_names<'a>(
        &'a self,
        corporate_name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<FactoryName>, sqlx::Error>>;

    fn months<'a>(
        &'a self,
        corporate_name: &'a str,
        factory_name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SalaryMonth>, sqlx::Error>>;

    fn payroll_rows<'a>(
        &'a self,
        filter: &'a NameFilter,
    ) -> BoxFuture<'a, Result<Vec<PayrollRow>, sqlx::Error>>;

    fn report_rows<'a>(
        &'a self,
        filter: &'a ReportFilter,
    ) -> BoxFuture<'a, Result<Vec<ReportRow>, sqlx::Error>>;
}

const CORPORATE_NAMES_SQL: &str = r#"
    SELECT DISTINCT NAME AS corporate_name
    FROM corporate_hrms_company_master
"#;

const FACTORY_NAMES_SQL: &str = r#"
    SELECT DISTINCT T2.FACTORY_NAME AS factory_name
    FROM corporate_hrms_company_master AS T1
    JOIN corporate_hrms_factory AS T2 ON T1.COMPANY_ID = T2.COMPANY_ID
    WHERE T1.NAME = ?
"#;

const MONTHS_SQL: &str = r#"
    SELECT DISTINCT CAST(T3.MONTH AS CHAR) AS month
    FROM corporate_hrms_company_master AS T1
    JOIN corporate_hrms_factory AS T2 ON T1.COMPANY_ID = T2.COMPANY_ID
    JOIN corporate_hrms_salary_data AS T3
        ON T1.COMPANY_ID = T3.COMPANY_ID AND T2.FACTORY_ID = T3.TAG_ID
    WHERE T1.NAME = ? AND T2.FACTORY_NAME = ?
"#;

const PAYROLL_ROWS_SQL: &str = r#"
    SELECT
        CAST(T4.FACTORY_EMPLOYEE_ID AS CHAR) AS factory_employee_id,
        CAST(T4.CORPORATE_EMPLOYEE_ID AS CHAR) AS corporate_employee_id,
        T4.NAME AS name,
        T4.FATHER_NAME AS father_name,
        CAST(T4.JOINING_DATE AS CHAR) AS joining_date,
        CAST(T4.UAN AS CHAR) AS uan,
        CAST(T4.ESIC_NUMBER AS CHAR) AS esic_number,
        CAST(T4.AADHAR AS CHAR) AS aadhar,
        CAST(T4.SALARY AS CHAR) AS salary,
        JSON_UNQUOTE(JSON_EXTRACT(T4.ADDITIONAL_DETAILS, '$.department')) AS department,
        JSON_UNQUOTE(JSON_EXTRACT(T4.ADDITIONAL_DETAILS, '$.designation')) AS designation,
        JSON_UNQUOTE(JSON_EXTRACT(T4.ADDITIONAL_DETAILS, '$.location')) AS location,
        T4.GENDER AS gender,

        CAST(T3.GROSS_SALARY AS CHAR) AS gross_salary_structure,
        CAST(T3.NET_PAYABLE AS CHAR) AS net_payable,
        CAST(T3.MONTH_DETAILS AS CHAR) AS month_details,
        CAST(T3.FIXED_INPUT_DETAILS AS CHAR) AS fixed_input_details,
        CAST(T3.EARNING_DETAILS AS CHAR) AS earning_details,
        CAST(T3.DEDUCTION_DETAILS AS CHAR) AS deduction_details,
        CAST(T3.PF_ESIC AS CHAR) AS pf_esic_details,
        CAST(T3.PF_CHALLAN_DETAILS AS CHAR) AS pf_challan_details,
        CAST(T3.ESIC_CHALLAN_DETAILS AS CHAR) AS esic_challan_details,
        CAST(T3.EXPENSE_DETAILS AS CHAR) AS expense_details
    FROM corporate_hrms_company_master AS T1
    INNER JOIN corporate_hrms_factory AS T2
        ON T1.COMPANY_ID = T2.COMPANY_ID
    INNER JOIN corporate_hrms_salary_data AS T3
        ON T1.COMPANY_ID = T3.COMPANY_ID
        AND T2.FACTORY_ID = T3.TAG_ID
    INNER JOIN corporate_hrms_employee_master AS T4
        ON T3.EMPLOYEE_ID = T4.EMPLOYEE_ID
    WHERE T1.NAME = ?
    AND T2.FACTORY_NAME = ?
    AND T3.MONTH = ?
"#;

const REPORT_ROWS_SQL: &str = r#"
    SELECT
        T1.NAME AS company_name,
        T1.ADDRESS AS address,
        T1.DISTRICT AS district,
        T1.STATE AS state,
        T2.FACTORY_NAME AS factory_name,
        CAST(T3.MONTH AS CHAR) AS month,

        CAST(T1.COMPANY_ID AS CHAR) AS company_id,
        CAST(T2.FACTORY_ID AS CHAR) AS factory_id,
        CAST(T3.STRUCTURE_ID AS CHAR) AS structure_id,

        CAST(T4.FACTORY_EMPLOYEE_ID AS CHAR) AS factory_employee_id,
        CAST(T4.CORPORATE_EMPLOYEE_ID AS CHAR) AS corporate_employee_id,
        T4.NAME AS name,
        T4.FATHER_NAME AS father_name,
        CAST(T4.JOINING_DATE AS CHAR) AS joining_date,
        T4.GENDER AS gender,
        JSON_UNQUOTE(JSON_EXTRACT(T4.ADDITIONAL_DETAILS, '$.department')) AS department,
        JSON_UNQUOTE(JSON_EXTRACT(T4.ADDITIONAL_DETAILS, '$.designation')) AS designation,
        JSON_UNQUOTE(JSON_EXTRACT(T4.ADDITIONAL_DETAILS, '$.location')) AS location,
        CAST(T4.UAN AS CHAR) AS uan,
        CAST(T4.ESIC_NUMBER AS CHAR) AS esic_number,
        CAST(T4.AADHAR AS CHAR) AS aadhar,
        CAST(T4.BANK_ACCOUNT AS CHAR) AS bank_account,
        CAST(T4.SALARY AS CHAR) AS salary,

        CAST(T3.GROSS_SALARY AS CHAR) AS gross_salary_structure,
        CAST(T3.NET_PAYABLE AS CHAR) AS net_payable,
        CAST(T3.MONTH_DETAILS AS CHAR) AS month_details,
        CAST(T3.FIXED_INPUT_DETAILS AS CHAR) AS fixed_input_details,
        CAST(T3.EARNING_DETAILS AS CHAR) AS earning_details,
        CAST(T3.DEDUCTION_DETAILS AS CHAR) AS deduction_details,
        CAST(T3.PF_ESIC AS CHAR) AS pf_esic_details,
        CAST(T3.PF_CHALLAN_DETAILS AS CHAR) AS pf_challan_details,
        CAST(T3.ESIC_CHALLAN_DETAILS AS CHAR) AS esic_challan_details,
        CAST(T3.EXPENSE_DETAILS AS CHAR) AS expense_details
    FROM corporate_hrms_company_master AS T1
    INNER JOIN corporate_hrms_factory AS T2
        ON T1.COMPANY_ID = T2.COMPANY_ID
    INNER JOIN corporate_hrms_salary_data AS T3
        ON T1.COMPANY_ID = T3.COMPANY_ID
        AND T2.FACTORY_ID = T3.TAG_ID
    INNER JOIN corporate_hrms_employee_master AS T4
        ON T3.EMPLOYEE_ID = T4.EMPLOYEE_ID
    WHERE T1.COMPANY_ID = ?
    AND T2.FACTORY_ID = ?
    AND T3.MONTH = ?
"#;

/// Appends the optional structure predicate and a stable employee order.
fn report_rows_sql(with_structure: bool) -> String {
    let mut sql = String::from(REPORT_ROWS_SQL);
    if with_structure {
        sql.push_str("    AND T3.STRUCTURE_ID = ?\n");
    }
    sql.push_str("    ORDER BY T4.EMPLOYEE_ID\n");
    sql
}

#[derive(Clone)]
pub struct MySqlPayrollSource {
    pool: MySqlPool,
}

impl MySqlPayrollSource {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl PayrollSource for MySqlPayrollSource {
    fn corporate_names(&self) -> BoxFuture<'_, Result<Vec<CorporateName>, sqlx::Error>> {
        async move {
            sqlx::query_as::<_, CorporateName>(CORPORATE_NAMES_SQL)
                .fetch_all(&self.pool)
                .await
        }
        .boxed()
    }

    fn factory_names<'a>(
        &'a self,
        corporate_name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<FactoryName>, sqlx::Error>> {
        async move {
            sqlx::query_as::<_, FactoryName>(FACTORY_NAMES_SQL)
                .bind(corporate_name)
                .fetch_all(&self.pool)
                .await
        }
        .boxed()
    }

    fn months<'a>(
        &'a self,
        corporate_name: &'a str,
        factory_name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SalaryMonth>, sqlx::Error>> {
        async move {
            sqlx::query_as::<_, SalaryMonth>(MONTHS_SQL)
                .bind(corporate_name)
                .bind(factory_name)
                .fetch_all(&self.pool)
                .await
        }
        .boxed()
    }

    fn payroll_rows<'a>(
        &'a self,
        filter: &'a NameFilter,
    ) -> BoxFuture<'a, Result<Vec<PayrollRow>, sqlx::Error>> {
        async move {
            debug!(?filter, "Fetching payroll rows");
            sqlx::query_as::<_, PayrollRow>(PAYROLL_ROWS_SQL)
                .bind(&filter.corporate_name)
                .bind(&filter.factory_name)
                .bind(&filter.month)
                .fetch_all(&self.pool)
                .await
        }
        .boxed()
    }

    fn report_rows<'a>(
        &'a self,
        filter: &'a ReportFilter,
    ) -> BoxFuture<'a, Result<Vec<ReportRow>, sqlx::Error>> {
        async move {
            let sql = report_rows_sql(filter.structure_id.is_some());
            debug!(?filter, "Fetching report rows");

            let mut query = sqlx::query_as::<_, ReportRow>(&sql)
                .bind(filter.company_id)
                .bind(filter.factory_id)
                .bind(&filter.month);
            if let Some(structure_id) = filter.structure_id {
                query = query.bind(structure_id);
            }

            query.fetch_all(&self.pool).await
        }
        .boxed()
    }
}
