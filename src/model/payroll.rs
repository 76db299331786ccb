use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employee's salary record for a period, looked up by company and
/// factory name. Every column arrives as text so values are passed through
/// exactly as stored, embedded JSON included.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "factory_employee_id": "F-0042",
    "corporate_employee_id": "C-1042",
    "name": "Ravi Kumar",
    "father_name": "Mohan Kumar",
    "joining_date": "2021-04-01",
    "uan": "100200300400",
    "esic_number": "3100456789",
    "aadhar": "123412341234",
    "salary": "{\"basic\":20000}",
    "department": "Assembly",
    "designation": "Operator",
    "location": "Pune",
    "gender": "Male",
    "gross_salary_structure": "25000",
    "net_payable": "23000",
    "month_details": null,
    "fixed_input_details": null,
    "earning_details": "[{\"title\":\"BASIC\",\"answer\":20000},{\"title\":\"HRA\",\"answer\":5000}]",
    "deduction_details": "[{\"title\":\"PF\",\"answer\":1800}]",
    "pf_esic_details": "{\"PF\":1800,\"ESIC\":200}",
    "pf_challan_details": null,
    "esic_challan_details": null,
    "expense_details": null
}))]
pub struct PayrollRow {
    pub factory_employee_id: Option<String>,
    pub corporate_employee_id: Option<String>,
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub joining_date: Option<String>,
    pub uan: Option<String>,
    pub esic_number: Option<String>,
    pub aadhar: Option<String>,
    pub salary: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub location: Option<String>,
    pub gender: Option<String>,

    pub gross_salary_structure: Option<String>,
    pub net_payable: Option<String>,
    pub month_details: Option<String>,
    pub fixed_input_details: Option<String>,
    pub earning_details: Option<String>,
    pub deduction_details: Option<String>,
    pub pf_esic_details: Option<String>,
    pub pf_challan_details: Option<String>,
    pub esic_challan_details: Option<String>,
    pub expense_details: Option<String>,
}

/// Input row of the wage register, looked up by numeric keys.
///
/// Field order is the column order of the report query and drives the order
/// of the employee-info block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReportRow {
    // Printed once in the report header
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub factory_name: Option<String>,
    pub month: Option<String>,

    pub company_id: Option<String>,
    pub factory_id: Option<String>,
    pub structure_id: Option<String>,

    pub factory_employee_id: Option<String>,
    pub corporate_employee_id: Option<String>,
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub joining_date: Option<String>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub location: Option<String>,
    pub uan: Option<String>,
    pub esic_number: Option<String>,
    pub aadhar: Option<String>,
    pub bank_account: Option<String>,
    pub salary: Option<String>,

    pub gross_salary_structure: Option<String>,
    pub net_payable: Option<String>,
    pub month_details: Option<String>,
    pub fixed_input_details: Option<String>,
    pub earning_details: Option<String>,
    pub deduction_details: Option<String>,
    pub pf_esic_details: Option<String>,
    pub pf_challan_details: Option<String>,
    pub esic_challan_details: Option<String>,
    pub expense_details: Option<String>,
}

impl ReportRow {
    /// Identifies the employee in error messages and logs.
    pub fn employee_ref(&self) -> String {
        self.factory_employee_id
            .as_deref()
            .or(self.corporate_employee_id.as_deref())
            .or(self.name.as_deref())
            .unwrap_or("<unknown>")
            .to_string()
    }
}
