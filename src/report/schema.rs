//! Where each column of the report query lands in the wage register.

use strum::{Display, IntoStaticStr};

/// Register columns, plus the two places a query column can go instead.
/// The display form is the column title printed in the table head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum Section {
    /// Printed once above the table.
    #[strum(serialize = "Header")]
    HeaderOnce,
    /// One cell per field in the first column of every employee block.
    #[strum(serialize = "Employee Info")]
    EmployeeInfo,
    Rate,
    Payable,
    Deduction,
    Wages,
    #[strum(serialize = "Employer Part")]
    EmployerPart,
    Excluded,
}

/// Left-to-right column order of the register.
pub const REGISTER_COLUMNS: [Section; 6] = [
    Section::EmployeeInfo,
    Section::Rate,
    Section::Payable,
    Section::Deduction,
    Section::Wages,
    Section::EmployerPart,
];

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub column: &'static str,
    pub label: &'static str,
    pub section: Section,
}

const fn field(column: &'static str, label: &'static str, section: Section) -> FieldSpec {
    FieldSpec {
        column,
        label,
        section,
    }
}

pub const GROSS_SALARY: &str = "gross_salary_structure";
pub const NET_PAYABLE: &str = "net_payable";

// Figures the layout derives per row; they have no query column.
pub const DEDUCTION_TOTAL: &str = "deduction_total";
pub const PF: &str = "pf";
pub const ESIC: &str = "esic";
pub const PAYMENT_MODE: &str = "payment_mode";

pub static REPORT_FIELDS: &[FieldSpec] = &[
    field("company_name", "Company", Section::HeaderOnce),
    field("address", "Address", Section::HeaderOnce),
    field("district", "District", Section::HeaderOnce),
    field("state", "State", Section::HeaderOnce),
    field("factory_name", "Factory", Section::HeaderOnce),
    field("month", "Month", Section::HeaderOnce),
    field("company_id", "Company Id", Section::Excluded),
    field("factory_id", "Factory Id", Section::Excluded),
    field("structure_id", "Structure Id", Section::Excluded),
    field("factory_employee_id", "Emp. Code", Section::EmployeeInfo),
    field("corporate_employee_id", "Corp. Code", Section::EmployeeInfo),
    field("name", "Name", Section::EmployeeInfo),
    field("father_name", "Father's Name", Section::EmployeeInfo),
    field("joining_date", "D.O.J.", Section::EmployeeInfo),
    field("gender", "Gender", Section::EmployeeInfo),
    field("department", "Department", Section::EmployeeInfo),
    field("designation", "Designation", Section::EmployeeInfo),
    field("location", "Location", Section::EmployeeInfo),
    field("uan", "UAN", Section::EmployeeInfo),
    field("esic_number", "ESIC No.", Section::EmployeeInfo),
    field("aadhar", "Aadhar", Section::EmployeeInfo),
    field("bank_account", "Bank A/c", Section::EmployeeInfo),
    field("salary", "Salary", Section::Excluded),
    field("fixed_input_details", "Rate", Section::Rate),
    field(GROSS_SALARY, "Gross", Section::Rate),
    field("earning_details", "Payable", Section::Payable),
    field(NET_PAYABLE, "Net Payable", Section::Payable),
    field("deduction_details", "Deduction", Section::Deduction),
    field(DEDUCTION_TOTAL, "Total Deduction", Section::Deduction),
    field("pf_esic_details", "PF/ESIC", Section::Wages),
    field(PF, "PF", Section::Wages),
    field(ESIC, "ESIC", Section::Wages),
    field(PAYMENT_MODE, "Payment Mode", Section::EmployerPart),
    field("expense_details", "Expenses", Section::EmployerPart),
    field("month_details", "Month Details", Section::Excluded),
    field("pf_challan_details", "PF Challan", Section::Excluded),
    field("esic_challan_details", "ESIC Challan", Section::Excluded),
];

pub fn lookup(column: &str) -> Option<&'static FieldSpec> {
    REPORT_FIELDS.iter().find(|f| f.column == column)
}

/// Columns the schema does not know about are treated as employee info.
pub fn section_of(column: &str) -> Section {
    lookup(column).map_or(Section::EmployeeInfo, |f| f.section)
}

/// Display label for a column, falling back to a title-cased column name.
pub fn label_of(column: &str) -> String {
    match lookup(column) {
        Some(f) => f.label.to_string(),
        None => column
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}
