use derive_more::Display;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::model::line_item::{LineItem, display_value, numeric_value};
use crate::model::payroll::ReportRow;
use crate::report::schema::{self, Section};

/// Label of the synthetic first employee-info field; its value is the
/// employee's position in the report and is filled in by the layout.
pub const SEQUENCE_LABEL: &str = "S.No";

#[derive(Debug, Display)]
pub enum ShapeError {
    #[display(fmt = "malformed {} for employee {}: {}", field, employee, source)]
    MalformedField {
        field: &'static str,
        employee: String,
        source: serde_json::Error,
    },
    #[display(fmt = "could not read report row: {}", _0)]
    Row(serde_json::Error),
}

impl std::error::Error for ShapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShapeError::MalformedField { source, .. } => Some(source),
            ShapeError::Row(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoField {
    pub label: String,
    pub value: String,
}

/// One salary record with its JSON columns parsed and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRow {
    pub info: Vec<InfoField>,
    pub fixed_inputs: Vec<LineItem>,
    pub earnings: Vec<LineItem>,
    pub deductions: Vec<LineItem>,
    pub expenses: Vec<LineItem>,
    pub pf: f64,
    pub esic: f64,
    pub deduction_total: f64,
    pub expense_total: f64,
    pub gross_salary: String,
    pub net_payable: String,
}

impl ShapedRow {
    /// Items shown in the rate column. Records without a fixed-input
    /// breakdown are rated on their earnings.
    pub fn rate_items(&self) -> &[LineItem] {
        if self.fixed_inputs.is_empty() {
            &self.earnings
        } else {
            &self.fixed_inputs
        }
    }
}

/// Shapes every row, failing the whole batch on the first malformed record.
pub fn shape_rows(rows: &[ReportRow]) -> Result<Vec<ShapedRow>, ShapeError> {
    rows.iter().map(shape_row).collect()
}

pub fn shape_row(row: &ReportRow) -> Result<ShapedRow, ShapeError> {
    let employee = row.employee_ref();

    let earnings: Vec<LineItem> = parse_json(row.earning_details.as_deref(), "earning_details", &employee)?;
    let deductions: Vec<LineItem> =
        parse_json(row.deduction_details.as_deref(), "deduction_details", &employee)?;
    let fixed_inputs: Vec<LineItem> =
        parse_json(row.fixed_input_details.as_deref(), "fixed_input_details", &employee)?;
    let expenses: Vec<LineItem> = parse_json(row.expense_details.as_deref(), "expense_details", &employee)?;
    let pf_esic: Map<String, Value> = parse_json(row.pf_esic_details.as_deref(), "pf_esic_details", &employee)?;

    Ok(ShapedRow {
        info: employee_info(row)?,
        pf: map_amount(&pf_esic, "PF"),
        esic: map_amount(&pf_esic, "ESIC"),
        deduction_total: deductions.iter().map(LineItem::amount).sum(),
        expense_total: expenses.iter().map(LineItem::amount).sum(),
        gross_salary: row.gross_salary_structure.clone().unwrap_or_default(),
        net_payable: row.net_payable.clone().unwrap_or_default(),
        fixed_inputs,
        earnings,
        deductions,
        expenses,
    })
}

/// Parses an optional JSON column. SQL NULL, a blank string and JSON `null`
/// all yield the empty default.
fn parse_json<T>(raw: Option<&str>, field: &'static str, employee: &str) -> Result<T, ShapeError>
where
    T: DeserializeOwned + Default,
{
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(T::default());
    };

    serde_json::from_str::<Option<T>>(text)
        .map(Option::unwrap_or_default)
        .map_err(|source| ShapeError::MalformedField {
            field,
            employee: employee.to_string(),
            source,
        })
}

fn map_amount(map: &Map<String, Value>, key: &str) -> f64 {
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map_or(0.0, |(_, v)| numeric_value(v))
}

/// Non-null scalar columns the schema files under employee info, in column
/// order, behind the sequence placeholder.
pub fn employee_info(row: &ReportRow) -> Result<Vec<InfoField>, ShapeError> {
    let Value::Object(columns) = serde_json::to_value(row).map_err(ShapeError::Row)? else {
        return Ok(Vec::new());
    };

    let mut info = vec![InfoField {
        label: SEQUENCE_LABEL.to_string(),
        value: String::new(),
    }];

    info.extend(
        columns
            .iter()
            .filter(|(key, _)| schema::section_of(key) == Section::EmployeeInfo)
            .filter(|(_, value)| !value.is_null() && !value.is_object() && !value.is_array())
            .map(|(key, value)| InfoField {
                label: schema::label_of(key),
                value: display_value(value),
            }),
    );

    Ok(info)
}
