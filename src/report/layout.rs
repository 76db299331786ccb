//! Six-column wage register grid.
//!
//! Every employee block has the same six columns. Variable-length item
//! lists are packed into fixed-width sub-grids, and the label block, built
//! once from the first employee, runs through the same packing so its
//! columns line up with the data below it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::line_item::LineItem;
use crate::model::payroll::ReportRow;
use crate::report::schema::{self, REGISTER_COLUMNS, Section};
use crate::report::shaper::ShapedRow;

/// Figure printed in the deduction column's total row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeductionSummary {
    /// Sum of the record's deduction items.
    #[default]
    Declared,
    /// Sum of the record's expense amounts.
    ExpenseSum,
}

impl FromStr for DeductionSummary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "declared" => Ok(Self::Declared),
            "expenses" | "expense_sum" => Ok(Self::ExpenseSum),
            other => Err(format!("unknown deduction summary {other:?}, expected \"declared\" or \"expenses\"")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub deduction_summary: DeductionSummary,
    pub payment_mode: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            deduction_summary: DeductionSummary::Declared,
            payment_mode: "Cash".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    pub colspan: u8,
    pub bold: bool,
    pub align_right: bool,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colspan: 1,
            bold: false,
            align_right: false,
        }
    }

    pub fn blank() -> Self {
        Self::new("")
    }

    fn span(mut self) -> Self {
        self.colspan = 2;
        self
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn right(mut self) -> Self {
        self.align_right = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubGrid {
    pub rows: Vec<Vec<Cell>>,
}

impl SubGrid {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// One table row of the register: a sub-grid per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub labels: bool,
    pub columns: Vec<SubGrid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportHeader {
    pub company_name: String,
    pub address: String,
    pub factory_name: String,
    pub month: String,
}

impl ReportHeader {
    pub fn from_row(row: &ReportRow) -> Self {
        let address = [&row.address, &row.district, &row.state]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            company_name: row.company_name.clone().unwrap_or_default(),
            address,
            factory_name: row.factory_name.clone().unwrap_or_default(),
            month: row.month.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WageRegister {
    pub header: ReportHeader,
    pub column_titles: Vec<&'static str>,
    pub blocks: Vec<Block>,
}

/// Whether cells carry values or, for the label block, their labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Labels,
    Values,
}

pub fn build_register(header: ReportHeader, rows: &[ShapedRow], options: &LayoutOptions) -> WageRegister {
    let mut blocks = Vec::with_capacity(rows.len() + 1);

    if let Some(first) = rows.first() {
        blocks.push(build_block(first, 0, Mode::Labels, options));
    }
    blocks.extend(
        rows.iter()
            .enumerate()
            .map(|(index, row)| build_block(row, index + 1, Mode::Values, options)),
    );

    WageRegister {
        header,
        column_titles: REGISTER_COLUMNS.iter().map(|&section| section.into()).collect(),
        blocks,
    }
}

fn build_block(row: &ShapedRow, sequence: usize, mode: Mode, options: &LayoutOptions) -> Block {
    let info_cells = info_cells(row, sequence, mode);
    let rate_cells = rate_cells(row.rate_items(), mode);
    let left_rows = info_cells.len().div_ceil(2).max(rate_cells.len().div_ceil(2));

    let employee_info = SubGrid {
        rows: pack_pairs(info_cells, left_rows),
    };
    let mut rate = SubGrid {
        rows: pack_pairs(rate_cells, left_rows),
    };
    rate.rows
        .push(summary_row(&schema::label_of(schema::GROSS_SALARY), &row.gross_salary, mode));

    let columns = REGISTER_COLUMNS
        .iter()
        .map(|section| match section {
            Section::EmployeeInfo => employee_info.clone(),
            Section::Rate => rate.clone(),
            Section::Payable => payable(row, mode),
            Section::Deduction => deduction(row, mode, options.deduction_summary),
            Section::Wages => wages(row, mode),
            Section::EmployerPart => employer_part(row, mode, &options.payment_mode),
            Section::HeaderOnce | Section::Excluded => SubGrid::default(),
        })
        .collect();

    Block {
        labels: mode == Mode::Labels,
        columns,
    }
}

fn info_cells(row: &ShapedRow, sequence: usize, mode: Mode) -> Vec<Cell> {
    row.info
        .iter()
        .enumerate()
        .map(|(i, field)| match mode {
            Mode::Labels => Cell::new(field.label.as_str()),
            Mode::Values if i == 0 => Cell::new(format!("{sequence}.")),
            Mode::Values => Cell::new(field.value.as_str()),
        })
        .collect()
}

/// Rate items flattened to `label, value, label, value, ...`.
fn rate_cells(items: &[LineItem], mode: Mode) -> Vec<Cell> {
    items
        .iter()
        .flat_map(|item| [Cell::new(item.label.as_str()), value_cell(item, mode).right()])
        .collect()
}

/// Packs cells two per row into exactly `rows` rows. A lone trailing cell
/// spans both sub-columns; rows past the end of the cells are blank.
fn pack_pairs(cells: Vec<Cell>, rows: usize) -> Vec<Vec<Cell>> {
    let mut cells = cells.into_iter();
    (0..rows)
        .map(|_| match (cells.next(), cells.next()) {
            (Some(a), Some(b)) => vec![a, b],
            (Some(a), None) => vec![a.span()],
            (None, _) => vec![Cell::blank(), Cell::blank()],
        })
        .collect()
}

fn payable(row: &ShapedRow, mode: Mode) -> SubGrid {
    let mut rows: Vec<Vec<Cell>> = row
        .earnings
        .chunks(2)
        .map(|pair| {
            let mut cells: Vec<Cell> = pair.iter().map(|item| value_cell(item, mode).right()).collect();
            if cells.len() == 1 {
                cells.push(Cell::blank());
            }
            cells
        })
        .collect();
    rows.push(net_payable_row(row, mode));
    SubGrid { rows }
}

fn deduction(row: &ShapedRow, mode: Mode, summary: DeductionSummary) -> SubGrid {
    let mut rows: Vec<Vec<Cell>> = row
        .deductions
        .iter()
        .map(|item| vec![Cell::new(item.label.as_str()), value_cell(item, mode).right()])
        .collect();

    let total = match summary {
        DeductionSummary::Declared => row.deduction_total,
        DeductionSummary::ExpenseSum => row.expense_total,
    };
    rows.push(summary_row(
        &schema::label_of(schema::DEDUCTION_TOTAL),
        &format_amount(total),
        mode,
    ));
    SubGrid { rows }
}

fn wages(row: &ShapedRow, mode: Mode) -> SubGrid {
    SubGrid {
        rows: vec![
            fixed_row(&schema::label_of(schema::PF), &format_amount(row.pf), mode),
            fixed_row(&schema::label_of(schema::ESIC), &format_amount(row.esic), mode),
            net_payable_row(row, mode),
        ],
    }
}

fn employer_part(row: &ShapedRow, mode: Mode, payment_mode: &str) -> SubGrid {
    let mut rows = vec![fixed_row(&schema::label_of(schema::PAYMENT_MODE), payment_mode, mode)];
    rows.extend(
        row.expenses
            .iter()
            .map(|item| vec![Cell::new(item.label.as_str()), value_cell(item, mode).right()]),
    );
    rows.push(net_payable_row(row, mode));
    SubGrid { rows }
}

fn net_payable_row(row: &ShapedRow, mode: Mode) -> Vec<Cell> {
    summary_row(&schema::label_of(schema::NET_PAYABLE), &row.net_payable, mode)
}

fn value_cell(item: &LineItem, mode: Mode) -> Cell {
    match mode {
        Mode::Labels => Cell::new(item.label.as_str()),
        Mode::Values => Cell::new(item.display()),
    }
}

fn fixed_row(label: &str, value: &str, mode: Mode) -> Vec<Cell> {
    let value = match mode {
        Mode::Labels => label,
        Mode::Values => value,
    };
    vec![Cell::new(label), Cell::new(value).right()]
}

fn summary_row(caption: &str, value: &str, mode: Mode) -> Vec<Cell> {
    match mode {
        Mode::Labels => vec![Cell::new(caption).bold().span()],
        Mode::Values => vec![Cell::new(caption), Cell::new(value).bold().right()],
    }
}

/// Whole amounts print without decimals, anything else with two.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

impl fmt::Display for DeductionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeductionSummary::Declared => f.write_str("declared"),
            DeductionSummary::ExpenseSum => f.write_str("expenses"),
        }
    }
}
