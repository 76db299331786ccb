pub mod corporate;
pub mod line_item;
pub mod payroll;
