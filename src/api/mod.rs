pub mod corporate;
pub mod report;
pub mod response;

#[cfg(test)]
mod tests;
