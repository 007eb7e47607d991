pub mod date;
pub mod ddb;
pub mod mem;
#[cfg(test)]
pub mod fixtures;
