pub mod us_eastern;
