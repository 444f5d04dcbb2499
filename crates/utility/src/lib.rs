pub mod let_also;
