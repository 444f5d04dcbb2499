//! The sinks a pipeline run can write to.

mod csv;
mod database;
mod stdout;

pub use self::csv::CsvWriterBatch;
pub use self::database::DatabaseWriterBatch;
pub use self::stdout::StdOutWriterBatch;
