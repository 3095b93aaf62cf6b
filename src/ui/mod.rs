pub mod output;
pub mod table;

pub use output::{dim, error, header, info, success, warn, Icons};
pub use table::{counts_table, rows_table, stats_table};
