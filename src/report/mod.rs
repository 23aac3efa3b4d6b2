//! Writers that render a [`Breakdown`](crate::budget::Breakdown).

pub mod console;
pub mod csv;
pub mod plot;
pub mod sheet;

pub use self::csv::{to_csv_string, write_csv};
pub use console::render_table;
pub use plot::{render_svg, series, ChartPoint};
pub use sheet::FormulaSheet;
