use std::io;

use tracing::debug;

use crate::{
    budget::Breakdown,
    config::ReportConfig,
    errors::{BudgetError, Result},
};

pub fn write_csv<W: io::Write>(
    breakdown: &Breakdown,
    config: &ReportConfig,
    writer: W,
) -> Result<()> {
    config.validate()?;
    let mut out = csv::WriterBuilder::new()
        .delimiter(config.delimiter_byte())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    out.write_record(breakdown.header())?;
    for row in breakdown.rows() {
        let mut record = Vec::with_capacity(row.values.len() + 3);
        record.push(config.format_date(row.date));
        record.extend(row.values.iter().map(i64::to_string));
        record.push(row.daily_total.to_string());
        record.push(row.cumulative_total.to_string());
        out.write_record(&record)?;
    }
    out.flush()?;
    debug!(rows = breakdown.len(), "wrote breakdown csv");
    Ok(())
}

pub fn to_csv_string(breakdown: &Breakdown, config: &ReportConfig) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(breakdown, config, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|err| BudgetError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}
