//! CSV output for time series

use crate::error::{Error, Result};
use ndarray::ArrayView1;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write one or more equally long series as CSV with a leading `minute` column
pub fn write_series_csv<P: AsRef<Path>>(path: P, columns: &[(&str, ArrayView1<'_, f64>)]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_series_csv_to(&mut writer, columns)?;
    writer.flush()?;
    Ok(())
}

/// Write series as CSV into any writer
pub fn write_series_csv_to<W: Write>(writer: &mut W, columns: &[(&str, ArrayView1<'_, f64>)]) -> Result<()> {
    let len = columns.first().map_or(0, |(_, series)| series.len());
    if let Some((_, series)) = columns.iter().find(|(_, series)| series.len() != len) {
        return Err(Error::LengthMismatch {
            expected: len,
            actual: series.len(),
        });
    }

    write!(writer, "minute")?;
    for (name, _) in columns {
        write!(writer, ",{}", name)?;
    }
    writeln!(writer)?;

    for i in 0..len {
        write!(writer, "{}", i)?;
        for (_, series) in columns {
            write!(writer, ",{}", series[i])?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
