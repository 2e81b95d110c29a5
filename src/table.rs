//! Score-bucketed confusion matrix tables.
//!
//! Predicted overlaps are first tallied into a [`DeltaTable`], with one row
//! per score bucket. The [`CumulativeTable`] then accumulates those rows
//! against the ground truth totals, producing one confusion matrix per score
//! cutoff.

pub mod cumulative;
pub mod delta;

use std::io;
use std::io::Write;

pub use cumulative::Table as CumulativeTable;
pub use delta::Table as DeltaTable;

/// The delimiter between the fields of a table row.
pub const DELIMITER: char = '\t';

/// Writes the fields of a row joined by [`DELIMITER`] and followed by a newline.
fn write_fields<W, I>(writer: &mut W, fields: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator,
    I::Item: std::fmt::Display,
{
    let line = fields
        .into_iter()
        .map(|field| field.to_string())
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string());

    writeln!(writer, "{}", line)
}
