//! A reader for delimited record files.

use std::ffi::OsStr;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::{self};
use std::iter;
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::line;
use crate::line::Line;
use crate::record::scored;
use crate::record::scored::GroundTruthTotals;
use crate::record::Record;
use crate::record::ScoredRecord;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// An error related to a [`Reader`].
#[derive(Debug)]
pub enum Error<E> {
    /// An I/O error.
    Io(io::Error),

    /// A line error.
    Line(line::ParseError<E>),
}

impl<E> std::fmt::Display for Error<E>
where
    E: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Line(err) => write!(f, "line error: {err}"),
        }
    }
}

impl<E> std::error::Error for Error<E> where E: std::error::Error {}

/// A reader for delimited record files.
#[derive(Clone, Debug)]
pub struct Reader<T>
where
    T: BufRead,
{
    /// The inner reader.
    inner: T,

    /// The field delimiter, if it differs from the record's default.
    delimiter: Option<char>,
}

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a reader that splits fields on each record's default
    /// delimiter.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"q\tt\t-10\t100\n";
    /// let reader = pbove::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self::from(inner)
    }

    /// Sets the field delimiter.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::AlignmentRecord;
    ///
    /// let data = b"m1/1/0_500,chr1,-100,90.0,+,0,500,500,+,100,600,10000,254\n";
    /// let mut reader = pbove::Reader::new(&data[..]).with_delimiter(',');
    ///
    /// let records = reader
    ///     .records::<AlignmentRecord>()
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(records.len(), 1);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Gets a reference to the inner reader.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Gets a mutable reference to the inner reader.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consumes self and returns the inner reader.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Reads a raw, textual line from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b"#comment\r\nq\tt\t-10\t100";
    /// let mut reader = pbove::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 10);
    /// assert_eq!(buffer, "#comment");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 11);
    /// assert_eq!(buffer, "q\tt\t-10\t100");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 0);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        read_line(self.inner_mut(), buffer)
    }

    /// Attempts to read a [`Line`] from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::line::Line;
    /// use pbove::record::ScoredRecord;
    ///
    /// let data = b"qname\ttname\tscore\toverlap\nq\tt\t-10\t100";
    /// let mut reader = pbove::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    /// assert!(matches!(
    ///     reader.read_line::<ScoredRecord>(&mut buffer)?,
    ///     Some(Line::Header)
    /// ));
    /// assert!(matches!(
    ///     reader.read_line::<ScoredRecord>(&mut buffer)?,
    ///     Some(Line::Record(_))
    /// ));
    /// assert!(reader.read_line::<ScoredRecord>(&mut buffer)?.is_none());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read_line<R>(
        &mut self,
        buffer: &mut String,
    ) -> Result<Option<Line<R>>, Error<R::ParseError>>
    where
        R: Record,
    {
        let read = self.read_line_raw(buffer).map_err(Error::Io)?;
        let delimiter = self.delimiter.unwrap_or(R::DEFAULT_DELIMITER);

        match read {
            0 => Ok(None),
            _ => {
                let line = Line::parse(buffer, delimiter).map_err(Error::Line)?;
                Ok(Some(line))
            }
        }
    }

    /// Returns an iterator over the [`Line`]s in the underlying reader.
    pub fn lines<'a, R>(
        &'a mut self,
    ) -> impl Iterator<Item = Result<Line<R>, Error<R::ParseError>>> + 'a
    where
        R: Record + 'a,
    {
        let mut buffer = String::new();

        iter::from_fn(move || self.read_line::<R>(&mut buffer).transpose())
    }

    /// Returns an iterator over the records in the underlying reader.
    ///
    /// Empty lines, comment lines and header lines are skipped. The first
    /// malformed line ends iteration with an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::ScoredRecord;
    ///
    /// let data = b"#comment\n\nq\tt\t-10\t100\nq\tt\t-20\t0\n";
    /// let mut reader = pbove::Reader::new(&data[..]);
    ///
    /// let records = reader
    ///     .records::<ScoredRecord>()
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(records.len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn records<'a, R>(&'a mut self) -> impl Iterator<Item = Result<R, Error<R::ParseError>>> + 'a
    where
        R: Record + 'a,
    {
        let mut failed = false;

        self.lines::<R>().filter_map(move |result| {
            if failed {
                return None;
            }

            match result {
                Ok(Line::Record(record)) => Some(Ok(record)),
                Ok(_) => None,
                Err(err) => {
                    failed = true;
                    Some(Err(err))
                }
            }
        })
    }

    /// Reads every scored record along with the ground truth totals carried
    /// by the comment lines.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"#numGroundTruthOVLPos=10\n#numGroundTruthOVLNeg=20\nq\tt\t-10\t100\n";
    /// let mut reader = pbove::Reader::new(&data[..]);
    ///
    /// let (records, totals) = reader.read_scored()?;
    /// assert_eq!(records.len(), 1);
    /// assert_eq!(totals.positive, Some(10));
    /// assert_eq!(totals.negative, Some(20));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read_scored(
        &mut self,
    ) -> Result<(Vec<ScoredRecord>, GroundTruthTotals), Error<scored::ParseError>> {
        let mut records = Vec::new();
        let mut totals = GroundTruthTotals::default();

        for result in self.lines::<ScoredRecord>() {
            match result? {
                Line::Record(record) => records.push(record),
                Line::Comment(comment) => {
                    totals.observe(&comment);
                }
                Line::Empty | Line::Header => {}
            }
        }

        Ok((records, totals))
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self {
            inner,
            delimiter: None,
        }
    }
}

/// Opens a file for reading, decompressing it when its extension is `gz`.
pub fn open<P>(path: P) -> io::Result<Reader<Box<dyn BufRead>>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)?;

    let inner: Box<dyn BufRead> = match path.extension() == Some(OsStr::new("gz")) {
        true => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        false => Box::new(BufReader::new(file)),
    };

    Ok(Reader::new(inner))
}

/// Reads a line from a buffered reader.
fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();

    match reader.read_line(buffer) {
        Ok(0) => Ok(0),
        Ok(n) => {
            if buffer.ends_with(NEW_LINE) {
                buffer.pop();

                if buffer.ends_with(CARRIAGE_RETURN) {
                    buffer.pop();
                }
            }

            Ok(n)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;
    use crate::record::AlignmentRecord;

    #[test]
    fn test_read_line() {
        let data = b"hello\r\nworld!";
        let mut cursor = io::Cursor::new(data);

        let mut buffer = String::new();
        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "hello");
        assert_eq!(len, 7);

        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "world!");
        assert_eq!(len, 6);
    }

    #[test]
    fn test_alignment_records() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"# ground truth\n\
            qname tname score pctsimilarity qstrand qstart qend qseqlength tstrand tstart tend tseqlength mapqv\n\
            m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n\
            \n\
            m1/2/0_500 chr1 -100 90.0 + 0 500 500 - 100 600 10000 254\n";

        let mut reader = Reader::new(&data[..]);
        let records = reader
            .records::<AlignmentRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].query_read().hole(), 2);

        Ok(())
    }

    #[test]
    fn test_malformed_record_stops_iteration() {
        let data = b"m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n\
            m1/2/0_500 chr1\n\
            m1/3/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n";

        let mut reader = Reader::new(&data[..]);
        let results = reader.records::<AlignmentRecord>().collect::<Vec<_>>();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());

        let err = results[1].as_ref().unwrap_err();
        assert_eq!(
            err.to_string(),
            "line error: invalid record: invalid number of fields in alignment record: \
             expected 13 fields, found 2 fields\n\nline: m1/2/0_500 chr1"
        );
    }

    #[test]
    fn test_open_gzipped() -> Result<(), Box<dyn std::error::Error>> {
        let path = std::env::temp_dir().join(format!("pbove-{}.qtso.gz", std::process::id()));

        let mut encoder = GzEncoder::new(File::create(&path)?, Compression::default());
        encoder.write_all(b"q\tt\t-10\t100\n")?;
        encoder.finish()?;

        let mut reader = open(&path)?;
        let (records, _) = reader.read_scored()?;
        std::fs::remove_file(&path)?;

        assert_eq!(records, vec![ScoredRecord::new("q", "t", -10, 100)]);

        Ok(())
    }
}
