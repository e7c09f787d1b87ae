//! Delimited text I/O: table reading on the `csv` crate, gzip-transparent
//! readers, and output sinks for report files.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

fn invalid(e: csv::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

/// Open a text file, decompressing when the name ends in `.gz`.
pub fn open_text(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let gz = path.extension().is_some_and(|ext| ext == "gz");
    let reader: Box<dyn Read> = if gz {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::with_capacity(256 * 1024, reader)))
}

/// A delimited table held in memory.
#[derive(Debug, Clone, Default)]
pub struct TabTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabTable {
    /// Read a whole table.
    ///
    /// Tab-delimited text is read without quote handling, so a stray `"`
    /// stays inside its field. Any other delimiter gets CSV quoting with
    /// `""` escapes. Short rows are padded with empty fields up to the
    /// header width so column lookups never go out of bounds.
    pub fn read<R: Read>(reader: R, delim: char, has_header: bool) -> io::Result<Self> {
        let delimiter = u8::try_from(delim)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("delimiter {delim:?} is not ASCII"),
                )
            })?;
        let mut records = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quoting(delim != '\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();

        let mut table = Self::default();
        if has_header {
            match records.next() {
                Some(header) => {
                    table.header = header.map_err(invalid)?.iter().map(str::to_string).collect();
                }
                None => return Ok(table),
            }
        }
        for record in records {
            let record = record.map_err(invalid)?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.iter().all(String::is_empty) {
                continue;
            }
            if row.len() < table.header.len() {
                row.resize(table.header.len(), String::new());
            }
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Index of a header column by exact name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Like [`column`](Self::column), failing with the available names.
    pub fn require_column(&self, name: &str) -> io::Result<usize> {
        self.column(name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("missing column {name:?} (have: {})", self.header.join(", ")),
            )
        })
    }
}

/// Report destination: a plain file, a gzip file, or stdout.
pub enum TextSink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Stdout(io::Stdout),
}

impl TextSink {
    /// Open `path` for writing (gzip when it ends in `.gz`), or stdout when `None`.
    pub fn create(path: Option<&Path>) -> io::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Stdout(io::stdout()));
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = BufWriter::new(File::create(path)?);
        if path.extension().is_some_and(|ext| ext == "gz") {
            Ok(Self::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(Self::Plain(file))
        }
    }

    /// Flush buffers and write the gzip trailer.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(mut w) => w.flush(),
            Self::Gzip(enc) => enc.finish()?.flush(),
            Self::Stdout(mut out) => out.flush(),
        }
    }
}

impl Write for TextSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
            Self::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
            Self::Stdout(w) => w.flush(),
        }
    }
}
