use html_escape::decode_html_entities;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::BufRead;
use unicode_normalization::UnicodeNormalization;

use crate::error::{ExtractError, Result};

const MAX_PREAMBLE_BYTES: usize = 4096;

/// One table row: the label cell first, value cells after it. Empty cells
/// keep their position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<String>,
}

impl TableRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn label(&self) -> Option<&str> {
        self.cells.first().map(String::as_str)
    }

    /// Value cells that carry any text, left to right.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells
            .iter()
            .skip(1)
            .map(String::as_str)
            .filter(|cell| !cell.trim().is_empty())
    }

    pub fn has_values(&self) -> bool {
        self.values().next().is_some()
    }

    pub fn text(&self) -> String {
        self.cells.join(" ")
    }
}

/// Markup events the row assembler cares about.
#[derive(Debug)]
enum Token {
    TableStart,
    RowStart,
    RowEnd,
    CellStart,
    CellEnd,
    EmptyCell,
    TableEnd,
    Break,
    Text(String),
    Malformed,
    Skip,
    Eof,
}

impl Token {
    fn open(name: &[u8]) -> Self {
        if name.eq_ignore_ascii_case(b"table") {
            Token::TableStart
        } else if name.eq_ignore_ascii_case(b"tr") {
            Token::RowStart
        } else if name.eq_ignore_ascii_case(b"td") || name.eq_ignore_ascii_case(b"th") {
            Token::CellStart
        } else {
            Token::Skip
        }
    }

    fn close(name: &[u8]) -> Self {
        if name.eq_ignore_ascii_case(b"tr") {
            Token::RowEnd
        } else if name.eq_ignore_ascii_case(b"td") || name.eq_ignore_ascii_case(b"th") {
            Token::CellEnd
        } else if name.eq_ignore_ascii_case(b"table") {
            Token::TableEnd
        } else {
            Token::Skip
        }
    }

    fn empty(name: &[u8]) -> Self {
        if name.eq_ignore_ascii_case(b"td") || name.eq_ignore_ascii_case(b"th") {
            Token::EmptyCell
        } else if name.eq_ignore_ascii_case(b"br") {
            Token::Break
        } else {
            Token::Skip
        }
    }
}

fn decode_text(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    decode_html_entities(&text).nfkc().collect()
}

/// Pulls table rows out of a statement page one at a time.
///
/// Only `tr`/`td`/`th` structure is interpreted; every other tag is passed
/// over. A row left open by an omitted `</tr>` ends where the next row
/// starts. A row that contains a nested table, or markup the reader cannot
/// make sense of, is dropped and yields an empty row instead of failing. Transport failures and a
/// reader that stops making progress are reported as stream errors.
pub struct RowTokenizer<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    cells: Vec<String>,
    cell: Option<String>,
    in_row: bool,
    seen_row: bool,
    table_depth: usize,
    row_depth: usize,
    preamble: String,
    rows_read: usize,
    last_error_at: Option<u64>,
    finished: bool,
}

impl<R: BufRead> RowTokenizer<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.trim_text(true);
        config.check_end_names = false;

        Self {
            reader,
            buf: Vec::new(),
            cells: Vec::new(),
            cell: None,
            in_row: false,
            seen_row: false,
            table_depth: 0,
            row_depth: 0,
            preamble: String::new(),
            rows_read: 0,
            last_error_at: None,
            finished: false,
        }
    }

    /// Text that appeared before the first table row, such as a page title
    /// or a "(in millions)" caption.
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Returns the next row, `Ok(None)` at end of stream.
    pub fn next_row(&mut self) -> Result<Option<TableRow>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            let token = match self.next_token() {
                Ok(token) => token,
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            };

            match token {
                Token::TableStart => self.table_depth += 1,
                Token::RowStart => {
                    self.seen_row = true;
                    let was_in_row = self.in_row;
                    let nested = was_in_row && self.table_depth > self.row_depth;
                    let previous = if nested {
                        // a table inside a cell; the outer row cannot be trusted
                        self.reset_row();
                        Some(TableRow::default())
                    } else if was_in_row {
                        Some(self.take_row())
                    } else {
                        None
                    };
                    self.in_row = true;
                    self.row_depth = self.table_depth;
                    if let Some(row) = previous {
                        return Ok(Some(self.emit(row)));
                    }
                }
                Token::CellStart if self.in_row => {
                    self.finish_cell();
                    self.cell = Some(String::new());
                }
                Token::EmptyCell if self.in_row => {
                    self.finish_cell();
                    self.cells.push(String::new());
                }
                Token::Text(text) => {
                    if let Some(cell) = self.cell.as_mut() {
                        cell.push(' ');
                        cell.push_str(&text);
                    } else if !self.seen_row && self.preamble.len() < MAX_PREAMBLE_BYTES {
                        self.preamble.push(' ');
                        self.preamble.push_str(&text);
                    }
                }
                Token::Break => {
                    if let Some(cell) = self.cell.as_mut() {
                        cell.push(' ');
                    }
                }
                Token::CellEnd => self.finish_cell(),
                Token::TableEnd => {
                    let closing = self.table_depth;
                    self.table_depth = self.table_depth.saturating_sub(1);
                    if self.in_row && closing <= self.row_depth {
                        let row = self.take_row();
                        return Ok(Some(self.emit(row)));
                    }
                }
                Token::RowEnd if self.in_row => {
                    let row = self.take_row();
                    return Ok(Some(self.emit(row)));
                }
                Token::Malformed if self.in_row => {
                    self.reset_row();
                    return Ok(Some(self.emit(TableRow::default())));
                }
                Token::Eof => {
                    self.finished = true;
                    if self.in_row && (!self.cells.is_empty() || self.cell.is_some()) {
                        let row = self.take_row();
                        return Ok(Some(self.emit(row)));
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        self.buf.clear();
        let token = match self.reader.read_event_into(&mut self.buf) {
            Ok(Event::Start(e)) => Token::open(e.local_name().as_ref()),
            Ok(Event::End(e)) => Token::close(e.local_name().as_ref()),
            Ok(Event::Empty(e)) => Token::empty(e.local_name().as_ref()),
            Ok(Event::Text(t)) => Token::Text(decode_text(&t)),
            Ok(Event::CData(t)) => Token::Text(decode_text(&t)),
            Ok(Event::Eof) => Token::Eof,
            Ok(_) => Token::Skip,
            Err(quick_xml::Error::Io(e)) => {
                return Err(ExtractError::Stream(quick_xml::Error::Io(e)));
            }
            Err(e) => {
                let position = self.reader.buffer_position() as u64;
                if self.last_error_at == Some(position) {
                    return Err(ExtractError::Stream(e));
                }
                self.last_error_at = Some(position);
                log::trace!("Skipping malformed markup at byte {}: {}", position, e);
                Token::Malformed
            }
        };
        Ok(token)
    }

    fn finish_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            let cell = cell.split_whitespace().collect::<Vec<_>>().join(" ");
            self.cells.push(cell);
        }
    }

    fn take_row(&mut self) -> TableRow {
        self.finish_cell();
        self.in_row = false;
        TableRow::new(std::mem::take(&mut self.cells))
    }

    fn reset_row(&mut self) {
        self.cells.clear();
        self.cell = None;
        self.in_row = false;
    }

    fn emit(&mut self, row: TableRow) -> TableRow {
        self.rows_read += 1;
        row
    }
}

impl<R: BufRead> Iterator for RowTokenizer<R> {
    type Item = Result<TableRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
