//! Delimited flat-record reading and writing.
//!
//! Comma-separated fields, one record per line. A field containing the
//! delimiter, a quote, or a line break is wrapped in quotes with inner
//! quotes doubled. The reader also accepts CRLF line endings, a leading
//! byte-order mark, and quoted fields spanning several lines.

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// A parsed record and the 1-based line on which it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

impl Record {
    /// Returns the field at `index`, or `""` if the record is shorter.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", String::as_str)
    }
}

/// A line with nothing on it. A lone `""` is an empty field, not a blank.
fn is_blank(fields: &[String], quoted: bool) -> bool {
    !quoted && fields.len() == 1 && fields[0].is_empty()
}

fn needs_quoting(field: &str) -> bool {
    field.contains([DELIMITER, QUOTE, '\n', '\r'])
}

/// Appends one record, terminated by `\n`, to `out`.
pub(crate) fn write_record<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        let field = field.as_ref();
        if needs_quoting(field) {
            out.push(QUOTE);
            for c in field.chars() {
                if c == QUOTE {
                    out.push(QUOTE);
                }
                out.push(c);
            }
            out.push(QUOTE);
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

/// Splits `text` into records, dropping blank lines.
///
/// Never fails: a quote that is never closed swallows the rest of the
/// input into its field, and a stray quote inside an unquoted field is
/// kept literally.
pub(crate) fn read_records(text: &str) -> Vec<Record> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut chars = text.chars().peekable();

    let mut line = 1;
    let mut record_line = 1;
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started_quoted = false;
    let mut pending = false;

    while let Some(c) = chars.next() {
        pending = true;
        if in_quotes {
            match c {
                QUOTE if chars.peek() == Some(&QUOTE) => {
                    chars.next();
                    field.push(QUOTE);
                },
                QUOTE => in_quotes = false,
                '\r' if chars.peek() != Some(&'\n') => {
                    line += 1;
                    field.push(c);
                },
                '\n' => {
                    line += 1;
                    field.push(c);
                },
                _ => field.push(c),
            }
            continue;
        }

        match c {
            DELIMITER => {
                fields.push(std::mem::take(&mut field));
                field_started_quoted = false;
            },
            QUOTE if field.is_empty() && !field_started_quoted => {
                in_quotes = true;
                field_started_quoted = true;
            },
            '\r' if chars.peek() == Some(&'\n') => {},
            '\n' | '\r' => {
                fields.push(std::mem::take(&mut field));
                if !is_blank(&fields, field_started_quoted) {
                    records.push(Record {
                        line: record_line,
                        fields: std::mem::take(&mut fields),
                    });
                }
                fields.clear();
                line += 1;
                record_line = line;
                field_started_quoted = false;
                pending = false;
            },
            _ => field.push(c),
        }
    }

    if pending {
        fields.push(field);
        if !is_blank(&fields, field_started_quoted) {
            records.push(Record {
                line: record_line,
                fields,
            });
        }
    }
    records
}
