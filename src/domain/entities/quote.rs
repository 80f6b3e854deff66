use std::fmt;

use chrono::NaiveDate;

/// Sentinel written into both text and name of a deleted quote.
pub const DELETED_FILL: &str = "###DELETED###";

/// Largest chat message the transport accepts.
pub const MAX_MESSAGE_LEN: usize = 500;

/// Room kept for quotes, separators and the index suffix when rendering.
pub const SIZE_MARGIN: usize = 20;

const FIELD_DELIMITER: char = '|';
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One slot of a channel's quote log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRecord {
    pub text: String,
    pub attributed: String,
    pub date: NaiveDate,
}

impl QuoteRecord {
    pub fn new(text: impl Into<String>, attributed: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            text: text.into(),
            attributed: attributed.into(),
            date,
        }
    }

    pub fn tombstone(date: NaiveDate) -> Self {
        Self::new(DELETED_FILL, DELETED_FILL, date)
    }

    /// Deleted only when both fields carry the sentinel.
    pub fn is_tombstone(&self) -> bool {
        self.text == DELETED_FILL && self.attributed == DELETED_FILL
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Would the rendered quote fit in one chat message?
    pub fn fits_message(&self) -> bool {
        self.text.chars().count()
            + self.attributed.chars().count()
            + self.date_string().len()
            + SIZE_MARGIN
            <= MAX_MESSAGE_LEN
    }

    /// Persisted form, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!(
            "{}{d}{}{d}{}",
            self.text,
            self.attributed,
            self.date_string(),
            d = FIELD_DELIMITER
        )
    }

    /// Parses a persisted line. The text may itself contain the delimiter,
    /// so the line is split from the right.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.trim_end_matches(['\r', '\n']).rsplitn(3, FIELD_DELIMITER);
        let date = fields.next()?.trim();
        let attributed = fields.next()?.trim();
        let text = fields.next()?;
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
        Some(Self::new(text, attributed, date))
    }

    /// Whether `name` can be stored as an attributed name or nickname.
    pub fn valid_name(name: &str) -> bool {
        let name = name.trim();
        !name.is_empty()
            && name != DELETED_FILL
            && !name.contains([FIELD_DELIMITER, '=', '\n', '\r'])
    }
}

impl fmt::Display for QuoteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" - {} ({})", self.text, self.attributed, self.date_string())
    }
}

/// Result of reading a quote slot, ready to be sent to chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteView {
    Live { index: usize, record: QuoteRecord },
    /// A random draw; carries the slot number so users can refer to it.
    Drawn { index: usize, record: QuoteRecord },
    Deleted { index: usize, date: NaiveDate },
    Missing { index: i64 },
    Empty,
    NoLive,
}

impl fmt::Display for QuoteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteView::Live { record, .. } => write!(f, "{}", record),
            QuoteView::Drawn { index, record } => write!(f, "{} [#{}]", record, index),
            QuoteView::Deleted { index, date } => write!(
                f,
                "Quote #{} was deleted on {}.",
                index,
                date.format(DATE_FORMAT)
            ),
            QuoteView::Missing { index } => write!(f, "Quote #{} does not exist.", index),
            QuoteView::Empty => write!(f, "There are no quotes!"),
            QuoteView::NoLive => write!(f, "Every quote has been deleted, there is nothing to draw."),
        }
    }
}
