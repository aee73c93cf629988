//! HTML table extraction.
//!
//! Legacy reporting systems often emit an HTML document with an `.xls`
//! extension. Only the first `<table>` is read: `<tr>` rows, `<td>`/`<th>`
//! cells, inner markup stripped, entities decoded and whitespace collapsed.
//! Rows of nested tables are folded into the enclosing cell's text.
//!
//! Named entities cover Latin-1 and common punctuation; numeric references
//! always decode. Other names are kept as written.

use std::fs;
use std::path::Path;

use crate::error::IngestError;
use crate::frame_builder::{RawCell, RawTable};

const MAX_COLSPAN: usize = 1000;

/// Read the first table of an HTML document.
pub fn read_html_table(path: &Path) -> Result<RawTable, IngestError> {
    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let html = String::from_utf8_lossy(&bytes);
    parse_first_table(&html).ok_or_else(|| IngestError::NoTable {
        path: path.to_path_buf(),
    })
}

/// Extract the first table; the first row becomes the header.
///
/// Returns `None` when the document has no `<table>` element.
pub fn parse_first_table(html: &str) -> Option<RawTable> {
    let lower = html.to_ascii_lowercase();
    let mut builder = TableBuilder::default();
    let mut depth = 0usize;
    let mut pos = 0usize;

    while pos < html.len() {
        let Some(offset) = html[pos..].find('<') else {
            builder.text(&html[pos..]);
            break;
        };
        let lt = pos + offset;
        builder.text(&html[pos..lt]);

        if lower[lt..].starts_with("<!--") {
            pos = lower[lt..].find("-->").map_or(html.len(), |end| lt + end + 3);
            continue;
        }
        let Some(gt) = html[lt..].find('>').map(|end| lt + end) else {
            builder.text(&html[lt..]);
            break;
        };
        pos = gt + 1;

        let Some(tag) = Tag::parse(&lower[lt + 1..gt]) else {
            builder.text(&html[lt..pos]);
            continue;
        };

        if !tag.closing && (tag.name == "script" || tag.name == "style") {
            let close = format!("</{}", tag.name);
            pos = lower[pos..]
                .find(&close)
                .and_then(|start| {
                    let from = pos + start;
                    lower[from..].find('>').map(|end| from + end + 1)
                })
                .unwrap_or(html.len());
            continue;
        }

        match (tag.name, tag.closing) {
            ("table", false) => {
                depth += 1;
            }
            ("table", true) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return Some(builder.finish());
                }
            }
            _ if depth != 1 => {
                if depth > 1 && tag.name == "br" {
                    builder.text(" ");
                }
            }
            ("tr", false) => builder.start_row(),
            ("tr", true) => builder.end_row(),
            ("td" | "th", false) => builder.start_cell(colspan(tag.attrs)),
            ("td" | "th", true) => builder.end_cell(),
            ("br", _) => builder.text(" "),
            _ => {}
        }
    }

    (depth > 0).then(|| builder.finish())
}

struct Tag<'a> {
    name: &'a str,
    closing: bool,
    attrs: &'a str,
}

impl<'a> Tag<'a> {
    /// Parse the inside of `<...>` (already lower-cased).
    fn parse(inner: &'a str) -> Option<Self> {
        let (closing, rest) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, inner),
        };
        let end = rest
            .find(|ch: char| !ch.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        Some(Self {
            name: &rest[..end],
            closing,
            attrs: &rest[end..],
        })
    }
}

fn colspan(attrs: &str) -> usize {
    let Some(pos) = attrs.find("colspan") else {
        return 1;
    };
    let Some(value) = attrs[pos + "colspan".len()..].trim_start().strip_prefix('=') else {
        return 1;
    };
    let digits: String = value
        .trim_start()
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<usize>().map_or(1, |span| span.clamp(1, MAX_COLSPAN))
}

#[derive(Default)]
struct TableBuilder {
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<(String, usize)>,
}

impl TableBuilder {
    fn text(&mut self, text: &str) {
        if let Some((buffer, _)) = &mut self.cell {
            buffer.push_str(text);
        }
    }

    fn start_row(&mut self) {
        self.end_row();
        self.row = Some(Vec::new());
    }

    fn end_row(&mut self) {
        self.end_cell();
        if let Some(row) = self.row.take() {
            if !row.is_empty() {
                self.rows.push(row);
            }
        }
    }

    fn start_cell(&mut self, span: usize) {
        self.end_cell();
        if self.row.is_none() {
            self.row = Some(Vec::new());
        }
        self.cell = Some((String::new(), span));
    }

    fn end_cell(&mut self) {
        let Some((buffer, span)) = self.cell.take() else {
            return;
        };
        let value = collapse_whitespace(&decode_entities(&buffer));
        let row = self.row.get_or_insert_with(Vec::new);
        for _ in 0..span {
            row.push(value.clone());
        }
    }

    fn finish(mut self) -> RawTable {
        self.end_row();
        let mut rows = self.rows.into_iter();
        let headers = rows.next().unwrap_or_default();
        RawTable {
            headers,
            rows: rows
                .map(|row| row.iter().map(|value| RawCell::text(value)).collect())
                .collect(),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode named and numeric character references; unknown ones are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail[1..]
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..=semi]).map(|ch| (ch, semi + 2)));
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Named entities for U+00A0..=U+00FF, in code point order.
const LATIN1_ENTITIES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", "uml", "copy", "ordf",
    "laquo", "not", "shy", "reg", "macr", "deg", "plusmn", "sup2", "sup3", "acute", "micro",
    "para", "middot", "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", "Egrave", "Eacute",
    "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", "ETH", "Ntilde", "Ograve", "Oacute",
    "Ocirc", "Otilde", "Ouml", "times", "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute",
    "THORN", "szlig", "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", "eth", "ntilde",
    "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", "oslash", "ugrave", "uacute", "ucirc",
    "uuml", "yacute", "thorn", "yuml",
];

fn decode_entity(name: &str) -> Option<char> {
    if let Some(offset) = LATIN1_ENTITIES.iter().position(|entity| *entity == name) {
        return u32::try_from(offset).ok().and_then(|offset| char::from_u32(0xA0 + offset));
    }
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "euro" => '€',
        "ndash" => '–',
        "mdash" => '—',
        "lsquo" => '‘',
        "rsquo" => '’',
        "sbquo" => '‚',
        "ldquo" => '“',
        "rdquo" => '”',
        "bdquo" => '„',
        "bull" => '•',
        "hellip" => '…',
        "permil" => '‰',
        "trade" => '™',
        "OElig" => 'Œ',
        "oelig" => 'œ',
        "Scaron" => 'Š',
        "scaron" => 'š',
        "Yuml" => 'Ÿ',
        _ => return decode_numeric_entity(name),
    };
    Some(ch)
}

fn decode_numeric_entity(name: &str) -> Option<char> {
    let code = name.strip_prefix('#')?;
    let value = match code.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse::<u32>().ok()?,
    };
    char::from_u32(value)
}
