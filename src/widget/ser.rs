use serde::Serializer;

use crate::knockout::fmt_time;
use crate::server::GameString;

/// Escape text so that it can be used in XML attributes.
/// Formatting codes like `$f00` are left alone.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn format_xml_text<S>(text: &str, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&escape_xml(text))
}

/// Escape a nick name, and remove formatting that makes it wider.
pub fn format_nick_name<S>(nick_name: &GameString, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let narrow = nick_name.formatted.replace("$o", "").replace("$w", "");
    s.serialize_str(&escape_xml(&narrow))
}

pub fn format_run_time<S>(millis: &Option<usize>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match millis {
        Some(millis) => s.serialize_str(&fmt_time(*millis)),
        None => s.serialize_str("-"),
    }
}

/// Positions only need one decimal.
pub fn format_position<S>(pos: &f32, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&format!("{:.1}", pos))
}

pub fn format_position_opt<S>(pos: &Option<f32>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match pos {
        Some(pos) => format_position(pos, s),
        None => s.serialize_none(),
    }
}
