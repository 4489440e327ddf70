//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use proptest::prelude::*;

use yanzi_core::IntentRecord;

/// Generate free text: printable ASCII with every newline style, or
/// arbitrary non-control Unicode.
pub fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~\r\n\t]{1,40}",
        "\\PC{1,20}",
    ]
}

/// Generate an identifier.
pub fn intent_id() -> impl Strategy<Value = String> {
    "[0-9A-HJKMNP-TV-Z]{26}"
}

/// Generate a lowercase hex hash.
pub fn hex_hash() -> impl Strategy<Value = String> {
    any::<[u8; 32]>().prop_map(hex::encode)
}

/// A point in time, independent of the offset it is written in.
#[derive(Debug, Clone)]
pub struct Instant {
    pub secs: i64,
    pub nanos: u32,
}

impl Instant {
    /// RFC 3339 text for this instant at `offset_minutes` east of UTC.
    pub fn render(&self, offset_minutes: i32) -> Option<String> {
        let offset = FixedOffset::east_opt(offset_minutes * 60)?;
        let utc = DateTime::from_timestamp(self.secs, self.nanos)?;
        Some(
            utc.with_timezone(&offset)
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        )
    }
}

/// Generate an instant between 1970 and 2100.
pub fn instant() -> impl Strategy<Value = Instant> {
    (0i64..4_102_444_800i64, prop_oneof![Just(0u32), 0u32..1_000_000_000u32])
        .prop_map(|(secs, nanos)| Instant { secs, nanos })
}

/// Generate a UTC offset in minutes.
pub fn offset_minutes() -> impl Strategy<Value = i32> {
    prop_oneof![Just(0), -720i32..=840i32]
}

/// A scalar metadata value.
#[derive(Debug, Clone)]
pub enum MetaScalar {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Generate a metadata scalar.
pub fn meta_scalar() -> impl Strategy<Value = MetaScalar> {
    prop_oneof![
        Just(MetaScalar::Null),
        any::<bool>().prop_map(MetaScalar::Bool),
        any::<i64>().prop_map(MetaScalar::Int),
        text().prop_map(MetaScalar::Text),
    ]
}

/// How a metadata object is written out.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStyle {
    /// Emit keys in descending instead of ascending order.
    pub reverse: bool,
    /// Pad with insignificant whitespace.
    pub spaced: bool,
    /// Spell integers as `N.0e0`.
    pub exponent_ints: bool,
}

prop_compose! {
    /// Generate a render style.
    pub fn render_style()(reverse: bool, spaced: bool, exponent_ints: bool) -> RenderStyle {
        RenderStyle { reverse, spaced, exponent_ints }
    }
}

/// A flat metadata object with a chosen set of entries.
#[derive(Debug, Clone, Default)]
pub struct MetaSpec {
    pub entries: BTreeMap<String, MetaScalar>,
}

impl MetaSpec {
    /// Write the object as JSON text in `style`.
    pub fn render(&self, style: RenderStyle) -> String {
        let sep = if style.spaced { " " } else { "" };
        let mut entries: Vec<_> = self.entries.iter().collect();
        if style.reverse {
            entries.reverse();
        }

        let body: Vec<String> = entries
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    MetaScalar::Null => "null".to_owned(),
                    MetaScalar::Bool(b) => b.to_string(),
                    MetaScalar::Int(n) if style.exponent_ints => format!("{n}.0e0"),
                    MetaScalar::Int(n) => n.to_string(),
                    MetaScalar::Text(s) => json_string(s),
                };
                format!("{sep}{}{sep}:{sep}{value}", json_string(key))
            })
            .collect();

        format!("{{{}{sep}}}", body.join(","))
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// Generate a metadata object.
pub fn meta_spec() -> impl Strategy<Value = MetaSpec> {
    prop::collection::btree_map("[a-zA-Z_][a-zA-Z0-9_]{0,8}", meta_scalar(), 0..6)
        .prop_map(|entries| MetaSpec { entries })
}

/// Parameters for generating an intent record.
#[derive(Debug, Clone)]
pub struct IntentParams {
    pub id: String,
    pub created_at: Instant,
    pub offset_minutes: i32,
    pub author: String,
    pub source_type: String,
    pub title: Option<String>,
    pub prompt: String,
    pub response: String,
    pub meta: Option<MetaSpec>,
    pub style: RenderStyle,
    pub prev_hash: Option<String>,
}

impl Arbitrary for IntentParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            (intent_id(), instant(), offset_minutes()),
            (text(), "[a-z]{1,8}", proptest::option::of(text())),
            (text(), text()),
            (proptest::option::of(meta_spec()), render_style()),
            proptest::option::of(hex_hash()),
        )
            .prop_map(
                |(
                    (id, created_at, offset_minutes),
                    (author, source_type, title),
                    (prompt, response),
                    (meta, style),
                    prev_hash,
                )| IntentParams {
                    id,
                    created_at,
                    offset_minutes,
                    author,
                    source_type,
                    title,
                    prompt,
                    response,
                    meta,
                    style,
                    prev_hash,
                },
            )
            .boxed()
    }
}

/// Build an unsealed record from parameters.
pub fn record_from_params(params: &IntentParams) -> IntentRecord {
    let created_at = params
        .created_at
        .render(params.offset_minutes)
        .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_owned());

    let mut builder = IntentRecord::builder(&params.id, created_at)
        .author(&params.author)
        .source_type(&params.source_type)
        .prompt(&params.prompt)
        .response(&params.response);

    if let Some(title) = &params.title {
        builder = builder.title(title);
    }
    if let Some(meta) = &params.meta {
        builder = builder.meta(meta.render(params.style));
    }
    if let Some(prev) = &params.prev_hash {
        builder = builder.prev_hash(prev);
    }

    builder.build()
}
