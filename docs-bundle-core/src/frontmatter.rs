//! YAML frontmatter of Markdown/MDX content files.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Metadata fields the pipeline understands. Unknown keys are ignored.
///
/// Scalars of any type are kept as text and lists of scalars are joined with
/// `, `. Values that have no text form (mappings, nested lists) read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    #[serde(deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub author: Option<String>,
    #[serde(rename = "lastUpdated", deserialize_with = "lenient_text")]
    pub last_updated: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(&Value::deserialize(deserializer)?))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Sequence(items) => {
            let parts = items
                .iter()
                .map(|item| match item {
                    Value::Sequence(_) | Value::Mapping(_) => None,
                    scalar => value_text(scalar),
                })
                .collect::<Option<Vec<_>>>()?;
            Some(parts.join(", "))
        }
        Value::Tagged(tagged) => value_text(&tagged.value),
        Value::Null | Value::Mapping(_) => None,
    }
}

/// A content file split into its metadata and Markdown body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSource<'a> {
    pub frontmatter: Frontmatter,
    pub body: &'a str,
}

/// Split `source` into frontmatter and body.
///
/// Files without a leading `---` line have empty frontmatter and the whole
/// source as body. An opening delimiter without a matching closing one, or
/// YAML that does not parse, is an error.
pub fn split_frontmatter(source: &str) -> Result<ParsedSource<'_>, String> {
    let Some(rest) = strip_delimiter_line(source) else {
        return Ok(ParsedSource {
            frontmatter: Frontmatter::default(),
            body: source,
        });
    };

    let mut offset = 0;
    let mut yaml_end = None;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            yaml_end = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let (yaml_end, body_start) =
        yaml_end.ok_or_else(|| "frontmatter not closed with ---".to_string())?;

    let yaml = &rest[..yaml_end];
    let frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml).map_err(|e| e.to_string())?
    };

    Ok(ParsedSource {
        frontmatter,
        body: rest[body_start..].trim_start_matches(['\r', '\n']),
    })
}

fn strip_delimiter_line(source: &str) -> Option<&str> {
    let first_line_end = source.find('\n').map(|i| i + 1).unwrap_or(source.len());
    if source[..first_line_end].trim_end() == "---" {
        Some(&source[first_line_end..])
    } else {
        None
    }
}
