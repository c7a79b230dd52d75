//! NumPy-style docstrings: titles underlined with dashes, `name : type` items
//! followed by an indented description.

use super::{clean_type, dedent, indent_width, join_text, Field, ParseError, ParsedDocstring};
use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Params,
    Returns,
    Yields,
    Raises,
    Ignored,
}

static RE_UNDERLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-{3,}\s*$").unwrap());

fn section_kind(title: &str) -> Option<Section> {
    let kind = match title.trim() {
        "Parameters" | "Params" | "Arguments" | "Args" | "Other Parameters" | "Receives"
        | "Attributes" => Section::Params,
        "Returns" => Section::Returns,
        "Yields" => Section::Yields,
        "Raises" | "Warns" => Section::Raises,
        "Examples" | "Example" | "Notes" | "See Also" | "References" | "Warnings"
        | "Deprecated" => Section::Ignored,
        _ => return None,
    };
    Some(kind)
}

pub fn parse(text: &str) -> Result<ParsedDocstring, ParseError> {
    let lines: Vec<&str> = text.lines().collect();

    // A title is a known section name directly above a dashed underline.
    let titles: Vec<(usize, Section)> = (0..lines.len().saturating_sub(1))
        .filter(|&i| RE_UNDERLINE.is_match(lines[i + 1]))
        .filter_map(|i| section_kind(lines[i]).map(|kind| (i, kind)))
        .collect();

    let description_end = titles.first().map_or(lines.len(), |(i, _)| *i);
    let mut doc = ParsedDocstring {
        description: lines[..description_end].join("\n").trim().to_string(),
        ..Default::default()
    };

    for (n, &(start, kind)) in titles.iter().enumerate() {
        let end = titles.get(n + 1).map_or(lines.len(), |(i, _)| *i);
        let items = split_items(&lines[start + 2..end]);
        match kind {
            Section::Ignored => {}
            Section::Params => doc.params.extend(items.iter().map(|i| param_field(i))),
            Section::Returns => {
                if doc.returns.is_none() {
                    doc.returns = items.first().map(|i| return_field(i));
                }
            }
            Section::Yields => {
                if doc.returns.is_none() {
                    doc.returns = items.first().map(|i| return_field(i));
                }
            }
            Section::Raises => doc.raises.extend(items.iter().map(|item| Field {
                name: None,
                type_name: Some(item[0].trim().to_string()),
                description: description_of(item),
            })),
        }
    }

    Ok(doc)
}

/// Items start at column 0; indented lines describe the preceding item.
fn split_items<'a>(body: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut items: Vec<Vec<&str>> = Vec::new();
    for line in body {
        if line.trim().is_empty() {
            if let Some(item) = items.last_mut() {
                item.push(line);
            }
            continue;
        }
        match items.last_mut() {
            Some(item) if indent_width(line) > 0 => item.push(line),
            _ => items.push(vec![line]),
        }
    }
    items
}

fn description_of(item: &[&str]) -> Option<String> {
    join_text(&dedent(&item[1..]))
}

fn param_field(item: &[&str]) -> Field {
    let head = item[0].trim();
    let (name, type_name) = match head.split_once(" : ").or_else(|| head.split_once(':')) {
        Some((name, type_name)) => (name.trim().to_string(), clean_type(type_name)),
        None => (head.to_string(), None),
    };
    Field {
        name: Some(name),
        type_name,
        description: description_of(item),
    }
}

fn return_field(item: &[&str]) -> Field {
    let head = item[0].trim();
    let (name, type_name) = match head.split_once(" : ") {
        Some((name, type_name)) => (Some(name.trim().to_string()), type_name.trim().to_string()),
        None => (None, head.to_string()),
    };
    Field {
        name,
        type_name: Some(type_name),
        description: description_of(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXAMPLE: &str = "Summary of example_foo

Parameters
----------
arg : int
    description of arg
arg2 : str, optional
    description of arg2

Returns
-------
bool
    description of return value

Raises
------
ValueError
    arg1 in range [0,100]";

    #[test]
    fn parses_sections() {
        let doc = parse(EXAMPLE).unwrap();
        assert_eq!(doc.description, "Summary of example_foo");
        assert_eq!(doc.params.len(), 2);
        assert_eq!(doc.params[1].name.as_deref(), Some("arg2"));
        assert_eq!(doc.params[1].type_name.as_deref(), Some("str"));
        assert_eq!(doc.params[1].description.as_deref(), Some("description of arg2"));
        let returns = doc.returns.unwrap();
        assert_eq!(returns.type_name.as_deref(), Some("bool"));
        assert_eq!(returns.description.as_deref(), Some("description of return value"));
        assert_eq!(doc.raises[0].type_name.as_deref(), Some("ValueError"));
        assert_eq!(doc.raises[0].description.as_deref(), Some("arg1 in range [0,100]"));
    }

    #[test]
    fn named_return() {
        let doc = parse("S\n\nReturns\n-------\ntotal : int\n    the total\n").unwrap();
        let returns = doc.returns.unwrap();
        assert_eq!(returns.name.as_deref(), Some("total"));
        assert_eq!(returns.type_name.as_deref(), Some("int"));
    }

    #[test]
    fn unknown_title_stays_in_description() {
        let doc = parse("S\n\nMusings\n-------\nnothing here").unwrap();
        assert!(doc.description.contains("Musings"));
    }
}
