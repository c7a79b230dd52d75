//! Google-style docstrings: `Args:` / `Returns:` / `Raises:` sections with
//! indented items.

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

static RE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(Args|Arguments|Parameters|Params|Keyword Args|Keyword Arguments|Attributes",
        r"|Returns|Yields|Raises|Exceptions|Except|Example|Examples)[ \t]*:[ \t]*$"
    ))
    .unwrap()
});

// `name (type, optional)`
static RE_PARAM_SPEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*{0,2}[\w.]+)\s*\((.*)\)$").unwrap());

// `bool: description` or `List[int]: description`
static RE_RETURN_SPEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:\s]+|[^:]*\])\s*:(.*)$").unwrap());

fn section_kind(title: &str) -> Section {
    match title {
        "Args" | "Arguments" | "Parameters" | "Params" | "Keyword Args"
        | "Keyword Arguments" | "Attributes" => Section::Params,
        "Returns" => Section::Returns,
        "Yields" => Section::Yields,
        "Raises" | "Exceptions" | "Except" => Section::Raises,
        _ => Section::Ignored,
    }
}

pub fn parse(text: &str) -> Result<ParsedDocstring, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let titles: Vec<(usize, Section)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| RE_TITLE.captures(line).map(|c| (i, section_kind(&c[1]))))
        .collect();

    let description_end = titles.first().map_or(lines.len(), |(i, _)| *i);
    let mut doc = ParsedDocstring {
        description: lines[..description_end].join("\n").trim().to_string(),
        ..Default::default()
    };

    for (n, &(start, kind)) in titles.iter().enumerate() {
        let end = titles.get(n + 1).map_or(lines.len(), |(i, _)| *i);
        parse_section(&mut doc, kind, &lines[start + 1..end])?;
    }

    Ok(doc)
}

fn parse_section(doc: &mut ParsedDocstring, kind: Section, body: &[&str]) -> Result<(), ParseError> {
    let Some(first) = body.iter().position(|l| !l.trim().is_empty()) else {
        return Ok(());
    };
    let last = body.iter().rposition(|l| !l.trim().is_empty()).unwrap_or(first);
    let body = &body[first..=last];

    let indent = indent_width(body[0]);
    if indent == 0 {
        return Err(ParseError(format!(
            "can't infer indent from \"{}\"",
            body[0].trim()
        )));
    }

    match kind {
        Section::Ignored => {}
        Section::Returns => doc.returns = Some(return_field(body)),
        Section::Yields => {
            if doc.returns.is_none() {
                doc.returns = Some(return_field(body));
            }
        }
        Section::Params => {
            for chunk in split_items(body, indent) {
                doc.params.push(param_field(&chunk)?);
            }
        }
        Section::Raises => {
            for chunk in split_items(body, indent) {
                let (before, description) = split_colon(&chunk)?;
                doc.raises.push(Field {
                    name: None,
                    type_name: Some(before).filter(|t| !t.is_empty()),
                    description,
                });
            }
        }
    }
    Ok(())
}

/// Group section lines into items; an item starts at the section indent.
fn split_items<'a>(body: &[&'a str], indent: usize) -> Vec<Vec<&'a str>> {
    let mut items: Vec<Vec<&str>> = Vec::new();
    for line in body {
        let starts_item = !line.trim().is_empty() && indent_width(line) <= indent;
        match items.last_mut() {
            Some(item) if !starts_item => item.push(line),
            _ => items.push(vec![line]),
        }
    }
    items
}

/// Split an item at its first colon into the spec and the description.
fn split_colon(chunk: &[&str]) -> Result<(String, Option<String>), ParseError> {
    let head = chunk[0].trim();
    let Some((before, after)) = head.split_once(':') else {
        return Err(ParseError(format!("expected a colon in \"{}\"", head)));
    };

    let mut lines = vec![after.trim().to_string()];
    lines.extend(dedent(&chunk[1..]));
    Ok((before.trim().to_string(), join_text(&lines)))
}

fn param_field(chunk: &[&str]) -> Result<Field, ParseError> {
    let (spec, description) = split_colon(chunk)?;
    let field = match RE_PARAM_SPEC.captures(&spec) {
        Some(caps) => Field {
            name: Some(caps[1].to_string()),
            type_name: clean_type(&caps[2]),
            description,
        },
        None => Field {
            name: Some(spec),
            type_name: None,
            description,
        },
    };
    Ok(field)
}

fn return_field(body: &[&str]) -> Field {
    let lines = dedent(body);
    if let Some(caps) = RE_RETURN_SPEC.captures(&lines[0]) {
        let mut rest = vec![caps[2].trim().to_string()];
        rest.extend(lines[1..].iter().cloned());
        return Field {
            name: None,
            type_name: Some(caps[1].trim().to_string()),
            description: join_text(&rest),
        };
    }
    Field {
        name: None,
        type_name: None,
        description: join_text(&lines),
    }
}
