//! Epydoc docstrings: `@param name: text`, `@type name: type`, `@return:` …

use super::{clean_type, dedent, join_text, Field, ParseError, ParsedDocstring};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

// `@key [arg]: text`
static RE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+)(?:\s+([^:]+?))?\s*:\s*(.*)$").unwrap());

pub fn parse(text: &str) -> Result<ParsedDocstring, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let first_field = lines
        .iter()
        .position(|l| l.trim_start().starts_with('@'))
        .unwrap_or(lines.len());

    let mut doc = ParsedDocstring {
        description: lines[..first_field].join("\n").trim().to_string(),
        ..Default::default()
    };

    let mut params: Vec<Field> = Vec::new();
    let mut types: HashMap<String, String> = HashMap::new();
    let mut return_desc: Option<String> = None;
    let mut return_type: Option<String> = None;

    for chunk in split_fields(&lines[first_field..]) {
        let head = chunk[0].trim();
        let caps = RE_FIELD
            .captures(head)
            .ok_or_else(|| ParseError(format!("error parsing meta information near \"{}\"", head)))?;

        let key = &caps[1];
        let arg = caps.get(2).map(|m| m.as_str().trim().to_string());
        let mut body = vec![caps[3].trim().to_string()];
        body.extend(dedent(&chunk[1..]));
        let value = join_text(&body);

        match key {
            "param" | "parameter" | "arg" | "argument" | "key" | "keyword" | "ivar" | "cvar"
            | "var" => params.push(Field {
                name: arg,
                type_name: None,
                description: value,
            }),
            "type" => {
                if let (Some(name), Some(type_name)) = (arg, value) {
                    types.insert(name, type_name);
                }
            }
            "return" | "returns" => return_desc = value,
            "rtype" => return_type = value,
            "raise" | "raises" | "except" | "exception" => doc.raises.push(Field {
                name: None,
                type_name: arg,
                description: value,
            }),
            _ => {}
        }
    }

    for mut param in params {
        if let Some(type_name) = param.name.as_ref().and_then(|n| types.get(n)) {
            param.type_name = clean_type(type_name);
        }
        doc.params.push(param);
    }

    if return_desc.is_some() || return_type.is_some() {
        doc.returns = Some(Field {
            name: None,
            type_name: return_type,
            description: return_desc,
        });
    }

    Ok(doc)
}

/// Group lines into fields; each field starts with `@`.
fn split_fields<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut fields: Vec<Vec<&str>> = Vec::new();
    for line in lines {
        if line.trim_start().starts_with('@') {
            fields.push(vec![line]);
        } else if let Some(field) = fields.last_mut() {
            field.push(line);
        }
    }
    fields
}
