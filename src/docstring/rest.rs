//! reStructuredText (Sphinx) field lists: `:param name:`, `:returns:`, …

use super::{clean_type, dedent, join_text, Field, ParseError, ParsedDocstring};
use std::collections::HashMap;

pub fn parse(text: &str) -> Result<ParsedDocstring, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let first_field = lines
        .iter()
        .position(|l| l.starts_with(':'))
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
        let head = &chunk[0][1..];
        let Some((spec, rest)) = head.split_once(':') else {
            return Err(ParseError(format!(
                "error parsing meta information near \"{}\"",
                chunk[0].trim()
            )));
        };

        let mut body = vec![rest.trim().to_string()];
        body.extend(dedent(&chunk[1..]));
        let value = join_text(&body);

        let words: Vec<&str> = spec.split_whitespace().collect();
        let Some((&key, args)) = words.split_first() else {
            return Err(ParseError(format!("empty field near \"{}\"", chunk[0].trim())));
        };

        match key {
            "param" | "parameter" | "arg" | "argument" | "key" | "keyword" | "ivar" | "cvar"
            | "var" => {
                // `:param name:` or `:param type name:`
                let Some((name, type_words)) = args.split_last() else {
                    return Err(ParseError(format!("missing name in \"{}\"", chunk[0].trim())));
                };
                params.push(Field {
                    name: Some(name.to_string()),
                    type_name: clean_type(&type_words.join(" ")),
                    description: value,
                });
            }
            "type" => {
                if let (Some(name), Some(type_name)) = (args.first(), value) {
                    types.insert(name.to_string(), type_name);
                }
            }
            "returns" | "return" => {
                return_desc = value;
                if !args.is_empty() {
                    return_type = Some(args.join(" "));
                }
            }
            "rtype" => return_type = value,
            "raises" | "raise" | "except" | "exception" => doc.raises.push(Field {
                name: None,
                type_name: (!args.is_empty()).then(|| args.join(" ")),
                description: value,
            }),
            _ => {}
        }
    }

    for mut param in params {
        if param.type_name.is_none() {
            if let Some(type_name) = param.name.as_ref().and_then(|n| types.get(n)) {
                param.type_name = clean_type(type_name);
            }
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

/// Group lines into fields; each field starts with `:` at column 0.
fn split_fields<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut fields: Vec<Vec<&str>> = Vec::new();
    for line in lines {
        if line.starts_with(':') {
            fields.push(vec![line]);
        } else if let Some(field) = fields.last_mut() {
            field.push(line);
        }
    }
    fields
}
