//! Human-readable rendering of values for failure messages.
//!
//! Tokens callers match against:
//! - `<null>` for absent references
//! - `{empty}` for zero-length sequences and dictionaries
//! - `{1, 2, 3}` for populated sequences

use equivalency_path::quote_key;

use crate::value::Value;

const MAX_DEPTH: usize = 4;
const MAX_ITEMS: usize = 32;

pub const NULL: &str = "<null>";
pub const EMPTY: &str = "{empty}";

/// Describes one value.
pub fn describe(value: &Value) -> String {
    let mut out = String::new();
    let mut stack = Vec::new();
    write_value(&mut out, value, &mut stack);
    out
}

/// Describes already materialized items as a sequence.
pub fn describe_list(items: &[Value]) -> String {
    if items.is_empty() {
        return EMPTY.to_string();
    }
    let mut out = String::new();
    let mut stack = Vec::new();
    write_items(&mut out, items, &mut stack);
    out
}

/// Renders a dictionary key for use inside a breadcrumb.
pub fn describe_key(key: &Value) -> String {
    match key {
        Value::Str(s) => quote_key(s),
        other => describe(other),
    }
}

fn write_items(out: &mut String, items: &[Value], stack: &mut Vec<usize>) {
    out.push('{');
    for (i, item) in items.iter().take(MAX_ITEMS).enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_value(out, item, stack);
    }
    if items.len() > MAX_ITEMS {
        out.push_str(", …");
    }
    out.push('}');
}

fn write_value(out: &mut String, value: &Value, stack: &mut Vec<usize>) {
    if let Some(id) = value.reference_id() {
        if stack.contains(&id) {
            out.push_str("{cyclic reference}");
            return;
        }
        if stack.len() >= MAX_DEPTH {
            out.push_str("{…}");
            return;
        }
        stack.push(id);
    }

    match value {
        Value::Null => out.push_str(NULL),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format!("{f:?}")),
        Value::Str(s) => out.push_str(&quote_key(s)),
        Value::Enum(e) => {
            out.push_str(e.ty().name());
            out.push_str("::");
            out.push_str(e.name());
        }
        Value::Seq(seq) => {
            let items = seq.items();
            if items.is_empty() {
                out.push_str(EMPTY);
            } else {
                write_items(out, &items, stack);
            }
        }
        Value::Dict(dict) => {
            let entries = dict.entries();
            if entries.is_empty() {
                out.push_str(EMPTY);
            } else {
                out.push('{');
                for (i, (key, item)) in entries.iter().take(MAX_ITEMS).enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push('[');
                    write_value(out, key, stack);
                    out.push_str("] = ");
                    write_value(out, item, stack);
                }
                if entries.len() > MAX_ITEMS {
                    out.push_str(", …");
                }
                out.push('}');
            }
        }
        Value::Object(object) => {
            if !object.is_anonymous() {
                out.push_str(object.ty().name());
                out.push(' ');
            }
            let fields = object.fields();
            out.push_str("{ ");
            for (i, (name, item)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(name);
                out.push_str(" = ");
                write_value(out, item, stack);
            }
            out.push_str(if fields.is_empty() { "}" } else { " }" });
        }
    }

    if value.reference_id().is_some() {
        stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{self, TypeBuilder};
    use crate::value::{Dict, EnumValue, Object, Seq};

    #[test]
    fn contract_tokens() {
        assert_eq!(describe(&Value::Null), "<null>");
        assert_eq!(describe(&Seq::of([1, 2, 3]).into()), "{1, 2, 3}");
        assert_eq!(describe(&Seq::of(Vec::<Value>::new()).into()), "{empty}");
        assert_eq!(describe_list(&[]), "{empty}");
        assert_eq!(describe_list(&[3.into(), 6.into()]), "{3, 6}");
    }

    #[test]
    fn scalars() {
        assert_eq!(describe(&"hi \"you\"".into()), "\"hi \\\"you\\\"\"");
        assert_eq!(describe(&1.5.into()), "1.5");
        assert_eq!(describe(&2.0.into()), "2.0");
        assert_eq!(describe(&true.into()), "true");
        let color = types::enumeration("Color");
        assert_eq!(describe(&EnumValue::new(color, "Red", 1).into()), "Color::Red");
    }

    #[test]
    fn composites() {
        let dict = Dict::new(types::string(), types::int()).with("a", 1);
        assert_eq!(describe(&dict.into()), "{[\"a\"] = 1}");

        let ty = TypeBuilder::object("Customer")
            .member("Name", types::string())
            .build();
        let customer = Object::new(ty).with("Name", "John");
        assert_eq!(describe(&customer.into()), "Customer { Name = \"John\" }");

        let anon = Object::anonymous([("A", 1)]);
        assert_eq!(describe(&anon.into()), "{ A = 1 }");
    }

    #[test]
    fn cycles_are_cut() {
        let node = Object::anonymous([("Child", Value::Null)]);
        node.set("Child", node.clone());
        assert_eq!(describe(&node.into()), "{ Child = {cyclic reference} }");
    }

    #[test]
    fn keys_are_quoted_for_paths() {
        assert_eq!(describe_key(&"admin".into()), "\"admin\"");
        assert_eq!(describe_key(&42.into()), "42");
    }
}
