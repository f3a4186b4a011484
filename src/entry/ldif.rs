//! LDIF rendering of entries (RFC 2849).

use super::Entry;
use crate::schema::Schema;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

const LINE_WIDTH: usize = 76;

/// SAFE-STRING per RFC 2849; anything else is written base64-encoded.
fn is_safe_string(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    let safe_char = |c: char| c.is_ascii() && !matches!(c, '\0' | '\n' | '\r');
    safe_char(first) && !matches!(first, ' ' | ':' | '<') && chars.all(safe_char) && !value.ends_with(' ')
}

fn push_line(out: &mut String, name: &str, value: &str) {
    let line = if is_safe_string(value) {
        format!("{name}: {value}")
    } else {
        format!("{name}:: {}", BASE64.encode(value))
    };
    // Fold long lines; continuation lines start with a single space
    let chars: Vec<char> = line.chars().collect();
    let mut start = 0;
    let mut width = LINE_WIDTH;
    while start < chars.len() {
        let end = (start + width).min(chars.len());
        if start > 0 {
            out.push(' ');
        }
        out.extend(&chars[start..end]);
        out.push('\n');
        start = end;
        width = LINE_WIDTH - 1;
    }
}

impl Entry {
    /// Render the entry as an LDIF content record.
    ///
    /// Object classes are listed first, superclasses included, followed by
    /// the attributes under their display names.
    pub fn to_ldif(&self, schema: &Schema) -> String {
        let mut out = String::new();
        push_line(&mut out, "dn", &self.dn.to_string());
        for class in self.object_classes(schema) {
            push_line(&mut out, "objectClass", class);
        }
        for (oid, values) in &self.attributes {
            let name = schema.attribute_name(oid);
            for value in values {
                push_line(&mut out, name, value);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_strings() {
        assert!(is_safe_string("Test One"));
        assert!(is_safe_string(""));
        assert!(!is_safe_string(" leading"));
        assert!(!is_safe_string(":colon"));
        assert!(!is_safe_string("<angle"));
        assert!(!is_safe_string("trailing "));
        assert!(!is_safe_string("Lučić"));
        assert!(!is_safe_string("two\nlines"));
    }

    #[test]
    fn test_folding() {
        let mut out = String::new();
        let value = "x".repeat(200);
        push_line(&mut out, "description", &value);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.len() > 2);
        assert!(lines.iter().all(|l| l.chars().count() <= LINE_WIDTH));
        assert!(lines[1..].iter().all(|l| l.starts_with(' ')));
        let unfolded: String = lines
            .iter()
            .enumerate()
            .map(|(i, l)| if i == 0 { *l } else { &l[1..] })
            .collect();
        assert_eq!(unfolded, format!("description: {value}"));
    }
}
