//! Textual project writer
//!
//! Renders an encoded project in the old-style plist dialect project files
//! use: tab indentation, `key = value;` entries, `( ... )` arrays and
//! `/* comment */` annotations.

use std::borrow::Cow;

use crate::config::CodecConfig;
use crate::plist::{CommentedString, PlistDictionary, PlistValue};

const HEADER: &str = "// !$*UTF8*$!";

/// Render a top-level project record
pub fn write_project(project: &PlistDictionary, config: &CodecConfig) -> String {
    let mut writer = PlistWriter::default();
    writer.out.push_str(HEADER);
    writer.out.push_str("\n{\n");
    writer.indent = 1;
    for (key, value) in project {
        match value {
            PlistValue::Dictionary(objects) if key.string == "objects" => {
                writer.write_objects(key, objects, config.section_comments)
            }
            _ => writer.write_entry(key, value),
        }
    }
    writer.out.push_str("}\n");
    writer.out
}

/// Render a single `key = value;` record at the indentation objects use
pub fn write_record(key: &CommentedString, value: &PlistValue) -> String {
    let mut writer = PlistWriter {
        indent: 2,
        ..PlistWriter::default()
    };
    writer.write_entry(key, value);
    writer.out
}

#[derive(Default)]
struct PlistWriter {
    out: String,
    indent: usize,
}

impl PlistWriter {
    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn write_entry(&mut self, key: &CommentedString, value: &PlistValue) {
        self.write_indent();
        self.write_commented(key);
        self.out.push_str(" = ");
        self.write_value(value);
        self.out.push_str(";\n");
    }

    fn write_value(&mut self, value: &PlistValue) {
        match value {
            PlistValue::String(s) => self.write_commented(s),
            PlistValue::Array(items) => {
                self.out.push_str("(\n");
                self.indent += 1;
                for item in items {
                    self.write_indent();
                    self.write_value(item);
                    self.out.push_str(",\n");
                }
                self.indent -= 1;
                self.write_indent();
                self.out.push(')');
            }
            PlistValue::Dictionary(dict) => {
                self.out.push_str("{\n");
                self.indent += 1;
                for (key, value) in dict {
                    self.write_entry(key, value);
                }
                self.indent -= 1;
                self.write_indent();
                self.out.push('}');
            }
        }
    }

    fn write_commented(&mut self, s: &CommentedString) {
        self.out.push_str(&quote(&s.string));
        if let Some(comment) = &s.comment {
            self.out.push_str(" /* ");
            self.out.push_str(&comment_text(comment));
            self.out.push_str(" */");
        }
    }

    fn write_objects(&mut self, key: &CommentedString, objects: &PlistDictionary, sections: bool) {
        self.write_indent();
        self.write_commented(key);
        self.out.push_str(" = {\n");
        self.indent += 1;

        let mut current: Option<&str> = None;
        for (reference, record) in objects {
            let isa = record.get("isa").and_then(PlistValue::as_str);
            if sections && isa != current {
                if let Some(previous) = current {
                    self.out.push_str(&format!("/* End {} section */\n", previous));
                }
                if let Some(next) = isa {
                    self.out.push_str(&format!("\n/* Begin {} section */\n", next));
                }
                current = isa;
            }
            self.write_entry(reference, record);
        }
        if let Some(previous) = current {
            self.out.push_str(&format!("/* End {} section */\n", previous));
        }

        self.indent -= 1;
        self.write_indent();
        self.out.push_str("};\n");
    }
}

/// A comment may not close itself early
fn comment_text(comment: &str) -> Cow<'_, str> {
    if comment.contains("*/") {
        Cow::Owned(comment.replace("*/", "(*)/"))
    } else {
        Cow::Borrowed(comment)
    }
}

fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.' | '-')
}

/// Quote and escape `s` unless it can be written bare
pub fn quote(s: &str) -> Cow<'_, str> {
    let bare = !s.is_empty() && s.chars().all(is_bare_char) && !s.contains("___") && !s.contains("//");
    if bare {
        return Cow::Borrowed(s);
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}
