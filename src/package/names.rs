//! Multi-part object names as they appear in model.xml.
//!
//! Every named object in a dacpac is identified by a bracketed, dot-separated
//! path such as `[dbo].[Orders].[CustomerId]`. A `]` inside a part is escaped
//! by doubling it (`[Odd]]Name]` is the single part `Odd]Name`).
//!
//! ```ignore
//! let name = ObjectName::parse("[dbo].[Orders].[Id]");
//! assert_eq!(name.parts(), ["dbo", "Orders", "Id"]);
//! assert_eq!(name.to_string(), "[dbo].[Orders].[Id]");
//! ```

use std::fmt;

/// A hierarchical object name split into its unbracketed parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectName {
    parts: Vec<String>,
    has_name: bool,
}

impl ObjectName {
    /// Parse a bracketed multi-part name. Unbracketed parts are accepted too.
    pub fn parse(name: &str) -> Self {
        Self {
            parts: split_parts(name),
            has_name: true,
        }
    }

    /// Build a name from already-unbracketed parts.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
            has_name: true,
        }
    }

    /// Name of an object declared without an explicit name (e.g. an inline constraint).
    pub fn unnamed() -> Self {
        Self {
            parts: Vec::new(),
            has_name: false,
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn part(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether the object was given an explicit name in its declaration.
    pub fn has_name(&self) -> bool {
        self.has_name
    }

    /// Last part of the name (column name for columns, table name for tables).
    pub fn last(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// Name of a child object, e.g. `[dbo].[T]` + `Id` -> `[dbo].[T].[Id]`.
    pub fn child(&self, name: &str) -> Self {
        let mut parts = self.parts.clone();
        parts.push(name.to_string());
        Self {
            parts,
            has_name: true,
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "[{}]", part.replace(']', "]]"))?;
        }
        Ok(())
    }
}

/// `[schema].[name]`, the form used by the qualified table include-list.
pub fn qualified_name(schema: &str, name: &str) -> String {
    format!("[{}].[{}]", schema, name)
}

fn split_parts(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut chars = name.trim().chars().peekable();

    while chars.peek().is_some() {
        let mut part = String::new();
        if chars.peek() == Some(&'[') {
            chars.next();
            while let Some(c) = chars.next() {
                if c == ']' {
                    if chars.peek() == Some(&']') {
                        chars.next();
                        part.push(']');
                        continue;
                    }
                    break;
                }
                part.push(c);
            }
            // Skip anything between the closing bracket and the separator
            for c in chars.by_ref() {
                if c == '.' {
                    break;
                }
            }
        } else {
            for c in chars.by_ref() {
                if c == '.' {
                    break;
                }
                part.push(c);
            }
            part = part.trim().to_string();
        }
        parts.push(part);
    }

    parts
}
