use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Characters that force a property value to be quoted
const QUOTE_TRIGGERS: [char; 7] = [',', '=', ':', '"', '*', '?', '\n'];

/// Hierarchical metric name: a domain plus key properties.
///
/// Renders as `domain:key=value,...` with keys in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectName {
    domain: String,
    properties: BTreeMap<String, String>,
}

impl ObjectName {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\n' => quoted.push_str("\\n"),
            '"' | '*' | '?' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.domain)?;
        for (i, (key, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if value.contains(QUOTE_TRIGGERS) {
                write!(f, "{key}={}", quote(value))?;
            } else {
                write!(f, "{key}={value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_sorts_keys() {
        let name = ObjectName::new("treeline")
            .with_property("type", "timers")
            .with_property("name", "resolve.time");
        assert_eq!(name.to_string(), "treeline:name=resolve.time,type=timers");
    }

    #[test]
    fn test_special_values_are_quoted() {
        let name = ObjectName::new("treeline").with_property("name", "a,b=\"c\"");
        assert_eq!(name.to_string(), r#"treeline:name="a,b=\"c\"""#);
    }
}
