//! Compiler configuration overrides.

use serde_yaml::{Mapping, Value};

/// Ordered set of compiler configuration keys and values.
///
/// Keys keep insertion order so that generated command lines are stable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides(Mapping);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(Value::from(key), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set `key.sub`, creating (or replacing a non-mapping) `key` as needed.
    pub fn set_nested(&mut self, key: &str, sub: &str, value: impl Into<Value>) {
        let slot = self
            .0
            .entry(Value::from(key))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !slot.is_mapping() {
            *slot = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(map) = slot {
            map.insert(Value::from(sub), value.into());
        }
    }

    /// Append `items` to the sequence at `key`, creating it if absent.
    pub fn extend_list<I, S>(&mut self, key: &str, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<Value>,
    {
        let slot = self
            .0
            .entry(Value::from(key))
            .or_insert_with(|| Value::Sequence(Vec::new()));
        if !slot.is_sequence() {
            *slot = Value::Sequence(Vec::new());
        }
        if let Value::Sequence(seq) = slot {
            seq.extend(items.into_iter().map(Into::into));
        }
    }

    /// Glob patterns listed under `exclude_patterns`.
    pub fn exclude_patterns(&self) -> Vec<String> {
        self.get("exclude_patterns")
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().filter_map(Value::as_str).map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// Iterate over top-level keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().filter_map(|(k, v)| k.as_str().map(|k| (k, v)))
    }

    /// Render as `name=value` definitions for the compiler command line.
    ///
    /// Mappings become one `name.key=value` definition per entry, sequences
    /// are comma-joined, booleans are `1`/`0`, and null values are omitted.
    pub fn to_define_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (key, value) in self.iter() {
            push_define(&mut args, key, value);
        }
        args
    }
}

fn push_define(args: &mut Vec<String>, name: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Mapping(map) => {
            for (k, v) in map {
                if let Some(k) = scalar(k) {
                    push_define(args, &format!("{name}.{k}"), v);
                }
            }
        }
        Value::Sequence(seq) => {
            let items: Vec<String> = seq.iter().filter_map(scalar).collect();
            args.push(format!("{name}={}", items.join(",")));
        }
        other => {
            if let Some(text) = scalar(other) {
                args.push(format!("{name}={text}"));
            }
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get() {
        let mut overrides = Overrides::new();
        overrides.set("master_doc", "index");
        overrides.set("master_doc", "intro");

        assert_eq!(overrides.get("master_doc"), Some(&Value::from("intro")));
        assert_eq!(overrides.iter().count(), 1);
    }

    #[test]
    fn test_set_nested_replaces_scalar() {
        let mut overrides = Overrides::new();
        overrides.set("html_theme_options", "oops");
        overrides.set_nested("html_theme_options", "single_page", true);

        let theme = overrides.get("html_theme_options").unwrap();
        assert_eq!(theme.get("single_page"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_extend_list() {
        let mut overrides = Overrides::new();
        overrides.extend_list("exclude_patterns", ["_build"]);
        overrides.extend_list("exclude_patterns", ["drafts/*", "*.tmp"]);

        assert_eq!(
            overrides.exclude_patterns(),
            vec!["_build", "drafts/*", "*.tmp"]
        );
    }

    #[test]
    fn test_define_args() {
        let mut overrides = Overrides::new();
        overrides.set("master_doc", "index");
        overrides.set_nested("html_theme_options", "single_page", true);
        overrides.set_nested("html_theme_options", "repository_url", Value::Null);
        overrides.extend_list("exclude_patterns", ["_build", "Thumbs.db"]);
        overrides.set("google_analytics_id", Value::Null);
        overrides.set("dpi", 96);

        assert_eq!(
            overrides.to_define_args(),
            vec![
                "master_doc=index",
                "html_theme_options.single_page=1",
                "exclude_patterns=_build,Thumbs.db",
                "dpi=96",
            ]
        );
    }
}
