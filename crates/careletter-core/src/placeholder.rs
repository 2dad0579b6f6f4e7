use std::collections::BTreeMap;

/// Values substituted for `{key}` tokens in precedent text.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Placeholders {
    values: BTreeMap<String, String>,
}

/// Result of one substitution pass over a fragment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Substitution {
    pub text: String,
    /// Keys referenced by the fragment but missing from the map, first-seen order.
    pub unresolved: Vec<String>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    pub fn extend<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: ToString,
    {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Replaces every known `{key}` in `text` in a single pass.
    ///
    /// Substituted values are copied as-is and never scanned again, and unknown
    /// keys stay verbatim in the output.
    pub fn substitute(&self, text: &str) -> Substitution {
        let mut out = String::with_capacity(text.len());
        let mut unresolved: Vec<String> = Vec::new();
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match token_key(after) {
                Some(key) => {
                    let token_len = key.len() + 2;
                    match self.values.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str(&rest[open..open + token_len]);
                            if !unresolved.iter().any(|seen| seen == key) {
                                unresolved.push(key.to_string());
                            }
                        }
                    }
                    rest = &rest[open + token_len..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);

        Substitution {
            text: out,
            unresolved,
        }
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Placeholders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut placeholders = Placeholders::new();
        placeholders.extend(iter);
        placeholders
    }
}

/// Returns every `{key}` token name found in `text`, in order of appearance.
pub fn placeholder_keys(text: &str) -> Vec<&str> {
    let mut keys = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match token_key(after) {
            Some(key) => {
                keys.push(key);
                rest = &after[key.len() + 1..];
            }
            None => rest = after,
        }
    }
    keys
}

// `text` starts just after an opening brace.
fn token_key(text: &str) -> Option<&str> {
    let end = text.find(|ch: char| !is_key_char(ch))?;
    if end == 0 || !text[end..].starts_with('}') {
        return None;
    }
    Some(&text[..end])
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::{Placeholders, placeholder_keys};

    #[test]
    fn replaces_every_occurrence() {
        let map = Placeholders::new().with("name", "Ada");
        let result = map.substitute("{name} and {name}");
        assert_eq!(result.text, "Ada and Ada");
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn values_are_not_rescanned() {
        let map = Placeholders::new()
            .with("outer", "{inner}")
            .with("inner", "deep");
        let result = map.substitute("x {outer} y");
        assert_eq!(result.text, "x {inner} y");
    }

    #[test]
    fn unknown_keys_stay_verbatim() {
        let map = Placeholders::new().with("our_ref", "AB/1");
        let result = map.substitute("Our Ref: {our_ref} Your Ref: {your_ref} {your_ref}");
        assert_eq!(result.text, "Our Ref: AB/1 Your Ref: {your_ref} {your_ref}");
        assert_eq!(result.unresolved, vec!["your_ref".to_string()]);
    }

    #[test]
    fn stray_braces_are_literal() {
        let map = Placeholders::new().with("a", "1");
        assert_eq!(map.substitute("{ a } {} {a").text, "{ a } {} {a");
        assert_eq!(map.substitute("{{a}}").text, "{1}");
        assert_eq!(map.substitute("£{a}.00").text, "£1.00");
    }

    #[test]
    fn collects_keys_in_order() {
        assert_eq!(
            placeholder_keys("{b} text {a} {not a key} {b}"),
            vec!["b", "a", "b"]
        );
    }
}
