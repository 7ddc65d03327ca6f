//! Web Linking (RFC 8288) metadata parsed from `Link` response headers

use std::collections::HashMap;

/// Relation a WebSub topic uses to name its hub
pub const REL_HUB: &str = "hub";
/// Relation a WebSub topic uses to name itself
pub const REL_SELF: &str = "self";
/// Short form of the LDP inbox relation
pub const REL_INBOX: &str = "inbox";
/// Full IRI of the LDP inbox relation
pub const LDP_INBOX: &str = "http://www.w3.org/ns/ldp#inbox";

/// Relation name → target URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMetadata {
    relations: HashMap<String, String>,
}

impl LinkMetadata {
    /// Parse one or more `Link` header values.
    ///
    /// Relation names are lowercased. A `rel` listing several relation types
    /// registers the URL under each; a relation seen twice keeps the last URL.
    pub fn parse<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut relations = HashMap::new();
        for header in headers {
            for link in parse_link_values(header) {
                if let Some(rel) = link.param("rel") {
                    for name in rel.split_whitespace() {
                        relations.insert(name.to_ascii_lowercase(), link.target.clone());
                    }
                }
            }
        }
        Self { relations }
    }

    pub fn get(&self, relation: &str) -> Option<&str> {
        self.relations
            .get(&relation.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// First relation among `names` that is present
    pub fn get_any(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get(name))
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }
}

#[derive(Debug)]
struct LinkValue {
    target: String,
    params: Vec<(String, String)>,
}

impl LinkValue {
    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Split a header into `<uri>; key=value` link values.
///
/// Commas and semicolons inside `<...>` or quoted strings do not split.
/// Malformed link values are skipped up to the next top-level comma.
fn parse_link_values(header: &str) -> Vec<LinkValue> {
    let mut links = Vec::new();
    let mut chars = header.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some('<') => {}
            Some(_) => {
                skip_past_comma(&mut chars);
                continue;
            }
        }

        let mut target = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '>' {
                closed = true;
                break;
            }
            target.push(c);
        }
        if !closed {
            break;
        }

        let mut params = Vec::new();
        loop {
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }
            match chars.peek() {
                Some(';') => {
                    chars.next();
                }
                _ => break,
            }
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '=' || c == ';' || c == ',' {
                    break;
                }
                name.push(c);
                chars.next();
            }

            let mut value = String::new();
            if chars.peek() == Some(&'=') {
                chars.next();
                while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                    chars.next();
                }
                if chars.peek() == Some(&'"') {
                    chars.next();
                    while let Some(c) = chars.next() {
                        match c {
                            '\\' => {
                                if let Some(escaped) = chars.next() {
                                    value.push(escaped);
                                }
                            }
                            '"' => break,
                            _ => value.push(c),
                        }
                    }
                } else {
                    while let Some(&c) = chars.peek() {
                        if c == ';' || c == ',' {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }

            let name = name.trim();
            if !name.is_empty() {
                params.push((name.to_string(), value.trim().to_string()));
            }
        }

        links.push(LinkValue {
            target: target.trim().to_string(),
            params,
        });

        // Anything trailing before the next comma is garbage
        skip_past_comma(&mut chars);
    }

    links
}

fn skip_past_comma(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    let mut in_uri = false;
    let mut in_quotes = false;
    for c in chars.by_ref() {
        match c {
            '<' if !in_quotes => in_uri = true,
            '>' if !in_quotes => in_uri = false,
            '"' if !in_uri => in_quotes = !in_quotes,
            ',' if !in_uri && !in_quotes => return,
            _ => {}
        }
    }
}
