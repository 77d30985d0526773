//! Synthetic data namespace walked by `{{path.to.generator}}` expressions

use chrono::{Duration, Utc};
use rand::{Rng, RngCore};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Value produced by a synthetic generator
#[derive(Debug, Clone, PartialEq)]
pub enum SyntheticValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl SyntheticValue {
    /// Coerce into a JSON string or number
    pub fn into_json(self) -> Value {
        match self {
            SyntheticValue::Text(s) => Value::String(s),
            SyntheticValue::Integer(n) => Value::Number(n.into()),
            SyntheticValue::Float(f) => Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string())),
        }
    }
}

/// A terminal generator function
pub type Generator = fn(&mut dyn RngCore) -> SyntheticValue;

#[derive(Debug, Clone)]
enum Node {
    Namespace(BTreeMap<String, Node>),
    Generator(Generator),
}

/// Tree of namespaces ending in generator functions.
///
/// `Default` provides the built-in `name`, `company`, `internet`, `phone`,
/// `address`, `lorem`, `random`, `datatype` and `date` namespaces.
#[derive(Debug, Clone)]
pub struct SyntheticRegistry {
    root: BTreeMap<String, Node>,
}

impl SyntheticRegistry {
    /// A registry with no generators
    pub fn empty() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }

    /// Register a generator at a dotted path, creating namespaces as needed
    pub fn register(&mut self, path: &str, generator: Generator) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = &mut self.root;
        for segment in parents {
            let node = current
                .entry((*segment).to_string())
                .or_insert_with(|| Node::Namespace(BTreeMap::new()));
            // A generator registered at a parent path is replaced by a namespace
            if !matches!(node, Node::Namespace(_)) {
                *node = Node::Namespace(BTreeMap::new());
            }
            match node {
                Node::Namespace(children) => current = children,
                Node::Generator(_) => return,
            }
        }
        current.insert((*last).to_string(), Node::Generator(generator));
    }

    /// Walk a dotted path and invoke the terminal generator.
    ///
    /// Returns `None` when a segment is undefined or the path stops at a
    /// namespace instead of a generator.
    pub fn resolve(&self, path: &str, rng: &mut dyn RngCore) -> Option<Value> {
        self.lookup(path).map(|generator| generator(rng).into_json())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    fn lookup(&self, path: &str) -> Option<Generator> {
        let mut segments = path.trim().split('.');
        let mut node = self.root.get(segments.next()?)?;
        for segment in segments {
            match node {
                Node::Namespace(children) => node = children.get(segment)?,
                Node::Generator(_) => return None,
            }
        }
        match node {
            Node::Generator(generator) => Some(*generator),
            Node::Namespace(_) => None,
        }
    }
}

impl Default for SyntheticRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("name.firstName", |rng| text(pick(rng, FIRST_NAMES)));
        registry.register("name.lastName", |rng| text(pick(rng, LAST_NAMES)));
        registry.register("name.fullName", |rng| {
            let first = pick(rng, FIRST_NAMES);
            let last = pick(rng, LAST_NAMES);
            SyntheticValue::Text(format!("{first} {last}"))
        });
        registry.register("name.jobTitle", |rng| text(pick(rng, JOB_TITLES)));
        registry.register("company.name", company_name);
        registry.register("company.companyName", company_name);
        registry.register("company.suffix", |rng| text(pick(rng, COMPANY_SUFFIXES)));
        registry.register("company.catchPhrase", |rng| {
            let adjective = pick(rng, ADJECTIVES);
            let noun = pick(rng, NOUNS);
            SyntheticValue::Text(format!("{adjective} {noun} platform"))
        });
        registry.register("internet.email", |rng| {
            let first = pick(rng, FIRST_NAMES).to_lowercase();
            let last = pick(rng, LAST_NAMES).to_lowercase();
            let n = rng.random_range(1..1000);
            SyntheticValue::Text(format!("{first}.{last}{n}@example.com"))
        });
        registry.register("internet.userName", |rng| {
            let first = pick(rng, FIRST_NAMES).to_lowercase();
            let n = rng.random_range(1..10_000);
            SyntheticValue::Text(format!("{first}{n}"))
        });
        registry.register("internet.domainName", domain_name);
        registry.register("internet.url", |rng| match domain_name(rng) {
            SyntheticValue::Text(domain) => SyntheticValue::Text(format!("https://www.{domain}")),
            other => other,
        });
        registry.register("phone.number", |rng| {
            let area = rng.random_range(200..1000);
            let exchange = rng.random_range(200..1000);
            let line = rng.random_range(0..10_000);
            SyntheticValue::Text(format!("({area}) {exchange}-{line:04}"))
        });
        registry.register("address.streetAddress", |rng| {
            let number = rng.random_range(1..10_000);
            let street = pick(rng, LAST_NAMES);
            let kind = pick(rng, STREET_SUFFIXES);
            SyntheticValue::Text(format!("{number} {street} {kind}"))
        });
        registry.register("address.city", |rng| text(pick(rng, CITIES)));
        registry.register("address.state", |rng| text(pick(rng, STATES)));
        registry.register("address.zipCode", |rng| {
            SyntheticValue::Text(format!("{:05}", rng.random_range(501..100_000)))
        });
        registry.register("address.country", |rng| text(pick(rng, COUNTRIES)));
        registry.register("lorem.word", |rng| text(pick(rng, LOREM)));
        registry.register("lorem.words", |rng| SyntheticValue::Text(words(rng, 3)));
        registry.register("lorem.sentence", |rng| {
            let count = rng.random_range(4..10);
            let mut sentence = words(rng, count);
            if let Some(first) = sentence.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            sentence.push('.');
            SyntheticValue::Text(sentence)
        });
        registry.register("random.number", |rng| {
            SyntheticValue::Integer(rng.random_range(0..100_000))
        });
        registry.register("random.float", |rng| {
            let cents: i64 = rng.random_range(0..10_000_000);
            SyntheticValue::Float(cents as f64 / 100.0)
        });
        registry.register("random.boolean", |rng| {
            SyntheticValue::Text(rng.random_bool(0.5).to_string())
        });
        registry.register("random.alphaNumeric", |rng| {
            const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
            let s: String = (0..10)
                .map(|_| CHARS[rng.random_range(0..CHARS.len())] as char)
                .collect();
            SyntheticValue::Text(s)
        });
        registry.register("datatype.uuid", |rng| {
            let mut bytes = [0u8; 16];
            rng.fill_bytes(&mut bytes);
            let id = uuid::Builder::from_random_bytes(bytes).into_uuid();
            SyntheticValue::Text(id.to_string())
        });
        registry.register("date.past", |rng| days_from_today(-rng.random_range(1..=365)));
        registry.register("date.recent", |rng| days_from_today(-rng.random_range(0..=7)));
        registry.register("date.future", |rng| days_from_today(rng.random_range(1..=365)));
        registry.register("date.timestamp", |rng| {
            let at = Utc::now() - Duration::seconds(rng.random_range(0..86_400 * 30));
            SyntheticValue::Text(at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        });
        registry
    }
}

fn pick<'a>(rng: &mut dyn RngCore, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

fn text(s: &str) -> SyntheticValue {
    SyntheticValue::Text(s.to_string())
}

fn words(rng: &mut dyn RngCore, count: usize) -> String {
    (0..count)
        .map(|_| pick(rng, LOREM))
        .collect::<Vec<_>>()
        .join(" ")
}

fn company_name(rng: &mut dyn RngCore) -> SyntheticValue {
    let base = pick(rng, LAST_NAMES);
    let suffix = pick(rng, COMPANY_SUFFIXES);
    SyntheticValue::Text(format!("{base} {suffix}"))
}

fn domain_name(rng: &mut dyn RngCore) -> SyntheticValue {
    let base = pick(rng, LAST_NAMES).to_lowercase();
    let tld = pick(rng, &["com", "net", "org", "io"]);
    SyntheticValue::Text(format!("{base}.{tld}"))
}

fn days_from_today(days: i64) -> SyntheticValue {
    let date = Utc::now().date_naive() + Duration::days(days);
    SyntheticValue::Text(date.format("%Y-%m-%d").to_string())
}

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Carlos", "Dana", "Elena", "Farah", "Grace", "Hugo", "Ines",
    "Jamal", "Kira", "Liam", "Maya", "Noah", "Olga", "Priya", "Quinn", "Rosa", "Sam",
];

const LAST_NAMES: &[&str] = &[
    "Anders", "Baker", "Chen", "Diaz", "Evans", "Fischer", "Garcia", "Hopper", "Ito", "Jones",
    "Kowalski", "Lovelace", "Moreau", "Nakamura", "Okafor", "Patel", "Rossi", "Silva", "Turing",
    "Weber",
];

const JOB_TITLES: &[&str] = &[
    "Account Executive",
    "Data Analyst",
    "Engineering Manager",
    "Operations Lead",
    "Product Designer",
    "Support Specialist",
];

const COMPANY_SUFFIXES: &[&str] = &["Inc", "LLC", "Group", "Partners", "Labs", "Holdings"];

const ADJECTIVES: &[&str] = &["adaptive", "scalable", "seamless", "robust", "intuitive"];

const NOUNS: &[&str] = &["analytics", "workflow", "commerce", "logistics", "messaging"];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Boulevard"];

const CITIES: &[&str] = &[
    "Austin", "Boston", "Denver", "Lisbon", "Lyon", "Osaka", "Portland", "Toronto",
];

const STATES: &[&str] = &["CA", "CO", "MA", "NY", "OR", "TX", "WA"];

const COUNTRIES: &[&str] = &["Canada", "France", "Japan", "Portugal", "United States"];

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "labore", "magna", "aliqua",
];

#[cfg(test)]
#[path = "synthetic_test.rs"]
mod tests;
