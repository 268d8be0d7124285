//! Shared fixtures for unit tests

use serde::{Deserialize, Serialize};

use crate::collection::{MemoryCollection, MemoryRecord};
use crate::errors::FieldErrors;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: u64,
    pub example_id: u64,
}

/// `foo` is required; `bar` and `baz` are free-form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Example {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub foo: Option<String>,
    #[serde(default)]
    pub bar: Option<String>,
    #[serde(default)]
    pub baz: Option<String>,
    #[serde(default)]
    pub rank: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<Widget>>,
}

impl MemoryRecord for Example {
    const RELATIONS: &'static [&'static str] = &["widgets"];

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.foo.as_deref().map_or(true, |foo| foo.trim().is_empty()) {
            errors.add("foo", "can't be blank");
        }
        errors
    }

    // Record n owns n widgets
    fn load_relation(&mut self, relation: &str) {
        if relation == "widgets" {
            let owner = self.id.unwrap_or_default();
            self.widgets = Some(
                (1..=owner)
                    .map(|n| Widget {
                        id: owner * 100 + n,
                        example_id: owner,
                    })
                    .collect(),
            );
        }
    }
}

pub fn example(foo: &str, rank: i64) -> Example {
    Example {
        foo: Some(foo.to_string()),
        rank,
        ..Example::default()
    }
}

/// `n` seeded examples `foo-0`..`foo-{n-1}` with ids `1..=n`
pub fn examples(n: usize) -> MemoryCollection<Example> {
    let store = MemoryCollection::new("examples");
    store
        .seed((0..n).map(|i| Example {
            bar: Some(format!("bar-{i}")),
            ..example(&format!("foo-{i}"), i as i64)
        }))
        .expect("seed examples");
    store
}
