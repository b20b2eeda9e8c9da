//! The compiled-in model catalog.
//!
//! The catalog backs the model picker and the `models` listing. It is
//! advisory: the relay passes unknown model ids through to the provider
//! untouched, so a model missing from this list can still be used with
//! `-m/--model`.

/// One selectable chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

/// Model used when neither the CLI, the config, nor the relay request names
/// one.
pub const DEFAULT_MODEL: &str = "gpt-4o";

pub const MODEL_CATALOG: &[ModelDescriptor] = &[
    ModelDescriptor {
        id: "gpt-4o",
        display_name: "GPT-4o",
        description: "Great for most tasks",
    },
    ModelDescriptor {
        id: "o3",
        display_name: "o3",
        description: "Advanced reasoning",
    },
    ModelDescriptor {
        id: "o4-mini",
        display_name: "o4-mini",
        description: "Fast at complex tasks",
    },
    ModelDescriptor {
        id: "o4-mini-high",
        display_name: "o4-mini-high",
        description: "Great at coding and visual analysis",
    },
];

/// Find a catalog entry by id (case-insensitive).
pub fn find_model(id: &str) -> Option<&'static ModelDescriptor> {
    MODEL_CATALOG.iter().find(|m| m.id.eq_ignore_ascii_case(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_in_the_catalog() {
        assert!(find_model(DEFAULT_MODEL).is_some());
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find_model("GPT-4O").map(|m| m.id), Some("gpt-4o"));
        assert!(find_model("gpt-5-nano").is_none());
    }

    #[test]
    fn every_entry_has_a_description() {
        for model in MODEL_CATALOG {
            assert!(!model.description.is_empty(), "{} lacks a blurb", model.id);
        }
    }
}
