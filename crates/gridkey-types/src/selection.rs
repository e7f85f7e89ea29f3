//! Name selection for catalogs (`all` or a comma-separated list).

use std::collections::BTreeSet;

use gridkey_error::{GridKeyError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Named(Vec<String>),
}

impl Selection {
    /// Parse a comma-separated list; blank input or `all` selects everything.
    pub fn parse(value: &str) -> Self {
        let items: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect();
        if items.is_empty() || items.iter().any(|item| item == "all") {
            Self::All
        } else {
            Self::Named(items)
        }
    }

    /// Resolve against the available names; result is sorted and unique.
    pub fn resolve<'a>(
        &self,
        kind: &'static str,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<String>> {
        let available: BTreeSet<&str> = available.into_iter().collect();
        match self {
            Self::All => Ok(available.into_iter().map(str::to_owned).collect()),
            Self::Named(names) => {
                let missing: Vec<String> = names
                    .iter()
                    .filter(|name| !available.contains(name.as_str()))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(GridKeyError::unknown(kind, &missing));
                }
                let selected: BTreeSet<String> = names.iter().cloned().collect();
                Ok(selected.into_iter().collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Selection::parse(""), Selection::All);
        assert_eq!(Selection::parse(" all "), Selection::All);
        assert_eq!(
            Selection::parse("shell, outer,,"),
            Selection::Named(vec!["shell".to_owned(), "outer".to_owned()])
        );
    }

    #[test]
    fn test_resolve_sorts_and_dedups() {
        let selected = Selection::parse("shell,outer,shell")
            .resolve("area source", ["outer", "inner", "shell"])
            .expect("known names");
        assert_eq!(selected, vec!["outer".to_owned(), "shell".to_owned()]);

        let all = Selection::All
            .resolve("area source", ["shell", "inner"])
            .expect("all");
        assert_eq!(all, vec!["inner".to_owned(), "shell".to_owned()]);
    }

    #[test]
    fn test_resolve_reports_unknown_names() {
        let err = Selection::parse("outer,bogus")
            .resolve("area source", ["outer"])
            .expect_err("bogus is unknown");
        assert_eq!(err.to_string(), "unknown area source requested: bogus");
    }
}
