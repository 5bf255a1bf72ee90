// src/api/resolver.rs
//! Turns a [`SpaceSelector`] into concrete spaces.

use super::endpoints::list_spaces;
use super::pagination::{Page, PageWindow};
use super::parser::parse_list_page;
use super::{execute_async, execute_blocking, AsyncTransport, Transport};
use crate::constants::SPACE_LISTING_PAGE_SIZE;
use crate::error::LoaderError;
use crate::error_recovery::RetryPolicy;
use crate::model::{Space, SpaceSelector, SpaceSummary};
use crate::types::SpaceId;
use indexmap::IndexMap;

/// Resolves space selectors against the `/v1/spaces` listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceResolver {
    retry: RetryPolicy,
}

impl SpaceResolver {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Resolves the selector with blocking requests. An id selector makes
    /// no request at all.
    pub fn resolve(
        &self,
        transport: &dyn Transport,
        selector: &SpaceSelector,
    ) -> Result<Vec<Space>, LoaderError> {
        match selector {
            SpaceSelector::Id(id) => Ok(vec![Space::from_id(id.clone())]),
            SpaceSelector::Names(names) => {
                let mut listing = Vec::new();
                let mut window = Some(PageWindow::first(SPACE_LISTING_PAGE_SIZE));
                while let Some(current) = window {
                    let response = execute_blocking(transport, &list_spaces(current), &self.retry)?;
                    window = collect_page(&mut listing, parse_list_page(&response)?, current);
                }
                match_space_names(names, &listing)
            }
        }
    }

    /// Async counterpart of [`SpaceResolver::resolve`].
    pub async fn resolve_async(
        &self,
        transport: &dyn AsyncTransport,
        selector: &SpaceSelector,
    ) -> Result<Vec<Space>, LoaderError> {
        match selector {
            SpaceSelector::Id(id) => Ok(vec![Space::from_id(id.clone())]),
            SpaceSelector::Names(names) => {
                let mut listing = Vec::new();
                let mut window = Some(PageWindow::first(SPACE_LISTING_PAGE_SIZE));
                while let Some(current) = window {
                    let response =
                        execute_async(transport, &list_spaces(current), &self.retry).await?;
                    window = collect_page(&mut listing, parse_list_page(&response)?, current);
                }
                match_space_names(names, &listing)
            }
        }
    }
}

fn collect_page(
    listing: &mut Vec<SpaceSummary>,
    page: Page<SpaceSummary>,
    window: PageWindow,
) -> Option<PageWindow> {
    let next = window.advance(page.returned, page.has_more);
    listing.extend(page.items);
    next
}

/// Matches requested names exactly (case-sensitive) against a listing.
///
/// The result follows the requested order with repeated names collapsed.
/// When several spaces share a name, the first one in listing order wins.
/// Every unmatched name is reported in a single [`LoaderError::SpaceNotFound`].
pub fn match_space_names(
    requested: &[String],
    listing: &[SpaceSummary],
) -> Result<Vec<Space>, LoaderError> {
    let mut by_name: IndexMap<&str, &str> = IndexMap::new();
    for summary in listing {
        let (Some(id), Some(name)) = (summary.id.as_deref(), summary.name.as_deref()) else {
            continue;
        };
        if id.is_empty() {
            continue;
        }
        if let Some(existing) = by_name.get(name) {
            log::warn!(
                "Several spaces are named '{}'; using {} and ignoring {}",
                name,
                existing,
                id
            );
            continue;
        }
        by_name.insert(name, id);
    }

    let mut resolved: IndexMap<&str, Space> = IndexMap::new();
    let mut missing = Vec::new();
    for name in requested {
        if resolved.contains_key(name.as_str()) || missing.contains(name) {
            continue;
        }
        match by_name.get(name.as_str()) {
            Some(id) => {
                let space = Space::named(SpaceId::parse(id)?, name.as_str());
                log::debug!("Resolved space '{}' to {}", name, space.id);
                resolved.insert(name.as_str(), space);
            }
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(LoaderError::SpaceNotFound { names: missing });
    }
    Ok(resolved.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(id: &str, name: &str) -> SpaceSummary {
        SpaceSummary {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
        }
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_names_resolve_in_requested_order() {
        let listing = [summary("1", "A"), summary("2", "B")];
        let spaces = match_space_names(&names(&["B", "A", "B"]), &listing).unwrap();

        let resolved: Vec<(&str, Option<&str>)> = spaces
            .iter()
            .map(|s| (s.id.as_str(), s.name.as_deref()))
            .collect();
        assert_eq!(resolved, vec![("2", Some("B")), ("1", Some("A"))]);
    }

    #[test]
    fn test_duplicate_names_pick_first_listed() {
        let listing = [summary("1", "Work"), summary("2", "Work")];
        let spaces = match_space_names(&names(&["Work"]), &listing).unwrap();
        assert_eq!(spaces[0].id.as_str(), "1");
    }

    #[test]
    fn test_all_missing_names_are_reported() {
        let listing = [summary("1", "A")];
        let err = match_space_names(&names(&["A", "C", "D"]), &listing).unwrap_err();

        match err {
            LoaderError::SpaceNotFound { names } => assert_eq!(names, vec!["C", "D"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let listing = [summary("1", "Personal")];
        assert!(match_space_names(&names(&["personal"]), &listing).is_err());
    }

    #[test]
    fn test_entries_without_id_are_ignored() {
        let listing = [
            SpaceSummary {
                id: None,
                name: Some("A".to_string()),
            },
            summary("2", "A"),
        ];
        let spaces = match_space_names(&names(&["A"]), &listing).unwrap();
        assert_eq!(spaces[0].id.as_str(), "2");
    }
}
