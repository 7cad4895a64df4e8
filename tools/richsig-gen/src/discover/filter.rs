// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name and visibility filters applied before analysis.

use regex::Regex;

use super::{CandidateFunction, Discovery, DiscoveryError};

/// Selects candidates by function name and visibility.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    func: Regex,
    exclude: Option<Regex>,
    include_unexported: bool,
}

impl CandidateFilter {
    /// `exclude` may be empty to disable exclusion.
    pub fn new(func: &str, exclude: &str, include_unexported: bool) -> Result<Self, DiscoveryError> {
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(Regex::new(exclude)?)
        };
        Ok(Self {
            func: Regex::new(func)?,
            exclude,
            include_unexported,
        })
    }

    pub fn pattern(&self) -> &str {
        self.func.as_str()
    }

    pub fn matches(&self, candidate: &CandidateFunction) -> bool {
        if !self.include_unexported && !candidate.exported {
            return false;
        }
        if self.exclude.as_ref().is_some_and(|re| re.is_match(&candidate.name)) {
            return false;
        }
        self.func.is_match(&candidate.name)
    }

    pub fn apply<'f, 'd>(
        &'f self,
        discovery: &'d Discovery,
    ) -> impl Iterator<Item = &'d CandidateFunction> + 'f
    where
        'd: 'f,
    {
        discovery.candidates.iter().filter(move |c| self.matches(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::scan_source;

    const SOURCE: &str = r#"
        pub fn parse_header(b: &[u8]) {}
        pub fn parse_body(b: &[u8]) {}
        pub fn fuzz_parse(b: &[u8]) {}
        fn parse_private(b: &[u8]) {}
    "#;

    fn names(filter: &CandidateFilter, discovery: &Discovery) -> Vec<String> {
        filter.apply(discovery).map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_default_excludes_fuzz_and_private() {
        let discovery = scan_source("demo", SOURCE).expect("parse");
        let filter = CandidateFilter::new(".", "^fuzz_", false).expect("regex");
        assert_eq!(names(&filter, &discovery), vec!["parse_header", "parse_body"]);
    }

    #[test]
    fn test_unexported_and_no_exclusion() {
        let discovery = scan_source("demo", SOURCE).expect("parse");
        let filter = CandidateFilter::new("parse", "", true).expect("regex");
        assert_eq!(names(&filter, &discovery).len(), 4);
    }

    #[test]
    fn test_find_one_ambiguous_lists_matches() {
        let discovery = scan_source("demo", SOURCE).expect("parse");
        let filter = CandidateFilter::new("^parse_", "^fuzz_", false).expect("regex");
        match discovery.find_one(&filter) {
            Err(DiscoveryError::Ambiguous { pattern, matches }) => {
                assert_eq!(pattern, "^parse_");
                assert_eq!(matches, vec!["demo::parse_body", "demo::parse_header"]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_find_one_unique_and_missing() {
        let discovery = scan_source("demo", SOURCE).expect("parse");
        let filter = CandidateFilter::new("^parse_body$", "", false).expect("regex");
        assert_eq!(discovery.find_one(&filter).expect("unique").name, "parse_body");

        let filter = CandidateFilter::new("^nothing$", "", false).expect("regex");
        assert!(matches!(
            discovery.find_one(&filter),
            Err(DiscoveryError::NotFound(_))
        ));
    }

    #[test]
    fn test_selection_outlives_filter() {
        let discovery = scan_source("demo", SOURCE).expect("parse");
        let selected: Vec<&CandidateFunction> = {
            let filter = CandidateFilter::new("^parse_body$", "", false).expect("regex");
            filter.apply(&discovery).collect()
        };
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "parse_body");

        let found = {
            let filter = CandidateFilter::new("^parse_header$", "", false).expect("regex");
            discovery.find_one(&filter).expect("unique")
        };
        assert_eq!(found.name, "parse_header");
    }

    #[test]
    fn test_invalid_regex() {
        assert!(matches!(
            CandidateFilter::new("(", "", false),
            Err(DiscoveryError::Regex(_))
        ));
    }
}
