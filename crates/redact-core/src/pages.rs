//! Page selection expressions
//!
//! A selection is a comma separated list of terms:
//! - `5` a single page
//! - `1-3` an inclusive range
//! - `4-` page 4 through the last page
//! - `-3` the first page through page 3
//! - `even` / `odd`
//! - any of the above prefixed with `!` to exclude pages
//!
//! Exclusions are applied after all inclusions. Pages beyond the end of the
//! document are ignored when the selection is resolved.

use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageSelectionError {
    #[error("empty page selection")]
    Empty,

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Page numbers must be >= 1")]
    ZeroPage,

    #[error("Start {start} > end {end}")]
    Reversed { start: u32, end: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Range { start: u32, end: Option<u32> },
    Even,
    Odd,
}

impl Term {
    fn contains(&self, page: u32) -> bool {
        match *self {
            Term::Range { start, end } => page >= start && end.map_or(true, |end| page <= end),
            Term::Even => page % 2 == 0,
            Term::Odd => page % 2 == 1,
        }
    }
}

/// A parsed page selection, resolved lazily against a page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    include: Vec<Term>,
    exclude: Vec<Term>,
}

impl PageSelection {
    /// Every page of the document (`"1-"`).
    pub fn all() -> Self {
        Self {
            include: vec![Term::Range {
                start: 1,
                end: None,
            }],
            exclude: Vec::new(),
        }
    }

    pub fn single(page: u32) -> Self {
        Self {
            include: vec![Term::Range {
                start: page,
                end: Some(page),
            }],
            exclude: Vec::new(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, PageSelectionError> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            match part.strip_prefix('!') {
                Some(negated) => exclude.push(parse_term(negated.trim())?),
                None => include.push(parse_term(part)?),
            }
        }

        if include.is_empty() && exclude.is_empty() {
            return Err(PageSelectionError::Empty);
        }

        // A selection made only of exclusions starts from every page.
        if include.is_empty() {
            include.push(Term::Range {
                start: 1,
                end: None,
            });
        }

        Ok(Self { include, exclude })
    }

    /// Sorted, unique 1-based page numbers within `1..=page_count`.
    pub fn resolve(&self, page_count: u32) -> Vec<u32> {
        let mut pages = BTreeSet::new();
        for page in 1..=page_count {
            if self.include.iter().any(|t| t.contains(page))
                && !self.exclude.iter().any(|t| t.contains(page))
            {
                pages.insert(page);
            }
        }
        pages.into_iter().collect()
    }
}

impl Default for PageSelection {
    fn default() -> Self {
        Self::all()
    }
}

fn parse_page(input: &str) -> Result<u32, PageSelectionError> {
    let page: u32 = input
        .trim()
        .parse()
        .map_err(|_| PageSelectionError::InvalidPage(input.to_string()))?;
    if page == 0 {
        return Err(PageSelectionError::ZeroPage);
    }
    Ok(page)
}

fn parse_term(part: &str) -> Result<Term, PageSelectionError> {
    match part.to_ascii_lowercase().as_str() {
        "even" => return Ok(Term::Even),
        "odd" => return Ok(Term::Odd),
        _ => {}
    }

    if let Some((start, end)) = part.split_once('-') {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() && end.is_empty() {
            return Err(PageSelectionError::InvalidPage(part.to_string()));
        }
        let start = if start.is_empty() { 1 } else { parse_page(start)? };
        let end = if end.is_empty() {
            None
        } else {
            Some(parse_page(end)?)
        };

        if let Some(end) = end {
            if start > end {
                return Err(PageSelectionError::Reversed { start, end });
            }
        }
        return Ok(Term::Range { start, end });
    }

    let page = parse_page(part)?;
    Ok(Term::Range {
        start: page,
        end: Some(page),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        let result = PageSelection::parse("5").unwrap().resolve(10);
        assert_eq!(result, vec![5]);
    }

    #[test]
    fn test_parse_range() {
        let result = PageSelection::parse("1-3").unwrap().resolve(10);
        assert_eq!(result, vec![1, 2, 3]);
    }

    #[test]
    fn test_open_ended_range_reaches_last_page() {
        let result = PageSelection::parse("1-").unwrap().resolve(4);
        assert_eq!(result, vec![1, 2, 3, 4]);
        assert_eq!(PageSelection::all().resolve(4), result);
    }

    #[test]
    fn test_leading_dash_starts_at_first_page() {
        let result = PageSelection::parse("-2").unwrap().resolve(4);
        assert_eq!(result, vec![1, 2]);
    }

    #[test]
    fn test_parse_complex() {
        let result = PageSelection::parse("1-3, 5, 8-10").unwrap().resolve(20);
        assert_eq!(result, vec![1, 2, 3, 5, 8, 9, 10]);
    }

    #[test]
    fn test_parse_deduplicates() {
        let result = PageSelection::parse("1-3, 2-4").unwrap().resolve(10);
        assert_eq!(result, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_exclusion_applies_after_inclusion() {
        let result = PageSelection::parse("!2, 1-4").unwrap().resolve(10);
        assert_eq!(result, vec![1, 3, 4]);
    }

    #[test]
    fn test_only_exclusions_start_from_all_pages() {
        let result = PageSelection::parse("!1").unwrap().resolve(3);
        assert_eq!(result, vec![2, 3]);
    }

    #[test]
    fn test_even_and_odd() {
        assert_eq!(
            PageSelection::parse("even").unwrap().resolve(5),
            vec![2, 4]
        );
        assert_eq!(
            PageSelection::parse("ODD").unwrap().resolve(5),
            vec![1, 3, 5]
        );
    }

    #[test]
    fn test_pages_beyond_document_are_ignored() {
        let result = PageSelection::parse("3-8").unwrap().resolve(4);
        assert_eq!(result, vec![3, 4]);
        assert!(PageSelection::single(1).resolve(0).is_empty());
    }

    #[test]
    fn test_rejects_invalid_terms() {
        assert_eq!(PageSelection::parse(""), Err(PageSelectionError::Empty));
        assert_eq!(PageSelection::parse(" , "), Err(PageSelectionError::Empty));
        assert_eq!(PageSelection::parse("0"), Err(PageSelectionError::ZeroPage));
        assert_eq!(
            PageSelection::parse("5-2"),
            Err(PageSelectionError::Reversed { start: 5, end: 2 })
        );
        assert!(matches!(
            PageSelection::parse("abc"),
            Err(PageSelectionError::InvalidPage(_))
        ));
        assert!(matches!(
            PageSelection::parse("-"),
            Err(PageSelectionError::InvalidPage(_))
        ));
    }
}
