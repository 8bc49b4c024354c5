#![forbid(unsafe_code)]

//! Searchable dropdown shared by list filters and form pickers.

/// Case-insensitive substring match used by every list filter. An empty needle matches.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Any text is accepted; suggestions only assist.
    FreeText { suggestions: Vec<String> },
    /// The committed value must be one of the suggestions.
    Constrained { suggestions: Vec<String> },
}

impl SearchMode {
    pub fn free_text() -> Self {
        SearchMode::FreeText {
            suggestions: Vec::new(),
        }
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            SearchMode::FreeText { suggestions } | SearchMode::Constrained { suggestions } => {
                suggestions
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("{value:?} is not one of the available options")]
    NotAnOption { value: String },
    #[error("a value is required")]
    Empty,
}

#[derive(Clone, Debug)]
pub struct SearchInput {
    mode: SearchMode,
    term: String,
    open: bool,
}

impl SearchInput {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            term: String::new(),
            open: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.term = value.into();
        self
    }

    pub fn mode(&self) -> &SearchMode {
        &self.mode
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn focus(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Replace the suggestion list, keeping the mode and the current term.
    pub fn set_suggestions(&mut self, next: Vec<String>) {
        match &mut self.mode {
            SearchMode::FreeText { suggestions } | SearchMode::Constrained { suggestions } => {
                *suggestions = next;
            }
        }
    }

    /// Keystroke handler. Returns the value the owner should observe.
    pub fn type_text(&mut self, value: impl Into<String>) -> &str {
        self.term = value.into();
        self.open = true;
        &self.term
    }

    /// Suggestions containing the current term, case-insensitively, in suggestion order.
    pub fn options(&self) -> Vec<&str> {
        self.mode
            .suggestions()
            .iter()
            .map(String::as_str)
            .filter(|opt| !opt.trim().is_empty())
            .filter(|opt| contains_ci(opt, &self.term))
            .collect()
    }

    pub fn select(&mut self, option: &str) -> &str {
        self.term = option.to_string();
        self.open = false;
        &self.term
    }

    /// Final value of the input. A term matching a suggestion case-insensitively takes the
    /// suggestion's own spelling; constrained inputs reject anything else.
    pub fn commit(&mut self) -> Result<String, SearchError> {
        self.open = false;
        let term = self.term.trim().to_string();
        let canonical = self
            .mode
            .suggestions()
            .iter()
            .map(|opt| opt.trim())
            .find(|opt| !opt.is_empty() && opt.eq_ignore_ascii_case(&term))
            .map(str::to_string);
        let value = match (&self.mode, canonical) {
            (_, Some(found)) => found,
            (SearchMode::FreeText { .. }, None) => term,
            (SearchMode::Constrained { .. }, None) if term.is_empty() => {
                return Err(SearchError::Empty);
            }
            (SearchMode::Constrained { .. }, None) => {
                return Err(SearchError::NotAnOption { value: term });
            }
        };
        self.term = value.clone();
        Ok(value)
    }
}
