// src/search/pattern.rs
// =============================================================================
// Regular expression matching over gist file contents.
//
// We use the `regex` crate. Its `is_match` already has search semantics: it
// reports a match anywhere in the text, not only when the whole text matches.
// Matching runs in linear time, so the dialect has no lookaround and no
// backreferences; patterns using them fail to compile.
// =============================================================================

use regex::Regex;

use super::error::SearchError;
use crate::github::Gist;

// A compiled search pattern
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    // Compiles `pattern`, returning the regex crate's error on bad syntax
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self { regex: Regex::new(pattern)? })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    // Returns the name of the first file in `gist` whose content matches.
    //
    // Scanning stops at the first hit. A file without content reached before
    // that is an error: the gist was not fetched in full.
    pub fn first_matching_file<'a>(&self, gist: &'a Gist) -> Result<Option<&'a str>, SearchError> {
        for (name, file) in &gist.files {
            let content = file.content.as_deref().ok_or_else(|| SearchError::MissingContent {
                gist_id: gist.id.clone(),
                file: name.clone(),
            })?;

            if self.matches(content) {
                return Ok(Some(name.as_str()));
            }
        }
        Ok(None)
    }
}
