/*!
A [`regex::Regex`] wrapper that derives `PartialEq`/`Clone`/`Debug` by
comparing the pattern source text, so it can sit inside [`crate::parser::filter::Filter`]'s
derives without `regex::Regex` providing those impls itself.
*/
use regex::Regex;
use std::fmt::{self, Debug, Formatter};
use std::ops::Deref;

#[derive(Clone)]
pub struct ComparableRegex(Regex);

impl ComparableRegex {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(ComparableRegex(Regex::new(pattern)?))
    }
}

impl Deref for ComparableRegex {
    type Target = Regex;
    fn deref(&self) -> &Regex {
        &self.0
    }
}

impl PartialEq for ComparableRegex {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl Debug for ComparableRegex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ComparableRegex({})", self.0.as_str())
    }
}
