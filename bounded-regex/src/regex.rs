//! The public matcher facade.

use std::fmt::{self, Debug, Formatter};

use bitflags::bitflags;
use bon::bon;

use crate::{
    engine::{self, Cache},
    error::Error,
    matches::{Captures, Match},
};

bitflags! {
    /// Matching mode flags, combinable with `|`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Mode: u8 {
        /// Fold ASCII letters when comparing pattern and haystack.
        const CASE_INSENSITIVE = 1 << 0;
        /// `^` and `$` also match right after and before `\r` or `\n`.
        const MULTI_LINE = 1 << 1;
        /// `.` also matches `\r` and `\n`.
        const SINGLE_LINE = 1 << 2;
    }
}

/// A regular expression over byte haystacks, matched with fixed working
/// memory and bounded backtracking.
///
/// The pattern is held verbatim and tokenized while matching — there is no
/// compiled program — so pattern errors surface from the match methods
/// rather than from construction.
///
/// # Example
///
/// ```
/// use bounded_regex::Regex;
///
/// let re = Regex::builder(r"(\w+)@(\w+)\.com").build();
/// let caps = re.captures(b"mail bob@example.com today")?.expect("should match");
/// assert_eq!(caps.bytes(1), Some(&b"bob"[..]));
/// assert_eq!(caps.bytes(2), Some(&b"example"[..]));
/// # Ok::<(), bounded_regex::Error>(())
/// ```
///
/// # Syntax
///
/// Literal bytes; `\` escapes including `\xHH`; classes `[...]` with `^`
/// negation, ranges over word bytes and the class escapes
/// `\w \W \d \D \s \S \h`; `.`; anchors `^ $ \b \B`; alternation `|`;
/// greedy quantifiers `? * + {n} {n,} {n,m}`; capturing `(...)` and
/// non-capturing `(?:...)` groups. Lookaround, backreferences, named
/// groups and lazy quantifiers are not recognized.
#[derive(Clone)]
pub struct Regex {
    pattern: Box<[u8]>,
    mode: Mode,
}

#[bon]
impl Regex {
    /// Builds a regex in the given matching modes.
    ///
    /// ```
    /// use bounded_regex::Regex;
    ///
    /// let re = Regex::builder("^item-[0-9]+$")
    ///     .case_insensitive(true)
    ///     .build();
    /// assert!(re.is_match(b"Item-42")?);
    /// # Ok::<(), bounded_regex::Error>(())
    /// ```
    #[builder]
    pub fn new(
        #[builder(start_fn)] pattern: &str,

        /// Fold ASCII letters when comparing pattern and haystack.
        #[builder(default = false)]
        case_insensitive: bool,

        /// `^` and `$` also match at `\r`/`\n` boundaries.
        #[builder(default = false)]
        multi_line: bool,

        /// `.` matches `\r` and `\n` too.
        #[builder(default = false)]
        single_line: bool,
    ) -> Self {
        let mut mode = Mode::empty();
        mode.set(Mode::CASE_INSENSITIVE, case_insensitive);
        mode.set(Mode::MULTI_LINE, multi_line);
        mode.set(Mode::SINGLE_LINE, single_line);
        Regex::with_mode(pattern, mode)
    }
}

impl Regex {
    /// Builds a regex from a pattern and a [`Mode`] bitmask.
    pub fn with_mode(pattern: &str, mode: Mode) -> Regex {
        Regex { pattern: pattern.as_bytes().into(), mode }
    }

    /// Returns true if and only if the pattern matches somewhere in the
    /// haystack.
    pub fn is_match(&self, haystack: &[u8]) -> Result<bool, Error> {
        self.find(haystack).map(|m| m.is_some())
    }

    /// Searches for the left-most match and returns its span.
    pub fn find(&self, haystack: &[u8]) -> Result<Option<Match>, Error> {
        let mut cache = Cache::new();
        self.find_with(&mut cache, haystack)
    }

    /// Like [`find`](Regex::find), but reuses a caller-owned [`Cache`].
    pub fn find_with(&self, cache: &mut Cache, haystack: &[u8]) -> Result<Option<Match>, Error> {
        Ok(engine::run(&self.pattern, haystack, self.mode, cache)?.map(|m| m.whole()))
    }

    /// Searches for the left-most match and returns its capture spans:
    /// slot 0 is the whole match, slots `1..` the capturing groups in
    /// pattern order.
    pub fn captures<'h>(&self, haystack: &'h [u8]) -> Result<Option<Captures<'h>>, Error> {
        let mut cache = Cache::new();
        self.captures_with(&mut cache, haystack)
    }

    /// Like [`captures`](Regex::captures), but reuses a caller-owned
    /// [`Cache`]. This is the allocation-free entry point: a `Cache` holds
    /// every table the matcher touches, so one long-lived `Cache` per
    /// caller serves any number of calls.
    pub fn captures_with<'h>(
        &self,
        cache: &mut Cache,
        haystack: &'h [u8],
    ) -> Result<Option<Captures<'h>>, Error> {
        Ok(engine::run(&self.pattern, haystack, self.mode, cache)?
            .map(|m| Captures::new(haystack, m.spans, m.len)))
    }

    /// The pattern bytes this regex was built from.
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

impl Debug for Regex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Regex")
            .field("pattern", &String::from_utf8_lossy(&self.pattern))
            .field("mode", &self.mode)
            .finish()
    }
}
