/*!
A small byte-oriented regular-expression matcher with fixed memory bounds,
built for embedded and other static-memory environments.

Everything the matcher touches is preallocated to build-time bounds:
nesting depth, alternative branches, backtrack points, captures and a
per-anchor iteration watchdog. There is no compiled program — the pattern
is tokenized while matching — and no allocation inside the match loop, so
working memory is constant regardless of input length. Exceeding any bound
is a fatal [`Error`], distinct from a plain no-match.

## Usage

```
use bounded_regex::Regex;

let re = Regex::builder(r"^(\w+)-(\d+)$").case_insensitive(true).build();
let caps = re.captures(b"Item-42")?.expect("should match");
assert_eq!(caps.bytes(1), Some(&b"Item"[..]));
assert_eq!(caps.bytes(2), Some(&b"42"[..]));
# Ok::<(), bounded_regex::Error>(())
```

Callers that cannot afford per-call setup keep one [`Cache`] alive and use
the `*_with` methods:

```
use bounded_regex::{Cache, Regex};

let re = Regex::builder("[0-9a-f]+").build();
let mut cache = Cache::new();
for line in [&b"ip=7f3a"[..], &b"ip=c0de"[..]] {
    let m = re.find_with(&mut cache, line)?.expect("should match");
    assert_eq!(m.range(), 3..7);
}
# Ok::<(), bounded_regex::Error>(())
```

## Supported syntax

Literal bytes; `\` escapes including `\xHH`; classes `[...]` with `^`
negation, ranges over word bytes and the class escapes
`\w \W \d \D \s \S \h`; `.`; anchors `^ $ \b \B`; alternation `|`; greedy
quantifiers `? * + {n} {n,} {n,m}`; capturing `(...)` and non-capturing
`(?:...)` groups. Haystacks are byte slices treated as 8-bit text; there is
no Unicode awareness, lookaround, backreferences, named groups or lazy
quantifiers.
*/

mod charset;
mod engine;
mod error;
mod matches;
mod regex;
mod syntax;

pub use crate::{
    engine::Cache,
    error::{Error, ErrorKind},
    matches::{Captures, Match},
    regex::{Mode, Regex},
};

/// Maximum group nesting depth, the whole pattern included.
pub const MAX_DEPTH: usize = 5;

/// Maximum number of live alternative-branch records.
pub const MAX_ALTERNATIVES: usize = 24;

/// Maximum number of capture slots, the whole-match slot included.
pub const MAX_CAPTURES: usize = 12;

/// Maximum number of quantifier choice points.
pub const MAX_BACKTRACKS: usize = 32;

/// Tick budget per anchor position before a match attempt is aborted.
pub const MAX_ITERATIONS: u16 = 1024;
