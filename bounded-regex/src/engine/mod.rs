//! The segment matcher. Parsing and matching are interleaved: every tick
//! re-parses one atom at the current pattern cursor, consumes input
//! greedily, and on failure consults the backtrack and alternative tables
//! to pick the next quantifier count or branch to try. One segment exists
//! per nesting level; the fixed-depth segment array is the recursion stack.

pub(crate) mod altseg;
pub(crate) mod backtrack;
pub(crate) mod caps;

use crate::{
    charset,
    error::{Error, ErrorKind},
    matches::Match,
    regex::Mode,
    syntax::{self, byte_at, fold, Anchor, AtomKind},
    MAX_CAPTURES, MAX_DEPTH, MAX_ITERATIONS,
};

use self::{altseg::AltSegSet, backtrack::BacktrackSet, caps::CapSet};

/// Matcher state for one nesting level: the whole pattern at depth 0, a
/// group body at deeper levels.
#[derive(Clone, Copy, Debug, Default)]
struct Segment {
    pat_base: usize,
    pat_cur: usize,
    in_base: usize,
    in_cur: usize,
    /// Where the current group iteration's capture starts; advances across
    /// repeated iterations of the group.
    cap_base: usize,
    atom_occ: u16,
    seg_occ: u16,
    is_capture: bool,
    parse_failed: bool,
    /// The group quantifier's minimum is satisfied; earlier iterations are
    /// final and no backtracking may undo them.
    enough_occ: bool,
    /// At least one input byte was consumed since the last group
    /// iteration started. Guards against zero-width looping.
    char_acquired: bool,
}

/// Preallocated working state for one match call: the segment stack, the
/// three bookkeeping tables and the watchdog.
///
/// Every bound is fixed at build time, so a `Cache` never allocates after
/// construction and its size does not depend on the pattern or the
/// haystack. Allocate one per caller and reuse it via
/// [`Regex::captures_with`](crate::Regex::captures_with); the convenience
/// methods build a transient one per call.
#[derive(Clone, Debug)]
pub struct Cache {
    segments: [Segment; MAX_DEPTH],
    backtracks: BacktrackSet,
    alt_segs: AltSegSet,
    caps: CapSet,
    iterations: u16,
}

impl Cache {
    pub fn new() -> Cache {
        Cache {
            segments: [Segment::default(); MAX_DEPTH],
            backtracks: BacktrackSet::new(),
            alt_segs: AltSegSet::new(),
            caps: CapSet::new(),
            iterations: 0,
        }
    }

    fn reset(&mut self) {
        self.segments = [Segment::default(); MAX_DEPTH];
        self.backtracks.clear();
        self.alt_segs.clear();
        self.caps.reset();
        self.iterations = 0;
    }
}

impl Default for Cache {
    fn default() -> Cache {
        Cache::new()
    }
}

/// Compacted capture spans of a successful match.
pub(crate) struct Matched {
    pub(crate) spans: [(usize, usize); MAX_CAPTURES],
    pub(crate) len: usize,
}

impl Matched {
    pub(crate) fn whole(&self) -> Match {
        Match { start: self.spans[0].0, end: self.spans[0].1 }
    }
}

/// Runs one match call over `haystack`. `Ok(None)` is a plain no-match;
/// fatal errors carry the pattern offset where they were detected.
pub(crate) fn run(
    pattern: &[u8],
    haystack: &[u8],
    mode: Mode,
    cache: &mut Cache,
) -> Result<Option<Matched>, Error> {
    cache.reset();
    let mut engine = Engine {
        pattern,
        haystack,
        ci: mode.contains(Mode::CASE_INSENSITIVE),
        multi_line: mode.contains(Mode::MULTI_LINE),
        single_line: mode.contains(Mode::SINGLE_LINE),
        cache,
    };
    if let Err(kind) = engine.init_segment(0, 0, 0, false) {
        return Err(Error::new(kind, 0));
    }
    match engine.match_segment(0) {
        Ok(true) => {
            let seg = engine.cache.segments[0];
            engine.cache.caps.set_whole(seg.in_base, seg.in_cur - seg.in_base);
            let (spans, len) = engine.cache.caps.compact();
            Ok(Some(Matched { spans, len }))
        }
        Ok(false) => Ok(None),
        Err(kind) => Err(Error::new(kind, engine.cache.segments[0].pat_cur)),
    }
}

struct Engine<'a> {
    pattern: &'a [u8],
    haystack: &'a [u8],
    ci: bool,
    multi_line: bool,
    single_line: bool,
    cache: &'a mut Cache,
}

/// Continuation after handling a group close.
enum Flow {
    /// Run another iteration of the group from its base.
    Continue,
    /// The group is decided; unwind to the caller.
    Return(bool),
}

/// Continuation after the shared segment-fail handler.
enum FailFlow {
    /// Bookkeeping was rewound; resume the tick loop.
    Retry,
    /// A closing paren was found; handle it with the quantifier parsed
    /// after it, with `parse_failed` set.
    Close(u16, u16),
    /// The segment is decided; unwind to the caller.
    Return(bool),
}

/// What a forward scan for `|` or `)` at the current nesting found.
enum ScanHit {
    End,
    Close,
    Pipe,
}

impl Engine<'_> {
    fn init_segment(
        &mut self,
        depth: usize,
        input_at: usize,
        pat_at: usize,
        is_capture: bool,
    ) -> Result<(), ErrorKind> {
        if depth >= MAX_DEPTH {
            return Err(ErrorKind::TooDeep);
        }
        self.cache.segments[depth] = Segment {
            pat_base: pat_at,
            pat_cur: pat_at,
            in_base: input_at,
            in_cur: input_at,
            cap_base: input_at,
            is_capture,
            ..Segment::default()
        };
        Ok(())
    }

    fn match_segment(&mut self, depth: usize) -> Result<bool, ErrorKind> {
        {
            let seg = &mut self.cache.segments[depth];
            seg.seg_occ = 0;
            seg.parse_failed = false;
            seg.enough_occ = false;
            seg.char_acquired = false;
        }
        if let Some(base) = self.cache.alt_segs.get(self.cache.segments[depth].pat_base) {
            self.cache.segments[depth].pat_cur = base;
        }

        'tick: loop {
            self.cache.segments[depth].atom_occ = 0;

            if self.cache.iterations >= MAX_ITERATIONS {
                return Err(ErrorKind::TooManyIterations);
            }
            self.cache.iterations += 1;

            let atom = syntax::atom_at(
                self.pattern,
                self.cache.segments[depth].pat_cur,
                self.ci,
                self.single_line,
            )?;
            if atom.min < atom.max {
                self.cache.backtracks.add(atom.after)?;
            }
            self.cache.segments[depth].pat_cur = atom.after;

            match atom.kind {
                AtomKind::End => {
                    if depth > 0 {
                        // pattern ran out inside a group
                        return Err(ErrorKind::Syntax);
                    }
                    return Ok(true);
                }

                AtomKind::Pipe => {
                    if depth == 0 {
                        // a matched branch terminates the whole pattern;
                        // the cursor steps back onto the |
                        self.cache.segments[0].pat_cur -= 1;
                        return Ok(true);
                    }
                    // the branch matched: remember where the next branch
                    // starts, then treat the group's ) as reached
                    self.save_capture(depth)?;
                    let seg = self.cache.segments[depth];
                    self.cache.alt_segs.add(seg.pat_base, seg.pat_cur)?;
                    match self.scan_segment(depth, false)? {
                        ScanHit::Close => {
                            let (min, max) = self.take_quantifier(depth)?;
                            match self.close_group(depth, min, max)? {
                                Flow::Return(matched) => return Ok(matched),
                                Flow::Continue => continue 'tick,
                            }
                        }
                        _ => return Err(ErrorKind::Syntax),
                    }
                }

                AtomKind::Char(_) | AtomKind::Class(_) => {
                    let mut max = atom.max;
                    loop {
                        let in_cur = self.cache.segments[depth].in_cur;
                        let byte = byte_at(self.haystack, in_cur);
                        let mut hit = match atom.kind {
                            AtomKind::Char(c) => {
                                if self.ci {
                                    fold(byte) == fold(c)
                                } else {
                                    byte == c
                                }
                            }
                            AtomKind::Class(set) => {
                                set.contains(if self.ci { fold(byte) } else { byte })
                            }
                            _ => unreachable!(),
                        };
                        let slot_cap = if atom.min < atom.max {
                            self.cache.backtracks.max_occ(atom.after)
                        } else {
                            None
                        };
                        if slot_cap == Some(0) {
                            // an earlier attempt proved this count path dead
                            hit = false;
                        }

                        if !hit {
                            let occ = self.cache.segments[depth].atom_occ;
                            if atom.min < occ {
                                self.cache.backtracks.cap(atom.after, occ);
                            }
                            if occ >= atom.min {
                                // greedy surrender: keep what was consumed
                                continue 'tick;
                            }
                            match self.fail_and_resume(depth)? {
                                Some(matched) => return Ok(matched),
                                None => continue 'tick,
                            }
                        }

                        {
                            let seg = &mut self.cache.segments[depth];
                            seg.atom_occ += 1;
                            seg.in_cur += 1;
                            seg.char_acquired = true;
                        }
                        if let Some(cap) = slot_cap {
                            if max > cap {
                                max = cap;
                            }
                        }
                        if self.cache.segments[depth].atom_occ < max {
                            continue;
                        }
                        // the quantifier is fulfilled
                        let occ = self.cache.segments[depth].atom_occ;
                        if atom.min < occ {
                            self.cache.backtracks.cap(atom.after, occ);
                        }
                        continue 'tick;
                    }
                }

                AtomKind::Anchor(anchor) => {
                    if !self.anchor_holds(depth, anchor) {
                        match self.fail_and_resume(depth)? {
                            Some(matched) => return Ok(matched),
                            None => continue 'tick,
                        }
                    }
                }

                AtomKind::GroupOpen => {
                    let mut body = self.cache.segments[depth].pat_cur;
                    let capturing = !(byte_at(self.pattern, body) == b'?'
                        && byte_at(self.pattern, body + 1) == b':');
                    if !capturing {
                        body += 2;
                        self.cache.segments[depth].pat_cur = body;
                    }
                    let input_at = self.cache.segments[depth].in_cur;
                    self.init_segment(depth + 1, input_at, body, capturing)?;
                    match self.match_segment(depth + 1) {
                        Ok(true) => {
                            let child = self.cache.segments[depth + 1];
                            let seg = &mut self.cache.segments[depth];
                            seg.in_cur = child.in_cur;
                            seg.pat_cur = child.pat_cur;
                        }
                        Ok(false) => {
                            self.cache.segments[depth].pat_cur =
                                self.cache.segments[depth + 1].pat_cur;
                            match self.fail_and_resume(depth)? {
                                Some(matched) => return Ok(matched),
                                None => continue 'tick,
                            }
                        }
                        Err(kind) => {
                            // surface the child's failure position
                            self.cache.segments[depth].pat_cur =
                                self.cache.segments[depth + 1].pat_cur;
                            return Err(kind);
                        }
                    }
                }

                AtomKind::GroupClose => match self.close_group(depth, atom.min, atom.max)? {
                    Flow::Return(matched) => return Ok(matched),
                    Flow::Continue => {}
                },
            }
        }
    }

    fn anchor_holds(&self, depth: usize, anchor: Anchor) -> bool {
        let seg = self.cache.segments[depth];
        match anchor {
            Anchor::LineStart => {
                seg.in_cur == 0
                    || (self.multi_line
                        && matches!(byte_at(self.haystack, seg.in_cur - 1), b'\r' | b'\n'))
            }
            Anchor::LineEnd => {
                let byte = byte_at(self.haystack, seg.in_cur);
                byte == 0 || (self.multi_line && (byte == b'\r' || byte == b'\n'))
            }
            Anchor::WordBoundary => {
                seg.in_cur == seg.in_base
                    || charset::is_word(byte_at(self.haystack, seg.in_cur - 1))
                        != charset::is_word(byte_at(self.haystack, seg.in_cur))
            }
            Anchor::NotWordBoundary => {
                seg.in_cur != seg.in_base
                    && charset::is_word(byte_at(self.haystack, seg.in_cur - 1))
                        == charset::is_word(byte_at(self.haystack, seg.in_cur))
            }
        }
    }

    /// Saves this segment's capture when it is a capturing group.
    fn save_capture(&mut self, depth: usize) -> Result<(), ErrorKind> {
        let seg = self.cache.segments[depth];
        if seg.is_capture {
            self.cache.caps.save(seg.pat_base, seg.cap_base, seg.in_cur - seg.cap_base)?;
        }
        Ok(())
    }

    /// Consumes a quantifier at the pattern cursor, if any.
    fn take_quantifier(&mut self, depth: usize) -> Result<(u16, u16), ErrorKind> {
        let at = self.cache.segments[depth].pat_cur;
        match syntax::quantifier_at(self.pattern, at)? {
            Some((min, max, len)) => {
                self.cache.segments[depth].pat_cur = at + len;
                Ok((min, max))
            }
            None => Ok((1, 1)),
        }
    }

    /// Handles the group's `)` with the quantifier bounds parsed after it.
    /// Reached on the direct close atom, and from the pipe and fail paths
    /// once they located the closing paren.
    fn close_group(&mut self, depth: usize, min: u16, mut max: u16) -> Result<Flow, ErrorKind> {
        if depth == 0 {
            return Err(ErrorKind::Syntax);
        }
        let close_at = self.cache.segments[depth].pat_cur;
        if min < max {
            self.cache.backtracks.add(close_at)?;
        }
        let slot_cap = self.cache.backtracks.max_occ(close_at);
        if min < max && slot_cap == Some(0) {
            return Ok(Flow::Return(false));
        }

        if self.cache.segments[depth].parse_failed {
            let seg_occ = self.cache.segments[depth].seg_occ;
            if min <= seg_occ {
                // the failed final iteration does not count; the group
                // still matched with the iterations collected so far
                if slot_cap.is_some() {
                    self.cache.backtracks.cap(close_at, seg_occ);
                }
                let seg = &mut self.cache.segments[depth];
                seg.in_cur = seg.cap_base;
                return Ok(Flow::Return(true));
            }
            return Ok(Flow::Return(false));
        }

        self.save_capture(depth)?;
        self.cache.segments[depth].seg_occ += 1;
        if let Some(cap) = slot_cap {
            if max > cap {
                max = cap;
            }
        }
        let seg = &mut self.cache.segments[depth];
        if seg.seg_occ >= max {
            return Ok(Flow::Return(true));
        }
        if !seg.char_acquired {
            // a zero-width iteration can repeat forever; stop here
            return Ok(Flow::Return(true));
        }
        seg.char_acquired = false;
        if seg.seg_occ >= min {
            seg.in_base = seg.in_cur;
            seg.enough_occ = true;
        }
        seg.cap_base = seg.in_base;
        seg.pat_cur = seg.pat_base;
        Ok(Flow::Continue)
    }

    /// Scans forward from the pattern cursor for `|` (when `accept_pipe`)
    /// or `)` at the current nesting, skipping escapes and nested groups.
    /// The cursor ends just past the found byte.
    fn scan_segment(&mut self, depth: usize, accept_pipe: bool) -> Result<ScanHit, ErrorKind> {
        let mut nesting = 0usize;
        loop {
            let at = self.cache.segments[depth].pat_cur;
            match byte_at(self.pattern, at) {
                0 => {
                    if nesting > 0 {
                        return Err(ErrorKind::Syntax);
                    }
                    return Ok(ScanHit::End);
                }
                b'\\' => {
                    if byte_at(self.pattern, at + 1) == 0 {
                        return Err(ErrorKind::Syntax);
                    }
                    self.cache.segments[depth].pat_cur = at + 2;
                }
                b'|' if accept_pipe && nesting == 0 => {
                    self.cache.segments[depth].pat_cur = at + 1;
                    return Ok(ScanHit::Pipe);
                }
                b'(' => {
                    nesting += 1;
                    self.cache.segments[depth].pat_cur = at + 1;
                }
                b')' => {
                    if nesting == 0 {
                        self.cache.segments[depth].pat_cur = at + 1;
                        return Ok(ScanHit::Close);
                    }
                    nesting -= 1;
                    self.cache.segments[depth].pat_cur = at + 1;
                }
                _ => {
                    self.cache.segments[depth].pat_cur = at + 1;
                }
            }
        }
    }

    /// Runs the shared segment-fail handler and folds the group-close
    /// continuation in. `None` means the tick loop resumes.
    fn fail_and_resume(&mut self, depth: usize) -> Result<Option<bool>, ErrorKind> {
        match self.on_fail(depth)? {
            FailFlow::Retry => Ok(None),
            FailFlow::Return(matched) => Ok(Some(matched)),
            FailFlow::Close(min, max) => match self.close_group(depth, min, max)? {
                Flow::Return(matched) => Ok(Some(matched)),
                Flow::Continue => Ok(None),
            },
        }
    }

    /// The shared segment-fail handler: look for another branch, else for
    /// the closing paren, else backtrack; at depth 0, finally slide the
    /// anchor one byte right and start over.
    fn on_fail(&mut self, depth: usize) -> Result<FailFlow, ErrorKind> {
        match self.scan_segment(depth, true)? {
            ScanHit::Pipe => {
                let seg = self.cache.segments[depth];
                self.cache.alt_segs.add(seg.pat_base, seg.pat_cur)?;
                self.cache.alt_segs.iterate(seg.pat_base);
                let seg = &mut self.cache.segments[depth];
                seg.in_cur = seg.in_base;
                seg.cap_base = seg.in_base;
                self.retry(depth);
                Ok(FailFlow::Retry)
            }
            ScanHit::Close => {
                self.cache.segments[depth].parse_failed = true;
                let (min, max) = self.take_quantifier(depth)?;
                Ok(FailFlow::Close(min, max))
            }
            ScanHit::End => {
                if !self.cache.segments[depth].enough_occ {
                    let base = self.cache.segments[depth].pat_base;
                    let Cache { backtracks, alt_segs, .. } = &mut *self.cache;
                    if backtracks.iterate(base, alt_segs) {
                        self.retry(depth);
                        return Ok(FailFlow::Retry);
                    }
                }
                if depth > 0 {
                    return Ok(FailFlow::Return(false));
                }
                if byte_at(self.haystack, self.cache.segments[0].in_base) == 0 {
                    // the anchor reached the terminator: overall no-match
                    return Ok(FailFlow::Return(false));
                }
                if self.cache.alt_segs.changed {
                    if self.cache.alt_segs.iterate(self.cache.segments[0].pat_base) {
                        self.retry(0);
                        return Ok(FailFlow::Retry);
                    }
                    self.cache.alt_segs.changed = false;
                    self.cache.caps.reset();
                    self.retry(0);
                    return Ok(FailFlow::Retry);
                }
                // unanchored search: slide to the next input byte with
                // fresh bookkeeping and a fresh watchdog
                self.cache.segments[0].in_base += 1;
                self.cache.backtracks.clear();
                self.cache.alt_segs.clear();
                self.cache.iterations = 0;
                self.cache.caps.reset();
                self.retry(0);
                Ok(FailFlow::Retry)
            }
        }
    }

    /// Rewinds this segment to re-run from its active branch.
    fn retry(&mut self, depth: usize) {
        let base = self.cache.segments[depth].pat_base;
        let cur = self.cache.alt_segs.get(base).unwrap_or(base);
        let seg = &mut self.cache.segments[depth];
        seg.pat_cur = cur;
        seg.char_acquired = false;
        seg.parse_failed = false;
        seg.in_cur = seg.in_base;
        self.cache.caps.remove_after(base);
    }
}

#[cfg(test)]
mod tests {
    use crate::{ErrorKind, Mode, Regex};

    const NONE: Mode = Mode::empty();
    const SL: Mode = Mode::SINGLE_LINE;
    const ML_SL: Mode = Mode::MULTI_LINE.union(Mode::SINGLE_LINE);
    const CI_SL: Mode = Mode::CASE_INSENSITIVE.union(Mode::SINGLE_LINE);
    const CI_ML_SL: Mode = CI_SL.union(Mode::MULTI_LINE);

    /// All capture spans of the left-most match, slot 0 first.
    fn caps(pattern: &str, haystack: &[u8], mode: Mode) -> Option<Vec<(usize, usize)>> {
        let re = Regex::with_mode(pattern, mode);
        re.captures(haystack).unwrap().map(|caps| {
            (0..caps.len())
                .map(|i| {
                    let m = caps.get(i).unwrap();
                    (m.start(), m.end())
                })
                .collect()
        })
    }

    fn find(pattern: &str, haystack: &[u8], mode: Mode) -> Option<(usize, usize)> {
        let re = Regex::with_mode(pattern, mode);
        re.find(haystack).unwrap().map(|m| (m.start(), m.end()))
    }

    fn fail(pattern: &str, haystack: &[u8], mode: Mode) -> (ErrorKind, usize) {
        let err = Regex::with_mode(pattern, mode).captures(haystack).unwrap_err();
        (err.kind(), err.offset())
    }

    #[test]
    fn literals_and_anchored_search() {
        assert_eq!(find("", b"abc", SL), Some((0, 0)));
        assert_eq!(find("a*", b"", SL), Some((0, 0)));
        assert_eq!(find("a$", b"ba", SL), Some((1, 2)));
        assert_eq!(find("a+b+c", b"aabbabc", CI_SL), Some((4, 7)));
        assert_eq!(find(r"a\.b", b"a.b", SL), Some((0, 3)));
        assert_eq!(find("ABC", b"abc", Mode::CASE_INSENSITIVE), Some((0, 3)));
        assert_eq!(find("abc", b"ABC", NONE), None);
        // a pattern full of metacharacters does not match itself
        assert_eq!(find("spk -v+a", b"spk -v+a", CI_SL), None);
    }

    #[test]
    fn dot_and_single_line() {
        assert_eq!(find("a.b", b"a.b", NONE), Some((0, 3)));
        assert_eq!(find("a.b", b"a\rb", NONE), None);
        assert_eq!(find("a.b", b"a\rb", SL), Some((0, 3)));
    }

    #[test]
    fn line_anchors() {
        assert_eq!(find("^$", b"", SL), Some((0, 0)));
        assert_eq!(find("^$", b"x", SL), None);
        assert_eq!(find("^$", b"x\n", ML_SL), Some((2, 2)));
        assert_eq!(find("^b", b"a\r\nb", ML_SL), Some((3, 4)));
    }

    #[test]
    fn word_boundaries() {
        assert_eq!(find(r"\bfoo\b", b"a foo b", SL), Some((2, 5)));
        assert_eq!(find(r"foo\b", b"foobar", SL), None);
        assert_eq!(find(r"foo\B", b"foobar", SL), Some((0, 3)));
        assert_eq!(find(r"\Boo\B", b"food", SL), None);
    }

    #[test]
    fn metaclasses() {
        assert_eq!(find(r"\w+", b"  hi_42 ", SL), Some((2, 7)));
        assert_eq!(find(r"\W+", b"ab -- cd", SL), Some((2, 6)));
        assert_eq!(find(r"\d{2,4}", b"x12345y", SL), Some((1, 5)));
        assert_eq!(find(r"\h+", b"zzcafe99z", SL), Some((2, 8)));
        assert_eq!(find(r"\s\S", b" x", SL), Some((0, 2)));
    }

    #[test]
    fn classes() {
        assert_eq!(find("[.]", b"a", SL), None);
        assert_eq!(find("[a-c]+", b"abcd", SL), Some((0, 3)));
        assert_eq!(find("[A-C]+", b"abcd", CI_SL), Some((0, 3)));
        assert_eq!(find("[^a]*x", b"bbbx", SL), Some((0, 4)));
        assert_eq!(find("[-abc]+", b"-ab", SL), Some((0, 3)));
        assert_eq!(find("[abc-]+", b"c-a", SL), Some((0, 3)));
        assert_eq!(find("[a^]+", b"^a", SL), Some((0, 2)));
        // not a range: the endpoints are not word bytes, so all three
        // bytes are members
        assert_eq!(find("[!-/]", b"-", SL), Some((0, 1)));
        assert_eq!(find("[!-/]", b",", SL), None);
        // an empty class matches nothing
        assert_eq!(find("[]a", b"a", SL), None);
        // negated classes are built from folded members under CI
        assert_eq!(find("[^a-z]x", b"ax", CI_SL), None);
        assert_eq!(find("[^a-z]x", b"9x", CI_SL), Some((0, 2)));
    }

    #[test]
    fn hex_escapes() {
        assert_eq!(find(r"\x41\x42", b"AB", SL), Some((0, 2)));
        assert_eq!(find(r"x\x2Ez", b"x.z", SL), Some((0, 3)));
        // not two hex digits: the x is a literal
        assert_eq!(find(r"\xg", b"xg", SL), Some((0, 2)));
        assert_eq!(find(r"\q", b"q", SL), Some((0, 1)));
    }

    #[test]
    fn counted_quantifiers() {
        assert_eq!(find("a{3}", b"aaaa", SL), Some((0, 3)));
        assert_eq!(find("a{2,}b", b"aaab", SL), Some((0, 4)));
        assert_eq!(find("a{4,}", b"aaa", SL), None);
        assert_eq!(find("12{2}3", b"1223", SL), Some((0, 4)));
    }

    #[test]
    fn greedy_backtracking_across_atoms() {
        assert_eq!(caps(".*(b)", b"ab", CI_SL), Some(vec![(0, 2), (1, 2)]));
        assert_eq!(
            caps("(.*)c(.*)", b"abcde", CI_SL),
            Some(vec![(0, 5), (0, 2), (3, 5)])
        );
        assert_eq!(caps("^(a+)a$", b"aaaa", SL), Some(vec![(0, 4), (0, 3)]));
        assert_eq!(
            caps("(a+)(a+)", b"aaaa", SL),
            Some(vec![(0, 4), (0, 3), (3, 4)])
        );
        // the left atom gives back just enough for the rest to match
        assert_eq!(
            caps("(a*)(a|aa)", b"aaaa", CI_SL),
            Some(vec![(0, 4), (0, 3), (3, 4)])
        );
        assert_eq!(
            caps("(a*)(b{0,1})(b{1,})b{3}", b"aaabbbbbbb", CI_SL),
            Some(vec![(0, 10), (0, 3), (3, 4), (4, 7)])
        );
    }

    #[test]
    fn repeated_group_gives_back_iterations() {
        assert_eq!(caps("([abc])*bcd", b"abcd", CI_SL), Some(vec![(0, 4), (0, 1)]));
        assert_eq!(caps("(ab)+", b"ababab", SL), Some(vec![(0, 6), (4, 6)]));
        assert_eq!(caps("(ab)?c", b"c", SL), Some(vec![(0, 1)]));
        assert_eq!(caps("(xy){2,3}z", b"xyxyxyz", SL), Some(vec![(0, 7), (4, 6)]));
    }

    #[test]
    fn alternation() {
        assert_eq!(find("a|b|c", b"c", SL), Some((0, 1)));
        assert_eq!(find("ab|cd", b"zcd", CI_SL), Some((1, 3)));
        // an empty branch matches the empty string
        assert_eq!(find("x|", b"y", SL), Some((0, 0)));
        assert_eq!(find("a||b", b"z", SL), Some((0, 0)));
        assert_eq!(caps("x(a|b|c)y", b"xcy", SL), Some(vec![(0, 3), (1, 2)]));
        assert_eq!(caps("(|a)x", b"ax", SL), Some(vec![(0, 2), (0, 1)]));
        assert_eq!(caps("(a|)x", b"ax", SL), Some(vec![(0, 2), (0, 1)]));
        assert_eq!(caps("(a)|(b)", b"b", SL), Some(vec![(0, 1), (0, 1)]));
    }

    #[test]
    fn alternation_across_anchor_positions() {
        assert_eq!(
            caps("^123$|^456", b"asd\n123\raaa", CI_ML_SL),
            Some(vec![(4, 7)])
        );
        assert_eq!(caps("(a|b)*c|(a|ab)*c", b"xc", CI_SL), Some(vec![(1, 2)]));
    }

    #[test]
    fn alternation_in_repeated_group_keeps_last_branch_capture() {
        assert_eq!(caps("(a|b)*c", b"abc", CI_SL), Some(vec![(0, 3), (1, 2)]));
    }

    #[test]
    fn later_alternative_still_captures() {
        assert_eq!(
            caps("a(b)|c(d)|a(e)f", b"aef", CI_SL),
            Some(vec![(0, 3), (1, 2)])
        );
    }

    #[test]
    fn branch_choices_ripple_across_groups() {
        assert_eq!(
            caps("(wee|week)(knights|night)(s*)", b"weeknights", CI_SL),
            Some(vec![(0, 10), (0, 3), (3, 10), (10, 10)])
        );
        assert_eq!(
            caps("(weeka|wee)(night|knights)", b"weeknights", CI_SL),
            Some(vec![(0, 10), (0, 3), (3, 10)])
        );
        assert_eq!(
            caps("(aba|ab|a)(aba|ab|a)(aba|ab|a)", b"ababa", CI_SL),
            Some(vec![(0, 5), (0, 2), (2, 4), (4, 5)])
        );
        assert_eq!(
            caps("(.a|.b).*|.*(.a|.b)", b"xa", CI_SL),
            Some(vec![(0, 2), (0, 2)])
        );
    }

    #[test]
    fn nested_groups_capture_in_paren_order() {
        assert_eq!(
            caps("(a(b(c)d)e)f", b"abcdef", SL),
            Some(vec![(0, 6), (0, 5), (1, 4), (2, 3)])
        );
        assert_eq!(
            caps("((((a))))", b"a", SL),
            Some(vec![(0, 1); 5])
        );
        assert_eq!(
            caps("((foo)|(bar))!bas", b"foo!bar!bas", CI_SL),
            Some(vec![(4, 11), (4, 7), (4, 7)])
        );
    }

    #[test]
    fn never_matched_groups_are_absent() {
        assert_eq!(caps("^(a)(b)?$", b"a", SL), Some(vec![(0, 1), (0, 1)]));
        assert_eq!(
            caps(
                "^(([^!]+!)?([^!]+)|.+!([^!]+!)([^!]+))$",
                b"foo!bar!bas",
                CI_SL
            ),
            Some(vec![(0, 11), (0, 11), (4, 8), (8, 11)])
        );
        assert_eq!(
            caps(
                "^([^!]+!)?([^!]+)$|^.+!([^!]+!)([^!]+)$",
                b"foo!bar!bas",
                CI_SL
            ),
            Some(vec![(0, 11), (4, 8), (8, 11)])
        );
    }

    #[test]
    fn non_capturing_groups() {
        assert_eq!(caps("(?:ab)+c", b"ababc", SL), Some(vec![(0, 5)]));
        assert_eq!(caps("(?:a|b)(c)", b"bc", SL), Some(vec![(0, 2), (1, 2)]));
        assert_eq!(
            caps("^SPK((?:\\s*[+-][VAP])+)$", b"spk -v+a", CI_ML_SL),
            Some(vec![(0, 8), (3, 8)])
        );
    }

    #[test]
    fn zero_width_group_iterations_stop() {
        assert_eq!(caps("(.?)*", b"x", CI_SL), Some(vec![(0, 1), (1, 1)]));
        assert_eq!(caps("([ab]*)*a", b"bba", SL), Some(vec![(2, 3), (2, 2)]));
        assert_eq!(caps("(a?)*b", b"aab", SL), Some(vec![(0, 3), (2, 2)]));
    }

    #[test]
    fn pruned_search_gives_up_without_tripping_the_watchdog() {
        assert_eq!(find("(a+a+)+b", b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", SL), None);
        assert_eq!(find("(a*)*x", b"aaaaaaaaaaaaaaaaaaaa", SL), None);
        assert_eq!(find("(a|aa)*x", b"aaaaaaaaaaaaaaaaaaaa", SL), None);
        assert_eq!(find("(a.*z|b.*y)*.*", b"azbazbyc", CI_SL), Some((0, 8)));
        assert_eq!(find("(...|aa)*a", b"aa", CI_SL), Some((1, 2)));
    }

    #[test]
    fn realistic_patterns() {
        assert_eq!(
            caps(
                "^([a-zA-Z0-9._%-]+@[a-zA-Z0-9.-]+\\.[a-zA-Z]{2,6})$",
                b"address.ext@gmail.com",
                CI_SL
            ),
            Some(vec![(0, 21), (0, 21)])
        );
        assert_eq!(
            caps("^[\\w-.]+(\\.\\w{2,3})$", b"apn.vodafone.it", CI_SL),
            Some(vec![(0, 15), (12, 15)])
        );
        assert_eq!(
            caps(
                "^\\s*(GET|POST)\\s+(\\S+)\\s+HTTP/(\\d)\\.(\\d)",
                b" \tGET /index.html HTTP/1.0\r\n\r\n",
                CI_SL
            ),
            Some(vec![(0, 26), (2, 5), (6, 17), (23, 24), (25, 26)])
        );
        assert_eq!(
            caps(
                "^(http:\\/\\/www\\.|https:\\/\\/www\\.|http:\\/\\/|https:\\/\\/)?[a-z0-9]+([\\-\\.]{1}[a-z0-9]+)*\\.[a-z]{2,5}(:[0-9]{1,5})?(\\/.*)?$",
                b"https://www.google.com:80",
                CI_SL
            ),
            Some(vec![(0, 25), (0, 12), (22, 25)])
        );
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(fail("(a", b"a", SL), (ErrorKind::Syntax, 3));
        assert_eq!(fail("a)", b"a", SL), (ErrorKind::Syntax, 2));
        assert_eq!(fail("[a", b"a", SL), (ErrorKind::Syntax, 0));
        assert_eq!(fail("\\", b"a", SL), (ErrorKind::Syntax, 0));
        assert_eq!(fail("*a", b"a", SL), (ErrorKind::Syntax, 0));
        assert_eq!(fail("[z-a]", b"a", SL), (ErrorKind::Syntax, 0));
        assert_eq!(fail(r"[a-\d]", b"a", SL), (ErrorKind::Syntax, 0));
        assert_eq!(fail("a{2}{3}", b"aaaaaa", SL), (ErrorKind::Syntax, 4));
        // lazy quantifiers and lookaround are not recognized
        assert_eq!(fail("(xy){2,3}?z", b"xyxyz", SL), (ErrorKind::Syntax, 9));
        assert_eq!(fail("q(?=u)", b"qu", SL), (ErrorKind::Syntax, 2));
    }

    #[test]
    fn quantifier_errors() {
        assert_eq!(fail("a{2,1}", b"aaa", SL), (ErrorKind::Quantifier, 0));
        assert_eq!(fail("a{}", b"aaa", SL), (ErrorKind::Quantifier, 0));
    }

    #[test]
    fn nesting_limit() {
        assert_eq!(
            caps("((((a))))", b"a", SL).map(|c| c.len()),
            Some(5)
        );
        assert_eq!(fail("(((((a)))))", b"a", SL), (ErrorKind::TooDeep, 5));
    }

    #[test]
    fn capture_limit() {
        let eleven = "(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)";
        assert_eq!(caps(eleven, b"abcdefghijkl", SL).map(|c| c.len()), Some(12));
        let twelve = "(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)(l)";
        assert_eq!(
            fail(twelve, b"abcdefghijkl", SL),
            (ErrorKind::TooManyCaptures, 36)
        );
    }

    #[test]
    fn alternative_limit() {
        let ok = "(?:a|b)".repeat(24);
        assert!(Regex::with_mode(&ok, Mode::SINGLE_LINE)
            .is_match(&[b'b'; 24])
            .unwrap());
        let over = "(?:a|b)".repeat(25);
        let err = Regex::with_mode(&over, Mode::SINGLE_LINE)
            .is_match(&[b'b'; 25])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyAlternatives);
    }

    #[test]
    fn backtrack_limit() {
        let ok = "a?".repeat(31);
        assert_eq!(find(&ok, b"", SL), Some((0, 0)));
        let over = "a?".repeat(32);
        let err = Regex::with_mode(&over, SL).is_match(b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyBacktracks);
    }

    #[test]
    fn watchdog_limit() {
        let err = Regex::with_mode("(a*)(a*)(a*)b", SL)
            .is_match(b"aaaaaaaaaaaaaaaaaaaax")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyIterations);
    }

    #[test]
    fn determinism() {
        for _ in 0..3 {
            assert_eq!(
                caps("(a|b)*c", b"abc", CI_SL),
                Some(vec![(0, 3), (1, 2)])
            );
            assert_eq!(find("(a+a+)+b", b"aaaaaaaaaa", SL), None);
        }
    }

    #[test]
    fn case_folding_symmetry() {
        for (pattern, haystack) in [("sPk", &b"SpK x"[..]), ("[a-c]+X", &b"CaBx"[..])] {
            let upper_p = pattern.to_ascii_uppercase();
            let lower_p = pattern.to_ascii_lowercase();
            let re_mixed = Regex::with_mode(pattern, CI_SL);
            let re_upper = Regex::with_mode(&upper_p, CI_SL);
            let re_lower = Regex::with_mode(&lower_p, CI_SL);
            let base = re_mixed.find(haystack).unwrap().map(|m| m.range());
            assert!(base.is_some());
            assert_eq!(re_upper.find(haystack).unwrap().map(|m| m.range()), base);
            assert_eq!(re_lower.find(haystack).unwrap().map(|m| m.range()), base);
            let folded = haystack.to_ascii_lowercase();
            assert_eq!(re_mixed.find(&folded).unwrap().map(|m| m.range()), base);
        }
    }
}
