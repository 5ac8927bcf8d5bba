use std::ops::RangeInclusive;

use crate::{
    expr::Alternative,
    Error,
    Terminal,
};

/// A set of code points, stored as sorted, disjoint and non-adjacent
/// intervals.
///
/// Lets a lexer test whether a code point is a member of a large certified
/// alternative like `"a" … "z" | "A" … "Z" | "_"` with a binary search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodePointSet {
    ranges: Vec<RangeInclusive<char>>,
}

impl CodePointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the leaves of a certified alternative into a set.
    ///
    /// Only bytes, runes and ranges can be folded. Tokens, the empty string,
    /// optionals and repetitions are [`Error::NotEnumerable`].
    pub fn from_alternative(alternative: &Alternative<Terminal>) -> Result<Self, Error> {
        let mut this = Self::new();
        for terminal in alternative.body() {
            this.insert_terminal(terminal)?;
        }
        tracing::trace!(
            "{} code point interval(s) for {}",
            this.ranges.len(),
            alternative
        );
        Ok(this)
    }

    fn insert_terminal(&mut self, terminal: &Terminal) -> Result<(), Error> {
        match terminal {
            Terminal::Byte(b) => self.insert(char::from(*b)),
            Terminal::Rune(c) => self.insert(*c),
            Terminal::Range(range) => self.insert_range(range.chars()),
            Terminal::Alternative(alternative) => {
                for terminal in alternative.body() {
                    self.insert_terminal(terminal)?;
                }
            }
            Terminal::Empty | Terminal::Token(_) | Terminal::Optional(_) | Terminal::Repetition(_) => {
                return Err(Error::NotEnumerable(terminal.to_string()));
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, c: char) {
        self.insert_range(c..=c);
    }

    pub fn insert_range(&mut self, range: RangeInclusive<char>) {
        if range.is_empty() {
            return;
        }

        // first interval that ends at or after the code point before `range`
        let mut start = *range.start();
        let mut end = *range.end();
        let first = self
            .ranges
            .partition_point(|r| successor(*r.end()).map_or(false, |next| next < start));

        let mut last = first;
        while let Some(r) = self.ranges.get(last) {
            if successor(end).map_or(false, |next| next < *r.start()) {
                break;
            }
            start = start.min(*r.start());
            end = end.max(*r.end());
            last += 1;
        }

        self.ranges.splice(first..last, [start..=end]);
    }

    pub fn contains(&self, c: char) -> bool {
        self.ranges
            .binary_search_by(|r| {
                if *r.end() < c {
                    std::cmp::Ordering::Less
                }
                else if *r.start() > c {
                    std::cmp::Ordering::Greater
                }
                else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn ranges(&self) -> &[RangeInclusive<char>] {
        &self.ranges
    }

    /// The number of code points in the set.
    pub fn len(&self) -> usize {
        self.ranges
            .iter()
            .map(|r| {
                let (start, end) = (u32::from(*r.start()), u32::from(*r.end()));
                let surrogates = if start < 0xd800 && end > 0xdfff { 0x800 } else { 0 };
                (end - start + 1 - surrogates) as usize
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.ranges.iter().cloned().flatten()
    }
}

impl Extend<char> for CodePointSet {
    fn extend<T: IntoIterator<Item = char>>(&mut self, iter: T) {
        for c in iter {
            self.insert(c);
        }
    }
}

impl FromIterator<char> for CodePointSet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        let mut this = Self::new();
        this.extend(iter);
        this
    }
}

/// The next valid code point, skipping surrogates.
fn successor(c: char) -> Option<char> {
    match c {
        '\u{d7ff}' => Some('\u{e000}'),
        c => char::from_u32(u32::from(c) + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Range;

    fn alternative(body: Vec<Terminal>) -> Alternative<Terminal> {
        match Terminal::alternative(body).unwrap() {
            Terminal::Alternative(alternative) => alternative,
            terminal => panic!("expected an alternative, got {terminal}"),
        }
    }

    #[test]
    fn it_folds_alternatives() {
        let set = CodePointSet::from_alternative(&alternative(vec![
            Range::new('a', 'z').unwrap(),
            Range::new('A', 'Z').unwrap(),
            Terminal::Byte(b'_'),
            Terminal::Rune('λ'),
        ]))
        .unwrap();

        assert_eq!(set.ranges(), ['A'..='Z', '_'..='_', 'a'..='z', 'λ'..='λ']);
        assert_eq!(set.len(), 26 + 26 + 1 + 1);
        assert!(set.contains('q'));
        assert!(set.contains('_'));
        assert!(set.contains('λ'));
        assert!(!set.contains('0'));
        assert!(!set.contains('`'));
    }

    #[test]
    fn it_merges_overlapping_and_adjacent_intervals() {
        let set = CodePointSet::from_alternative(&alternative(vec![
            Range::new('a', 'f').unwrap(),
            Range::new('d', 'k').unwrap(),
            Terminal::Byte(b'l'),
            Range::new('0', '9').unwrap(),
            Terminal::Byte(b'5'),
        ]))
        .unwrap();
        assert_eq!(set.ranges(), ['0'..='9', 'a'..='l']);
    }

    #[test]
    fn it_bridges_intervals_spanning_many_others() {
        let mut set: CodePointSet = "acegi".chars().collect();
        assert_eq!(set.ranges().len(), 5);
        set.insert_range('b'..='h');
        assert_eq!(set.ranges(), ['a'..='i']);
    }

    #[test]
    fn it_skips_surrogates() {
        let mut set = CodePointSet::new();
        set.insert('\u{d7ff}');
        set.insert('\u{e000}');
        assert_eq!(set.ranges(), ['\u{d7ff}'..='\u{e000}']);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn it_rejects_tokens() {
        let error = CodePointSet::from_alternative(&alternative(vec![
            Terminal::Byte(b'a'),
            Terminal::from_literal("if"),
        ]))
        .unwrap_err();
        assert!(matches!(error, Error::NotEnumerable(_)));
    }
}
