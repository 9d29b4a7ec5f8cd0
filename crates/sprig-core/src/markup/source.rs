//! Character sources feeding the scanner.

/// A producer of decoded code points.
///
/// `None` marks end of input; a source keeps returning `None` once
/// exhausted. `append_char` expands a code point into a text buffer and is
/// used for every name and value the scanner accumulates.
pub trait CharSource {
    fn next_char(&mut self) -> Option<char>;

    fn append_char(&self, c: char, out: &mut String) {
        out.push(c);
    }
}

impl<I> CharSource for I
where
    I: Iterator<Item = char>,
{
    fn next_char(&mut self) -> Option<char> {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chars_iterator_is_a_source() {
        let mut src = "ab".chars();
        assert_eq!(src.next_char(), Some('a'));
        assert_eq!(src.next_char(), Some('b'));
        assert_eq!(src.next_char(), None);
        assert_eq!(src.next_char(), None);
    }

    #[test]
    fn borrowed_source() {
        let mut owned = "xyz".chars();
        {
            let borrowed: &mut std::str::Chars<'_> = &mut owned;
            assert_eq!(borrowed.next_char(), Some('x'));
        }
        assert_eq!(owned.next_char(), Some('y'));
    }

    #[test]
    fn default_append_pushes_utf8() {
        let src = "".chars();
        let mut out = String::new();
        src.append_char('\u{4E2D}', &mut out);
        src.append_char('a', &mut out);
        assert_eq!(out, "\u{4E2D}a");
    }

    struct Upper<'a>(std::str::Chars<'a>);

    impl CharSource for Upper<'_> {
        fn next_char(&mut self) -> Option<char> {
            self.0.next()
        }

        fn append_char(&self, c: char, out: &mut String) {
            out.extend(c.to_uppercase());
        }
    }

    #[test]
    fn custom_append() {
        let src = Upper("".chars());
        let mut out = String::new();
        src.append_char('q', &mut out);
        assert_eq!(out, "Q");
    }
}
