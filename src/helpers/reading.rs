//! Reading time estimation

use crate::content::ContentSection;

/// Default reading speed
pub const WORDS_PER_MINUTE: u32 = 200;

/// Count whitespace-delimited words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimated minutes to read all sections at the default speed
pub fn estimate(sections: &[ContentSection]) -> u32 {
    estimate_with_rate(sections, WORDS_PER_MINUTE)
}

/// Estimated minutes to read all sections, rounded up.
///
/// Both headings and bodies count. A rate of zero falls back to
/// [`WORDS_PER_MINUTE`].
pub fn estimate_with_rate(sections: &[ContentSection], words_per_minute: u32) -> u32 {
    let rate = if words_per_minute == 0 {
        WORDS_PER_MINUTE
    } else {
        words_per_minute
    } as usize;

    let words: usize = sections
        .iter()
        .map(|section| count_words(&section.heading) + count_words(&section.body_text()))
        .sum();

    u32::try_from(words.div_ceil(rate)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RichTextBlock;

    fn section(heading: &str, body: &[&str]) -> ContentSection {
        ContentSection {
            heading: heading.to_string(),
            body: body.iter().map(|t| RichTextBlock::paragraph(*t)).collect(),
        }
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("one  two\tthree\nfour"), 4);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_estimate_single_section() {
        let sections = vec![section("Hello World", &["one two three four"])];
        assert_eq!(estimate(&sections), 1);
    }

    #[test]
    fn test_estimate_empty() {
        assert_eq!(estimate(&[]), 0);
        assert_eq!(estimate(&[section("", &[])]), 0);
    }

    #[test]
    fn test_estimate_rounds_up() {
        let body = vec!["word"; 200].join(" ");
        assert_eq!(estimate(&[section("", &[&body])]), 1);
        assert_eq!(estimate(&[section("one more", &[&body])]), 2);
    }

    #[test]
    fn test_estimate_across_blocks_and_sections() {
        let sections = vec![
            section("Intro", &["a b", "c"]),
            section("Second part", &["d e f"]),
        ];
        // 1 + 3 + 2 + 3 words
        assert_eq!(estimate_with_rate(&sections, 3), 3);
        assert_eq!(estimate_with_rate(&sections, 0), 1);
    }
}
