use std::fmt;

/// Per-character classification of a guess against the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackCode {
    ExactMatch,
    CaseMismatch,
    PresentWrongPosition,
    Absent,
}

impl FeedbackCode {
    /// Single-letter symbol used by text front ends.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::ExactMatch => 'G',
            Self::CaseMismatch => 'C',
            Self::PresentWrongPosition => 'Y',
            Self::Absent => 'X',
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExactMatch => "correct",
            Self::CaseMismatch => "wrong case",
            Self::PresentWrongPosition => "wrong position",
            Self::Absent => "not in password",
        }
    }
}

impl fmt::Display for FeedbackCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Score `guess` against `secret`, one code per guessed character.
///
/// Each position is classified on its own: exact match, then same letter in
/// the other case, then presence anywhere in the secret (ignoring case).
/// Occurrences are not counted, so a letter that appears once in the secret
/// can mark several guessed positions as present. Positions past the end of
/// the secret are `Absent`.
#[must_use]
pub fn score(secret: &str, guess: &str) -> Vec<FeedbackCode> {
    let secret_chars: Vec<char> = secret.chars().collect();

    guess
        .chars()
        .enumerate()
        .map(|(i, g)| match secret_chars.get(i) {
            Some(&s) if s == g => FeedbackCode::ExactMatch,
            Some(s) if s.eq_ignore_ascii_case(&g) => FeedbackCode::CaseMismatch,
            None => FeedbackCode::Absent,
            Some(_) if secret_chars.iter().any(|s| s.eq_ignore_ascii_case(&g)) => {
                FeedbackCode::PresentWrongPosition
            }
            Some(_) => FeedbackCode::Absent,
        })
        .collect()
}

/// True when every position is an exact match.
#[must_use]
pub fn is_solved(codes: &[FeedbackCode]) -> bool {
    !codes.is_empty() && codes.iter().all(|&c| c == FeedbackCode::ExactMatch)
}

/// Render codes as their symbols, e.g. `GCYXX`.
#[must_use]
pub fn codes_to_string(codes: &[FeedbackCode]) -> String {
    codes.iter().map(|c| c.as_char()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use FeedbackCode::{Absent, CaseMismatch, ExactMatch, PresentWrongPosition};

    #[test]
    fn test_self_match_is_all_exact() {
        for secret in ["a", "cat", "Spring2024!", "P@ssW0rd"] {
            let codes = score(secret, secret);
            assert_eq!(codes.len(), secret.chars().count());
            assert!(is_solved(&codes));
        }
    }

    #[test]
    fn test_case_mismatch_only_on_first_letter() {
        let codes = score("Spring2024!", "spring2024!");
        assert_eq!(codes[0], CaseMismatch);
        assert!(codes[1..].iter().all(|&c| c == ExactMatch));
        assert_eq!(codes.len(), 11);
    }

    #[test]
    fn test_cat_act_scenario() {
        // 't' sits at index 2 in both words
        let codes = score("cat", "act");
        assert_eq!(codes[0], PresentWrongPosition);
        assert_eq!(codes[1], PresentWrongPosition);
        assert_eq!(codes[2], ExactMatch);
    }

    #[test]
    fn test_cab_abc_all_present() {
        assert_eq!(
            score("cab", "abc"),
            vec![PresentWrongPosition, PresentWrongPosition, PresentWrongPosition]
        );
    }

    #[test]
    fn test_no_duplicate_budget() {
        // Only one 'a' in the secret, yet both guessed 'a's are present
        assert_eq!(
            score("abc", "xaa"),
            vec![Absent, PresentWrongPosition, PresentWrongPosition]
        );
    }

    #[test]
    fn test_presence_ignores_case() {
        assert_eq!(
            score("Abc", "bxA"),
            vec![PresentWrongPosition, Absent, PresentWrongPosition]
        );
    }

    #[test]
    fn test_absent_letters() {
        assert_eq!(score("abc", "xyz"), vec![Absent, Absent, Absent]);
    }

    #[test]
    fn test_digits_and_symbols_compare_exactly() {
        assert_eq!(score("a1!", "1!a"), vec![PresentWrongPosition; 3]);
        assert_eq!(score("a1!", "a2?"), vec![ExactMatch, Absent, Absent]);
    }

    #[test]
    fn test_guess_longer_than_secret_scores_absent_beyond_end() {
        let codes = score("ab", "abab");
        assert_eq!(codes, vec![ExactMatch, ExactMatch, Absent, Absent]);
    }

    #[test]
    fn test_overflow_absent_even_when_letter_in_secret() {
        // 'b' and 'A' both occur in the secret but sit past its end
        assert_eq!(score("ab", "xybA"), vec![Absent; 4]);
    }

    #[test]
    fn test_guess_shorter_than_secret() {
        assert_eq!(score("abc", "a"), vec![ExactMatch]);
        assert!(score("abc", "").is_empty());
    }

    #[test]
    fn test_is_solved() {
        assert!(is_solved(&[ExactMatch, ExactMatch]));
        assert!(!is_solved(&[ExactMatch, CaseMismatch]));
        assert!(!is_solved(&[]));
    }

    #[test]
    fn test_codes_to_string() {
        assert_eq!(
            codes_to_string(&[ExactMatch, CaseMismatch, PresentWrongPosition, Absent]),
            "GCYX"
        );
    }

    #[test]
    fn test_exact_match_iff_same_char() {
        let secret = "MiXeD9#z";
        let guess = "mIxEd9#Z";
        for (i, code) in score(secret, guess).into_iter().enumerate() {
            let same = secret.chars().nth(i) == guess.chars().nth(i);
            assert_eq!(code == ExactMatch, same, "position {i}");
        }
    }
}
