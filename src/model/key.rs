//! Composite document identifiers.
//!
//! Stored rows are addressed by keys glued together from two ids. The literal
//! formats are persisted and must not change:
//!
//! | key               | format                   |
//! |-------------------|--------------------------|
//! | [`EnrolmentKey`]  | `{course_id}_{student_id}` |
//! | [`ProgressKey`]   | `{student_id}_{lesson_id}` |
//! | [`QuizResultKey`] | `{quiz_id}-{student_id}`   |

use std::fmt;

use thiserror::Error;

const UUID_LEN: usize = 36;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed composite key `{key}`, expected `<left>{separator}<right>`")]
pub struct KeyParseError {
    pub key: String,
    pub separator: char,
}

/// Splits `raw` into its two halves.
///
/// Ids are usually UUID strings, which contain `-` themselves, so when the
/// left side looks like a UUID the split happens right after it. Otherwise
/// the first separator wins.
fn split_key(raw: &str, separator: char) -> Result<(&str, &str), KeyParseError> {
    let err = || KeyParseError {
        key: raw.to_string(),
        separator,
    };

    let uuid_split = raw
        .get(..UUID_LEN)
        .filter(|left| looks_like_uuid(left))
        .and_then(|left| {
            raw[UUID_LEN..]
                .strip_prefix(separator)
                .map(|right| (left, right))
        });

    let (left, right) = match uuid_split {
        Some(parts) => parts,
        None => raw.split_once(separator).ok_or_else(err)?,
    };

    if left.is_empty() || right.is_empty() {
        return Err(err());
    }

    Ok((left, right))
}

fn looks_like_uuid(s: &str) -> bool {
    s.len() == UUID_LEN
        && s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

macro_rules! composite_key {
    ($(#[$meta:meta])* $name:ident, $sep:literal, $left:ident, $right:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            $left: String,
            $right: String,
        }

        impl $name {
            pub const SEPARATOR: char = $sep;

            pub fn new(
                $left: impl Into<String>,
                $right: impl Into<String>,
            ) -> Self {
                Self {
                    $left: $left.into(),
                    $right: $right.into(),
                }
            }

            pub fn parse(raw: &str) -> Result<Self, KeyParseError> {
                let ($left, $right) = split_key(raw, Self::SEPARATOR)?;
                Ok(Self::new($left, $right))
            }

            pub fn $left(&self) -> &str {
                &self.$left
            }

            pub fn $right(&self) -> &str {
                &self.$right
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}{}", self.$left, Self::SEPARATOR, self.$right)
            }
        }

        impl std::str::FromStr for $name {
            type Err = KeyParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

composite_key!(
    /// Identity of an enrolment request: one per (course, student).
    EnrolmentKey, '_', course_id, student_id
);

composite_key!(
    /// Identity of a lesson completion record: one per (student, lesson).
    ProgressKey, '_', student_id, lesson_id
);

composite_key!(
    /// Identity of a stored quiz attempt: one per (quiz, student).
    QuizResultKey, '-', quiz_id, student_id
);
