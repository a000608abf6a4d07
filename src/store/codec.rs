//! Field framing used on both sides of the primitive boundary.
//!
//! Fields are joined with `|`. Inside a field, `\` and `|` are escaped with a
//! leading `\`, so any text round-trips. Text without backslashes decodes the
//! same as a plain split on `|`.

pub const DELIMITER: char = '|';
const ESCAPE: char = '\\';

pub fn join<S: AsRef<str>>(fields: &[S]) -> String {
    let capacity = fields.iter().map(|f| f.as_ref().len() + 1).sum();
    let mut out = String::with_capacity(capacity);
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        for c in field.as_ref().chars() {
            if c == DELIMITER || c == ESCAPE {
                out.push(ESCAPE);
            }
            out.push(c);
        }
    }
    out
}

pub fn split(raw: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(next) => current.push(next),
                // Trailing lone escape: keep it literally.
                None => current.push(ESCAPE),
            },
            DELIMITER => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        let joined = join(&["bank", "alice", "s3cret"]);
        assert_eq!(joined, "bank|alice|s3cret");
        assert_eq!(split(&joined), vec!["bank", "alice", "s3cret"]);
    }

    #[test]
    fn test_delimiter_inside_field_survives() {
        let fields = ["a|b", "user", "pa|ss|"];
        let joined = join(&fields);
        assert_eq!(split(&joined), fields);
    }

    #[test]
    fn test_escape_inside_field_survives() {
        let fields = ["C:\\Users", "\\", "end\\"];
        assert_eq!(split(&join(&fields)), fields);
    }

    #[test]
    fn test_empty_fields_kept() {
        assert_eq!(split("a||c"), vec!["a", "", "c"]);
        assert_eq!(split(""), vec![""]);
        assert_eq!(split(&join(&["", ""])), vec!["", ""]);
    }

    #[test]
    fn test_unescaped_text_splits_like_plain_split() {
        let raw = "HK PASSWORD MANAGER FILE|bank|mail";
        let expected: Vec<String> = raw.split('|').map(str::to_string).collect();
        assert_eq!(split(raw), expected);
    }

    #[test]
    fn test_trailing_lone_escape_is_literal() {
        assert_eq!(split("abc\\"), vec!["abc\\"]);
    }
}
