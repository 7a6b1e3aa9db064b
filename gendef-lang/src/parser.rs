//! Language description reader.
//!
//! A description is line oriented. Each line holds at most one declaration, a
//! type name followed by its quoted friendly name, and may end with a `#`
//! comment:
//!
//! ```text
//! # Expressions
//! Literal "Literal"
//! Call    "Function Call"   # a call expression
//! Quote   "The \"quoted\" one"
//! ```
//!
//! Inside friendly names only `\"` and `\\` are valid escapes.

use crate::error::{LoadError, SyntaxError};
use crate::lang::{Language, TreeType};
use nom::branch::alt;
use nom::bytes::complete::{take_till1, take_while, take_while_m_n};
use nom::character::complete::{char, none_of, space0};
use nom::combinator::{all_consuming, opt, recognize, rest, value};
use nom::multi::fold_many0;
use nom::sequence::{pair, preceded};
use nom::IResult;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

type Declaration<'a> = (&'a str, String);

fn name(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while_m_n(1, 1, |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(i)
}

fn word(i: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(i)
}

fn comment(i: &str) -> IResult<&str, &str> {
    preceded(char('#'), rest)(i)
}

fn blank(i: &str) -> IResult<&str, ()> {
    value((), all_consuming(pair(space0, opt(comment))))(i)
}

fn escape(i: &str) -> IResult<&str, char> {
    preceded(char('\\'), alt((char('"'), char('\\'))))(i)
}

fn string_body(i: &str) -> IResult<&str, String> {
    fold_many0(alt((none_of("\\\""), escape)), String::new, |mut s, c| {
        s.push(c);
        s
    })(i)
}

fn string(i: &str) -> Result<(&str, String), SyntaxError> {
    let (after, body) =
        preceded(char('"'), string_body)(i).map_err(|_| SyntaxError::UnterminatedString)?;

    // the body stops at a closing quote, a bad escape, or the end of the line
    let mut chars = after.chars();
    match chars.next() {
        Some('"') => Ok((chars.as_str(), body)),
        Some('\\') => match chars.next() {
            Some(c) => Err(SyntaxError::InvalidEscape(c)),
            None => Err(SyntaxError::UnterminatedString),
        },
        _ => Err(SyntaxError::UnterminatedString),
    }
}

fn skip_space(i: &str) -> &str {
    i.trim_start_matches([' ', '\t'])
}

fn is_blank(i: &str) -> bool {
    blank(i).is_ok()
}

fn declaration(i: &str) -> Result<Option<Declaration<'_>>, SyntaxError> {
    if is_blank(i) {
        return Ok(None);
    }

    let i = skip_space(i);
    let (i, token) = word(i).map_err(|_| SyntaxError::InvalidName(i.to_owned()))?;
    if all_consuming(name)(token).is_err() {
        return Err(SyntaxError::InvalidName(token.to_owned()));
    }

    let i = skip_space(i);
    if is_blank(i) {
        return Err(SyntaxError::MissingFriendlyName(token.to_owned()));
    }
    if !i.starts_with('"') {
        let found = word(i).map_or(i, |(_, w)| w);
        return Err(SyntaxError::ExpectedString(found.to_owned()));
    }

    let (i, friendly_name) = string(i)?;
    if !is_blank(i) {
        return Err(SyntaxError::TrailingInput(skip_space(i).to_owned()));
    }

    Ok(Some((token, friendly_name)))
}

fn syntax_error(path: &Path, line: usize, error: SyntaxError) -> LoadError {
    LoadError::Syntax {
        path: path.to_owned(),
        line,
        error,
    }
}

/// Parses a language description held in memory.
///
/// `path` is only used to label errors.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn parse_str(s: &str, path: &Path) -> Result<Language, LoadError> {
    let s = s.strip_prefix('\u{feff}').unwrap_or(s);
    let mut types: Vec<TreeType> = Vec::new();
    // name -> index of its declaration in `types`
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (idx, l) in s.lines().enumerate() {
        let line = idx + 1;
        // a lone '\r' can survive on a last line without '\n'
        let l = l.strip_suffix('\r').unwrap_or(l);
        let Some((name, friendly_name)) =
            declaration(l).map_err(|e| syntax_error(path, line, e))?
        else {
            continue;
        };

        // forbid duplicate names
        if let Some(&first) = seen.get(name) {
            let e = SyntaxError::DuplicateName {
                name: name.to_owned(),
                first_line: types[first].line(),
            };
            return Err(syntax_error(path, line, e));
        }
        seen.insert(name, types.len());
        types.push(TreeType::new(name.to_owned(), friendly_name, line));
    }

    debug!(count = types.len(), "loaded language description");
    Ok(Language::new(types))
}

/// Parses a language description from raw bytes, which must be UTF-8.
pub fn parse_bytes(b: &[u8], path: &Path) -> Result<Language, LoadError> {
    match std::str::from_utf8(b) {
        Ok(s) => parse_str(s, path),
        Err(e) => {
            let valid = &b[..e.valid_up_to()];
            let line = valid.iter().filter(|&&c| c == b'\n').count() + 1;
            Err(syntax_error(path, line, SyntaxError::InvalidUtf8))
        }
    }
}

/// Reads a whole language description from `r` and parses it.
pub fn parse_reader<R: Read>(mut r: R, path: &Path) -> Result<Language, LoadError> {
    let mut b = Vec::new();
    r.read_to_end(&mut b).map_err(|source| LoadError::Read {
        path: path.to_owned(),
        source,
    })?;

    parse_bytes(&b, path)
}

pub fn parse_file<P: AsRef<Path>>(p: P) -> Result<Language, LoadError> {
    let path = p.as_ref();
    let f = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_owned(),
        source,
    })?;

    parse_reader(BufReader::new(f), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(s: &str) -> Result<Language, LoadError> {
        parse_str(s, Path::new("lang.desc"))
    }

    fn parse_err(s: &str) -> (usize, SyntaxError) {
        match parse(s) {
            Err(LoadError::Syntax { line, error, .. }) => (line, error),
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_comment() {
        assert_eq!(comment("# a comment"), Ok(("", " a comment")));
        assert!(is_blank("   # indented"));
        assert!(is_blank(" \t "));
        assert!(is_blank(""));
    }

    #[test]
    fn test_name() {
        assert_eq!(name("Literal"), Ok(("", "Literal")));
        assert_eq!(name("_tmp1 x"), Ok((" x", "_tmp1")));
        assert!(name("1abc").is_err());
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(string(r#""a \"b\" \\c" rest"#), Ok((" rest", r#"a "b" \c"#.to_owned())));
        assert_eq!(string(r#""""#), Ok(("", String::new())));
        assert_eq!(string(r#""a # b""#), Ok(("", "a # b".to_owned())));
    }

    #[test]
    fn test_string_errors() {
        assert_eq!(string(r#""abc"#), Err(SyntaxError::UnterminatedString));
        assert_eq!(string(r#""abc\"#), Err(SyntaxError::UnterminatedString));
        assert_eq!(string(r#""a\nb""#), Err(SyntaxError::InvalidEscape('n')));
    }

    #[test]
    fn test_declarations_in_order() {
        let lang = parse("Literal \"Literal\"\nCall \"Function Call\"\n").unwrap();
        let types: Vec<_> = lang
            .iter()
            .map(|t| (t.name(), t.friendly_name(), t.line()))
            .collect();

        assert_eq!(
            types,
            [("Literal", "Literal", 1), ("Call", "Function Call", 2)]
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let s = "# header\n\n  \t\nIdent\t\"Identifier\"   # trailing\n";
        let lang = parse(s).unwrap();

        assert_eq!(lang.len(), 1);
        assert_eq!(lang.types()[0].line(), 4);
    }

    #[test]
    fn test_crlf_and_bom() {
        let lang = parse("\u{feff}A \"a\"\r\nB \"b\"\r\n").unwrap();
        let names: Vec<_> = lang.iter().map(TreeType::friendly_name).collect();

        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_bare_carriage_return_on_last_line() {
        let lang = parse("A \"a\"\nB \"b\"\r").unwrap();
        assert_eq!(lang.len(), 2);
    }

    #[test]
    fn test_empty_friendly_name() {
        let lang = parse("Empty \"\"").unwrap();
        assert_eq!(lang.types()[0].friendly_name(), "");
    }

    #[test]
    fn test_empty_description() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("# nothing here\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_name() {
        let s = "A \"a\"\nB \"b\"\n# again\nA \"other\"\n";

        assert_eq!(
            parse_err(s),
            (
                4,
                SyntaxError::DuplicateName {
                    name: "A".to_owned(),
                    first_line: 1
                }
            )
        );
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(
            parse_err("1st \"x\""),
            (1, SyntaxError::InvalidName("1st".to_owned()))
        );
        assert_eq!(
            parse_err("\n\nfoo-bar \"x\""),
            (3, SyntaxError::InvalidName("foo-bar".to_owned()))
        );
        assert_eq!(
            parse_err("A \"a\"\n\x0c\n"),
            (2, SyntaxError::InvalidName("\x0c".to_owned()))
        );
        assert_eq!(
            parse_err("\"x\""),
            (1, SyntaxError::InvalidName("\"x\"".to_owned()))
        );
    }

    #[test]
    fn test_missing_friendly_name() {
        assert_eq!(
            parse_err("Call"),
            (1, SyntaxError::MissingFriendlyName("Call".to_owned()))
        );
        assert_eq!(
            parse_err("Call   # no label"),
            (1, SyntaxError::MissingFriendlyName("Call".to_owned()))
        );
    }

    #[test]
    fn test_expected_string() {
        assert_eq!(
            parse_err("Call Function"),
            (1, SyntaxError::ExpectedString("Function".to_owned()))
        );
    }

    #[test]
    fn test_trailing_input() {
        assert_eq!(
            parse_err("Call \"Call\" extra"),
            (1, SyntaxError::TrailingInput("extra".to_owned()))
        );
    }

    #[test]
    fn test_error_display() {
        let e = parse("ok \"ok\"\nbad").unwrap_err();
        assert_eq!(
            e.to_string(),
            "lang.desc:2: missing friendly name for type 'bad'"
        );
    }

    #[test]
    fn test_error_display_shows_control_chars() {
        let e = parse("A \"a\"\n\x0c").unwrap_err();
        assert_eq!(
            e.to_string(),
            "lang.desc:2: invalid type name \"\\u{c}\" (expected letters, digits and underscores)"
        );

        let e = parse("A \"a\" \x0b").unwrap_err();
        assert_eq!(
            e.to_string(),
            "lang.desc:1: unexpected input after friendly name: \"\\u{b}\""
        );
    }

    #[test]
    fn test_parse_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "Literal \"Literal\"").unwrap();

        let lang = parse_file(f.path()).unwrap();
        assert_eq!(lang.len(), 1);
    }

    #[test]
    fn test_parse_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let e = parse_file(dir.path().join("nope.desc")).unwrap_err();

        assert!(matches!(e, LoadError::Open { .. }));
    }

    #[test]
    fn test_parse_reader_invalid_utf8() {
        let bytes: &[u8] = b"A \"a\"\n# ok\nB \"\xff\"\n";
        let e = parse_reader(bytes, Path::new("bin.desc")).unwrap_err();

        assert!(matches!(
            e,
            LoadError::Syntax {
                line: 3,
                error: SyntaxError::InvalidUtf8,
                ..
            }
        ));
        assert_eq!(e.to_string(), "bin.desc:3: invalid UTF-8");
    }
}
