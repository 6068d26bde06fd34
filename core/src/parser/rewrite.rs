//! Rewrites pattern syntax the grammars do not know (`$X`, `$...XS`, `...`)
//! into placeholders they accept.

use crate::lang::Family;
use crate::parser::source_map::Edit;

pub const MVAR_PREFIX: &str = "__mv_";
pub const ELLIPSIS_MVAR_PREFIX: &str = "__mvs_";
pub const PHP_ELLIPSIS: &str = "__ELLIPSIS__";

const PHP_SUPERGLOBALS: [&str; 9] = [
    "GLOBALS", "_SERVER", "_GET", "_POST", "_FILES", "_COOKIE", "_SESSION", "_REQUEST", "_ENV",
];

#[derive(Debug, Clone)]
pub struct Rewritten {
    pub text: String,
    pub edits: Vec<Edit>,
}

/// `[A-Z_][A-Z0-9_]*`
pub fn is_metavar_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// PHP variables double as metavariables, except for the superglobals.
pub fn is_php_metavar(variable: &str) -> bool {
    match variable.strip_prefix('$') {
        Some(name) => is_metavar_name(name) && !PHP_SUPERGLOBALS.contains(&name),
        None => false,
    }
}

fn line_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |pos| start + pos)
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
        end += 1;
    }
    end
}

struct Builder<'a> {
    source: &'a str,
    out: String,
    edits: Vec<Edit>,
    copied_from: usize,
}

impl<'a> Builder<'a> {
    fn replace(&mut self, start: usize, end: usize, replacement: &str) {
        self.out.push_str(&self.source[self.copied_from..start]);
        self.edits.push(Edit {
            new_start: self.out.len(),
            new_end: self.out.len() + replacement.len(),
            orig_start: start,
            orig_end: end,
        });
        self.out.push_str(replacement);
        self.copied_from = end;
    }

    fn finish(mut self) -> Rewritten {
        self.out.push_str(&self.source[self.copied_from..]);
        Rewritten {
            text: self.out,
            edits: self.edits,
        }
    }
}

pub fn rewrite(text: &str, family: Family) -> Rewritten {
    let bytes = text.as_bytes();
    let mut builder = Builder {
        source: text,
        out: String::with_capacity(text.len() + 16),
        edits: Vec::new(),
        copied_from: 0,
    };
    // Open string literal: quote byte and delimiter length (1, or 3 for
    // Python triple-quoted strings).
    let mut quote: Option<(u8, usize)> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some((q, len)) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q && bytes[i..].iter().take(len).filter(|c| **c == q).count() == len {
                quote = None;
                i += len;
            } else {
                i += 1;
            }
            continue;
        }

        match b {
            b'\'' | b'"' => {
                let triple = family == Family::Python
                    && bytes[i..].iter().take(3).filter(|c| **c == b).count() == 3;
                let len = if triple { 3 } else { 1 };
                quote = Some((b, len));
                i += len;
            }
            b'#' if family == Family::Python || bytes.get(i + 1) != Some(&b'[') => {
                i = line_end(bytes, i);
            }
            b'/' if family == Family::Php && bytes.get(i + 1) == Some(&b'/') => {
                i = line_end(bytes, i);
            }
            b'/' if family == Family::Php && bytes.get(i + 1) == Some(&b'*') => {
                i = match text[i + 2..].find("*/") {
                    Some(pos) => i + 2 + pos + 2,
                    None => bytes.len(),
                };
            }
            b'$' if text[i + 1..].starts_with("...") => {
                let name_end = ident_end(bytes, i + 4);
                let name = &text[i + 4..name_end];
                if is_metavar_name(name) {
                    let placeholder = match family {
                        Family::Python => format!("{ELLIPSIS_MVAR_PREFIX}{name}"),
                        Family::Php => format!("${ELLIPSIS_MVAR_PREFIX}{name}"),
                    };
                    builder.replace(i, name_end, &placeholder);
                    i = name_end;
                } else {
                    i += 1;
                }
            }
            b'$' => {
                let name_end = ident_end(bytes, i + 1);
                let name = &text[i + 1..name_end];
                if family == Family::Python && is_metavar_name(name) {
                    builder.replace(i, name_end, &format!("{MVAR_PREFIX}{name}"));
                }
                i = name_end.max(i + 1);
            }
            b'.' if text[i..].starts_with("...") => {
                let next = bytes.get(i + 3).copied();
                let is_spread =
                    matches!(next, Some(c) if c == b'$' || c.is_ascii_alphanumeric() || c == b'_');
                if family == Family::Php && !is_spread {
                    builder.replace(i, i + 3, PHP_ELLIPSIS);
                }
                i += 3;
            }
            _ => i += 1,
        }
    }

    builder.finish()
}

/// Strip the indentation shared by every non-blank line. Returns `None`
/// when there is nothing to strip.
pub fn dedent(text: &str) -> Option<Rewritten> {
    let leading = |line: &str| {
        line.bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count()
    };
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(leading)
        .min()?;
    if indent == 0 {
        return None;
    }

    let mut builder = Builder {
        source: text,
        out: String::with_capacity(text.len()),
        edits: Vec::new(),
        copied_from: 0,
    };
    let mut line_start = 0;
    for line in text.split_inclusive('\n') {
        let strip = leading(line).min(indent);
        if strip > 0 {
            builder.replace(line_start, line_start + strip, "");
        }
        line_start += line.len();
    }
    Some(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metavar_names() {
        assert!(is_metavar_name("X"));
        assert!(is_metavar_name("_"));
        assert!(is_metavar_name("FOO_2"));
        assert!(!is_metavar_name("x"));
        assert!(!is_metavar_name("Foo"));
        assert!(!is_metavar_name("2X"));
        assert!(!is_metavar_name(""));
    }

    #[test]
    fn php_superglobals_are_not_metavars() {
        assert!(is_php_metavar("$X"));
        assert!(!is_php_metavar("$_GET"));
        assert!(!is_php_metavar("$x"));
    }

    #[test]
    fn python_metavars_become_identifiers() {
        let out = rewrite("print($X, $...ARGS)", Family::Python);
        assert_eq!(out.text, "print(__mv_X, __mvs_ARGS)");
        assert_eq!(out.edits.len(), 2);
        assert_eq!(out.edits[0].orig_start, 6);
        assert_eq!(out.edits[0].orig_end, 8);
    }

    #[test]
    fn python_strings_and_comments_untouched() {
        let out = rewrite("f('$X') # $Y\n", Family::Python);
        assert_eq!(out.text, "f('$X') # $Y\n");
        assert!(out.edits.is_empty());
    }

    #[test]
    fn php_ellipsis_and_spread() {
        let out = rewrite("foo(...); bar(...$args);", Family::Php);
        assert_eq!(out.text, "foo(__ELLIPSIS__); bar(...$args);");
    }

    #[test]
    fn php_keeps_plain_metavars() {
        let out = rewrite("echo $X;", Family::Php);
        assert_eq!(out.text, "echo $X;");
        let out = rewrite("f($...XS);", Family::Php);
        assert_eq!(out.text, "f($__mvs_XS);");
    }

    #[test]
    fn python_triple_quoted_strings() {
        let out = rewrite("x = '''it's $Y'''\nfoo($X)", Family::Python);
        assert_eq!(out.text, "x = '''it's $Y'''\nfoo(__mv_X)");

        let out = rewrite(r#"d = """say "hi" $Y"""; f($X)"#, Family::Python);
        assert_eq!(out.text, r#"d = """say "hi" $Y"""; f(__mv_X)"#);

        let out = rewrite("f('', $X)", Family::Python);
        assert_eq!(out.text, "f('', __mv_X)");
    }

    #[test]
    fn php_comments_do_not_open_strings() {
        let out = rewrite("// don't\nfoo($A, ...);", Family::Php);
        assert_eq!(out.text, "// don't\nfoo($A, __ELLIPSIS__);");

        let out = rewrite("# it's\nfoo(...);", Family::Php);
        assert_eq!(out.text, "# it's\nfoo(__ELLIPSIS__);");

        let out = rewrite("/* can't ... */ f($...XS);", Family::Php);
        assert_eq!(out.text, "/* can't ... */ f($__mvs_XS);");
    }

    #[test]
    fn php_attributes_are_not_comments() {
        let out = rewrite("#[Route('/x')]\nfunction f(...) {}", Family::Php);
        assert_eq!(out.text, "#[Route('/x')]\nfunction f(__ELLIPSIS__) {}");
    }

    #[test]
    fn dedent_common_indent() {
        let out = dedent("    if x:\n        y()\n").unwrap();
        assert_eq!(out.text, "if x:\n    y()\n");
        assert!(dedent("x = 1\n  y").is_none());
    }
}
