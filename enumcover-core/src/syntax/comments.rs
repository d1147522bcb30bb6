//! Comment lexer.
//!
//! syn drops ordinary comments, so they are recovered from the raw source.
//! Line (`//`, `///`, `//!`) and nested block comments are collected with
//! their positions; string, raw string, byte string and char literals are
//! skipped so their contents never look like comments.

use crate::types::SourceSpan;

/// A single comment with its raw text (delimiters included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: SourceSpan,
    /// Code precedes the comment on its first line.
    pub trailing: bool,
}

/// Comments that belong together: consecutive own-line comments, or a single
/// trailing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
    pub first_line: usize,
    pub last_line: usize,
    pub trailing: bool,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    code_on_line: bool,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
            code_on_line: false,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
            self.code_on_line = false;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn prev_is_ident(&self) -> bool {
        self.pos > 0 && is_ident_char(self.chars[self.pos - 1])
    }

    fn run(mut self) -> Vec<Comment> {
        let mut comments = Vec::new();
        while let Some(c) = self.peek(0) {
            match c {
                '/' if self.peek(1) == Some('/') => comments.push(self.line_comment()),
                '/' if self.peek(1) == Some('*') => comments.push(self.block_comment()),
                '"' => {
                    self.code_on_line = true;
                    self.bump();
                    self.quoted('"');
                }
                'r' | 'b' | 'c' if !self.prev_is_ident() && self.raw_string_ahead() => {
                    self.code_on_line = true;
                    self.raw_string();
                }
                'b' if !self.prev_is_ident() && matches!(self.peek(1), Some('"' | '\'')) => {
                    self.code_on_line = true;
                    self.bump();
                    let quote = self.bump().unwrap_or('"');
                    self.quoted(quote);
                }
                'c' if !self.prev_is_ident() && self.peek(1) == Some('"') => {
                    self.code_on_line = true;
                    self.bump();
                    self.bump();
                    self.quoted('"');
                }
                '\'' => {
                    self.code_on_line = true;
                    self.char_or_lifetime();
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                _ => {
                    self.code_on_line = true;
                    self.bump();
                }
            }
        }
        comments
    }

    fn line_comment(&mut self) -> Comment {
        let trailing = self.code_on_line;
        let (line, column, start) = (self.line, self.column, self.pos);
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.bump();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let text = text.trim_end_matches('\r').to_string();
        Comment {
            span: SourceSpan::new(line, column, line, column + text.chars().count()),
            text,
            trailing,
        }
    }

    fn block_comment(&mut self) -> Comment {
        let trailing = self.code_on_line;
        let (line, column, start) = (self.line, self.column, self.pos);
        self.bump();
        self.bump();
        let mut depth = 1;
        while depth > 0 {
            match (self.peek(0), self.peek(1)) {
                (Some('/'), Some('*')) => {
                    depth += 1;
                    self.bump();
                    self.bump();
                }
                (Some('*'), Some('/')) => {
                    depth -= 1;
                    self.bump();
                    self.bump();
                }
                (Some(_), _) => {
                    self.bump();
                }
                (None, _) => break,
            }
        }
        Comment {
            text: self.chars[start..self.pos].iter().collect(),
            span: SourceSpan::new(line, column, self.line, self.column),
            trailing,
        }
    }

    /// Skip to the closing `quote`, honoring backslash escapes.
    fn quoted(&mut self, quote: char) {
        while let Some(c) = self.bump() {
            if c == '\\' {
                self.bump();
            } else if c == quote {
                break;
            }
        }
    }

    /// `r"`, `r#"`, `br"`, `cr#"` ...
    fn raw_string_ahead(&self) -> bool {
        let mut i = 0;
        if matches!(self.peek(0), Some('b' | 'c')) {
            i = 1;
        }
        if self.peek(i) != Some('r') {
            return false;
        }
        i += 1;
        while self.peek(i) == Some('#') {
            i += 1;
        }
        self.peek(i) == Some('"')
    }

    fn raw_string(&mut self) {
        while self.peek(0) != Some('r') {
            self.bump();
        }
        self.bump();
        let mut hashes = 0;
        while self.peek(0) == Some('#') {
            hashes += 1;
            self.bump();
        }
        self.bump();
        while let Some(c) = self.bump() {
            if c == '"' && (0..hashes).all(|k| self.peek(k) == Some('#')) {
                for _ in 0..hashes {
                    self.bump();
                }
                break;
            }
        }
    }

    /// `'a'`, `'\n'`, `'\u{1F600}'` are chars; `'a` and `'static` are
    /// lifetimes or labels.
    fn char_or_lifetime(&mut self) {
        self.bump();
        match (self.peek(0), self.peek(1)) {
            (Some('\\'), _) => self.quoted('\''),
            (Some(_), Some('\'')) => {
                self.bump();
                self.bump();
            }
            _ => {}
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lex every comment in `source`, in source order.
pub fn lex_comments(source: &str) -> Vec<Comment> {
    Lexer::new(source).run()
}

/// Group comments: consecutive own-line comments merge, each trailing
/// comment stands alone.
pub fn group_comments(comments: Vec<Comment>) -> Vec<CommentGroup> {
    let mut groups: Vec<CommentGroup> = Vec::new();
    for comment in comments {
        if !comment.trailing {
            if let Some(last) = groups.last_mut() {
                if !last.trailing && comment.span.line <= last.last_line + 1 {
                    last.last_line = comment.span.end_line;
                    last.comments.push(comment);
                    continue;
                }
            }
        }
        groups.push(CommentGroup {
            first_line: comment.span.line,
            last_line: comment.span.end_line,
            trailing: comment.trailing,
            comments: vec![comment],
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        lex_comments(source).into_iter().map(|c| c.text).collect()
    }

    #[test]
    fn test_line_and_doc_comments() {
        let src = "// one\n/// two\n//! three\nfn f() {} // four\n";
        assert_eq!(texts(src), vec!["// one", "/// two", "//! three", "// four"]);

        let comments = lex_comments(src);
        assert!(!comments[0].trailing);
        assert!(comments[3].trailing);
        assert_eq!(comments[3].span.line, 4);
        assert_eq!(comments[3].span.column, 10);
    }

    #[test]
    fn test_nested_block_comment() {
        let src = "/* outer /* inner */ still */ fn f() {}";
        assert_eq!(texts(src), vec!["/* outer /* inner */ still */"]);
    }

    #[test]
    fn test_strings_are_not_comments() {
        let src = r####"
let a = "// not a comment";
let b = r#"/* nor "this" */"#;
let c = b"// bytes";
let d = '"'; // real
"####;
        assert_eq!(texts(src), vec!["// real"]);
    }

    #[test]
    fn test_lifetimes_are_not_chars() {
        let src = "fn f<'a>(x: &'a str) -> &'a str { x } // after lifetime\n";
        assert_eq!(texts(src), vec!["// after lifetime"]);
    }

    #[test]
    fn test_escaped_char_literal() {
        let src = "let q = '\\''; // quote\n";
        assert_eq!(texts(src), vec!["// quote"]);
    }

    #[test]
    fn test_grouping() {
        let src = "// a\n// b\n\n// c\nlet x = 1; // d\n";
        let groups = group_comments(lex_comments(src));
        assert_eq!(groups.len(), 3);
        assert_eq!((groups[0].first_line, groups[0].last_line), (1, 2));
        assert_eq!(groups[0].comments.len(), 2);
        assert_eq!((groups[1].first_line, groups[1].last_line), (4, 4));
        assert!(groups[2].trailing);
    }
}
