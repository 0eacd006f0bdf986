//! Query guard: validates generated query text before it reaches the
//! structured-data backend.

use ess_core::models::{FieldSet, RowScope};

use crate::catalog::FieldCatalog;

const ALLOWED_PREFIXES: &[&str] = &["SELECT", "WITH"];
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "TRUNCATE", "REPLACE", "MERGE",
    "UPSERT", "GRANT", "REVOKE", "ATTACH", "DETACH", "PRAGMA", "VACUUM", "REINDEX", "COPY", "LOAD",
    "INSTALL",
];
/// Schema names that would reach past the scoped table bindings.
const SCHEMA_QUALIFIERS: &[&str] = &["main", "temp", "temporary"];
/// Tokens after which `*` is a column projection rather than `COUNT(*)` or
/// multiplication.
const PROJECTION_LEADS: &[&str] = &["SELECT", "DISTINCT", "ALL"];

/// Why a generated query was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardViolation {
    #[error("query is empty")]
    Empty,

    #[error("multiple statements are not allowed")]
    MultipleStatements,

    #[error("query must start with SELECT or WITH")]
    NotReadOnly,

    #[error("query contains forbidden keyword: {keyword}")]
    ForbiddenKeyword { keyword: String },

    #[error("wildcard projection is not allowed for a restricted field set")]
    WildcardProjection,

    #[error("query references a column outside the permitted set: {column}")]
    ColumnNotPermitted { column: String },

    #[error("query names schema `{schema}` directly")]
    SchemaQualified { schema: String },

    #[error("query does not filter on subject {code}")]
    MissingSubjectScope { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Keyword or identifier. `quoted` for `"x"`, `` `x` `` and `[x]`.
    Word { text: String, quoted: bool },
    /// Contents of a single-quoted string literal.
    Literal(String),
    Number(String),
    Symbol(char),
}

impl Token {
    fn is_keyword(&self, keywords: &[&str]) -> bool {
        match self {
            Token::Word {
                text,
                quoted: false,
            } => keywords.iter().any(|k| text.eq_ignore_ascii_case(k)),
            _ => false,
        }
    }
}

/// Validates read-only, single-statement queries against a permitted field
/// set and a row scope.
#[derive(Debug, Clone)]
pub struct QueryGuard {
    catalog: FieldCatalog,
}

impl QueryGuard {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Check `query` and return it with any trailing semicolon removed.
    pub fn check(
        &self,
        query: &str,
        permitted: &FieldSet,
        scope: &RowScope,
    ) -> Result<String, GuardViolation> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Err(GuardViolation::Empty);
        }

        let last = tokens.len() - 1;
        if tokens
            .iter()
            .enumerate()
            .any(|(i, t)| *t == Token::Symbol(';') && i != last)
        {
            return Err(GuardViolation::MultipleStatements);
        }

        if !tokens[0].is_keyword(ALLOWED_PREFIXES) {
            return Err(GuardViolation::NotReadOnly);
        }

        for token in &tokens {
            if token.is_keyword(FORBIDDEN_KEYWORDS) {
                if let Token::Word { text, .. } = token {
                    return Err(GuardViolation::ForbiddenKeyword {
                        keyword: text.to_ascii_uppercase(),
                    });
                }
            }
        }

        for pair in tokens.windows(2) {
            if let [Token::Word { text, .. }, Token::Symbol('.')] = pair {
                if SCHEMA_QUALIFIERS.iter().any(|s| text.eq_ignore_ascii_case(s)) {
                    return Err(GuardViolation::SchemaQualified {
                        schema: text.to_ascii_lowercase(),
                    });
                }
            }
        }

        if !permitted.is_all() {
            self.check_columns(&tokens, permitted)?;
        }

        // Text-level only: a query can mention the code without filtering on
        // it. Rows are narrowed to the scope again at execution.
        if let Some(code) = scope.required_code() {
            let mentioned = tokens.iter().any(|t| match t {
                Token::Word { text, .. } | Token::Literal(text) | Token::Number(text) => {
                    text.trim().eq_ignore_ascii_case(code.as_str())
                }
                Token::Symbol(_) => false,
            });
            if !mentioned {
                return Err(GuardViolation::MissingSubjectScope {
                    code: code.to_string(),
                });
            }
        }

        Ok(query.trim().trim_end_matches(';').trim_end().to_string())
    }

    fn check_columns(&self, tokens: &[Token], permitted: &FieldSet) -> Result<(), GuardViolation> {
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Symbol('*') if i > 0 => {
                    let prev = &tokens[i - 1];
                    if prev.is_keyword(PROJECTION_LEADS)
                        || *prev == Token::Symbol(',')
                        || *prev == Token::Symbol('.')
                    {
                        return Err(GuardViolation::WildcardProjection);
                    }
                }
                Token::Word { text, .. }
                    if self.catalog.is_catalogued(text) && !permitted.permits(text) =>
                {
                    return Err(GuardViolation::ColumnNotPermitted {
                        column: text.to_ascii_lowercase(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Split query text into tokens, dropping comments and whitespace.
fn tokenize(sql: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => {}
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '\'' => {
                let mut literal = String::new();
                while let Some(c) = chars.next() {
                    if c == '\'' {
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            literal.push('\'');
                            continue;
                        }
                        break;
                    }
                    literal.push(c);
                }
                tokens.push(Token::Literal(literal));
            }
            '"' | '`' | '[' => {
                let close = match ch {
                    '[' => ']',
                    other => other,
                };
                let text: String = chars.by_ref().take_while(|c| *c != close).collect();
                tokens.push(Token::Word { text, quoted: true });
            }
            c if c.is_ascii_digit() => {
                let mut number = String::from(c);
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '.' || n == '_' {
                        number.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(number));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&n) = chars.peek() {
                    if n.is_alphanumeric() || n == '_' || n == '$' {
                        word.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word {
                    text: word,
                    quoted: false,
                });
            }
            other => tokens.push(Token::Symbol(other)),
        }
    }
    tokens
}
