//! Scanner for multi-row `INSERT INTO ... VALUES (...), (...);` statements.
//!
//! Walks the script byte by byte, tracking single-quoted literals (with `''`
//! escapes) and skipping `--` / `/* */` comments, so parentheses or commas
//! inside names never split a tuple. Both the categorizer and the CSV export
//! read tuples through here.

use std::ops::Range;

use crate::category::Category;
use crate::company::{unescape_sql, Company};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// Single-quoted literal, already unescaped.
    Text(String),
    /// Anything else, verbatim: numbers, `NULL`, `NOW()`.
    Raw(String),
}

impl SqlValue {
    fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
            let inner = &token[1..token.len() - 1];
            if !inner.replace("''", "").contains('\'') {
                return SqlValue::Text(unescape_sql(inner));
            }
        }
        SqlValue::Raw(token.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            SqlValue::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            SqlValue::Raw(s) => Some(s),
            SqlValue::Text(_) => None,
        }
    }

    /// Text value or raw token, as a flat string.
    pub fn plain(&self) -> &str {
        match self {
            SqlValue::Text(s) | SqlValue::Raw(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    pub values: Vec<SqlValue>,
    /// Byte range of the tuple in the source, parentheses included.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub tuples: Vec<Tuple>,
}

/// A tuple in the fixed company shape:
/// seven strings, an integer category, `NOW(), NOW()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyTuple {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub ville: String,
    pub adresse: String,
    pub tel: String,
    pub activite: String,
    pub category_id: u32,
}

impl CompanyTuple {
    pub fn into_company(self, category: Category) -> Company {
        Company {
            name: self.name,
            slug: self.slug,
            description: self.description,
            ville: self.ville,
            adresse: self.adresse,
            tel: self.tel,
            activite: self.activite,
            category,
        }
    }
}

impl Tuple {
    pub fn as_company(&self) -> Option<CompanyTuple> {
        if self.values.len() != 10 {
            return None;
        }
        let texts: Vec<&str> = self.values[..7]
            .iter()
            .map(SqlValue::as_text)
            .collect::<Option<_>>()?;
        let category = self.values[7].as_raw()?;
        if category.is_empty() || !category.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let category_id = category.parse().ok()?;
        if self.values[8..].iter().any(|v| v.as_raw() != Some("NOW()")) {
            return None;
        }
        Some(CompanyTuple {
            name: texts[0].to_string(),
            slug: texts[1].to_string(),
            description: texts[2].to_string(),
            ville: texts[3].to_string(),
            adresse: texts[4].to_string(),
            tel: texts[5].to_string(),
            activite: texts[6].to_string(),
            category_id,
        })
    }
}

pub fn parse_inserts(sql: &str) -> Vec<InsertStatement> {
    let mut scanner = Scanner::new(sql);
    let mut statements = Vec::new();
    while scanner.pos < scanner.bytes.len() {
        match scanner.peek() {
            Some(b'\'') => scanner.skip_literal(),
            Some(b'-') if scanner.starts_with("--") => scanner.skip_line_comment(),
            Some(b'/') if scanner.starts_with("/*") => scanner.skip_block_comment(),
            Some(_) if scanner.at_keyword("INSERT") => {
                let resume = scanner.pos + "INSERT".len();
                match scanner.insert_statement() {
                    Some(stmt) => statements.push(stmt),
                    None => scanner.pos = resume,
                }
            }
            _ => scanner.pos += 1,
        }
    }
    statements
}

/// Every company-shaped tuple in the script, in source order.
pub fn company_tuples(sql: &str) -> Vec<(Range<usize>, CompanyTuple)> {
    parse_inserts(sql)
        .into_iter()
        .flat_map(|stmt| stmt.tuples)
        .filter_map(|t| t.as_company().map(|c| (t.span, c)))
        .collect()
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Scanner {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    fn at_keyword(&self, kw: &str) -> bool {
        let end = self.pos + kw.len();
        if end > self.bytes.len() || !self.bytes[self.pos..end].eq_ignore_ascii_case(kw.as_bytes()) {
            return false;
        }
        let before_ok = self.pos == 0 || !is_ident_byte(self.bytes[self.pos - 1]);
        let after_ok = self.bytes.get(end).map_or(true, |b| !is_ident_byte(*b));
        before_ok && after_ok
    }

    fn expect_keyword(&mut self, kw: &str) -> Option<()> {
        self.skip_trivia();
        if self.at_keyword(kw) {
            self.pos += kw.len();
            Some(())
        } else {
            None
        }
    }

    fn skip_literal(&mut self) {
        self.pos += 1;
        while let Some(b) = self.peek() {
            if b == b'\'' {
                if self.bytes.get(self.pos + 1) == Some(&b'\'') {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return;
            }
            self.pos += 1;
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.bytes.len() {
            if self.starts_with("*/") {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'-') if self.starts_with("--") => self.skip_line_comment(),
                Some(b'/') if self.starts_with("/*") => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    fn identifier(&mut self) -> Option<String> {
        self.skip_trivia();
        if self.peek() == Some(b'"') {
            let start = self.pos + 1;
            let end = self.src[start..].find('"')? + start;
            self.pos = end + 1;
            return Some(self.src[start..end].to_string());
        }
        let start = self.pos;
        while self.peek().is_some_and(|b| is_ident_byte(b) || b == b'.') {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.src[start..self.pos].to_string())
    }

    fn column_list(&mut self) -> Option<Vec<String>> {
        self.skip_trivia();
        if self.peek() != Some(b'(') {
            return Some(Vec::new());
        }
        let start = self.pos + 1;
        let end = self.src[start..].find(')')? + start;
        self.pos = end + 1;
        Some(
            self.src[start..end]
                .split(',')
                .map(|c| c.trim().trim_matches('"').to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }

    fn insert_statement(&mut self) -> Option<InsertStatement> {
        self.pos += "INSERT".len();
        self.expect_keyword("INTO")?;
        let table = self.identifier()?;
        let columns = self.column_list()?;
        self.expect_keyword("VALUES")?;

        let mut tuples = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() != Some(b'(') {
                break;
            }
            tuples.push(self.tuple()?);
            self.skip_trivia();
            if self.peek() == Some(b',') {
                self.pos += 1;
            } else {
                break;
            }
        }
        Some(InsertStatement {
            table,
            columns,
            tuples,
        })
    }

    fn tuple(&mut self) -> Option<Tuple> {
        let start = self.pos;
        self.pos += 1;
        let mut depth = 1usize;
        let mut value_start = self.pos;
        let mut values = Vec::new();
        while let Some(b) = self.peek() {
            match b {
                b'\'' => {
                    self.skip_literal();
                    continue;
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        values.push(SqlValue::from_token(&self.src[value_start..self.pos]));
                        self.pos += 1;
                        return Some(Tuple {
                            values,
                            span: start..self.pos,
                        });
                    }
                }
                b',' if depth == 1 => {
                    values.push(SqlValue::from_token(&self.src[value_start..self.pos]));
                    value_start = self.pos + 1;
                }
                _ => {}
            }
            self.pos += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"-- Note: it's a test (categoryId = 1)
/*
CREATE TABLE IF NOT EXISTS "Company" (
  name VARCHAR(255) NOT NULL
);
*/
INSERT INTO "Company" (name, slug, description, ville, adresse, tel, activite, "categoryId", "createdAt", "updatedAt") VALUES
  ('Chez l''Ami (Sarl)', 'chez-l-ami-sarl', 'Restaurant, bar', 'Dakar', 'Rue 10, Plateau', '33 823 45 67', 'Restaurant, bar', 1, NOW(), NOW()),
  ('Sen Auto', 'sen-auto', 'Entreprise basée à Thiès', 'Thiès', '', '', '', 1, NOW(), NOW())
ON CONFLICT (slug) DO NOTHING;

SELECT setval('"Company_id_seq"', (SELECT MAX(id) FROM "Company"));
"#;

    #[test]
    fn finds_statement_and_columns() {
        let stmts = parse_inserts(SCRIPT);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].table, "Company");
        assert_eq!(stmts[0].columns.len(), 10);
        assert_eq!(stmts[0].columns[7], "categoryId");
        assert_eq!(stmts[0].tuples.len(), 2);
    }

    #[test]
    fn quotes_commas_and_parens_stay_inside_values() {
        let stmts = parse_inserts(SCRIPT);
        let first = &stmts[0].tuples[0];
        assert_eq!(first.values.len(), 10);
        assert_eq!(first.values[0], SqlValue::Text("Chez l'Ami (Sarl)".to_string()));
        assert_eq!(first.values[4], SqlValue::Text("Rue 10, Plateau".to_string()));
        assert_eq!(first.values[7], SqlValue::Raw("1".to_string()));
        assert_eq!(first.values[8], SqlValue::Raw("NOW()".to_string()));
    }

    #[test]
    fn span_covers_tuple_text() {
        let tuples = company_tuples(SCRIPT);
        assert_eq!(tuples.len(), 2);
        let (span, company) = &tuples[1];
        assert!(SCRIPT[span.clone()].starts_with("('Sen Auto'"));
        assert!(SCRIPT[span.clone()].ends_with("NOW())"));
        assert_eq!(company.ville, "Thiès");
        assert_eq!(company.category_id, 1);
    }

    #[test]
    fn rejects_other_shapes() {
        let sql = "INSERT INTO t (a, b) VALUES ('x', 2), ('y', NULL);\n\
                   INSERT INTO \"Company\" VALUES ('a','b','c','d','e','f','g', x, NOW(), NOW());";
        assert_eq!(parse_inserts(sql).len(), 2);
        assert!(company_tuples(sql).is_empty());
    }

    #[test]
    fn commented_out_insert_is_ignored() {
        let sql = "-- INSERT INTO \"Company\" (name) VALUES ('ghost');\n\
                   /* INSERT INTO \"Company\" (name) VALUES ('ghost2'); */";
        assert!(parse_inserts(sql).is_empty());
    }

    #[test]
    fn unterminated_tuple_is_dropped() {
        let sql = "INSERT INTO \"Company\" (name) VALUES ('open";
        assert!(parse_inserts(sql).iter().all(|s| s.tuples.is_empty()));
    }

    #[test]
    fn keyword_inside_identifier_is_not_a_statement() {
        let sql = "SELECT reinsert_into FROM x;";
        assert!(parse_inserts(sql).is_empty());
    }
}
