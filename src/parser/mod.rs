// SQL parsing frontend: an external lexer hands over `(kind, lexeme, line,
// column)` tokens with no semantic analysis performed; this module lowers
// that stream to a typed AST or a location-tagged diagnostic.
//
// | Module | Responsibility |
// |--------|----------------|
// | [`token`] | Terminal vocabulary and the token stream contract |
// | [`ast`] | Typed statement and expression tree |
// | [`grammar`] | Recursive-descent implementation of the grammar |
// | [`diagnostics`] | Location-tagged, recoverable parse errors |
// | [`interval`] | DATETIME vs. YEARMONTH interval literal disambiguation |
// | [`pretty`] | Canonical re-rendering of an AST, for round-trip testing |

pub mod ast;
pub mod diagnostics;
pub mod grammar;
pub mod interval;
pub mod pretty;
pub mod token;

pub use ast::Statement;
pub use diagnostics::{Diagnostic, Location};
pub use pretty::format_statement;
pub use token::{Token, TokenKind};

use grammar::Grammar;

/// Parses exactly one statement from `tokens`. The grammar's top rule is
/// `statement ';' EOF` or `statement EOF`; anything left over after the
/// first statement is a diagnostic, not a second statement.
pub fn parse_statement(tokens: &[Token]) -> Result<Statement, Diagnostic> {
    let mut grammar = Grammar::new(tokens);
    grammar.parse_statement()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;
    use crate::parser::ast::*;
    use crate::parser::token::TokenKind::*;

    fn tok(kind: token::TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, 1, 1)
    }

    fn tokens(kinds: Vec<(token::TokenKind, &str)>) -> Vec<Token> {
        let mut out: Vec<Token> = kinds.into_iter().map(|(k, l)| tok(k, l)).collect();
        out.push(tok(Eof, ""));
        out
    }

    #[test]
    fn parses_simple_select_with_aggregation() {
        // SELECT name, COUNT(*) FROM t GROUP BY name
        let ts = tokens(vec![
            (Select, "SELECT"),
            (Name, "name"),
            (Comma, ","),
            (Name, "count"),
            (LeftParen, "("),
            (Star, "*"),
            (RightParen, ")"),
            (From, "FROM"),
            (Name, "t"),
            (Group, "GROUP"),
            (By, "BY"),
            (Name, "name"),
        ]);
        let stmt = parse_statement(&ts).unwrap();
        match stmt {
            Statement::Select(sel) => {
                assert_eq!(sel.selection.len(), 2);
                assert_eq!(sel.group_by.len(), 1);
            }
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn char_length_must_be_positive() {
        // CREATE TABLE t (a CHAR(0))
        let ts = tokens(vec![
            (Create, "CREATE"),
            (Table, "TABLE"),
            (Name, "t"),
            (LeftParen, "("),
            (Name, "a"),
            (Character, "CHAR"),
            (LeftParen, "("),
            (UnsignedNumval, "0"),
            (RightParen, ")"),
            (RightParen, ")"),
        ]);
        let err = parse_statement(&ts).unwrap_err();
        match err {
            Diagnostic::InvalidLiteral { message, .. } => {
                assert_eq!(message, "Length for CHAR type must be at least 1");
            }
            other => panic!("expected InvalidLiteral, got {other:?}"),
        }
    }

    #[test]
    fn char_length_ok_builds_column() {
        let ts = tokens(vec![
            (Create, "CREATE"),
            (Table, "TABLE"),
            (Name, "t"),
            (LeftParen, "("),
            (Name, "a"),
            (Character, "CHAR"),
            (LeftParen, "("),
            (UnsignedNumval, "10"),
            (RightParen, ")"),
            (RightParen, ")"),
        ]);
        let stmt = parse_statement(&ts).unwrap();
        match stmt {
            Statement::CreateTable(c) => {
                assert_eq!(c.columns[0].data_type, DataType::Char(10));
            }
            other => panic!("expected CreateTable, got {:?}", other),
        }
    }

    #[test]
    fn insert_with_interval_literal_disambiguates_as_datetime() {
        // INSERT INTO t VALUES (INTERVAL '1 day');
        let ts = tokens(vec![
            (Insert, "INSERT"),
            (Into, "INTO"),
            (Name, "t"),
            (Values, "VALUES"),
            (LeftParen, "("),
            (Interval, "INTERVAL"),
            (StringSingleQuoted, "1 day"),
            (RightParen, ")"),
        ]);
        let stmt = parse_statement(&ts).unwrap();
        match stmt {
            Statement::Insert(ins) => {
                assert_eq!(ins.values.len(), 1);
                assert_eq!(
                    ins.values[0],
                    Literal::Interval(interval::IntervalLiteral::DatetimeInterval(
                        "1 day".to_string()
                    ))
                );
            }
            other => panic!("expected Insert, got {:?}", other),
        }
    }

    #[test]
    fn interval_disambiguates_year_month_vs_datetime() {
        assert_eq!(
            interval::classify("3 years"),
            interval::IntervalLiteral::YearMonthInterval("3 years".to_string())
        );
        assert_eq!(
            interval::classify("1 12:00:00"),
            interval::IntervalLiteral::DatetimeInterval("1 12:00:00".to_string())
        );
    }

    #[test]
    fn unsupported_construct_reports_not_supported() {
        // SELECT * FROM a LEFT JOIN b ON a.x = b.x
        let ts = tokens(vec![
            (Select, "SELECT"),
            (Star, "*"),
            (From, "FROM"),
            (Name, "a"),
            (Left, "LEFT"),
            (Join, "JOIN"),
            (Name, "b"),
            (On, "ON"),
        ]);
        let err = parse_statement(&ts).unwrap_err();
        assert!(matches!(err, Diagnostic::NotSupported { .. }));
    }

    #[test]
    fn column_list_insert_rejected() {
        let ts = tokens(vec![
            (Insert, "INSERT"),
            (Into, "INTO"),
            (Name, "t"),
            (LeftParen, "("),
            (Name, "a"),
            (RightParen, ")"),
        ]);
        let err = parse_statement(&ts).unwrap_err();
        assert!(matches!(err, Diagnostic::NotSupported { .. }));
    }
}
