// Canonical re-rendering of an AST back to SQL text, for the supported
// grammar subset only. Exists so the round-trip property (pretty-print,
// re-parse, compare) has something concrete to exercise; it is not a
// general unparser for every construct the grammar recognizes-then-rejects.

use crate::catalog::DataType;
use crate::parser::ast::*;
use crate::parser::interval::IntervalLiteral;

pub fn format_statement(stmt: &Statement) -> String {
    let mut out = String::new();
    match stmt {
        Statement::Quit => out.push_str("QUIT"),
        Statement::CreateTable(s) => format_create_table(s, &mut out),
        Statement::DropTable(s) => out.push_str(&format!("DROP TABLE {}", s.table)),
        Statement::Insert(s) => format_insert(s, &mut out),
        Statement::CopyFrom(s) => format_copy_from(s, &mut out),
        Statement::Update(s) => format_update(s, &mut out),
        Statement::Delete(s) => format_delete(s, &mut out),
        Statement::Select(s) => format_select(s, &mut out),
    }
    out.push(';');
    out
}

fn format_create_table(s: &CreateTableStatement, out: &mut String) {
    out.push_str(&format!("CREATE TABLE {} (", s.table));
    let cols: Vec<String> = s
        .columns
        .iter()
        .map(|c| format!("{} {}", c.name, format_data_type(&c.data_type)))
        .collect();
    out.push_str(&cols.join(", "));
    out.push(')');
}

fn format_data_type(dt: &DataType) -> String {
    match dt {
        DataType::Integer => "INTEGER".to_string(),
        DataType::Double => "DOUBLE".to_string(),
        DataType::Char(n) => format!("CHAR({n})"),
        DataType::Varchar(n) => format!("VARCHAR({n})"),
        DataType::DateTime => "DATETIME".to_string(),
        DataType::DateTimeInterval => "DATETIME INTERVAL".to_string(),
        DataType::YearMonthInterval => "YEARMONTH INTERVAL".to_string(),
    }
}

fn format_insert(s: &InsertStatement, out: &mut String) {
    out.push_str(&format!("INSERT INTO {} VALUES (", s.table));
    let vals: Vec<String> = s.values.iter().map(format_literal).collect();
    out.push_str(&vals.join(", "));
    out.push(')');
}

fn format_copy_from(s: &CopyFromStatement, out: &mut String) {
    out.push_str(&format!("COPY {} FROM '{}'", s.table, s.path));
    let mut opts = Vec::new();
    if let Some(d) = &s.options.delimiter {
        opts.push(format!("DELIMITER '{d}'"));
    }
    if let Some(e) = s.options.escape_strings {
        opts.push(format!("ESCAPE_STRINGS {}", if e { "TRUE" } else { "FALSE" }));
    }
    if !opts.is_empty() {
        out.push_str(" WITH (");
        out.push_str(&opts.join(", "));
        out.push(')');
    }
}

fn format_update(s: &UpdateStatement, out: &mut String) {
    out.push_str(&format!("UPDATE {} SET ", s.table));
    let assigns: Vec<String> = s
        .assignments
        .iter()
        .map(|a| format!("{} = {}", a.column, format_expr(&a.value)))
        .collect();
    out.push_str(&assigns.join(", "));
    if let Some(f) = &s.filter {
        out.push_str(" WHERE ");
        out.push_str(&format_expr(f));
    }
}

fn format_delete(s: &DeleteStatement, out: &mut String) {
    out.push_str(&format!("DELETE FROM {}", s.table));
    if let Some(f) = &s.filter {
        out.push_str(" WHERE ");
        out.push_str(&format_expr(f));
    }
}

fn format_select(s: &SelectStatement, out: &mut String) {
    out.push_str("SELECT ");
    if s.selection.len() == 1 && s.selection[0] == SelectItem::Wildcard {
        out.push('*');
    } else {
        let items: Vec<String> = s
            .selection
            .iter()
            .map(|item| match item {
                SelectItem::Wildcard => "*".to_string(),
                SelectItem::Expr { expr, alias } => match alias {
                    Some(a) => format!("{} AS {a}", format_expr(expr)),
                    None => format_expr(expr),
                },
            })
            .collect();
        out.push_str(&items.join(", "));
    }
    out.push_str(" FROM ");
    let refs: Vec<String> = s
        .from
        .iter()
        .map(|t| match &t.signature {
            Some(sig) => format!("{} {}", t.name, sig.alias),
            None => t.name.clone(),
        })
        .collect();
    out.push_str(&refs.join(", "));
    if let Some(f) = &s.filter {
        out.push_str(" WHERE ");
        out.push_str(&format_expr(f));
    }
    if !s.group_by.is_empty() {
        out.push_str(" GROUP BY ");
        let items: Vec<String> = s.group_by.iter().map(format_expr).collect();
        out.push_str(&items.join(", "));
    }
    if let Some(h) = &s.having {
        out.push_str(" HAVING ");
        out.push_str(&format_expr(h));
    }
    if !s.order_by.is_empty() {
        out.push_str(" ORDER BY ");
        let items: Vec<String> = s
            .order_by
            .iter()
            .map(|o| {
                let dir = match o.order {
                    SortOrder::Asc => "ASC",
                    SortOrder::Desc => "DESC",
                };
                format!("{} {dir}", format_expr(&o.expr))
            })
            .collect();
        out.push_str(&items.join(", "));
    }
    if let Some(n) = s.limit {
        out.push_str(&format!(" LIMIT {n}"));
    }
}

fn format_literal(lit: &Literal) -> String {
    match lit {
        Literal::Null => "NULL".to_string(),
        Literal::Integer(n) => n.to_string(),
        Literal::Double(n) => n.to_string(),
        Literal::String(s) => format!("'{s}'"),
        Literal::Interval(IntervalLiteral::DatetimeInterval(text))
        | Literal::Interval(IntervalLiteral::YearMonthInterval(text)) => {
            format!("INTERVAL '{text}'")
        }
        Literal::Typed { data_type, text } => format!("{} '{text}'", format_data_type(data_type)),
    }
}

fn format_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(lit) => format_literal(lit),
        Expr::Column { table: Some(t), name } => format!("{t}.{name}"),
        Expr::Column { table: None, name } => name.clone(),
        Expr::FunctionCall { name, args: _, star: true } => format!("{name}(*)"),
        Expr::FunctionCall { name, args, star: false } => {
            let items: Vec<String> = args.iter().map(format_expr).collect();
            format!("{name}({})", items.join(", "))
        }
        Expr::Unary { op, operand } => format!("{}{}", format_arith_op(*op), format_expr(operand)),
        Expr::Arith { op, left, right } => {
            format!("{} {} {}", format_expr(left), format_arith_op(*op), format_expr(right))
        }
        Expr::Compare { op, left, right } => {
            format!("{} {} {}", format_expr(left), format_compare_op(*op), format_expr(right))
        }
        Expr::Between {
            negated,
            expr,
            low,
            high,
        } => {
            let kw = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
            format!("{} {kw} {} AND {}", format_expr(expr), format_expr(low), format_expr(high))
        }
        Expr::And(l, r) => format!("{} AND {}", format_expr(l), format_expr(r)),
        Expr::Or(l, r) => format!("{} OR {}", format_expr(l), format_expr(r)),
        Expr::Not(e) => format!("NOT {}", format_expr(e)),
    }
}

fn format_arith_op(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "+",
        ArithOp::Sub => "-",
        ArithOp::Mul => "*",
        ArithOp::Div => "/",
    }
}

fn format_compare_op(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "=",
        CompareOp::Neq => "<>",
        CompareOp::Lt => "<",
        CompareOp::Leq => "<=",
        CompareOp::Gt => ">",
        CompareOp::Geq => ">=",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::Grammar;
    use crate::parser::token::{Token, TokenKind};

    // Minimal whitespace/punctuation tokenizer, good enough to re-lex this
    // module's own canonical output for the round-trip test below. It is
    // scaffolding for that one test, not an implementation of the external
    // lexer contract the grammar otherwise assumes.
    fn lex(src: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let chars: Vec<char> = src.chars().collect();
        let mut i = 0;
        let (line, mut col) = (1usize, 1usize);
        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                i += 1;
                col += 1;
                continue;
            }
            let start_col = col;
            if c == '\'' {
                let mut j = i + 1;
                while j < chars.len() && chars[j] != '\'' {
                    j += 1;
                }
                let text: String = chars[i + 1..j].iter().collect();
                tokens.push(Token::new(TokenKind::StringSingleQuoted, &text, line, start_col));
                col += j - i + 1;
                i = j + 1;
                continue;
            }
            if c.is_ascii_digit() {
                let mut j = i;
                while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                    j += 1;
                }
                let text: String = chars[i..j].iter().collect();
                tokens.push(Token::new(TokenKind::UnsignedNumval, &text, line, start_col));
                col += j - i;
                i = j;
                continue;
            }
            if c.is_alphabetic() || c == '_' {
                let mut j = i;
                while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                    j += 1;
                }
                let text: String = chars[i..j].iter().collect();
                let kind = keyword_kind(&text).unwrap_or(TokenKind::Name);
                tokens.push(Token::new(kind, &text, line, start_col));
                col += j - i;
                i = j;
                continue;
            }
            let (kind, len) = match (c, chars.get(i + 1)) {
                ('<', Some('>')) => (TokenKind::Neq, 2),
                ('<', Some('=')) => (TokenKind::Leq, 2),
                ('>', Some('=')) => (TokenKind::Geq, 2),
                ('<', _) => (TokenKind::Lt, 1),
                ('>', _) => (TokenKind::Gt, 1),
                ('=', _) => (TokenKind::Eq, 1),
                (',', _) => (TokenKind::Comma, 1),
                ('(', _) => (TokenKind::LeftParen, 1),
                (')', _) => (TokenKind::RightParen, 1),
                ('.', _) => (TokenKind::Dot, 1),
                ('*', _) => (TokenKind::Star, 1),
                ('+', _) => (TokenKind::Plus, 1),
                ('-', _) => (TokenKind::Minus, 1),
                ('/', _) => (TokenKind::Slash, 1),
                (';', _) => (TokenKind::Semicolon, 1),
                _ => (TokenKind::LexError, 1),
            };
            let text: String = chars[i..i + len].iter().collect();
            tokens.push(Token::new(kind, &text, line, start_col));
            col += len;
            i += len;
        }
        tokens.push(Token::new(TokenKind::Eof, "", line, col));
        tokens
    }

    fn keyword_kind(word: &str) -> Option<TokenKind> {
        Some(match word.to_ascii_uppercase().as_str() {
            "SELECT" => TokenKind::Select,
            "FROM" => TokenKind::From,
            "WHERE" => TokenKind::Where,
            "GROUP" => TokenKind::Group,
            "BY" => TokenKind::By,
            "HAVING" => TokenKind::Having,
            "ORDER" => TokenKind::Order,
            "LIMIT" => TokenKind::Limit,
            "ASC" => TokenKind::Asc,
            "DESC" => TokenKind::Desc,
            "AS" => TokenKind::As,
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "BETWEEN" => TokenKind::Between,
            "NULL" => TokenKind::Null,
            "TRUE" => TokenKind::True,
            "FALSE" => TokenKind::False,
            "INSERT" => TokenKind::Insert,
            "INTO" => TokenKind::Into,
            "VALUES" => TokenKind::Values,
            "CREATE" => TokenKind::Create,
            "TABLE" => TokenKind::Table,
            "DROP" => TokenKind::Drop,
            "UPDATE" => TokenKind::Update,
            "SET" => TokenKind::Set,
            "DELETE" => TokenKind::Delete,
            "INTEGER" => TokenKind::Integer,
            "DOUBLE" => TokenKind::Double,
            "INTERVAL" => TokenKind::Interval,
            _ => return None,
        })
    }

    #[test]
    fn select_round_trips_through_reparse() {
        // SELECT name, count(id) AS c FROM t WHERE id > 3 GROUP BY name
        // ORDER BY name DESC LIMIT 5
        let source = "SELECT name, count(id) AS c FROM t WHERE id > 3 GROUP BY name ORDER BY name DESC LIMIT 5;";
        let tokens = lex(source);
        let stmt = Grammar::new(&tokens).parse_statement().unwrap();
        let text = format_statement(&stmt);

        let reparsed_tokens = lex(&text);
        let reparsed = Grammar::new(&reparsed_tokens).parse_statement().unwrap();

        assert_eq!(stmt, reparsed);
    }

    #[test]
    fn insert_with_interval_round_trips() {
        let stmt = Statement::Insert(InsertStatement {
            table: "t".to_string(),
            values: vec![Literal::Interval(IntervalLiteral::DatetimeInterval(
                "1 day".to_string(),
            ))],
        });
        let text = format_statement(&stmt);
        let tokens = lex(&text);
        let reparsed = Grammar::new(&tokens).parse_statement().unwrap();
        assert_eq!(stmt, reparsed);
    }
}
