// Recursive-descent implementation of the grammar: `statement ';' EOF` or
// `statement EOF`. Any parser architecture is fine as long as it accepts
// the same language; recursive descent reads closer to the language's own
// precedence table than a generated LALR(1) table would.

use crate::catalog::DataType;
use crate::parser::ast::*;
use crate::parser::diagnostics::{Diagnostic, Location};
use crate::parser::interval;
use crate::parser::token::{Token, TokenKind};

pub struct Grammar<'a> {
    tokens: &'a [Token],
    pos: usize,
}

type PResult<T> = Result<T, Diagnostic>;

impl<'a> Grammar<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_statement(&mut self) -> PResult<Statement> {
        let stmt = self.statement()?;
        self.expect_terminator()?;
        Ok(stmt)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn loc(&self) -> Location {
        Location {
            line: self.peek().line,
            column: self.peek().column,
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> PResult<Token> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(Diagnostic::UnexpectedToken {
                location: self.loc(),
                found: self.peek().lexeme.clone(),
                expected: expected.to_string(),
            })
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_terminator(&mut self) -> PResult<()> {
        if self.eat(TokenKind::Semicolon) {
            self.expect(TokenKind::Eof, "end of input after ';'")?;
        } else {
            self.expect(TokenKind::Eof, "';' or end of input")?;
        }
        Ok(())
    }

    fn not_supported(&self, feature: &str) -> Diagnostic {
        Diagnostic::NotSupported {
            location: self.loc(),
            feature: feature.to_string(),
        }
    }

    fn name(&mut self) -> PResult<String> {
        let tok = self.expect(TokenKind::Name, "a name")?;
        Ok(tok.lexeme)
    }

    // ---- statement dispatch ----

    fn statement(&mut self) -> PResult<Statement> {
        match self.peek_kind() {
            TokenKind::Quit => {
                self.advance();
                Ok(Statement::Quit)
            }
            TokenKind::Create => self.create_table(),
            TokenKind::Drop => self.drop_table(),
            TokenKind::Insert => self.insert(),
            TokenKind::Copy => self.copy_from(),
            TokenKind::Update => self.update(),
            TokenKind::Delete => self.delete(),
            TokenKind::Select => self.select().map(Statement::Select),
            TokenKind::Alter => Err(self.not_supported("ALTER")),
            _ => Err(Diagnostic::UnexpectedToken {
                location: self.loc(),
                found: self.peek().lexeme.clone(),
                expected: "a statement".to_string(),
            }),
        }
    }

    // ---- CREATE TABLE ----

    fn create_table(&mut self) -> PResult<Statement> {
        self.expect(TokenKind::Create, "CREATE")?;
        if self.at(TokenKind::Index) {
            return Err(self.not_supported("CREATE INDEX"));
        }
        self.expect(TokenKind::Table, "TABLE")?;
        let table = self.name()?;
        self.expect(TokenKind::LeftParen, "'('")?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.column_def()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(Statement::CreateTable(CreateTableStatement { table, columns }))
    }

    fn column_def(&mut self) -> PResult<ColumnDef> {
        let name = self.name()?;
        let data_type = self.data_type()?;
        // Column constraints (UNIQUE, PRIMARY KEY, FOREIGN KEY, CHECK,
        // DEFAULT) parse to the point of recognition then fail.
        if self.at(TokenKind::Unique) {
            return Err(self.not_supported("UNIQUE"));
        }
        if self.at(TokenKind::Primary) {
            return Err(self.not_supported("PRIMARY KEY"));
        }
        if self.at(TokenKind::Foreign) || self.at(TokenKind::References) {
            return Err(self.not_supported("FOREIGN KEY"));
        }
        if self.at(TokenKind::Check) {
            return Err(self.not_supported("CHECK"));
        }
        if self.at(TokenKind::Default) {
            return Err(self.not_supported("DEFAULT"));
        }
        Ok(ColumnDef { name, data_type })
    }

    fn data_type(&mut self) -> PResult<DataType> {
        let loc = self.loc();
        match self.peek_kind() {
            TokenKind::Bigint | TokenKind::Integer | TokenKind::Smallint | TokenKind::Long => {
                self.advance();
                Ok(DataType::Integer)
            }
            TokenKind::Float | TokenKind::Double | TokenKind::Real | TokenKind::Decimal => {
                self.advance();
                Ok(DataType::Double)
            }
            TokenKind::Date | TokenKind::Timestamp => {
                self.advance();
                Ok(DataType::DateTime)
            }
            TokenKind::Datetime => {
                self.advance();
                if self.eat(TokenKind::Interval) {
                    Ok(DataType::DateTimeInterval)
                } else {
                    Ok(DataType::DateTime)
                }
            }
            TokenKind::Yearmonth => {
                self.advance();
                self.expect(TokenKind::Interval, "INTERVAL")?;
                Ok(DataType::YearMonthInterval)
            }
            TokenKind::Character => {
                self.advance();
                self.expect(TokenKind::LeftParen, "'('")?;
                let n = self.unsigned_int_literal()?;
                self.expect(TokenKind::RightParen, "')'")?;
                if n < 1 {
                    return Err(Diagnostic::InvalidLiteral {
                        location: loc,
                        message: "Length for CHAR type must be at least 1".to_string(),
                    });
                }
                Ok(DataType::Char(n as usize))
            }
            TokenKind::Varchar => {
                self.advance();
                self.expect(TokenKind::LeftParen, "'('")?;
                let n = self.unsigned_int_literal()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(DataType::Varchar(n as usize))
            }
            _ => Err(Diagnostic::UnexpectedToken {
                location: loc,
                found: self.peek().lexeme.clone(),
                expected: "a type".to_string(),
            }),
        }
    }

    fn unsigned_int_literal(&mut self) -> PResult<i64> {
        let loc = self.loc();
        let tok = self.expect(TokenKind::UnsignedNumval, "an unsigned integer")?;
        tok.lexeme.parse::<i64>().map_err(|_| Diagnostic::InvalidLiteral {
            location: loc,
            message: format!("expected an integer, found '{}'", tok.lexeme),
        })
    }

    // ---- DROP TABLE ----

    fn drop_table(&mut self) -> PResult<Statement> {
        self.expect(TokenKind::Drop, "DROP")?;
        self.expect(TokenKind::Table, "TABLE")?;
        let table = self.name()?;
        Ok(Statement::DropTable(DropTableStatement { table }))
    }

    // ---- INSERT ----

    fn insert(&mut self) -> PResult<Statement> {
        self.expect(TokenKind::Insert, "INSERT")?;
        self.expect(TokenKind::Into, "INTO")?;
        let table = self.name()?;
        if self.at(TokenKind::LeftParen) {
            return Err(self.not_supported("column-list INSERT"));
        }
        self.expect(TokenKind::Values, "VALUES")?;
        self.expect(TokenKind::LeftParen, "'('")?;
        let mut values = Vec::new();
        loop {
            values.push(self.literal()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(Statement::Insert(InsertStatement { table, values }))
    }

    // ---- COPY FROM ----

    fn copy_from(&mut self) -> PResult<Statement> {
        self.expect(TokenKind::Copy, "COPY")?;
        let table = self.name()?;
        self.expect(TokenKind::From, "FROM")?;
        let path_tok = self.expect(TokenKind::StringSingleQuoted, "a path string")?;
        let mut options = CopyFromOptions {
            delimiter: None,
            escape_strings: None,
        };
        if self.eat(TokenKind::With) {
            self.expect(TokenKind::LeftParen, "'('")?;
            loop {
                self.copy_option(&mut options)?;
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RightParen, "')'")?;
        }
        Ok(Statement::CopyFrom(CopyFromStatement {
            table,
            path: path_tok.lexeme,
            options,
        }))
    }

    fn copy_option(&mut self, options: &mut CopyFromOptions) -> PResult<()> {
        match self.peek_kind() {
            TokenKind::Delimiter => {
                self.advance();
                let tok = self.expect(TokenKind::StringSingleQuoted, "a delimiter string")?;
                options.delimiter = Some(tok.lexeme);
                Ok(())
            }
            TokenKind::EscapeStrings => {
                self.advance();
                let value = match self.peek_kind() {
                    TokenKind::True => {
                        self.advance();
                        true
                    }
                    TokenKind::False => {
                        self.advance();
                        false
                    }
                    _ => {
                        return Err(Diagnostic::UnexpectedToken {
                            location: self.loc(),
                            found: self.peek().lexeme.clone(),
                            expected: "true or false".to_string(),
                        })
                    }
                };
                options.escape_strings = Some(value);
                Ok(())
            }
            _ => Err(self.not_supported("unknown COPY FROM option")),
        }
    }

    // ---- UPDATE / DELETE ----

    fn update(&mut self) -> PResult<Statement> {
        self.expect(TokenKind::Update, "UPDATE")?;
        let table = self.name()?;
        self.expect(TokenKind::Set, "SET")?;
        let mut assignments = Vec::new();
        loop {
            let column = self.name()?;
            self.expect(TokenKind::Eq, "'='")?;
            let value = self.expr()?;
            assignments.push(Assignment { column, value });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let filter = if self.eat(TokenKind::Where) {
            Some(self.predicate()?)
        } else {
            None
        };
        Ok(Statement::Update(UpdateStatement {
            table,
            assignments,
            filter,
        }))
    }

    fn delete(&mut self) -> PResult<Statement> {
        self.expect(TokenKind::Delete, "DELETE")?;
        self.expect(TokenKind::From, "FROM")?;
        let table = self.name()?;
        let filter = if self.eat(TokenKind::Where) {
            Some(self.predicate()?)
        } else {
            None
        };
        Ok(Statement::Delete(DeleteStatement { table, filter }))
    }

    // ---- SELECT ----

    fn select(&mut self) -> PResult<SelectStatement> {
        self.expect(TokenKind::Select, "SELECT")?;
        if self.at(TokenKind::All) {
            return Err(self.not_supported("ALL in selection"));
        }
        if self.at(TokenKind::Distinct) {
            return Err(self.not_supported("DISTINCT in selection"));
        }
        let selection = self.select_list()?;
        self.expect(TokenKind::From, "FROM")?;
        let from = self.table_ref_list()?;

        let filter = if self.eat(TokenKind::Where) {
            Some(self.predicate()?)
        } else {
            None
        };

        let group_by = if self.eat(TokenKind::Group) {
            self.expect(TokenKind::By, "BY")?;
            self.expr_list()?
        } else {
            Vec::new()
        };

        let having = if self.eat(TokenKind::Having) {
            Some(self.predicate()?)
        } else {
            None
        };

        let order_by = if self.eat(TokenKind::Order) {
            self.expect(TokenKind::By, "BY")?;
            self.order_item_list()?
        } else {
            Vec::new()
        };

        let limit = if self.eat(TokenKind::Limit) {
            let loc = self.loc();
            let n = self.unsigned_int_literal()?;
            if n <= 0 {
                return Err(Diagnostic::InvalidLiteral {
                    location: loc,
                    message: "LIMIT must be a positive integer".to_string(),
                });
            }
            Some(n as u64)
        } else {
            None
        };

        Ok(SelectStatement {
            selection,
            from,
            filter,
            group_by,
            having,
            order_by,
            limit,
        })
    }

    fn select_list(&mut self) -> PResult<Vec<SelectItem>> {
        if self.eat(TokenKind::Star) {
            return Ok(vec![SelectItem::Wildcard]);
        }
        let mut items = Vec::new();
        loop {
            let expr = self.expr()?;
            let alias = if self.eat(TokenKind::As) {
                Some(self.name()?)
            } else {
                None
            };
            items.push(SelectItem::Expr { expr, alias });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn table_ref_list(&mut self) -> PResult<Vec<TableRef>> {
        let mut refs = Vec::new();
        loop {
            refs.push(self.table_ref()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if matches!(
            self.peek_kind(),
            TokenKind::Join | TokenKind::Inner | TokenKind::Left | TokenKind::Right | TokenKind::Full | TokenKind::Outer
        ) {
            return Err(self.not_supported("explicit JOIN syntax"));
        }
        Ok(refs)
    }

    fn table_ref(&mut self) -> PResult<TableRef> {
        let name = self.name()?;
        let signature = if self.at(TokenKind::Name) {
            let alias = self.name()?;
            let columns = if self.eat(TokenKind::LeftParen) {
                let mut cols = Vec::new();
                loop {
                    cols.push(self.name()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RightParen, "')'")?;
                Some(cols)
            } else {
                None
            };
            Some(TableSignature { alias, columns })
        } else {
            None
        };
        Ok(TableRef { name, signature })
    }

    fn order_item_list(&mut self) -> PResult<Vec<OrderItem>> {
        let mut items = Vec::new();
        loop {
            let expr = self.expr()?;
            let order = if self.eat(TokenKind::Desc) {
                SortOrder::Desc
            } else {
                self.eat(TokenKind::Asc);
                SortOrder::Asc
            };
            items.push(OrderItem { expr, order });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn expr_list(&mut self) -> PResult<Vec<Expr>> {
        let mut exprs = Vec::new();
        loop {
            exprs.push(self.expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(exprs)
    }

    // ---- predicates: OR > AND > NOT > comparison/BETWEEN ----

    fn predicate(&mut self) -> PResult<Expr> {
        self.predicate_or()
    }

    fn predicate_or(&mut self) -> PResult<Expr> {
        let mut left = self.predicate_and()?;
        while self.eat(TokenKind::Or) {
            let right = self.predicate_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn predicate_and(&mut self) -> PResult<Expr> {
        let mut left = self.predicate_not()?;
        while self.eat(TokenKind::And) {
            let right = self.predicate_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn predicate_not(&mut self) -> PResult<Expr> {
        if self.eat(TokenKind::Not) {
            Ok(Expr::Not(Box::new(self.predicate_not()?)))
        } else {
            self.comparison()
        }
    }

    fn comparison(&mut self) -> PResult<Expr> {
        if self.at(TokenKind::Is) {
            return Err(self.not_supported("IS NULL"));
        }
        if self.at(TokenKind::Like) {
            return Err(self.not_supported("LIKE"));
        }
        let left = self.expr()?;

        if self.eat(TokenKind::Between) {
            let low = self.expr()?;
            self.expect(TokenKind::And, "AND")?;
            let high = self.expr()?;
            return Ok(Expr::Between {
                negated: false,
                expr: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
            });
        }
        if self.at(TokenKind::Not) && self.tokens.get(self.pos + 1).map(|t| t.kind) == Some(TokenKind::Between) {
            self.advance();
            self.advance();
            let low = self.expr()?;
            self.expect(TokenKind::And, "AND")?;
            let high = self.expr()?;
            return Ok(Expr::Between {
                negated: true,
                expr: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
            });
        }

        let op = match self.peek_kind() {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::Neq => CompareOp::Neq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Leq => CompareOp::Leq,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Geq => CompareOp::Geq,
            _ => return Ok(left),
        };
        self.advance();
        if self.at(TokenKind::Is) {
            return Err(self.not_supported("IS NULL"));
        }
        let right = self.expr()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    // ---- expressions: additive > multiplicative > unary > primary ----

    fn expr(&mut self) -> PResult<Expr> {
        self.additive()
    }

    fn additive(&mut self) -> PResult<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.multiplicative()?;
            left = Expr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            left = Expr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> PResult<Expr> {
        if self.eat(TokenKind::Minus) {
            // Negation binds to a numeric literal as part of the literal
            // itself, not a unary-minus node, when directly adjacent to one.
            if self.at(TokenKind::UnsignedNumval) {
                let loc = self.loc();
                let tok = self.advance();
                return Ok(Expr::Literal(parse_negated_numval(&tok.lexeme, loc)?));
            }
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op: ArithOp::Sub,
                operand: Box::new(operand),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> PResult<Expr> {
        match self.peek_kind() {
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Name => {
                let first = self.name()?;
                if self.eat(TokenKind::LeftParen) {
                    return self.function_call(first);
                }
                if self.eat(TokenKind::Dot) {
                    let column = self.name()?;
                    return Ok(Expr::Column {
                        table: Some(first),
                        name: column,
                    });
                }
                Ok(Expr::Column { table: None, name: first })
            }
            _ => self.literal().map(Expr::Literal),
        }
    }

    fn function_call(&mut self, name: String) -> PResult<Expr> {
        if self.eat(TokenKind::Star) {
            self.expect(TokenKind::RightParen, "')'")?;
            return Ok(Expr::FunctionCall {
                name,
                args: Vec::new(),
                star: true,
            });
        }
        let mut args = Vec::new();
        if !self.at(TokenKind::RightParen) {
            loop {
                args.push(self.expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(Expr::FunctionCall { name, args, star: false })
    }

    fn literal(&mut self) -> PResult<Literal> {
        let loc = self.loc();
        match self.peek_kind() {
            TokenKind::Null => {
                self.advance();
                Ok(Literal::Null)
            }
            TokenKind::UnsignedNumval => {
                let tok = self.advance();
                parse_numval(&tok.lexeme, loc)
            }
            TokenKind::StringSingleQuoted => {
                let tok = self.advance();
                Ok(Literal::String(tok.lexeme))
            }
            TokenKind::Interval => {
                self.advance();
                let tok = self.expect(TokenKind::StringSingleQuoted, "an interval string")?;
                Ok(Literal::Interval(interval::classify(&tok.lexeme)))
            }
            TokenKind::Bigint
            | TokenKind::Integer
            | TokenKind::Smallint
            | TokenKind::Long
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::Real
            | TokenKind::Decimal
            | TokenKind::Date
            | TokenKind::Datetime
            | TokenKind::Timestamp => {
                let data_type = self.data_type()?;
                let tok = self.expect(TokenKind::StringSingleQuoted, "a typed literal string")?;
                Ok(Literal::Typed {
                    data_type,
                    text: tok.lexeme,
                })
            }
            _ => Err(Diagnostic::UnexpectedToken {
                location: loc,
                found: self.peek().lexeme.clone(),
                expected: "a literal".to_string(),
            }),
        }
    }
}

fn parse_numval(lexeme: &str, loc: Location) -> PResult<Literal> {
    if lexeme.contains('.') || lexeme.contains('e') || lexeme.contains('E') {
        lexeme
            .parse::<f64>()
            .map(Literal::Double)
            .map_err(|_| invalid_numval(lexeme, loc))
    } else {
        lexeme
            .parse::<i64>()
            .map(Literal::Integer)
            .map_err(|_| invalid_numval(lexeme, loc))
    }
}

fn parse_negated_numval(lexeme: &str, loc: Location) -> PResult<Literal> {
    match parse_numval(lexeme, loc)? {
        Literal::Integer(n) => Ok(Literal::Integer(-n)),
        Literal::Double(n) => Ok(Literal::Double(-n)),
        other => Ok(other),
    }
}

fn invalid_numval(lexeme: &str, location: Location) -> Diagnostic {
    Diagnostic::InvalidLiteral {
        location,
        message: format!("invalid numeric literal '{}'", lexeme),
    }
}
