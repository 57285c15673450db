// Terminal vocabulary and the token stream contract the lexer must honor:
// `(kind, lexeme, line, column)`, with no semantic analysis performed
// upstream of the grammar.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals and identifiers.
    Name,
    StringSingleQuoted,
    UnsignedNumval,

    // Statement keywords.
    Quit,
    Create,
    Drop,
    Table,
    Insert,
    Into,
    Values,
    Copy,
    From,
    With,
    Update,
    Set,
    Delete,
    Select,

    // Clause keywords.
    As,
    Where,
    Group,
    By,
    Having,
    Order,
    Limit,
    Asc,
    Desc,

    // Predicate / expression keywords.
    And,
    Or,
    Not,
    Between,
    Is,
    Like,
    Null,
    True,
    False,
    Interval,
    Datetime,
    Yearmonth,

    // Types.
    Bigint,
    Integer,
    Smallint,
    Long,
    Float,
    Double,
    Real,
    Decimal,
    Date,
    Timestamp,
    Character,
    Varchar,

    // Unsupported-but-recognized keywords (parsed to the point of
    // recognition, then rejected with a targeted diagnostic).
    Alter,
    Index,
    Unique,
    Primary,
    Foreign,
    Key,
    Check,
    Default,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Join,
    On,
    All,
    Distinct,
    References,
    Constraint,

    Delimiter,
    EscapeStrings,

    // Punctuation and operators.
    Semicolon,
    Comma,
    LeftParen,
    RightParen,
    Dot,
    Star,
    Plus,
    Minus,
    Slash,
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,

    Eof,
    LexError,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}
