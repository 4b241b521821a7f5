//! The abstract syntax tree of SOF programs.
//!
//! SOF parses to a deliberately small tree: a program (or a code block) is an
//! ordered token list whose children are literal values, primitive
//! operations, or nested token lists. Nodes are immutable once parsed and
//! shared by reference between all invocations of the same code block.

use std::collections::HashMap;
use std::fmt;

pub mod span;

pub use span::Span;

use crate::value::Value;

/// One node of the AST.
#[derive(Debug, Clone)]
pub enum Node {
    /// A literal value, pushed unchanged when executed.
    Literal(Value, Span),
    /// A primitive operation keyword/symbol.
    PrimOp(PrimOp, Span),
    /// An ordered sequence of nodes: the top-level program or a code block
    /// body.
    List(Vec<Node>, Span),
}

impl Node {
    /// The source position this node was parsed from.
    pub fn span(&self) -> Span {
        match self {
            Node::Literal(_, span) | Node::PrimOp(_, span) | Node::List(_, span) => *span,
        }
    }

    /// The children of this node, if it is a token list.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::List(children, _) => children,
            _ => &[],
        }
    }
}

/// The fixed set of primitive operations.
///
/// Everything the engine can do that is not pushing a literal is one of
/// these; the parser recognizes them by exact keyword/symbol match before
/// trying any literal grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,
    /// `=`
    Equal,
    /// `/=`
    NotEqual,
    /// `and`
    And,
    /// `or`
    Or,
    /// `xor`
    Xor,
    /// `dup`
    Dup,
    /// `pop`
    Pop,
    /// `swap`
    Swap,
    /// `def`
    Def,
    /// `globaldef`
    GlobalDef,
    /// `if`
    If,
    /// `ifelse`
    IfElse,
    /// `while`
    While,
    /// `switch`
    Switch,
    /// `.`: single dereference-and-invoke.
    Call,
    /// `:`: double call.
    DoubleCall,
    /// `,`: object attribute access.
    Field,
    /// `;`: object method call.
    Method,
    /// `function`
    Function,
    /// `constructor`
    Constructor,
    /// `return`: return the popped value.
    Return,
    /// `return:0`: return without a value.
    ReturnNothing,
    /// `|`: pushes the curry pipe marker.
    CurryPipe,
    /// `curry`
    Curry,
    /// `write`
    Write,
    /// `writeln`
    WriteLn,
    /// `input`
    Input,
    /// `inputln`
    InputLn,
    /// `describe`
    Describe,
    /// `describes`
    DescribeS,
    /// `assert`
    Assert,
    /// `nativecall`
    NativeCall,
    /// `use`
    Use,
}

use PrimOp::*;

/// Keyword/symbol table of all primitive operations.
const KEYWORDS: &[(&str, PrimOp)] = &[
    ("+", Add),
    ("-", Sub),
    ("*", Mul),
    ("/", Div),
    ("%", Mod),
    ("<", Less),
    (">", Greater),
    ("<=", LessEq),
    (">=", GreaterEq),
    ("=", Equal),
    ("/=", NotEqual),
    ("and", And),
    ("or", Or),
    ("xor", Xor),
    ("dup", Dup),
    ("pop", Pop),
    ("swap", Swap),
    ("def", Def),
    ("globaldef", GlobalDef),
    ("if", If),
    ("ifelse", IfElse),
    ("while", While),
    ("switch", Switch),
    (".", Call),
    (":", DoubleCall),
    (",", Field),
    (";", Method),
    ("function", Function),
    ("constructor", Constructor),
    ("return", Return),
    ("return:0", ReturnNothing),
    ("|", CurryPipe),
    ("curry", Curry),
    ("write", Write),
    ("writeln", WriteLn),
    ("input", Input),
    ("inputln", InputLn),
    ("describe", Describe),
    ("describes", DescribeS),
    ("assert", Assert),
    ("nativecall", NativeCall),
    ("use", Use),
];

lazy_static! {
    /// Map from keyword/symbol to its primitive operation.
    static ref KEYWORD_TABLE: HashMap<&'static str, PrimOp> =
        KEYWORDS.iter().copied().collect();
}

impl PrimOp {
    /// Looks up a raw token in the keyword table.
    pub fn from_keyword(token: &str) -> Option<PrimOp> {
        KEYWORD_TABLE.get(token).copied()
    }

    /// The keyword/symbol this operation is written as.
    pub fn keyword(&self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, op)| op == self)
            .map(|(kw, _)| *kw)
            .unwrap_or("<unknown>")
    }
}

impl fmt::Display for PrimOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}
