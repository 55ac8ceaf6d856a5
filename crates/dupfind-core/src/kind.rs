//! Syntactic kind taxonomy and category distances.
//!
//! Raw kinds are granular (e.g. `AddExpression` and `SubtractExpression` are
//! distinct) and partition into ~40 semantic categories. Rename costs between
//! different kinds are softened by the distance between their categories.

use std::sync::OnceLock;

/// Raw syntactic kind of a tree node.
///
/// The discriminant is the kind's numeric code, used by fingerprint hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // Literals
    IntegerLiteral,
    RealLiteral,
    StringLiteral,
    VerbatimStringLiteral,
    InterpolatedStringExpression,
    CharacterLiteral,
    TrueLiteral,
    FalseLiteral,
    NullLiteral,

    // Identifiers and type tokens
    Identifier,
    QualifiedName,
    GenericName,
    ThisExpression,
    BaseExpression,
    PredefinedType,

    // Arithmetic
    AddExpression,
    SubtractExpression,
    MultiplyExpression,
    DivideExpression,
    ModuloExpression,
    UnaryMinusExpression,
    UnaryPlusExpression,
    PreIncrementExpression,
    PreDecrementExpression,
    PostIncrementExpression,
    PostDecrementExpression,

    // Logical
    LogicalAndExpression,
    LogicalOrExpression,
    CoalesceExpression,
    LogicalNotExpression,

    // Bitwise
    BitwiseAndExpression,
    BitwiseOrExpression,
    ExclusiveOrExpression,
    BitwiseNotExpression,
    LeftShiftExpression,
    RightShiftExpression,
    UnsignedRightShiftExpression,

    // Comparison
    EqualsExpression,
    NotEqualsExpression,
    LessThanExpression,
    LessThanOrEqualExpression,
    GreaterThanExpression,
    GreaterThanOrEqualExpression,
    IsExpression,
    AsExpression,
    IsPatternExpression,

    // Assignment
    SimpleAssignmentExpression,
    AddAssignmentExpression,
    SubtractAssignmentExpression,
    MultiplyAssignmentExpression,
    DivideAssignmentExpression,
    ModuloAssignmentExpression,
    AndAssignmentExpression,
    OrAssignmentExpression,
    ExclusiveOrAssignmentExpression,
    LeftShiftAssignmentExpression,
    RightShiftAssignmentExpression,
    CoalesceAssignmentExpression,

    // Control flow
    ForStatement,
    WhileStatement,
    DoStatement,
    ForEachStatement,
    IfStatement,
    ConditionalExpression,
    SwitchStatement,
    SwitchExpression,
    ElseClause,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    YieldStatement,
    GotoStatement,
    TryStatement,
    CatchClause,
    FinallyClause,
    ThrowStatement,
    ThrowExpression,

    // Access and calls
    InvocationExpression,
    MemberAccessExpression,
    ConditionalAccessExpression,
    MemberBindingExpression,
    ElementAccessExpression,
    ElementBindingExpression,

    // Creation
    ObjectCreationExpression,
    ImplicitObjectCreationExpression,
    AnonymousObjectCreationExpression,
    ArrayCreationExpression,
    ImplicitArrayCreationExpression,
    StackAllocArrayCreationExpression,
    CollectionExpression,

    // Type operations
    CastExpression,
    TypeOfExpression,
    SizeOfExpression,
    DefaultExpression,
    CheckedExpression,

    // Declarations
    MethodDeclaration,
    ConstructorDeclaration,
    LocalFunctionStatement,
    AccessorDeclaration,
    LocalDeclarationStatement,
    VariableDeclaration,
    VariableDeclarator,
    Parameter,
    LambdaExpression,
    AnonymousMethodExpression,

    // Structure
    Block,
    ArgumentList,
    Argument,
    ParameterList,
    TypeArgumentList,
    ExpressionStatement,
    ParenthesizedExpression,
    EqualsValueClause,
    InitializerExpression,
    ArrowExpressionClause,
    Interpolation,
    SwitchSection,
    SwitchExpressionArm,
    CaseSwitchLabel,
    DefaultSwitchLabel,
    UsingStatement,
    LockStatement,
    AwaitExpression,
    RangeExpression,
    TupleExpression,
    ArrayType,
    NullableType,
    EmptyStatement,

    Unknown,
}

impl SyntaxKind {
    /// Numeric code of this kind (its discriminant).
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Semantic category this kind belongs to.
    pub fn category(self) -> Category {
        use SyntaxKind::*;
        match self {
            IntegerLiteral | RealLiteral => Category::NumericLiteral,
            StringLiteral | VerbatimStringLiteral | InterpolatedStringExpression => {
                Category::StringLiteral
            }
            CharacterLiteral => Category::CharLiteral,
            TrueLiteral | FalseLiteral => Category::BoolLiteral,
            NullLiteral => Category::NullLiteral,

            Identifier | PredefinedType => Category::SimpleIdentifier,
            QualifiedName => Category::QualifiedIdentifier,
            GenericName => Category::GenericIdentifier,
            ThisExpression | BaseExpression => Category::ThisBaseIdentifier,

            AddExpression | SubtractExpression => Category::AdditiveOp,
            MultiplyExpression | DivideExpression | ModuloExpression => {
                Category::MultiplicativeOp
            }
            UnaryMinusExpression | UnaryPlusExpression => Category::UnaryArithmeticOp,
            PreIncrementExpression | PreDecrementExpression | PostIncrementExpression
            | PostDecrementExpression => Category::IncrementOp,

            LogicalAndExpression | LogicalOrExpression | CoalesceExpression => {
                Category::BinaryLogicalOp
            }
            LogicalNotExpression => Category::UnaryLogicalOp,

            BitwiseAndExpression | BitwiseOrExpression | ExclusiveOrExpression => {
                Category::BinaryBitwiseOp
            }
            BitwiseNotExpression => Category::UnaryBitwiseOp,
            LeftShiftExpression | RightShiftExpression | UnsignedRightShiftExpression => {
                Category::ShiftOp
            }

            EqualsExpression | NotEqualsExpression => Category::EqualityOp,
            LessThanExpression | LessThanOrEqualExpression | GreaterThanExpression
            | GreaterThanOrEqualExpression => Category::RelationalOp,
            IsExpression | AsExpression | IsPatternExpression => Category::TypeCheckOp,

            SimpleAssignmentExpression => Category::SimpleAssignment,
            AddAssignmentExpression
            | SubtractAssignmentExpression
            | MultiplyAssignmentExpression
            | DivideAssignmentExpression
            | ModuloAssignmentExpression
            | AndAssignmentExpression
            | OrAssignmentExpression
            | ExclusiveOrAssignmentExpression
            | LeftShiftAssignmentExpression
            | RightShiftAssignmentExpression
            | CoalesceAssignmentExpression => Category::CompoundAssignment,

            ForStatement | WhileStatement | DoStatement | ForEachStatement => {
                Category::LoopStatement
            }
            IfStatement | ConditionalExpression => Category::ConditionalStatement,
            SwitchStatement | SwitchExpression => Category::SwitchStatement,
            ElseClause => Category::ElseClause,
            BreakStatement | ContinueStatement => Category::LoopControl,
            ReturnStatement | YieldStatement => Category::ReturnStatement,
            GotoStatement => Category::GotoStatement,
            TryStatement | CatchClause | FinallyClause | ThrowStatement | ThrowExpression => {
                Category::ExceptionStatement
            }

            InvocationExpression => Category::MethodInvocation,
            MemberAccessExpression | ConditionalAccessExpression | MemberBindingExpression => {
                Category::PropertyAccess
            }
            ElementAccessExpression | ElementBindingExpression => Category::ElementAccess,

            ObjectCreationExpression
            | ImplicitObjectCreationExpression
            | AnonymousObjectCreationExpression => Category::ObjectCreation,
            ArrayCreationExpression
            | ImplicitArrayCreationExpression
            | StackAllocArrayCreationExpression
            | CollectionExpression => Category::ArrayCreation,

            CastExpression | TypeOfExpression | SizeOfExpression | DefaultExpression
            | CheckedExpression => Category::TypeOperation,

            MethodDeclaration
            | ConstructorDeclaration
            | LocalFunctionStatement
            | AccessorDeclaration
            | LocalDeclarationStatement
            | VariableDeclaration
            | VariableDeclarator
            | Parameter
            | LambdaExpression
            | AnonymousMethodExpression => Category::Declaration,

            Block | ArgumentList | Argument | ParameterList | TypeArgumentList
            | ExpressionStatement | ParenthesizedExpression | EqualsValueClause
            | InitializerExpression | ArrowExpressionClause | Interpolation | SwitchSection
            | SwitchExpressionArm | CaseSwitchLabel | DefaultSwitchLabel | UsingStatement
            | LockStatement | AwaitExpression | RangeExpression | TupleExpression | ArrayType
            | NullableType | EmptyStatement => Category::Structural,

            Unknown => Category::Unknown,
        }
    }
}

/// Semantic category of a raw kind. Used for soft rename costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Category {
    NumericLiteral,
    StringLiteral,
    CharLiteral,
    BoolLiteral,
    NullLiteral,
    SimpleIdentifier,
    QualifiedIdentifier,
    GenericIdentifier,
    ThisBaseIdentifier,
    AdditiveOp,
    MultiplicativeOp,
    UnaryArithmeticOp,
    IncrementOp,
    BinaryLogicalOp,
    UnaryLogicalOp,
    BinaryBitwiseOp,
    UnaryBitwiseOp,
    ShiftOp,
    EqualityOp,
    RelationalOp,
    TypeCheckOp,
    SimpleAssignment,
    CompoundAssignment,
    LoopStatement,
    ConditionalStatement,
    SwitchStatement,
    ElseClause,
    LoopControl,
    ReturnStatement,
    GotoStatement,
    ExceptionStatement,
    MethodInvocation,
    PropertyAccess,
    ElementAccess,
    ObjectCreation,
    ArrayCreation,
    TypeOperation,
    Declaration,
    Structural,
    Unknown,
}

const CATEGORY_COUNT: usize = 40;
const TRIANGLE_LEN: usize = CATEGORY_COUNT * (CATEGORY_COUNT + 1) / 2;

/// Distance entries in hundredths. Pairs not listed here default to 1.0.
const DISTANCE_ENTRIES: &[(Category, Category, u8)] = &[
    // Literals
    (Category::StringLiteral, Category::CharLiteral, 10),
    (Category::BoolLiteral, Category::NullLiteral, 15),
    // Identifiers
    (Category::SimpleIdentifier, Category::QualifiedIdentifier, 5),
    (Category::SimpleIdentifier, Category::GenericIdentifier, 10),
    (Category::QualifiedIdentifier, Category::GenericIdentifier, 5),
    (Category::SimpleIdentifier, Category::ThisBaseIdentifier, 20),
    // Arithmetic
    (Category::AdditiveOp, Category::MultiplicativeOp, 10),
    (Category::AdditiveOp, Category::UnaryArithmeticOp, 15),
    (Category::AdditiveOp, Category::IncrementOp, 20),
    // Logical
    (Category::BinaryLogicalOp, Category::UnaryLogicalOp, 10),
    // Bitwise
    (Category::BinaryBitwiseOp, Category::UnaryBitwiseOp, 10),
    (Category::BinaryBitwiseOp, Category::ShiftOp, 15),
    // Comparison
    (Category::EqualityOp, Category::RelationalOp, 10),
    (Category::EqualityOp, Category::TypeCheckOp, 20),
    // Assignment
    (Category::SimpleAssignment, Category::CompoundAssignment, 10),
    // Control flow
    (Category::LoopStatement, Category::ConditionalStatement, 15),
    (Category::ConditionalStatement, Category::SwitchStatement, 10),
    (Category::ConditionalStatement, Category::ElseClause, 5),
    (Category::LoopControl, Category::ReturnStatement, 10),
    // Access
    (Category::MethodInvocation, Category::PropertyAccess, 10),
    (Category::PropertyAccess, Category::ElementAccess, 5),
    // Creation
    (Category::ObjectCreation, Category::ArrayCreation, 15),
    // Cross-category representatives
    (Category::NumericLiteral, Category::SimpleIdentifier, 40),
    (Category::SimpleIdentifier, Category::MethodInvocation, 30),
    (Category::AdditiveOp, Category::Declaration, 70),
    (Category::LoopStatement, Category::Declaration, 60),
    (Category::NumericLiteral, Category::Declaration, 80),
    (Category::MethodInvocation, Category::ObjectCreation, 25),
    (Category::TypeOperation, Category::Declaration, 40),
];

fn pair_index(a: Category, b: Category) -> usize {
    let (lo, hi) = if (a as usize) <= (b as usize) {
        (a as usize, b as usize)
    } else {
        (b as usize, a as usize)
    };
    hi * (hi + 1) / 2 + lo
}

fn distance_table() -> &'static [u8; TRIANGLE_LEN] {
    static TABLE: OnceLock<[u8; TRIANGLE_LEN]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [100u8; TRIANGLE_LEN];
        for i in 0..CATEGORY_COUNT {
            // Diagonal: d(a, a) = 0
            table[i * (i + 1) / 2 + i] = 0;
        }
        for &(a, b, d) in DISTANCE_ENTRIES {
            table[pair_index(a, b)] = d;
        }
        table
    })
}

/// Symmetric category distance in `[0, 1]`, with `d(a, a) = 0` and a default
/// of 1.0 for unlisted pairs.
pub fn category_distance(a: Category, b: Category) -> f64 {
    f64::from(distance_table()[pair_index(a, b)]) * 0.01
}

/// Distance between raw kinds: 0 for identical kinds, otherwise the distance
/// between their categories.
pub fn kind_distance(k1: SyntaxKind, k2: SyntaxKind) -> f64 {
    if k1 == k2 {
        0.0
    } else {
        category_distance(k1.category(), k2.category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_kinds_have_zero_distance() {
        assert_eq!(
            kind_distance(SyntaxKind::AddExpression, SyntaxKind::AddExpression),
            0.0
        );
    }

    #[test]
    fn same_category_kinds_have_zero_category_distance() {
        // Add vs Subtract: different kinds, both AdditiveOp
        assert_eq!(
            kind_distance(SyntaxKind::AddExpression, SyntaxKind::SubtractExpression),
            0.0
        );
    }

    #[test]
    fn listed_pairs_match_contract() {
        assert!(
            (category_distance(Category::StringLiteral, Category::CharLiteral) - 0.10).abs()
                < 1e-9
        );
        assert!(
            (category_distance(Category::SimpleIdentifier, Category::QualifiedIdentifier)
                - 0.05)
                .abs()
                < 1e-9
        );
        assert!(
            (category_distance(Category::AdditiveOp, Category::IncrementOp) - 0.20).abs() < 1e-9
        );
        assert!(
            (category_distance(Category::NumericLiteral, Category::Declaration) - 0.80).abs()
                < 1e-9
        );
        assert!(
            (category_distance(Category::MethodInvocation, Category::ObjectCreation) - 0.25)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn distance_is_symmetric() {
        for &(a, b, _) in DISTANCE_ENTRIES {
            assert_eq!(category_distance(a, b), category_distance(b, a));
        }
    }

    #[test]
    fn unlisted_pairs_default_to_one() {
        assert_eq!(
            category_distance(Category::StringLiteral, Category::LoopStatement),
            1.0
        );
        assert_eq!(
            category_distance(Category::GotoStatement, Category::ArrayCreation),
            1.0
        );
    }

    #[test]
    fn diagonal_is_zero_for_all_categories() {
        assert_eq!(category_distance(Category::Unknown, Category::Unknown), 0.0);
        assert_eq!(
            category_distance(Category::Structural, Category::Structural),
            0.0
        );
    }
}
