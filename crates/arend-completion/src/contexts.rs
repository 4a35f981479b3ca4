//
// contexts.rs
//
// Named grammar contexts and the structural conditions the completion
// rules use as guards. Everything here reads the tree only; a condition
// that cannot make sense of a malformed tree answers `false`.
//

use crate::engine::CompletionRequest;
use crate::pattern::Pattern;
use crate::pattern::Pattern::{AfterLeaf, Ancestors, And, ExprAt, Not, Or, Parent, SuperParent, TypeIs};
use crate::syntax::{Element, NodeId, NodeKind as N, SyntaxTree, TokenId, TokenKind as T};

// ---------------------------------------------------------------------------
// Named contexts
// ---------------------------------------------------------------------------

/// Positions where a fixity keyword may follow a definition keyword.
pub const PREC_CONTEXT: Pattern = Or(&[
    AfterLeaf(T::FunctionKw),
    AfterLeaf(T::LemmaKw),
    AfterLeaf(T::CoerceKw),
    AfterLeaf(T::DataKw),
    AfterLeaf(T::ClassKw),
    AfterLeaf(T::RecordKw),
    And(&[AfterLeaf(T::AsKw), SuperParent(2, N::NsId)]),
    // simple data constructor
    And(&[
        AfterLeaf(T::Pipe),
        Or(&[SuperParent(2, N::Constructor), SuperParent(2, N::DataBody)]),
    ]),
    // constructor with patterns
    And(&[
        AfterLeaf(T::FatArrow),
        Or(&[SuperParent(2, N::Constructor), SuperParent(2, N::ConstructorClause)]),
    ]),
    // class field
    And(&[
        AfterLeaf(T::Pipe),
        Or(&[SuperParent(2, N::ClassField), SuperParent(2, N::ClassStat)]),
    ]),
    // class field synonym
    And(&[AfterLeaf(T::FatArrow), SuperParent(2, N::ClassFieldSyn)]),
]);

pub const AS_CONTEXT: Pattern = And(&[
    SuperParent(2, N::NsId),
    Or(&[Parent(N::RefIdentifier), Parent(N::Error)]),
]);

pub const NS_CMD_CONTEXT: Pattern = Ancestors(&[N::Error, N::StatCmd]);

pub const STATEMENT_END_CONTEXT: Pattern = Or(&[
    Parent(N::Error),
    Parent(N::RefIdentifier),
    // empty class bodies
    Ancestors(&[N::DefIdentifier, N::FieldDefIdentifier]),
]);

pub const INSIDE_RETURN_EXPR_CONTEXT: Pattern = Or(&[
    Ancestors(&[
        N::RefIdentifier,
        N::LongName,
        N::Literal,
        N::Atom,
        N::AtomFieldsAcc,
        N::ReturnExpr,
    ]),
    Ancestors(&[N::Error, N::AtomFieldsAcc, N::ReturnExpr]),
]);

pub const WHERE_CONTEXT: Pattern = And(&[
    Or(&[
        STATEMENT_END_CONTEXT,
        Ancestors(&[N::DefIdentifier, N::IdentifierOrUnknown, N::NameTele]),
    ]),
    Not(&PREC_CONTEXT),
    Not(&INSIDE_RETURN_EXPR_CONTEXT),
    Not(&Or(&[
        AfterLeaf(T::Colon),
        AfterLeaf(T::TruncatedKw),
        AfterLeaf(T::FatArrow),
        AfterLeaf(T::WithKw),
        AfterLeaf(T::Arrow),
        AfterLeaf(T::InKw),
        AfterLeaf(T::InstanceKw),
        AfterLeaf(T::ExtendsKw),
        AfterLeaf(T::Dot),
        AfterLeaf(T::NewKw),
        AfterLeaf(T::CaseKw),
        AfterLeaf(T::LetKw),
        AfterLeaf(T::WhereKw),
        AfterLeaf(T::UseKw),
        AfterLeaf(T::Pipe),
        AfterLeaf(T::LevelKw),
    ])),
    // incomplete instance expressions
    Not(&Ancestors(&[N::Error, N::DefInstance])),
    Not(&Ancestors(&[
        N::DefIdentifier,
        N::IdentifierOrUnknown,
        N::NameTele,
        N::DefInstance,
    ])),
]);

pub const DATA_CONTEXT: Pattern = Ancestors(&[N::Error, N::DefData, N::Statement]);

pub const RETURN_CONTEXT: Pattern = Or(&[
    Ancestors(&[
        N::RefIdentifier,
        N::LongName,
        N::Literal,
        N::Atom,
        N::AtomFieldsAcc,
        N::ReturnExpr,
    ]),
    Ancestors(&[
        N::RefIdentifier,
        N::LongName,
        N::Literal,
        N::Atom,
        N::AtomFieldsAcc,
        N::ArgumentAppExpr,
        N::NewExpr,
        N::ReturnExpr,
    ]),
]);

pub const EXPRESSION_CONTEXT: Pattern = And(&[
    Or(&[
        Ancestors(&[N::RefIdentifier, N::LongName, N::Literal, N::Atom]),
        Or(&[Parent(N::FunctionBody), SuperParent(2, N::FunctionBody)]),
        And(&[
            Or(&[ExprAt(1), ExprAt(2)]),
            Not(&INSIDE_RETURN_EXPR_CONTEXT),
        ]),
        Ancestors(&[N::Error, N::Clause]),
        Ancestors(&[N::Error, N::TupleExpr]),
        And(&[AfterLeaf(T::LParen), Ancestors(&[N::Error, N::ReturnExpr])]),
        And(&[AfterLeaf(T::Colon), Ancestors(&[N::Error, N::DefFunction])]),
        And(&[AfterLeaf(T::Colon), Parent(N::DefClass)]),
        Or(&[Parent(N::ClassStat), Ancestors(&[N::Error, N::ClassStat])]),
        Ancestors(&[N::Error, N::InstanceBody, N::DefInstance]),
        And(&[
            TypeIs(&[T::InvalidKeyword]),
            AfterLeaf(T::Colon),
            Parent(N::NameTele),
        ]),
        And(&[
            Not(&AfterLeaf(T::LParen)),
            Not(&AfterLeaf(T::Id)),
            Ancestors(&[N::Error, N::FieldTele]),
        ]),
    ]),
    Not(&Or(&[AfterLeaf(T::Pipe), AfterLeaf(T::CowithKw)])),
]);

pub const CASE_CONTEXT: Pattern = Or(&[
    EXPRESSION_CONTEXT,
    Ancestors(&[N::Error, N::CaseArg, N::CaseExpr]),
]);

/// `\case` argument positions where a pairing keyword may go.
pub const CASE_KEYWORD_CONTEXT: Pattern = And(&[
    CASE_CONTEXT,
    Not(&Or(&[AfterLeaf(T::WithKw), AfterLeaf(T::CaseKw), AfterLeaf(T::Colon)])),
]);

pub const FIELD_CONTEXT: Pattern = Ancestors(&[N::FieldAcc, N::AtomFieldsAcc]);

pub const TELE_CONTEXT: Pattern = Or(&[
    And(&[
        Ancestors(&[N::Error, N::TypeTele]),
        Or(&[
            SuperParent(3, N::ClassField),
            SuperParent(3, N::Constructor),
            SuperParent(3, N::DefData),
            SuperParent(3, N::PiExpr),
            SuperParent(3, N::SigmaExpr),
        ]),
    ]),
    Ancestors(&[N::RefIdentifier, N::LongName, N::Literal, N::TypeTele]),
]);

pub const FIRST_TYPE_TELE_CONTEXT: Pattern = And(&[
    AfterLeaf(T::Id),
    Parent(N::Error),
    Or(&[
        SuperParent(2, N::DefData),
        SuperParent(2, N::ClassField),
        SuperParent(2, N::Constructor),
    ]),
]);

pub const TYPE_TELE_CONTEXT: Pattern = Or(&[TELE_CONTEXT, FIRST_TYPE_TELE_CONTEXT]);

pub const DATA_OR_EXPRESSION_CONTEXT: Pattern = Or(&[
    DATA_CONTEXT,
    EXPRESSION_CONTEXT,
    TELE_CONTEXT,
    FIRST_TYPE_TELE_CONTEXT,
]);

/// After the colon of a `\data` signature.
pub const DATA_SIGNATURE_CONTEXT: Pattern = And(&[DATA_CONTEXT, AfterLeaf(T::Colon)]);

pub const ARGUMENT_EXPRESSION: Pattern = Or(&[
    Ancestors(&[
        N::RefIdentifier,
        N::LongName,
        N::Literal,
        N::Atom,
        N::AtomFieldsAcc,
        N::AtomArgument,
    ]),
    Ancestors(&[N::Error, N::AtomFieldsAcc, N::ArgumentAppExpr]),
]);

pub const LPH_CONTEXT: Pattern = And(&[
    Parent(N::Error),
    Or(&[
        SuperParent(2, N::SetUniverseAppExpr),
        SuperParent(2, N::UniverseAppExpr),
        SuperParent(2, N::TruncatedUniverseAppExpr),
    ]),
]);

pub const LPH_LEVEL_CONTEXT: Pattern = Ancestors(&[N::Error, N::AtomLevelExpr]);

pub const ELIM_CONTEXT: Pattern = And(&[
    Not(&Or(&[
        AfterLeaf(T::DataKw),
        AfterLeaf(T::FunctionKw),
        AfterLeaf(T::LemmaKw),
        AfterLeaf(T::CoerceKw),
        AfterLeaf(T::TruncatedKw),
        AfterLeaf(T::Colon),
    ])),
    Or(&[
        EXPRESSION_CONTEXT,
        TELE_CONTEXT,
        Ancestors(&[
            N::DefIdentifier,
            N::IdentifierOrUnknown,
            N::NameTele,
            N::DefFunction,
        ]),
        Ancestors(&[N::Error, N::NameTele, N::DefFunction]),
        Ancestors(&[N::Error, N::DefData]),
    ]),
]);

pub const ARGUMENT_EXPRESSION_IN_BRACKETS: Pattern = Ancestors(&[
    N::RefIdentifier,
    N::LongName,
    N::Literal,
    N::Atom,
    N::AtomFieldsAcc,
    N::ArgumentAppExpr,
    N::NewExpr,
    N::TupleExpr,
    N::Tuple,
    N::Atom,
    N::AtomFieldsAcc,
    N::AtomArgument,
    N::ArgumentAppExpr,
]);

pub const CLASSIFYING_CONTEXT: Pattern = And(&[
    AfterLeaf(T::LParen),
    Or(&[
        Ancestors(&[
            N::DefIdentifier,
            N::FieldDefIdentifier,
            N::FieldTele,
            N::DefClass,
        ]),
        Ancestors(&[N::Error, N::FieldTele, N::DefClass]),
    ]),
]);

const LEVEL_CONTEXT_0: Pattern = Ancestors(&[
    N::RefIdentifier,
    N::LongName,
    N::Literal,
    N::Atom,
    N::AtomFieldsAcc,
    N::ArgumentAppExpr,
    N::NewExpr,
    N::ReturnExpr,
]);

pub const LEVEL_CONTEXT: Pattern = Or(&[
    And(&[
        AfterLeaf(T::Colon),
        Or(&[
            LEVEL_CONTEXT_0,
            Ancestors(&[N::Error, N::DefFunction]),
            Ancestors(&[N::ClassStat, N::DefClass]),
            Parent(N::DefClass),
        ]),
    ]),
    And(&[
        AfterLeaf(T::ReturnKw),
        Or(&[LEVEL_CONTEXT_0, Ancestors(&[N::Error, N::CaseExpr])]),
    ]),
]);

const NO_EXPRESSION_KWS_AFTER: Pattern = TypeIs(&[
    T::Set,
    T::PropKw,
    T::Universe,
    T::TruncatedUniverse,
    T::NewKw,
]);

const AFTER_ELIM_VARIABLE: Pattern = And(&[
    TypeIs(&[T::Id]),
    Ancestors(&[N::RefIdentifier, N::Elim]),
]);

// ---------------------------------------------------------------------------
// Pairing-word search
// ---------------------------------------------------------------------------

/// Walk up from `start` looking for an element satisfying `condition`.
///
/// The walk continues to the parent only while the current element ends
/// its parent, i.e. has no significant next sibling other than an error
/// node. Bounded by the tree depth.
pub fn pairing_word_search(
    tree: &SyntaxTree,
    start: Element,
    condition: impl Fn(&SyntaxTree, Element) -> bool,
) -> bool {
    let mut current = Some(start);
    while let Some(element) = current {
        if condition(tree, element) {
            return true;
        }
        if let Some(sibling) = tree.next_non_trivia_sibling(element) {
            if tree.element_node_kind(sibling) != Some(N::Error) {
                return false;
            }
        }
        current = tree.parent(element).map(Element::Node);
    }
    false
}

fn node_of_kind(tree: &SyntaxTree, element: Element, kind: N) -> Option<NodeId> {
    match element {
        Element::Node(id) if tree.node_kind(id) == kind => Some(id),
        _ => None,
    }
}

/// A `\let` still waiting for its `\in`.
pub fn is_open_let(tree: &SyntaxTree, element: Element) -> bool {
    node_of_kind(tree, element, N::LetExpr).is_some_and(|id| !tree.has_child_token(id, T::InKw))
}

/// A `\case` still waiting for its `\with`.
pub fn is_open_case(tree: &SyntaxTree, element: Element) -> bool {
    node_of_kind(tree, element, N::CaseExpr).is_some_and(|id| !tree.has_child_token(id, T::WithKw))
}

fn is_case_arg_without_as(tree: &SyntaxTree, element: Element) -> bool {
    node_of_kind(tree, element, N::CaseArg).is_some_and(|id| !tree.has_child_token(id, T::AsKw))
}

/// A case argument that may still take `\as`: either the argument itself,
/// or the element right before its `:` type annotation.
pub fn is_as_position(tree: &SyntaxTree, element: Element) -> bool {
    if is_case_arg_without_as(tree, element) {
        return true;
    }
    let before_colon = matches!(element, Element::Token(id) if tree.token_kind(id) == T::Colon)
        || tree
            .next_non_trivia_sibling(element)
            .and_then(|sibling| tree.element_token_kind(sibling))
            == Some(T::Colon);
    before_colon
        && tree
            .parent(element)
            .is_some_and(|parent| is_case_arg_without_as(tree, Element::Node(parent)))
}

/// The last argument of a `\case` that has no `\return` yet.
pub fn is_return_position(tree: &SyntaxTree, element: Element) -> bool {
    let Some(arg) = node_of_kind(tree, element, N::CaseArg) else {
        return false;
    };
    let Some(case) = tree.node_parent(arg).filter(|p| tree.node_kind(*p) == N::CaseExpr) else {
        return false;
    };
    tree.child_nodes_of_kind(case, N::CaseArg).last() == Some(arg)
        && !tree.has_child_token(case, T::ReturnKw)
}

// ---------------------------------------------------------------------------
// Expression conditions
// ---------------------------------------------------------------------------

/// Whether `prev` sits inside a bare (unparenthesized) telescope of a
/// `\Sigma` / `\Pi`, or is the binder keyword itself.
pub fn bare_sigma_or_pi(tree: &SyntaxTree, prev: TokenId) -> bool {
    if matches!(tree.token_kind(prev), T::PiKw | T::SigmaKw) {
        return true;
    }

    let mut tele = None;
    let mut binder = None;
    for node in tree.token_ancestors(prev) {
        let kind = tree.node_kind(node);
        if kind == N::TypeTele {
            tele = Some(node);
        }
        if kind.is_expr() {
            binder = Some(kind);
            break;
        }
    }

    match tele {
        Some(tele) if !tree.node_text(tele).starts_with('(') => {
            matches!(binder, Some(N::SigmaExpr) | Some(N::PiExpr))
        }
        _ => false,
    }
}

/// Keywords are allowed in a result type unless it carries `\level`,
/// belongs to an instance, or belongs to a `\cowith` function.
pub fn allowed_in_return(tree: &SyntaxTree, position: TokenId) -> bool {
    let Some(ret) = tree
        .token_ancestors(position)
        .find(|node| tree.node_kind(*node) == N::ReturnExpr)
    else {
        return true;
    };
    if tree.has_child_token(ret, T::LevelKw) {
        return false;
    }
    match tree.node_parent(ret) {
        Some(owner) if tree.node_kind(owner) == N::DefInstance => false,
        Some(owner) if tree.node_kind(owner) == N::DefFunction => !is_cowith(tree, owner),
        _ => true,
    }
}

pub fn is_cowith(tree: &SyntaxTree, function: NodeId) -> bool {
    tree.child_node(function, N::FunctionBody)
        .is_some_and(|body| tree.has_child_token(body, T::CowithKw))
}

/// Shared filter for expression keywords.
///
/// `allow_bare` admits positions inside a bare `\Sigma` / `\Pi` telescope,
/// `allow_argument` admits application-argument positions.
pub fn expression_filter(
    request: &CompletionRequest<'_>,
    allow_bare: bool,
    allow_argument: bool,
) -> bool {
    let tree = request.tree;
    let position = request.position();
    let prev = request.prev();

    if FIELD_CONTEXT.matches_opt(tree, prev) {
        return false;
    }
    if RETURN_CONTEXT.matches(tree, position) && !allowed_in_return(tree, position) {
        return false;
    }
    if let Some(prev) = prev {
        let kind = tree.token_kind(prev);
        // `}` closing the clauses of a `\case`
        if kind == T::RBrace && tree.node_kind(tree.token_parent(prev)) == N::CaseExpr {
            return false;
        }
        if matches!(kind, T::LamKw | T::LetKw | T::WithKw) {
            return false;
        }
    }
    if NO_EXPRESSION_KWS_AFTER.matches_opt(tree, prev) {
        return false;
    }
    if LPH_CONTEXT.matches(tree, position) || LPH_LEVEL_CONTEXT.matches(tree, position) {
        return false;
    }
    if AFTER_ELIM_VARIABLE.matches_opt(tree, prev) {
        return false;
    }
    if !allow_bare && prev.is_some_and(|prev| bare_sigma_or_pi(tree, prev)) {
        return false;
    }
    allow_argument || !ARGUMENT_EXPRESSION.matches(tree, position)
}

// ---------------------------------------------------------------------------
// \elim / \cowith
// ---------------------------------------------------------------------------

/// A parameter list is trivial when it is empty or consists of a single
/// telescope holding nothing but the completion position.
fn is_trivial_tele_list(tree: &SyntaxTree, teles: &[NodeId], position: TokenId) -> bool {
    match teles {
        [] => true,
        [tele] => tree.descendant_tokens(*tele).all(|token| {
            let kind = tree.token_kind(token);
            token == position || kind.is_trivia() || kind.is_punctuation()
        }),
        _ => false,
    }
}

/// Whether `\elim` / `\with` (or `\cowith` when `cowith` is set) fits the
/// definition the position belongs to.
///
/// `\elim` needs a function, data type or constructor with parameters and
/// no body form chosen yet. `\cowith` needs a function with a result type
/// that carries no `\level`.
pub fn elim_or_cowith(tree: &SyntaxTree, position: TokenId, cowith: bool) -> bool {
    let mut current = Some(Element::Token(position));

    while let Some(mut element) = current {
        // Right before a body: judge the definition owning it.
        let before_trivia = tree
            .next_sibling(element)
            .is_some_and(|sibling| tree.is_trivia(sibling));
        if before_trivia {
            if let Some(Element::Node(body)) = tree.next_non_trivia_sibling(element) {
                if matches!(tree.node_kind(body), N::FunctionBody | N::DataBody) {
                    if let Some(owner) = tree.node_parent(body) {
                        element = Element::Node(owner);
                    }
                }
            }
        }

        if let Element::Node(node) = element {
            match tree.node_kind(node) {
                N::DefFunction => return function_accepts(tree, node, position, cowith),
                N::DefData if !cowith => return data_accepts(tree, node, position),
                N::Constructor if !cowith && tree.child_node(node, N::Elim).is_none() => {
                    let teles: Vec<NodeId> = tree.child_nodes_of_kind(node, N::TypeTele).collect();
                    return !is_trivial_tele_list(tree, &teles, position);
                }
                N::Clause | N::CoClause => return false,
                _ => {}
            }
        }

        if tree.next_non_trivia_sibling(element).is_some() {
            return false;
        }
        current = tree.parent(element).map(Element::Node);
    }
    false
}

fn function_accepts(tree: &SyntaxTree, function: NodeId, position: TokenId, cowith: bool) -> bool {
    let body = tree.child_node(function, N::FunctionBody);
    let body_elim = body.and_then(|body| tree.child_node(body, N::Elim));

    let no_body_form = body.map_or(true, |body| {
        !tree.has_child_token(body, T::FatArrow)
            && body_elim.map_or(true, |elim| !tree.has_child_token(elim, T::ElimKw))
    });
    if !no_body_form {
        return false;
    }

    let shape_ok = if cowith {
        tree.child_node(function, N::ReturnExpr)
            .is_some_and(|ret| !tree.has_child_token(ret, T::LevelKw))
    } else {
        let teles: Vec<NodeId> = tree.child_nodes_of_kind(function, N::NameTele).collect();
        !is_trivial_tele_list(tree, &teles, position)
    };
    if !shape_ok {
        return false;
    }

    body.map_or(true, |body| {
        !tree.has_child_token(body, T::CowithKw)
            && body_elim.map_or(true, |elim| {
                !tree.has_child_token(elim, T::ElimKw) && !tree.has_child_token(elim, T::WithKw)
            })
    })
}

fn data_accepts(tree: &SyntaxTree, data: NodeId, position: TokenId) -> bool {
    let body_ok = tree.child_node(data, N::DataBody).map_or(true, |body| {
        tree.child_node(body, N::Elim)
            .map_or(true, |elim| !tree.has_child_token(elim, T::ElimKw))
            && tree.child_node(body, N::Constructor).is_none()
            && tree.child_node(body, N::ConstructorClause).is_none()
    });
    let teles: Vec<NodeId> = tree.child_nodes_of_kind(data, N::TypeTele).collect();
    body_ok && !is_trivial_tele_list(tree, &teles, position)
}

// ---------------------------------------------------------------------------
// Level arguments
// ---------------------------------------------------------------------------

/// An application whose head is a plain name, so level arguments apply.
pub fn is_literal_app(tree: &SyntaxTree, app: NodeId) -> bool {
    if tree.child_node(app, N::LongNameExpr).is_some() {
        return true;
    }
    tree.child_nodes(app)
        .next()
        .filter(|first| tree.node_kind(*first) == N::AtomFieldsAcc)
        .and_then(|acc| tree.child_node(acc, N::Atom))
        .and_then(|atom| tree.child_node(atom, N::Literal))
        .and_then(|literal| tree.child_node(literal, N::LongName))
        .is_some()
}

fn has_explicit_level_list(tree: &SyntaxTree, app: NodeId) -> bool {
    tree.child_node(app, N::LongNameExpr)
        .and_then(|name| tree.child_node(name, N::LevelsExpr))
        .is_some_and(|levels| tree.has_child_token(levels, T::LevelKw))
}

/// Whether the application around `position` is a literal application
/// with an explicit `\level` list.
pub fn explicit_level_list(tree: &SyntaxTree, position: TokenId) -> bool {
    let app = tree.token_parent(position);
    tree.node_kind(app) == N::ArgumentAppExpr
        && has_explicit_level_list(tree, app)
        && is_literal_app(tree, app)
}

/// Level-argument counting for literal applications.
///
/// `atom_index` picks which enclosing `AtomFieldsAcc` anchors the argument
/// (`None` anchors at the position's parent). Level atoms already supplied
/// are counted; the condition holds while fewer than `threshold` are
/// present and no ordinary argument precedes the anchor. With
/// `forbid_level_list`, an explicit `\levels` list also forbids.
pub fn level_argument_condition(
    tree: &SyntaxTree,
    position: TokenId,
    atom_index: Option<usize>,
    forbid_level_list: bool,
    threshold: usize,
) -> bool {
    let as_app = |node: Option<NodeId>| node.filter(|n| tree.node_kind(*n) == N::ArgumentAppExpr);

    let mut anchor = atom_index.and_then(|index| {
        tree.token_ancestors(position)
            .filter(|node| tree.node_kind(*node) == N::AtomFieldsAcc)
            .nth(index)
    });
    let mut app = anchor.and_then(|anchor| {
        let parent = tree.node_parent(anchor);
        let via_argument = parent
            .filter(|p| tree.node_kind(*p) == N::AtomArgument)
            .and_then(|p| as_app(tree.node_parent(p)));
        via_argument.or_else(|| as_app(parent))
    });

    if anchor.is_none() {
        let parent = tree.token_parent(position);
        app = as_app(tree.node_parent(parent));
        anchor = app.map(|_| parent);
    }
    if anchor.is_none() {
        app = as_app(Some(tree.token_parent(position)));
    }

    match (app, anchor) {
        (Some(app), Some(anchor)) if is_literal_app(tree, app) => {
            let name = tree.child_node(app, N::LongNameExpr);
            let mut counter = name.map_or(0, |name| {
                tree.child_nodes_of_kind(name, N::AtomOnlyLevelExpr).count()
            });
            let mut forbidden = false;
            if let Some(levels) = name.and_then(|name| tree.child_node(name, N::LevelsExpr)) {
                counter += tree.child_nodes_of_kind(levels, N::AtomLevelExpr).count();
                forbidden = forbid_level_list;
            }
            let anchor_parent = tree.node_parent(anchor);
            for child in tree.child_nodes(app) {
                if child == anchor || Some(child) == anchor_parent {
                    break;
                }
                if tree.node_kind(child) == N::AtomArgument {
                    forbidden = true;
                }
            }
            counter < threshold && !forbidden
        }
        (Some(app), _) => has_explicit_level_list(tree, app) && is_literal_app(tree, app),
        (None, _) => false,
    }
}

/// Level keywords right after a universe: `\Set` and `\n-Type` take one
/// level, `\Type` takes two.
pub fn universe_level_slots_left(tree: &SyntaxTree, position: TokenId) -> bool {
    let Some(universe) = tree.super_parent(Element::Token(position), 2) else {
        return false;
    };
    let supplied = tree.child_nodes_of_kind(universe, N::AtomLevelExpr).count();
    match tree.node_kind(universe) {
        N::SetUniverseAppExpr | N::TruncatedUniverseAppExpr => supplied == 0,
        _ => supplied <= 1,
    }
}

/// Inside `\max` / `\suc` level expressions.
pub fn inside_level_function(tree: &SyntaxTree, position: TokenId) -> bool {
    let parent = tree.token_parent(position);
    matches!(
        tree.first_child(parent).and_then(|first| tree.element_token_kind(first)),
        Some(T::MaxKw) | Some(T::SucKw)
    )
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// Whether the position sits in a class body (`inside_where == false`),
/// or in the `\where` block of a class or, with `data_allowed`, a data
/// type (`inside_where == true`).
pub fn class_or_data_position(
    tree: &SyntaxTree,
    position: TokenId,
    inside_where: bool,
    data_allowed: bool,
) -> bool {
    let mut found_where = false;
    for node in tree.token_ancestors(position) {
        let kind = tree.node_kind(node);
        if kind == N::Where {
            found_where = true;
        }
        if (data_allowed && kind == N::DefData) || kind == N::DefClass {
            return inside_where == found_where;
        }
        if kind.is_definition() && found_where {
            return false;
        }
    }
    false
}

/// The nearest group or class statement above `prev` has no `\where` yet.
pub fn enclosing_group_lacks_where(tree: &SyntaxTree, prev: TokenId) -> bool {
    for node in tree.token_ancestors(prev) {
        let kind = tree.node_kind(node);
        if kind.is_group() {
            return tree.child_node(node, N::Where).is_none();
        }
        if kind == N::ClassStat {
            return false;
        }
    }
    false
}

/// No `\where` block or class encloses `element` (inclusive).
pub fn outside_where_and_class(tree: &SyntaxTree, element: Element) -> bool {
    let own = tree.element_node_kind(element);
    !matches!(own, Some(N::Where) | Some(N::DefClass))
        && !tree
            .element_ancestors(element)
            .any(|node| matches!(tree.node_kind(node), N::Where | N::DefClass))
}

const EXTENDS_ANCHOR: Pattern = Or(&[
    And(&[
        TypeIs(&[T::Id]),
        Ancestors(&[N::DefIdentifier, N::DefClass]),
    ]),
    And(&[
        TypeIs(&[T::RParen]),
        Ancestors(&[N::FieldTele, N::DefClass]),
    ]),
]);

/// The class around the position has no `\extends` and the cursor follows
/// its name or one of its field telescopes.
pub fn extends_allowed(tree: &SyntaxTree, position: TokenId, prev: Option<TokenId>) -> bool {
    tree.enclosing(Element::Token(position), N::DefClass)
        .is_some_and(|class| {
            !tree.has_child_token(class, T::ExtendsKw) && EXTENDS_ANCHOR.matches_opt(tree, prev)
        })
}

/// No field of the class around the position is `\classifying`.
pub fn class_without_classifying_field(tree: &SyntaxTree, position: TokenId) -> bool {
    tree.enclosing(Element::Token(position), N::DefClass)
        .is_some_and(|class| {
            !tree
                .child_nodes_of_kind(class, N::FieldTele)
                .any(|tele| tree.has_child_token(tele, T::ClassifyingKw))
        })
}

/// `prev` is a number right after an escape marker, as in `\1`.
pub fn is_after_number(tree: &SyntaxTree, prev: Option<TokenId>) -> bool {
    let Some(prev) = prev else {
        return false;
    };
    tree.token_kind(prev) == T::Number
        && tree
            .prev_sibling(Element::Token(prev))
            .is_some_and(|sibling| tree.element_text(sibling) == "\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::PLACEHOLDER_IDENTIFIER;
    use crate::syntax::TreeBuilder;

    fn placeholder(tree: &SyntaxTree) -> TokenId {
        let offset = tree.text().find(PLACEHOLDER_IDENTIFIER).unwrap();
        tree.token_at_offset(offset).unwrap()
    }

    fn ref_expr(b: &mut TreeBuilder, name: &str) {
        b.node(N::NewExpr, |b| {
            b.node(N::ArgumentAppExpr, |b| {
                atom(b, name);
            });
        });
    }

    fn atom(b: &mut TreeBuilder, name: &str) {
        b.node(N::AtomFieldsAcc, |b| {
            b.node(N::Atom, |b| {
                b.node(N::Literal, |b| {
                    b.node(N::LongName, |b| {
                        b.node(N::RefIdentifier, |b| {
                            b.token(T::Id, name);
                        });
                    });
                });
            });
        });
    }

    /// `\case x <placeholder>` with an optional `\with {}` tail.
    fn case_tree(with_clauses: bool) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        b.node(N::File, |b| {
            b.node(N::CaseExpr, |b| {
                b.token(T::CaseKw, "\\case")
                    .token(T::Whitespace, " ")
                    .node(N::CaseArg, |b| {
                        ref_expr(b, "x");
                    })
                    .token(T::Whitespace, " ");
                b.node(N::Error, |b| {
                    b.token(T::Id, PLACEHOLDER_IDENTIFIER);
                });
                if with_clauses {
                    b.token(T::Whitespace, " ")
                        .token(T::WithKw, "\\with")
                        .token(T::Whitespace, " ")
                        .token(T::LBrace, "{")
                        .token(T::RBrace, "}");
                }
            });
        });
        b.finish().unwrap()
    }

    #[test]
    fn test_pairing_search_finds_open_case() {
        let tree = case_tree(false);
        let position = Element::Token(placeholder(&tree));
        assert!(pairing_word_search(&tree, position, is_open_case));
        assert!(!pairing_word_search(&tree, position, is_open_let));
    }

    #[test]
    fn test_pairing_search_rejects_closed_case() {
        let tree = case_tree(true);
        let position = Element::Token(placeholder(&tree));
        assert!(!pairing_word_search(&tree, position, is_open_case));
    }

    #[test]
    fn test_pairing_search_stops_before_following_sibling() {
        // \let y => <placeholder> z  : the let is open but `z` follows.
        let mut b = TreeBuilder::new();
        b.node(N::File, |b| {
            b.node(N::LetExpr, |b| {
                b.token(T::LetKw, "\\let")
                    .token(T::Whitespace, " ")
                    .node(N::LetClause, |b| {
                        b.token(T::Id, "y")
                            .token(T::Whitespace, " ")
                            .token(T::FatArrow, "=>")
                            .token(T::Whitespace, " ")
                            .node(N::Error, |b| {
                                b.token(T::Id, PLACEHOLDER_IDENTIFIER);
                            })
                            .token(T::Whitespace, " ")
                            .token(T::Id, "z");
                    });
            });
        });
        let tree = b.finish().unwrap();
        let position = Element::Token(placeholder(&tree));
        assert!(!pairing_word_search(&tree, position, is_open_let));
    }

    #[test]
    fn test_bare_sigma_detection() {
        // \Sigma A <placeholder>   vs   \Sigma (A) <placeholder>
        let build = |parenthesized: bool| {
            let mut b = TreeBuilder::new();
            b.node(N::File, |b| {
                b.node(N::SigmaExpr, |b| {
                    b.token(T::SigmaKw, "\\Sigma").token(T::Whitespace, " ");
                    b.node(N::TypeTele, |b| {
                        if parenthesized {
                            b.token(T::LParen, "(");
                        }
                        b.node(N::Literal, |b| {
                            b.node(N::LongName, |b| {
                                b.node(N::RefIdentifier, |b| {
                                    b.token(T::Id, "A");
                                });
                            });
                        });
                        if parenthesized {
                            b.token(T::RParen, ")");
                        }
                    });
                    b.token(T::Whitespace, " ").node(N::Error, |b| {
                        b.token(T::Id, PLACEHOLDER_IDENTIFIER);
                    });
                });
            });
            b.finish().unwrap()
        };

        let tree = build(false);
        let a = tree.token_at_offset("\\Sigma ".len()).unwrap();
        assert!(bare_sigma_or_pi(&tree, a));
        let sigma = tree.token_at_offset(0).unwrap();
        assert!(bare_sigma_or_pi(&tree, sigma));

        let tree = build(true);
        let a = tree.token_at_offset("\\Sigma (".len()).unwrap();
        assert!(!bare_sigma_or_pi(&tree, a));
    }

    /// `\func f <tele> : <ret> <placeholder>` where the placeholder is an
    /// error node at the end of the function.
    fn function_tree(params: &[&str], level_in_result: bool) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        b.node(N::File, |b| {
            b.node(N::Statement, |b| {
                b.node(N::DefFunction, |b| {
                    b.token(T::FunctionKw, "\\func")
                        .token(T::Whitespace, " ")
                        .node(N::DefIdentifier, |b| {
                            b.token(T::Id, "f");
                        });
                    for param in params {
                        b.token(T::Whitespace, " ").node(N::NameTele, |b| {
                            b.token(T::LParen, "(")
                                .node(N::IdentifierOrUnknown, |b| {
                                    b.node(N::DefIdentifier, |b| {
                                        b.token(T::Id, param);
                                    });
                                })
                                .token(T::Whitespace, " ")
                                .token(T::Colon, ":")
                                .token(T::Whitespace, " ");
                            ref_expr(b, "Nat");
                            b.token(T::RParen, ")");
                        });
                    }
                    b.token(T::Whitespace, " ")
                        .token(T::Colon, ":")
                        .token(T::Whitespace, " ")
                        .node(N::ReturnExpr, |b| {
                            atom(b, "Nat");
                            if level_in_result {
                                b.token(T::Whitespace, " ").token(T::LevelKw, "\\level");
                            }
                        })
                        .token(T::Whitespace, " ")
                        .node(N::Error, |b| {
                            b.token(T::Id, PLACEHOLDER_IDENTIFIER);
                        });
                });
            });
        });
        b.finish().unwrap()
    }

    #[test]
    fn test_elim_needs_parameters() {
        let tree = function_tree(&[], false);
        assert!(!elim_or_cowith(&tree, placeholder(&tree), false));
        let tree = function_tree(&["n"], false);
        assert!(elim_or_cowith(&tree, placeholder(&tree), false));
    }

    #[test]
    fn test_cowith_needs_levelless_result() {
        let tree = function_tree(&[], false);
        assert!(elim_or_cowith(&tree, placeholder(&tree), true));
        let tree = function_tree(&["n"], true);
        assert!(!elim_or_cowith(&tree, placeholder(&tree), true));
    }

    #[test]
    fn test_trivial_telescope_is_the_placeholder_alone() {
        let mut b = TreeBuilder::new();
        b.node(N::File, |b| {
            b.node(N::NameTele, |b| {
                b.token(T::LParen, "(")
                    .token(T::Id, PLACEHOLDER_IDENTIFIER)
                    .token(T::RParen, ")");
            })
            .node(N::NameTele, |b| {
                b.token(T::Id, "x");
            });
        });
        let tree = b.finish().unwrap();
        let position = placeholder(&tree);
        let teles: Vec<NodeId> = tree.child_nodes(tree.root()).collect();
        assert!(is_trivial_tele_list(&tree, &teles[..1], position));
        assert!(!is_trivial_tele_list(&tree, &teles[1..], position));
        assert!(!is_trivial_tele_list(&tree, &teles, position));
        assert!(is_trivial_tele_list(&tree, &[], position));
    }

    #[test]
    fn test_class_or_data_position() {
        // \class C { <placeholder> }
        let mut b = TreeBuilder::new();
        b.node(N::File, |b| {
            b.node(N::Statement, |b| {
                b.node(N::DefClass, |b| {
                    b.token(T::ClassKw, "\\class")
                        .token(T::Whitespace, " ")
                        .node(N::DefIdentifier, |b| {
                            b.token(T::Id, "C");
                        })
                        .token(T::Whitespace, " ")
                        .token(T::LBrace, "{")
                        .node(N::ClassStat, |b| {
                            b.node(N::Error, |b| {
                                b.token(T::Id, PLACEHOLDER_IDENTIFIER);
                            });
                        })
                        .token(T::RBrace, "}");
                });
            });
        });
        let tree = b.finish().unwrap();
        let position = placeholder(&tree);
        assert!(class_or_data_position(&tree, position, false, false));
        assert!(!class_or_data_position(&tree, position, true, true));
        assert!(class_without_classifying_field(&tree, position));
    }

    #[test]
    fn test_literal_app_level_counting() {
        // f \lp <placeholder>   vs   f x <placeholder>
        let build = |level_atoms: usize, ordinary_argument: bool| {
            let mut b = TreeBuilder::new();
            b.node(N::File, |b| {
                b.node(N::ArgumentAppExpr, |b| {
                    b.node(N::LongNameExpr, |b| {
                        b.node(N::LongName, |b| {
                            b.node(N::RefIdentifier, |b| {
                                b.token(T::Id, "f");
                            });
                        });
                        for _ in 0..level_atoms {
                            b.token(T::Whitespace, " ").node(N::AtomOnlyLevelExpr, |b| {
                                b.token(T::LpKw, "\\lp");
                            });
                        }
                    });
                    if ordinary_argument {
                        b.token(T::Whitespace, " ").node(N::AtomArgument, |b| {
                            atom(b, "x");
                        });
                    }
                    b.token(T::Whitespace, " ").node(N::Error, |b| {
                        b.token(T::Id, PLACEHOLDER_IDENTIFIER);
                    });
                });
            });
            b.finish().unwrap()
        };

        let tree = build(0, false);
        assert!(level_argument_condition(&tree, placeholder(&tree), None, false, 2));
        let tree = build(1, false);
        assert!(level_argument_condition(&tree, placeholder(&tree), None, false, 2));
        assert!(!level_argument_condition(&tree, placeholder(&tree), None, false, 1));
        let tree = build(2, false);
        assert!(!level_argument_condition(&tree, placeholder(&tree), None, false, 2));
        let tree = build(0, true);
        assert!(!level_argument_condition(&tree, placeholder(&tree), None, false, 2));
    }
}
