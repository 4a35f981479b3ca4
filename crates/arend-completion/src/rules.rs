//
// rules.rs
//
// The keyword rule table. Each rule is data: a context pattern evaluated on
// the position token, a guard, the keywords it offers and how they are
// inserted. The engine runs the table top to bottom.
//

use std::fmt;

use crate::contexts::*;
use crate::engine::CompletionRequest;
use crate::insertion::InsertAction;
use crate::keywords::*;
use crate::pattern::Pattern;
use crate::pattern::Pattern::{AfterLeaf, Ancestors, And, Not, Or, Parent, SuperParent};
use crate::prefix;
use crate::syntax::{Element, NodeId, NodeKind as N, SyntaxTree, TokenKind as T};

/// Default priority of keyword candidates.
pub const KEYWORD_PRIORITY: f64 = 0.0;

pub type GuardFn = fn(&CompletionRequest<'_>) -> bool;

/// Side condition checked after the context pattern matched.
#[derive(Clone, Copy)]
pub enum Guard {
    Always,
    When(GuardFn),
    /// The cursor sits at a statement boundary.
    Joint(JointOfStatements),
}

/// Parameters of the statement-boundary guard.
#[derive(Clone, Copy)]
pub struct JointOfStatements {
    pub extra: Option<GuardFn>,
    pub line_break_required: bool,
    pub allow_inside_braces: bool,
}

impl JointOfStatements {
    pub const DEFAULT: Self = Self {
        extra: None,
        line_break_required: true,
        allow_inside_braces: true,
    };

    pub fn accepts(&self, request: &CompletionRequest<'_>) -> bool {
        let ctx = &request.context;
        let left_ok = (ctx.left_statement.is_none() || (ctx.at_left_brace && self.allow_inside_braces))
            && !ctx.is_before_class_fields;
        let right_ok = ctx.right_statement.is_none() || (ctx.at_right_brace && !ctx.at_left_brace);

        (ctx.line_break_before_cursor || !self.line_break_required)
            && self.extra.map_or(true, |extra| extra(request))
            && (left_ok || right_ok || ctx.is_between_statements)
    }
}

impl fmt::Debug for JointOfStatements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JointOfStatements")
            .field("extra", &self.extra.is_some())
            .field("line_break_required", &self.line_break_required)
            .field("allow_inside_braces", &self.allow_inside_braces)
            .finish()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Always => f.write_str("Always"),
            Guard::When(_) => f.write_str("When(..)"),
            Guard::Joint(joint) => f.debug_tuple("Joint").field(joint).finish(),
        }
    }
}

impl Guard {
    pub fn accepts(&self, request: &CompletionRequest<'_>) -> bool {
        match self {
            Guard::Always => true,
            Guard::When(guard) => guard(request),
            Guard::Joint(joint) => joint.accepts(request),
        }
    }
}

/// Which prefix a rule matches its keywords against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixMode {
    /// The prefix typed before the cursor.
    Typed,
    /// No prefix: every keyword of the rule matches.
    Empty,
    /// The typed prefix without its `\<digits>-` head.
    NumberedUniverse,
}

#[derive(Debug, Clone, Copy)]
pub struct CandidateRule {
    pub name: &'static str,
    pub context: Pattern,
    pub keywords: &'static [&'static str],
    pub guard: Guard,
    pub action: InsertAction,
    pub prefix: PrefixMode,
    /// Presentation text replacing the keyword in the lookup list.
    pub display: Option<&'static str>,
    pub priority: f64,
}

impl CandidateRule {
    pub const fn new(
        name: &'static str,
        context: Pattern,
        keywords: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            context,
            keywords,
            guard: Guard::Always,
            action: InsertAction::Keyword,
            prefix: PrefixMode::Typed,
            display: None,
            priority: KEYWORD_PRIORITY,
        }
    }

    pub const fn when(self, guard: GuardFn) -> Self {
        Self {
            guard: Guard::When(guard),
            ..self
        }
    }

    pub const fn joint(self, joint: JointOfStatements) -> Self {
        Self {
            guard: Guard::Joint(joint),
            ..self
        }
    }

    pub const fn action(self, action: InsertAction) -> Self {
        Self { action, ..self }
    }

    /// Insert without a trailing space.
    pub const fn bare(self) -> Self {
        self.action(InsertAction::BareKeyword)
    }

    pub const fn prefix(self, prefix: PrefixMode) -> Self {
        Self { prefix, ..self }
    }

    pub const fn display(self, display: &'static str) -> Self {
        Self {
            display: Some(display),
            ..self
        }
    }

    pub fn applies(&self, request: &CompletionRequest<'_>) -> bool {
        self.context.matches(request.tree, request.position()) && self.guard.accepts(request)
    }

    pub fn prefix_for(&self, typed: &str) -> String {
        match self.prefix {
            PrefixMode::Typed => typed.to_string(),
            PrefixMode::Empty => String::new(),
            PrefixMode::NumberedUniverse => prefix::strip_universe_level(typed),
        }
    }
}

const fn joint_when(extra: GuardFn) -> JointOfStatements {
    JointOfStatements {
        extra: Some(extra),
        ..JointOfStatements::DEFAULT
    }
}

const N_TYPE_ACTION: InsertAction = InsertAction::Placeholder {
    at: 1,
    default_digit: '1',
};

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

fn super_parent_of_kind(request: &CompletionRequest<'_>, level: usize, kind: N) -> Option<NodeId> {
    request
        .tree
        .super_parent(Element::Token(request.position()), level)
        .filter(|node| request.tree.node_kind(*node) == kind)
}

/// `\level` of a `\use \level` function.
fn use_level_function(request: &CompletionRequest<'_>) -> bool {
    let tree = request.tree;
    request.prev().is_some_and(|prev| {
        let parent = tree.token_parent(prev);
        tree.node_kind(parent) == N::DefFunction && tree.has_child_token(parent, T::UseKw)
    })
}

const CLASS_FIELD_SYNONYM: Pattern = Or(&[Parent(N::ClassFieldSyn), SuperParent(2, N::ClassFieldSyn)]);

fn in_field_synonym(request: &CompletionRequest<'_>) -> bool {
    CLASS_FIELD_SYNONYM.matches(request.tree, request.position())
}

fn namespace_id_without_as(request: &CompletionRequest<'_>) -> bool {
    super_parent_of_kind(request, 2, N::NsId)
        .is_some_and(|ns| !request.tree.has_child_token(ns, T::AsKw))
}

/// Nothing of the command follows the cursor.
fn at_command_end(request: &CompletionRequest<'_>) -> bool {
    let tree = request.tree;
    tree.next_token(request.position())
        .map_or(true, |next| tree.node_kind(tree.token_parent(next)) == N::File)
}

fn command_lacks_using(tree: &SyntaxTree, cmd: NodeId) -> bool {
    tree.child_node(cmd, N::NsUsing)
        .map_or(true, |using| !tree.has_child_token(using, T::UsingKw))
}

fn command_lacks_hiding(tree: &SyntaxTree, cmd: NodeId) -> bool {
    !tree.has_child_token(cmd, T::HidingKw)
}

fn command_without_using(request: &CompletionRequest<'_>) -> bool {
    super_parent_of_kind(request, 2, N::StatCmd)
        .is_some_and(|cmd| command_lacks_using(request.tree, cmd))
}

fn command_without_using_and_hiding(request: &CompletionRequest<'_>) -> bool {
    super_parent_of_kind(request, 2, N::StatCmd).is_some_and(|cmd| {
        command_lacks_using(request.tree, cmd) && command_lacks_hiding(request.tree, cmd)
    })
}

fn using_list_without_hiding(request: &CompletionRequest<'_>) -> bool {
    super_parent_of_kind(request, 3, N::StatCmd)
        .is_some_and(|cmd| command_lacks_hiding(request.tree, cmd))
}

/// `\import` only between top-level statements.
fn import_allowed(request: &CompletionRequest<'_>) -> bool {
    let tree = request.tree;
    let ctx = &request.context;
    let chain_outside = |chain: &[Element]| {
        !chain
            .iter()
            .any(|element| matches!(tree.element_node_kind(*element), Some(N::Where) | Some(N::DefClass)))
    };

    ctx.left_statement
        .map_or(true, |stat| outside_where_and_class(tree, stat))
        && ctx
            .right_statement
            .map_or(true, |stat| outside_where_and_class(tree, stat))
        && (!ctx.at_left_brace || chain_outside(&ctx.ancestors_of_prev))
        && (!ctx.at_right_brace || chain_outside(&ctx.ancestors_of_next))
}

fn in_class_body(request: &CompletionRequest<'_>) -> bool {
    class_or_data_position(request.tree, request.position(), false, false)
}

fn in_class_or_data_where(request: &CompletionRequest<'_>) -> bool {
    class_or_data_position(request.tree, request.position(), true, true)
}

fn definition_without_where(request: &CompletionRequest<'_>) -> bool {
    request
        .prev()
        .is_some_and(|prev| enclosing_group_lacks_where(request.tree, prev))
}

fn extends_after_name(request: &CompletionRequest<'_>) -> bool {
    extends_allowed(request.tree, request.position(), request.prev())
}

fn extends_after_last_field_tele(request: &CompletionRequest<'_>) -> bool {
    let tree = request.tree;
    extends_after_name(request)
        && tree
            .super_parent(Element::Token(request.position()), 2)
            .and_then(|tele| tree.next_non_trivia_sibling(Element::Node(tele)))
            .and_then(|sibling| tree.element_node_kind(sibling))
            != Some(N::FieldTele)
}

fn expression_any(request: &CompletionRequest<'_>) -> bool {
    expression_filter(request, true, true)
}

fn expression_strict(request: &CompletionRequest<'_>) -> bool {
    expression_filter(request, false, false)
}

fn expression_argument(request: &CompletionRequest<'_>) -> bool {
    expression_filter(request, false, true)
}

fn after_universe_number(request: &CompletionRequest<'_>) -> bool {
    is_after_number(request.tree, request.prev())
}

fn typing_numbered_universe(request: &CompletionRequest<'_>) -> bool {
    prefix::is_numbered_universe(&request.prefix)
}

fn universe_level_slots(request: &CompletionRequest<'_>) -> bool {
    universe_level_slots_left(request.tree, request.position())
}

fn in_level_function(request: &CompletionRequest<'_>) -> bool {
    inside_level_function(request.tree, request.position())
}

fn open_let(request: &CompletionRequest<'_>) -> bool {
    pairing_word_search(request.tree, Element::Token(request.position()), is_open_let)
}

fn open_case(request: &CompletionRequest<'_>) -> bool {
    pairing_word_search(request.tree, Element::Token(request.position()), is_open_case)
}

fn case_argument_end(request: &CompletionRequest<'_>) -> bool {
    pairing_word_search(request.tree, Element::Token(request.position()), is_as_position)
}

fn last_case_argument(request: &CompletionRequest<'_>) -> bool {
    pairing_word_search(request.tree, Element::Token(request.position()), is_return_position)
}

fn elim_allowed(request: &CompletionRequest<'_>) -> bool {
    elim_or_cowith(request.tree, request.position(), false)
}

fn cowith_allowed(request: &CompletionRequest<'_>) -> bool {
    elim_or_cowith(request.tree, request.position(), true)
}

fn lp_lh_argument(request: &CompletionRequest<'_>) -> bool {
    level_argument_condition(request.tree, request.position(), Some(0), false, 2)
}

fn level_argument(request: &CompletionRequest<'_>) -> bool {
    level_argument_condition(request.tree, request.position(), Some(0), true, 1)
}

fn bracketed_level_argument(request: &CompletionRequest<'_>) -> bool {
    level_argument_condition(request.tree, request.position(), Some(1), false, 2)
}

fn level_argument_in_error(request: &CompletionRequest<'_>) -> bool {
    level_argument_condition(request.tree, request.position(), None, false, 2)
}

fn explicit_levels(request: &CompletionRequest<'_>) -> bool {
    explicit_level_list(request.tree, request.position())
}

fn classifying_allowed(request: &CompletionRequest<'_>) -> bool {
    class_without_classifying_field(request.tree, request.position())
}

fn level_in_return(request: &CompletionRequest<'_>) -> bool {
    allowed_in_return(request.tree, request.position())
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Every keyword rule, in the order candidates are collected.
pub static RULES: &[CandidateRule] = &[
    // Fixity
    CandidateRule::new("fixity", PREC_CONTEXT, FIXITY_KWS),
    CandidateRule::new("fixity_after_use_level", AfterLeaf(T::LevelKw), FIXITY_KWS)
        .when(use_level_function),
    CandidateRule::new("fixity_field_synonym", AfterLeaf(T::FatArrow), FIXITY_KWS)
        .when(in_field_synonym),
    // Namespace commands
    CandidateRule::new("namespace_as", AS_CONTEXT, AS_KWS).when(namespace_id_without_as),
    CandidateRule::new("namespace_using_hiding", NS_CMD_CONTEXT, HU_KWS).when(at_command_end),
    CandidateRule::new("namespace_using", NS_CMD_CONTEXT, USING_KWS).when(command_without_using),
    CandidateRule::new("namespace_hiding", NS_CMD_CONTEXT, HIDING_KWS)
        .when(command_without_using_and_hiding),
    CandidateRule::new(
        "namespace_hiding_after_using",
        Ancestors(&[N::Error, N::NsUsing, N::StatCmd]),
        HIDING_KWS,
    )
    .when(using_list_without_hiding),
    // Statements
    CandidateRule::new("statement", STATEMENT_END_CONTEXT, STATEMENT_KWS)
        .joint(JointOfStatements::DEFAULT),
    CandidateRule::new("truncated_data", STATEMENT_END_CONTEXT, TRUNCATED_KWS)
        .joint(JointOfStatements::DEFAULT)
        .action(InsertAction::Compound { follow: DATA })
        .display("\\truncated \\data"),
    CandidateRule::new("import", STATEMENT_END_CONTEXT, IMPORT_KWS).joint(joint_when(import_allowed)),
    CandidateRule::new("class_member", STATEMENT_END_CONTEXT, CLASS_MEMBER_KWS)
        .joint(joint_when(in_class_body)),
    CandidateRule::new("use", STATEMENT_END_CONTEXT, USE_KWS).joint(joint_when(in_class_or_data_where)),
    CandidateRule::new("use_kind", AfterLeaf(T::UseKw), COERCE_LEVEL_KWS),
    CandidateRule::new(
        "data_after_truncated",
        And(&[DATA_CONTEXT, AfterLeaf(T::TruncatedKw)]),
        DATA_KWS,
    ),
    CandidateRule::new("where", WHERE_CONTEXT, WHERE_KWS).joint(JointOfStatements {
        extra: Some(definition_without_where),
        line_break_required: false,
        allow_inside_braces: false,
    }),
    // Classes
    CandidateRule::new(
        "extends_after_name",
        And(&[Ancestors(&[N::Error, N::DefClass]), AfterLeaf(T::Id)]),
        EXTENDS_KWS,
    )
    .when(extends_after_name),
    CandidateRule::new(
        "extends_after_field_tele",
        Ancestors(&[N::Error, N::FieldTele, N::DefClass]),
        EXTENDS_KWS,
    )
    .when(extends_after_last_field_tele),
    // Universes
    CandidateRule::new("data_universe", DATA_SIGNATURE_CONTEXT, DATA_UNIVERSE_KWS),
    CandidateRule::new("expression_universe", EXPRESSION_CONTEXT, DATA_UNIVERSE_KWS)
        .when(expression_any),
    CandidateRule::new("telescope_universe", TYPE_TELE_CONTEXT, DATA_UNIVERSE_KWS),
    // Expressions
    CandidateRule::new("expression", EXPRESSION_CONTEXT, BASIC_EXPRESSION_KWS)
        .when(expression_strict),
    CandidateRule::new("new", EXPRESSION_CONTEXT, NEW_KWS).when(expression_argument),
    // Truncated universes
    CandidateRule::new("data_truncated_universe", DATA_SIGNATURE_CONTEXT, FAKE_NTYPE_KWS)
        .action(N_TYPE_ACTION),
    CandidateRule::new("expression_truncated_universe", EXPRESSION_CONTEXT, FAKE_NTYPE_KWS)
        .when(expression_any)
        .action(N_TYPE_ACTION),
    CandidateRule::new("telescope_truncated_universe", TYPE_TELE_CONTEXT, FAKE_NTYPE_KWS)
        .action(N_TYPE_ACTION),
    CandidateRule::new("universe_suffix", DATA_OR_EXPRESSION_CONTEXT, TYPE_SUFFIX_KWS)
        .when(after_universe_number)
        .prefix(PrefixMode::Empty),
    CandidateRule::new("universe_word", DATA_OR_EXPRESSION_CONTEXT, TYPE_WORD_KWS)
        .when(typing_numbered_universe)
        .prefix(PrefixMode::NumberedUniverse),
    // Universe levels
    CandidateRule::new("universe_levels", LPH_CONTEXT, LPH_KWS).when(universe_level_slots),
    CandidateRule::new("level_function_arguments", Parent(N::LevelExpr), LPH_KWS)
        .when(in_level_function),
    CandidateRule::new("level_expression", LPH_LEVEL_CONTEXT, LPH_LEVEL_KWS),
    // Pairing keywords
    CandidateRule::new(
        "let_in",
        And(&[EXPRESSION_CONTEXT, Not(&Or(&[AfterLeaf(T::InKw), AfterLeaf(T::LetKw)]))]),
        IN_KWS,
    )
    .when(open_let),
    CandidateRule::new("case_with", CASE_KEYWORD_CONTEXT, WITH_KWS)
        .when(open_case)
        .bare(),
    CandidateRule::new("case_as", CASE_KEYWORD_CONTEXT, AS_KWS).when(case_argument_end),
    CandidateRule::new("case_return", CASE_KEYWORD_CONTEXT, RETURN_KWS).when(last_case_argument),
    // Definition bodies
    CandidateRule::new("elim", ELIM_CONTEXT, ELIM_KWS).when(elim_allowed),
    CandidateRule::new("elim_with", ELIM_CONTEXT, WITH_KWS)
        .when(elim_allowed)
        .bare(),
    CandidateRule::new("cowith", ELIM_CONTEXT, COWITH_KWS)
        .when(cowith_allowed)
        .bare(),
    // Level arguments
    CandidateRule::new("argument_lp_lh", ARGUMENT_EXPRESSION, LPH_KWS).when(lp_lh_argument),
    CandidateRule::new("argument_level", ARGUMENT_EXPRESSION, LEVEL_KWS).when(level_argument),
    CandidateRule::new(
        "bracketed_level_argument",
        ARGUMENT_EXPRESSION_IN_BRACKETS,
        LPH_LEVEL_KWS,
    )
    .when(bracketed_level_argument),
    CandidateRule::new(
        "level_argument_in_error",
        Ancestors(&[N::Error, N::ArgumentAppExpr]),
        LPH_LEVEL_KWS,
    )
    .when(level_argument_in_error),
    CandidateRule::new("explicit_level_list", Parent(N::ArgumentAppExpr), LPH_LEVEL_KWS)
        .when(explicit_levels),
    // Misc
    CandidateRule::new("classifying", CLASSIFYING_CONTEXT, CLASSIFYING_KWS).when(classifying_allowed),
    CandidateRule::new("result_level", LEVEL_CONTEXT, LEVEL_KWS).when(level_in_return),
];
