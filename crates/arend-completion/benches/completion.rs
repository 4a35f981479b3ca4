// completion.rs - Benchmarks for keyword completion over built syntax trees
//
// Run with: cargo bench --bench completion
// Compare baselines: cargo bench --bench completion -- --baseline before

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use arend_completion::lsp::to_completion_items;
use arend_completion::position::PLACEHOLDER_IDENTIFIER;
use arend_completion::syntax::{NodeKind as N, SyntaxTree, TokenKind as T, TreeBuilder};
use arend_completion::{CompletionConfig, CompletionEngine};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn function_statement(b: &mut TreeBuilder, name: &str) {
    b.node(N::Statement, |b| {
        b.node(N::DefFunction, |b| {
            b.token(T::FunctionKw, "\\func")
                .token(T::Whitespace, " ")
                .node(N::DefIdentifier, |b| {
                    b.token(T::Id, name);
                })
                .token(T::Whitespace, " ")
                .node(N::FunctionBody, |b| {
                    b.token(T::FatArrow, "=>").token(T::Whitespace, " ");
                    b.node(N::NewExpr, |b| {
                        b.node(N::ArgumentAppExpr, |b| {
                            b.node(N::AtomFieldsAcc, |b| {
                                b.node(N::Atom, |b| {
                                    b.node(N::Literal, |b| {
                                        b.token(T::Number, "0");
                                    });
                                });
                            });
                        });
                    });
                });
        });
    });
}

/// `count` functions with the placeholder statement in the middle.
fn file_with_functions(count: usize) -> SyntaxTree {
    let mut b = TreeBuilder::new();
    b.node(N::File, |b| {
        for i in 0..count {
            if i == count / 2 {
                b.node(N::Statement, |b| {
                    b.node(N::Error, |b| {
                        b.token(T::Id, PLACEHOLDER_IDENTIFIER);
                    });
                });
                b.token(T::Whitespace, "\n");
            }
            function_statement(b, &format!("f{}", i));
            b.token(T::Whitespace, "\n");
        }
    });
    b.finish().expect("fixture tree is well formed")
}

/// A `\let` whose body nests `depth` tuples around the placeholder.
fn nested_let(depth: usize) -> SyntaxTree {
    fn nest(b: &mut TreeBuilder, remaining: usize) {
        if remaining == 0 {
            b.node(N::Error, |b| {
                b.token(T::Id, PLACEHOLDER_IDENTIFIER);
            });
            return;
        }
        b.node(N::Tuple, |b| {
            b.token(T::LParen, "(");
            nest(b, remaining - 1);
        });
    }

    let mut b = TreeBuilder::new();
    b.node(N::File, |b| {
        b.node(N::LetExpr, |b| {
            b.token(T::LetKw, "\\let").token(T::Whitespace, " ");
            nest(b, depth);
        });
    });
    b.finish().expect("fixture tree is well formed")
}

fn placeholder_offset(tree: &SyntaxTree) -> usize {
    tree.text()
        .find(PLACEHOLDER_IDENTIFIER)
        .expect("fixture contains the placeholder")
}

// ---------------------------------------------------------------------------
// Benchmark: Completion between declarations
// ---------------------------------------------------------------------------

fn bench_statement_completion(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_completion");
    group.sample_size(50);

    let engine = CompletionEngine::default();
    for count in [10usize, 100, 1000] {
        let tree = file_with_functions(count);
        let offset = placeholder_offset(&tree);
        group.bench_with_input(
            BenchmarkId::new("functions", count),
            &(&tree, offset),
            |b, &(tree, offset)| {
                b.iter(|| black_box(engine.complete(black_box(tree), black_box(offset), None)))
            },
        );
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Completion at depth
// ---------------------------------------------------------------------------

fn bench_nested_completion(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_completion");
    group.sample_size(50);

    let engine = CompletionEngine::default();
    for depth in [8usize, 64, 256] {
        let tree = nested_let(depth);
        let offset = placeholder_offset(&tree);
        group.bench_with_input(
            BenchmarkId::new("depth", depth),
            &(&tree, offset),
            |b, &(tree, offset)| {
                b.iter(|| black_box(engine.complete(black_box(tree), black_box(offset), None)))
            },
        );
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: LSP item conversion
// ---------------------------------------------------------------------------

fn bench_completion_items(c: &mut Criterion) {
    let tree = file_with_functions(100);
    let offset = placeholder_offset(&tree);
    let config = CompletionConfig::default();
    let candidates = CompletionEngine::new(config.clone()).complete(&tree, offset, None);

    c.bench_function("to_completion_items", |b| {
        b.iter(|| {
            black_box(to_completion_items(
                black_box(tree.text()),
                black_box(&candidates),
                &config,
            ))
        })
    });
}

criterion_group!(
    benches,
    bench_statement_completion,
    bench_nested_completion,
    bench_completion_items,
);
criterion_main!(benches);
