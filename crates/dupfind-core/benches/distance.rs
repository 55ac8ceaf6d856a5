use criterion::{Criterion, criterion_group, criterion_main};
use dupfind_core::apted::{AptedCosts, TreeDistance};
use dupfind_core::kind::SyntaxKind;
use dupfind_core::tree::SyntaxNode;
use std::hint::black_box;

fn ident(name: &str) -> SyntaxNode {
    SyntaxNode::leaf(SyntaxKind::Identifier, name)
}

/// A method-shaped tree: guarded returns and invocations under one block.
fn synthetic_method(statements: usize, seed: &str) -> SyntaxNode {
    let body: Vec<SyntaxNode> = (0..statements)
        .map(|i| {
            SyntaxNode::new(
                SyntaxKind::IfStatement,
                "",
                vec![
                    SyntaxNode::new(
                        SyntaxKind::GreaterThanExpression,
                        "",
                        vec![
                            ident(&format!("{seed}{i}")),
                            SyntaxNode::leaf(SyntaxKind::IntegerLiteral, "0"),
                        ],
                    ),
                    SyntaxNode::new(
                        SyntaxKind::ReturnStatement,
                        "",
                        vec![SyntaxNode::new(
                            SyntaxKind::InvocationExpression,
                            "",
                            vec![
                                ident("Process"),
                                SyntaxNode::new(
                                    SyntaxKind::ArgumentList,
                                    "",
                                    vec![ident(&format!("{seed}{i}"))],
                                ),
                            ],
                        )],
                    ),
                ],
            )
        })
        .collect();
    SyntaxNode::new(
        SyntaxKind::MethodDeclaration,
        "Bench",
        vec![SyntaxNode::new(SyntaxKind::Block, "", body)],
    )
}

fn bench_distance(c: &mut Criterion) {
    let small_a = synthetic_method(5, "x");
    let small_b = synthetic_method(5, "y");
    c.bench_function("distance_small_renamed", |b| {
        b.iter(|| {
            let mut engine = TreeDistance::new(AptedCosts::default());
            black_box(engine.distance(black_box(&small_a), black_box(&small_b)))
        })
    });

    let large_a = synthetic_method(40, "x");
    let large_b = synthetic_method(35, "y");
    c.bench_function("distance_large_unbalanced", |b| {
        b.iter(|| {
            let mut engine = TreeDistance::new(AptedCosts::default());
            black_box(engine.distance(black_box(&large_a), black_box(&large_b)))
        })
    });
}

criterion_group!(benches, bench_distance);
criterion_main!(benches);
