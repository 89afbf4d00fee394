use relay_core::catalog::{Capability, Model, Provider};
use relay_core::config::RoutingConfig;
use relay_core::routing::strategies::{CapabilityFilterStrategy, LoadBalancingStrategy};
use relay_core::routing::{
    Candidate, Optimization, RoutingContext, RoutingError, Strategy, StrategyChain,
};
use relay_core::types::{ModelId, ProviderId};

fn make_candidate(provider: &str, model: &str, window: u64) -> Candidate {
    Candidate::new(
        Provider::new(provider, provider),
        Model::new(model, provider).with_context_window(window),
    )
}

fn priced(provider: &str, model: &str, input: f64, output: f64) -> Candidate {
    Candidate::new(
        Provider::new(provider, provider),
        Model::new(model, provider)
            .with_context_window(128_000)
            .with_costs(input, output),
    )
}

struct Award {
    name: &'static str,
    priority: i32,
    model: &'static str,
    points: f64,
}

impl Strategy for Award {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn score(&self, _ctx: &RoutingContext, candidates: &mut [Candidate]) {
        for c in candidates.iter_mut() {
            if c.model.id.as_str() == self.model {
                c.add_score(self.name, self.points, format!("{} likes {}", self.name, self.model));
            }
        }
    }
}

struct DropAll;

impl Strategy for DropAll {
    fn name(&self) -> &str {
        "drop_all"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn filter(&self, _ctx: &RoutingContext, _candidates: Vec<Candidate>) -> Vec<Candidate> {
        Vec::new()
    }
}

fn seeded_chain(seed: u64) -> StrategyChain {
    StrategyChain::seeded(&RoutingConfig::default(), seed)
}

#[test]
fn default_chain_runs_in_priority_order() {
    let chain = StrategyChain::default_chain(&RoutingConfig::default());
    assert_eq!(
        chain.names(),
        vec![
            "user_preference",
            "health_filter",
            "capability_filter",
            "context_window",
            "cost_optimization",
            "load_balancing",
        ]
    );
}

#[test]
fn add_keeps_chain_sorted_and_ties_stable() {
    let mut chain = seeded_chain(1);
    chain.add(Award { name: "first_75", priority: 75, model: "x", points: 1.0 });
    chain.add(Award { name: "second_75", priority: 75, model: "x", points: 1.0 });
    chain.add(Award { name: "top", priority: 1_000, model: "x", points: 1.0 });

    let names = chain.names();
    assert_eq!(names[0], "top");
    let first = names.iter().position(|n| *n == "first_75").unwrap();
    let second = names.iter().position(|n| *n == "second_75").unwrap();
    let capability = names.iter().position(|n| *n == "capability_filter").unwrap();
    let window = names.iter().position(|n| *n == "context_window").unwrap();
    assert!(capability < first && first < second && second < window);
}

#[test]
fn remove_by_name() {
    let mut chain = seeded_chain(1);
    assert!(chain.remove("load_balancing"));
    assert!(!chain.remove("load_balancing"));
    assert_eq!(chain.len(), 5);
    assert!(!chain.names().contains(&"load_balancing"));
}

#[test]
fn empty_input_is_no_candidates() {
    let err = seeded_chain(1)
        .execute(&RoutingContext::default(), Vec::new())
        .unwrap_err();
    assert_eq!(err, RoutingError::NoCandidates);
}

#[test]
fn strict_capability_filter_names_itself() {
    let ctx = RoutingContext {
        requires_vision: true,
        ..RoutingContext::default()
    };
    let candidates = vec![
        make_candidate("openai", "text-a", 128_000),
        make_candidate("anthropic", "text-b", 200_000),
    ];

    let err = seeded_chain(1).execute(&ctx, candidates).unwrap_err();
    assert_eq!(
        err,
        RoutingError::FilterExhausted {
            strategy: "capability_filter".to_string()
        }
    );
    assert_eq!(err.to_string(), "no candidates after capability_filter filtering");
}

#[test]
fn custom_emptying_filter_aborts_before_later_strategies() {
    let mut chain = StrategyChain::new();
    chain.add(DropAll);
    chain.add(Award { name: "late", priority: 1, model: "a", points: 1.0 });

    let err = chain
        .execute(&RoutingContext::default(), vec![make_candidate("p", "a", 8_000)])
        .unwrap_err();
    assert_eq!(
        err,
        RoutingError::FilterExhausted {
            strategy: "drop_all".to_string()
        }
    );
}

#[test]
fn pass_through_chain_returns_an_input_candidate() {
    let input = vec![
        make_candidate("p", "a", 8_000),
        make_candidate("p", "b", 8_000),
        make_candidate("q", "c", 8_000),
    ];
    let ids: Vec<ModelId> = input.iter().map(|c| c.model.id.clone()).collect();

    for seed in 0..32 {
        let mut chain = StrategyChain::new();
        chain.add(LoadBalancingStrategy::with_seed(0.1, seed));
        let decision = chain.execute(&RoutingContext::default(), input.clone()).unwrap();
        assert!(ids.contains(&decision.selected.model.id));
        assert_eq!(decision.considered, 3);
    }
}

#[test]
fn scores_accumulate_across_strategies() {
    let mut chain = StrategyChain::new();
    chain.add(Award { name: "alpha", priority: 20, model: "b", points: 2.0 });
    chain.add(Award { name: "beta", priority: 10, model: "b", points: 3.0 });
    chain.add(Award { name: "gamma", priority: 5, model: "a", points: 4.0 });

    let decision = chain
        .execute(
            &RoutingContext::default(),
            vec![make_candidate("p", "a", 8_000), make_candidate("p", "b", 8_000)],
        )
        .unwrap();

    assert_eq!(decision.selected.model.id.as_str(), "b");
    assert!((decision.score() - 5.0).abs() < 1e-12);
    assert_eq!(decision.score_breakdown.get("alpha"), Some(&2.0));
    assert_eq!(decision.score_breakdown.get("beta"), Some(&3.0));
    assert!(!decision.score_breakdown.contains_key("gamma"));
    assert_eq!(decision.reasons, vec!["alpha likes b", "beta likes b"]);
}

#[test]
fn exact_ties_keep_the_earliest_candidate() {
    let mut chain = StrategyChain::new();
    chain.add(CapabilityFilterStrategy);
    let decision = chain
        .execute(
            &RoutingContext::default(),
            vec![make_candidate("p", "first", 8_000), make_candidate("p", "second", 8_000)],
        )
        .unwrap();
    assert_eq!(decision.selected.model.id.as_str(), "first");
}

#[test]
fn preferred_model_wins() {
    let ctx = RoutingContext {
        preferred_models: vec![ModelId::new("small")],
        ..RoutingContext::default()
    };
    let candidates = vec![
        make_candidate("p", "huge", 1_000_000),
        make_candidate("p", "small", 16_000),
    ];
    let decision = seeded_chain(3).execute(&ctx, candidates).unwrap();
    assert_eq!(decision.selected.model.id.as_str(), "small");
    assert!(decision.score_breakdown.contains_key("user_preference"));
}

#[test]
fn larger_window_wins_without_other_signals() {
    let candidates = vec![
        make_candidate("p", "short", 8_000),
        make_candidate("p", "long", 128_000),
    ];
    for seed in 0..16 {
        let decision = seeded_chain(seed)
            .execute(&RoutingContext::default(), candidates.clone())
            .unwrap();
        assert_eq!(decision.selected.model.id.as_str(), "long");
    }
}

#[test]
fn cost_goal_picks_cheapest() {
    let ctx = RoutingContext {
        optimize: Optimization::Cost,
        ..RoutingContext::default()
    };
    let candidates = vec![
        priced("a", "premium", 0.03, 0.06),
        priced("b", "budget", 0.0005, 0.0015),
        priced("c", "mid", 0.003, 0.007),
    ];
    for seed in 0..16 {
        let decision = seeded_chain(seed).execute(&ctx, candidates.clone()).unwrap();
        assert_eq!(decision.selected.model.id.as_str(), "budget");
    }
}

#[test]
fn unhealthy_provider_is_skipped() {
    let mut ctx = RoutingContext::default();
    ctx.provider_health.insert(ProviderId::new("down"), false);
    let candidates = vec![
        make_candidate("down", "big", 1_000_000),
        make_candidate("up", "small", 16_000),
    ];
    let decision = seeded_chain(9).execute(&ctx, candidates).unwrap();
    assert_eq!(decision.selected.provider.id.as_str(), "up");
}

#[test]
fn capability_requirements_are_respected() {
    let ctx = RoutingContext {
        requires_tools: true,
        ..RoutingContext::default()
    };
    let tools = Candidate::new(
        Provider::new("p", "p"),
        Model::new("tools", "p")
            .with_context_window(8_000)
            .with_capabilities([Capability::Chat, Capability::Tools]),
    );
    let candidates = vec![make_candidate("p", "plain", 1_000_000), tools];
    let decision = seeded_chain(5).execute(&ctx, candidates).unwrap();
    assert_eq!(decision.selected.model.id.as_str(), "tools");
}

#[test]
fn same_seed_same_decision() {
    let candidates: Vec<Candidate> = (0..8)
        .map(|i| make_candidate("p", &format!("m{i}"), 32_000))
        .collect();
    let ctx = RoutingContext::default();

    let a = seeded_chain(77).execute(&ctx, candidates.clone()).unwrap();
    let b = seeded_chain(77).execute(&ctx, candidates).unwrap();
    assert_eq!(a.selected.model.id, b.selected.model.id);
    assert_eq!(a.score(), b.score());
}
