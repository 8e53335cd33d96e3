//! noema CLI: hypergraph knowledge store and inference engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use noema::atom::{AtomId, LinkKind, NodeKind};
use noema::config::NoemaConfig;
use noema::engine::Engine;
use noema::infer::{
    AbductiveInput, AnalogicalInput, AssertedRelation, BackwardInput, Dependency, ForwardInput,
    IntervalRelation, ProbFact, ProbabilisticInput, Strategy, StrategyInput, StrategyResult,
    TemporalInput, TimedFact,
};
use noema::rules::{Hypothesis, RuleSet};
use noema::truth::TruthValue;

#[derive(Parser)]
#[command(name = "noema", version, about = "Hypergraph knowledge store and inference engine")]
struct Cli {
    /// Path to a TOML config file with an [infer] section.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every inference strategy against a small built-in knowledge base.
    Demo,

    /// Load a knowledge base file and report what it contains.
    Load {
        /// Path to a JSON knowledge base file.
        file: PathBuf,
    },

    /// Match an s-expression pattern against a knowledge base.
    Match {
        /// Pattern text, e.g. '(Inheritance $x (Concept "Animal"))'.
        pattern: String,

        /// Knowledge base file to match against.
        #[arg(long)]
        kb: PathBuf,

        /// Maximum number of binding sets to return.
        #[arg(long, default_value = "10")]
        max_results: usize,
    },

    /// Run an inference strategy over a knowledge base.
    Infer {
        /// Strategy name: forward, backward, abductive, analogical,
        /// probabilistic, or temporal.
        strategy: String,

        /// Knowledge base file.
        #[arg(long)]
        kb: PathBuf,

        /// Goal pattern (backward chaining only).
        #[arg(long)]
        goal: Option<String>,
    },

    /// Show statistics for a knowledge base file.
    Info {
        /// Knowledge base file.
        file: PathBuf,
    },

    /// Load a knowledge base and write it back out, normalized.
    Export {
        /// Input knowledge base file.
        input: PathBuf,

        /// Output path.
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NoemaConfig::load(path)?,
        None => NoemaConfig::default(),
    };
    let engine = Engine::with_config(&config);

    match cli.command {
        Commands::Demo => demo(&engine)?,

        Commands::Load { file } => {
            let stats = engine.load_kb(&file)?;
            println!(
                "Loaded {} nodes and {} links from {}",
                stats.nodes,
                stats.links,
                file.display()
            );
        }

        Commands::Match {
            pattern,
            kb,
            max_results,
        } => {
            engine.load_kb(&kb)?;
            let bindings = engine.match_pattern(&pattern, max_results)?;
            if bindings.is_empty() {
                println!("No matches.");
            }
            for (i, set) in bindings.iter().enumerate() {
                let rendered: Vec<String> = set
                    .iter()
                    .map(|(var, id)| format!("${var} = {}", label(&engine, *id)))
                    .collect();
                println!("  {}. {}", i + 1, rendered.join(", "));
            }
        }

        Commands::Infer { strategy, kb, goal } => {
            let strategy = Engine::strategy_from_name(&strategy)?;
            engine.load_kb(&kb)?;
            let input = build_input(&engine, strategy, goal.as_deref())?;
            let result = engine.infer(&input)?;
            print_result(&engine, &result);
        }

        Commands::Info { file } => {
            let stats = engine.load_kb(&file)?;
            let store = engine.store();
            println!("Knowledge base: {}", file.display());
            println!("  atoms: {}", store.len());
            println!("  nodes: {}", stats.nodes);
            println!("  links: {}", stats.links);
        }

        Commands::Export { input, output } => {
            engine.load_kb(&input)?;
            engine.export_kb(&output)?;
            println!("Exported {} atoms to {}", engine.store().len(), output.display());
        }
    }

    Ok(())
}

/// Build a strategy input from a loaded knowledge base.
fn build_input(engine: &Engine, strategy: Strategy, goal: Option<&str>) -> Result<StrategyInput> {
    match strategy {
        Strategy::ForwardChaining => Ok(StrategyInput::Forward(ForwardInput {
            premises: engine.store().link_ids(),
            rules: RuleSet::builtin(),
        })),
        Strategy::BackwardChaining => {
            let Some(goal) = goal else {
                miette::bail!("backward chaining requires --goal");
            };
            Ok(StrategyInput::Backward(BackwardInput {
                goal: engine.parse_pattern(goal)?,
                rules: RuleSet::builtin(),
            }))
        }
        other => miette::bail!(
            "the {other} strategy needs structured input (hypotheses, domains, \
             dependencies, or intervals); use the library API"
        ),
    }
}

fn label(engine: &Engine, id: AtomId) -> String {
    match engine.get_atom(id) {
        Ok(atom) => match atom.name() {
            Some(name) => format!("\"{name}\""),
            None => format!("link {id}"),
        },
        Err(_) => id.to_string(),
    }
}

fn print_result(engine: &Engine, result: &StrategyResult) {
    match result {
        StrategyResult::Forward(r) => {
            println!("Forward chaining: {} conclusions in {} steps", r.conclusions.len(), r.steps);
            for c in &r.conclusions {
                let targets: Vec<String> = c.outgoing.iter().map(|id| label(engine, *id)).collect();
                println!(
                    "  ({} {}) confidence {:.3} via {} [step {}]",
                    c.kind,
                    targets.join(" "),
                    c.confidence,
                    c.rule,
                    c.step
                );
            }
            if r.bound_reached {
                println!("  (stopped on a bound)");
            }
        }
        StrategyResult::Backward(r) => {
            println!(
                "Backward chaining: goal {} (confidence {:.3})",
                if r.goal_proven { "PROVEN" } else { "not proven" },
                r.overall_confidence
            );
            for s in &r.subgoals {
                println!(
                    "  {}{} {} ({:.3})",
                    "  ".repeat(s.depth),
                    if s.proven { "+" } else { "-" },
                    s.goal,
                    s.confidence
                );
            }
        }
        StrategyResult::Abductive(r) => {
            println!(
                "Abduction: best explanation {}",
                r.best_explanation.as_deref().unwrap_or("(none)")
            );
            for h in &r.hypotheses {
                println!(
                    "  {} plausibility {:.3} (prior {:.2}, consistency {:.2})",
                    h.name, h.plausibility, h.prior, h.consistency
                );
            }
        }
        StrategyResult::Analogical(r) => {
            println!(
                "Analogy: {} mappings, structural similarity {:.3}",
                r.analogies.len(),
                r.structural_similarity
            );
            for m in &r.analogies {
                println!(
                    "  {} -> {} ({:.3})",
                    label(engine, m.source),
                    label(engine, m.target),
                    m.similarity
                );
            }
            for p in &r.predictions {
                let targets: Vec<String> = p.outgoing.iter().map(|id| label(engine, *id)).collect();
                println!("  predicts ({} {}) confidence {:.3}", p.kind, targets.join(" "), p.confidence);
            }
        }
        StrategyResult::Probabilistic(r) => {
            println!("Probabilistic: {} inferences in {} rounds", r.inferences.len(), r.rounds);
            for i in &r.inferences {
                println!(
                    "  {} p={:.3} (uncertainty {:.3})",
                    label(engine, i.atom),
                    i.probability,
                    i.uncertainty
                );
            }
        }
        StrategyResult::Temporal(r) => {
            println!(
                "Temporal: {} relations, {}",
                r.relations.len(),
                if r.is_consistent { "consistent" } else { "INCONSISTENT" }
            );
            for rel in &r.relations {
                println!(
                    "  {} {} {}",
                    label(engine, rel.a),
                    rel.relation,
                    label(engine, rel.b)
                );
            }
            for v in &r.violations {
                println!("  violation: {v}");
            }
            for w in &r.warnings {
                println!("  warning: {w}");
            }
        }
    }
}

/// Exercise every strategy against a small built-in knowledge base.
fn demo(engine: &Engine) -> Result<()> {
    let certain = TruthValue::CERTAIN;
    let strong = TruthValue::new(1.0, 0.9).into_diagnostic()?;

    // Taxonomy.
    let socrates = engine.add_concept("Socrates", certain)?;
    let human = engine.add_concept("Human", certain)?;
    let animal = engine.add_concept("Animal", certain)?;
    let l1 = engine.add_link(LinkKind::Inheritance, vec![socrates, human], strong)?;
    let l2 = engine.add_link(LinkKind::Inheritance, vec![human, animal], strong)?;

    println!("== forward chaining ==");
    let result = engine.infer(&StrategyInput::Forward(ForwardInput {
        premises: vec![l1, l2],
        rules: RuleSet::builtin(),
    }))?;
    print_result(engine, &result);

    println!("\n== backward chaining ==");
    let goal = engine.parse_pattern("(Inheritance (Concept \"Socrates\") (Concept \"Animal\"))")?;
    let result = engine.infer(&StrategyInput::Backward(BackwardInput {
        goal,
        rules: RuleSet::builtin(),
    }))?;
    print_result(engine, &result);

    println!("\n== abduction ==");
    let grass = engine.add_concept("grass", certain)?;
    let wet = engine.add_concept("wet", certain)?;
    engine.add_link(
        LinkKind::Inheritance,
        vec![grass, wet],
        TruthValue::new(1.0, 0.8).into_diagnostic()?,
    )?;
    let observation = engine.parse_pattern("(Inheritance (Concept \"grass\") (Concept \"wet\"))")?;
    let result = engine.infer(&StrategyInput::Abductive(AbductiveInput {
        observation: observation.clone(),
        hypotheses: vec![
            Hypothesis::new(
                "rain",
                observation.clone(),
                TruthValue::new(1.0, 0.9).into_diagnostic()?,
            ),
            Hypothesis::new(
                "sprinkler",
                observation,
                TruthValue::new(1.0, 0.4).into_diagnostic()?,
            ),
        ],
    }))?;
    print_result(engine, &result);

    println!("\n== analogy ==");
    let sun = engine.add_concept("sun", certain)?;
    let planet = engine.add_concept("planet", certain)?;
    let orbit = engine.add_link(LinkKind::Similarity, vec![planet, sun], strong)?;
    let nucleus = engine.add_concept("nucleus", certain)?;
    let electron = engine.add_concept("electron", certain)?;
    let params = engine.params().clone().with_threshold(0.5);
    let result = engine.infer_with(
        &params,
        &StrategyInput::Analogical(AnalogicalInput {
            source: vec![sun, planet, orbit],
            target: vec![nucleus, electron],
        }),
    )?;
    print_result(engine, &result);

    println!("\n== probabilistic ==");
    let rain = engine.add_concept("rain", certain)?;
    let wet_road = engine.add_concept("wet-road", certain)?;
    let slippery = engine.add_concept("slippery", certain)?;
    let result = engine.infer(&StrategyInput::Probabilistic(ProbabilisticInput {
        facts: vec![
            ProbFact { atom: rain, prior: Some(0.8) },
            ProbFact { atom: wet_road, prior: None },
            ProbFact { atom: slippery, prior: None },
        ],
        dependencies: vec![
            Dependency { premise: rain, conclusion: wet_road, conditional: 0.9 },
            Dependency { premise: wet_road, conclusion: slippery, conditional: 0.5 },
        ],
    }))?;
    print_result(engine, &result);

    println!("\n== temporal ==");
    let breakfast = engine.add_node(NodeKind::Concept, "breakfast", certain)?;
    let commute = engine.add_node(NodeKind::Concept, "commute", certain)?;
    let meeting = engine.add_node(NodeKind::Concept, "meeting", certain)?;
    let result = engine.infer(&StrategyInput::Temporal(TemporalInput {
        facts: vec![
            TimedFact { atom: breakfast, start: 0, duration: 30 },
            TimedFact { atom: commute, start: 30, duration: 45 },
            TimedFact { atom: meeting, start: 60, duration: 60 },
        ],
        asserted: vec![AssertedRelation {
            a: breakfast,
            b: meeting,
            relation: IntervalRelation::Before,
        }],
    }))?;
    print_result(engine, &result);

    Ok(())
}
