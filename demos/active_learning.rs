//! Active learning of a class query against a reference answer set
//!
//! Run with `RUST_LOG=info` to follow the rounds.

use sparql_lgg::prelude::*;
use sparql_lgg::tree::RDF_TYPE;
use std::sync::atomic::AtomicBool;

fn ex(name: &str) -> Term {
    Term::iri(format!("http://example.org/{}", name))
}

fn build_graph() -> InMemoryGraph {
    let mut graph = InMemoryGraph::new();
    let cities = ["berlin", "paris", "rome"];
    for i in 0..12 {
        let (person, class) = if i % 3 == 0 {
            (ex(&format!("robot{}", i)), ex("Robot"))
        } else {
            (ex(&format!("person{}", i)), ex("Scientist"))
        };
        graph.insert(Triple::new(person.clone(), RDF_TYPE, class));
        graph.insert(Triple::new(person.clone(), "http://example.org/livesIn", ex(cities[i % 3])));
        let age = Term::literal((20 + i).to_string());
        graph.insert(Triple::new(person, "http://example.org/age", age));
    }
    for city in cities {
        graph.insert(Triple::new(ex(city), RDF_TYPE, ex("City")));
    }
    graph
}

fn main() -> Result<()> {
    env_logger::init();
    println!("=== Active Learning of a SPARQL Query ===\n");

    let graph = build_graph();
    let oracle = ReferenceOracle::from_query(
        &graph,
        "SELECT ?s WHERE { ?s a <http://example.org/Scientist> . }",
    )?;
    println!("Target: {} scientists among {} statements\n", oracle.target().len(), graph.len());

    let config = LearnerConfig::for_evaluation();
    let mut learner = ActiveLearner::new(ex("person1"), &graph, oracle, config)?;

    let cancel = AtomicBool::new(false);
    let state = learner.run_until(&cancel)?;

    for report in learner.history() {
        println!(
            "round {:>2}: {:>2} answers, candidate {:?} -> {:?} (relaxation {:?}), {}",
            report.round,
            report.answer_count,
            report.candidate.as_ref().map(|t| t.to_string()),
            report.classification,
            report.relaxation_level,
            report.score,
        );
    }

    println!("\nFinal state: {:?} after {} rounds", state, learner.round());
    if let Some(query) = learner.current_query() {
        println!("\n{}", query);
    }

    let checkpoint = learner.checkpoint();
    println!("\nCheckpoint:\n{}", serde_json::to_string_pretty(&checkpoint)?);
    Ok(())
}
