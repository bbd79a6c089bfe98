//! End-to-end scenarios: tree building, generalization and the active-learning loop
//! over small in-memory graphs.

use sparql_lgg::prelude::*;
use sparql_lgg::tree::{OWL_THING, RDFS_LABEL, RDFS_SUBCLASS_OF, RDF_TYPE};

const DBO: &str = "http://dbpedia.org/ontology/";
const DBR: &str = "http://dbpedia.org/resource/";

fn dbo(name: &str) -> String {
    format!("{}{}", DBO, name)
}

fn dbr(name: &str) -> Term {
    Term::iri(format!("{}{}", DBR, name))
}

fn people_graph() -> InMemoryGraph {
    InMemoryGraph::from_triples([
        Triple::new(dbr("Albert_Einstein"), dbo("birthPlace"), dbr("Ulm")),
        Triple::new(dbr("Albert_Einstein"), RDF_TYPE, Term::iri(dbo("Person"))),
        Triple::new(
            dbr("Albert_Einstein"),
            RDFS_LABEL,
            Term::lang_literal("Albert Einstein", "en"),
        ),
        Triple::new(dbr("Johannes_Kepler"), dbo("birthPlace"), dbr("Ulm")),
        Triple::new(dbr("Johannes_Kepler"), RDF_TYPE, Term::iri(dbo("Person"))),
        Triple::new(dbr("Marie_Curie"), dbo("birthPlace"), dbr("Warsaw")),
        Triple::new(dbr("Marie_Curie"), RDF_TYPE, Term::iri(dbo("Person"))),
        Triple::new(dbr("Ulm"), dbo("locatedIn"), dbr("Germany")),
        Triple::new(dbr("Warsaw"), dbo("locatedIn"), dbr("Poland")),
        Triple::new(Term::iri(dbo("Person")), RDFS_SUBCLASS_OF, Term::iri(OWL_THING)),
        Triple::new(dbr("Ulm"), RDF_TYPE, Term::iri(dbo("City"))),
        Triple::new(dbr("Warsaw"), RDF_TYPE, Term::iri(dbo("City"))),
    ])
}

fn only_child(tree: &QueryTree, node: usize, edge: &EdgeLabel) -> usize {
    let children = tree.children_by_edge(node, edge);
    assert_eq!(children.len(), 1, "expected one {} child in\n{}", edge, tree.dump());
    children[0]
}

#[test]
fn test_lgg_of_two_people() {
    let graph = people_graph();
    let factory = QueryTreeFactory::new(2);
    let einstein = factory.fetch_and_build(&graph, &dbr("Albert_Einstein")).unwrap();
    let kepler = factory.fetch_and_build(&graph, &dbr("Johannes_Kepler")).unwrap();

    let lgg = einstein.lgg(&kepler);

    // Seeds differ, so the root is generalized
    assert_eq!(lgg.root_label(), &NodeLabel::Wildcard);

    // birthPlace -> locatedIn -> Germany survives with its labels
    let city = only_child(&lgg, ROOT, &EdgeLabel::property(dbo("birthPlace")));
    assert_eq!(lgg.label(city), &NodeLabel::Concrete(dbr("Ulm")));
    let country = only_child(&lgg, city, &EdgeLabel::property(dbo("locatedIn")));
    assert_eq!(lgg.label(country), &NodeLabel::Concrete(dbr("Germany")));

    // type -> Person -> subClassOf -> Thing survives
    let class = only_child(&lgg, ROOT, &EdgeLabel::Type);
    assert_eq!(lgg.label(class), &NodeLabel::iri(dbo("Person")));
    let thing = only_child(&lgg, class, &EdgeLabel::property(RDFS_SUBCLASS_OF));
    assert_eq!(lgg.label(thing), &NodeLabel::iri(OWL_THING));

    // The label only Einstein has is gone
    assert!(lgg
        .children_by_edge(ROOT, &EdgeLabel::property(RDFS_LABEL))
        .is_empty());
    assert!(lgg.provenance().is_none());

    let answers = graph.execute_pattern_query(&lgg.to_select_query(None)).unwrap();
    assert_eq!(answers, vec![dbr("Albert_Einstein"), dbr("Johannes_Kepler")]);
}

#[test]
fn test_three_way_lgg_widens_answers() {
    let graph = people_graph();
    let factory = QueryTreeFactory::new(2).with_predicate_filter([RDFS_LABEL]);
    let trees: Vec<QueryTree> = ["Albert_Einstein", "Johannes_Kepler", "Marie_Curie"]
        .iter()
        .map(|name| factory.fetch_and_build(&graph, &dbr(name)).unwrap())
        .collect();

    let lgg = lgg_all(&trees).unwrap();
    let city = only_child(&lgg, ROOT, &EdgeLabel::property(dbo("birthPlace")));
    assert!(lgg.label(city).is_wildcard());
    let country = only_child(&lgg, city, &EdgeLabel::property(dbo("locatedIn")));
    assert!(lgg.label(country).is_wildcard());

    let answers = graph.execute_pattern_query(&lgg.to_select_query(None)).unwrap();
    assert_eq!(answers.len(), 3);

    // Relaxing to the type edge alone keeps every person
    let typed = lgg.keep_only_type_edges();
    let typed_answers = graph.execute_pattern_query(&typed.to_select_query(None)).unwrap();
    assert_eq!(typed_answers, answers);
}

/// Members of class X share the type, everything else varies
fn synthetic_graph() -> InMemoryGraph {
    let ex = |name: &str| Term::iri(format!("http://example.org/{}", name));
    let mut triples = Vec::new();
    for i in 1..=5 {
        let member = ex(&format!("x{}", i));
        triples.push(Triple::new(member.clone(), RDF_TYPE, ex("X")));
        let color = if i % 2 == 0 { "red" } else { "blue" };
        triples.push(Triple::new(member.clone(), "http://example.org/color", ex(color)));
        triples.push(Triple::new(member, "http://example.org/size", Term::literal(i.to_string())));
    }
    for j in 1..=5 {
        let other = ex(&format!("y{}", j));
        triples.push(Triple::new(other.clone(), RDF_TYPE, ex("Y")));
        triples.push(Triple::new(other.clone(), "http://example.org/color", ex("red")));
        triples.push(Triple::new(other, "http://example.org/size", Term::literal(j.to_string())));
    }
    InMemoryGraph::from_triples(triples)
}

fn target(graph: &InMemoryGraph) -> ReferenceOracle {
    ReferenceOracle::from_query(
        graph,
        "SELECT ?s WHERE { ?s a <http://example.org/X> . }",
    )
    .unwrap()
}

#[test]
fn test_active_learning_converges_on_class() {
    let graph = synthetic_graph();
    let oracle = target(&graph);
    assert_eq!(oracle.target().len(), 5);

    let seed = Term::iri("http://example.org/x1");
    let mut learner =
        ActiveLearner::new(seed, &graph, oracle, LearnerConfig::for_evaluation()).unwrap();
    let state = learner.run().unwrap();

    assert_eq!(state, SessionState::Converged);
    // One type edge, one distinguishing statement to learn
    assert!(learner.round() <= 3, "took {} rounds", learner.round());

    let query = learner.current_query().unwrap();
    let answers = graph.execute_pattern_query(&query).unwrap();
    assert_eq!(answers.len(), 5);
    assert!(answers.iter().all(|t| t.to_string().contains("/x")));

    let report = learner.last_report().unwrap();
    assert_eq!(report.state, SessionState::Converged);
    assert!(report.score.is_consistent());
    assert_eq!(report.query, query);
}

#[test]
fn test_active_learning_with_random_selection() {
    let graph = synthetic_graph();
    let oracle = target(&graph);
    let seed = Term::iri("http://example.org/x3");
    let mut learner = ActiveLearner::new(seed, &graph, oracle, LearnerConfig::for_evaluation())
        .unwrap()
        .with_selector(RandomUnclassified::new(11));

    assert_eq!(learner.run().unwrap(), SessionState::Converged);
    let answers = graph
        .execute_pattern_query(&learner.current_query().unwrap())
        .unwrap();
    assert_eq!(answers.len(), 5);
}

#[test]
fn test_interactive_oracle_exhausts_candidates() {
    let graph = synthetic_graph();
    let oracle = FnOracle::new(|t: &Term| {
        if t.to_string().contains("/x") {
            Classification::Positive
        } else {
            Classification::Negative
        }
    });
    let seed = Term::iri("http://example.org/x1");
    let mut learner =
        ActiveLearner::new(seed, &graph, oracle, LearnerConfig::for_evaluation()).unwrap();

    assert_eq!(learner.run().unwrap(), SessionState::Converged);
    assert_eq!(learner.examples().positives().len(), 5);
    assert_eq!(learner.examples().negatives().len(), 5);
    assert!(learner.last_report().unwrap().candidate.is_none());

    let answers = graph
        .execute_pattern_query(&learner.current_query().unwrap())
        .unwrap();
    assert_eq!(answers.len(), 5);
}

#[test]
fn test_checkpoint_file_resume() {
    let graph = synthetic_graph();
    let seed = Term::iri("http://example.org/x1");
    let config = LearnerConfig::for_evaluation();
    let mut learner = ActiveLearner::new(seed, &graph, target(&graph), config.clone()).unwrap();
    learner.run_round().unwrap();

    let path = std::env::temp_dir().join("sparql_lgg_checkpoint.json");
    learner.checkpoint().save(&path).unwrap();
    let checkpoint = Checkpoint::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(checkpoint.examples, *learner.examples());
    let mut resumed = ActiveLearner::resume(checkpoint, &graph, target(&graph), config).unwrap();
    assert_eq!(resumed.run().unwrap(), SessionState::Converged);
}
