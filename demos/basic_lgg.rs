//! Basic example of building, generalizing and relaxing query trees

use sparql_lgg::prelude::*;
use sparql_lgg::tree::{RDFS_LABEL, RDFS_SUBCLASS_OF, RDF_TYPE};
use sparql_lgg::utils::timing::Timer;
use sparql_lgg::utils::tree_fingerprint;

const DATA: &str = r#"
<http://dbpedia.org/resource/Albert_Einstein> <http://dbpedia.org/ontology/birthPlace> <http://dbpedia.org/resource/Ulm> .
<http://dbpedia.org/resource/Albert_Einstein> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://dbpedia.org/ontology/Person> .
<http://dbpedia.org/resource/Albert_Einstein> <http://www.w3.org/2000/01/rdf-schema#label> "Albert Einstein"@en .
<http://dbpedia.org/resource/Johannes_Kepler> <http://dbpedia.org/ontology/birthPlace> <http://dbpedia.org/resource/Weil_der_Stadt> .
<http://dbpedia.org/resource/Johannes_Kepler> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://dbpedia.org/ontology/Person> .
<http://dbpedia.org/resource/Ulm> <http://dbpedia.org/ontology/country> <http://dbpedia.org/resource/Germany> .
<http://dbpedia.org/resource/Weil_der_Stadt> <http://dbpedia.org/ontology/country> <http://dbpedia.org/resource/Germany> .
<http://dbpedia.org/ontology/Person> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <http://www.w3.org/2002/07/owl#Thing> .
"#;

fn main() -> Result<()> {
    env_logger::init();
    println!("=== Least General Generalization of Query Trees ===\n");

    let graph = InMemoryGraph::from_ntriples(DATA)?;
    println!("Loaded {} statements\n", graph.len());

    // Build one tree per example
    let factory = QueryTreeFactory::new(2);
    let dbr = |name: &str| Term::iri(format!("http://dbpedia.org/resource/{}", name));
    let einstein = factory.fetch_and_build(&graph, &dbr("Albert_Einstein"))?;
    let kepler = factory.fetch_and_build(&graph, &dbr("Johannes_Kepler"))?;

    println!("Einstein ({} nodes):\n{}", einstein.size(), einstein.dump());
    println!("Kepler ({} nodes):\n{}", kepler.size(), kepler.dump());

    println!("--- LGG ---");
    let lgg = {
        let _timer = Timer::new("LGG computation");
        einstein.lgg(&kepler)
    };
    println!("{}", lgg.dump());
    println!("Fingerprint: {}", tree_fingerprint(&lgg));
    println!("Idempotent? {}", lgg.lgg(&lgg).structural_equals(&lgg));

    let query = lgg.to_select_query(None);
    println!("\n{}\n", query);
    for answer in graph.execute_pattern_query(&query)? {
        println!("  {}", answer);
    }

    println!("\n--- Relaxation ---");
    let typed = lgg.keep_only_type_edges();
    println!("Type edges only:\n{}", typed.to_query_pattern());
    let pruned = lgg.prune_children(0.5);
    println!("\nHalf the root children:\n{}", pruned.to_query_pattern());

    // A hand-built tree for comparison
    let mut builder = QueryTreeBuilder::new(NodeLabel::Wildcard);
    builder
        .add_child(
            0,
            1,
            EdgeLabel::from_predicate(RDF_TYPE),
            NodeLabel::iri("http://dbpedia.org/ontology/Person"),
        )
        .add_child(1, 2, EdgeLabel::property(RDFS_SUBCLASS_OF), NodeLabel::Wildcard)
        .add_child(0, 3, EdgeLabel::property(RDFS_LABEL), NodeLabel::Wildcard);
    let manual = builder.build()?;
    println!("\nHand-built tree:\n{}", manual.to_select_query(Some(10)));

    Ok(())
}
