use std::collections::BTreeMap;

use pretty_assertions::assert_eq;

use super::*;
use crate::Category;

fn profiles(specs: &[(&str, Option<i64>, &[&str])]) -> BTreeMap<String, ComponentProfile> {
	specs
		.iter()
		.map(|(name, rank, requires)| {
			let mut profile = ComponentProfile::new(*name, "Stub", Category::Default).with_requires(requires.iter().copied());
			profile.rank = *rank;
			(name.to_string(), profile)
		})
		.collect()
}

#[test]
fn rank_orders_within_a_level() {
	let graph = profiles(&[("A", Some(0), &[]), ("B", Some(20), &["A"]), ("C", Some(10), &["A"])]);
	assert_eq!(activation_order(&graph).unwrap(), vec!["A", "C", "B"]);
}

#[test]
fn low_rank_does_not_jump_ahead_of_an_earlier_level() {
	let graph = profiles(&[("X", Some(1), &[]), ("Y", Some(100), &[]), ("B", Some(10), &["X"])]);
	assert_eq!(activation_order(&graph).unwrap(), vec!["X", "Y", "B"]);
}

#[test]
fn levels_follow_the_longest_requirement_chain() {
	let graph = profiles(&[
		("root", Some(50), &[]),
		("side", None, &[]),
		("mid", Some(40), &["root"]),
		("leaf", Some(0), &["mid"]),
		("wide", Some(90), &["root", "side"]),
	]);
	assert_eq!(activation_order(&graph).unwrap(), vec!["root", "side", "mid", "wide", "leaf"]);
}

#[test]
fn unranked_components_sort_last_then_by_name() {
	let graph = profiles(&[("zeta", None, &[]), ("alpha", None, &[]), ("mid", Some(5), &[]), ("low", Some(-1), &[])]);
	assert_eq!(activation_order(&graph).unwrap(), vec!["low", "mid", "alpha", "zeta"]);
}

#[test]
fn order_respects_requirements_over_rank() {
	let graph = profiles(&[("base", Some(100), &[]), ("top", Some(0), &["base", "middle"]), ("middle", Some(50), &["base"])]);
	let order = activation_order(&graph).unwrap();
	assert_eq!(order, vec!["base", "middle", "top"]);

	for (index, name) in order.iter().enumerate() {
		for requirement in &graph[name].requires {
			assert!(order[..index].contains(requirement), "{requirement} must precede {name}");
		}
	}
}

#[test]
fn unresolved_requirement_is_rejected() {
	let graph = profiles(&[("A", None, &["ghost"])]);
	let err = activation_order(&graph).unwrap_err();
	assert!(matches!(err, ComponentError::Unresolved { ref component, ref requirement } if component == "A" && requirement == "ghost"));
}

#[test]
fn cycles_are_reported_with_their_path() {
	let graph = profiles(&[("root", Some(0), &[]), ("a", None, &["root", "c"]), ("b", None, &["a"]), ("c", None, &["b"])]);
	let ComponentError::Cycle(cycle) = activation_order(&graph).unwrap_err() else {
		panic!("expected a cycle");
	};
	assert_eq!(cycle, vec!["a", "c", "b", "a"]);
}

#[test]
fn self_requirement_is_a_cycle() {
	let graph = profiles(&[("loop", None, &["loop"])]);
	assert!(matches!(activation_order(&graph), Err(ComponentError::Cycle(_))));
}

#[test]
fn dependents_are_transitive_and_ordered() {
	let graph = profiles(&[("A", Some(0), &[]), ("B", Some(20), &["A"]), ("C", Some(10), &["A"]), ("D", None, &["B"]), ("E", None, &[])]);
	let order = activation_order(&graph).unwrap();
	assert_eq!(dependents(&graph, &order, "A"), vec!["C", "B", "D"]);
	assert_eq!(dependents(&graph, &order, "B"), vec!["D"]);
	assert!(dependents(&graph, &order, "E").is_empty());
}
