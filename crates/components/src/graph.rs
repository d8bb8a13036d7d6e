//! Dependency checks and activation ordering over `requires`.

use std::collections::{BTreeMap, BTreeSet};

use crate::{ComponentError, ComponentProfile, Result};

/// Computes the activation order of `profiles`.
///
/// Every `requires` entry must name another profile and the graph must be
/// acyclic. Components are grouped into levels: a level holds every
/// component whose requirements all sit in earlier levels. Within a level
/// the lowest rank goes first, unranked components go last, and names break
/// ties.
pub fn activation_order(profiles: &BTreeMap<String, ComponentProfile>) -> Result<Vec<String>> {
	for profile in profiles.values() {
		if let Some(requirement) = profile.requires.iter().find(|name| !profiles.contains_key(*name)) {
			return Err(ComponentError::Unresolved {
				component: profile.name.clone(),
				requirement: requirement.clone(),
			});
		}
	}

	let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
	let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
	for profile in profiles.values() {
		let requires: BTreeSet<&str> = profile.requires.iter().map(String::as_str).collect();
		pending.insert(&profile.name, requires.len());
		for requirement in requires {
			dependents.entry(requirement).or_default().push(&profile.name);
		}
	}

	let mut level: BTreeSet<(bool, i64, &str)> = profiles
		.values()
		.filter(|profile| pending[profile.name.as_str()] == 0)
		.map(ComponentProfile::order_key)
		.collect();
	let mut order = Vec::with_capacity(profiles.len());

	while !level.is_empty() {
		let mut next = BTreeSet::new();
		for (_, _, name) in level {
			order.push(name.to_owned());
			for dependent in dependents.get(name).into_iter().flatten() {
				let Some(count) = pending.get_mut(dependent) else {
					continue;
				};
				*count -= 1;
				if *count == 0 {
					next.insert(profiles[*dependent].order_key());
				}
			}
		}
		level = next;
	}

	if order.len() < profiles.len() {
		return Err(ComponentError::Cycle(find_cycle(profiles, &order)));
	}
	Ok(order)
}

/// Names of every component that transitively requires `name`, in `order`.
pub fn dependents(profiles: &BTreeMap<String, ComponentProfile>, order: &[String], name: &str) -> Vec<String> {
	let mut affected = BTreeSet::from([name]);
	let mut result = Vec::new();
	for candidate in order {
		let Some(profile) = profiles.get(candidate) else {
			continue;
		};
		if candidate != name && profile.requires.iter().any(|req| affected.contains(req.as_str())) {
			affected.insert(candidate);
			result.push(candidate.clone());
		}
	}
	result
}

/// Extracts one cycle among the components the sort could not place.
fn find_cycle(profiles: &BTreeMap<String, ComponentProfile>, placed: &[String]) -> Vec<String> {
	let placed: BTreeSet<&str> = placed.iter().map(String::as_str).collect();
	let Some(start) = profiles.keys().find(|name| !placed.contains(name.as_str())) else {
		return Vec::new();
	};

	// Every unplaced node has an unplaced requirement, so walking them must revisit a node.
	let mut path: Vec<&str> = Vec::new();
	let mut current = start.as_str();
	loop {
		if let Some(index) = path.iter().position(|name| *name == current) {
			let mut cycle: Vec<String> = path[index..].iter().map(|name| (*name).to_owned()).collect();
			cycle.push(current.to_owned());
			return cycle;
		}
		path.push(current);
		let next = profiles[current]
			.requires
			.iter()
			.map(String::as_str)
			.find(|requirement| !placed.contains(requirement));
		match next {
			Some(next) => current = next,
			None => return path.iter().map(|name| (*name).to_owned()).collect(),
		}
	}
}

#[cfg(test)]
mod tests;
