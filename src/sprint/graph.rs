//! Dependency graph validation and ordering.

use crate::error::{Result, SprintError};
use crate::task::Task;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Validate the batch and return task indices in execution order.
///
/// The order is a topological sort in which tasks that become ready at the
/// same time keep their submission order.
///
/// # Errors
///
/// - `UserError` for a repeated task identifier
/// - `UnknownDependency` for a `depends_on` entry outside the batch
/// - `CyclicDependency` naming one cycle (a self-dependency is a cycle of one)
pub fn execution_order(tasks: &[Task]) -> Result<Vec<usize>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        if index.insert(task.id.as_str(), i).is_some() {
            return Err(SprintError::UserError(format!(
                "duplicate task id '{}' in batch",
                task.id
            )));
        }
    }

    // deps[i]: distinct predecessor indices of task i, in declaration order.
    let mut deps: Vec<Vec<usize>> = Vec::with_capacity(tasks.len());
    for task in tasks {
        let mut seen = HashSet::new();
        let mut task_deps = Vec::with_capacity(task.depends_on.len());
        for dep in &task.depends_on {
            let Some(&d) = index.get(dep.as_str()) else {
                return Err(SprintError::UnknownDependency {
                    task_id: task.id.clone(),
                    dependency: dep.clone(),
                });
            };
            if seen.insert(d) {
                task_deps.push(d);
            }
        }
        deps.push(task_deps);
    }

    let mut unmet: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (i, task_deps) in deps.iter().enumerate() {
        for &d in task_deps {
            dependents[d].push(i);
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = unmet
        .iter()
        .enumerate()
        .filter(|(_, n)| **n == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(tasks.len());
    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        for &next in &dependents[i] {
            unmet[next] -= 1;
            if unmet[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() < tasks.len() {
        let cycle = find_cycle(&deps, &unmet);
        return Err(SprintError::CyclicDependency {
            cycle: cycle.into_iter().map(|i| tasks[i].id.clone()).collect(),
        });
    }

    Ok(order)
}

/// Walk predecessor edges from the first unsorted task until a task repeats.
///
/// Every unsorted task has at least one unsorted predecessor, so the walk
/// never leaves the unsorted set and must revisit a node. The returned path
/// starts and ends with the same task.
fn find_cycle(deps: &[Vec<usize>], unmet: &[usize]) -> Vec<usize> {
    let Some(start) = unmet.iter().position(|&n| n > 0) else {
        return Vec::new();
    };

    let mut path = vec![start];
    let mut position: HashMap<usize, usize> = HashMap::from([(start, 0)]);
    let mut current = start;
    loop {
        let Some(&next) = deps[current].iter().find(|&&d| unmet[d] > 0) else {
            return path;
        };
        if let Some(&at) = position.get(&next) {
            let mut cycle = path.split_off(at);
            cycle.push(next);
            return cycle;
        }
        position.insert(next, path.len());
        path.push(next);
        current = next;
    }
}
