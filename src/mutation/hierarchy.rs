//! Outline hierarchy edits: indent, outdent, and drag-reordering.
//!
//! Each edit moves a task together with its whole subtree, keeps every
//! child exactly one level below its parent, and renumbers the affected
//! sibling lists contiguously. Bounds are checked before anything changes.

use crate::error::{Result, ScheduleError};
use crate::models::TaskGraph;

/// Makes `id` the last child of its preceding sibling.
pub(crate) fn indent(graph: &mut TaskGraph, id: &str, max_level: u8) -> Result<()> {
    let task = graph.require(id)?;
    let new_level = task.level as i32 + 1;
    check_bounds(graph, id, new_level, max_level)?;

    let old_parent = graph.parent_of(id).map(str::to_string);
    let mut siblings = graph.siblings_of(id);
    let idx = index_in(&siblings, id)?;
    if idx == 0 {
        return Err(ScheduleError::InvalidHierarchyMove {
            task_id: id.to_string(),
            reason: "no preceding sibling to indent under".into(),
        });
    }
    let new_parent = siblings[idx - 1].clone();
    siblings.remove(idx);
    graph.set_siblings(old_parent.as_deref(), &siblings);

    let mut children = graph.require(&new_parent)?.children.clone();
    children.push(id.to_string());
    graph.set_siblings(Some(&new_parent), &children);
    graph.shift_levels(id, 1);
    Ok(())
}

/// Moves `id` out of its parent, placing it right after the former parent.
pub(crate) fn outdent(graph: &mut TaskGraph, id: &str, max_level: u8) -> Result<()> {
    let task = graph.require(id)?;
    let new_level = task.level as i32 - 1;
    check_bounds(graph, id, new_level, max_level)?;

    let Some(parent) = graph.parent_of(id).map(str::to_string) else {
        return Err(ScheduleError::HierarchyBoundsExceeded {
            task_id: id.to_string(),
            level: -1,
            max_level,
        });
    };

    let mut children = graph.require(&parent)?.children.clone();
    children.retain(|c| c != id);
    graph.set_siblings(Some(&parent), &children);

    // Once detached, `id` reads as a root; keep it out of the list until placed.
    let grandparent = graph.parent_of(&parent).map(str::to_string);
    let mut siblings = graph.siblings_of(&parent);
    siblings.retain(|s| s != id);
    let at = index_in(&siblings, &parent)? + 1;
    siblings.insert(at, id.to_string());
    graph.set_siblings(grandparent.as_deref(), &siblings);
    graph.shift_levels(id, -1);
    Ok(())
}

/// Moves `id` next to `target_id`, adopting the target's parent.
///
/// Within one sibling list the task takes the target's slot: dragged
/// downwards it lands after the target, dragged upwards (or in from
/// another list) it lands before it.
pub(crate) fn move_in_hierarchy(
    graph: &mut TaskGraph,
    id: &str,
    target_id: &str,
    max_level: u8,
) -> Result<()> {
    let task = graph.require(id)?;
    let target = graph.require(target_id)?;
    if id == target_id {
        return Err(ScheduleError::InvalidHierarchyMove {
            task_id: id.to_string(),
            reason: "cannot move a task next to itself".into(),
        });
    }
    if graph.descendants(id).iter().any(|d| d == target_id) {
        return Err(ScheduleError::InvalidHierarchyMove {
            task_id: id.to_string(),
            reason: format!("'{target_id}' is inside the moved subtree"),
        });
    }
    let level_delta = target.level as i32 - task.level as i32;
    check_bounds(graph, id, target.level as i32, max_level)?;

    let old_parent = graph.parent_of(id).map(str::to_string);
    let new_parent = graph.parent_of(target_id).map(str::to_string);

    let old_siblings = graph.siblings_of(id);
    let after = old_parent == new_parent
        && index_in(&old_siblings, id)? < index_in(&old_siblings, target_id)?;

    let remaining: Vec<String> = old_siblings.into_iter().filter(|s| s != id).collect();
    graph.set_siblings(old_parent.as_deref(), &remaining);

    let mut siblings = if old_parent == new_parent {
        remaining
    } else {
        let mut list = graph.siblings_of(target_id);
        list.retain(|s| s != id);
        list
    };
    let at = index_in(&siblings, target_id)? + usize::from(after);
    siblings.insert(at, id.to_string());
    graph.set_siblings(new_parent.as_deref(), &siblings);
    graph.shift_levels(id, level_delta);
    Ok(())
}

/// Fails if `id` at `new_level` (with its subtree) leaves `0..=max_level`.
fn check_bounds(graph: &TaskGraph, id: &str, new_level: i32, max_level: u8) -> Result<()> {
    let deepest = new_level + graph.subtree_depth(id) as i32;
    if new_level < 0 || deepest > max_level as i32 {
        let level = if new_level < 0 { new_level } else { deepest };
        return Err(ScheduleError::HierarchyBoundsExceeded {
            task_id: id.to_string(),
            level,
            max_level,
        });
    }
    Ok(())
}

fn index_in(list: &[String], id: &str) -> Result<usize> {
    list.iter()
        .position(|s| s == id)
        .ok_or_else(|| ScheduleError::TaskNotFound(id.to_string()))
}
