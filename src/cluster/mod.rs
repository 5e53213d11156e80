//! Heuristic table reconstruction.
//!
//! The extracted fields carry no table or row markers. The only signals are which
//! document line a field sits on and whether its key repeats across lines, so tables
//! are inferred:
//!
//! 1. Rows are bucketed by primary line (side A's first line, else side B's, else 0).
//! 2. A key seen on more than one line is a potential column.
//! 3. A line is a table row if it holds a potential column or is dense enough;
//!    every key on a table row becomes a column.
//! 4. Columns that share a table row are linked; each connected component of that
//!    graph is one table.
//!
//! Lines that are not table rows are returned as info rows. Components are disjoint,
//! so each table row lands in exactly one table.

use crate::model::{
    normalized_key, CellData, ClusterResult, ComparisonRow, ProcessedRow, TableGroup,
};
use crate::state::approval::{display_value, ApprovalMap};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::{debug, error};

/// Line assigned to rows with no anchor on either side.
pub const UNORDERED_LINE: usize = 0;

/// Tuning for table classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOptions {
    /// A line with more distinct fields than this is a table row even without repetition.
    pub density_threshold: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            density_threshold: 2,
        }
    }
}

/// Split aligned rows into reconstructed tables and leftover info rows.
pub fn cluster(
    rows: &[ComparisonRow],
    approvals: &ApprovalMap,
    options: &ClusterOptions,
) -> ClusterResult {
    let key_rank = first_seen_ranks(rows);
    let lines = bucket_by_line(rows, approvals);

    // Number of distinct lines each key appears on.
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for line in &lines {
        for key in line.keys() {
            *frequency.entry(key).or_default() += 1;
        }
    }

    let is_table_row: Vec<bool> = lines
        .iter()
        .map(|line| {
            line.density > options.density_threshold
                || line.keys().any(|key| frequency.get(key).copied().unwrap_or(0) > 1)
        })
        .collect();

    let graph = column_graph(
        lines
            .iter()
            .zip(&is_table_row)
            .filter(|(_, table)| **table)
            .map(|(line, _)| line),
    );
    let components = connected_components(&graph, &key_rank);

    let mut component_of: HashMap<&str, usize> = HashMap::new();
    for (idx, component) in components.iter().enumerate() {
        for key in component {
            component_of.insert(key.as_str(), idx);
        }
    }

    let mut members: Vec<Vec<ProcessedRow>> = vec![Vec::new(); components.len()];
    let mut info_rows = Vec::new();
    for (line, table) in lines.iter().zip(is_table_row) {
        if !table {
            info_rows.push(line.clone());
            continue;
        }
        match owning_component(line, &component_of) {
            Some(idx) => members[idx].push(line.clone()),
            None => {
                // Unreachable while every key of a table row is a graph node.
                error!(
                    line = line.line_number,
                    keys = ?line.keys().collect::<Vec<_>>(),
                    "Table row spans several column clusters; keeping it as an info row"
                );
                info_rows.push(line.clone());
            }
        }
    }

    let mut tables: Vec<TableGroup> = components
        .into_iter()
        .zip(members)
        .filter(|(_, rows)| !rows.is_empty())
        .map(|(columns, rows)| TableGroup {
            id: 0,
            columns,
            rows,
        })
        .collect();
    // Stable: equal first lines keep component discovery order.
    tables.sort_by_key(|table| table.first_line());
    for (id, table) in tables.iter_mut().enumerate() {
        table.id = id;
    }

    debug!(
        lines = lines.len(),
        tables = tables.len(),
        info_rows = info_rows.len(),
        "Clustered rows into tables"
    );

    ClusterResult { tables, info_rows }
}

/// Rank of each base key by first appearance in row order.
fn first_seen_ranks(rows: &[ComparisonRow]) -> HashMap<&str, usize> {
    let mut ranks = HashMap::new();
    for row in rows {
        let next = ranks.len();
        ranks.entry(normalized_key(&row.source_key)).or_insert(next);
    }
    ranks
}

/// Group rows into one processed row per document line, ascending.
///
/// Within a line the last row written for a base key wins.
fn bucket_by_line(rows: &[ComparisonRow], approvals: &ApprovalMap) -> Vec<ProcessedRow> {
    let mut buckets: BTreeMap<usize, BTreeMap<String, CellData>> = BTreeMap::new();
    for row in rows {
        let line = row.primary_line().unwrap_or(UNORDERED_LINE);
        let cell = CellData {
            value: display_value(row, approvals).to_string(),
            is_approved: approvals.contains(&row.key),
            is_match: row.is_match,
            original_key: row.key.clone(),
            line_numbers: row.line_numbers.clone(),
        };
        buckets
            .entry(line)
            .or_default()
            .insert(normalized_key(&row.source_key).to_string(), cell);
    }

    buckets
        .into_iter()
        .map(|(line_number, data)| ProcessedRow {
            line_number,
            density: data.len(),
            data,
        })
        .collect()
}

/// Adjacency over column keys: two keys are linked when they share a table row.
fn column_graph<'a>(
    table_rows: impl Iterator<Item = &'a ProcessedRow>,
) -> HashMap<&'a str, BTreeSet<&'a str>> {
    let mut graph: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for row in table_rows {
        let keys: Vec<&str> = row.keys().collect();
        for &key in &keys {
            let neighbours = graph.entry(key).or_default();
            neighbours.extend(keys.iter().copied().filter(|&other| other != key));
        }
    }
    graph
}

/// Breadth-first connected components, each listed in first-seen key order.
///
/// Components are discovered starting from the earliest-seen unvisited key.
fn connected_components(
    graph: &HashMap<&str, BTreeSet<&str>>,
    key_rank: &HashMap<&str, usize>,
) -> Vec<Vec<String>> {
    let rank = |key: &str| key_rank.get(key).copied().unwrap_or(usize::MAX);

    let mut nodes: Vec<&str> = graph.keys().copied().collect();
    nodes.sort_by(|a, b| rank(*a).cmp(&rank(*b)).then_with(|| a.cmp(b)));

    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut components = Vec::new();
    for &start in &nodes {
        if !visited.insert(start) {
            continue;
        }
        let mut component = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for &next in graph.get(node).into_iter().flatten() {
                if visited.insert(next) {
                    component.push(next);
                    queue.push_back(next);
                }
            }
        }
        component.sort_by(|a, b| rank(*a).cmp(&rank(*b)).then_with(|| a.cmp(b)));
        components.push(component.into_iter().map(str::to_string).collect());
    }
    components
}

/// The single component holding every key of `row`, if there is one.
fn owning_component(row: &ProcessedRow, component_of: &HashMap<&str, usize>) -> Option<usize> {
    let mut keys = row.keys();
    let first = component_of.get(keys.next()?).copied()?;
    keys.all(|key| component_of.get(key) == Some(&first))
        .then_some(first)
}

// ===== Tests =====

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
