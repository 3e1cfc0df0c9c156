use serde_json::json;

use super::graph::AdvisorTree;
use super::parse::parse_dataset;

pub(crate) fn tree_from_json(raw: &str) -> AdvisorTree {
    AdvisorTree::from_raw(parse_dataset(raw).unwrap()).unwrap()
}

/// `R` advises `A` and `B`; `A` advises `C`.
pub(crate) fn sample_tree() -> AdvisorTree {
    tree_from_json(
        r#"{ "root": "R",
             "nodes": [
                { "id": "R", "name": "Root", "depth": 0, "direct_advisee_count": 2, "total_descendants": 3 },
                { "id": "A", "name": "Ada", "depth": 1, "direct_advisee_count": 1, "total_descendants": 1 },
                { "id": "B", "name": "Bo", "depth": 1, "direct_advisee_count": 0, "total_descendants": 0 },
                { "id": "C", "name": "Cy", "depth": 2, "direct_advisee_count": 0, "total_descendants": 0 }
             ],
             "edges": [{ "from": "R", "to": "A" }, { "from": "R", "to": "B" }, { "from": "A", "to": "C" }] }"#,
    )
}

/// Ternary heap rooted at `R` where most nodes also have a second, equally shallow advisor.
pub(crate) fn chain_tree(count: usize) -> AdvisorTree {
    let id = |index: usize| {
        if index == 0 {
            "R".to_owned()
        } else {
            format!("N{index:03}")
        }
    };
    let parent = |index: usize| (index - 1) / 3;

    let mut depth = vec![0u32; count];
    let mut direct = vec![0u32; count];
    let mut total = vec![0u32; count];
    for index in 1..count {
        depth[index] = depth[parent(index)] + 1;
        direct[parent(index)] += 1;
    }
    for index in (1..count).rev() {
        total[parent(index)] += total[index] + 1;
    }

    let mut edges = Vec::new();
    for index in 1..count {
        edges.push(json!({ "from": id(parent(index)), "to": id(index) }));
        let sibling_parent = parent(index) + 1;
        if parent(index) != 0
            && sibling_parent < index
            && depth[sibling_parent] == depth[parent(index)]
        {
            edges.push(json!({ "from": id(sibling_parent), "to": id(index) }));
        }
    }

    let nodes = (0..count)
        .map(|index| {
            json!({
                "id": id(index),
                "depth": depth[index],
                "direct_advisee_count": direct[index],
                "total_descendants": total[index],
            })
        })
        .collect::<Vec<_>>();

    let dataset = json!({ "root": "R", "nodes": nodes, "edges": edges });
    tree_from_json(&dataset.to_string())
}
