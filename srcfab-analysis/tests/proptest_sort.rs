//! Normalized output does not depend on the order a grapher emits in.

use camino::Utf8Path;
use proptest::prelude::*;
use srcfab_analysis::normalize_graph_data;
use srcfab_types::graph::{Def, DefKey, GraphOutput, Ref};

fn output(paths: &[String]) -> GraphOutput {
    GraphOutput {
        defs: paths
            .iter()
            .map(|p| Def {
                key: DefKey {
                    path: p.clone(),
                    ..DefKey::default()
                },
                name: p.clone(),
                ..Def::default()
            })
            .collect(),
        refs: paths
            .iter()
            .enumerate()
            .map(|(i, p)| Ref {
                def_path: p.clone(),
                file: "f".into(),
                start: i as u32,
                end: i as u32 + 1,
                ..Ref::default()
            })
            .collect(),
        ..GraphOutput::default()
    }
}

proptest! {
    #[test]
    fn normalized_defs_are_order_independent(
        paths in prop::collection::btree_set("[a-z]{1,6}", 0..12),
        seed in any::<u64>(),
    ) {
        let paths: Vec<String> = paths.into_iter().collect();
        let mut shuffled = paths.clone();
        // Deterministic rotation stands in for a shuffle.
        if !shuffled.is_empty() {
            let k = (seed % shuffled.len() as u64) as usize;
            shuffled.rotate_left(k);
            shuffled.reverse();
        }

        let mut a = output(&paths);
        let mut b = output(&shuffled);
        normalize_graph_data("GoPackage", Utf8Path::new("."), &mut a).expect("normalize a");
        normalize_graph_data("GoPackage", Utf8Path::new("."), &mut b).expect("normalize b");

        prop_assert_eq!(&a.defs, &b.defs);
        let sorted: Vec<&str> = a.defs.iter().map(|d| d.key.path.as_str()).collect();
        let mut expected: Vec<&str> = paths.iter().map(String::as_str).collect();
        expected.sort();
        prop_assert_eq!(sorted, expected);
    }
}
