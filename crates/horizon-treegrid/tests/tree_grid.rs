//! End-to-end behavior of grid sources over live source views.

use std::sync::Arc;

use horizon_treegrid::prelude::*;
use parking_lot::Mutex;

#[derive(Clone, Debug)]
struct Item {
    name: &'static str,
    children: Arc<SourceView<Item>>,
}

fn item(name: &'static str, children: Vec<Item>) -> Item {
    Item {
        name,
        children: SourceView::shared(children),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_treegrid=debug")
        .with_test_writer()
        .try_init();
}

fn tree_source(roots: Vec<Item>) -> (Arc<SourceView<Item>>, HierarchicalSource<Item>) {
    let view = SourceView::shared(roots);
    let source = HierarchicalSource::builder(view.clone())
        .expander_column(ExpanderColumn::new(
            ValueColumn::with_key("Name", |i: &Item| i.name),
            |i: &Item| Some(i.children.clone()),
        ))
        .build()
        .unwrap();
    (view, source)
}

fn visible(source: &HierarchicalSource<Item>) -> Vec<(&'static str, usize)> {
    source
        .visible_rows()
        .iter()
        .map(|row| (row.model().name, row.depth()))
        .collect()
}

/// Every row resolves back to its own model, lookups round trip, and
/// unsorted rows are in strictly increasing address order.
fn assert_consistent(source: &HierarchicalSource<Item>) {
    let rows: Vec<Row<Item>> = source.visible_rows().to_vec();
    for (index, row) in rows.iter().enumerate() {
        let model = source.model_at(row.address()).unwrap();
        assert_eq!(model.name, row.model().name, "row {index} at {}", row.address());
        assert_eq!(source.row_index_to_model_index(index).as_ref(), Some(row.address()));
        assert_eq!(source.model_index_to_row_index(row.address(), 0), Some(index));
    }
    if !source.is_sorted() {
        assert!(rows.windows(2).all(|pair| pair[0].address() < pair[1].address()));
    }
}

fn sample() -> Vec<Item> {
    vec![
        item("a", vec![item("a0", vec![]), item("a1", vec![item("a10", vec![])])]),
        item("b", vec![item("b0", vec![])]),
        item("c", vec![]),
    ]
}

#[test]
fn test_expand_collapse_round_trip() {
    init_tracing();
    let (_, source) = tree_source(sample());
    assert_eq!(visible(&source), vec![("a", 1), ("b", 1), ("c", 1)]);

    assert!(source.expand(&Address::new(0)).unwrap());
    assert!(source.expand(&Address::from([0, 1])).unwrap());
    assert!(source.expand(&Address::new(1)).unwrap());
    assert_eq!(
        visible(&source),
        vec![("a", 1), ("a0", 2), ("a1", 2), ("a10", 3), ("b", 1), ("b0", 2), ("c", 1)]
    );
    assert_consistent(&source);

    assert!(source.collapse(&Address::new(0)).unwrap());
    assert_eq!(visible(&source), vec![("a", 1), ("b", 1), ("b0", 2), ("c", 1)]);
    assert_eq!(source.model_index_to_row_index(&Address::from([0, 1, 0]), 0), None);
    assert!(source.is_expanded(&Address::from([0, 1])));

    assert!(source.expand(&Address::new(0)).unwrap());
    assert_eq!(source.row_count(), 7);
    assert_eq!(source.model_index_to_row_index(&Address::from([0, 1, 0]), 3), Some(3));
    assert_consistent(&source);
}

#[test]
fn test_expansion_signals() {
    let (_, source) = tree_source(sample());
    let changes = Arc::new(Mutex::new(Vec::new()));
    let changes_clone = changes.clone();
    source
        .rows_changed()
        .connect(move |change| changes_clone.lock().push(*change));
    let expanded = Arc::new(Mutex::new(Vec::new()));
    let expanded_clone = expanded.clone();
    source
        .expanded()
        .connect(move |address| expanded_clone.lock().push(address.clone()));

    source.expand(&Address::new(1)).unwrap();
    source.collapse(&Address::new(1)).unwrap();
    assert!(!source.expand(&Address::new(2)).unwrap());

    assert_eq!(
        *changes.lock(),
        vec![
            CollectionChange::Inserted { start: 2, count: 1 },
            CollectionChange::Removed { start: 2, count: 1 },
        ]
    );
    assert_eq!(*expanded.lock(), vec![Address::new(1)]);
}

#[test]
fn test_source_edits_flow_into_rows() {
    let (roots, source) = tree_source(sample());
    source.expand(&Address::new(0)).unwrap();
    source.expand(&Address::from([0, 1])).unwrap();

    let a = roots.get(0).unwrap();
    a.children.insert(0, item("new", vec![]));
    assert_eq!(
        visible(&source),
        vec![("a", 1), ("new", 2), ("a0", 2), ("a1", 2), ("a10", 3), ("b", 1), ("c", 1)]
    );
    assert_consistent(&source);

    roots.remove(0);
    assert_eq!(visible(&source), vec![("b", 1), ("c", 1)]);
    assert_consistent(&source);

    roots.insert(1, item("d", vec![]));
    assert_eq!(visible(&source), vec![("b", 1), ("d", 1), ("c", 1)]);
    assert_consistent(&source);
}

#[test]
fn test_flat_moves() {
    let view = SourceView::shared(vec!["A", "B", "C", "D", "E"]);
    let source = FlatSource::builder(view.clone())
        .column(ValueColumn::with_key("Name", |s: &&'static str| *s))
        .build()
        .unwrap();

    assert!(source
        .drag_drop_rows(&[Address::new(1), Address::new(3)], &Address::new(0), DropPosition::After, DragEffect::Move)
        .unwrap());
    assert_eq!(view.to_vec(), vec!["A", "B", "D", "C", "E"]);

    assert!(source
        .drag_drop_rows(&[Address::new(4)], &Address::new(0), DropPosition::Before, DragEffect::Move)
        .unwrap());
    assert_eq!(view.to_vec(), vec!["E", "A", "B", "D", "C"]);

    let rows: Vec<&str> = (0..source.row_count())
        .filter_map(|i| source.row(i))
        .map(|row| *row.model())
        .collect();
    assert_eq!(rows, view.to_vec());
}

#[test]
fn test_sorted_sources_refuse_moves() {
    let (roots, source) = tree_source(sample());
    assert!(source.sort_by(0, SortDirection::Descending));
    assert_eq!(visible(&source), vec![("c", 1), ("b", 1), ("a", 1)]);

    let moved = source
        .drag_drop_rows(&[Address::new(2)], &Address::new(0), DropPosition::Before, DragEffect::Move)
        .unwrap();
    assert!(!moved);
    let names: Vec<&str> = roots.to_vec().iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    source.expand(&Address::new(0)).unwrap();
    assert_eq!(source.row(3).map(|row| row.model().name), Some("a1"));
    assert_eq!(source.model_index_to_row_index(&Address::from([0, 1]), 0), Some(3));
    assert_consistent(&source);
}

#[test]
fn test_moves_keep_rows_consistent() {
    init_tracing();
    let (roots, source) = tree_source(sample());
    source.expand_all().unwrap();
    assert_eq!(source.row_count(), 7);

    assert!(source
        .drag_drop_rows(&[Address::from([0, 1, 0])], &Address::new(2), DropPosition::Inside, DragEffect::Move)
        .unwrap());
    assert_consistent(&source);
    let c = roots.get(2).unwrap();
    assert_eq!(c.children.len(), 1);

    assert!(source
        .drag_drop_rows(&[Address::new(1)], &Address::from([0, 0]), DropPosition::After, DragEffect::Move)
        .unwrap());
    assert_consistent(&source);
    let names: Vec<&str> = roots.to_vec().iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["a", "c"]);
    let a_children: Vec<&str> = roots.get(0).unwrap().children.to_vec().iter().map(|i| i.name).collect();
    assert_eq!(a_children, vec!["a0", "b", "a1"]);

    assert_eq!(
        source.drag_drop_rows(&[Address::new(0)], &Address::new(1), DropPosition::After, DragEffect::Link),
        Err(Error::UnsupportedEffect(DragEffect::Link))
    );
}
