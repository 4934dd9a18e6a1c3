//! Random operation sequences against live trees.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use horizon_treegrid::model::Comparer;
use horizon_treegrid::prelude::*;
use parking_lot::Mutex;
use proptest::prelude::*;

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Clone, Debug)]
struct Item {
    id: u32,
    children: Arc<SourceView<Item>>,
}

fn item(children: Vec<Item>) -> Item {
    Item {
        id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        children: SourceView::shared(children),
    }
}

/// Root items, each with child counts for its children's own leaves.
type Shape = Vec<Vec<usize>>;

fn shape(min_roots: usize) -> impl Strategy<Value = Shape> {
    prop::collection::vec(prop::collection::vec(0usize..3, 0..4), min_roots..5)
}

fn build(shape: &Shape) -> Arc<SourceView<Item>> {
    let roots = shape
        .iter()
        .map(|children| {
            item(
                children
                    .iter()
                    .map(|&leaves| item((0..leaves).map(|_| item(Vec::new())).collect()))
                    .collect(),
            )
        })
        .collect();
    SourceView::shared(roots)
}

struct ItemChildren;

impl Expander<Item> for ItemChildren {
    fn children(&self, item: &Item) -> Option<Arc<SourceView<Item>>> {
        Some(item.children.clone())
    }
}

fn by_id(descending: bool) -> Comparer<Item> {
    Arc::new(move |a: &Item, b: &Item| {
        let order = a.id.cmp(&b.id);
        if descending { order.reverse() } else { order }
    })
}

#[derive(Debug, Clone)]
enum Op {
    Expand(usize),
    Collapse(usize),
    Insert(usize, usize),
    Remove(usize, usize),
    Replace(usize, usize),
    Sort(Option<bool>),
    ExpandAll,
    CollapseAll,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<usize>().prop_map(Op::Expand),
        2 => any::<usize>().prop_map(Op::Collapse),
        3 => (any::<usize>(), any::<usize>()).prop_map(|(list, at)| Op::Insert(list, at)),
        3 => (any::<usize>(), any::<usize>()).prop_map(|(list, at)| Op::Remove(list, at)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(list, at)| Op::Replace(list, at)),
        1 => prop::option::of(any::<bool>()).prop_map(Op::Sort),
        1 => Just(Op::ExpandAll),
        1 => Just(Op::CollapseAll),
    ]
}

type Entry = (u32, usize, ExpansionState);

fn entries(rows: &HierarchicalRows<Item>) -> Vec<Entry> {
    rows.rows()
        .iter()
        .map(|row| (row.model().id, row.depth(), row.expansion()))
        .collect()
}

/// The rows a full re-flattening of the current tree produces.
fn flatten(
    rows: &HierarchicalRows<Item>,
    view: &SourceView<Item>,
    parent: &Address,
    descending: Option<bool>,
    out: &mut Vec<Entry>,
) {
    let mut items: Vec<(usize, Item)> = view.to_vec().into_iter().enumerate().collect();
    if let Some(descending) = descending {
        let comparer = by_id(descending);
        items.sort_by(|(_, a), (_, b)| comparer(a, b));
    }
    for (offset, item) in items {
        let address = parent.append(offset);
        let expansion = if item.children.is_empty() {
            ExpansionState::NotExpandable
        } else if rows.is_expanded(&address) {
            ExpansionState::Expanded
        } else {
            ExpansionState::Collapsed
        };
        out.push((item.id, address.len(), expansion));
        if expansion.is_expanded() {
            flatten(rows, &item.children, &address, descending, out);
        }
    }
}

/// The list an op edits: a visible row's children, or the root list.
fn pick_list(rows: &HierarchicalRows<Item>, root: &Arc<SourceView<Item>>, pick: usize) -> Arc<SourceView<Item>> {
    let len = rows.len();
    match pick % (len + 1) {
        index if index == len => root.clone(),
        index => rows.row(index).map_or_else(|| root.clone(), |row| row.model().children.clone()),
    }
}

fn apply(rows: &HierarchicalRows<Item>, root: &Arc<SourceView<Item>>, op: &Op, sort: &mut Option<bool>) {
    let row_address = |pick: usize| (!rows.is_empty()).then(|| rows.row_index_to_address(pick % rows.len())).flatten();
    match *op {
        Op::Expand(pick) => {
            if let Some(address) = row_address(pick) {
                rows.expand(&address).unwrap();
            }
        }
        Op::Collapse(pick) => {
            if let Some(address) = row_address(pick) {
                rows.collapse(&address).unwrap();
            }
        }
        Op::Insert(list, at) => {
            let list = pick_list(rows, root, list);
            list.insert(at % (list.len() + 1), item(vec![item(Vec::new())]));
        }
        Op::Remove(list, at) => {
            let list = pick_list(rows, root, list);
            if !list.is_empty() {
                list.remove(at % list.len());
            }
        }
        Op::Replace(list, at) => {
            let list = pick_list(rows, root, list);
            if !list.is_empty() {
                list.replace(at % list.len(), item(Vec::new()));
            }
        }
        Op::Sort(direction) => {
            *sort = direction;
            rows.sort(direction.map(by_id));
        }
        Op::ExpandAll => rows.expand_all().unwrap(),
        Op::CollapseAll => rows.collapse_all(),
    }
}

/// Follows `rows_changed`; stale entries are `None` until checked.
fn mirror(rows: &Arc<HierarchicalRows<Item>>) -> Arc<Mutex<Vec<Option<Entry>>>> {
    let mirror = Arc::new(Mutex::new(entries(rows).into_iter().map(Some).collect::<Vec<_>>()));
    let mirror_clone = mirror.clone();
    let weak = Arc::downgrade(rows);
    rows.rows_changed().connect(move |change| {
        let mut mirror = mirror_clone.lock();
        match *change {
            CollectionChange::Inserted { start, count } => {
                mirror.splice(start..start, std::iter::repeat_n(None, count));
            }
            CollectionChange::Removed { start, count } => {
                mirror.drain(start..start + count);
            }
            CollectionChange::Replaced { start, count } => {
                mirror[start..start + count].fill(None);
            }
            CollectionChange::Reset => {
                let len = weak.upgrade().map_or(0, |rows| rows.len());
                *mirror = vec![None; len];
            }
        }
    });
    mirror
}

fn all_items(view: &SourceView<Item>, parent: &Address, out: &mut Vec<(Address, u32)>) {
    for (offset, item) in view.to_vec().into_iter().enumerate() {
        let address = parent.append(offset);
        out.push((address.clone(), item.id));
        all_items(&item.children, &address, out);
    }
}

fn snapshot(root: &SourceView<Item>) -> Vec<(Address, u32)> {
    let mut out = Vec::new();
    all_items(root, &Address::root(), &mut out);
    out
}

fn list_at(root: &Arc<SourceView<Item>>, parent: &Address) -> Option<Arc<SourceView<Item>>> {
    let mut list = root.clone();
    for offset in parent {
        list = list.get(offset)?.children.clone();
    }
    Some(list)
}

fn position() -> impl Strategy<Value = DropPosition> {
    prop_oneof![
        Just(DropPosition::Before),
        Just(DropPosition::After),
        Just(DropPosition::Inside),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn rows_track_random_operations(shape in shape(0), ops in prop::collection::vec(op(), 1..24)) {
        let root = build(&shape);
        let rows = Arc::new(HierarchicalRows::new(root.clone(), Some(Arc::new(ItemChildren))));
        let mirror = mirror(&rows);
        let mut sort = None;

        for op in &ops {
            apply(&rows, &root, op, &mut sort);

            let actual = entries(&rows);
            let mut expected = Vec::new();
            flatten(&rows, &root, &Address::root(), sort, &mut expected);
            prop_assert_eq!(&actual, &expected, "after {:?}", op);

            {
                let visible = rows.rows();
                for pair in visible.windows(2) {
                    prop_assert!(pair[0].display() < pair[1].display());
                    if sort.is_none() {
                        prop_assert!(pair[0].address() < pair[1].address());
                    }
                }
            }

            for index in 0..rows.len() {
                let address = rows.row_index_to_address(index).unwrap();
                for hint in [0, index, index + 1, rows.len()] {
                    prop_assert_eq!(rows.address_to_row_index(&address, hint), Some(index));
                }
            }

            let mut mirrored = mirror.lock();
            prop_assert_eq!(mirrored.len(), actual.len(), "after {:?}", op);
            for (seen, current) in mirrored.iter().zip(&actual) {
                if let Some(seen) = seen {
                    prop_assert_eq!(seen, current, "unannounced change after {:?}", op);
                }
            }
            *mirrored = actual.into_iter().map(Some).collect();
        }
    }

    #[test]
    fn moves_keep_items_and_order(
        shape in shape(1),
        picks in prop::collection::vec(any::<usize>(), 1..4),
        target in any::<usize>(),
        position in position(),
        expand in any::<bool>(),
    ) {
        let root = build(&shape);
        let source = HierarchicalSource::builder(root.clone())
            .expander_column(ExpanderColumn::new(
                ValueColumn::with_key("Id", |i: &Item| i.id),
                |i: &Item| Some(i.children.clone()),
            ))
            .build()
            .unwrap();
        if expand {
            source.expand_all().unwrap();
        }

        let before = snapshot(&root);
        let addresses: Vec<Address> = picks.iter().map(|pick| before[pick % before.len()].0.clone()).collect();
        let target = before[target % before.len()].0.clone();

        let mut moved: Vec<(Address, u32)> = before
            .iter()
            .filter(|(address, _)| addresses.contains(address))
            .filter(|(address, _)| !addresses.iter().any(|other| other.is_ancestor_of(address)))
            .cloned()
            .collect();
        moved.sort();
        let destination = match position {
            DropPosition::Inside => list_at(&root, &target),
            DropPosition::Before | DropPosition::After => target.parent().and_then(|parent| list_at(&root, &parent)),
        }
        .unwrap();

        let result = source.drag_drop_rows(&addresses, &target, position, DragEffect::Move);
        let after = snapshot(&root);
        prop_assert_eq!(after.len(), before.len());

        match result {
            Ok(true) => {
                let ids: Vec<u32> = destination.to_vec().iter().map(|i| i.id).collect();
                let positions: Vec<usize> = moved
                    .iter()
                    .map(|(_, id)| ids.iter().position(|other| other == id))
                    .collect::<Option<_>>()
                    .unwrap();
                for pair in positions.windows(2) {
                    prop_assert_eq!(pair[1], pair[0] + 1);
                }
            }
            Ok(false) => prop_assert_eq!(after, before),
            Err(error) => prop_assert!(false, "unexpected error {error}"),
        }

        for index in 0..source.row_count() {
            let address = source.row_index_to_model_index(index).unwrap();
            prop_assert_eq!(source.model_at(&address).map(|i| i.id), source.row(index).map(|row| row.model().id));
            prop_assert_eq!(source.model_index_to_row_index(&address, 0), Some(index));
        }
    }
}
