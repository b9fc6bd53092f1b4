//! Collection adapter integration tests
//!
//! Drives the functional surface through a host-like collection that only
//! exposes a cursor, the way remote list item collections do.

use spext_collections::{
    fields, from_fn, matches, property, CollectionExt, Cursor, Enumerable, FieldLookupValue,
    FieldUrlValue, FieldUserValue, FieldValue, Fields, Predicate,
};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// A list item as handed out by the host
#[derive(Debug, Clone, PartialEq)]
struct ListItem {
    id: i64,
    values: HashMap<String, FieldValue>,
}

impl ListItem {
    fn new(id: i64, values: &[(&str, FieldValue)]) -> Rc<Self> {
        Rc::new(Self {
            id,
            values: values
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        })
    }
}

impl Fields for ListItem {
    fn get_item(&self, name: &str) -> FieldValue {
        if name == "ID" {
            return FieldValue::from(self.id);
        }
        self.values.get(name).cloned().unwrap_or_default()
    }
}

/// Host collection: elements are reachable only through `get_enumerator`
struct ListItemCollection {
    items: Vec<Rc<ListItem>>,
    enumerators: Cell<usize>,
}

impl ListItemCollection {
    fn new(items: Vec<Rc<ListItem>>) -> Self {
        Self {
            items,
            enumerators: Cell::new(0),
        }
    }

    fn ids(items: &[Rc<ListItem>]) -> Vec<i64> {
        items.iter().map(|item| item.id).collect()
    }
}

struct ListItemEnumerator<'a> {
    items: &'a [Rc<ListItem>],
    next: usize,
}

impl Cursor for ListItemEnumerator<'_> {
    type Item = Rc<ListItem>;

    fn advance(&mut self) -> bool {
        if self.next < self.items.len() {
            self.next += 1;
            true
        } else {
            false
        }
    }

    fn current(&self) -> Rc<ListItem> {
        Rc::clone(&self.items[self.next - 1])
    }
}

impl Enumerable for ListItemCollection {
    type Item = Rc<ListItem>;
    type Cursor<'a>
        = ListItemEnumerator<'a>
    where
        Self: 'a;

    fn get_enumerator(&self) -> ListItemEnumerator<'_> {
        self.enumerators.set(self.enumerators.get() + 1);
        ListItemEnumerator {
            items: &self.items,
            next: 0,
        }
    }
}

fn tasks() -> ListItemCollection {
    ListItemCollection::new(vec![
        ListItem::new(1, &[("Title", "Draft".into()), ("Status", "Open".into()), ("Priority", 2.into())]),
        ListItem::new(2, &[("Title", "".into()), ("Status", "Closed".into()), ("Priority", 1.into())]),
        ListItem::new(3, &[("Title", "Review".into()), ("Status", "Open".into()), ("Priority", 0.into())]),
        ListItem::new(4, &[("Title", "Ship".into()), ("Status", "Open".into()), ("Priority", 3.into())]),
    ])
}

#[test]
fn test_every_operation_starts_a_fresh_traversal() {
    let list = tasks();
    assert_eq!(list.to_array().len(), 4);
    assert_eq!(list.map(|item, _, _| item.id), vec![1, 2, 3, 4]);
    assert_eq!(list.to_array().len(), 4);
    assert_eq!(list.enumerators.get(), 3);
}

#[test]
fn test_some_matches_existence() {
    let list = tasks();
    assert!(list.some(|item, _, _| item.id == 3));
    assert!(!list.some(|item, _, _| item.id == 9));
}

#[test]
fn test_some_stops_at_first_match() {
    let list = tasks();
    let calls = Cell::new(0);
    assert!(list.some(|item, _, _| {
        calls.set(calls.get() + 1);
        item.id == 2
    }));
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_every_stops_at_first_failure_and_is_false_on_empty() {
    let list = tasks();
    let calls = Cell::new(0);
    assert!(!list.every(|item, _, _| {
        calls.set(calls.get() + 1);
        item.get_item("Status") == FieldValue::from("Open")
    }));
    assert_eq!(calls.get(), 2);
    assert!(list.every(|item, _, _| item.id > 0));

    let empty = ListItemCollection::new(Vec::new());
    assert!(!empty.every(|_, _, _| true));
}

#[test]
fn test_find_never_calls_predicate_after_match() {
    let list = tasks();
    let visited = Cell::new(0);
    let found = list.find(|item, index, _| {
        visited.set(visited.get() + 1);
        assert!(index < 3, "predicate called after the first match");
        item.get_item("Title") == FieldValue::from("Review")
    });
    assert_eq!(found.map(|item| item.id), Some(3));
    assert_eq!(visited.get(), 3);
    assert_eq!(list.find(|item, _, _| item.id == 42), None);
}

#[test]
fn test_first_or_default_tests_only_the_first_element() {
    let list = tasks();
    assert_eq!(list.first_or_default().map(|item| item.id), Some(1));
    assert_eq!(list.first_or_default_by(|item, _, _| item.id == 2), None);
    assert_eq!(
        list.first_or_default_by(|item, _, _| item.id == 1).map(|item| item.id),
        Some(1)
    );
    assert_eq!(ListItemCollection::new(Vec::new()).first_or_default(), None);
}

#[test]
fn test_reduce_over_numbers() {
    let numbers = from_fn(|| [1, 2, 3].into_iter());
    assert_eq!(numbers.reduce(|a, b, _, _| a + b, 0), 6);

    let empty = from_fn(std::iter::empty::<i32>);
    assert_eq!(empty.reduce(|a, b, _, _| a + b, 11), 11);
}

#[test]
fn test_reduce_passes_index_and_collection() {
    let list = tasks();
    let trail = list.reduce(
        |mut trail, item, index, collection| {
            trail.push(format!("{}/{}:{}", index, collection.items.len(), item.id));
            trail
        },
        Vec::new(),
    );
    assert_eq!(trail, vec!["0/4:1", "1/4:2", "2/4:3", "3/4:4"]);
}

#[test]
fn test_group_by_flatten_reproduces_traversal_within_groups() {
    let list = tasks();
    let groups = list.group_by(|item| item.get_item("Status").to_string());

    assert_eq!(groups.keys().cloned().collect::<Vec<_>>(), vec!["Open", "Closed"]);
    assert_eq!(ListItemCollection::ids(groups.get("Open").unwrap_or_default()), vec![1, 3, 4]);
    assert_eq!(ListItemCollection::ids(groups.get("Closed").unwrap_or_default()), vec![2]);

    let flattened = ListItemCollection::ids(&groups.flatten());
    assert_eq!(flattened, vec![1, 3, 4, 2]);
}

#[test]
fn test_group_by_single_key_keeps_source_order() {
    let list = tasks();
    let groups = list.group_by(|_| ());
    assert_eq!(ListItemCollection::ids(&groups.flatten()), vec![1, 2, 3, 4]);
}

#[test]
fn test_filter_forms_agree() {
    let list = tasks();

    let by_function = list.filter(|item, _, _| item.get_item("Status") == FieldValue::from("Open"));
    let by_map = list.filter_by(fields! { "Status" => "Open" });
    let by_predicate = list.filter_by(Predicate::<ListItemCollection>::function(|item, _, _| {
        item.get_item("Status") == FieldValue::from("Open")
    }));

    assert_eq!(ListItemCollection::ids(&by_function), vec![1, 3, 4]);
    assert_eq!(by_function, by_map);
    assert_eq!(by_function, by_predicate);
}

#[test]
fn test_filter_by_field_names_requires_truthy_values() {
    let list = tasks();

    let by_names = list.filter_by(["Title", "Priority"]);
    let by_function = list.filter(|item, _, _| {
        item.get_item("Title").is_truthy() && item.get_item("Priority").is_truthy()
    });

    assert_eq!(ListItemCollection::ids(&by_names), vec![1, 4]);
    assert_eq!(by_names, by_function);
    assert_eq!(ListItemCollection::ids(&list.filter_by("Title")), vec![1, 3, 4]);
}

#[test]
fn test_compiled_predicates_are_reusable() {
    let list = tasks();
    let is_open = matches::<Rc<ListItem>>(fields! { "Status" => "Open" });
    let has_title = property::<Rc<ListItem>>("Title");

    let both = list.filter(|item, _, _| is_open(item) && has_title(item));
    assert_eq!(ListItemCollection::ids(&both), vec![1, 3, 4]);
    assert_eq!(list.find(|item, _, _| !is_open(item)).map(|item| item.id), Some(2));
}

#[test]
fn test_matches_special_field_values() {
    let list = ListItemCollection::new(vec![
        ListItem::new(
            1,
            &[
                ("AssignedTo", FieldUserValue { lookup_id: 7, lookup_value: Some("Grace".into()), email: None }.into()),
                ("Project", FieldLookupValue { lookup_id: 30, lookup_value: Some("Apollo".into()) }.into()),
                ("Link", FieldUrlValue { url: "/docs/a".into(), description: Some("A".into()) }.into()),
            ],
        ),
        ListItem::new(
            2,
            &[
                ("AssignedTo", FieldUserValue { lookup_id: 8, lookup_value: None, email: None }.into()),
                ("Project", FieldLookupValue { lookup_id: 31, lookup_value: None }.into()),
                ("Link", FieldUrlValue { url: "/docs/b".into(), description: None }.into()),
            ],
        ),
    ]);

    assert_eq!(ListItemCollection::ids(&list.filter_by(fields! { "AssignedTo" => 7 })), vec![1]);
    assert_eq!(ListItemCollection::ids(&list.filter_by(fields! { "Project" => "31" })), vec![2]);
    assert_eq!(ListItemCollection::ids(&list.filter_by(fields! { "Link" => "/docs/b;#" })), vec![2]);
    assert!(list.filter_by(fields! { "AssignedTo" => 7, "Project" => 31 }).is_empty());
}

#[test]
fn test_for_each_short_circuit_on_host_collection() {
    let list = tasks();
    let mut seen = Vec::new();
    list.for_each(|item, index, _| {
        seen.push((index, item.id));
        item.id != 2
    });
    assert_eq!(seen, vec![(0, 1), (1, 2)]);
}

#[test]
fn test_try_for_each_surfaces_iteratee_failure() {
    let list = tasks();
    let result: Result<(), String> = list.try_for_each(|item, _, _| {
        if item.get_item("Title").is_truthy() {
            Ok(())
        } else {
            Err(format!("item {} has no title", item.id))
        }
    });
    assert_eq!(result, Err("item 2 has no title".to_string()));
}

#[test]
#[should_panic(expected = "boom")]
fn test_iteratee_panics_propagate() {
    let list = tasks();
    list.for_each(|item, _, _| {
        if item.id == 3 {
            panic!("boom");
        }
    });
}

#[test]
fn test_items_iterator_interops_with_std() {
    let list = tasks();
    let titles: Vec<String> = list
        .items()
        .filter(|item| item.get_item("Title").is_truthy())
        .map(|item| item.get_item("Title").to_string())
        .collect();
    assert_eq!(titles, vec!["Draft", "Review", "Ship"]);
}
