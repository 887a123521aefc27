//! Integration tests for the `#[derive(Queryable)]` macro.

#![allow(dead_code)] // skipped fields are never read

use gridline_macros::Queryable as DeriveQueryable;
use gridline_query::{
    apply_filters, search, FilterCondition, Number, Queryable, SortOrder, TableQuery, Value,
};

#[derive(Debug, DeriveQueryable)]
struct Dataset {
    #[query(skip_search)]
    id: String,
    title: String,
    #[query(rename = "rowCount")]
    rows: u64,
    published: bool,
    owner: Option<String>,
    tags: Vec<String>,
    #[query(skip)]
    payload: Vec<u8>,
}

fn datasets() -> Vec<Dataset> {
    vec![
        Dataset {
            id: "d1".into(),
            title: "Clinic visits".into(),
            rows: 1200,
            published: true,
            owner: Some("ada".into()),
            tags: vec!["health".into(), "2024".into()],
            payload: vec![1, 2, 3],
        },
        Dataset {
            id: "d2".into(),
            title: "Survey answers".into(),
            rows: 80,
            published: false,
            owner: None,
            tags: vec![],
            payload: vec![],
        },
        Dataset {
            id: "d3".into(),
            title: "Lab panel d1".into(),
            rows: 450,
            published: true,
            owner: Some("grace".into()),
            tags: vec!["lab".into()],
            payload: vec![],
        },
    ]
}

fn ids<'a>(items: impl IntoIterator<Item = &'a &'a Dataset>) -> Vec<&'a str> {
    items.into_iter().map(|d| d.id.as_str()).collect()
}

#[test]
fn field_constants_use_query_names() {
    assert_eq!(Dataset::ID, "id");
    assert_eq!(Dataset::TITLE, "title");
    assert_eq!(Dataset::ROW_COUNT, "rowCount");
    assert_eq!(
        Dataset::FIELDS,
        &["id", "title", "rowCount", "published", "owner", "tags"]
    );
}

#[test]
fn field_values_by_name() {
    let data = datasets();
    let first = &data[0];
    assert_eq!(first.field_value("title"), Value::String("Clinic visits"));
    assert_eq!(first.field_value("rowCount"), Value::Number(Number::U64(1200)));
    assert_eq!(first.field_value("published"), Value::Bool(true));
    assert_eq!(
        first.field_value("tags"),
        Value::Array(vec![Value::String("health"), Value::String("2024")])
    );
    assert_eq!(data[1].field_value("owner"), Value::Null);
}

#[test]
fn renamed_and_skipped_fields_are_not_addressable_by_rust_name() {
    let data = datasets();
    assert_eq!(data[0].field_value("rows"), Value::Null);
    assert_eq!(data[0].field_value("payload"), Value::Null);
}

#[test]
fn derived_accessor_drives_filters() {
    let data = datasets();
    let conditions = vec![
        FilterCondition::new(Dataset::PUBLISHED, "equals", true),
        FilterCondition::new(Dataset::ROW_COUNT, "lt", 1000),
    ];
    let result = apply_filters(&data, &conditions, Dataset::accessor);
    assert_eq!(ids(&result), vec!["d3"]);
}

#[test]
fn skip_search_fields_are_not_searched() {
    let data = datasets();
    // "d1" appears as d1's id (not searched) and in d3's title (searched).
    assert_eq!(ids(&search(&data, "d1")), vec!["d3"]);
    assert_eq!(ids(&search(&data, "HEALTH")), vec!["d1"]);
}

#[test]
fn derived_records_run_full_queries() {
    let data = datasets();
    let page = TableQuery::new()
        .sort_by(Dataset::ROW_COUNT)
        .order(SortOrder::Desc)
        .page_size(2)
        .run(&data)
        .unwrap();
    assert_eq!(ids(&page.items), vec!["d1", "d3"]);
    assert_eq!(page.total_pages, 2);
}
