//! End-to-end behaviour of the engine over JSON records.

use gridline_query::{
    apply_filters, describe, from_query_string, run_query, search, to_query_string,
    ConditionList, ConditionPatch, ConditionValue, EvaluationMode, FieldType, FilterCondition,
    FilterField, Operator, Queryable, SortOrder, TableQuery, TableState,
};
use serde_json::{json, Value as Json};

fn ids(items: &[&Json]) -> Vec<String> {
    items
        .iter()
        .map(|r| match &r["id"] {
            Json::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

fn participants() -> Vec<Json> {
    vec![
        json!({"id": "p1", "name": "Ada Lovelace", "status": "active", "age": 36, "site": "London", "consented": true}),
        json!({"id": "p2", "name": "Grace Hopper", "status": "inactive", "age": 85, "site": "Arlington", "consented": false}),
        json!({"id": "p3", "name": "Alan Turing", "status": "active", "age": 41, "site": "London", "consented": true}),
        json!({"id": "p4", "name": "Edsger Dijkstra", "status": "pending", "age": 72, "site": null, "consented": true}),
        json!({"id": "p5", "name": "Barbara Liskov", "status": "active", "age": "n/a", "site": "Boston"}),
    ]
}

// ============================================================================
// Filter scenarios
// ============================================================================

#[test]
fn status_equals_active_keeps_order() {
    let records = vec![
        json!({"id": "1", "status": "active"}),
        json!({"id": "2", "status": "inactive"}),
        json!({"id": "3", "status": "active"}),
    ];
    let conditions = vec![FilterCondition::new("status", "equals", "active")];
    let result = apply_filters(&records, &conditions, Json::accessor);
    assert_eq!(ids(&result), vec!["1", "3"]);
}

#[test]
fn query_string_decodes_in_order() {
    let conditions = from_query_string("status__equals=active&name__contains=test");
    assert_eq!(conditions.len(), 2);
    assert_eq!(conditions[0].field, "status");
    assert_eq!(conditions[0].operator, Operator::Equals);
    assert_eq!(conditions[0].value, ConditionValue::from("active"));
    assert_eq!(conditions[1].field, "name");
    assert_eq!(conditions[1].operator, Operator::Contains);
}

#[test]
fn conjunction_of_mixed_operators() {
    let data = participants();
    let conditions = vec![
        FilterCondition::new("site", "in", vec!["London", "Boston"]),
        FilterCondition::new("age", "between", (30, 40)),
    ];
    assert_eq!(ids(&apply_filters(&data, &conditions, Json::accessor)), vec!["p1"]);
}

#[test]
fn null_and_missing_fields_fail_everything_but_equals_null() {
    let data = participants();

    let site_is_null = vec![FilterCondition::new("site", "equals", ConditionValue::Null)];
    assert_eq!(ids(&apply_filters(&data, &site_is_null, Json::accessor)), vec!["p4"]);

    let consent_missing = vec![FilterCondition::new("consented", "equals", ConditionValue::Null)];
    assert_eq!(ids(&apply_filters(&data, &consent_missing, Json::accessor)), vec!["p5"]);

    let site_contains = vec![FilterCondition::new("site", "contains", "")];
    assert_eq!(apply_filters(&data, &site_contains, Json::accessor).len(), 4);
}

#[test]
fn non_numeric_values_fail_numeric_comparisons() {
    let data = participants();
    let conditions = vec![FilterCondition::new("age", "gte", 0)];
    assert_eq!(
        ids(&apply_filters(&data, &conditions, Json::accessor)),
        vec!["p1", "p2", "p3", "p4"]
    );
}

#[test]
fn shared_url_filters_reapply() {
    let data = participants();
    let mut list = ConditionList::new();
    list.add("status", "in", vec!["active", "pending"]);
    let name_id = list.add("name", "contains", "a");
    list.update(&name_id, ConditionPatch::new().operator("startsWith"))
        .unwrap();

    let url = to_query_string(list.as_slice());
    assert_eq!(url, "status__in=active%2Cpending&name__startsWith=a");

    let decoded = from_query_string(&url);
    assert_eq!(
        ids(&apply_filters(&data, &decoded, Json::accessor)),
        ids(&list.apply(&data, Json::accessor))
    );
    assert_eq!(ids(&list.apply(&data, Json::accessor)), vec!["p1", "p3"]);
}

#[test]
fn describe_reads_like_a_sentence() {
    let fields = vec![
        FilterField::new("status", "Status", FieldType::Select),
        FilterField::new("age", "Age", FieldType::Number),
    ];
    let conditions = vec![
        FilterCondition::new("status", "equals", "active"),
        FilterCondition::new("age", "gt", 40),
    ];
    assert_eq!(
        describe(&conditions, &fields),
        "Status equals active AND Age gt 40"
    );
}

// ============================================================================
// Search, sort and paging scenarios
// ============================================================================

#[test]
fn search_spans_every_field() {
    let data = participants();
    assert_eq!(ids(&search(&data, "london")), vec!["p1", "p3"]);
    assert_eq!(ids(&search(&data, "N/A")), vec!["p5"]);
    assert_eq!(ids(&search(&data, "85")), vec!["p2"]);
}

#[test]
fn sorting_puts_nulls_last_and_is_stable() {
    let data = participants();
    let page = run_query(&data, &[], "", Some("site"), SortOrder::Asc, 1, 10).unwrap();
    assert_eq!(ids(&page.items), vec!["p2", "p5", "p1", "p3", "p4"]);

    let page = run_query(&data, &[], "", Some("site"), SortOrder::Desc, 1, 10).unwrap();
    assert_eq!(ids(&page.items), vec!["p4", "p1", "p3", "p5", "p2"]);
}

#[test]
fn twenty_five_items_page_ninety_nine() {
    let data: Vec<Json> = (1..=25).map(|i| json!({"id": i})).collect();
    let page = run_query(&data, &[], "", None, SortOrder::Asc, 99, 10).unwrap();
    assert_eq!(page.current_page, 3);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 5);
    assert!(!page.has_next_page());
    assert!(page.has_prev_page());
}

#[test]
fn full_pipeline() {
    let data = participants();
    let page = TableQuery::new()
        .conditions(from_query_string("status__equals=active"))
        .search("a")
        .sort_by("age")
        .order(SortOrder::Desc)
        .page_size(2)
        .run(&data)
        .unwrap();

    // age "n/a" is a string, which sorts after every number.
    assert_eq!(page.total_items, 3);
    assert_eq!(ids(&page.items), vec!["p5", "p3"]);
    assert!(page.has_next_page());

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["hasNextPage"], true);
    assert_eq!(json["totalPages"], 2);
    assert_eq!(json["items"][0]["id"], "p5");
}

#[test]
fn strict_mode_surfaces_bad_urls() {
    let data = participants();
    let conditions = from_query_string("status__like=act");
    let lenient = TableQuery::new().conditions(conditions.clone()).run(&data);
    assert_eq!(lenient.unwrap().total_items, 5);

    let strict = TableQuery::new()
        .conditions(conditions)
        .mode(EvaluationMode::Strict)
        .run(&data);
    assert!(strict.is_err());
}

#[test]
fn table_state_follows_the_user() {
    let data = participants();
    let mut state = TableState::new(2);
    state.toggle_sort("name");
    state.set_page(3);

    let page = state.run(&data).unwrap();
    assert_eq!(ids(&page.items), vec!["p2"]);

    state.set_search("london");
    let page = state.run(&data).unwrap();
    assert_eq!(page.current_page, 1);
    assert_eq!(ids(&page.items), vec!["p1", "p3"]);
}
