use rusqlite::Connection;
use stockpile_core::db::open_db_in_memory;
use stockpile_core::{
    AmountComparison, Item, ItemFilter, ItemQuery, ItemRepository, ItemSearch, NewItem,
    SortDirection, SortKey, SqliteItemRepository,
};

const LIST: &str = "Pantry";

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn seed(repo: &SqliteItemRepository<'_>, rows: &[(&str, f64, bool)]) {
    for (name, amount, is_full) in rows {
        repo.create_item(
            &NewItem::new(LIST, *name)
                .with_amount(*amount)
                .with_full(*is_full),
        )
        .unwrap();
    }
}

fn names(items: &[Item]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}

#[test]
fn delete_where_empty_removes_only_zero_amounts() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[("a", 0.0, false), ("b", 5.0, false), ("c", 0.0, false), ("d", 3.0, false)],
    );

    assert_eq!(repo.delete_where(LIST, ItemFilter::Empty).unwrap(), 2);

    let left = repo.query_items(&ItemQuery::new(LIST)).unwrap();
    assert_eq!(names(&left), ["b", "d"]);
}

#[test]
fn delete_where_is_scoped_to_one_list() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(&repo, &[("a", 0.0, false)]);
    repo.create_item(&NewItem::new("Garage", "oil")).unwrap();

    assert_eq!(repo.delete_where(LIST, ItemFilter::All).unwrap(), 1);
    assert_eq!(repo.query_items(&ItemQuery::new("Garage")).unwrap().len(), 1);
}

#[test]
fn delete_where_leftover_and_full_follow_state_rules() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[
            ("empty", 0.0, false),
            ("leftover", 2.0, false),
            ("full", 4.0, true),
            ("full-empty", 0.0, true),
        ],
    );

    assert_eq!(repo.delete_where(LIST, ItemFilter::Leftover).unwrap(), 1);
    assert_eq!(repo.delete_where(LIST, ItemFilter::Full).unwrap(), 2);
    let left = repo.query_items(&ItemQuery::new(LIST)).unwrap();
    assert_eq!(names(&left), ["empty"]);
}

#[test]
fn query_filters_by_state() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[("a", 0.0, false), ("b", 2.0, false), ("c", 4.0, true)],
    );

    let empty = repo
        .query_items(&ItemQuery::new(LIST).filter(ItemFilter::Empty))
        .unwrap();
    let leftover = repo
        .query_items(&ItemQuery::new(LIST).filter(ItemFilter::Leftover))
        .unwrap();
    let full = repo
        .query_items(&ItemQuery::new(LIST).filter(ItemFilter::Full))
        .unwrap();

    assert_eq!(names(&empty), ["a"]);
    assert_eq!(names(&leftover), ["b"]);
    assert_eq!(names(&full), ["c"]);
}

#[test]
fn query_sorts_by_name_case_insensitively() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[("pasta", 1.0, false), ("Apples", 1.0, false), ("beans", 1.0, false)],
    );

    let ascending = repo
        .query_items(&ItemQuery::new(LIST).sort_by(SortKey::Name, SortDirection::Ascending))
        .unwrap();
    let descending = repo
        .query_items(&ItemQuery::new(LIST).sort_by(SortKey::Name, SortDirection::Descending))
        .unwrap();

    assert_eq!(names(&ascending), ["Apples", "beans", "pasta"]);
    assert_eq!(names(&descending), ["pasta", "beans", "Apples"]);
}

#[test]
fn query_sorts_by_amount_with_insertion_order_tiebreak() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[
            ("first-two", 2.0, false),
            ("one", 1.0, false),
            ("second-two", 2.0, false),
            ("three", 3.0, false),
        ],
    );

    let ascending = repo
        .query_items(&ItemQuery::new(LIST).sort_by(SortKey::Amount, SortDirection::Ascending))
        .unwrap();
    let descending = repo
        .query_items(&ItemQuery::new(LIST).sort_by(SortKey::Amount, SortDirection::Descending))
        .unwrap();

    assert_eq!(
        names(&ascending),
        ["one", "first-two", "second-two", "three"]
    );
    assert_eq!(
        names(&descending),
        ["three", "first-two", "second-two", "one"]
    );
}

#[test]
fn query_combines_filter_and_sort() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[("c", 3.0, false), ("a", 0.0, false), ("b", 1.0, false)],
    );

    let leftovers = repo
        .query_items(
            &ItemQuery::new(LIST)
                .filter(ItemFilter::Leftover)
                .sort_by(SortKey::Name, SortDirection::Ascending),
        )
        .unwrap();
    assert_eq!(names(&leftovers), ["b", "c"]);
}

#[test]
fn search_amount_at_most_zero_returns_empty_items_in_order() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[("a", 0.0, false), ("b", 5.0, false), ("c", 0.0, true), ("d", 3.0, false)],
    );

    let search = ItemSearch::Amount {
        comparison: AmountComparison::LessOrEqual,
        value: 0.0,
    };
    let hits = repo.search_items(LIST, &search).unwrap();

    assert_eq!(names(&hits), ["a", "c"]);
    assert!(hits.windows(2).all(|pair| pair[0].order < pair[1].order));
}

#[test]
fn search_amount_comparisons_cover_every_operator() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[("zero", 0.0, false), ("two", 2.0, false), ("four", 4.0, false)],
    );

    let cases = [
        ("= 2", vec!["two"]),
        ("!= 2", vec!["zero", "four"]),
        ("< 2", vec!["zero"]),
        ("<= 2", vec!["zero", "two"]),
        ("> 2", vec!["four"]),
        (">= 2", vec!["two", "four"]),
    ];
    for (input, expected) in cases {
        let search = ItemSearch::parse_amount(input).unwrap();
        let hits = repo.search_items(LIST, &search).unwrap();
        assert_eq!(names(&hits), expected, "filter {input}");
    }
}

#[test]
fn search_keyword_is_case_insensitive_substring() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[("Brown Rice", 1.0, false), ("rice flour", 1.0, false), ("beans", 1.0, false)],
    );

    let hits = repo
        .search_items(
            LIST,
            &ItemSearch::Keyword {
                keyword: "RICE".to_string(),
            },
        )
        .unwrap();
    assert_eq!(names(&hits), ["Brown Rice", "rice flour"]);

    let everything = repo
        .search_items(
            LIST,
            &ItemSearch::Keyword {
                keyword: "  ".to_string(),
            },
        )
        .unwrap();
    assert_eq!(everything.len(), 3);
}

#[test]
fn search_keyword_treats_wildcards_literally() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(&repo, &[("100% juice", 1.0, false), ("water", 1.0, false)]);

    let hits = repo
        .search_items(
            LIST,
            &ItemSearch::Keyword {
                keyword: "%".to_string(),
            },
        )
        .unwrap();
    assert_eq!(names(&hits), ["100% juice"]);
}

#[test]
fn search_exact_name_matches_whole_name_only() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    seed(&repo, &[("rice", 1.0, false), ("brown rice", 1.0, false)]);
    repo.create_item(&NewItem::new("Garage", "rice")).unwrap();

    let hits = repo
        .search_items(
            LIST,
            &ItemSearch::ExactName {
                name: " rice ".to_string(),
            },
        )
        .unwrap();
    assert_eq!(names(&hits), ["rice"]);
    assert_eq!(hits[0].list_name, LIST);
}
