use rusqlite::Connection;
use stockpile_core::db::open_db_in_memory;
use stockpile_core::{
    Item, ItemQuery, ItemRepository, ItemService, NewItem, ReorderError, SortDirection, SortKey,
    SqliteItemRepository,
};

const LIST: &str = "Pantry";

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn seed(service: &ItemService<SqliteItemRepository<'_>>, names: &[&str]) {
    for name in names {
        service.create_item(&NewItem::new(LIST, *name)).unwrap();
    }
}

fn names(items: &[Item]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}

fn stored(service: &ItemService<SqliteItemRepository<'_>>) -> Vec<Item> {
    service.list_items(&ItemQuery::new(LIST)).unwrap()
}

#[test]
fn drag_steps_stay_in_memory_until_finish() {
    let conn = setup();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    seed(&service, &["A", "B", "C", "D"]);

    let mut session = service.begin_reorder(LIST).unwrap();
    session.move_item(0, 1).unwrap();
    session.move_item(1, 2).unwrap();
    assert_eq!(names(session.items()), ["B", "C", "A", "D"]);
    assert_eq!(names(&stored(&service)), ["A", "B", "C", "D"]);

    assert_eq!(service.finish_reorder(session).unwrap(), 4);

    let after = stored(&service);
    assert_eq!(names(&after), ["B", "C", "A", "D"]);
    let orders: Vec<i64> = after.iter().map(|item| item.order).collect();
    assert_eq!(orders, [0, 1, 2, 3]);
}

#[test]
fn persisted_order_round_trips_through_order_sort() {
    let conn = setup();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    seed(&service, &["A", "B", "C", "D", "E"]);

    let mut session = service.begin_reorder(LIST).unwrap();
    session.move_item(4, 0).unwrap();
    session.move_item(2, 3).unwrap();
    let expected: Vec<String> = session.items().iter().map(|i| i.name.clone()).collect();
    service.finish_reorder(session).unwrap();

    let ascending = service
        .list_items(&ItemQuery::new(LIST).sort_by(SortKey::Order, SortDirection::Ascending))
        .unwrap();
    assert_eq!(names(&ascending), expected);
    assert_eq!(names(&ascending), ["E", "A", "C", "B", "D"]);
}

#[test]
fn finish_without_moves_writes_nothing() {
    let conn = setup();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    seed(&service, &["A", "B"]);

    let mut session = service.begin_reorder(LIST).unwrap();
    session.move_item(1, 1).unwrap();
    assert!(!session.has_moves());
    assert_eq!(service.finish_reorder(session).unwrap(), 0);
}

#[test]
fn out_of_bounds_step_is_rejected_and_leaves_session_intact() {
    let conn = setup();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    seed(&service, &["A", "B"]);

    let mut session = service.begin_reorder(LIST).unwrap();
    let err = session.move_item(0, 2).unwrap_err();
    assert_eq!(err, ReorderError::IndexOutOfBounds { index: 2, len: 2 });
    assert_eq!(names(session.items()), ["A", "B"]);
    assert!(!session.has_moves());
}

#[test]
fn finish_repairs_duplicate_orders() {
    let conn = setup();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    for name in ["A", "B", "C"] {
        repo.create_item(&NewItem::new(LIST, name)).unwrap();
    }
    let mut tied = repo.query_items(&ItemQuery::new(LIST)).unwrap();
    for item in &mut tied {
        item.order = 7;
    }
    repo.update_items(&tied).unwrap();

    let service = ItemService::new(repo);
    let session = service.begin_reorder(LIST).unwrap();
    assert_eq!(names(session.items()), ["A", "B", "C"]);
    assert_eq!(service.finish_reorder(session).unwrap(), 3);

    let orders: Vec<i64> = stored(&service).iter().map(|item| item.order).collect();
    assert_eq!(orders, [0, 1, 2]);
}

#[test]
fn discarded_session_never_touches_storage() {
    let conn = setup();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    seed(&service, &["A", "B", "C"]);

    let mut session = service.begin_reorder(LIST).unwrap();
    session.move_item(2, 0).unwrap();
    assert_eq!(names(session.items()), ["C", "A", "B"]);
    drop(session);

    assert_eq!(names(&stored(&service)), ["A", "B", "C"]);
}

#[test]
fn finish_keeps_edits_made_during_the_drag() {
    let conn = setup();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    seed(&service, &["A", "B", "C"]);
    let a = stored(&service)[0].id;

    let mut session = service.begin_reorder(LIST).unwrap();
    session.move_item(0, 1).unwrap();
    assert_eq!(service.rename_item(a, "Apples").unwrap(), 1);
    assert_eq!(service.set_amount(a, "4").unwrap(), 1);
    assert_eq!(service.toggle_full(a).unwrap(), 1);

    assert_eq!(service.finish_reorder(session).unwrap(), 3);

    let after = stored(&service);
    assert_eq!(names(&after), ["B", "Apples", "C"]);
    assert_eq!(after[1].amount, 4.0);
    assert!(after[1].is_full);
}

#[test]
fn finish_skips_items_moved_to_another_list_meanwhile() {
    let conn = setup();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    seed(&service, &["A", "B", "C"]);
    let c = stored(&service)[2].id;

    let mut session = service.begin_reorder(LIST).unwrap();
    session.move_item(2, 0).unwrap();
    service.move_item_to_list(c, "Garage").unwrap().unwrap();

    assert_eq!(service.finish_reorder(session).unwrap(), 2);
    assert_eq!(names(&stored(&service)), ["A", "B"]);
    let garage = service.list_items(&ItemQuery::new("Garage")).unwrap();
    assert_eq!(names(&garage), ["C"]);
}

#[test]
fn reorder_of_one_list_leaves_other_lists_alone() {
    let conn = setup();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    seed(&service, &["A", "B"]);
    service.create_item(&NewItem::new("Garage", "oil")).unwrap();
    service.create_item(&NewItem::new("Garage", "rag")).unwrap();

    let mut session = service.begin_reorder(LIST).unwrap();
    session.move_item(0, 1).unwrap();
    service.finish_reorder(session).unwrap();

    let garage = service.list_items(&ItemQuery::new("Garage")).unwrap();
    assert_eq!(names(&garage), ["oil", "rag"]);
    assert_eq!(names(&stored(&service)), ["B", "A"]);
}
