use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use studycal_core::{
    CalendarController, DateKey, LookupError, MemoryStudyStore, StoreError, StudiedDateLookup,
    StudiedDateSet, StudyRecord, UserSession,
};

fn key(value: u32) -> DateKey {
    DateKey::try_from(value).unwrap()
}

fn set(values: &[u32]) -> StudiedDateSet {
    values.iter().map(|value| key(*value)).collect()
}

#[test]
fn starts_on_today_with_forward_navigation_disabled() {
    let mut controller = CalendarController::new(key(20240315), key(20240315));

    assert_eq!(controller.anchor(), key(20240315));
    assert!(!controller.can_show_next_month());
    assert_eq!(controller.show_next_month(), None);
    assert_eq!(controller.anchor(), key(20240315));
}

#[test]
fn navigating_back_and_forward_clamps_to_today() {
    let today = key(20240315);
    let mut controller = CalendarController::new(today, today);

    controller.show_previous_month();
    controller.show_previous_month();
    controller.show_previous_month();
    assert_eq!(controller.anchor(), key(20231201));
    assert!(controller.can_show_next_month());

    let query = controller.show_next_month().expect("forward enabled");
    assert_eq!(query.anchor(), key(20240101));
    controller.show_next_month().expect("forward enabled");
    let landed = controller.show_next_month().expect("forward enabled");

    assert_eq!(landed.anchor(), today);
    assert_eq!(controller.anchor(), today);
    assert!(!controller.can_show_next_month());
}

#[test]
fn stale_results_are_ignored() {
    let mut controller = CalendarController::new(key(20240315), key(20240315));
    let march = controller.refresh_current();
    let february = controller.show_previous_month();

    assert!(!controller.apply_studied(march, Ok(set(&[20240301]))));
    assert!(controller.studied().is_empty());

    assert!(controller.apply_studied(february, Ok(set(&[20240203, 20240229]))));
    assert_eq!(controller.studied(), &set(&[20240203, 20240229]));
    assert!(march.generation() < february.generation());
}

#[test]
fn refresh_clears_markers_from_the_previous_month() {
    let mut controller = CalendarController::new(key(20240315), key(20240315));
    let query = controller.refresh_current();
    controller.apply_studied(query, Ok(set(&[20240301])));
    assert_eq!(controller.studied().len(), 1);

    controller.show_previous_month();
    assert!(controller.studied().is_empty());
}

#[test]
fn lookup_failure_fails_open_to_no_markers() {
    let mut controller = CalendarController::new(key(20240315), key(20240315));
    let query = controller.refresh_current();

    let applied = controller.apply_studied(
        query,
        Err(LookupError::Store {
            day: Some(key(20240315)),
            source: StoreError::Unavailable("offline".to_string()),
        }),
    );

    assert!(applied);
    assert!(controller.studied().is_empty());
    assert!(controller
        .view()
        .rows
        .iter()
        .flatten()
        .all(|cell| !cell.studied));
}

#[test]
fn markers_outside_the_displayed_month_are_dropped() {
    let mut controller = CalendarController::new(key(20240315), key(20240315));
    let query = controller.refresh_current();

    controller.apply_studied(query, Ok(set(&[20240229, 20240302])));

    assert_eq!(controller.studied(), &set(&[20240302]));
}

#[test]
fn taps_on_fillers_are_inert_and_real_days_fire_callback() {
    let tapped: Arc<Mutex<Vec<DateKey>>> = Arc::default();
    let sink = Arc::clone(&tapped);
    // March 2024: 5 leading fillers, days at indices 5..=35.
    let mut controller = CalendarController::new(key(20240315), key(20240315))
        .with_selection_callback(move |date| sink.lock().unwrap().push(date));

    assert_eq!(controller.tap(0), None);
    assert_eq!(controller.tap(4), None);
    assert_eq!(controller.tap(36), None);
    assert_eq!(controller.tap(41), None);
    assert_eq!(controller.tap(5), Some(key(20240301)));
    // A day after today in the current month stays selectable.
    assert_eq!(controller.tap(35), Some(key(20240331)));

    assert_eq!(controller.selected(), key(20240331));
    assert_eq!(*tapped.lock().unwrap(), vec![key(20240301), key(20240331)]);
}

#[test]
fn view_renders_studied_markers_and_trailing_labels() {
    let mut controller = CalendarController::new(key(20240315), key(20240310));
    let query = controller.refresh_current();
    controller.apply_studied(query, Ok(set(&[20240305, 20240310])));

    let view = controller.view();
    assert_eq!(view.title, "2024.03");
    assert_eq!(view.weekday_labels[0], "일");
    assert_eq!(view.rows.len(), 6);

    let cells: Vec<_> = view.rows.iter().flatten().collect();
    let studied: BTreeSet<_> = cells
        .iter()
        .filter(|cell| cell.studied)
        .filter_map(|cell| cell.date)
        .collect();
    assert_eq!(studied, set(&[20240305, 20240310]));

    let trailing: Vec<_> = cells[36..].iter().map(|cell| cell.label).collect();
    assert_eq!(trailing, vec![1, 2, 3, 4, 5, 6]);
    assert!(cells[36..].iter().all(|cell| cell.date.is_none()));
    assert!(cells.iter().filter(|cell| cell.selected).count() == 1);
}

#[tokio::test]
async fn load_fetches_markers_for_the_signed_in_user() {
    let store = Arc::new(MemoryStudyStore::new());
    store
        .insert_record("mina", StudyRecord::new(key(20240302), "math", 30))
        .unwrap();
    let lookup = StudiedDateLookup::new(store);
    let session = UserSession::new();
    session.sign_in("mina").unwrap();

    let mut controller = CalendarController::new(key(20240315), key(20240315));
    assert!(controller.load(&lookup, session.current().as_ref()).await);
    assert_eq!(controller.studied(), &set(&[20240302]));

    session.logout();
    assert!(controller.load(&lookup, session.current().as_ref()).await);
    assert!(controller.studied().is_empty());
}
