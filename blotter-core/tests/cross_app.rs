//! End-to-end: a desk app drafts an order, sends it to the combined app,
//! and the combined app executes it to completion — all over the shared
//! in-process bus.

use blotter_core::{
    AppName, ContextBus, FillSettings, InProcessBus, OrderDraft, OrderStatus, Session,
    SessionEvent,
};
use chrono::NaiveDate;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn fast_fill() -> FillSettings {
    FillSettings {
        tick: Duration::from_millis(5),
        fraction: 0.25,
    }
}

fn pump_until<F>(session: &mut Session, mut found: F) -> Vec<SessionEvent>
where
    F: FnMut(&SessionEvent) -> bool,
{
    let mut seen = Vec::new();
    for _ in 0..400 {
        for event in session.pump() {
            let hit = found(&event);
            seen.push(event);
            if hit {
                return seen;
            }
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("expected event never arrived; saw: {seen:?}");
}

#[test]
fn desk_to_combined_round_trip_with_execution() {
    let bus = Arc::new(InProcessBus::new());
    let shared: Arc<dyn ContextBus> = bus.clone();

    let mut desk = Session::connect(AppName::new("desk"), Arc::clone(&shared), fast_fill());
    let mut combined = Session::connect(AppName::combined(), Arc::clone(&shared), fast_fill());

    // Draft the canonical demo order.
    let draft = OrderDraft {
        ticker: "AAPL".to_string(),
        target_price: 42.0,
        target_quantity: 200,
        trade_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        ..OrderDraft::default()
    };
    let id = desk.submit(draft).unwrap();

    let order = desk.store().get(id).unwrap().clone();
    assert_eq!(order.target_amount, 8400.0);
    assert_eq!(
        order.settlement_date,
        NaiveDate::from_ymd_opt(2024, 1, 12).unwrap()
    );
    assert_eq!(order.status, OrderStatus::New);
    assert_eq!(order.executed_quantity, 0);

    // Send it across; the combined app picks it up as NEW.
    desk.send_to(id, &AppName::combined()).unwrap();
    let events = pump_until(&mut combined, |e| {
        matches!(e, SessionEvent::OrderArrived { .. })
    });
    assert!(matches!(
        events.last().unwrap(),
        SessionEvent::OrderArrived { ticker, from, target_amount, .. }
            if ticker == "AAPL" && from.as_str() == "desk" && *target_amount == 8400.0
    ));
    assert_eq!(combined.store().len(), 1);

    // Combined executes its copy: 50 / 100 / 150 / 200-and-FILLED.
    combined.execute(id).unwrap();
    let events = pump_until(&mut combined, |e| {
        matches!(e, SessionEvent::OrderFilled { .. })
    });
    let progress: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::FillProgress { executed_quantity, .. } => Some(*executed_quantity),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![50, 100, 150]);

    let filled = combined.store().get(id).unwrap();
    assert_eq!(filled.status, OrderStatus::Filled);
    assert_eq!(filled.executed_quantity, 200);

    // The two apps hold independent copies: the desk's original is untouched
    // by the combined app's execution (its progress broadcasts are
    // self-filtered on the desk, which originated the order).
    thread::sleep(Duration::from_millis(20));
    desk.pump();
    let original = desk.store().get(id).unwrap();
    assert_eq!(original.status, OrderStatus::New);
    assert_eq!(original.executed_quantity, 0);

    // Teardown releases both apps' listeners (two context types each).
    assert_eq!(bus.listener_count(None), 4);
    combined.shutdown();
    desk.shutdown();
    assert_eq!(bus.listener_count(None), 0);
}

#[test]
fn late_subscribers_miss_earlier_broadcasts() {
    let bus = Arc::new(InProcessBus::new());
    let shared: Arc<dyn ContextBus> = bus.clone();

    let mut desk = Session::connect(AppName::new("desk"), Arc::clone(&shared), fast_fill());
    let id = desk.submit(OrderDraft::default()).unwrap();

    // Nobody is listening as "combined" yet; the send is lost.
    desk.send_to(id, &AppName::combined()).unwrap();

    let mut combined = Session::connect(AppName::combined(), Arc::clone(&shared), fast_fill());
    thread::sleep(Duration::from_millis(20));
    assert!(combined.pump().is_empty());
    assert!(combined.store().is_empty());

    // A second send after the subscription exists is delivered.
    desk.send_to(id, &AppName::combined()).unwrap();
    pump_until(&mut combined, |e| {
        matches!(e, SessionEvent::OrderArrived { .. })
    });
    assert_eq!(combined.store().len(), 1);
}
