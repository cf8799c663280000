//! Connectivity flag: single writer, many readers, change notifications.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use pos_ledger::connectivity::{self, Connectivity};
use pos_ledger::{ErrorKind, Ledger, LedgerConfig};
use serde_json::json;

#[test]
fn starts_from_configuration() {
    let (ledger, _network) = Ledger::in_memory(LedgerConfig::for_store("store-7"));
    assert_eq!(ledger.connectivity().status(), Connectivity::Offline);

    let mut config = LedgerConfig::for_store("store-7");
    config.start_online = true;
    let (ledger, _network) = Ledger::in_memory(config);
    assert!(ledger.connectivity().is_online());
}

#[test]
fn readers_on_other_threads_see_updates() {
    let (network, state) = connectivity::channel(Connectivity::Offline);
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let state = state.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    if state.is_online() {
                        return true;
                    }
                    thread::sleep(Duration::from_millis(1));
                }
                false
            })
        })
        .collect();

    network.set(Connectivity::Online);
    assert!(readers.into_iter().all(|reader| reader.join().unwrap()));
}

#[test]
fn subscribers_receive_each_transition() {
    let (network, state) = connectivity::channel(Connectivity::Offline);
    let heard = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&heard);
    state.subscribe(move |online: bool| {
        if let Ok(mut heard) = sink.lock() {
            heard.push(online);
        }
    });

    network.set(Connectivity::Online);
    // EventEmitter delivers on background threads
    thread::sleep(Duration::from_millis(50));
    network.set(Connectivity::Offline);
    thread::sleep(Duration::from_millis(50));

    assert_eq!(*heard.lock().unwrap(), vec![true, false]);
}

#[test]
fn dropping_offline_mid_session_only_affects_remote_calls() {
    let mut config = LedgerConfig::for_store("store-7");
    config.start_online = true;
    let (ledger, network) = Ledger::in_memory(config);
    assert!(ledger.wholesalers().is_ok());

    network.set_online(false);
    assert_eq!(
        ledger.wholesalers().unwrap_err().kind(),
        ErrorKind::NetworkUnavailable
    );

    let sale = ledger
        .sales()
        .create(json!({"date": "2024-03-01T09:00:00Z", "total": 5, "paymentMethod": "cash"}))
        .unwrap();
    assert!(ledger.sales().get_by_id(sale.data.id.as_str()).is_ok());
}
