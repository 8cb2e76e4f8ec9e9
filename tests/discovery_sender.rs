use omt_core::{Discovery, Name};
use omt_core::sender::{Sender, SenderCallbacks};
use std::time::Duration;

#[test]
#[ignore = "exercises real mDNS sockets; run explicitly in an environment with multicast"]
fn discovery_finds_advertised_sender() {
    let name = Name::new(format!("omt-core-test-sender-{}", std::process::id()));
    let sender = Sender::start_source(0, name.clone(), false, None, SenderCallbacks::default())
        .expect("start sender");

    let browser = Discovery::browse().expect("start browse session");
    let addresses = browser.get_addresses_with_backoff(
        10,
        Duration::from_millis(200),
        Duration::from_millis(500),
        1.5,
    );

    assert!(
        addresses.iter().any(|addr| addr.as_str().contains(name.as_str())),
        "expected discovery to find sender '{}' on port {} among {:?}",
        name,
        sender.port(),
        addresses
    );
}
