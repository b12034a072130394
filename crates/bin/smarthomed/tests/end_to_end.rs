//! End-to-end tests for the full smarthomed stack.
//!
//! Each test starts the complete runtime (descriptor modules from the
//! embedded virtual binding and a scratch addons directory, real registries,
//! real thing manager, real handlers) and drives it the way `main` does.

use std::path::{Path, PathBuf};
use std::time::Duration;

use smarthome_domain::command::{Command, State};
use smarthome_domain::event::EventKind;
use smarthome_domain::thing::{ThingStatus, ThingStatusDetail};
use smarthome_domain::uid::{ChannelUID, ThingUID};
use smarthomed::config::Config;
use smarthomed::runtime::Runtime;

const ACME_THINGS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<thing:thing-descriptions bindingId="acme"
    xmlns:thing="https://openhab.org/schemas/thing-description/v1.0.0">
    <thing-type id="plug">
        <label>Plug</label>
        <channels>
            <channel id="switch" typeId="system.power"/>
            <channel id="load" typeId="load"/>
        </channels>
        <config-description-ref uri="thing-type:acme:plug"/>
    </thing-type>
    <channel-type id="load">
        <item-type>Number:Power</item-type>
        <label>Load</label>
        <state readOnly="true" pattern="%.1f W"/>
    </channel-type>
</thing:thing-descriptions>"#;

const ACME_CONFIG: &str = r#"<config-descriptions>
    <config-description uri="thing-type:acme:plug">
        <parameter name="address" type="text" required="true"/>
        <parameter name="interval" type="integer"><default>60</default></parameter>
    </config-description>
</config-descriptions>"#;

const ACME_GERMAN: &str = "thing-type.acme.plug.label = Steckdose\n";

const THINGS: &str = "
    [[things]]
    uid = 'virtual:light:home:lamp'
    thing_type = 'virtual:light'
    bridge = 'virtual:hub:home'
    label = 'Desk lamp'
    location = 'Office'

    [[things]]
    uid = 'virtual:hub:home'
    thing_type = 'virtual:hub'

    [[things]]
    uid = 'virtual:sensor:home:kitchen'
    thing_type = 'virtual:sensor'
    bridge = 'virtual:hub:home'

    [things.configuration]
    refresh = 1

    [[things]]
    uid = 'acme:plug:desk'
    thing_type = 'acme:plug'

    [things.configuration]
    address = '10.0.0.7'

    [[things]]
    uid = 'ghost:thing:one'
    thing_type = 'ghost:thing'
";

fn scratch_addons() -> PathBuf {
    let root = std::env::temp_dir().join(format!("smarthomed-{}", uuid::Uuid::new_v4()));
    let module = root.join("acme").join("ESH-INF");
    write(&module.join("thing").join("plug.xml"), ACME_THINGS);
    write(&module.join("config").join("plug.xml"), ACME_CONFIG);
    write(&module.join("i18n").join("acme_de.properties"), ACME_GERMAN);
    root
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn config() -> Config {
    let mut config: Config = toml::from_str(THINGS).unwrap();
    config.addons.dir = Some(scratch_addons());
    config.runtime.locale = Some("de".to_string());
    config
}

async fn wait_for(runtime: &Runtime, uid: &ThingUID, status: ThingStatus) -> ThingStatusDetail {
    tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            if let Some(thing) = runtime.manager().thing(uid)
                && thing.status() == status
            {
                return thing.status_info().detail;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap()
}

fn uid(raw: &str) -> ThingUID {
    raw.parse().unwrap()
}

#[tokio::test]
async fn should_load_embedded_and_directory_modules() {
    let config = config();
    let runtime = Runtime::start(&config).await.unwrap();

    let modules: Vec<&str> = runtime.modules().iter().map(|m| m.as_str()).collect();
    assert_eq!(modules, vec!["virtual", "acme"]);

    let registries = runtime.registries();
    let locale = "de".parse().unwrap();
    let plug = registries
        .thing_types
        .get(&"acme:plug".parse().unwrap(), Some(&locale))
        .unwrap();
    assert_eq!(plug.label, "Steckdose");
    assert!(
        registries
            .channel_types
            .get(&"acme:load".parse().unwrap(), None)
            .unwrap()
            .state
            .unwrap()
            .read_only
    );
    assert!(
        registries
            .config_descriptions
            .get(&"thing-type:virtual:sensor".to_string(), None)
            .is_some()
    );
}

#[tokio::test]
async fn should_run_configured_things() {
    let config = config();
    let runtime = Runtime::start(&config).await.unwrap();

    let added = runtime.create_things(&config.things);

    assert_eq!(added.len(), 4);
    let hub = uid("virtual:hub:home");
    let lamp = uid("virtual:light:home:lamp");
    let kitchen = uid("virtual:sensor:home:kitchen");
    wait_for(&runtime, &hub, ThingStatus::Online).await;
    wait_for(&runtime, &lamp, ThingStatus::Online).await;
    wait_for(&runtime, &kitchen, ThingStatus::Online).await;

    let lamp_thing = runtime.manager().thing(&lamp).unwrap();
    assert_eq!(lamp_thing.label(), Some("Desk lamp"));
    assert_eq!(lamp_thing.location(), Some("Office"));
    assert_eq!(runtime.manager().children_of(&hub).len(), 2);
}

#[tokio::test]
async fn should_leave_things_without_binding_uninitialized() {
    let config = config();
    let runtime = Runtime::start(&config).await.unwrap();
    runtime.create_things(&config.things);

    let plug = runtime.manager().thing(&uid("acme:plug:desk")).unwrap();

    assert_eq!(plug.status(), ThingStatus::Uninitialized);
    assert_eq!(plug.status_info().detail, ThingStatusDetail::HandlerMissingError);
    assert_eq!(plug.channels().len(), 2);
    assert_eq!(plug.configuration().get("address").and_then(|v| v.as_str()), Some("10.0.0.7"));
    assert_eq!(plug.configuration().get("interval").and_then(|v| v.as_i64()), Some(60));
    assert!(runtime.manager().thing(&uid("ghost:thing:one")).is_none());
}

#[tokio::test]
async fn should_route_commands_to_handlers_and_publish_state() {
    let config = config();
    let runtime = Runtime::start(&config).await.unwrap();
    let mut events = runtime.subscribe();
    runtime.create_things(&config.things);
    let lamp = uid("virtual:light:home:lamp");
    wait_for(&runtime, &lamp, ThingStatus::Online).await;
    let power = ChannelUID::new(&lamp, "power").unwrap();

    runtime
        .manager()
        .handle_command(&power, Command::OnOff(true))
        .unwrap();

    let state = tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            if let EventKind::ChannelStateUpdated { channel_uid, state } = events.recv().await.unwrap().kind
                && channel_uid == power
            {
                return state;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(state, State::OnOff(true));
}

#[tokio::test]
async fn should_take_children_offline_when_hub_is_unreachable() {
    let mut config = config();
    config.things[1]
        .configuration
        .insert("reachable".to_string(), toml::Value::Boolean(false));
    let runtime = Runtime::start(&config).await.unwrap();
    runtime.create_things(&config.things);

    let hub_detail = wait_for(&runtime, &uid("virtual:hub:home"), ThingStatus::Offline).await;
    let lamp_detail = wait_for(&runtime, &uid("virtual:light:home:lamp"), ThingStatus::Offline).await;

    assert_eq!(hub_detail, ThingStatusDetail::CommunicationError);
    assert_eq!(lamp_detail, ThingStatusDetail::BridgeOffline);
}

#[tokio::test]
async fn should_remove_everything_on_shutdown() {
    let config = config();
    let runtime = Runtime::start(&config).await.unwrap();
    let mut events = runtime.subscribe();
    runtime.create_things(&config.things);
    wait_for(&runtime, &uid("virtual:hub:home"), ThingStatus::Online).await;

    runtime.shutdown();

    assert!(runtime.manager().things().is_empty());
    assert!(runtime.registries().thing_types.get_all(None).is_empty());
    let mut removed = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let EventKind::ThingRemoved { thing_uid } = event.kind {
            removed.push(thing_uid.to_string());
        }
    }
    assert_eq!(removed.len(), 4);
    let position = |raw: &str| removed.iter().position(|r| r == raw).unwrap();
    assert!(position("virtual:light:home:lamp") < position("virtual:hub:home"));
    assert!(position("virtual:sensor:home:kitchen") < position("virtual:hub:home"));
}
