//! Resource facades against a mock API: paths, payloads and parsing

mod common;

use assert_matches::assert_matches;
use common::{cloud_client, data, mount_token};
use openmotics::resources::Resource;
use openmotics::{
    Error, PresetTemperatures, ThermostatMode, ThermostatPreset, ThermostatState,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server() -> MockServer {
    let server = MockServer::start().await;
    mount_token(&server).await;
    server
}

async fn expect_post(server: &MockServer, endpoint: &str, body: Option<serde_json::Value>) {
    let mock = Mock::given(method("POST")).and(path(format!("/api/v1{endpoint}")));
    let mock = match body {
        Some(body) => mock.and(body_json(body)),
        None => mock,
    };
    mock.respond_with(data(json!({})))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_installations_filter_and_get() {
    let server = server().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations"))
        .and(query_param("filter", r#"{"name":"Home"}"#))
        .respond_with(data(json!([{"id": 7, "name": "Home"}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/7"))
        .respond_with(data(json!({
            "id": 7,
            "name": "Home",
            "network": {"local_ip_address": "10.0.0.2"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = cloud_client(&server);
    let installations = client
        .installations()
        .list(Some(r#"{"name":"Home"}"#))
        .await
        .unwrap();
    assert_eq!(installations[0].id, 7);

    let installation = client.installations().get(7).await.unwrap();
    assert_eq!(installation.local_ip_address(), Some("10.0.0.2"));
}

#[tokio::test]
async fn test_outputs_list_and_state() {
    let server = server().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/21/outputs"))
        .respond_with(data(json!([
            {"id": 18, "name": "Lamp", "type": "OUTLET", "status": {"on": true, "value": 80}},
            {"id": 19, "name": "Fan", "type": "OUTLET", "status": {"on": false}}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/21/outputs/18"))
        .respond_with(data(json!({"id": 18, "status": {"on": true, "value": 80}})))
        .mount(&server)
        .await;

    let client = cloud_client(&server);
    let outputs = client.outputs().list(21, None).await.unwrap();
    let on: Vec<u64> = outputs.iter().filter(|o| o.is_on()).map(|o| o.id).collect();
    assert_eq!(on, vec![18]);

    let output = client.outputs().get(21, 18).await.unwrap();
    assert_eq!(output.brightness(), Some(80));
}

#[rstest]
#[case(Some(150), 100)]
#[case(Some(-20), 0)]
#[case(Some(45), 45)]
#[case(None, 100)]
#[tokio::test]
async fn test_output_turn_on_clamps_value(#[case] value: Option<i64>, #[case] sent: i64) {
    let server = server().await;
    expect_post(
        &server,
        "/base/installations/1/outputs/2/turn_on",
        Some(json!({ "value": sent })),
    )
    .await;

    cloud_client(&server).outputs().turn_on(1, 2, value).await.unwrap();
}

#[tokio::test]
async fn test_output_toggle_and_turn_off() {
    let server = server().await;
    expect_post(&server, "/base/installations/1/outputs/2/toggle", None).await;
    expect_post(&server, "/base/installations/1/outputs/2/turn_off", None).await;
    expect_post(&server, "/base/installations/1/outputs/turn_off", None).await;

    let client = cloud_client(&server);
    let outputs = client.outputs();
    outputs.toggle(1, 2).await.unwrap();
    outputs.turn_off(1, Some(2)).await.unwrap();
    outputs.turn_off(1, None).await.unwrap();
}

#[tokio::test]
async fn test_lights() {
    let server = server().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/lights"))
        .respond_with(data(json!([{"id": 4, "local_id": 12, "status": {"on": true}}])))
        .mount(&server)
        .await;
    expect_post(
        &server,
        "/base/installations/1/lights/4/turn_on",
        Some(json!({"value": 100})),
    )
    .await;
    expect_post(&server, "/base/installations/1/lights/turn_off", None).await;
    expect_post(&server, "/base/installations/1/lights/4/toggle", None).await;

    let client = cloud_client(&server);
    let lights = client.lights();
    let listed = lights.list(1, None).await.unwrap();
    assert!(listed[0].is_on());

    lights.turn_on(1, 4, Some(250)).await.unwrap();
    lights.turn_off(1, None).await.unwrap();
    lights.toggle(1, 4).await.unwrap();
}

#[tokio::test]
async fn test_sensors() {
    let server = server().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/sensors"))
        .and(query_param("filter", "temperature"))
        .respond_with(data(json!([{"id": 2, "status": {"value": 19.5}}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/sensors/2"))
        .respond_with(data(json!({"id": 2, "physical_quantity": "temperature"})))
        .mount(&server)
        .await;

    let client = cloud_client(&server);
    let sensors = client.sensors().list(1, Some("temperature")).await.unwrap();
    assert_eq!(sensors[0].value(), Some(19.5));

    let sensor = client.sensors().get(1, 2).await.unwrap();
    assert_eq!(sensor.physical_quantity.as_deref(), Some("temperature"));
}

#[tokio::test]
async fn test_shutter_commands() {
    let server = server().await;
    let base = "/base/installations/1/shutters/3";
    for action in ["up", "down", "stop", "lock", "unlock", "move"] {
        expect_post(&server, &format!("{base}/{action}"), None).await;
    }
    expect_post(&server, &format!("{base}/change_position"), Some(json!({"position": 40}))).await;
    expect_post(
        &server,
        &format!("{base}/change_relative_position"),
        Some(json!({"offset": -5})),
    )
    .await;
    expect_post(&server, &format!("{base}/preset"), Some(json!({"position": 10}))).await;

    let client = cloud_client(&server);
    let shutters = client.shutters();
    shutters.move_up(1, 3).await.unwrap();
    shutters.move_down(1, 3).await.unwrap();
    shutters.stop(1, 3).await.unwrap();
    shutters.lock(1, 3).await.unwrap();
    shutters.unlock(1, 3).await.unwrap();
    shutters.move_to_preset(1, 3).await.unwrap();
    shutters.change_position(1, 3, 40).await.unwrap();
    shutters.change_relative_position(1, 3, -5).await.unwrap();
    shutters.preset(1, 3, 10).await.unwrap();
}

#[tokio::test]
async fn test_shutter_rejects_negative_position_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = cloud_client(&server);
    assert_matches!(
        client.shutters().change_position(1, 3, -1).await,
        Err(Error::Argument(_))
    );
    assert_matches!(client.shutters().preset(1, 3, -10).await, Err(Error::Argument(_)));
}

#[tokio::test]
async fn test_shutter_list_and_get() {
    let server = server().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/shutters"))
        .respond_with(data(json!([{"id": 3, "status": {"state": "UP", "position": 0}}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/shutters/3"))
        .respond_with(data(json!({"id": 3, "status": {"state": "GOING_DOWN", "position": 12}})))
        .mount(&server)
        .await;

    let client = cloud_client(&server);
    let shutters = client.shutters().list(1, None).await.unwrap();
    assert_eq!(shutters[0].state(), Some("UP"));

    let shutter = client.shutters().get(1, 3).await.unwrap();
    assert_eq!(shutter.position(), Some(12));
}

#[tokio::test]
async fn test_group_actions() {
    let server = server().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/groupactions"))
        .and(query_param("usage", "SCENE"))
        .respond_with(data(json!([{"id": 5, "name": "Movie night", "usage": "SCENE"}])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/groupactions/5"))
        .respond_with(data(json!({"id": 5, "name": "Movie night"})))
        .mount(&server)
        .await;
    expect_post(&server, "/base/installations/1/groupactions/5/trigger", None).await;

    let client = cloud_client(&server);
    let group_actions = client.group_actions();
    assert_eq!(group_actions.scenes(1).await.unwrap()[0].id, 5);
    assert_eq!(group_actions.by_usage(1, "scene").await.unwrap().len(), 1);
    assert_eq!(
        group_actions.get(1, 5).await.unwrap().name.as_deref(),
        Some("Movie night")
    );
    group_actions.trigger(1, 5).await.unwrap();
}

#[tokio::test]
async fn test_group_actions_reject_empty_usage() {
    let server = MockServer::start().await;
    let client = cloud_client(&server);

    assert_matches!(
        client.group_actions().by_usage(1, "  ").await,
        Err(Error::Argument(msg)) if msg.contains("usage")
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_thermostat_controls() {
    let server = server().await;
    let base = "/base/installations/1/thermostats";
    expect_post(&server, &format!("{base}/mode"), Some(json!({"mode": "COOLING"}))).await;
    expect_post(&server, &format!("{base}/state"), Some(json!({"state": "OFF"}))).await;
    expect_post(&server, &format!("{base}/groups/2/mode"), Some(json!({"mode": "HEATING"}))).await;
    expect_post(&server, &format!("{base}/units/6/state"), Some(json!({"state": "ON"}))).await;
    expect_post(
        &server,
        &format!("{base}/units/6/setpoint"),
        Some(json!({"temperature": 21.5})),
    )
    .await;
    expect_post(
        &server,
        &format!("{base}/units/6/preset"),
        Some(json!({"preset": "VACATION"})),
    )
    .await;
    expect_post(
        &server,
        &format!("{base}/units/6/preset/config"),
        Some(json!({
            "heating": {"AWAY": 16.0, "VACATION": 12.0, "PARTY": 22.0},
            "cooling": {"AWAY": 28.0, "VACATION": 30.0, "PARTY": 24.0}
        })),
    )
    .await;

    let client = cloud_client(&server);
    let thermostats = client.thermostats();
    thermostats.set_mode(1, ThermostatMode::Cooling).await.unwrap();
    thermostats.set_state(1, ThermostatState::Off).await.unwrap();
    thermostats.groups().set_mode(1, 2, ThermostatMode::Heating).await.unwrap();

    let units = thermostats.units();
    units.set_state(1, 6, ThermostatState::On).await.unwrap();
    units.set_temperature(1, 6, 21.5).await.unwrap();
    units.set_preset(1, 6, ThermostatPreset::Vacation).await.unwrap();
    units
        .set_preset_config(
            1,
            6,
            PresetTemperatures { away: 16.0, vacation: 12.0, party: 22.0 },
            PresetTemperatures { away: 28.0, vacation: 30.0, party: 24.0 },
        )
        .await
        .unwrap();

    assert_matches!(
        units.set_temperature(1, 6, f64::NAN).await,
        Err(Error::Argument(_))
    );
}

#[tokio::test]
async fn test_thermostat_groups_and_units() {
    let server = server().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/thermostats/groups"))
        .respond_with(data(json!([{"id": 2, "status": {"mode": "HEATING"}}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/thermostats/groups/2"))
        .respond_with(data(json!({"id": 2, "name": "Ground floor"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/thermostats/units"))
        .respond_with(data(json!([{"id": 6, "status": {"actual_temperature": 20.0}}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/thermostats/units/6"))
        .respond_with(data(
            json!({"id": 6, "status": {"current_setpoint": 21.0, "preset": "AUTO"}}),
        ))
        .mount(&server)
        .await;

    let client = cloud_client(&server);
    let groups = client.thermostats().groups();
    assert_eq!(groups.list(1).await.unwrap()[0].mode(), Some(ThermostatMode::Heating));
    assert_eq!(groups.get(1, 2).await.unwrap().name.as_deref(), Some("Ground floor"));

    let units = client.thermostats().units();
    assert_eq!(units.list(1).await.unwrap()[0].actual_temperature(), Some(20.0));
    let unit = units.get(1, 6).await.unwrap();
    assert_eq!(unit.setpoint(), Some(21.0));
    assert_eq!(unit.preset(), Some(ThermostatPreset::Auto));
}

#[tokio::test]
async fn test_missing_envelope_is_invalid_response() {
    let server = server().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/base/installations/1/sensors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;

    let client = cloud_client(&server);
    let sensors = client.sensors();
    assert!(!sensors.client().is_closed());
    assert_eq!(
        sensors.list(1, None).await.unwrap_err().kind(),
        openmotics::ErrorKind::InvalidResponse
    );
}
