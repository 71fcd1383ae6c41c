//! Integration tests for the core engine pipeline.
//!
//! Drives the full parse -> resolve -> build path over a realistic
//! configuration, the way the server dispatcher and client proxy do.

use patchbay::{params, statement, Config, QueryMethod, RouteDescriptor, SqliteStore, Store};
use serde_json::{json, Map, Value};

fn game_config() -> Config {
    Config::from_value(json!({
        "server": {
            "port": 4200,
            "functions": ["gameComplete"],
            "websockets": {
                "protocol": "wss",
                "host": "broker.example.io",
                "port": 8084,
                "endpoint": "/mqtt"
            },
            "database": { "type": "sqlite", "table": "games" }
        },
        "client": { "http": { "baseURL": "http://localhost:4200" } },
        "routes": {
            "gameComplete": {
                "type": "javascript/function",
                "function": "gameComplete",
                "params": {"game_id": null}
            },
            "subGame": { "type": "websockets/sub", "topic": "games/{game_id}" },
            "pubGame": { "type": "websockets/pub", "topic": "games/{game_id}", "http": true },
            "resetGamesTable": {
                "type": "db/postgres",
                "method": "query",
                "query": "CREATE TABLE IF NOT EXISTS {table} ( id INTEGER PRIMARY KEY AUTOINCREMENT, name VARCHAR(255), owner_id NUMBER NOT NULL, isComplete BOOLEAN );"
            },
            "createNewGame": {
                "type": "db/postgres",
                "method": "insert",
                "params": {"name": null, "owner_id": null, "isComplete": false}
            },
            "listGames": { "type": "db/postgres", "method": "select" },
            "getGame": {
                "type": "db/postgres",
                "method": "query",
                "query": "SELECT * FROM {table} WHERE id = $id",
                "params": {"id": null}
            }
        }
    }))
    .unwrap()
}

fn bag(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

fn query_route<'a>(descriptors: &'a [RouteDescriptor], name: &str) -> &'a patchbay::QueryRoute {
    descriptors
        .iter()
        .find_map(|d| match d {
            RouteDescriptor::Query(r) if r.name == name => Some(r),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no query route named {}", name))
}

#[test]
fn test_full_config_parses_into_descriptors() {
    let config = game_config();
    let descriptors = patchbay::routes::parse_routes(&config.routes).unwrap();
    assert_eq!(descriptors.len(), 7);

    // Config order is preserved.
    let names: Vec<&str> = descriptors.iter().map(|d| d.name()).collect();
    assert_eq!(
        names,
        vec![
            "gameComplete",
            "subGame",
            "pubGame",
            "resetGamesTable",
            "createNewGame",
            "listGames",
            "getGame"
        ]
    );
}

#[test]
fn test_query_routes_run_against_a_real_store() {
    let config = game_config();
    let descriptors = patchbay::routes::parse_routes(&config.routes).unwrap();
    let store = SqliteStore::in_memory().unwrap();
    let table = config.default_table();

    // Create the table through the literal query route.
    let reset = query_route(&descriptors, "resetGamesTable");
    let resolved = params::resolve(&reset.params, None).unwrap();
    let stmt = statement::build(reset, table, &resolved).unwrap();
    store.execute(&stmt.sql, &stmt.params).unwrap();

    // Insert through the insert route; isComplete defaults to false.
    let create = query_route(&descriptors, "createNewGame");
    assert_eq!(create.method, QueryMethod::Insert);
    let resolved = params::resolve(
        &create.params,
        Some(&bag(json!({"name": "Game 1", "owner_id": 12345}))),
    )
    .unwrap();
    let stmt = statement::build(create, table, &resolved).unwrap();
    assert_eq!(stmt.params.len(), 3);
    store.execute(&stmt.sql, &stmt.params).unwrap();

    // Read back through the select route.
    let list = query_route(&descriptors, "listGames");
    let resolved = params::resolve(&list.params, None).unwrap();
    let stmt = statement::build(list, table, &resolved).unwrap();
    let rows = store.execute(&stmt.sql, &stmt.params).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("Game 1"));
    assert_eq!(rows[0]["isComplete"], json!(0));

    // And through the parametrized literal route.
    let get = query_route(&descriptors, "getGame");
    let resolved = params::resolve(&get.params, Some(&bag(json!({"id": 1})))).unwrap();
    let stmt = statement::build(get, table, &resolved).unwrap();
    let rows = store.execute(&stmt.sql, &stmt.params).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["owner_id"], json!(12345));
}

#[test]
fn test_missing_required_parameter_short_circuits() {
    let config = game_config();
    let descriptors = patchbay::routes::parse_routes(&config.routes).unwrap();
    let get = query_route(&descriptors, "getGame");

    let err = params::resolve(&get.params, Some(&bag(json!({})))).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("id"));
}
