//! End-to-end tests: workbook files and config through to generated suites

use apimatrix::assertion::{all_passed, run};
use apimatrix::config::CONFIG_FILE;
use apimatrix::{process_sheet, process_workbook, AttributeSpec, GeneratorConfig, Workbook};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

const ORDERS: &str = r#"
sheets:
  - name: Orders
    rows:
      - ["Наименование атрибута", "", "Тип данных", "Обязательность (О/Н)", "Пример", "Путь в eDTO", "maxLength", "minimum", "maximum"]
      - ["order", "", "object", "О", "", "", null, null, null]
      - ["", "id", "integer", "О", 7, "result.id", null, 1, 999]
      - ["", "comment", "string", "Н", "fast", "", 8, null, null]
      - ["items[0]", "", "array[object]", "О", "", "", null, null, null]
      - ["", "sku", "string", "О", "A1;B2", "items[sku=\"A1\"].sku", null, null, null]
      - ["", "price", "number", "", "10", "", null, 0, null]
      - ["express", "", "boolean", "", "N", "", null, null, null]
  - name: Empty
    rows:
      - ["Наименование атрибута", "Тип данных", "Обязательность", "Пример"]
"#;

fn write_workbook(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_yaml_workbook_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, "orders.yaml", ORDERS);

    let workbook = Workbook::load(&path).unwrap();
    let config = GeneratorConfig::resolve(None, dir.path()).unwrap();
    let report = process_workbook(&workbook, &config);

    assert_eq!(report.processed.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "Empty");
    assert_eq!(report.skipped[0].reason, "no attributes");

    let orders = &report.processed[0];
    assert_eq!(
        orders.attributes,
        vec![
            "order.id",
            "order.comment",
            "items[0].sku",
            "items[0].price",
            "express"
        ]
    );
    assert_eq!(
        orders.full.payload,
        json!({
            "order": {"id": 7, "comment": "fast"},
            "items": [{"sku": "A1;B2", "price": 10}],
            "express": false
        })
    );
    assert_eq!(orders.minimal.payload["order"], json!({"id": 7}));
    assert!(orders.minimal.payload.get("express").is_none());

    assert!(orders.coverage.is_complete);
    assert_eq!(orders.cases.len(), orders.summary.calculations.pairwise_count);
    // id: 7, 1, 999; comment: fast, a, aaaaaaaa; sku: A1, B2; price: 10, 0; express: false, true
    assert_eq!(orders.summary.calculations.value_counts, vec![3, 3, 2, 2, 2]);
    assert_eq!(orders.summary.calculations.total_combinations, 72);
    assert!(orders.cases.len() >= 9);
    assert!(orders.cases.len() < 72);
}

#[test]
fn test_config_file_next_to_workbook() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE),
        r#"
version: 1
columns:
  name: ["Field"]
  type: ["Kind"]
  required: ["Mandatory"]
  example: ["Sample"]
  max_length: ["Len"]
required_markers: ["x"]
boundary_char: "z"
"#,
    )
    .unwrap();
    let path = write_workbook(
        &dir,
        "users.yaml",
        r#"
sheets:
  - name: Users
    rows:
      - [Field, Kind, "Mandatory?", Sample, Len]
      - [login, string, x, bob, 4]
      - [age, integer, "", 30, null]
"#,
    );

    let config = GeneratorConfig::resolve(None, dir.path()).unwrap();
    assert_eq!(config.boundary_char, 'z');

    let report = process_workbook(&Workbook::load(&path).unwrap(), &config);
    let users = &report.processed[0];
    assert_eq!(
        users.candidates[0].values,
        vec![json!("bob"), json!("z"), json!("zzzz")]
    );
    assert_eq!(users.minimal.payload, json!({"login": "bob"}));
    // No response path column
    assert_eq!(users.diagnostics.len(), 1);
    assert_eq!(users.diagnostics[0].row, 0);
}

#[test]
fn test_default_headers_rejected_by_custom_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("custom.yaml");
    fs::write(&config_path, "columns:\n  name: [\"Field\"]\n").unwrap();
    let path = write_workbook(&dir, "orders.yaml", ORDERS);

    let config = GeneratorConfig::resolve(Some(config_path.as_path()), dir.path()).unwrap();
    let report = process_workbook(&Workbook::load(&path).unwrap(), &config);

    assert!(report.processed.is_empty());
    assert_eq!(report.skipped.len(), 2);
    assert!(report.skipped[0].reason.contains("Field"));
}

#[test]
fn test_invalid_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE), "version: 2\n").unwrap();
    assert!(GeneratorConfig::resolve(None, dir.path()).is_err());
}

#[test]
fn test_json_workbook() {
    let dir = TempDir::new().unwrap();
    let content = json!({
        "sheets": [{
            "name": "Flags",
            "rows": [
                ["Name", "Type", "Required", "Example", "Response path"],
                ["enabled", "boolean", "yes", "true", "enabled"],
                ["level", "integer", "", "1;2;3", "level"]
            ]
        }]
    });
    let path = write_workbook(&dir, "flags.json", &content.to_string());

    let report = process_workbook(&Workbook::load(&path).unwrap(), &GeneratorConfig::default());
    let flags = &report.processed[0];
    assert_eq!(flags.cases.len(), 6);
    assert!(flags.diagnostics.is_empty());
    assert_eq!(flags.full.payload, json!({"enabled": true, "level": [1, 2, 3]}));
}

#[test]
fn test_assertions_pass_against_echo_response() {
    let attributes = vec![
        AttributeSpec::new("order.id", "integer")
            .unwrap()
            .with_required(true)
            .with_example("7")
            .with_minimum("1")
            .with_response_path("order.id")
            .unwrap(),
        AttributeSpec::new("order.note", "string")
            .unwrap()
            .with_example("hi")
            .with_max_length("5")
            .with_response_path("order.note")
            .unwrap(),
        AttributeSpec::new("items[0].sku", "string")
            .unwrap()
            .with_example("A1;B2")
            .with_response_path("items[0].sku")
            .unwrap(),
        AttributeSpec::new("express", "boolean")
            .unwrap()
            .with_response_path("express")
            .unwrap(),
    ];
    let artifacts = process_sheet("Echo", &attributes, &GeneratorConfig::default()).unwrap();

    for case in &artifacts.cases {
        assert_eq!(case.assertions.len(), 4, "{}", case.name);
        for assertion in &case.assertions {
            let outcomes = run(&assertion.instructions, &case.payload);
            assert!(
                all_passed(&outcomes),
                "{} / {}: {:?}",
                case.name,
                assertion.attribute,
                outcomes
            );
        }
    }
}

#[test]
fn test_mismatched_response_fails_assertions() {
    let attributes = vec![AttributeSpec::new("total", "number")
        .unwrap()
        .with_example("10")
        .with_response_path("result.total")
        .unwrap()];
    let artifacts = process_sheet("S", &attributes, &GeneratorConfig::default()).unwrap();
    let assertion = &artifacts.full.assertions[0];

    assert!(all_passed(&run(&assertion.instructions, &json!({"result": {"total": 10}}))));

    let outcomes = run(&assertion.instructions, &json!({"result": {"total": 11}}));
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| !o.passed)
        .map(|o| o.instruction.as_str())
        .collect();
    assert_eq!(failed, vec!["assert $1 == 10"]);

    let outcomes = run(&assertion.instructions, &json!({"result": {}}));
    assert!(outcomes.iter().all(|o| !o.passed));
}

#[test]
fn test_artifacts_serialize_for_the_suite_file() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, "orders.yaml", ORDERS);
    let report = process_workbook(&Workbook::load(&path).unwrap(), &GeneratorConfig::default());

    let text = serde_json::to_string_pretty(&report.processed[0]).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["sheet"], "Orders");
    assert!(value["fingerprint"].as_str().unwrap().starts_with("sha256:"));
    assert_eq!(value["coverage"]["is_complete"], true);
    assert!(value["coverage"].get("missing").is_none());
    assert_eq!(value["candidates"][2]["attribute"], "items[0].sku");

    let first = &value["cases"][0];
    assert_eq!(first["name"], "Test 1");
    assert!(first["values"].get("express").is_some());
    let ops: Vec<&str> = first["assertions"][0]["instructions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["op"].as_str().unwrap())
        .collect();
    assert_eq!(ops, vec!["navigate", "assert_type", "assert_equals"]);
}

#[test]
fn test_summary_text() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, "orders.yaml", ORDERS);
    let report = process_workbook(&Workbook::load(&path).unwrap(), &GeneratorConfig::default());

    let text = report.processed[0].summary.to_string();
    assert!(text.contains("Orders"));
    assert!(text.contains("comment"));
    assert!(text.contains("Full enumeration:      72"));
}
