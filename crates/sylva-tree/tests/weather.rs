//! End-to-end induction on the classic weather datasets.
//!
//! Each profile is fitted on the nominal and/or numeric weather data and the
//! resulting tree is checked through its rendering and its predictions.

use sylva_tree::{
    Attribute, Dataset, DecisionTree, Node, Pruning, Schema, SplitRule, TreeConfig, TreeError,
    Value,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const NOMINAL: [&str; 14] = [
    "sunny,hot,high,FALSE,no",
    "sunny,hot,high,TRUE,no",
    "overcast,hot,high,FALSE,yes",
    "rainy,mild,high,FALSE,yes",
    "rainy,cool,normal,FALSE,yes",
    "rainy,cool,normal,TRUE,no",
    "overcast,cool,normal,TRUE,yes",
    "sunny,mild,high,FALSE,no",
    "sunny,cool,normal,FALSE,yes",
    "rainy,mild,normal,FALSE,yes",
    "sunny,mild,normal,TRUE,yes",
    "overcast,mild,high,TRUE,yes",
    "overcast,hot,normal,FALSE,yes",
    "rainy,mild,high,TRUE,no",
];

const NUMERIC: [&str; 14] = [
    "sunny,85,85,FALSE,no",
    "sunny,80,90,TRUE,no",
    "overcast,83,86,FALSE,yes",
    "rainy,70,96,FALSE,yes",
    "rainy,68,80,FALSE,yes",
    "rainy,65,70,TRUE,no",
    "overcast,64,65,TRUE,yes",
    "sunny,72,95,FALSE,no",
    "sunny,69,70,FALSE,yes",
    "rainy,75,80,FALSE,yes",
    "sunny,75,70,TRUE,yes",
    "overcast,72,90,TRUE,yes",
    "overcast,81,75,FALSE,yes",
    "rainy,71,91,TRUE,no",
];

fn load(schema: Schema, rows: &[&str]) -> Dataset {
    let mut data = Dataset::new(schema);
    for row in rows {
        let fields: Vec<&str> = row.split(',').collect();
        data.push_fields(&fields).unwrap();
    }
    data
}

fn nominal() -> Dataset {
    let schema = Schema::new(
        vec![
            Attribute::categorical("outlook", ["sunny", "overcast", "rainy"]),
            Attribute::categorical("temperature", ["hot", "mild", "cool"]),
            Attribute::categorical("humidity", ["high", "normal"]),
            Attribute::categorical("windy", ["TRUE", "FALSE"]),
            Attribute::categorical("play", ["yes", "no"]),
        ],
        4,
    )
    .unwrap();
    load(schema, &NOMINAL)
}

fn numeric() -> Dataset {
    let schema = Schema::new(
        vec![
            Attribute::categorical("outlook", ["sunny", "overcast", "rainy"]),
            Attribute::continuous("temperature"),
            Attribute::continuous("humidity"),
            Attribute::categorical("windy", ["TRUE", "FALSE"]),
            Attribute::categorical("play", ["yes", "no"]),
        ],
        4,
    )
    .unwrap();
    load(schema, &NUMERIC)
}

/// Lines between the title block and the leaf/size footer.
fn body(tree: &DecisionTree) -> Vec<String> {
    let text = tree.to_string();
    let lines: Vec<&str> = text.lines().collect();
    lines[3..lines.len() - 3]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn assert_reproduces_training(tree: &DecisionTree, data: &Dataset) {
    for (i, record) in data.records().iter().enumerate() {
        let expected = record.value(data.schema().class_index()).category();
        assert_eq!(
            tree.classify(record.values()).unwrap(),
            expected,
            "record {i} misclassified"
        );
    }
}

const CLASSIC_TREE: [&str; 7] = [
    "outlook = sunny",
    "|  humidity = high: no (3.0)",
    "|  humidity = normal: yes (2.0)",
    "outlook = overcast: yes (4.0)",
    "outlook = rainy",
    "|  windy = TRUE: no (2.0)",
    "|  windy = FALSE: yes (3.0)",
];

// ---------------------------------------------------------------------------
// Dataset-level measures
// ---------------------------------------------------------------------------

#[test]
fn nominal_attribute_gains() {
    let data = nominal();
    assert!((data.entropy() - 0.940).abs() < 1e-3);
    let gains: Vec<f64> = (0..4).map(|a| data.information_gain(a).unwrap()).collect();
    assert!((gains[0] - 0.247).abs() < 1e-3);
    assert!((gains[1] - 0.029).abs() < 1e-3);
    assert!((gains[2] - 0.152).abs() < 1e-3);
    assert!((gains[3] - 0.048).abs() < 1e-3);
    assert!((data.split_information(0).unwrap() - 1.577).abs() < 1e-3);
    assert!((data.gain_ratio(0).unwrap() - 0.156).abs() < 1e-3);
}

#[test]
fn gain_never_exceeds_parent_entropy() {
    for data in [nominal(), numeric()] {
        let h = data.entropy();
        for attribute in data.schema().feature_indices() {
            let gain = data.information_gain(attribute).unwrap();
            assert!((0.0..=h + 1e-12).contains(&gain));
            let ratio = data.gain_ratio(attribute).unwrap();
            if data.split_information(attribute).unwrap() >= 1.0 {
                assert!(ratio <= gain + 1e-12);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[test]
fn categorical_id3_builds_classic_tree() {
    let data = nominal();
    let tree = TreeConfig::categorical_id3().fit(&data).unwrap();
    assert_eq!(body(&tree), CLASSIC_TREE);
    assert_eq!(tree.n_leaves(), 5);
    assert_eq!(tree.n_nodes(), 8);
    assert_eq!(tree.depth(), 2);
    assert!(tree.to_string().starts_with("Decision tree (information gain)\n"));
    assert_reproduces_training(&tree, &data);
}

#[test]
fn categorical_id3_rejects_numeric_weather() {
    let err = TreeConfig::categorical_id3().fit(&numeric()).unwrap_err();
    assert_eq!(
        err,
        TreeError::UnsupportedContinuous {
            attribute: "temperature".to_string()
        }
    );
}

#[test]
fn j48_keeps_classic_tree_after_pruning() {
    let data = nominal();
    let tree = TreeConfig::j48().fit(&data).unwrap();
    assert!(tree.is_pruned());
    assert_eq!(body(&tree), CLASSIC_TREE);
    assert!(tree.to_string().starts_with("Decision tree (gain ratio, pruned)\n"));
    assert_reproduces_training(&tree, &data);
}

#[test]
fn id3_discretizes_numeric_weather() {
    let data = numeric();
    let tree = TreeConfig::id3().fit(&data).unwrap();
    let discretization = tree.discretization().unwrap();
    assert_eq!(discretization.threshold(1), Some(83.0));
    assert_eq!(discretization.threshold(2), Some(80.0));
    assert_eq!(discretization.threshold(0), None);
    assert_eq!(
        body(&tree),
        vec![
            "outlook = sunny",
            "|  humidity = <=80: yes (2.0)",
            "|  humidity = >80: no (3.0)",
            "outlook = overcast: yes (4.0)",
            "outlook = rainy",
            "|  windy = TRUE: no (2.0)",
            "|  windy = FALSE: yes (3.0)",
        ]
    );
    assert_reproduces_training(&tree, &data);

    let dist = tree
        .class_distribution(&[
            Value::Category(0),
            Value::Number(60.0),
            Value::Number(72.5),
            Value::Category(0),
            Value::Missing,
        ])
        .unwrap();
    assert_eq!(dist, vec![1.0, 0.0]);
}

#[test]
fn discretized_j48_tests_binned_attributes() {
    let data = numeric();
    let tree = TreeConfig::discretized_j48().fit(&data).unwrap();
    let Node::Decision { rule, children, .. } = tree.root() else {
        panic!("expected a decision at the root");
    };
    assert_eq!(*rule, SplitRule::Multiway { attribute: 1 });
    assert_eq!(children.len(), 2);
    assert_eq!(
        tree.schema().attribute(1).unwrap().domain().unwrap(),
        &["<=83".to_string(), ">83".to_string()]
    );
    assert_eq!(body(&tree)[0], "temperature = <=83");
    assert_eq!(body(&tree).last().unwrap(), "temperature = >83: no (1.0)");
    assert_reproduces_training(&tree, &data);
}

#[test]
fn j48_splits_numbers_at_observed_values() {
    let data = numeric();
    let tree = TreeConfig::j48().fit(&data).unwrap();
    let Node::Decision { rule, .. } = tree.root() else {
        panic!("expected a decision at the root");
    };
    assert_eq!(
        *rule,
        SplitRule::Threshold {
            attribute: 1,
            threshold: 83.0
        }
    );
    let lines = body(&tree);
    assert_eq!(lines[0], "temperature <= 83");
    assert_eq!(lines[1], "|  humidity <= 86");
    assert_eq!(lines.last().unwrap(), "temperature > 83: no (1.0)");
    assert!(lines.iter().any(|l| l.ends_with("outlook = sunny: null")));
    assert_reproduces_training(&tree, &data);
}

#[test]
fn unpruned_tree_reproduces_training() {
    for data in [nominal(), numeric()] {
        let tree = TreeConfig::j48()
            .with_pruning(Pruning::None)
            .fit(&data)
            .unwrap();
        assert!(!tree.is_pruned());
        assert_reproduces_training(&tree, &data);
    }
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

#[test]
fn prune_is_idempotent_on_weather() {
    for data in [nominal(), numeric()] {
        let mut tree = TreeConfig::j48()
            .with_pruning(Pruning::None)
            .fit(&data)
            .unwrap();
        let first = tree.prune();
        let once = tree.clone();
        let second = tree.prune();
        assert_eq!(tree, once);
        assert_eq!(second.collapsed, 0);
        assert!(first.nodes_after <= first.nodes_before);
        assert!((first.root_error - second.root_error).abs() < 1e-12);
    }
}

// ---------------------------------------------------------------------------
// Missing values
// ---------------------------------------------------------------------------

#[test]
fn j48_imputes_missing_training_values() {
    let mut rows: Vec<String> = NOMINAL.iter().map(ToString::to_string).collect();
    rows[0] = "sunny,hot,?,FALSE,no".to_string();
    rows[7] = "sunny,mild,high,?,no".to_string();
    rows.push("?,?,?,?,?".to_string());
    let borrowed: Vec<&str> = rows.iter().map(String::as_str).collect();
    let schema = nominal().schema().clone();
    let data = load(schema, &borrowed);

    let tree = TreeConfig::j48().fit(&data).unwrap();
    assert_eq!(tree.root().n_records(), 14);
    let Node::Decision { rule, .. } = tree.root() else {
        panic!("expected a decision at the root");
    };
    assert_eq!(rule.attribute(), 0);
    // The caller's dataset is untouched.
    assert!(data.records()[0].value(2).is_missing());
}

#[test]
fn id3_rejects_missing_training_values() {
    let mut rows: Vec<&str> = NOMINAL.to_vec();
    rows[5] = "rainy,?,normal,TRUE,no";
    let data = load(nominal().schema().clone(), &rows);
    let err = TreeConfig::categorical_id3().fit(&data).unwrap_err();
    assert_eq!(
        err,
        TreeError::MissingTrainingValue {
            record_index: 5,
            attribute: "temperature".to_string()
        }
    );
}

#[test]
fn untested_missing_value_still_classifies() {
    let tree = TreeConfig::j48().fit(&nominal()).unwrap();
    let query = tree
        .input_schema()
        .encode(&["overcast", "?", "?", "?", "?"])
        .unwrap();
    let label = tree.classify(query.values()).unwrap();
    assert_eq!(label.and_then(|l| tree.class_name(l)), Some("yes"));

    let query = tree
        .input_schema()
        .encode(&["sunny", "hot", "?", "TRUE", "?"])
        .unwrap();
    assert_eq!(
        tree.classify(query.values()),
        Err(TreeError::MissingValue {
            attribute: "humidity".to_string()
        })
    );
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn tree_serializes_through_serde() {
    let tree = TreeConfig::discretized_j48().fit(&numeric()).unwrap();
    let json = serde_json::to_string(&tree).unwrap();
    let restored: DecisionTree = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, tree);
    assert_eq!(restored.to_string(), tree.to_string());
}

#[test]
fn tampered_dataset_never_reaches_fit() {
    let schema = Schema::new(
        vec![
            Attribute::categorical("a", ["0", "1"]),
            Attribute::categorical("y", ["f", "t"]),
        ],
        1,
    )
    .unwrap();
    let data = load(schema, &["0,t"]);
    let json = serde_json::to_string(&data).unwrap();
    assert!(json.contains(r#"{"Category":1}"#));

    let decoded: Dataset = serde_json::from_str(&json).unwrap();
    assert!(TreeConfig::j48().fit(&decoded).is_ok());

    let tampered = json.replace(r#"{"Category":1}"#, r#"{"Category":7}"#);
    let fitted = serde_json::from_str::<Dataset>(&tampered)
        .map_err(|e| e.to_string())
        .and_then(|d| TreeConfig::j48().fit(&d).map_err(|e| e.to_string()));
    assert!(fitted.is_err());
}
